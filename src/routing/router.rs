//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Look up the first route whose pattern matches a path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over routes (acceptable for typical route counts)
//! - Explicit `None` rather than silent default; fallback is the caller's call

use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::matcher::{PatternError, RoutePattern};
use crate::routing::upstream::{Upstream, UpstreamError};

/// Error raised while compiling a route from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route `{route}`: {source}")]
    Pattern {
        route: String,
        #[source]
        source: PatternError,
    },
    #[error("route `{route}`: {source}")]
    Upstream {
        route: String,
        #[source]
        source: UpstreamError,
    },
}

/// A named rule mapping path templates to one upstream.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: RoutePattern,
    upstream: Upstream,
}

impl Route {
    pub fn new(name: impl Into<String>, pattern: RoutePattern, upstream: Upstream) -> Self {
        Self {
            name: name.into(),
            pattern,
            upstream,
        }
    }

    /// Compile a route from its configuration entry.
    pub fn from_config(config: &RouteConfig) -> Result<Self, RouteError> {
        let pattern = RoutePattern::parse(&config.paths).map_err(|source| RouteError::Pattern {
            route: config.name.clone(),
            source,
        })?;
        let upstream = Upstream::parse(&config.upstream).map_err(|source| RouteError::Upstream {
            route: config.name.clone(),
            source,
        })?;
        Ok(Self::new(config.name.clone(), pattern, upstream))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }
}

/// Ordered, read-only set of routes. Earlier routes take precedence.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Compile all configured routes, preserving declaration order.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteError> {
        let routes = configs
            .iter()
            .map(Route::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    /// Return the first route that matches `path`.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.pattern.matches(path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
