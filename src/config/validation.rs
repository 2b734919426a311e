//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route names, path templates and upstream URLs
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::{PathTemplate, PatternError, RouteError, Upstream, UpstreamError};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{0} has an empty name")]
    EmptyRouteName(usize),
    #[error("route name `{0}` is declared more than once")]
    DuplicateRouteName(String),
    #[error("route `{0}` has no paths")]
    NoPaths(String),
    #[error("route `{route}`: {source}")]
    Path {
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
    #[error("default_upstream: {0}")]
    DefaultUpstream(#[source] UpstreamError),
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("forwarding.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),
}

impl From<RouteError> for ValidationError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::Pattern { route, source } => Self::Path { route, source },
            RouteError::Upstream { route, source } => Self::Upstream { route, source },
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName(index));
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }

        if route.paths.is_empty() {
            errors.push(ValidationError::NoPaths(route.name.clone()));
        }
        for path in &route.paths {
            if let Err(source) = PathTemplate::parse(path) {
                errors.push(ValidationError::Path {
                    route: route.name.clone(),
                    source,
                });
            }
        }

        if let Err(source) = Upstream::parse(&route.upstream) {
            errors.push(ValidationError::Upstream {
                route: route.name.clone(),
                source,
            });
        }
    }

    if let Some(default) = &config.default_upstream {
        if let Err(e) = Upstream::parse(default) {
            errors.push(ValidationError::DefaultUpstream(e));
        }
    }

    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_ms"));
    }
    if config.timeouts.upstream_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_ms"));
    }
    if config.forwarding.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
