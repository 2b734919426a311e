//! Path template matching.
//!
//! # Responsibilities
//! - Parse path templates (`/signup`, `/posts/**`)
//! - Match request paths segment by segment (case-sensitive)
//! - Combine templates of one route with OR semantics
//!
//! # Design Decisions
//! - Exact templates compare the full segment sequence; `/signup` does not
//!   match `/signup/` (no trailing slash normalization)
//! - The only wildcard is a trailing `/**`, which matches the prefix itself
//!   and any number of further segments
//! - No regex to guarantee O(n) matching

use std::fmt;

use thiserror::Error;

/// Error returned when a path template cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("path template is empty")]
    Empty,
    #[error("path template `{0}` must start with `/`")]
    MissingLeadingSlash(String),
    #[error("path template `{0}` must not contain a query or fragment")]
    QueryOrFragment(String),
    #[error("path template `{0}` uses `*` outside a trailing `/**`")]
    UnsupportedWildcard(String),
}

/// A single path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTemplate {
    /// Matches only a path with exactly these segments.
    Exact(Vec<String>),
    /// Matches a path whose leading segments equal these, followed by zero
    /// or more further segments.
    Wildcard(Vec<String>),
}

impl PathTemplate {
    /// Parse a template string.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::Empty);
        }
        if !template.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(template.to_string()));
        }
        if template.contains(['?', '#']) {
            return Err(PatternError::QueryOrFragment(template.to_string()));
        }

        let (literal, wildcard) = match template.strip_suffix("/**") {
            Some(prefix) => (prefix, true),
            None => (template, false),
        };
        if literal.contains('*') {
            return Err(PatternError::UnsupportedWildcard(template.to_string()));
        }

        if wildcard {
            // "/**" leaves an empty literal: every path matches.
            let prefix = if literal.is_empty() {
                Vec::new()
            } else {
                split_segments(literal)
            };
            Ok(Self::Wildcard(prefix))
        } else {
            Ok(Self::Exact(split_segments(literal)))
        }
    }

    /// Returns true if `path` matches this template.
    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let mut actual = rest.split('/');

        match self {
            Self::Exact(expected) => expected.iter().map(String::as_str).eq(actual),
            Self::Wildcard(prefix) => prefix
                .iter()
                .all(|segment| actual.next() == Some(segment.as_str())),
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(segments) => write!(f, "/{}", segments.join("/")),
            Self::Wildcard(prefix) if prefix.is_empty() => write!(f, "/**"),
            Self::Wildcard(prefix) => write!(f, "/{}/**", prefix.join("/")),
        }
    }
}

fn split_segments(path: &str) -> Vec<String> {
    path[1..].split('/').map(str::to_string).collect()
}

/// One or more templates; matches if any template matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    templates: Vec<PathTemplate>,
}

impl RoutePattern {
    /// Parse every template, failing on the first invalid one.
    pub fn parse<I, S>(templates: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let templates = templates
            .into_iter()
            .map(|t| PathTemplate::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { templates })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.templates.iter().any(|t| t.matches(path))
    }

    pub fn templates(&self) -> &[PathTemplate] {
        &self.templates
    }
}
