//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile config rules into an immutable route table
//! - Look up the first matching route for a request path
//! - Rewrite request URIs for the selected upstream
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order; first match wins
//! - Explicit no-match (`Option`) rather than a silent default route

use axum::http::uri::{Authority, InvalidUri, Scheme};
use axum::http::Uri;
use url::Url;

use crate::config::RouteConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// Error raised while compiling route rules.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("route '{route}': invalid target URL '{target}': {source}")]
    InvalidTarget {
        route: String,
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("route '{route}': unsupported target scheme '{scheme}' (only http)")]
    UnsupportedScheme { route: String, scheme: String },

    #[error("route '{route}': target URL has no host")]
    MissingHost { route: String },

    #[error("route '{route}': invalid target authority: {source}")]
    InvalidAuthority {
        route: String,
        #[source]
        source: InvalidUri,
    },
}

/// A compiled route: matcher plus the upstream it forwards to.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    matcher: PathPrefixMatcher,
    authority: Authority,
    strip_prefix: bool,
}

impl Route {
    fn compile(config: &RouteConfig) -> Result<Self, RouteError> {
        let url = Url::parse(&config.target).map_err(|source| RouteError::InvalidTarget {
            route: config.name.clone(),
            target: config.target.clone(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(RouteError::UnsupportedScheme {
                route: config.name.clone(),
                scheme: url.scheme().to_string(),
            });
        }

        let host = url.host_str().ok_or_else(|| RouteError::MissingHost {
            route: config.name.clone(),
        })?;
        let port = url.port_or_known_default().unwrap_or(80);

        let authority: Authority = format!("{}:{}", host, port).parse().map_err(|source| {
            RouteError::InvalidAuthority {
                route: config.name.clone(),
                source,
            }
        })?;

        Ok(Self {
            name: config.name.clone(),
            matcher: PathPrefixMatcher::new(&config.prefix),
            authority,
            strip_prefix: config.strip_prefix,
        })
    }

    /// Route identifier used in logs and metrics labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this route handles the given path.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Build the URI this route forwards to for the given original URI.
    ///
    /// The path is passed through untouched unless the rule asks for the
    /// matched prefix to be stripped; the query string always survives.
    pub fn upstream_uri(&self, original: &Uri) -> Result<Uri, axum::http::Error> {
        let path = if self.strip_prefix {
            let stripped = original
                .path()
                .strip_prefix(self.matcher.prefix())
                .unwrap_or(original.path());
            if stripped.is_empty() {
                "/".to_string()
            } else if stripped.starts_with('/') {
                stripped.to_string()
            } else {
                format!("/{}", stripped)
            }
        } else {
            original.path().to_string()
        };

        let path_and_query = match original.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };

        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

/// Immutable, ordered route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile an ordered rule list. Order is preserved: lookups walk the
    /// table top-to-bottom and the first prefix match wins.
    pub fn from_config(rules: &[RouteConfig]) -> Result<Self, RouteError> {
        let routes = rules
            .iter()
            .map(Route::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    /// Find the first route whose prefix matches the path.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Number of compiled routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
