//! Ordered route table with first-match resolution.

use crate::context::RequestContext;
use crate::error::BoxError;
use crate::routing::pattern::{split_segments, Params, PathPattern};
use std::sync::Arc;

/// A route handler: receives the request context and communicates its result
/// through `render` (or `send_file`) on that context.
pub type HandlerFn = dyn Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync;

/// One registered route: verb, parsed pattern, handler. Immutable once added.
struct Route {
    verb: String,
    pattern: PathPattern,
    handler: Arc<HandlerFn>,
}

/// A successful lookup: the handler plus the parameters its pattern bound.
pub struct RouteMatch<'a> {
    pub handler: &'a HandlerFn,
    pub params: Params,
}

/// Ordered collection of routes.
///
/// Built during application setup and read-only while serving; concurrent
/// lookups need no locking. Registration order is semantically significant:
/// when two patterns could both match a request, the earlier registration
/// wins, never the more specific one.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. No uniqueness check: duplicate shapes may coexist and
    /// are disambiguated purely by registration order.
    pub fn register<H>(&mut self, verb: &str, template: &str, handler: H)
    where
        H: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            verb: verb.to_string(),
            pattern: PathPattern::parse(template),
            handler: Arc::new(handler),
        });
    }

    /// Register a GET route.
    pub fn get<H>(&mut self, template: &str, handler: H)
    where
        H: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register("GET", template, handler);
    }

    /// Register a PUT route.
    pub fn put<H>(&mut self, template: &str, handler: H)
    where
        H: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register("PUT", template, handler);
    }

    /// Register a POST route.
    pub fn post<H>(&mut self, template: &str, handler: H)
    where
        H: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register("POST", template, handler);
    }

    /// Register a DELETE route.
    pub fn delete<H>(&mut self, template: &str, handler: H)
    where
        H: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register("DELETE", template, handler);
    }

    /// Find the first registered route matching the verb and path.
    ///
    /// A miss is an ordinary `None`, never an error.
    #[must_use]
    pub fn match_route(&self, verb: &str, path: &str) -> Option<RouteMatch<'_>> {
        let parts = split_segments(path);

        self.routes
            .iter()
            .filter(|route| route.verb == verb)
            .find_map(|route| {
                route.pattern.matches(&parts).map(|params| RouteMatch {
                    handler: route.handler.as_ref(),
                    params,
                })
            })
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
