//! Request dispatch.
//!
//! An [`App`] owns the route table and the optional static-files root, and
//! runs the per-request lifecycle: route lookup, handler invocation with a
//! fresh context, failure containment, and the static/404 fallback. All
//! handler-originated failures are contained here; the adapter above only
//! ever sees a well-formed response.

use crate::config::Config;
use crate::context::{Environment, RequestContext};
use crate::error::{BoxError, DispatchFailure, RenderError};
use crate::http::response::{self, Response};
use crate::logger;
use crate::routing::Router;
use crate::static_files::StaticFiles;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

/// One application: a router built at startup plus optional static fallback.
///
/// `handle` takes `&self` and per-request state lives entirely in the
/// [`RequestContext`], so one `App` is safely shared across concurrent
/// workers.
pub struct App {
    router: Router,
    files: Option<StaticFiles>,
}

impl App {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router,
            files: None,
        }
    }

    /// Configure the static files root. The directory must exist; it is
    /// canonicalized now and read-only afterwards.
    pub fn files_dir(mut self, dir: impl AsRef<Path>) -> io::Result<Self> {
        self.files = Some(StaticFiles::new(dir)?);
        Ok(self)
    }

    #[must_use]
    pub const fn static_files(&self) -> Option<&StaticFiles> {
        self.files.as_ref()
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.router.len()
    }

    /// Adapter entry point: serve one request described by its environment.
    ///
    /// Reads `REQUEST_METHOD` and `PATH_INFO`; missing keys fall through to
    /// the 404 path rather than failing.
    pub async fn handle(&self, environment: Environment) -> Response {
        let verb = environment
            .get("REQUEST_METHOD")
            .cloned()
            .unwrap_or_default();
        let path = environment.get("PATH_INFO").cloned().unwrap_or_default();
        self.dispatch(&verb, &path, environment).await
    }

    async fn dispatch(&self, verb: &str, path: &str, environment: Environment) -> Response {
        let Some(matched) = self.router.match_route(verb, path) else {
            return match &self.files {
                Some(files) => files.resolve(path).await,
                None => response::not_found(),
            };
        };

        let mut ctx = RequestContext::new(matched.params, environment);
        let outcome = catch_unwind(AssertUnwindSafe(|| (matched.handler)(&mut ctx)));

        let failure = match outcome {
            Ok(Ok(())) if ctx.has_response() => None,
            Ok(Ok(())) => Some(DispatchFailure::NoResponse),
            Ok(Err(err)) => Some(classify(err)),
            Err(payload) => Some(DispatchFailure::Panic(panic_message(payload.as_ref()))),
        };

        match failure {
            None => ctx.into_response().unwrap_or_else(response::internal_error),
            Some(failure) => {
                log_failure(verb, path, &failure);
                response::internal_error()
            }
        }
    }

    /// Initialize logging, build a tokio runtime, and serve on the bundled
    /// adapter. Blocks until the server loop exits.
    pub fn run(self, config: &Config) -> Result<(), BoxError> {
        logger::init(config)?;

        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.enable_all();
        if let Some(workers) = config.server.workers {
            builder.worker_threads(workers);
        }
        let runtime = builder.build()?;

        runtime.block_on(crate::server::serve(Arc::new(self), config))
    }
}

/// Split render conflicts out of the handler's error channel so they can be
/// logged as contract violations.
fn classify(err: BoxError) -> DispatchFailure {
    match err.downcast::<RenderError>() {
        Ok(conflict) => DispatchFailure::RenderConflict(*conflict),
        Err(other) => DispatchFailure::Handler(other),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "opaque panic payload".to_string())
}

fn log_failure(verb: &str, path: &str, failure: &DispatchFailure) {
    match failure {
        DispatchFailure::Handler(err) => {
            logger::log_handler_failure(&format!("{verb} {path}: {}", error_chain(err.as_ref())));
        }
        DispatchFailure::Panic(_) => {
            logger::log_handler_failure(&format!("{verb} {path}: {failure}"));
        }
        DispatchFailure::NoResponse | DispatchFailure::RenderConflict(_) => {
            logger::log_contract_violation(&format!("{verb} {path}: {failure}"));
        }
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Render;

    fn env_for(verb: &str, path: &str) -> Environment {
        let mut environment = Environment::new();
        environment.insert("REQUEST_METHOD".to_string(), verb.to_string());
        environment.insert("PATH_INFO".to_string(), path.to_string());
        environment
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.body.into_bytes().await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn hello_world() {
        let mut router = Router::new();
        router.get("/", |ctx| {
            ctx.render(Render::html("Hello World!"))?;
            Ok(())
        });
        let app = App::new(router);

        let response = app.handle(env_for("GET", "/")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        assert_eq!(body_text(response).await, "Hello World!");
    }

    #[tokio::test]
    async fn route_params_reach_the_handler() {
        let mut router = Router::new();
        router.get("/say/:value", |ctx| {
            let value = ctx.param("value").unwrap_or("?").to_string();
            ctx.render(Render::html(value))?;
            Ok(())
        });
        let app = App::new(router);

        let response = app.handle(env_for("GET", "/say/there")).await;
        assert_eq!(body_text(response).await, "there");
    }

    #[tokio::test]
    async fn verbs_route_to_their_own_handlers() {
        let mut router = Router::new();
        router.get("/", |ctx| Ok(ctx.render(Render::html("get"))?));
        router.post("/", |ctx| Ok(ctx.render(Render::html("post"))?));
        router.put("/", |ctx| Ok(ctx.render(Render::html("put"))?));
        router.delete("/", |ctx| Ok(ctx.render(Render::html("delete"))?));
        let app = App::new(router);

        for verb in ["get", "post", "put", "delete"] {
            let response = app.handle(env_for(&verb.to_uppercase(), "/")).await;
            assert_eq!(body_text(response).await, verb);
        }
    }

    #[tokio::test]
    async fn miss_without_static_root_is_404() {
        let app = App::new(Router::new());
        let response = app.handle(env_for("GET", "/nope")).await;
        assert_eq!(response.status, 404);
        assert_eq!(response.header("Content-Type"), Some("text/html"));
    }

    #[tokio::test]
    async fn handler_error_becomes_generic_500() {
        let mut router = Router::new();
        router.get("/boom", |_ctx| Err("backend exploded".into()));
        let app = App::new(router);

        let response = app.handle(env_for("GET", "/boom")).await;
        assert_eq!(response.status, 500);
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        // generic page only, no failure detail
        let body = body_text(response).await;
        assert!(body.contains("500"));
        assert!(!body.contains("backend exploded"));
    }

    #[tokio::test]
    async fn no_render_becomes_500_not_empty_200() {
        let mut router = Router::new();
        router.get("/forgot", |_ctx| Ok(()));
        let app = App::new(router);

        let response = app.handle(env_for("GET", "/forgot")).await;
        assert_eq!(response.status, 500);
        assert!(!body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn double_render_becomes_500() {
        let mut router = Router::new();
        router.get("/twice", |ctx| {
            ctx.render(Render::html("one"))?;
            ctx.render(Render::html("two"))?;
            Ok(())
        });
        let app = App::new(router);

        let response = app.handle(env_for("GET", "/twice")).await;
        assert_eq!(response.status, 500);
        // never a partially merged response
        let body = body_text(response).await;
        assert!(!body.contains("one"));
        assert!(!body.contains("two"));
    }

    #[tokio::test]
    async fn handler_panic_becomes_500() {
        let mut router = Router::new();
        router.get("/panic", |_ctx| panic!("unexpected"));
        let app = App::new(router);

        let response = app.handle(env_for("GET", "/panic")).await;
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn static_fallback_serves_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img/a.jpg"), b"jpeg bytes").unwrap();

        let mut router = Router::new();
        router.get("/", |ctx| Ok(ctx.render(Render::html("home"))?));
        let app = App::new(router).files_dir(dir.path()).unwrap();

        let response = app.handle(env_for("GET", "/img/a.jpg")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("image/jpeg"));

        // routes still win over files
        let response = app.handle(env_for("GET", "/")).await;
        assert_eq!(body_text(response).await, "home");
    }

    #[tokio::test]
    async fn handlers_may_send_files_outside_the_static_root() {
        let outer = tempfile::tempdir().unwrap();
        let secret = outer.path().join("passwd.txt");
        std::fs::write(&secret, b"SUPER SECRET").unwrap();
        let root = outer.path().join("public");
        std::fs::create_dir(&root).unwrap();

        let mut router = Router::new();
        let secret_path = secret.clone();
        router.get("/authorized", move |ctx| {
            ctx.send_file(&secret_path)?;
            Ok(())
        });
        let app = App::new(router).files_dir(&root).unwrap();

        // the explicit handler may reach outside the sandbox
        let response = app.handle(env_for("GET", "/authorized")).await;
        assert_eq!(response.status, 200);
        assert_eq!(body_text(response).await, "SUPER SECRET");

        // the fallback may not
        let response = app.handle(env_for("GET", "/../passwd.txt")).await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn traversal_through_dispatch_is_404() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("passwd"), b"root:x:0:0").unwrap();
        let root = outer.path().join("public");
        std::fs::create_dir(&root).unwrap();

        let app = App::new(Router::new()).files_dir(&root).unwrap();
        let response = app.handle(env_for("GET", "/../passwd")).await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn missing_static_root_fails_fast() {
        let result = App::new(Router::new()).files_dir("/definitely/not/here");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn environment_passes_through_to_handlers() {
        let mut router = Router::new();
        router.get("/env", |ctx| {
            let ua = ctx.env("HTTP_USER_AGENT").unwrap_or("-").to_string();
            ctx.render(Render::text(ua))?;
            Ok(())
        });
        let app = App::new(router);

        let mut environment = env_for("GET", "/env");
        environment.insert("HTTP_USER_AGENT".to_string(), "curl/8".to_string());
        let response = app.handle(environment).await;
        assert_eq!(body_text(response).await, "curl/8");
    }

    #[tokio::test]
    async fn missing_method_and_path_fall_through_to_404() {
        let mut router = Router::new();
        router.get("/", |ctx| Ok(ctx.render(Render::html("home"))?));
        let app = App::new(router);

        let response = app.handle(Environment::new()).await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn concurrent_dispatches_are_isolated() {
        let mut router = Router::new();
        router.get("/say/:value", |ctx| {
            let value = ctx.param("value").unwrap_or("?").to_string();
            ctx.render(Render::html(value))?;
            Ok(())
        });
        let app = Arc::new(App::new(router));

        let mut tasks = Vec::new();
        for i in 0..32 {
            let app = Arc::clone(&app);
            tasks.push(tokio::spawn(async move {
                let response = app.handle(env_for("GET", &format!("/say/v{i}"))).await;
                (i, body_text(response).await)
            }));
        }
        for task in tasks {
            let (i, body) = task.await.unwrap();
            assert_eq!(body, format!("v{i}"));
        }
    }
}
