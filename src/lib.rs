//! crossbar — a minimal embeddable HTTP routing and dispatch framework.
//!
//! Applications register verb + pattern handlers on a [`Router`], wrap it in
//! an [`App`], and either serve it with the bundled tokio/hyper adapter or
//! drive [`App::handle`] from their own server glue. Requests that match no
//! route can fall back to sandboxed static file serving.
//!
//! ```no_run
//! use crossbar::{App, Config, Render, Router};
//!
//! fn main() -> Result<(), crossbar::BoxError> {
//!     let mut router = Router::new();
//!     router.get("/", |ctx| {
//!         ctx.render(Render::html("<html><body>Hello World!</body></html>"))?;
//!         Ok(())
//!     });
//!     router.get("/say/:value", |ctx| {
//!         let value = ctx.param("value").unwrap_or("?").to_string();
//!         ctx.render(Render::html(value))?;
//!         Ok(())
//!     });
//!
//!     let app = App::new(router).files_dir("public")?;
//!     app.run(&Config::load()?)
//! }
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod static_files;

pub use app::App;
pub use config::Config;
pub use context::{Environment, Render, RequestContext};
pub use error::{BoxError, DispatchFailure, RenderError};
pub use http::response::{Body, Response};
pub use routing::{Params, PathPattern, Router};
pub use static_files::StaticFiles;
