//! # platen-renderer
//!
//! Streaming render-file plugin: resolves a template engine per in-flight
//! file, merges global data, call-time locals and per-file data into one
//! rendering context, and delegates to the host's render operation, with
//! per-transform batch bookkeeping for error diagnostics.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures::{stream, StreamExt};
//! use platen_core::{File, FileObject};
//! use platen_renderer::{App, RenderFilePlugin, RenderParams};
//!
//! async fn render_one() {
//!     let mut app = App::new();
//!     app.engines_mut().register_noop();
//!     let app = Arc::new(app);
//!
//!     if let Some(rf) = RenderFilePlugin::new().install(app) {
//!         let input = stream::iter(vec![FileObject::from(File::new("a.hbs", "hello"))]);
//!         let rendered: Vec<_> = rf.transform(RenderParams::default()).apply(input).collect().await;
//!         for item in rendered {
//!             match item {
//!                 Ok(file) => println!("{}", file.path().display()),
//!                 Err(err) => eprintln!("{err}"),
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;

pub use context::{build_context, CollectionRef, Locals};
pub use engine::resolve_engine;
pub use error::{BatchSnapshot, RenderError};
pub use host::{App, Host, OnLoadHook, ON_LOAD};
pub use pipeline::{FileTransform, RenderFile, RenderFilePlugin, RenderParams, PLUGIN_NAME};
