//! Manifold engine: invokes renderers sequentially or in parallel and runs
//! their output through a two-layer pipeline (engine-level stages first,
//! then per-render stages).
//!
//! ```ignore
//! let engine = Engine::builder().renderer(helm).filter(manifold_filter::meta::kind(&["Deployment"])).build()?;
//! let docs = engine.render(&Context::new(), RenderOptions::new().with_values(values)).await?;
//! ```

#![forbid(unsafe_code)]

mod engine;
mod options;

pub use engine::Engine;
pub use options::{EngineBuilder, Options, RenderOptions};
