//! Manifold core: manifest model, execution context, stage contracts and errors.
//!
//! Every other manifold crate builds on the three contracts defined here:
//! [`Filter`] decides whether a manifest survives, [`Transformer`] maps one
//! manifest to another and [`Renderer`] produces manifests from a value bag.

#![forbid(unsafe_code)]

mod context;
mod contract;
mod error;
mod manifest;
mod values;

pub use context::Context;
pub use contract::{
    filter_fn, transformer_fn, validate_renderer, Filter, FilterFn, Renderer, SharedFilter, SharedRenderer,
    SharedTransformer, Transformer, TransformerFn,
};
pub use error::{json_type, Error, Result};
pub use manifest::{Manifest, ObjectRef, SOURCE_FILE_ANNOTATION, SOURCE_PATH_ANNOTATION, SOURCE_TYPE_ANNOTATION};
pub use values::{merge_values, Values};

pub mod prelude {
    pub use super::{
        filter_fn, transformer_fn, Context, Error, Filter, Manifest, Renderer, SharedFilter, SharedRenderer,
        SharedTransformer, Transformer, Values,
    };
}
