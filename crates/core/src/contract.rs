use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::values::Values;

/// Keep/drop decision for a single manifest.
pub trait Filter: Send + Sync {
    fn filter(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<bool>;
}

/// Maps one manifest to a new one. Implementations must not rely on
/// mutating the input; they return an owned value instead.
pub trait Transformer: Send + Sync {
    fn transform(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<Manifest>;
}

pub type SharedFilter = Arc<dyn Filter>;
pub type SharedTransformer = Arc<dyn Transformer>;
pub type SharedRenderer = Arc<dyn Renderer>;

/// External producer of manifests (template engine, kustomize, raw files...).
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Non-empty identifier used in logs and errors.
    fn name(&self) -> &str;

    async fn process(&self, ctx: &Context, values: &Values) -> anyhow::Result<Vec<Manifest>>;
}

/// Reject renderers that cannot be identified in diagnostics.
pub fn validate_renderer(index: usize, renderer: &dyn Renderer) -> Result<()> {
    if renderer.name().trim().is_empty() {
        return Err(Error::InvalidRenderer { index, reason: "renderer must return a non-empty name".into() });
    }
    Ok(())
}

/// Filter backed by a closure.
pub struct FilterFn<F>(F);

impl<F> Filter for FilterFn<F>
where
    F: Fn(&Context, &Manifest) -> anyhow::Result<bool> + Send + Sync,
{
    fn filter(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<bool> { (self.0)(ctx, doc) }
}

impl<F> fmt::Debug for FilterFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("FilterFn") }
}

pub fn filter_fn<F>(f: F) -> SharedFilter
where
    F: Fn(&Context, &Manifest) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    Arc::new(FilterFn(f))
}

/// Transformer backed by a closure.
pub struct TransformerFn<F>(F);

impl<F> Transformer for TransformerFn<F>
where
    F: Fn(&Context, &Manifest) -> anyhow::Result<Manifest> + Send + Sync,
{
    fn transform(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<Manifest> { (self.0)(ctx, doc) }
}

impl<F> fmt::Debug for TransformerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("TransformerFn") }
}

pub fn transformer_fn<F>(f: F) -> SharedTransformer
where
    F: Fn(&Context, &Manifest) -> anyhow::Result<Manifest> + Send + Sync + 'static,
{
    Arc::new(TransformerFn(f))
}
