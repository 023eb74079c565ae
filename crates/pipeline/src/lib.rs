//! Manifold pipeline executor: an ordered filter pass followed by an ordered
//! transformer pass over a batch of manifests.
//!
//! Every pass is all-or-nothing. The first failure aborts the batch and the
//! caller gets the error (carrying the offending manifest) instead of a
//! partial result.

#![forbid(unsafe_code)]

use manifold_core::{Context, Error, Manifest, Result, SharedFilter, SharedTransformer};
use metrics::counter;
use tracing::debug;

/// Keep manifests that pass every filter, in their original order.
pub fn apply_filters(ctx: &Context, docs: Vec<Manifest>, filters: &[SharedFilter]) -> Result<Vec<Manifest>> {
    ctx.check()?;
    if filters.is_empty() {
        return Ok(docs);
    }
    let total = docs.len();
    let mut kept = Vec::with_capacity(total);
    for doc in docs {
        ctx.check()?;
        match manifold_filter::all(ctx, &doc, filters) {
            Ok(true) => kept.push(doc),
            Ok(false) => {}
            Err(e) => return Err(Error::filter(doc, e)),
        }
    }
    let dropped = total - kept.len();
    if dropped > 0 {
        counter!("pipeline_dropped_total", dropped as u64);
    }
    debug!(total, kept = kept.len(), filters = filters.len(), "pipeline: filters applied");
    Ok(kept)
}

/// Replace each manifest with the output of the transformer chain.
pub fn apply_transformers(ctx: &Context, docs: Vec<Manifest>, transformers: &[SharedTransformer]) -> Result<Vec<Manifest>> {
    ctx.check()?;
    if transformers.is_empty() {
        return Ok(docs);
    }
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        ctx.check()?;
        match manifold_transform::run_chain(ctx, &doc, transformers) {
            Ok(next) => out.push(next),
            Err(e) => return Err(Error::transformer(doc, e)),
        }
    }
    debug!(total = out.len(), transformers = transformers.len(), "pipeline: transformers applied");
    Ok(out)
}

/// Filters first, then transformers on the survivors.
pub fn apply(
    ctx: &Context,
    docs: Vec<Manifest>,
    filters: &[SharedFilter],
    transformers: &[SharedTransformer],
) -> Result<Vec<Manifest>> {
    let kept = apply_filters(ctx, docs, filters)?;
    apply_transformers(ctx, kept, transformers)
}
