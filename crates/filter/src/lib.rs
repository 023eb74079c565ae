//! Manifold filters: boolean combinators over [`Filter`]s plus ready-made
//! metadata and expression filters.
//!
//! Combinators evaluate their children in argument order, stop as soon as
//! the outcome is known and hand child errors back untouched. They hold no
//! state beyond the children they were built from.

#![forbid(unsafe_code)]

use std::sync::Arc;

use manifold_core::{Context, Filter, Manifest, SharedFilter};

pub mod expr;
pub mod meta;

/// Passes when every child passes. Empty list passes everything.
pub struct And(Vec<SharedFilter>);

/// Passes when any child passes. Empty list drops everything.
pub struct Or(Vec<SharedFilter>);

/// Negates the child's decision; errors are not negated.
pub struct Not(SharedFilter);

/// `then`'s decision when `condition` holds, otherwise drop.
pub struct When {
    condition: SharedFilter,
    then: SharedFilter,
}

pub fn and(filters: impl IntoIterator<Item = SharedFilter>) -> SharedFilter {
    Arc::new(And(filters.into_iter().collect()))
}

pub fn or(filters: impl IntoIterator<Item = SharedFilter>) -> SharedFilter {
    Arc::new(Or(filters.into_iter().collect()))
}

pub fn not(filter: SharedFilter) -> SharedFilter {
    Arc::new(Not(filter))
}

pub fn when(condition: SharedFilter, then: SharedFilter) -> SharedFilter {
    Arc::new(When { condition, then })
}

/// AND over a borrowed list; the pipeline executor shares this with [`And`].
pub fn all(ctx: &Context, doc: &Manifest, filters: &[SharedFilter]) -> anyhow::Result<bool> {
    for f in filters {
        if !f.filter(ctx, doc)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// OR over a borrowed list.
pub fn any(ctx: &Context, doc: &Manifest, filters: &[SharedFilter]) -> anyhow::Result<bool> {
    for f in filters {
        if f.filter(ctx, doc)? {
            return Ok(true);
        }
    }
    Ok(false)
}

impl Filter for And {
    fn filter(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<bool> { all(ctx, doc, &self.0) }
}

impl Filter for Or {
    fn filter(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<bool> { any(ctx, doc, &self.0) }
}

impl Filter for Not {
    fn filter(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<bool> { Ok(!self.0.filter(ctx, doc)?) }
}

impl Filter for When {
    fn filter(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<bool> {
        if !self.condition.filter(ctx, doc)? {
            return Ok(false);
        }
        self.then.filter(ctx, doc)
    }
}
