//! Manifold transformers: composition over [`Transformer`]s plus ready-made
//! metadata and expression transformers.

#![forbid(unsafe_code)]

use std::sync::Arc;

use manifold_core::{Context, Manifest, SharedFilter, SharedTransformer, Transformer};

pub mod expr;
pub mod meta;

/// Applies each child to the previous child's output.
pub struct Chain(Vec<SharedTransformer>);

/// Applies `then` only when `condition` holds.
pub struct When {
    condition: SharedFilter,
    then: SharedTransformer,
}

/// One branch of a [`Switch`].
#[derive(Clone)]
pub struct Case {
    pub when: SharedFilter,
    pub then: SharedTransformer,
}

impl Case {
    pub fn new(when: SharedFilter, then: SharedTransformer) -> Self { Self { when, then } }
}

/// First matching case wins; `default` (if any) when nothing matches.
pub struct Switch {
    cases: Vec<Case>,
    default: Option<SharedTransformer>,
}

pub fn chain(transformers: impl IntoIterator<Item = SharedTransformer>) -> SharedTransformer {
    Arc::new(Chain(transformers.into_iter().collect()))
}

pub fn when(condition: SharedFilter, then: SharedTransformer) -> SharedTransformer {
    Arc::new(When { condition, then })
}

pub fn switch(cases: impl IntoIterator<Item = Case>, default: Option<SharedTransformer>) -> SharedTransformer {
    Arc::new(Switch { cases: cases.into_iter().collect(), default })
}

/// Sequential composition over a borrowed list; empty list returns a copy of
/// the input. The first failure is returned and partial output discarded.
pub fn run_chain(ctx: &Context, doc: &Manifest, transformers: &[SharedTransformer]) -> anyhow::Result<Manifest> {
    let Some((first, rest)) = transformers.split_first() else {
        return Ok(doc.clone());
    };
    let mut cur = first.transform(ctx, doc)?;
    for t in rest {
        cur = t.transform(ctx, &cur)?;
    }
    Ok(cur)
}

impl Transformer for Chain {
    fn transform(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<Manifest> { run_chain(ctx, doc, &self.0) }
}

impl Transformer for When {
    fn transform(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<Manifest> {
        if self.condition.filter(ctx, doc)? {
            self.then.transform(ctx, doc)
        } else {
            Ok(doc.clone())
        }
    }
}

impl Transformer for Switch {
    fn transform(&self, ctx: &Context, doc: &Manifest) -> anyhow::Result<Manifest> {
        for case in &self.cases {
            if case.when.filter(ctx, doc)? {
                return case.then.transform(ctx, doc);
            }
        }
        match &self.default {
            Some(t) => t.transform(ctx, doc),
            None => Ok(doc.clone()),
        }
    }
}
