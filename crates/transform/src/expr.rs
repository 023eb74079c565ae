//! Adapter from an external expression evaluator to the [`Transformer`]
//! contract: the expression output replaces the manifest.
//!
//! [`Transformer`]: manifold_core::Transformer

use std::sync::Arc;

use manifold_core::{transformer_fn, Error, Manifest, SharedTransformer};
use manifold_filter::expr::Expression;

/// The expression must evaluate to an object; anything else fails with
/// [`Error::NotAnObject`].
pub fn transformer<E: Expression + 'static>(expression: E) -> SharedTransformer {
    let expression = Arc::new(expression);
    transformer_fn(move |_, doc| {
        let out = expression
            .evaluate(&doc.to_value())
            .map_err(|source| Error::Expression { expression: expression.source().to_string(), source })?;
        Ok(Manifest::try_from(out)?)
    })
}
