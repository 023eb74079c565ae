//! Adapter from an external expression evaluator to the [`Filter`] contract.
//!
//! The evaluator itself is pluggable through [`Expression`]; [`Pointer`] and
//! [`Equals`] are the built-in minimal evaluators.
//!
//! [`Filter`]: manifold_core::Filter

use std::sync::Arc;

use anyhow::{anyhow, Result};
use manifold_core::{filter_fn, json_type, Error, SharedFilter};
use serde_json::Value;

/// A compiled expression evaluated against one manifest rendered as JSON.
pub trait Expression: Send + Sync {
    /// Expression text, used in error messages.
    fn source(&self) -> &str;

    fn evaluate(&self, input: &Value) -> Result<Value>;
}

/// RFC 6901 lookup; absent paths evaluate to `null`.
#[derive(Debug, Clone)]
pub struct Pointer {
    path: String,
}

impl Pointer {
    pub fn new(path: &str) -> Result<Self> {
        if !path.is_empty() && !path.starts_with('/') {
            return Err(anyhow!("invalid JSON pointer {:?}: must be empty or start with '/'", path));
        }
        Ok(Self { path: path.to_string() })
    }
}

impl Expression for Pointer {
    fn source(&self) -> &str { &self.path }

    fn evaluate(&self, input: &Value) -> Result<Value> {
        Ok(input.pointer(&self.path).cloned().unwrap_or(Value::Null))
    }
}

/// `true` when the value at a pointer equals a literal.
#[derive(Debug, Clone)]
pub struct Equals {
    pointer: Pointer,
    expected: Value,
    source: String,
}

impl Equals {
    pub fn new(path: &str, expected: Value) -> Result<Self> {
        let source = format!("{} == {}", path, expected);
        Ok(Self { pointer: Pointer::new(path)?, expected, source })
    }
}

impl Expression for Equals {
    fn source(&self) -> &str { &self.source }

    fn evaluate(&self, input: &Value) -> Result<Value> {
        Ok(Value::Bool(self.pointer.evaluate(input)? == self.expected))
    }
}

/// Keep manifests for which `expression` evaluates to `true`.
///
/// Evaluation failures surface as [`Error::Expression`]; a non-boolean
/// result is a contract violation reported as [`Error::NotBoolean`].
pub fn filter<E: Expression + 'static>(expression: E) -> SharedFilter {
    let expression = Arc::new(expression);
    filter_fn(move |_, doc| {
        let out = expression
            .evaluate(&doc.to_value())
            .map_err(|source| Error::Expression { expression: expression.source().to_string(), source })?;
        match out {
            Value::Bool(b) => Ok(b),
            other => Err(Error::NotBoolean { expression: expression.source().to_string(), got: json_type(&other) }.into()),
        }
    })
}
