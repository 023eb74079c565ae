use crate::manifest::{Manifest, ObjectRef};

/// Errors surfaced by every manifold stage.
///
/// Leaf filters, transformers and renderers report failures as
/// `anyhow::Error`; the stage that invoked them wraps the cause into one of
/// these variants so callers can match on the kind and still reach the root
/// cause through `source()`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid renderer at index {index}: {reason}")]
    InvalidRenderer { index: usize, reason: String },

    #[error("renderer {name:?} failed")]
    Renderer {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("filter failed for {object}")]
    Filter {
        object: ObjectRef,
        document: Box<Manifest>,
        #[source]
        source: anyhow::Error,
    },

    #[error("transformer failed for {object}")]
    Transformer {
        object: ObjectRef,
        document: Box<Manifest>,
        #[source]
        source: anyhow::Error,
    },

    #[error("error executing expression {expression:?}")]
    Expression {
        expression: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("expression {expression:?} must return a boolean, got {got}")]
    NotBoolean { expression: String, got: &'static str },

    #[error("manifest must be a JSON object, got {got}")]
    NotAnObject { got: &'static str },

    #[error("serializing resource: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a filter cause, keeping cancellation errors as they are.
    pub fn filter(doc: Manifest, cause: anyhow::Error) -> Self {
        let source = match cause.downcast::<Error>() {
            Ok(e) if e.is_cancellation() => return e,
            Ok(e) => e.into(),
            Err(cause) => cause,
        };
        Error::Filter { object: doc.object_ref(), document: Box::new(doc), source }
    }

    /// Wrap a transformer cause, keeping cancellation errors as they are.
    pub fn transformer(doc: Manifest, cause: anyhow::Error) -> Self {
        let source = match cause.downcast::<Error>() {
            Ok(e) if e.is_cancellation() => return e,
            Ok(e) => e.into(),
            Err(cause) => cause,
        };
        Error::Transformer { object: doc.object_ref(), document: Box::new(doc), source }
    }

    /// Wrap a renderer cause, keeping cancellation errors as they are.
    pub fn renderer(name: &str, cause: anyhow::Error) -> Self {
        let source = match cause.downcast::<Error>() {
            Ok(e) if e.is_cancellation() => return e,
            Ok(e) => e.into(),
            Err(cause) => cause,
        };
        Error::Renderer { name: name.to_string(), source }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// The document a filter or transformer failed on, if any.
    pub fn document(&self) -> Option<&Manifest> {
        match self {
            Error::Filter { document, .. } | Error::Transformer { document, .. } => Some(document.as_ref()),
            _ => None,
        }
    }

    /// Structural identity of the failing document, if any.
    pub fn object(&self) -> Option<&ObjectRef> {
        match self {
            Error::Filter { object, .. } | Error::Transformer { object, .. } => Some(object),
            _ => None,
        }
    }
}

/// JSON type name used in error messages.
pub fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
