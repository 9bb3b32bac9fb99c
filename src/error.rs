use thiserror::Error;

/// Errors raised while building a [`Coder`](crate::Coder) or while
/// converting typed values to and from the value tree.
///
/// Missing handlers, unmatched decode conditions and unparseable numbers
/// are not errors: decoding simply leaves those fields out.
#[derive(Debug, Error)]
pub enum Error {
    /// A handler was stamped with a path a second time. This happens when
    /// the same handler is placed at two positions of a schema, or is
    /// reused from a schema that already belongs to another coder.
    #[error(
        "path already initialized for handler `{query_key}`: `{existing}` (attempted `{attempted}`)"
    )]
    PathAlreadySet {
        query_key: String,
        existing: String,
        attempted: String,
    },

    /// The shape of the encoded object disagrees with the schema at `path`:
    /// either a nested object where the schema has a field handler, or a
    /// scalar where the schema expects a nested mapping.
    #[error("unexpected value at `{path}`: {found}")]
    UnexpectedValue { path: String, found: String },

    /// Converting a typed value to or from the value tree failed.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unexpected_value(path: &[&str], found: &serde_json::Value) -> Self {
        let found = match found {
            serde_json::Value::Object(_) => "nested object".to_string(),
            serde_json::Value::Array(_) => "array".to_string(),
            other => format!("scalar {other}"),
        };
        Error::UnexpectedValue {
            path: path.join("."),
            found,
        }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
