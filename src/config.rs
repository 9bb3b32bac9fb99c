/// Configuration for encoding behavior.
///
/// The `Config` struct customizes how a [`Coder`](crate::Coder) writes
/// querystrings. Decoding accepts either encoding, so the same coder can
/// read strings produced with any `Config`.
///
/// ## Percent encoding
///
/// By default values are percent-encoded the way a URI component is:
/// everything except ASCII alphanumerics and `-_.!~*'()` is escaped, and
/// spaces become `%20`.
///
/// With `use_form_encoding` the stricter
/// `application/x-www-form-urlencoded` set is used instead, and spaces
/// become `+`.
///
/// ```
/// use query_coder::{Coder, Config, FieldHandler, Schema};
/// use serde_json::json;
///
/// let schema = Schema::new().field("name", FieldHandler::new("n"));
///
/// let coder = Coder::<serde_json::Value>::new(schema.clone()).unwrap();
/// assert_eq!(coder.encode_value(&json!({"name": "Carrot City"})).unwrap(), "n=Carrot%20City");
///
/// let config = Config::new().use_form_encoding(true);
/// let coder = Coder::<serde_json::Value>::with_config(schema, config).unwrap();
/// assert_eq!(coder.encode_value(&json!({"name": "Carrot City"})).unwrap(), "n=Carrot+City");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) use_form_encoding: bool,
    pub(crate) leading_question_mark: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            use_form_encoding: cfg!(feature = "default_to_form_encoding"),
            leading_question_mark: false,
        }
    }

    /// Use `application/x-www-form-urlencoded` percent encoding for keys
    /// and values.
    ///
    /// Alternatively, the `default_to_form_encoding` Cargo feature sets
    /// this to `true` by default.
    pub const fn use_form_encoding(mut self, use_form_encoding: bool) -> Self {
        self.use_form_encoding = use_form_encoding;
        self
    }

    /// Prefix non-empty encoded output with `?`, ready to be appended to a
    /// path.
    pub const fn leading_question_mark(mut self, leading_question_mark: bool) -> Self {
        self.leading_question_mark = leading_question_mark;
        self
    }
}

/// Options for a single [`Coder::decode`](crate::Coder::decode) call.
#[derive(Clone, Debug)]
pub struct DecodeOptions<T> {
    /// Seeds the decoded object. Decoded fields are written into it,
    /// everything else is kept as is.
    pub default_value: Option<T>,
}

impl<T> Default for DecodeOptions<T> {
    fn default() -> Self {
        Self {
            default_value: None,
        }
    }
}

impl<T> DecodeOptions<T> {
    pub fn with_default(default_value: T) -> Self {
        Self {
            default_value: Some(default_value),
        }
    }
}
