//! Encoding: object to querystring.

pub(crate) mod encode;

use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::coder::{Coder, Node};
use crate::error::{Error, Result};
use crate::helpers::is_falsy;

use encode::encode_to_string;

impl<T: Serialize> Coder<T> {
    /// Encodes `data` to a querystring.
    ///
    /// `data` is first serialized with `serde`, then walked alongside the
    /// schema. Fields missing from the schema, `None`s, non-encodable
    /// fields and (unless the handler accepts empty values) falsy values
    /// are left out. When two fields share a querystring key, the later
    /// one in object order overwrites the value but the key keeps its
    /// first position.
    ///
    /// Fails with [`Error::UnexpectedValue`] when the shape of `data`
    /// disagrees with the schema.
    pub fn encode(&self, data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        self.encode_value(&value)
    }

    /// Encodes `data` into a generic writer.
    pub fn encode_to_writer<W: Write>(&self, data: &T, writer: &mut W) -> Result<()> {
        let encoded = self.encode(data)?;
        writer.write_all(encoded.as_bytes())?;
        Ok(())
    }
}

impl<T> Coder<T> {
    /// Encodes an already-serialized object. `null` encodes to the empty
    /// string.
    pub fn encode_value(&self, data: &Value) -> Result<String> {
        let mut pairs = IndexMap::new();
        match data {
            Value::Object(object) => {
                self.collect_pairs(object, &self.root, &mut Vec::new(), &mut pairs)?
            }
            Value::Null => {}
            other => {
                tracing::warn!(value = %other, "top-level value is not an object");
                return Err(Error::unexpected_value(&[], other));
            }
        }

        let mut writer = QueryWriter::new(self.config.use_form_encoding);
        if self.config.leading_question_mark && !pairs.is_empty() {
            writer.output.push('?');
        }
        for (key, value) in &pairs {
            writer.write_pair(key, value);
        }
        Ok(writer.output)
    }

    /// Walks `object` in its own key order, looking each key up in the
    /// schema `level`, and gathers `query key -> encoded value`.
    fn collect_pairs<'a>(
        &'a self,
        object: &'a Map<String, Value>,
        level: &IndexMap<String, Node>,
        path: &mut Vec<&'a str>,
        pairs: &mut IndexMap<&'a str, String>,
    ) -> Result<()> {
        for (key, value) in object {
            let Some(node) = level.get(key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            path.push(key);
            match (node, value) {
                (Node::Branch(children), Value::Object(nested)) => {
                    self.collect_pairs(nested, children, path, pairs)?;
                }
                (Node::Leaf(_), Value::Object(_)) | (Node::Branch(_), _) => {
                    tracing::warn!(path = %path.join("."), %value, "value does not fit the schema");
                    return Err(Error::unexpected_value(path.as_slice(), value));
                }
                (Node::Leaf(id), value) => {
                    let handler = &self.handlers[*id];
                    if handler.is_encodable() {
                        if !is_falsy(value) {
                            pairs.insert(handler.query_key(), handler.encode_with(value, &self.config));
                        } else if handler.accepts_empty_value() {
                            // an aliased falsy value keeps its alias, anything else is written bare
                            let encoded = handler
                                .encode_alias(value, &self.config)
                                .unwrap_or_default();
                            pairs.insert(handler.query_key(), encoded);
                        }
                    }
                }
            }
            path.pop();
        }
        Ok(())
    }
}

/// Joins encoded pairs into a querystring.
///
/// Keys with an empty value are written bare (`flag`, not `flag=`), both
/// in the middle and at the end of the string.
struct QueryWriter {
    output: String,
    first_kv: bool,
    use_form_encoding: bool,
}

impl QueryWriter {
    fn new(use_form_encoding: bool) -> Self {
        QueryWriter {
            output: String::with_capacity(128),
            first_kv: true,
            use_form_encoding,
        }
    }

    /// `value` is already percent-encoded by its handler.
    fn write_pair(&mut self, key: &str, value: &str) {
        if self.first_kv {
            self.first_kv = false;
        } else {
            self.output.push('&');
        }
        self.output
            .push_str(&encode_to_string(key, self.use_form_encoding));
        if !value.is_empty() {
            self.output.push('=');
            self.output.push_str(value);
        }
    }
}

#[cfg(test)]
mod test {
    use super::QueryWriter;

    #[test]
    fn empty_values_are_written_bare() {
        let mut writer = QueryWriter::new(false);
        writer.write_pair("a", "");
        writer.write_pair("b", "1");
        writer.write_pair("c", "");
        assert_eq!(writer.output, "a&b=1&c");
    }

    #[test]
    fn keys_are_encoded() {
        let mut writer = QueryWriter::new(false);
        writer.write_pair("my key", "1");
        writer.write_pair("a&b", "2");
        assert_eq!(writer.output, "my%20key=1&a%26b=2");
    }
}
