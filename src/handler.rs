//! Field handlers: how one leaf of an object maps to one querystring key.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use crate::config::Config;
use crate::de::parse::{PairValue, QueryInput, decode as percent_decode};
use crate::error::{Error, Result};
use crate::helpers::{deep_match, is_primitive, number_to_string, stringify};
use crate::ser::encode::encode_to_string;

/// Separator used by [`DecodeType::Array`] fields unless
/// [`FieldHandler::array_separator`] says otherwise.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Governs how a querystring value is parsed back into a value.
///
/// A value such as `"123"` carries no type by itself, so a field that
/// should decode to the number `123` has to say so with
/// [`DecodeType::Number`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodeType {
    /// Any non-empty string is `true`, the empty string is `false`.
    Boolean,
    /// The decoded string as is.
    #[default]
    String,
    /// A best-effort numeric parse. Input that is not a number decodes to
    /// `null`.
    Number,
    /// The decoded string split on the field's separator.
    Array,
}

type Predicate = dyn Fn(&Map<String, Value>) -> bool + Send + Sync;

/// Decides whether a handler may claim its key, given everything decoded
/// so far in the current pass.
///
/// Several handlers may share a querystring key; the first one whose
/// condition holds wins.
#[derive(Clone)]
pub enum DecodeCondition {
    /// Holds when every field of the sample deep-matches the object decoded
    /// so far. See [`deep_match`].
    Sample(Map<String, Value>),
    /// Holds when the closure returns `true` for the object decoded so far.
    Predicate(Arc<Predicate>),
}

impl DecodeCondition {
    pub fn matches(&self, decoded: &Map<String, Value>) -> bool {
        match self {
            DecodeCondition::Sample(sample) => deep_match(sample, decoded),
            DecodeCondition::Predicate(predicate) => predicate(decoded),
        }
    }
}

impl fmt::Debug for DecodeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeCondition::Sample(sample) => f.debug_tuple("Sample").field(sample).finish(),
            DecodeCondition::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Alias lookups are keyed by the kind of scalar and its canonical string
/// form, so the string `"1"` and the number `1` stay distinct while `1`
/// and `1.0` collapse.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum AliasKey {
    String(String),
    Number(String),
}

impl AliasKey {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(AliasKey::String(s.clone())),
            Value::Number(n) => Some(AliasKey::Number(number_to_string(n))),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct AliasTable {
    forward: HashMap<AliasKey, String>,
    reverse: HashMap<String, Value>,
}

impl AliasTable {
    fn insert(&mut self, value: Value, alias: String) {
        let Some(key) = AliasKey::of(&value) else {
            tracing::warn!(%value, %alias, "ignoring alias for a non-discrete value");
            return;
        };
        self.forward.insert(key, alias.clone());
        self.reverse.insert(alias, value);
    }
}

/// Describes how one leaf field is written to, and read from, a single
/// querystring key.
///
/// ```
/// use query_coder::{DecodeType, FieldHandler};
/// use serde_json::json;
///
/// let mode = FieldHandler::new("mode").alias("WowMythicPlus", "mplus");
/// assert_eq!(mode.encode(&json!("WowMythicPlus")), "mplus");
/// assert_eq!(mode.decode("mplus"), Some(json!("WowMythicPlus")));
///
/// let rating = FieldHandler::new("rio").decode_type(DecodeType::Number);
/// assert_eq!(rating.decode("2500"), Some(json!(2500)));
/// ```
#[derive(Clone, Debug)]
pub struct FieldHandler {
    query_key: String,
    decode_type: DecodeType,
    path: Option<Vec<String>>,
    aliases: Option<AliasTable>,
    encodable: bool,
    accept_empty_value: bool,
    separator: String,
    decode_condition: Option<DecodeCondition>,
}

impl FieldHandler {
    /// A string field written under `query_key`, encodable, with no
    /// aliases and no decode condition.
    pub fn new(query_key: impl Into<String>) -> Self {
        FieldHandler {
            query_key: query_key.into(),
            decode_type: DecodeType::default(),
            path: None,
            aliases: None,
            encodable: true,
            accept_empty_value: false,
            separator: DEFAULT_SEPARATOR.to_owned(),
            decode_condition: None,
        }
    }

    pub fn decode_type(mut self, decode_type: DecodeType) -> Self {
        self.decode_type = decode_type;
        self
    }

    /// When `false` the field is never written by encoding, but is still
    /// read by decoding.
    pub fn encodable(mut self, encodable: bool) -> Self {
        self.encodable = encodable;
        self
    }

    /// When `true`, a falsy value (`false`, `0`, `""`, `null`) still writes
    /// the key, with an empty value. Otherwise the key is left out.
    pub fn accept_empty_value(mut self, accept_empty_value: bool) -> Self {
        self.accept_empty_value = accept_empty_value;
        self
    }

    /// Writes `alias` instead of `value`, and reads `alias` back as
    /// `value`. Only strings and numbers can be aliased.
    ///
    /// Once a field has aliases, decoding only recognizes aliases: any
    /// other input decodes to nothing.
    pub fn alias(mut self, value: impl Into<Value>, alias: impl Into<String>) -> Self {
        self.aliases
            .get_or_insert_with(AliasTable::default)
            .insert(value.into(), alias.into());
        self
    }

    /// Adds several aliases at once. When two values share an alias, the
    /// last one wins on decode.
    pub fn aliases<I, V, A>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (V, A)>,
        V: Into<Value>,
        A: Into<String>,
    {
        aliases
            .into_iter()
            .fold(self, |handler, (value, alias)| handler.alias(value, alias))
    }

    /// Separator used to join and split [`DecodeType::Array`] values.
    pub fn array_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Only claim the key when the object decoded so far deep-matches
    /// `sample`. A sample that is not an object places no constraint.
    pub fn decode_condition(mut self, sample: Value) -> Self {
        let sample = match sample {
            Value::Object(map) => map,
            other => {
                tracing::warn!(sample = %other, query_key = %self.query_key, "decode condition is not an object");
                Map::new()
            }
        };
        self.decode_condition = Some(DecodeCondition::Sample(sample));
        self
    }

    /// Only claim the key when `predicate` holds for the object decoded so
    /// far.
    pub fn decode_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.decode_condition = Some(DecodeCondition::Predicate(Arc::new(predicate)));
        self
    }

    pub fn query_key(&self) -> &str {
        &self.query_key
    }

    pub fn value_type(&self) -> DecodeType {
        self.decode_type
    }

    pub fn is_encodable(&self) -> bool {
        self.encodable
    }

    pub fn accepts_empty_value(&self) -> bool {
        self.accept_empty_value
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn condition(&self) -> Option<&DecodeCondition> {
        self.decode_condition.as_ref()
    }

    pub fn has_aliases(&self) -> bool {
        self.aliases.is_some()
    }

    /// Location of this field inside the target object, once the handler
    /// is part of a [`Coder`](crate::Coder).
    pub fn path(&self) -> Option<&[String]> {
        self.path.as_deref()
    }

    /// [`path`](Self::path) joined with `.`, e.g. `filter.wow.dungeon`.
    pub fn dotted_path(&self) -> Option<String> {
        self.path.as_ref().map(|path| path.join("."))
    }

    /// Stamps the handler with its location. A handler can only be placed
    /// once: a second call fails with [`Error::PathAlreadySet`].
    pub fn set_path(&mut self, path: Vec<String>) -> Result<()> {
        if let Some(existing) = &self.path {
            let existing = existing.join(".");
            let attempted = path.join(".");
            tracing::warn!(query_key = %self.query_key, %existing, %attempted, "handler path already initialized");
            return Err(Error::PathAlreadySet {
                query_key: self.query_key.clone(),
                existing,
                attempted,
            });
        }
        self.path = Some(path);
        Ok(())
    }

    /// Whether this handler may claim its key given the object decoded so
    /// far. A handler without a condition always may.
    pub fn matches(&self, decoded: &Map<String, Value>) -> bool {
        self.decode_condition
            .as_ref()
            .is_none_or(|condition| condition.matches(decoded))
    }

    /// Writes `value` as a percent-encoded querystring value, applying the
    /// alias table when `value` is a string or number.
    pub fn encode(&self, value: &Value) -> String {
        self.encode_with(value, &Config::default())
    }

    pub(crate) fn encode_with(&self, value: &Value, config: &Config) -> String {
        let unencoded = match self.alias_of(value) {
            Some(alias) => Cow::Borrowed(alias),
            None => stringify(value, &self.separator),
        };
        encode_to_string(&unencoded, config.use_form_encoding)
    }

    /// The percent-encoded alias of `value`, if it has one.
    pub(crate) fn encode_alias(&self, value: &Value, config: &Config) -> Option<String> {
        self.alias_of(value)
            .map(|alias| encode_to_string(alias, config.use_form_encoding))
    }

    fn alias_of(&self, value: &Value) -> Option<&str> {
        let table = self.aliases.as_ref()?;
        if !is_primitive(value) {
            return None;
        }
        let key = AliasKey::of(value)?;
        table.forward.get(&key).map(String::as_str)
    }

    /// Reads a percent-encoded querystring value.
    ///
    /// Returns `None` only for an aliased field whose input is not one of
    /// its aliases. Never fails otherwise: see [`DecodeType`] for how each
    /// type treats malformed input.
    pub fn decode(&self, raw: &str) -> Option<Value> {
        self.decode_str(&percent_decode(raw))
    }

    /// Like [`decode`](Self::decode), for input that is already
    /// percent-decoded.
    pub fn decode_str(&self, decoded: &str) -> Option<Value> {
        if let Some(table) = &self.aliases {
            return table.reverse.get(decoded).cloned();
        }
        Some(match self.decode_type {
            DecodeType::Boolean => Value::Bool(!decoded.is_empty()),
            DecodeType::String => Value::String(decoded.to_owned()),
            DecodeType::Number => parse_number(decoded),
            DecodeType::Array => {
                if decoded.is_empty() {
                    Value::Array(Vec::new())
                } else {
                    decoded
                        .split(self.separator.as_str())
                        .map(|item| Value::String(item.to_owned()))
                        .collect()
                }
            }
        })
    }

    pub(crate) fn decode_pair(&self, value: &PairValue<'_>) -> Option<Value> {
        match value {
            PairValue::Encoded(raw) => self.decode(raw),
            PairValue::Decoded(decoded) => self.decode_str(decoded),
        }
    }

    /// Reads this field straight from a querystring, without a
    /// [`Coder`](crate::Coder). Returns `None` when the key is missing or
    /// its value is empty.
    ///
    /// ```
    /// use query_coder::FieldHandler;
    /// use serde_json::json;
    ///
    /// let game = FieldHandler::new("game").alias("LostArk", "la");
    /// assert_eq!(game.get_from_query("region=US&game=la"), Some(json!("LostArk")));
    /// assert_eq!(game.get_from_query("region=US"), None);
    /// ```
    pub fn get_from_query<'a>(&self, query: impl Into<QueryInput<'a>>) -> Option<Value> {
        let query = query.into();
        let pair = query.pairs().find(|pair| pair.key == self.query_key)?;
        if pair.value.is_empty() {
            return None;
        }
        self.decode_pair(&pair.value)
    }
}

/// Trimmed input; empty is `0`; integers stay integers; anything that is
/// not a finite number becomes `null`.
fn parse_number(input: &str) -> Value {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Value::Number(0.into());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Value::Number(u.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn encode_plain_values() {
        let handler = FieldHandler::new("q");
        assert_eq!(handler.encode(&json!("Carrot City")), "Carrot%20City");
        assert_eq!(handler.encode(&json!(42)), "42");
        assert_eq!(handler.encode(&json!(true)), "true");
        assert_eq!(handler.encode(&json!(["a", "b", "c"])), "a%2Cb%2Cc");
    }

    #[test]
    fn encode_with_custom_separator() {
        let handler = FieldHandler::new("q").array_separator("|");
        assert_eq!(handler.encode(&json!([1, 2])), "1%7C2");
        assert_eq!(
            handler.clone().decode_type(DecodeType::Array).decode("1%7C2"),
            Some(json!(["1", "2"]))
        );
    }

    #[test]
    fn encode_aliases() {
        let handler = FieldHandler::new("game").aliases([
            ("WorldOfWarcraft", "wow"),
            ("WildRift", "wr"),
            ("LostArk", "la"),
        ]);
        assert_eq!(handler.encode(&json!("LostArk")), "la");
        // values without an alias fall back to their string form
        assert_eq!(handler.encode(&json!("Hearthstone")), "Hearthstone");
        // non-discrete values are never looked up
        assert_eq!(handler.encode(&json!(["LostArk"])), "LostArk");
    }

    #[test]
    fn numeric_aliases() {
        let handler = FieldHandler::new("lang").aliases([(0, "en"), (1, "ru")]);
        assert_eq!(handler.encode(&json!(1)), "ru");
        assert_eq!(handler.encode(&json!(1.0)), "ru");
        assert_eq!(handler.encode(&json!("1")), "1");
        assert_eq!(handler.decode("en"), Some(json!(0)));
    }

    #[test]
    fn alias_collision_last_writer_wins() {
        let handler = FieldHandler::new("g").alias("A", "x").alias("B", "x");
        assert_eq!(handler.decode("x"), Some(json!("B")));
        assert_eq!(handler.encode(&json!("A")), "x");
    }

    #[test]
    fn unknown_alias_decodes_to_nothing() {
        let handler = FieldHandler::new("region")
            .decode_type(DecodeType::Number)
            .alias(1, "eu");
        assert_eq!(handler.decode("eu"), Some(json!(1)));
        // no fallback to numeric parsing for aliased fields
        assert_eq!(handler.decode("2"), None);
    }

    #[test]
    fn decode_types() {
        let boolean = FieldHandler::new("b").decode_type(DecodeType::Boolean);
        assert_eq!(boolean.decode("true"), Some(json!(true)));
        assert_eq!(boolean.decode("false"), Some(json!(true)));
        assert_eq!(boolean.decode(""), Some(json!(false)));

        let string = FieldHandler::new("s");
        assert_eq!(string.decode("Dungeon%231"), Some(json!("Dungeon#1")));

        let array = FieldHandler::new("a").decode_type(DecodeType::Array);
        assert_eq!(array.decode("a%2Cb%2Cc"), Some(json!(["a", "b", "c"])));
        assert_eq!(array.decode("a,b"), Some(json!(["a", "b"])));
        assert_eq!(array.decode(""), Some(json!([])));
    }

    #[test]
    fn decode_numbers_best_effort() {
        let number = FieldHandler::new("n").decode_type(DecodeType::Number);
        assert_eq!(number.decode("123"), Some(json!(123)));
        assert_eq!(number.decode("-4"), Some(json!(-4)));
        assert_eq!(number.decode("1.5"), Some(json!(1.5)));
        assert_eq!(number.decode("1e3"), Some(json!(1000.0)));
        assert_eq!(number.decode("%2012%20"), Some(json!(12)));
        assert_eq!(number.decode(""), Some(json!(0)));
        assert_eq!(number.decode("18446744073709551615"), Some(json!(u64::MAX)));
        assert_eq!(number.decode("abc"), Some(Value::Null));
        assert_eq!(number.decode("inf"), Some(Value::Null));
    }

    #[test]
    fn set_path_is_one_shot() {
        let mut handler = FieldHandler::new("region");
        assert_eq!(handler.path(), None);
        handler
            .set_path(vec!["wow".to_string(), "region".to_string()])
            .unwrap();
        assert_eq!(handler.dotted_path().as_deref(), Some("wow.region"));

        let err = handler
            .set_path(vec!["lostArk".to_string(), "region".to_string()])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PathAlreadySet { ref existing, ref attempted, .. }
                if existing == "wow.region" && attempted == "lostArk.region"
        ));
        assert_eq!(handler.dotted_path().as_deref(), Some("wow.region"));
    }

    #[test]
    fn conditions() {
        let decoded = json!({"gameId": "LostArk"});
        let decoded = decoded.as_object().unwrap();

        assert!(FieldHandler::new("r").matches(decoded));
        assert!(
            FieldHandler::new("r")
                .decode_condition(json!({"gameId": "LostArk"}))
                .matches(decoded)
        );
        assert!(
            !FieldHandler::new("r")
                .decode_condition(json!({"gameId": "WorldOfWarcraft"}))
                .matches(decoded)
        );
        assert!(
            FieldHandler::new("r")
                .decode_when(|d| d.get("gameId").and_then(Value::as_str) == Some("LostArk"))
                .matches(decoded)
        );
    }

    #[test]
    fn get_from_query() {
        let region = FieldHandler::new("region").decode_type(DecodeType::Number);
        assert_eq!(region.get_from_query("game=la&region=1"), Some(json!(1)));
        assert_eq!(region.get_from_query("region=&region=2"), None);
        assert_eq!(region.get_from_query("game=la"), None);

        let pairs = vec![("region".to_string(), "7".to_string())];
        assert_eq!(region.get_from_query(pairs), Some(json!(7)));
    }
}
