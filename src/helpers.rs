//! Support functions shared by the encoder and the decoder.
//!
//! These operate on the [`serde_json::Value`] tree that typed objects are
//! converted to before encoding and built up in while decoding.

use std::borrow::Cow;

use serde_json::{Map, Number, Value};

/// Writes `value` at `path` inside `root`, creating intermediate objects as
/// needed, and returns the innermost object that received the value.
///
/// An intermediate component that holds anything other than an object
/// (commonly `null`, from a `None` in a seeded default) is replaced by an
/// empty object. An empty `path` leaves `root` untouched.
///
/// ```
/// use query_coder::helpers::deep_assign;
/// use serde_json::{json, Map};
///
/// let mut root = Map::new();
/// deep_assign(&mut root, &["filter", "wow", "dungeon"], json!("Mists"));
/// assert_eq!(root["filter"], json!({"wow": {"dungeon": "Mists"}}));
/// ```
pub fn deep_assign<'a, S: AsRef<str>>(
    root: &'a mut Map<String, Value>,
    path: &[S],
    value: Value,
) -> &'a mut Map<String, Value> {
    let Some((last, parents)) = path.split_last() else {
        return root;
    };

    let node = descend(root, parents);
    node.insert(last.as_ref().to_owned(), value);
    node
}

/// Removes whatever sits at `path` inside `root` and returns it.
///
/// Intermediate levels are created and normalized exactly as
/// [`deep_assign`] does, so afterwards the parent of the removed field is
/// always an object. An empty `path` removes nothing.
///
/// ```
/// use query_coder::helpers::deep_remove;
/// use serde_json::{json, Value};
///
/// let mut root = json!({"gameId": "LostArk", "wow": null});
/// let root = root.as_object_mut().unwrap();
/// assert_eq!(deep_remove(root, &["gameId"]), Some(json!("LostArk")));
/// assert_eq!(deep_remove(root, &["wow", "region"]), None);
/// assert_eq!(Value::Object(root.clone()), json!({"wow": {}}));
/// ```
pub fn deep_remove<S: AsRef<str>>(root: &mut Map<String, Value>, path: &[S]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    descend(root, parents).shift_remove(last.as_ref())
}

fn descend<'a, S: AsRef<str>>(
    root: &'a mut Map<String, Value>,
    parents: &[S],
) -> &'a mut Map<String, Value> {
    let mut node = root;
    for component in parents {
        let slot = node.entry(component.as_ref()).or_insert(Value::Null);
        node = object_in(slot);
    }
    node
}

/// The object stored in `slot`, replacing any other value with `{}`.
fn object_in(slot: &mut Value) -> &mut Map<String, Value> {
    match slot {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            object_in(other)
        }
    }
}

/// Returns `true` if every key of `sample` is present in `target` with a
/// value of the same kind that matches it.
///
/// Nested objects are compared recursively, so `sample` only needs to name
/// the fields it cares about. Any other value must be equal; numbers are
/// compared by magnitude, so `1` matches `1.0`.
///
/// ```
/// use query_coder::helpers::deep_match;
/// use serde_json::json;
///
/// let target = json!({"gameId": "LostArk", "lostArk": {"region": "US"}});
/// let sample = json!({"lostArk": {"region": "US"}});
/// assert!(deep_match(sample.as_object().unwrap(), target.as_object().unwrap()));
/// ```
pub fn deep_match(sample: &Map<String, Value>, target: &Map<String, Value>) -> bool {
    sample.iter().all(|(key, expected)| {
        let Some(actual) = target.get(key) else {
            return false;
        };
        match (expected, actual) {
            (Value::Object(expected), Value::Object(actual)) => deep_match(expected, actual),
            (Value::Number(expected), Value::Number(actual)) => numbers_equal(expected, actual),
            (Value::Object(_), _) | (Value::Number(_), _) => false,
            (expected, actual) => expected == actual,
        }
    })
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
    }
}

/// Discrete scalars: the only values an alias table can translate.
pub fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_))
}

/// Nested mappings: the only values the encoder descends into.
pub fn is_object(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// Mirrors querystring truthiness: `false`, `0`, `""` and `null` are
/// falsy. Arrays and objects are truthy even when empty.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Formats a number as a querystring value.
///
/// Integers (including floats without a fractional part) are written
/// without a decimal point, so `3.0` becomes `3`.
pub fn number_to_string(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return itoa::Buffer::new().format(i).to_owned();
    }
    if let Some(u) = number.as_u64() {
        return itoa::Buffer::new().format(u).to_owned();
    }
    let Some(f) = number.as_f64() else {
        return number.to_string();
    };
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        itoa::Buffer::new().format(f as i64).to_owned()
    } else {
        ryu::Buffer::new().format(f).to_owned()
    }
}

/// Converts a leaf value to its unencoded string form.
///
/// Array elements are stringified recursively and joined with
/// `separator`.
pub fn stringify<'a>(value: &'a Value, separator: &str) -> Cow<'a, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(number_to_string(n)),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| stringify(item, separator))
                .collect::<Vec<_>>()
                .join(separator),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}
