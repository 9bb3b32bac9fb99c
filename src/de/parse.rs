use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

mod decode;

pub use decode::decode;

/// A querystring to decode, either raw or already split into pairs.
///
/// Raw strings may start with `?`. Their values stay percent-encoded until
/// the handler that claims them decodes them. Pre-parsed pairs are taken as
/// already decoded.
///
/// ```
/// use query_coder::QueryInput;
///
/// let raw = QueryInput::from("?game=la&region=US");
/// let pairs = QueryInput::from(vec![
///     ("game".to_string(), "la".to_string()),
///     ("region".to_string(), "US".to_string()),
/// ]);
/// assert_eq!(raw.get("region").as_deref(), Some("US"));
/// assert_eq!(pairs.get("game").as_deref(), Some("la"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum QueryInput<'a> {
    Raw(&'a str),
    Pairs(Vec<(Cow<'a, str>, Cow<'a, str>)>),
}

impl<'a> QueryInput<'a> {
    /// Builds pre-parsed input from any sequence of decoded pairs. Repeated
    /// keys are kept and processed in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        QueryInput::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Iterates over the `(key, value)` pairs in input order.
    pub fn pairs(&self) -> Pairs<'_> {
        match self {
            QueryInput::Raw(raw) => Pairs::Raw(Parser::new(raw)),
            QueryInput::Pairs(pairs) => Pairs::Parsed(pairs.iter()),
        }
    }

    /// Returns the decoded value of the first pair named `key`.
    pub fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.pairs()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.decoded())
    }
}

impl fmt::Debug for QueryInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryInput::Raw(raw) => write!(f, "Raw({raw:?})"),
            QueryInput::Pairs(pairs) => f.debug_list().entries(pairs.iter()).finish(),
        }
    }
}

impl<'a> From<&'a str> for QueryInput<'a> {
    fn from(raw: &'a str) -> Self {
        QueryInput::Raw(raw)
    }
}

impl<'a> From<&'a String> for QueryInput<'a> {
    fn from(raw: &'a String) -> Self {
        QueryInput::Raw(raw.as_str())
    }
}

impl From<Vec<(String, String)>> for QueryInput<'_> {
    fn from(pairs: Vec<(String, String)>) -> Self {
        QueryInput::from_pairs(pairs)
    }
}

impl<'a> From<&'a [(&'a str, &'a str)]> for QueryInput<'a> {
    fn from(pairs: &'a [(&'a str, &'a str)]) -> Self {
        QueryInput::from_pairs(pairs.iter().copied())
    }
}

/// Multi-valued keys expand into one pair per value, keeping map order.
impl<'a> From<&'a IndexMap<String, Vec<String>>> for QueryInput<'a> {
    fn from(map: &'a IndexMap<String, Vec<String>>) -> Self {
        QueryInput::from_pairs(
            map.iter()
                .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str()))),
        )
    }
}

/// Multi-valued keys expand into one pair per value. The order between
/// different keys follows the map's iteration order, which is unspecified
/// for a `HashMap`; use an `IndexMap` when decode conditions depend on it.
impl<'a> From<&'a HashMap<String, Vec<String>>> for QueryInput<'a> {
    fn from(map: &'a HashMap<String, Vec<String>>) -> Self {
        QueryInput::from_pairs(
            map.iter()
                .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str()))),
        )
    }
}

/// A value as found in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairValue<'a> {
    /// Still percent-encoded, straight from a raw querystring.
    Encoded(&'a str),
    /// Already decoded, from pre-parsed input.
    Decoded(&'a str),
}

impl<'a> PairValue<'a> {
    pub fn decoded(&self) -> Cow<'a, str> {
        match *self {
            PairValue::Encoded(raw) => decode(raw),
            PairValue::Decoded(value) => Cow::Borrowed(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PairValue::Encoded(s) | PairValue::Decoded(s) => s.is_empty(),
        }
    }
}

/// One `(key, value)` pair. The key is always decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair<'a> {
    pub key: Cow<'a, str>,
    pub value: PairValue<'a>,
}

/// Iterator returned by [`QueryInput::pairs`].
pub enum Pairs<'a> {
    Raw(Parser<'a>),
    Parsed(std::slice::Iter<'a, (Cow<'a, str>, Cow<'a, str>)>),
}

impl<'a> Iterator for Pairs<'a> {
    type Item = Pair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Pairs::Raw(parser) => parser.next(),
            Pairs::Parsed(iter) => iter.next().map(|(k, v)| Pair {
                key: Cow::Borrowed(&**k),
                value: PairValue::Decoded(&**v),
            }),
        }
    }
}

/// Splits a raw querystring into pairs.
///
/// Segments are separated by `&`; empty segments are skipped. Each segment
/// is split at its first `=`, and a segment without one is a key with an
/// empty value (`flag` reads the same as `flag=`).
pub struct Parser<'qs> {
    remaining: &'qs str,
}

impl<'qs> Parser<'qs> {
    pub fn new(encoded: &'qs str) -> Self {
        Parser {
            remaining: encoded.strip_prefix('?').unwrap_or(encoded),
        }
    }
}

impl<'qs> Iterator for Parser<'qs> {
    type Item = Pair<'qs>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining.is_empty() {
                return None;
            }
            let segment = match self.remaining.split_once('&') {
                Some((segment, rest)) => {
                    self.remaining = rest;
                    segment
                }
                None => std::mem::take(&mut self.remaining),
            };
            if segment.is_empty() {
                // `a=1&&b=2`
                continue;
            }
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            return Some(Pair {
                key: decode(key),
                value: PairValue::Encoded(value),
            });
        }
    }
}
