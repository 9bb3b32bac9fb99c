//! Decoding: querystring to object.
//!
//! ### An overview of the decoding pass
//!
//! Decoding is a single pass over the `(key, value)` pairs of the input, in
//! input order. For each pair, the key index built by the coder gives the
//! handlers that may claim the key. The first one whose decode condition
//! holds for the object decoded *so far* parses the value, and the result
//! is written into the object at that handler's path.
//!
//! Because conditions see only what has already been decoded, order
//! matters: with `game=la&region=US`, a `region` handler conditioned on the
//! game can see `game`; with `region=US&game=la` it cannot.
//!
//! Keys nobody claims and values no condition admits are skipped without
//! error. A value that is not one of an aliased field's aliases decodes to
//! nothing, which clears whatever the field held before (from the seed, or
//! from an earlier pair with the same key).

pub(crate) mod parse;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::coder::Coder;
use crate::config::DecodeOptions;
use crate::error::{Error, Result};
use crate::helpers::{deep_assign, deep_remove};

pub use parse::{Pair, PairValue, Pairs, Parser, QueryInput};

impl<T: Serialize + DeserializeOwned> Coder<T> {
    /// Decodes a querystring into a `T`.
    ///
    /// Starts from `options.default_value` when given, so fields the
    /// querystring does not mention keep their defaults. Otherwise starts
    /// from an empty object, in which case `T` must tolerate missing
    /// fields (`Option`s or `#[serde(default)]`).
    pub fn decode<'a>(
        &self,
        query: impl Into<QueryInput<'a>>,
        options: DecodeOptions<T>,
    ) -> Result<T> {
        let seed = match options.default_value {
            Some(default_value) => match serde_json::to_value(default_value)? {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                other => {
                    tracing::warn!(value = %other, "default value is not an object");
                    return Err(Error::unexpected_value(&[], &other));
                }
            },
            None => Map::new(),
        };
        let decoded = self.decode_value(query, seed);
        Ok(serde_json::from_value(Value::Object(decoded))?)
    }
}

impl<T> Coder<T> {
    /// Decodes a querystring into `seed`, returning it. Never fails.
    pub fn decode_value<'a>(
        &self,
        query: impl Into<QueryInput<'a>>,
        seed: Map<String, Value>,
    ) -> Map<String, Value> {
        let query = query.into();
        query.pairs().fold(seed, |mut object, pair| {
            self.decode_pair(&pair, &mut object);
            object
        })
    }

    fn decode_pair(&self, pair: &Pair<'_>, object: &mut Map<String, Value>) {
        let Some(candidates) = self.index.get(&*pair.key) else {
            tracing::trace!(key = %pair.key, "no handler for query key");
            return;
        };
        let Some(handler) = candidates
            .iter()
            .map(|&id| &self.handlers[id])
            .find(|handler| handler.matches(object))
        else {
            tracing::trace!(key = %pair.key, "no decode condition matched");
            return;
        };
        let Some(path) = handler.path() else {
            return;
        };
        match handler.decode_pair(&pair.value) {
            Some(value) => {
                deep_assign(object, path, value);
            }
            None => {
                tracing::trace!(key = %pair.key, value = ?pair.value, "value is not a known alias, clearing field");
                deep_remove(object, path);
            }
        }
    }
}
