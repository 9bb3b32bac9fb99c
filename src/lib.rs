//! Declarative two-way mapping between nested objects and flat
//! querystrings.
//!
//! A [`Schema`] mirrors the shape of a target type and places a
//! [`FieldHandler`] at every leaf that takes part in the querystring. The
//! handler names the querystring key, how the value is parsed back, which
//! values are written under a shorter alias, and whether the field is
//! written at all. A [`Coder`] built from the schema then encodes objects
//! to querystrings and decodes querystrings back into objects.
//!
//! Keys are flat rather than bracketed: `filter.wow.dungeon` can be written
//! as just `dungeon=mists`. Several fields may even share one key, with a
//! decode condition choosing the right one based on what has already been
//! decoded.
//!
//! ## Usage
//!
//! ```
//! use query_coder::{Coder, DecodeOptions, DecodeType, FieldHandler, Schema};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct SearchFilter {
//!     game_id: Option<String>,
//!     language: Option<String>,
//!     tags: Option<Vec<String>>,
//!     wow: Option<WowFilter>,
//! }
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct WowFilter {
//!     min_rio_rating: Option<u32>,
//! }
//!
//! let coder = Coder::<SearchFilter>::new(
//!     Schema::new()
//!         .field("gameId", FieldHandler::new("game").alias("WorldOfWarcraft", "wow"))
//!         .field("language", FieldHandler::new("lang").encodable(false))
//!         .field("tags", FieldHandler::new("tags").decode_type(DecodeType::Array))
//!         .nested(
//!             "wow",
//!             Schema::new().field(
//!                 "minRioRating",
//!                 FieldHandler::new("rio")
//!                     .decode_type(DecodeType::Number)
//!                     .decode_condition(json!({"gameId": "WorldOfWarcraft"})),
//!             ),
//!         ),
//! )
//! .unwrap();
//!
//! let filter = SearchFilter {
//!     game_id: Some("WorldOfWarcraft".to_string()),
//!     language: Some("En".to_string()),
//!     tags: Some(vec!["mplus".to_string(), "voice".to_string()]),
//!     wow: Some(WowFilter { min_rio_rating: Some(2500) }),
//! };
//!
//! let query = coder.encode(&filter).unwrap();
//! assert_eq!(query, "game=wow&tags=mplus%2Cvoice&rio=2500");
//!
//! let decoded = coder.decode(query.as_str(), DecodeOptions::default()).unwrap();
//! assert_eq!(decoded, SearchFilter { language: None, ..filter });
//! ```
//!
//! ## Value model
//!
//! Objects go through [`serde_json::Value`] on the way in and out, so any
//! `Serialize`/`Deserialize` type works as a target. Schema keys are the
//! field names as they serialize. The untyped [`Coder::encode_value`] and
//! [`Coder::decode_value`] work on the value tree directly.

pub mod helpers;

mod coder;
mod config;
mod de;
mod error;
mod handler;
mod schema;
mod ser;

#[doc(inline)]
pub use coder::Coder;
#[doc(inline)]
pub use config::{Config, DecodeOptions};
#[doc(inline)]
pub use de::{Pair, PairValue, Pairs, Parser, QueryInput};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use handler::{DEFAULT_SEPARATOR, DecodeCondition, DecodeType, FieldHandler};
#[doc(inline)]
pub use schema::{Schema, SchemaNode};
