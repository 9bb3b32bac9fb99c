use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::Result;
use crate::handler::FieldHandler;
use crate::schema::{Schema, SchemaNode};

/// Position in the frozen schema tree. Leaves point into the handler list.
#[derive(Clone, Debug)]
pub(crate) enum Node {
    Leaf(usize),
    Branch(IndexMap<String, Node>),
}

/// Encodes objects of type `T` to querystrings and decodes them back,
/// following a [`Schema`].
///
/// Construction walks the schema once, depth-first, stamping each handler
/// with its path and indexing it under its querystring key. After that
/// the coder is immutable: `encode` and `decode` only read it, so a coder
/// can be shared freely between threads.
///
/// ```
/// use query_coder::{Coder, DecodeOptions, DecodeType, FieldHandler, Schema};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Filter {
///     #[serde(skip_serializing_if = "Option::is_none")]
///     game_id: Option<String>,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     wow: Option<Wow>,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     lost_ark: Option<LostArk>,
/// }
///
/// #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
/// struct Wow {
///     region: Option<u32>,
/// }
///
/// #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
/// struct LostArk {
///     region: Option<String>,
/// }
///
/// let coder = Coder::<Filter>::new(
///     Schema::new()
///         .field(
///             "gameId",
///             FieldHandler::new("game").aliases([("WorldOfWarcraft", "wow"), ("LostArk", "la")]),
///         )
///         .nested(
///             "wow",
///             Schema::new().field(
///                 "region",
///                 FieldHandler::new("region")
///                     .decode_type(DecodeType::Number)
///                     .decode_condition(json!({"gameId": "WorldOfWarcraft"})),
///             ),
///         )
///         .nested(
///             "lostArk",
///             Schema::new().field(
///                 "region",
///                 FieldHandler::new("region").decode_condition(json!({"gameId": "LostArk"})),
///             ),
///         ),
/// )
/// .unwrap();
///
/// let filter = Filter {
///     game_id: Some("LostArk".to_string()),
///     lost_ark: Some(LostArk { region: Some("US".to_string()) }),
///     ..Filter::default()
/// };
/// assert_eq!(coder.encode(&filter).unwrap(), "game=la&region=US");
/// assert_eq!(coder.decode("game=la&region=US", DecodeOptions::default()).unwrap(), filter);
/// ```
pub struct Coder<T> {
    pub(crate) root: IndexMap<String, Node>,
    pub(crate) handlers: Vec<FieldHandler>,
    pub(crate) index: IndexMap<String, Vec<usize>>,
    pub(crate) config: Config,
    marker: PhantomData<fn() -> T>,
}

impl<T> Coder<T> {
    /// Builds a coder with the default [`Config`].
    ///
    /// Fails with [`Error::PathAlreadySet`](crate::Error::PathAlreadySet)
    /// if any handler in `schema` already belongs to another position.
    pub fn new(schema: Schema) -> Result<Self> {
        Self::with_config(schema, Config::default())
    }

    pub fn with_config(schema: Schema, config: Config) -> Result<Self> {
        let mut builder = IndexBuilder::default();
        let root = builder.collect(schema, &mut Vec::new())?;
        tracing::debug!(
            handlers = builder.handlers.len(),
            query_keys = builder.index.len(),
            "built query key index"
        );
        Ok(Coder {
            root,
            handlers: builder.handlers,
            index: builder.index,
            config,
            marker: PhantomData,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// All handlers, in depth-first schema order.
    pub fn handlers(&self) -> impl Iterator<Item = &FieldHandler> {
        self.handlers.iter()
    }

    /// The handlers that may claim `query_key`, in the order decoding tries
    /// them.
    pub fn candidates(&self, query_key: &str) -> impl Iterator<Item = &FieldHandler> {
        self.index
            .get(query_key)
            .into_iter()
            .flatten()
            .map(|&id| &self.handlers[id])
    }

    /// The querystring keys this coder knows, in order of first appearance
    /// in the schema.
    pub fn query_keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// The handler placed at `path`, if any.
    pub fn handler_at(&self, path: &[&str]) -> Option<&FieldHandler> {
        let (last, parents) = path.split_last()?;
        let mut level = &self.root;
        for key in parents {
            match level.get(*key)? {
                Node::Branch(children) => level = children,
                Node::Leaf(_) => return None,
            }
        }
        match level.get(*last)? {
            Node::Leaf(id) => Some(&self.handlers[*id]),
            Node::Branch(_) => None,
        }
    }

    /// Gives the schema back. Its handlers keep the paths they were stamped
    /// with, so the schema cannot be used to build another coder.
    pub fn into_schema(self) -> Schema {
        let mut handlers: Vec<Option<FieldHandler>> = self.handlers.into_iter().map(Some).collect();
        rebuild(self.root, &mut handlers)
    }
}

fn rebuild(level: IndexMap<String, Node>, handlers: &mut [Option<FieldHandler>]) -> Schema {
    level
        .into_iter()
        .filter_map(|(key, node)| {
            let node = match node {
                Node::Leaf(id) => SchemaNode::Leaf(handlers[id].take()?),
                Node::Branch(children) => SchemaNode::Branch(rebuild(children, handlers)),
            };
            Some((key, node))
        })
        .collect()
}

#[derive(Default)]
struct IndexBuilder {
    handlers: Vec<FieldHandler>,
    index: IndexMap<String, Vec<usize>>,
}

impl IndexBuilder {
    /// Pre-order walk: a handler's id is its position in traversal order,
    /// which is also the order candidates sharing a key are tried in.
    fn collect(
        &mut self,
        schema: Schema,
        path: &mut Vec<String>,
    ) -> Result<IndexMap<String, Node>> {
        let mut level = IndexMap::with_capacity(schema.len());
        for (key, node) in schema {
            path.push(key.clone());
            let node = match node {
                SchemaNode::Leaf(mut handler) => {
                    handler.set_path(path.clone())?;
                    let id = self.handlers.len();
                    self.index
                        .entry(handler.query_key().to_owned())
                        .or_default()
                        .push(id);
                    self.handlers.push(handler);
                    Node::Leaf(id)
                }
                SchemaNode::Branch(schema) => Node::Branch(self.collect(schema, path)?),
            };
            path.pop();
            level.insert(key, node);
        }
        Ok(level)
    }
}

impl<T> fmt::Debug for Coder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coder")
            .field("handlers", &self.handlers)
            .field("index", &self.index)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;
    use crate::handler::DecodeType;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn game_schema() -> Schema {
        Schema::new()
            .field("language", FieldHandler::new("lang").encodable(false))
            .field("gameId", FieldHandler::new("game"))
            .nested(
                "wow",
                Schema::new()
                    .field(
                        "region",
                        FieldHandler::new("region")
                            .decode_type(DecodeType::Number)
                            .decode_condition(json!({"gameId": "WorldOfWarcraft"})),
                    )
                    .field("dungeon", FieldHandler::new("dungeon")),
            )
            .nested(
                "lostArk",
                Schema::new().field(
                    "region",
                    FieldHandler::new("region").decode_condition(json!({"gameId": "LostArk"})),
                ),
            )
    }

    #[test]
    fn index_groups_shared_keys_in_traversal_order() {
        let coder = Coder::<Value>::new(game_schema()).unwrap();
        assert_eq!(
            coder.query_keys().collect::<Vec<_>>(),
            vec!["lang", "game", "region", "dungeon"]
        );
        let paths: Vec<_> = coder
            .candidates("region")
            .map(|h| h.dotted_path().unwrap())
            .collect();
        assert_eq!(paths, vec!["wow.region", "lostArk.region"]);
        assert_eq!(coder.candidates("missing").count(), 0);
    }

    #[test]
    fn every_handler_gets_its_path() {
        let coder = Coder::<Value>::new(game_schema()).unwrap();
        let paths: Vec<_> = coder.handlers().map(|h| h.dotted_path().unwrap()).collect();
        assert_eq!(
            paths,
            vec!["language", "gameId", "wow.region", "wow.dungeon", "lostArk.region"]
        );
        assert_eq!(
            coder.handler_at(&["wow", "dungeon"]).map(FieldHandler::query_key),
            Some("dungeon")
        );
        assert!(coder.handler_at(&["wow"]).is_none());
        assert!(coder.handler_at(&["language", "x"]).is_none());
        assert!(coder.handler_at(&[]).is_none());
    }

    #[test]
    fn reused_handler_is_rejected() {
        let mut region = FieldHandler::new("region");
        region.set_path(vec!["wow".into(), "region".into()]).unwrap();

        let err = Coder::<Value>::new(
            Schema::new().nested("lostArk", Schema::new().field("region", region)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::PathAlreadySet { ref existing, ref attempted, .. }
                if existing == "wow.region" && attempted == "lostArk.region"
        ));
    }

    #[test]
    fn schema_from_a_built_coder_cannot_be_reused() {
        let coder = Coder::<Value>::new(game_schema()).unwrap();
        let schema = coder.into_schema();
        assert_eq!(schema.len(), 4);
        assert!(matches!(
            Coder::<Value>::new(schema),
            Err(Error::PathAlreadySet { .. })
        ));
    }

    #[test]
    fn coder_is_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Coder<Value>>();
    }
}
