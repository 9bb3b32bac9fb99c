use indexmap::IndexMap;

use crate::handler::FieldHandler;

/// One position in a [`Schema`]: either a leaf handled by a
/// [`FieldHandler`], or a nested mapping.
#[derive(Clone, Debug)]
pub enum SchemaNode {
    Leaf(FieldHandler),
    Branch(Schema),
}

impl From<FieldHandler> for SchemaNode {
    fn from(handler: FieldHandler) -> Self {
        SchemaNode::Leaf(handler)
    }
}

impl From<Schema> for SchemaNode {
    fn from(schema: Schema) -> Self {
        SchemaNode::Branch(schema)
    }
}

/// The shape of a target object, with a [`FieldHandler`] at every leaf
/// that takes part in the querystring.
///
/// Keys are the field names of the target object as it serializes, so a
/// struct with `#[serde(rename_all = "camelCase")]` is described with
/// camel-case keys. Fields absent from the schema are ignored by both
/// encoding and decoding.
///
/// ```
/// use query_coder::{DecodeType, FieldHandler, Schema};
///
/// let schema = Schema::new()
///     .field("gameId", FieldHandler::new("game"))
///     .nested(
///         "wow",
///         Schema::new().field("region", FieldHandler::new("region").decode_type(DecodeType::Number)),
///     );
/// assert_eq!(schema.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Schema {
    nodes: IndexMap<String, SchemaNode>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a leaf. Re-using a key replaces the earlier node in place.
    pub fn field(mut self, key: impl Into<String>, handler: FieldHandler) -> Self {
        self.nodes.insert(key.into(), SchemaNode::Leaf(handler));
        self
    }

    /// Adds a nested mapping.
    pub fn nested(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.nodes.insert(key.into(), SchemaNode::Branch(schema));
        self
    }

    /// Adds either kind of node.
    pub fn node(mut self, key: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.nodes.insert(key.into(), node.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.nodes.get(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for Schema {
    type Item = (String, SchemaNode);
    type IntoIter = indexmap::map::IntoIter<String, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<K: Into<String>, N: Into<SchemaNode>> FromIterator<(K, N)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Schema {
            nodes: iter.into_iter().map(|(k, n)| (k.into(), n.into())).collect(),
        }
    }
}
