//! TYML syntax tree.
//!
//! A document is a single `Value`. Objects keep their pairs in source order
//! and keep duplicate keys; deciding which duplicate wins is up to the
//! consumer (`ObjectValue::get` takes the last one).

use crate::token::{Position, Token};

/// A document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// One or more `key: value` pairs.
    Object(ObjectValue),
    /// Quoted string, escapes decoded.
    String(StringValue),
    /// Number literal, kept as written.
    Number(NumberValue),
}

/// Ordered sequence of pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectValue {
    pub pairs: Vec<Pair>,
}

/// One `key: value` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: Key,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub identifier: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    pub token: Token,
    pub value: String,
}

/// A number literal. `value` is the lexical text; converting it is left to
/// the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberValue {
    pub token: Token,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Value {
    /// Returns a reference to the object if this is an `Object`.
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the decoded string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&s.value),
            _ => None,
        }
    }

    /// Returns the number literal if this is a `Number`.
    pub fn as_number(&self) -> Option<&str> {
        match self {
            Value::Number(n) => Some(&n.value),
            _ => None,
        }
    }

    /// Name of the variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Object(_) => "object",
            Value::String(_) => "string",
            Value::Number(_) => "number",
        }
    }

    /// Where the value starts in the source. An object starts at its first
    /// key.
    pub fn position(&self) -> Option<Position> {
        match self {
            Value::Object(obj) => obj.pairs.first().map(|p| p.key.position()),
            Value::String(s) => Some(s.token.position),
            Value::Number(n) => Some(n.token.position),
        }
    }

    /// Visit this value and everything below it, depth first, with the
    /// nesting depth of each node.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(Node<'_>, usize),
    {
        Node::from(self).walk_inner(0, &mut visit);
    }
}

impl ObjectValue {
    /// Value of the last pair with this key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs
            .iter()
            .rev()
            .find(|p| p.key.name() == key)
            .map(|p| &p.value)
    }

    /// Keys in source order, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.key.name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<'a> IntoIterator for &'a ObjectValue {
    type Item = &'a Pair;
    type IntoIter = std::slice::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl Key {
    pub fn name(&self) -> &str {
        &self.identifier.value
    }

    pub fn position(&self) -> Position {
        self.identifier.token.position
    }
}

impl From<Token> for Identifier {
    fn from(token: Token) -> Self {
        let value = token.text.clone();
        Self { token, value }
    }
}

impl From<Token> for StringValue {
    fn from(token: Token) -> Self {
        let value = token.text.clone();
        Self { token, value }
    }
}

impl From<Token> for NumberValue {
    fn from(token: Token) -> Self {
        let value = token.text.clone();
        Self { token, value }
    }
}

/// Borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Object(&'a ObjectValue),
    Pair(&'a Pair),
    Key(&'a Key),
    String(&'a StringValue),
    Number(&'a NumberValue),
    Identifier(&'a Identifier),
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(obj) => Node::Object(obj),
            Value::String(s) => Node::String(s),
            Value::Number(n) => Node::Number(n),
        }
    }
}

impl<'a> Node<'a> {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Object(obj) => obj.pairs.iter().map(Node::Pair).collect(),
            Node::Pair(pair) => vec![Node::Key(&pair.key), Node::from(&pair.value)],
            Node::Key(key) => vec![Node::Identifier(&key.identifier)],
            Node::String(_) | Node::Number(_) | Node::Identifier(_) => Vec::new(),
        }
    }

    /// Node kind name.
    pub fn name(&self) -> &'static str {
        match self {
            Node::Object(_) => "ObjectValue",
            Node::Pair(_) => "Pair",
            Node::Key(_) => "Key",
            Node::String(_) => "StringValue",
            Node::Number(_) => "NumberValue",
            Node::Identifier(_) => "Identifier",
        }
    }

    /// The source token for leaf nodes.
    pub fn token(&self) -> Option<&'a Token> {
        match *self {
            Node::String(s) => Some(&s.token),
            Node::Number(n) => Some(&n.token),
            Node::Identifier(i) => Some(&i.token),
            Node::Object(_) | Node::Pair(_) | Node::Key(_) => None,
        }
    }

    fn walk_inner<F>(self, depth: usize, visit: &mut F)
    where
        F: FnMut(Node<'_>, usize),
    {
        visit(self, depth);
        for child in self.children() {
            child.walk_inner(depth + 1, visit);
        }
    }
}
