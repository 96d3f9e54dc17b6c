//! Core domain types for the Kinship graph.
//!
//! Entities are vertices identified by a unique `name`; relations are directed,
//! kinded edges between two entity names. Both are written only through
//! idempotent upserts, so these types double as the logical identity used to
//! detect duplicates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Property key reserved for the entity identity.
pub const IDENTITY_KEY: &str = "name";

/// Relation kind used by the people graph.
pub const FRIENDS: &str = "FRIENDS";

// ── Attributes ────────────────────────────────────────────────────

/// A single typed attribute value.
///
/// Serialized untagged so that `{"age": 30}` round-trips as `Int(30)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

pub type Attributes = BTreeMap<String, AttributeValue>;

// ── Entities ──────────────────────────────────────────────────────

/// A uniquely named vertex (a `Person` in the people graph).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Check the identity and attribute map before the entity reaches a store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingIdentity);
        }
        for (key, value) in &self.attributes {
            if key.trim().is_empty() {
                return Err(ValidationError::EmptyAttributeKey {
                    entity: self.name.clone(),
                });
            }
            if key == IDENTITY_KEY {
                return Err(ValidationError::ReservedAttribute {
                    entity: self.name.clone(),
                    key: key.clone(),
                });
            }
            if let AttributeValue::Float(f) = value {
                if !f.is_finite() {
                    return Err(ValidationError::NonFiniteAttribute {
                        entity: self.name.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ── Relations ─────────────────────────────────────────────────────

/// A directed, kinded edge between two entity names.
///
/// The `(from, to, kind)` triple is the relation's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    #[serde(default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    FRIENDS.to_string()
}

impl Relation {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: kind.into(),
        }
    }

    /// Shorthand for a `FRIENDS` relation.
    pub fn friends(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, FRIENDS)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(ValidationError::MissingIdentity);
        }
        validate_kind(&self.kind)
    }

    /// Whether this relation joins `a` and `b` in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Relation kinds end up as Cypher relationship types, so only
/// `[A-Z][A-Z0-9_]*` is accepted.
pub fn validate_kind(kind: &str) -> Result<(), ValidationError> {
    let mut chars = kind.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidKind(kind.to_string()))
    }
}

// ── Batches ───────────────────────────────────────────────────────

/// An atomic group of upserts. Entities are always applied before relations,
/// so relations may reference entities introduced by the same batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }

    /// Validate every operation; the first failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.entities.iter().try_for_each(Entity::validate)?;
        self.relations.iter().try_for_each(Relation::validate)
    }
}

// ── Snapshots & Paths ─────────────────────────────────────────────

/// Every entity and relation at a point in time, in store insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

impl GraphSnapshot {
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entity(name).is_some()
    }
}

/// An ordered sequence of distinct entity names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub nodes: Vec<String>,
}

impl Path {
    pub fn new(nodes: Vec<String>) -> Self {
        Self { nodes }
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn start(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    pub fn end(&self) -> Option<&str> {
        self.nodes.last().map(String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nodes.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_validation() {
        assert!(Entity::new("Alice").with_attribute("age", 30).validate().is_ok());
        assert!(matches!(
            Entity::new("  ").validate(),
            Err(ValidationError::MissingIdentity)
        ));
        assert!(matches!(
            Entity::new("Alice").with_attribute("name", "Bob").validate(),
            Err(ValidationError::ReservedAttribute { .. })
        ));
        assert!(matches!(
            Entity::new("Alice").with_attribute("", 1).validate(),
            Err(ValidationError::EmptyAttributeKey { .. })
        ));
        assert!(matches!(
            Entity::new("Alice").with_attribute("score", f64::NAN).validate(),
            Err(ValidationError::NonFiniteAttribute { .. })
        ));
    }

    #[test]
    fn test_relation_kind_validation() {
        assert!(validate_kind("FRIENDS").is_ok());
        assert!(validate_kind("WORKS_WITH_2").is_ok());
        assert!(validate_kind("friends").is_err());
        assert!(validate_kind("FRIENDS]->(x) DETACH DELETE x //").is_err());
        assert!(validate_kind("").is_err());
        assert!(Relation::friends("Alice", "").validate().is_err());
    }

    #[test]
    fn test_attribute_json_is_untagged() {
        let entity: Entity =
            serde_json::from_str(r#"{"name":"Alice","attributes":{"age":30,"city":"Oslo"}}"#)
                .unwrap();
        assert_eq!(entity.attribute("age"), Some(&AttributeValue::Int(30)));
        assert_eq!(entity.attribute("city").and_then(|v| v.as_str()), Some("Oslo"));
    }

    #[test]
    fn test_relation_defaults_to_friends() {
        let rel: Relation = serde_json::from_str(r#"{"from":"Alice","to":"Bob"}"#).unwrap();
        assert_eq!(rel.kind, FRIENDS);
        assert!(rel.connects("Bob", "Alice"));
    }

    #[test]
    fn test_path_length_counts_edges() {
        let path = Path::new(vec!["A".into(), "C".into(), "D".into()]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.start(), Some("A"));
        assert_eq!(path.end(), Some("D"));
        assert_eq!(path.to_string(), "A -> C -> D");
    }
}
