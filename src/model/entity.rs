//! Rated entities and the roster that owns them.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TeamError};

/// Dense handle to an entity, valid for the [`Roster`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub usize);

impl EntityId {
    /// Position of the entity in its roster.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rated entity (a "player").
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    name: String,
    rating: i64,
}

impl Entity {
    /// Creates an entity.
    pub fn new(name: impl Into<String>, rating: i64) -> Self {
        Self {
            name: name.into(),
            rating,
        }
    }

    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Skill rating.
    pub fn rating(&self) -> i64 {
        self.rating
    }
}

/// The fixed set of entities to partition.
///
/// Names are unique case-insensitively; [`Roster::lookup`] resolves a
/// name to its [`EntityId`] regardless of case.
///
/// # Examples
///
/// ```
/// use u_teams::model::Roster;
///
/// let mut roster = Roster::new();
/// let alice = roster.push("Alice", 10).unwrap();
/// roster.push("Bob", 7).unwrap();
///
/// assert_eq!(roster.lookup("ALICE"), Some(alice));
/// assert_eq!(roster.lookup("Carol"), None);
/// assert_eq!(roster.total_rating(), 17);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entities: Vec<Entity>,
    by_name: HashMap<String, EntityId>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from `(name, rating)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut roster = Self::new();
        for (name, rating) in pairs {
            roster.push(name, rating)?;
        }
        Ok(roster)
    }

    /// Adds an entity and returns its id.
    pub fn push(&mut self, name: impl Into<String>, rating: i64) -> Result<EntityId> {
        self.insert(Entity::new(name, rating))
    }

    /// Adds an already-built entity and returns its id.
    pub fn insert(&mut self, entity: Entity) -> Result<EntityId> {
        let key = entity.name.to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(TeamError::DuplicateEntity(entity.name));
        }
        let id = EntityId(self.entities.len());
        self.by_name.insert(key, id);
        self.entities.push(entity);
        Ok(id)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the entity for `id`, if it belongs to this roster.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    /// Returns the entity for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this roster.
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    /// Rating of `id`.
    pub fn rating(&self, id: EntityId) -> i64 {
        self.entities[id.0].rating
    }

    /// Whether `id` belongs to this roster.
    pub fn contains(&self, id: EntityId) -> bool {
        id.0 < self.entities.len()
    }

    /// All ids in roster order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        (0..self.entities.len()).map(EntityId)
    }

    /// `(id, entity)` pairs in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i), e))
    }

    /// Case-insensitive name lookup. A miss is `None`.
    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Case-insensitive name lookup returning the entity itself.
    pub fn lookup_entity(&self, name: &str) -> Option<&Entity> {
        self.lookup(name).map(|id| self.entity(id))
    }

    /// Sum of all ratings.
    pub fn total_rating(&self) -> i64 {
        self.entities.iter().map(|e| e.rating).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_dense_ids() {
        let mut roster = Roster::new();
        assert_eq!(roster.push("a", 1).unwrap(), EntityId(0));
        assert_eq!(roster.push("b", 2).unwrap(), EntityId(1));
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.rating(EntityId(1)), 2);
    }

    #[test]
    fn test_duplicate_name_is_rejected_case_insensitively() {
        let mut roster = Roster::new();
        roster.push("Alice", 5).unwrap();
        let err = roster.push("alice", 3).unwrap_err();
        assert!(matches!(err, TeamError::DuplicateEntity(name) if name == "alice"));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let roster = Roster::from_pairs([("Alice", 5), ("Bob", 3)]).unwrap();
        assert_eq!(roster.lookup("bOB"), Some(EntityId(1)));
        assert_eq!(roster.lookup_entity("alice").map(Entity::rating), Some(5));
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let roster = Roster::from_pairs([("Alice", 5)]).unwrap();
        assert!(roster.lookup("Zed").is_none());
        assert!(roster.get(EntityId(3)).is_none());
        assert!(!roster.contains(EntityId(1)));
    }
}
