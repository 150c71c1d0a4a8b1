//! Ephemeral presence state: who is editing and where their cursor is.
//!
//! Presence travels over the same channel as operations but never touches the
//! RGA, and nothing here is ever part of a snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crdt::ReplicaId;

const COLORS: [&str; 7] = [
    "#e74c3c", "#8e44ad", "#3498db", "#1abc9c", "#f1c40f", "#e67e22", "#2ecc71",
];

const ADJECTIVES: [&str; 9] = [
    "Ancient",
    "Creative",
    "Dangerous",
    "Effective",
    "Flying",
    "Gilded",
    "Hyper",
    "Incredible",
    "Joyful",
];

const ANIMALS: [&str; 9] = [
    "Bear", "Capybara", "Dingo", "Eagle", "Falcon", "Goat", "Hamster", "Iguana", "Jaguar",
];

/// Display name and color shown next to a collaborator's cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub color: String,
}

impl Identity {
    /// Derives a stable identity from the replica id, so every participant
    /// shows the same name for the same collaborator without coordination.
    pub fn for_replica(replica_id: ReplicaId) -> Self {
        let pick = |len: usize, factor: u64| (replica_id.wrapping_mul(factor) % len as u64) as usize;

        Identity {
            name: format!(
                "{} {}",
                ADJECTIVES[pick(ADJECTIVES.len(), 1)],
                ANIMALS[pick(ANIMALS.len(), 3)]
            ),
            color: COLORS[pick(COLORS.len(), 1)].to_string(),
        }
    }
}

/// Last known cursor of a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub identity: Identity,
}

/// Latest cursor per replica.
#[derive(Debug, Clone, Default)]
pub struct Cursors {
    cursors: BTreeMap<ReplicaId, Cursor>,
}

impl Cursors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cursor move. Falls back to the derived identity when the
    /// message carried none.
    pub fn update(&mut self, replica_id: ReplicaId, index: usize, identity: Option<Identity>) {
        let identity = identity.unwrap_or_else(|| Identity::for_replica(replica_id));
        self.cursors.insert(replica_id, Cursor { index, identity });
    }

    pub fn remove(&mut self, replica_id: ReplicaId) -> Option<Cursor> {
        self.cursors.remove(&replica_id)
    }

    pub fn get(&self, replica_id: ReplicaId) -> Option<&Cursor> {
        self.cursors.get(&replica_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReplicaId, &Cursor)> + '_ {
        self.cursors.iter().map(|(id, cursor)| (*id, cursor))
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_deterministic() {
        assert_eq!(Identity::for_replica(12345), Identity::for_replica(12345));
        assert_eq!(
            Identity::for_replica(0),
            Identity {
                name: "Ancient Bear".to_string(),
                color: "#e74c3c".to_string(),
            }
        );
        assert_eq!(Identity::for_replica(4).name, "Flying Eagle");
    }

    #[test]
    fn test_identity_for_extreme_ids() {
        let identity = Identity::for_replica(u64::MAX);
        assert!(COLORS.contains(&identity.color.as_str()));
    }

    #[test]
    fn test_cursors_track_latest_position() {
        let mut cursors = Cursors::new();
        cursors.update(7, 3, None);
        cursors.update(7, 5, None);
        cursors.update(
            2,
            0,
            Some(Identity {
                name: "Ada".to_string(),
                color: "#000000".to_string(),
            }),
        );

        assert_eq!(cursors.len(), 2);
        assert_eq!(cursors.get(7).map(|c| c.index), Some(5));
        assert_eq!(cursors.get(7).unwrap().identity, Identity::for_replica(7));
        assert_eq!(cursors.get(2).unwrap().identity.name, "Ada");

        let order: Vec<_> = cursors.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![2, 7]);

        assert!(cursors.remove(2).is_some());
        assert_eq!(cursors.len(), 1);
    }
}
