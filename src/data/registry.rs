//! Explicit lookup of mechanism definitions by id and by slot.

use std::collections::BTreeMap;

use crate::mechanisms::MechanismDefinition;

/// Read-only index over a set of definitions. Built once and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct MechanismRegistry {
    definitions: Vec<MechanismDefinition>,
    by_id: BTreeMap<u64, Vec<usize>>,
    by_slot: BTreeMap<String, Vec<usize>>,
}

impl MechanismRegistry {
    pub fn new(definitions: Vec<MechanismDefinition>) -> Self {
        let mut by_id: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        let mut by_slot: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, definition) in definitions.iter().enumerate() {
            by_id.entry(definition.id).or_default().push(index);
            by_slot
                .entry(definition.slot_key.clone())
                .or_default()
                .push(index);
        }
        Self {
            definitions,
            by_id,
            by_slot,
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &[MechanismDefinition] {
        &self.definitions
    }

    /// First definition registered under `id`.
    pub fn get(&self, id: u64) -> Option<&MechanismDefinition> {
        let index = *self.by_id.get(&id)?.first()?;
        self.definitions.get(index)
    }

    pub fn in_slot(&self, slot_key: &str) -> Vec<&MechanismDefinition> {
        self.by_slot
            .get(slot_key)
            .map(|indices| indices.iter().map(|&i| &self.definitions[i]).collect())
            .unwrap_or_default()
    }

    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.by_slot.keys().map(String::as_str)
    }

    /// Ids registered more than once, with their occurrence count.
    pub fn duplicate_ids(&self) -> Vec<(u64, usize)> {
        self.by_id
            .iter()
            .filter(|(_, indices)| indices.len() > 1)
            .map(|(id, indices)| (*id, indices.len()))
            .collect()
    }

    /// Slots occupied by more than one mechanism.
    pub fn contested_slots(&self) -> Vec<(&str, Vec<&MechanismDefinition>)> {
        self.by_slot
            .iter()
            .filter(|(_, indices)| indices.len() > 1)
            .map(|(slot, indices)| {
                (
                    slot.as_str(),
                    indices.iter().map(|&i| &self.definitions[i]).collect(),
                )
            })
            .collect()
    }

    /// Definitions for `ids` in the given order, or the first id that is unknown.
    pub fn select(&self, ids: &[u64]) -> Result<Vec<MechanismDefinition>, u64> {
        ids.iter()
            .map(|&id| self.get(id).cloned().ok_or(id))
            .collect()
    }
}

impl FromIterator<MechanismDefinition> for MechanismRegistry {
    fn from_iter<I: IntoIterator<Item = MechanismDefinition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
