use std::collections::HashMap;

use indexmap::IndexMap;

use crate::net::{Idx, Key, Net, NetError, SpeciesId};

/// Maps species keys onto dense state slots, in species order.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesLayout {
    keys: Vec<Key>,
    slots: HashMap<Key, usize>,
}

impl SpeciesLayout {
    pub fn of(net: &Net) -> Self {
        Self::from_keys(net.species_keys())
    }

    pub fn from_keys(keys: Vec<Key>) -> Self {
        let mut slots = HashMap::with_capacity(keys.len());
        for (slot, key) in keys.iter().enumerate() {
            slots.entry(key.clone()).or_insert(slot);
        }
        Self { keys, slots }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Slot of the first species carrying `key`, or else its [`Key::alias`].
    pub fn slot(&self, key: &Key) -> Option<usize> {
        self.slots
            .get(key)
            .or_else(|| key.alias().and_then(|alias| self.slots.get(&alias)))
            .copied()
    }

    /// Dense vector from keyed values. Species without a value start at zero.
    pub fn dense<K: Into<Key>>(
        &self,
        values: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<Vec<f64>, NetError> {
        let mut dense = vec![0.0; self.len()];
        for (key, value) in values {
            let key = key.into();
            let slot = self
                .slot(&key)
                .ok_or_else(|| NetError::UnknownName(key.to_string()))?;
            dense[slot] = value;
        }
        Ok(dense)
    }

    /// Keyed view of a dense vector. A repeated key keeps its first position
    /// and the last value.
    pub fn keyed(&self, values: &[f64]) -> IndexMap<Key, f64> {
        self.keys.iter().cloned().zip(values.iter().copied()).collect()
    }
}

/// Read-only view of the state vector handed to state-dependent rates.
#[derive(Clone, Copy, Debug)]
pub struct State<'a> {
    layout: &'a SpeciesLayout,
    values: &'a [f64],
}

impl<'a> State<'a> {
    pub fn new(layout: &'a SpeciesLayout, values: &'a [f64]) -> Self {
        Self { layout, values }
    }

    /// Value of the first species carrying `key`.
    pub fn get(&self, key: impl Into<Key>) -> Option<f64> {
        self.layout
            .slot(&key.into())
            .and_then(|slot| self.values.get(slot).copied())
    }

    /// `None` for an id outside the net, zero included.
    pub fn species(&self, species: SpeciesId) -> Option<f64> {
        if species.raw() == 0 {
            return None;
        }
        self.values.get(species.index()).copied()
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Sum over every species, the usual normaliser for frequency-dependent rates.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_and_keyed_agree() {
        let layout = SpeciesLayout::from_keys(vec![Key::from("S"), Key::from("I"), Key::from("R")]);
        let dense = layout.dense([("I", 1.0), ("S", 10.0)]).unwrap();
        assert_eq!(dense, vec![10.0, 1.0, 0.0]);
        let keyed = layout.keyed(&dense);
        assert_eq!(keyed[&Key::from("S")], 10.0);
        assert!(matches!(
            layout.dense([("X", 1.0)]),
            Err(NetError::UnknownName(name)) if name == "X"
        ));
    }

    #[test]
    fn state_reads_by_key_and_id() {
        let layout = SpeciesLayout::from_keys(vec![Key::Index(1), Key::Index(2)]);
        let values = [3.0, 4.0];
        let state = State::new(&layout, &values);
        assert_eq!(state.get(2u32), Some(4.0));
        assert_eq!(state.species(SpeciesId::new(1)), Some(3.0));
        assert_eq!(state.species(SpeciesId::new(0)), None);
        assert_eq!(state.species(SpeciesId::new(3)), None);
        assert_eq!(state.total(), 7.0);
        assert_eq!(state.get("S"), None);
    }

    #[test]
    fn digit_keys_reach_species_named_by_digits() {
        let layout = SpeciesLayout::from_keys(vec![Key::from("S"), Key::from("1")]);
        assert_eq!(layout.slot(&Key::Index(1)), Some(1));
        assert_eq!(layout.slot(&Key::Index(2)), None);

        let unlabelled = SpeciesLayout::from_keys(vec![Key::Index(1), Key::Index(2)]);
        assert_eq!(unlabelled.slot(&Key::from("2")), Some(1));
    }

    #[test]
    fn duplicate_keys_resolve_to_first_slot() {
        let layout = SpeciesLayout::from_keys(vec![Key::from("X"), Key::from("X")]);
        assert_eq!(layout.slot(&Key::from("X")), Some(0));
    }
}
