//! Relational tables behind every net: species, transitions, input arcs and
//! output arcs, with the arc tables indexed by both foreign keys.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::core::NetError;
use crate::net::ids::{ArcId, IdRange, SpeciesId, TransitionId};
use crate::net::index_vec::IndexVec;

type ArcBucket = SmallVec<[ArcId; 4]>;

/// One incidence record. Repeating the same pair encodes a stoichiometric
/// coefficient above one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Arc {
    pub transition: TransitionId,
    pub species: SpeciesId,
}

impl Arc {
    pub fn new(transition: TransitionId, species: SpeciesId) -> Self {
        Self {
            transition,
            species,
        }
    }
}

#[derive(Clone, Default, PartialEq, Debug)]
struct SpeciesRow {
    consumed_by: ArcBucket,
    produced_by: ArcBucket,
}

#[derive(Clone, Default, PartialEq, Debug)]
struct TransitionRow {
    inputs: ArcBucket,
    outputs: ArcBucket,
}

/// Serialized form: counts plus the two arc tables. Indexes are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct StoreRepr {
    species: usize,
    transitions: usize,
    inputs: Vec<Arc>,
    outputs: Vec<Arc>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "StoreRepr", into = "StoreRepr")]
pub struct NetStore {
    species: IndexVec<SpeciesId, SpeciesRow>,
    transitions: IndexVec<TransitionId, TransitionRow>,
    inputs: IndexVec<ArcId, Arc>,
    outputs: IndexVec<ArcId, Arc>,
}

impl NetStore {
    pub fn new() -> Self {
        Self {
            species: IndexVec::new(),
            transitions: IndexVec::new(),
            inputs: IndexVec::new(),
            outputs: IndexVec::new(),
        }
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn species(&self) -> impl Iterator<Item = SpeciesId> + use<> {
        self.species.ids()
    }

    pub fn transitions(&self) -> impl Iterator<Item = TransitionId> + use<> {
        self.transitions.ids()
    }

    pub fn add_species(&mut self, n: usize) -> IdRange<SpeciesId> {
        self.species
            .extend_range(std::iter::repeat_n(SpeciesRow::default(), n))
    }

    pub fn add_transitions(&mut self, n: usize) -> IdRange<TransitionId> {
        self.transitions
            .extend_range(std::iter::repeat_n(TransitionRow::default(), n))
    }

    pub fn check_species(&self, species: SpeciesId) -> Result<(), NetError> {
        if species.raw() == 0 || !self.species.contains(species) {
            return Err(NetError::UnknownSpecies(species));
        }
        Ok(())
    }

    pub fn check_transition(&self, transition: TransitionId) -> Result<(), NetError> {
        if transition.raw() == 0 || !self.transitions.contains(transition) {
            return Err(NetError::UnknownTransition(transition));
        }
        Ok(())
    }

    /// Records that `transition` consumes one unit of `species`.
    pub fn add_input(
        &mut self,
        transition: TransitionId,
        species: SpeciesId,
    ) -> Result<ArcId, NetError> {
        self.check_transition(transition)?;
        self.check_species(species)?;
        let arc = self.inputs.push(Arc::new(transition, species));
        self.transitions[transition].inputs.push(arc);
        self.species[species].consumed_by.push(arc);
        Ok(arc)
    }

    /// Records that `transition` produces one unit of `species`.
    pub fn add_output(
        &mut self,
        transition: TransitionId,
        species: SpeciesId,
    ) -> Result<ArcId, NetError> {
        self.check_transition(transition)?;
        self.check_species(species)?;
        let arc = self.outputs.push(Arc::new(transition, species));
        self.transitions[transition].outputs.push(arc);
        self.species[species].produced_by.push(arc);
        Ok(arc)
    }

    pub fn input_arcs(&self) -> impl Iterator<Item = (ArcId, &Arc)> {
        self.inputs.iter_enumerated()
    }

    pub fn output_arcs(&self) -> impl Iterator<Item = (ArcId, &Arc)> {
        self.outputs.iter_enumerated()
    }

    pub fn input(&self, arc: ArcId) -> Option<&Arc> {
        self.inputs.get(arc)
    }

    pub fn output(&self, arc: ArcId) -> Option<&Arc> {
        self.outputs.get(arc)
    }

    /// Species consumed by `transition`, one entry per arc, in insertion order.
    pub fn inputs_of(&self, transition: TransitionId) -> impl Iterator<Item = SpeciesId> + '_ {
        self.transitions
            .get(transition)
            .into_iter()
            .flat_map(|row| row.inputs.iter())
            .map(|arc| self.inputs[*arc].species)
    }

    /// Species produced by `transition`, one entry per arc, in insertion order.
    pub fn outputs_of(&self, transition: TransitionId) -> impl Iterator<Item = SpeciesId> + '_ {
        self.transitions
            .get(transition)
            .into_iter()
            .flat_map(|row| row.outputs.iter())
            .map(|arc| self.outputs[*arc].species)
    }

    /// Transitions consuming `species`, one entry per arc.
    pub fn consumers_of(&self, species: SpeciesId) -> impl Iterator<Item = TransitionId> + '_ {
        self.species
            .get(species)
            .into_iter()
            .flat_map(|row| row.consumed_by.iter())
            .map(|arc| self.inputs[*arc].transition)
    }

    /// Transitions producing `species`, one entry per arc.
    pub fn producers_of(&self, species: SpeciesId) -> impl Iterator<Item = TransitionId> + '_ {
        self.species
            .get(species)
            .into_iter()
            .flat_map(|row| row.produced_by.iter())
            .map(|arc| self.outputs[*arc].transition)
    }
}

impl Default for NetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<StoreRepr> for NetStore {
    type Error = NetError;

    fn try_from(repr: StoreRepr) -> Result<Self, Self::Error> {
        let mut store = NetStore::new();
        store.add_species(repr.species);
        store.add_transitions(repr.transitions);
        for arc in repr.inputs {
            store.add_input(arc.transition, arc.species)?;
        }
        for arc in repr.outputs {
            store.add_output(arc.transition, arc.species)?;
        }
        Ok(store)
    }
}

impl From<NetStore> for StoreRepr {
    fn from(store: NetStore) -> Self {
        StoreRepr {
            species: store.species.len(),
            transitions: store.transitions.len(),
            inputs: store.inputs.iter().copied().collect(),
            outputs: store.outputs.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_are_indexed_both_ways() {
        let mut store = NetStore::new();
        let species = store.add_species(2);
        let transitions = store.add_transitions(1);
        let s1 = species.start;
        let s2 = SpeciesId::new(2);
        let t = transitions.start;

        store.add_input(t, s1).unwrap();
        store.add_input(t, s1).unwrap();
        store.add_output(t, s2).unwrap();

        assert_eq!(store.inputs_of(t).collect::<Vec<_>>(), vec![s1, s1]);
        assert_eq!(store.outputs_of(t).collect::<Vec<_>>(), vec![s2]);
        assert_eq!(store.consumers_of(s1).count(), 2);
        assert_eq!(store.producers_of(s2).collect::<Vec<_>>(), vec![t]);
        assert_eq!(store.consumers_of(s2).count(), 0);
    }

    #[test]
    fn dangling_arcs_are_rejected() {
        let mut store = NetStore::new();
        store.add_species(1);
        store.add_transitions(1);
        assert!(matches!(
            store.add_input(TransitionId::new(1), SpeciesId::new(2)),
            Err(NetError::UnknownSpecies(_))
        ));
        assert!(matches!(
            store.add_output(TransitionId::new(2), SpeciesId::new(1)),
            Err(NetError::UnknownTransition(_))
        ));
        assert!(matches!(
            store.add_output(TransitionId::new(0), SpeciesId::new(1)),
            Err(NetError::UnknownTransition(_))
        ));
        assert_eq!(store.input_count() + store.output_count(), 0);
    }

    #[test]
    fn serialized_store_rebuilds_indexes() {
        let mut store = NetStore::new();
        store.add_species(2);
        store.add_transitions(1);
        store.add_input(TransitionId::new(1), SpeciesId::new(1)).unwrap();
        store.add_output(TransitionId::new(1), SpeciesId::new(2)).unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let back: NetStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }
}
