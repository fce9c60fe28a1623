//! The attributed net: relational store plus optional attribute columns.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::net::columns::{Attributes, Column, Columns, SpeciesRecord, TransitionRecord};
use crate::net::ids::{ArcId, IdRange, SpeciesId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::key::Key;
use crate::net::rate::Rate;
use crate::net::store::{Arc, NetStore};

#[derive(Debug, Error)]
pub enum NetError {
    #[error("no entity is named `{0}`")]
    UnknownName(String),
    #[error("{entity} has no {column} and no default was supplied")]
    MissingAttribute { column: Column, entity: String },
    #[error("net does not carry a {0} column")]
    MissingColumn(Column),
    #[error("species {0:?} does not exist in this net")]
    UnknownSpecies(SpeciesId),
    #[error("transition {0:?} does not exist in this net")]
    UnknownTransition(TransitionId),
    #[error("{column} column holds {found} values, expected {expected}")]
    ColumnLength {
        column: Column,
        expected: usize,
        found: usize,
    },
    #[error("input matrix is {input:?} but output matrix is {output:?}")]
    ShapeMismatch {
        input: (usize, usize),
        output: (usize, usize),
    },
}

#[derive(Serialize, Deserialize)]
struct NetRepr {
    store: NetStore,
    #[serde(default)]
    attributes: Attributes,
}

/// A Petri net with an explicit set of attribute columns.
///
/// Nets are append-only: species, transitions and arcs receive stable
/// 1-based identifiers and are never removed. Only attribute values of
/// existing entities can change after insertion.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "NetRepr", into = "NetRepr")]
pub struct Net {
    pub(crate) store: NetStore,
    pub(crate) attributes: Attributes,
}

impl Net {
    /// An empty net without attribute columns.
    pub fn empty() -> Self {
        Self::with_columns(Columns::PETRI)
    }

    /// An empty net carrying the given columns.
    pub fn with_columns(columns: Columns) -> Self {
        Self {
            store: NetStore::new(),
            attributes: Attributes::with_columns(columns),
        }
    }

    pub(crate) fn from_parts(store: NetStore, attributes: Attributes) -> Result<Self, NetError> {
        attributes.check_lengths(store.species_count(), store.transition_count())?;
        Ok(Self { store, attributes })
    }

    pub fn columns(&self) -> Columns {
        self.attributes.columns()
    }

    pub fn store(&self) -> &NetStore {
        &self.store
    }

    pub fn species_count(&self) -> usize {
        self.store.species_count()
    }

    pub fn transition_count(&self) -> usize {
        self.store.transition_count()
    }

    pub fn input_count(&self) -> usize {
        self.store.input_count()
    }

    pub fn output_count(&self) -> usize {
        self.store.output_count()
    }

    pub fn species(&self) -> impl Iterator<Item = SpeciesId> + use<> {
        self.store.species()
    }

    pub fn transitions(&self) -> impl Iterator<Item = TransitionId> + use<> {
        self.store.transitions()
    }

    /// Appends `n` species. Only valid while the net carries no species column.
    pub fn add_species(&mut self, n: usize) -> Result<IdRange<SpeciesId>, NetError> {
        if n > 0 {
            let next = SpeciesId::from_usize(self.species_count());
            self.attributes
                .check_species_record(next, &SpeciesRecord::default())?;
        }
        Ok(self.store.add_species(n))
    }

    /// Appends `n` transitions. Only valid while the net carries no transition column.
    pub fn add_transitions(&mut self, n: usize) -> Result<IdRange<TransitionId>, NetError> {
        if n > 0 {
            let next = TransitionId::from_usize(self.transition_count());
            self.attributes
                .check_transition_record(next, &TransitionRecord::default())?;
        }
        Ok(self.store.add_transitions(n))
    }

    pub fn add_species_with(&mut self, record: SpeciesRecord) -> Result<SpeciesId, NetError> {
        let next = SpeciesId::from_usize(self.species_count());
        self.attributes.check_species_record(next, &record)?;
        self.attributes.push_species(record);
        Ok(self.store.add_species(1).start)
    }

    pub fn add_transition_with(
        &mut self,
        record: TransitionRecord,
    ) -> Result<TransitionId, NetError> {
        let next = TransitionId::from_usize(self.transition_count());
        self.attributes.check_transition_record(next, &record)?;
        self.attributes.push_transition(record);
        Ok(self.store.add_transitions(1).start)
    }

    pub fn add_input(
        &mut self,
        transition: TransitionId,
        species: SpeciesId,
    ) -> Result<ArcId, NetError> {
        self.store.add_input(transition, species)
    }

    pub fn add_output(
        &mut self,
        transition: TransitionId,
        species: SpeciesId,
    ) -> Result<ArcId, NetError> {
        self.store.add_output(transition, species)
    }

    pub fn input_arcs(&self) -> impl Iterator<Item = &Arc> {
        self.store.input_arcs().map(|(_, arc)| arc)
    }

    pub fn output_arcs(&self) -> impl Iterator<Item = &Arc> {
        self.store.output_arcs().map(|(_, arc)| arc)
    }

    pub fn inputs_of(&self, transition: TransitionId) -> impl Iterator<Item = SpeciesId> + '_ {
        self.store.inputs_of(transition)
    }

    pub fn outputs_of(&self, transition: TransitionId) -> impl Iterator<Item = SpeciesId> + '_ {
        self.store.outputs_of(transition)
    }

    pub fn species_name(&self, species: SpeciesId) -> Result<&str, NetError> {
        self.store.check_species(species)?;
        let column = column(&self.attributes.species_names, Column::SpeciesName)?;
        Ok(&column[species])
    }

    pub fn transition_name(&self, transition: TransitionId) -> Result<&str, NetError> {
        self.store.check_transition(transition)?;
        let column = column(&self.attributes.transition_names, Column::TransitionName)?;
        Ok(&column[transition])
    }

    pub fn concentration(&self, species: SpeciesId) -> Result<f64, NetError> {
        self.store.check_species(species)?;
        Ok(column(&self.attributes.concentrations, Column::Concentration)?[species])
    }

    pub fn rate(&self, transition: TransitionId) -> Result<&Rate, NetError> {
        self.store.check_transition(transition)?;
        Ok(&column(&self.attributes.rates, Column::Rate)?[transition])
    }

    pub fn species_property(&self, species: SpeciesId) -> Result<&Value, NetError> {
        self.store.check_species(species)?;
        Ok(&column(&self.attributes.species_properties, Column::SpeciesProperty)?[species])
    }

    pub fn transition_property(&self, transition: TransitionId) -> Result<&Value, NetError> {
        self.store.check_transition(transition)?;
        Ok(&column(&self.attributes.transition_properties, Column::TransitionProperty)?[transition])
    }

    pub fn rates(&self) -> Result<&IndexVec<TransitionId, Rate>, NetError> {
        column(&self.attributes.rates, Column::Rate)
    }

    pub fn concentrations(&self) -> Result<&IndexVec<SpeciesId, f64>, NetError> {
        column(&self.attributes.concentrations, Column::Concentration)
    }

    /// Name of `species` when the net is labelled, its index otherwise.
    pub fn species_key(&self, species: SpeciesId) -> Key {
        match self.attributes.species_names.as_ref().and_then(|names| names.get(species)) {
            Some(name) => Key::Name(name.clone()),
            None => Key::from(species),
        }
    }

    pub fn transition_key(&self, transition: TransitionId) -> Key {
        match self
            .attributes
            .transition_names
            .as_ref()
            .and_then(|names| names.get(transition))
        {
            Some(name) => Key::Name(name.clone()),
            None => Key::from(transition),
        }
    }

    pub fn species_keys(&self) -> Vec<Key> {
        self.species().map(|s| self.species_key(s)).collect()
    }

    pub fn transition_keys(&self) -> Vec<Key> {
        self.transitions().map(|t| self.transition_key(t)).collect()
    }

    /// First species carrying `name`.
    pub fn find_species(&self, name: &str) -> Result<SpeciesId, NetError> {
        let names = column(&self.attributes.species_names, Column::SpeciesName)?;
        names
            .iter_enumerated()
            .find(|(_, candidate)| candidate.as_str() == name)
            .map(|(id, _)| id)
            .ok_or_else(|| NetError::UnknownName(name.to_owned()))
    }

    /// First transition carrying `name`.
    pub fn find_transition(&self, name: &str) -> Result<TransitionId, NetError> {
        let names = column(&self.attributes.transition_names, Column::TransitionName)?;
        names
            .iter_enumerated()
            .find(|(_, candidate)| candidate.as_str() == name)
            .map(|(id, _)| id)
            .ok_or_else(|| NetError::UnknownName(name.to_owned()))
    }

    pub fn set_species_name(
        &mut self,
        species: SpeciesId,
        name: impl Into<String>,
    ) -> Result<(), NetError> {
        self.store.check_species(species)?;
        column_mut(&mut self.attributes.species_names, Column::SpeciesName)?[species] = name.into();
        Ok(())
    }

    pub fn set_transition_name(
        &mut self,
        transition: TransitionId,
        name: impl Into<String>,
    ) -> Result<(), NetError> {
        self.store.check_transition(transition)?;
        column_mut(&mut self.attributes.transition_names, Column::TransitionName)?[transition] =
            name.into();
        Ok(())
    }

    pub fn set_concentration(&mut self, species: SpeciesId, value: f64) -> Result<(), NetError> {
        self.store.check_species(species)?;
        column_mut(&mut self.attributes.concentrations, Column::Concentration)?[species] = value;
        Ok(())
    }

    pub fn set_rate(
        &mut self,
        transition: TransitionId,
        rate: impl Into<Rate>,
    ) -> Result<(), NetError> {
        self.store.check_transition(transition)?;
        column_mut(&mut self.attributes.rates, Column::Rate)?[transition] = rate.into();
        Ok(())
    }

    pub fn set_species_property(
        &mut self,
        species: SpeciesId,
        value: Value,
    ) -> Result<(), NetError> {
        self.store.check_species(species)?;
        column_mut(&mut self.attributes.species_properties, Column::SpeciesProperty)?[species] =
            value;
        Ok(())
    }

    pub fn set_transition_property(
        &mut self,
        transition: TransitionId,
        value: Value,
    ) -> Result<(), NetError> {
        self.store.check_transition(transition)?;
        column_mut(
            &mut self.attributes.transition_properties,
            Column::TransitionProperty,
        )?[transition] = value;
        Ok(())
    }

    /// Every attribute value `species` carries, ready to append elsewhere.
    pub fn species_record(&self, species: SpeciesId) -> Result<SpeciesRecord, NetError> {
        self.store.check_species(species)?;
        let attrs = &self.attributes;
        Ok(SpeciesRecord {
            name: attrs.species_names.as_ref().map(|c| c[species].clone()),
            concentration: attrs.concentrations.as_ref().map(|c| c[species]),
            property: attrs.species_properties.as_ref().map(|c| c[species].clone()),
        })
    }

    pub fn transition_record(&self, transition: TransitionId) -> Result<TransitionRecord, NetError> {
        self.store.check_transition(transition)?;
        let attrs = &self.attributes;
        Ok(TransitionRecord {
            name: attrs.transition_names.as_ref().map(|c| c[transition].clone()),
            rate: attrs.rates.as_ref().map(|c| c[transition].clone()),
            property: attrs.transition_properties.as_ref().map(|c| c[transition].clone()),
        })
    }

    /// Concentrations as a dense state vector in species order.
    pub fn initial_state(&self) -> Result<Vec<f64>, NetError> {
        Ok(self.concentrations()?.as_slice().to_vec())
    }
}

impl Default for Net {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<NetRepr> for Net {
    type Error = NetError;

    fn try_from(repr: NetRepr) -> Result<Self, Self::Error> {
        Net::from_parts(repr.store, repr.attributes)
    }
}

impl From<Net> for NetRepr {
    fn from(net: Net) -> Self {
        NetRepr {
            store: net.store,
            attributes: net.attributes,
        }
    }
}

fn column<I, T>(column: &Option<IndexVec<I, T>>, which: Column) -> Result<&IndexVec<I, T>, NetError> {
    column.as_ref().ok_or(NetError::MissingColumn(which))
}

fn column_mut<I, T>(
    column: &mut Option<IndexVec<I, T>>,
    which: Column,
) -> Result<&mut IndexVec<I, T>, NetError> {
    column.as_mut().ok_or(NetError::MissingColumn(which))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_sir() -> Net {
        let mut net = Net::with_columns(Columns::LABELLED);
        let s = net.add_species_with(SpeciesRecord::named("S")).unwrap();
        let i = net.add_species_with(SpeciesRecord::named("I")).unwrap();
        let r = net.add_species_with(SpeciesRecord::named("R")).unwrap();
        let inf = net.add_transition_with(TransitionRecord::named("inf")).unwrap();
        let rec = net.add_transition_with(TransitionRecord::named("rec")).unwrap();
        net.add_input(inf, s).unwrap();
        net.add_input(inf, i).unwrap();
        net.add_output(inf, i).unwrap();
        net.add_output(inf, i).unwrap();
        net.add_input(rec, i).unwrap();
        net.add_output(rec, r).unwrap();
        net
    }

    #[test]
    fn append_operations_update_counts() {
        let net = labelled_sir();
        assert_eq!(net.species_count(), 3);
        assert_eq!(net.transition_count(), 2);
        assert_eq!(net.input_count(), 3);
        assert_eq!(net.output_count(), 3);
        assert_eq!(net.species_name(SpeciesId::new(2)).unwrap(), "I");
        assert_eq!(net.find_transition("rec").unwrap(), TransitionId::new(2));
    }

    #[test]
    fn keys_fall_back_to_indices() {
        let mut plain = Net::empty();
        plain.add_species(2).unwrap();
        assert_eq!(plain.species_keys(), vec![Key::Index(1), Key::Index(2)]);
        assert_eq!(
            labelled_sir().species_keys(),
            vec![Key::from("S"), Key::from("I"), Key::from("R")]
        );
    }

    #[test]
    fn missing_columns_are_reported() {
        let mut net = Net::empty();
        net.add_species(1).unwrap();
        assert!(matches!(
            net.concentration(SpeciesId::new(1)),
            Err(NetError::MissingColumn(Column::Concentration))
        ));
        assert!(matches!(
            net.find_species("S"),
            Err(NetError::MissingColumn(Column::SpeciesName))
        ));
    }

    #[test]
    fn bulk_insertion_requires_column_values() {
        let mut net = Net::with_columns(Columns::LABELLED);
        assert!(matches!(
            net.add_species(2),
            Err(NetError::MissingAttribute {
                column: Column::SpeciesName,
                ..
            })
        ));
        assert_eq!(net.species_count(), 0);
    }

    #[test]
    fn duplicate_names_resolve_to_first() {
        let mut net = Net::with_columns(Columns::SPECIES_NAME);
        net.add_species_with(SpeciesRecord::named("X")).unwrap();
        net.add_species_with(SpeciesRecord::named("X")).unwrap();
        assert_eq!(net.find_species("X").unwrap(), SpeciesId::new(1));
        assert!(matches!(
            net.find_species("Y"),
            Err(NetError::UnknownName(name)) if name == "Y"
        ));
    }

    #[test]
    fn attribute_setters_overwrite() {
        let mut net = labelled_sir();
        net.set_species_name(SpeciesId::new(3), "D").unwrap();
        assert_eq!(net.species_name(SpeciesId::new(3)).unwrap(), "D");
        assert!(matches!(
            net.set_rate(TransitionId::new(1), 0.1),
            Err(NetError::MissingColumn(Column::Rate))
        ));
    }

    #[test]
    fn serde_round_trip_preserves_net() {
        let net = labelled_sir();
        let json = serde_json::to_string(&net).unwrap();
        let back: Net = serde_json::from_str(&json).unwrap();
        assert_eq!(back, net);
    }
}
