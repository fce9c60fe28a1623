//! Conversions between net variants.
//!
//! A cast copies the relational store unchanged and rebuilds the attribute
//! columns of the target variant. For every entity the value comes from, in
//! order: the supplied mapping, the source net's own column, the supplied
//! default. When none applies the cast fails.
use indexmap::IndexMap;
use serde_json::Value;

use crate::net::columns::{Attributes, Column, Columns};
use crate::net::core::{Net, NetError};
use crate::net::ids::{SpeciesId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::rate::Rate;

/// Attribute values and defaults supplied to [`Net::cast`].
#[derive(Clone, Debug, Default)]
pub struct CastAttributes {
    species_names: IndexMap<SpeciesId, String>,
    transition_names: IndexMap<TransitionId, String>,
    concentrations: IndexMap<SpeciesId, f64>,
    rates: IndexMap<TransitionId, Rate>,
    species_properties: IndexMap<SpeciesId, Value>,
    transition_properties: IndexMap<TransitionId, Value>,
    default_concentration: Option<f64>,
    default_rate: Option<Rate>,
    default_species_property: Option<Value>,
    default_transition_property: Option<Value>,
}

impl CastAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species_name(mut self, species: SpeciesId, name: impl Into<String>) -> Self {
        self.species_names.insert(species, name.into());
        self
    }

    pub fn transition_name(mut self, transition: TransitionId, name: impl Into<String>) -> Self {
        self.transition_names.insert(transition, name.into());
        self
    }

    pub fn concentration(mut self, species: SpeciesId, value: f64) -> Self {
        self.concentrations.insert(species, value);
        self
    }

    pub fn rate(mut self, transition: TransitionId, rate: impl Into<Rate>) -> Self {
        self.rates.insert(transition, rate.into());
        self
    }

    pub fn species_property(mut self, species: SpeciesId, value: Value) -> Self {
        self.species_properties.insert(species, value);
        self
    }

    pub fn transition_property(mut self, transition: TransitionId, value: Value) -> Self {
        self.transition_properties.insert(transition, value);
        self
    }

    pub fn concentrations(mut self, values: impl IntoIterator<Item = (SpeciesId, f64)>) -> Self {
        self.concentrations.extend(values);
        self
    }

    pub fn rates(mut self, values: impl IntoIterator<Item = (TransitionId, Rate)>) -> Self {
        self.rates.extend(values);
        self
    }

    pub fn default_concentration(mut self, value: f64) -> Self {
        self.default_concentration = Some(value);
        self
    }

    pub fn default_rate(mut self, rate: impl Into<Rate>) -> Self {
        self.default_rate = Some(rate.into());
        self
    }

    pub fn default_species_property(mut self, value: Value) -> Self {
        self.default_species_property = Some(value);
        self
    }

    pub fn default_transition_property(mut self, value: Value) -> Self {
        self.default_transition_property = Some(value);
        self
    }
}

/// Builds one target column of `len` entries.
fn fill_column<I, T>(
    column: Column,
    len: usize,
    supplied: &IndexMap<I, T>,
    source: Option<&IndexVec<I, T>>,
    default: Option<&T>,
) -> Result<IndexVec<I, T>, NetError>
where
    I: Idx + std::hash::Hash + std::fmt::Display,
    T: Clone,
{
    let mut values = IndexVec::with_capacity(len);
    for position in 0..len {
        let id = I::from_usize(position);
        let value = supplied
            .get(&id)
            .or_else(|| source.and_then(|source| source.get(id)))
            .or(default)
            .ok_or_else(|| NetError::MissingAttribute {
                column,
                entity: id.to_string(),
            })?;
        values.push(value.clone());
    }
    Ok(values)
}

fn check_keys<I>(
    keys: impl Iterator<Item = I>,
    check: impl Fn(I) -> Result<(), NetError>,
) -> Result<(), NetError> {
    keys.map(check).collect()
}

impl Net {
    /// Copies this net into the variant described by `target`.
    ///
    /// Species, transitions and arcs keep their identifiers. Columns not in
    /// `target` are dropped.
    pub fn cast(&self, target: Columns, attrs: CastAttributes) -> Result<Net, NetError> {
        let species = self.species_count();
        let transitions = self.transition_count();

        check_keys(
            attrs
                .species_names
                .keys()
                .chain(attrs.concentrations.keys())
                .chain(attrs.species_properties.keys())
                .copied(),
            |id| self.store.check_species(id),
        )?;
        check_keys(
            attrs
                .transition_names
                .keys()
                .chain(attrs.rates.keys())
                .chain(attrs.transition_properties.keys())
                .copied(),
            |id| self.store.check_transition(id),
        )?;

        let source = &self.attributes;
        let mut attributes = Attributes::default();
        if target.has(Column::SpeciesName) {
            attributes.species_names = Some(fill_column(
                Column::SpeciesName,
                species,
                &attrs.species_names,
                source.species_names.as_ref(),
                None,
            )?);
        }
        if target.has(Column::TransitionName) {
            attributes.transition_names = Some(fill_column(
                Column::TransitionName,
                transitions,
                &attrs.transition_names,
                source.transition_names.as_ref(),
                None,
            )?);
        }
        if target.has(Column::Concentration) {
            attributes.concentrations = Some(fill_column(
                Column::Concentration,
                species,
                &attrs.concentrations,
                source.concentrations.as_ref(),
                attrs.default_concentration.as_ref(),
            )?);
        }
        if target.has(Column::Rate) {
            attributes.rates = Some(fill_column(
                Column::Rate,
                transitions,
                &attrs.rates,
                source.rates.as_ref(),
                attrs.default_rate.as_ref(),
            )?);
        }
        if target.has(Column::SpeciesProperty) {
            attributes.species_properties = Some(fill_column(
                Column::SpeciesProperty,
                species,
                &attrs.species_properties,
                source.species_properties.as_ref(),
                attrs.default_species_property.as_ref(),
            )?);
        }
        if target.has(Column::TransitionProperty) {
            attributes.transition_properties = Some(fill_column(
                Column::TransitionProperty,
                transitions,
                &attrs.transition_properties,
                source.transition_properties.as_ref(),
                attrs.default_transition_property.as_ref(),
            )?);
        }

        let dropped = self.columns().difference(target);
        if !dropped.is_empty() {
            log::debug!("cast drops columns {:?}", dropped);
        }
        Net::from_parts(self.store.clone(), attributes)
    }

    /// Adds name columns, keeping every column already present.
    pub fn to_labelled(&self, attrs: CastAttributes) -> Result<Net, NetError> {
        self.cast(self.columns() | Columns::LABELLED, attrs)
    }

    /// Adds concentration and rate columns, keeping every column already present.
    pub fn to_reaction(&self, attrs: CastAttributes) -> Result<Net, NetError> {
        self.cast(self.columns() | Columns::REACTION, attrs)
    }

    /// The bare structure, without any attribute column.
    pub fn to_petri(&self) -> Net {
        Net {
            store: self.store.clone(),
            attributes: Attributes::default(),
        }
    }

    /// Only the columns shared with `columns`.
    pub fn restrict(&self, columns: Columns) -> Net {
        let keep = self.columns().intersection(columns);
        let source = &self.attributes;
        let attributes = Attributes {
            species_names: source
                .species_names
                .clone()
                .filter(|_| keep.has(Column::SpeciesName)),
            transition_names: source
                .transition_names
                .clone()
                .filter(|_| keep.has(Column::TransitionName)),
            concentrations: source
                .concentrations
                .clone()
                .filter(|_| keep.has(Column::Concentration)),
            rates: source.rates.clone().filter(|_| keep.has(Column::Rate)),
            species_properties: source
                .species_properties
                .clone()
                .filter(|_| keep.has(Column::SpeciesProperty)),
            transition_properties: source
                .transition_properties
                .clone()
                .filter(|_| keep.has(Column::TransitionProperty)),
        };
        Net {
            store: self.store.clone(),
            attributes,
        }
    }
}
