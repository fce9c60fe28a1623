//! Optional attribute columns layered over the relational store.
//!
//! A net carries any subset of the six columns. The familiar variants
//! (labelled nets, reaction nets, property nets and their combinations) are
//! just named subsets, see the constants on [`Columns`].
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::net::core::NetError;
use crate::net::ids::{SpeciesId, TransitionId};
use crate::net::index_vec::IndexVec;
use crate::net::rate::Rate;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Columns: u8 {
        const SPECIES_NAME = 1;
        const TRANSITION_NAME = 1 << 1;
        const CONCENTRATION = 1 << 2;
        const RATE = 1 << 3;
        const SPECIES_PROPERTY = 1 << 4;
        const TRANSITION_PROPERTY = 1 << 5;
    }
}

impl Columns {
    pub const PETRI: Self = Self::empty();
    pub const LABELLED: Self = Self::SPECIES_NAME.union(Self::TRANSITION_NAME);
    pub const REACTION: Self = Self::CONCENTRATION.union(Self::RATE);
    pub const PROPERTY: Self = Self::SPECIES_PROPERTY.union(Self::TRANSITION_PROPERTY);
    pub const LABELLED_REACTION: Self = Self::LABELLED.union(Self::REACTION);
    pub const LABELLED_PROPERTY: Self = Self::LABELLED.union(Self::PROPERTY);
    pub const REACTION_PROPERTY: Self = Self::REACTION.union(Self::PROPERTY);
    pub const LABELLED_REACTION_PROPERTY: Self = Self::LABELLED_REACTION.union(Self::PROPERTY);

    pub fn has(self, column: Column) -> bool {
        self.contains(column.flag())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Column {
    SpeciesName,
    TransitionName,
    Concentration,
    Rate,
    SpeciesProperty,
    TransitionProperty,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::SpeciesName,
        Column::TransitionName,
        Column::Concentration,
        Column::Rate,
        Column::SpeciesProperty,
        Column::TransitionProperty,
    ];

    pub const fn flag(self) -> Columns {
        match self {
            Column::SpeciesName => Columns::SPECIES_NAME,
            Column::TransitionName => Columns::TRANSITION_NAME,
            Column::Concentration => Columns::CONCENTRATION,
            Column::Rate => Columns::RATE,
            Column::SpeciesProperty => Columns::SPECIES_PROPERTY,
            Column::TransitionProperty => Columns::TRANSITION_PROPERTY,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Column::SpeciesName => "species name",
            Column::TransitionName => "transition name",
            Column::Concentration => "concentration",
            Column::Rate => "rate",
            Column::SpeciesProperty => "species property",
            Column::TransitionProperty => "transition property",
        })
    }
}

/// Attribute values for one species being appended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeciesRecord {
    pub name: Option<String>,
    pub concentration: Option<f64>,
    pub property: Option<Value>,
}

impl SpeciesRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_concentration(mut self, concentration: f64) -> Self {
        self.concentration = Some(concentration);
        self
    }

    pub fn with_property(mut self, property: Value) -> Self {
        self.property = Some(property);
        self
    }
}

/// Attribute values for one transition being appended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionRecord {
    pub name: Option<String>,
    pub rate: Option<Rate>,
    pub property: Option<Value>,
}

impl TransitionRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_rate(mut self, rate: impl Into<Rate>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    pub fn with_property(mut self, property: Value) -> Self {
        self.property = Some(property);
        self
    }
}

/// The attribute columns of one net. A present column holds exactly one value
/// per entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) species_names: Option<IndexVec<SpeciesId, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) transition_names: Option<IndexVec<TransitionId, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) concentrations: Option<IndexVec<SpeciesId, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) rates: Option<IndexVec<TransitionId, Rate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) species_properties: Option<IndexVec<SpeciesId, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) transition_properties: Option<IndexVec<TransitionId, Value>>,
}

impl Attributes {
    /// Empty columns for every flag in `columns`.
    pub fn with_columns(columns: Columns) -> Self {
        fn column<I: crate::net::Idx, T>(present: bool) -> Option<IndexVec<I, T>> {
            present.then(IndexVec::new)
        }
        Self {
            species_names: column(columns.has(Column::SpeciesName)),
            transition_names: column(columns.has(Column::TransitionName)),
            concentrations: column(columns.has(Column::Concentration)),
            rates: column(columns.has(Column::Rate)),
            species_properties: column(columns.has(Column::SpeciesProperty)),
            transition_properties: column(columns.has(Column::TransitionProperty)),
        }
    }

    pub fn columns(&self) -> Columns {
        let mut columns = Columns::empty();
        columns.set(Columns::SPECIES_NAME, self.species_names.is_some());
        columns.set(Columns::TRANSITION_NAME, self.transition_names.is_some());
        columns.set(Columns::CONCENTRATION, self.concentrations.is_some());
        columns.set(Columns::RATE, self.rates.is_some());
        columns.set(Columns::SPECIES_PROPERTY, self.species_properties.is_some());
        columns.set(
            Columns::TRANSITION_PROPERTY,
            self.transition_properties.is_some(),
        );
        columns
    }

    /// Fails without touching any column when `record` lacks a value for a
    /// column this net carries.
    pub(crate) fn check_species_record(
        &self,
        entity: SpeciesId,
        record: &SpeciesRecord,
    ) -> Result<(), NetError> {
        let missing = |column| NetError::MissingAttribute {
            column,
            entity: entity.to_string(),
        };
        if self.species_names.is_some() && record.name.is_none() {
            return Err(missing(Column::SpeciesName));
        }
        if self.concentrations.is_some() && record.concentration.is_none() {
            return Err(missing(Column::Concentration));
        }
        if self.species_properties.is_some() && record.property.is_none() {
            return Err(missing(Column::SpeciesProperty));
        }
        Ok(())
    }

    pub(crate) fn check_transition_record(
        &self,
        entity: TransitionId,
        record: &TransitionRecord,
    ) -> Result<(), NetError> {
        let missing = |column| NetError::MissingAttribute {
            column,
            entity: entity.to_string(),
        };
        if self.transition_names.is_some() && record.name.is_none() {
            return Err(missing(Column::TransitionName));
        }
        if self.rates.is_some() && record.rate.is_none() {
            return Err(missing(Column::Rate));
        }
        if self.transition_properties.is_some() && record.property.is_none() {
            return Err(missing(Column::TransitionProperty));
        }
        Ok(())
    }

    /// Appends a checked record. Values for columns the net lacks are dropped.
    pub(crate) fn push_species(&mut self, record: SpeciesRecord) {
        if let (Some(column), Some(name)) = (self.species_names.as_mut(), record.name) {
            column.push(name);
        }
        if let (Some(column), Some(value)) = (self.concentrations.as_mut(), record.concentration) {
            column.push(value);
        }
        if let (Some(column), Some(value)) = (self.species_properties.as_mut(), record.property) {
            column.push(value);
        }
    }

    pub(crate) fn push_transition(&mut self, record: TransitionRecord) {
        if let (Some(column), Some(name)) = (self.transition_names.as_mut(), record.name) {
            column.push(name);
        }
        if let (Some(column), Some(rate)) = (self.rates.as_mut(), record.rate) {
            column.push(rate);
        }
        if let (Some(column), Some(value)) =
            (self.transition_properties.as_mut(), record.property)
        {
            column.push(value);
        }
    }

    /// Checks that every present column has exactly one value per entity.
    pub(crate) fn check_lengths(&self, species: usize, transitions: usize) -> Result<(), NetError> {
        let lengths = [
            (Column::SpeciesName, self.species_names.as_ref().map(IndexVec::len), species),
            (
                Column::TransitionName,
                self.transition_names.as_ref().map(IndexVec::len),
                transitions,
            ),
            (Column::Concentration, self.concentrations.as_ref().map(IndexVec::len), species),
            (Column::Rate, self.rates.as_ref().map(IndexVec::len), transitions),
            (
                Column::SpeciesProperty,
                self.species_properties.as_ref().map(IndexVec::len),
                species,
            ),
            (
                Column::TransitionProperty,
                self.transition_properties.as_ref().map(IndexVec::len),
                transitions,
            ),
        ];
        for (column, found, expected) in lengths {
            if let Some(found) = found {
                if found != expected {
                    return Err(NetError::ColumnLength {
                        column,
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_are_column_sets() {
        assert!(Columns::LABELLED_REACTION.has(Column::Rate));
        assert!(Columns::LABELLED_REACTION.has(Column::SpeciesName));
        assert!(!Columns::REACTION.has(Column::SpeciesName));
        assert_eq!(Attributes::with_columns(Columns::REACTION).columns(), Columns::REACTION);
        assert_eq!(Attributes::default().columns(), Columns::PETRI);
    }

    #[test]
    fn records_must_cover_present_columns() {
        let attrs = Attributes::with_columns(Columns::LABELLED_REACTION);
        let err = attrs
            .check_species_record(SpeciesId::new(1), &SpeciesRecord::named("S"))
            .unwrap_err();
        assert!(matches!(
            err,
            NetError::MissingAttribute {
                column: Column::Concentration,
                ..
            }
        ));
        attrs
            .check_species_record(
                SpeciesId::new(1),
                &SpeciesRecord::named("S").with_concentration(1.0),
            )
            .unwrap();
    }
}
