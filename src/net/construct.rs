//! Pure constructors for the common net variants.
//!
//! Each constructor builds into a private net and only hands it out when every
//! transition resolved, so a failed build leaves nothing behind.
use std::collections::HashMap;

use crate::net::columns::{Columns, SpeciesRecord, TransitionRecord};
use crate::net::core::{Net, NetError};
use crate::net::ids::{SpeciesId, TransitionId};
use crate::net::rate::Rate;

/// A transition given as the multiset of species it consumes and the
/// multiset it produces. Repeats encode stoichiometry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionSpec<K> {
    pub inputs: Vec<K>,
    pub outputs: Vec<K>,
}

impl<K> TransitionSpec<K> {
    pub fn new(inputs: impl IntoIterator<Item = K>, outputs: impl IntoIterator<Item = K>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        }
    }
}

impl TransitionSpec<SpeciesId> {
    /// Transition over 1-based species indices.
    pub fn indices(
        inputs: impl IntoIterator<Item = u32>,
        outputs: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().map(SpeciesId::new).collect(),
            outputs: outputs.into_iter().map(SpeciesId::new).collect(),
        }
    }
}

/// Name-to-id map built once per labelled construction. The first species
/// carrying a name wins.
struct NameIndex<'a> {
    ids: HashMap<&'a str, SpeciesId>,
}

impl<'a> NameIndex<'a> {
    fn new(names: &'a [String]) -> Self {
        let mut ids = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            ids.entry(name.as_str())
                .or_insert(SpeciesId::new(position as u32 + 1));
        }
        Self { ids }
    }

    fn resolve<K: AsRef<str>>(&self, spec: &TransitionSpec<K>) -> Result<TransitionSpec<SpeciesId>, NetError> {
        let lookup = |name: &K| {
            let name = name.as_ref();
            self.ids
                .get(name)
                .copied()
                .ok_or_else(|| NetError::UnknownName(name.to_owned()))
        };
        Ok(TransitionSpec {
            inputs: spec.inputs.iter().map(lookup).collect::<Result<_, _>>()?,
            outputs: spec.outputs.iter().map(lookup).collect::<Result<_, _>>()?,
        })
    }
}

impl Net {
    /// `n` unnamed species and one transition per spec.
    pub fn new(
        n: usize,
        transitions: impl IntoIterator<Item = TransitionSpec<SpeciesId>>,
    ) -> Result<Net, NetError> {
        let mut net = Net::empty();
        net.add_species(n)?;
        for spec in transitions {
            let transition = net.add_transitions(1)?.start;
            net.wire(transition, &spec)?;
        }
        Ok(net)
    }

    /// Named species and named transitions whose specs refer to species by name.
    pub fn labelled<K: AsRef<str>>(
        species: impl IntoIterator<Item = impl Into<String>>,
        transitions: impl IntoIterator<Item = (impl Into<String>, TransitionSpec<K>)>,
    ) -> Result<Net, NetError> {
        let names: Vec<String> = species.into_iter().map(Into::into).collect();
        let index = NameIndex::new(&names);
        let mut net = Net::with_columns(Columns::LABELLED);
        for name in &names {
            net.add_species_with(SpeciesRecord::named(name.clone()))?;
        }
        for (name, spec) in transitions {
            let spec = index.resolve(&spec)?;
            let transition = net.add_transition_with(TransitionRecord::named(name))?;
            net.wire(transition, &spec)?;
        }
        Ok(net)
    }

    /// Unnamed species with initial concentrations and rated transitions.
    pub fn reaction(
        concentrations: impl IntoIterator<Item = f64>,
        transitions: impl IntoIterator<Item = (impl Into<Rate>, TransitionSpec<SpeciesId>)>,
    ) -> Result<Net, NetError> {
        let mut net = Net::with_columns(Columns::REACTION);
        for concentration in concentrations {
            net.add_species_with(SpeciesRecord::default().with_concentration(concentration))?;
        }
        for (rate, spec) in transitions {
            let transition =
                net.add_transition_with(TransitionRecord::default().with_rate(rate))?;
            net.wire(transition, &spec)?;
        }
        Ok(net)
    }

    /// Named species with concentrations and named, rated transitions.
    pub fn labelled_reaction<K: AsRef<str>>(
        species: impl IntoIterator<Item = (impl Into<String>, f64)>,
        transitions: impl IntoIterator<
            Item = ((impl Into<String>, impl Into<Rate>), TransitionSpec<K>),
        >,
    ) -> Result<Net, NetError> {
        let (names, concentrations): (Vec<String>, Vec<f64>) = species
            .into_iter()
            .map(|(name, concentration)| (name.into(), concentration))
            .unzip();
        let index = NameIndex::new(&names);
        let mut net = Net::with_columns(Columns::LABELLED_REACTION);
        for (name, concentration) in names.iter().zip(concentrations) {
            net.add_species_with(
                SpeciesRecord::named(name.clone()).with_concentration(concentration),
            )?;
        }
        for ((name, rate), spec) in transitions {
            let spec = index.resolve(&spec)?;
            let transition =
                net.add_transition_with(TransitionRecord::named(name).with_rate(rate))?;
            net.wire(transition, &spec)?;
        }
        Ok(net)
    }

    /// Adds the arcs of `spec` to an existing transition.
    pub fn wire(
        &mut self,
        transition: TransitionId,
        spec: &TransitionSpec<SpeciesId>,
    ) -> Result<(), NetError> {
        self.store.check_transition(transition)?;
        for species in spec.inputs.iter().chain(spec.outputs.iter()) {
            self.store.check_species(*species)?;
        }
        for species in &spec.inputs {
            self.store.add_input(transition, *species)?;
        }
        for species in &spec.outputs {
            self.store.add_output(transition, *species)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::columns::Column;

    #[test]
    fn indexed_constructor_builds_arcs() {
        let net = Net::new(
            3,
            [
                TransitionSpec::indices([1, 2], [2, 2]),
                TransitionSpec::indices([2], [3]),
            ],
        )
        .unwrap();
        assert_eq!(net.species_count(), 3);
        assert_eq!(net.transition_count(), 2);
        assert_eq!(net.input_count(), 3);
        assert_eq!(net.output_count(), 3);
        assert_eq!(net.columns(), Columns::PETRI);
    }

    #[test]
    fn labelled_constructor_resolves_names() {
        let net = Net::labelled(
            ["S", "I", "R"],
            [
                ("inf", TransitionSpec::new(["S", "I"], ["I", "I"])),
                ("rec", TransitionSpec::new(["I"], ["R"])),
            ],
        )
        .unwrap();
        let rec = net.find_transition("rec").unwrap();
        assert_eq!(
            net.outputs_of(rec).collect::<Vec<_>>(),
            vec![net.find_species("R").unwrap()]
        );
    }

    #[test]
    fn unknown_name_fails_whole_build() {
        let err = Net::labelled(
            ["S", "I"],
            [("inf", TransitionSpec::new(["S", "X"], ["I"]))],
        )
        .unwrap_err();
        assert!(matches!(err, NetError::UnknownName(name) if name == "X"));
    }

    #[test]
    fn out_of_range_index_fails() {
        let err = Net::new(1, [TransitionSpec::indices([1], [2])]).unwrap_err();
        assert!(matches!(err, NetError::UnknownSpecies(s) if s == SpeciesId::new(2)));
    }

    #[test]
    fn reaction_constructors_fill_both_columns() {
        let net = Net::reaction(
            [10.0, 1.0],
            [(0.5, TransitionSpec::indices([1, 2], [2, 2]))],
        )
        .unwrap();
        assert_eq!(net.columns(), Columns::REACTION);
        assert_eq!(net.initial_state().unwrap(), vec![10.0, 1.0]);
        assert_eq!(net.rate(TransitionId::new(1)).unwrap(), &Rate::Constant(0.5));

        let labelled = Net::labelled_reaction(
            [("S", 10.0), ("I", 1.0)],
            [(("inf", 0.5), TransitionSpec::new(["S", "I"], ["I", "I"]))],
        )
        .unwrap();
        assert!(labelled.columns().has(Column::TransitionName));
        assert_eq!(labelled.concentration(SpeciesId::new(2)).unwrap(), 1.0);
    }
}
