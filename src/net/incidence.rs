//! Dense transition-by-species matrices derived from the arc tables.
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::core::{Net, NetError};
use crate::net::ids::{SpeciesId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};

type SmallRow<T> = SmallVec<[T; 8]>;

/// A `|T| x |S|` matrix stored row per transition.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Incidence<T> {
    rows: IndexVec<TransitionId, SmallRow<T>>,
    cols: usize,
}

impl<T> Incidence<T>
where
    T: Clone,
{
    pub fn new(transitions: usize, species: usize, default: T) -> Self {
        let rows = (0..transitions)
            .map(|_| SmallRow::from_elem(default.clone(), species))
            .collect();
        Self {
            rows,
            cols: species,
        }
    }

    /// Builds a matrix from plain rows, one per transition.
    pub fn from_rows(rows: Vec<Vec<T>>, species: usize) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == species));
        Self {
            rows: rows.into_iter().map(SmallRow::from_vec).collect(),
            cols: species,
        }
    }

    pub fn transitions(&self) -> usize {
        self.rows.len()
    }

    pub fn species(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.transitions(), self.species())
    }

    pub fn get(&self, transition: TransitionId, species: SpeciesId) -> &T {
        &self.rows[transition][species.index()]
    }

    pub fn get_mut(&mut self, transition: TransitionId, species: SpeciesId) -> &mut T {
        &mut self.rows[transition][species.index()]
    }

    pub fn set(&mut self, transition: TransitionId, species: SpeciesId, value: T) {
        self.rows[transition][species.index()] = value;
    }

    pub fn row(&self, transition: TransitionId) -> &[T] {
        &self.rows[transition]
    }

    pub fn rows(&self) -> impl Iterator<Item = (TransitionId, &[T])> {
        self.rows
            .iter_enumerated()
            .map(|(transition, row)| (transition, row.as_slice()))
    }

    pub fn map<U, F>(&self, mut f: F) -> Incidence<U>
    where
        U: Clone,
        F: FnMut(&T) -> U,
    {
        Incidence {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(&mut f).collect::<SmallRow<_>>())
                .collect(),
            cols: self.cols,
        }
    }
}

impl<T> fmt::Debug for Incidence<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Incidence")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

impl Incidence<u64> {
    pub fn difference(&self, other: &Self) -> Incidence<i64> {
        assert_eq!(self.shape(), other.shape());
        Incidence {
            rows: self
                .rows
                .iter()
                .zip(other.rows.iter())
                .map(|(left, right)| {
                    left.iter()
                        .zip(right.iter())
                        .map(|(l, r)| *l as i64 - *r as i64)
                        .collect::<SmallRow<_>>()
                })
                .collect(),
            cols: self.cols,
        }
    }
}

/// Input and output multiplicities of one net.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TransitionMatrices {
    pub input: Incidence<u64>,
    pub output: Incidence<u64>,
}

impl TransitionMatrices {
    /// Net change of each species per firing: `output - input`.
    pub fn stoichiometry(&self) -> Incidence<i64> {
        self.output.difference(&self.input)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.input.shape()
    }
}

impl Net {
    /// Counts arcs per (transition, species) pair. Recomputed on every call.
    pub fn matrices(&self) -> TransitionMatrices {
        let shape = (self.transition_count(), self.species_count());
        let mut input = Incidence::new(shape.0, shape.1, 0u64);
        let mut output = Incidence::new(shape.0, shape.1, 0u64);
        for arc in self.input_arcs() {
            *input.get_mut(arc.transition, arc.species) += 1;
        }
        for arc in self.output_arcs() {
            *output.get_mut(arc.transition, arc.species) += 1;
        }
        TransitionMatrices { input, output }
    }

    /// Rebuilds a plain net whose arc multiplicities equal the matrix entries.
    pub fn from_matrices(
        input: &Incidence<u64>,
        output: &Incidence<u64>,
    ) -> Result<Net, NetError> {
        if input.shape() != output.shape() {
            return Err(NetError::ShapeMismatch {
                input: input.shape(),
                output: output.shape(),
            });
        }
        let mut net = Net::empty();
        net.add_species(input.species())?;
        net.add_transitions(input.transitions())?;
        for (transition, row) in input.rows() {
            for (position, count) in row.iter().enumerate() {
                for _ in 0..*count {
                    net.add_input(transition, SpeciesId::from_usize(position))?;
                }
            }
        }
        for (transition, row) in output.rows() {
            for (position, count) in row.iter().enumerate() {
                for _ in 0..*count {
                    net.add_output(transition, SpeciesId::from_usize(position))?;
                }
            }
        }
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::construct::TransitionSpec;

    #[test]
    fn matrices_count_repeated_arcs() {
        let net = Net::new(
            3,
            [
                TransitionSpec::indices([1, 2], [2, 2]),
                TransitionSpec::indices([2], [3]),
            ],
        )
        .unwrap();
        let TransitionMatrices { input, output } = net.matrices();
        assert_eq!(input.shape(), (2, 3));
        assert_eq!(input.row(TransitionId::new(1)), &[1, 1, 0]);
        assert_eq!(output.row(TransitionId::new(1)), &[0, 2, 0]);
        assert_eq!(output.row(TransitionId::new(2)), &[0, 0, 1]);
    }

    #[test]
    fn stoichiometry_is_output_minus_input() {
        let net = Net::new(2, [TransitionSpec::indices([1, 1], [2])]).unwrap();
        let stoich = net.matrices().stoichiometry();
        assert_eq!(stoich.row(TransitionId::new(1)), &[-2, 1]);
    }

    #[test]
    fn matrices_rebuild_the_net() {
        let input = Incidence::from_rows(vec![vec![2, 0], vec![0, 1]], 2);
        let output = Incidence::from_rows(vec![vec![0, 1], vec![1, 0]], 2);
        let net = Net::from_matrices(&input, &output).unwrap();
        assert_eq!(net.input_count(), 3);
        let matrices = net.matrices();
        assert_eq!(matrices.input, input);
        assert_eq!(matrices.output, output);
    }

    #[test]
    fn shapes_must_agree() {
        let input = Incidence::new(1, 2, 0u64);
        let output = Incidence::new(2, 2, 0u64);
        assert!(matches!(
            Net::from_matrices(&input, &output),
            Err(NetError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_net_has_empty_matrices() {
        let matrices = Net::empty().matrices();
        assert_eq!(matrices.shape(), (0, 0));
    }
}
