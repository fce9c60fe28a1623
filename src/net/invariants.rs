//! Linear conservation laws: species weightings left unchanged by every transition.
use num::bigint::BigInt;
use num::integer::Integer;
use num::traits::{One, Signed, Zero};

use crate::net::core::Net;

impl Net {
    /// Integer basis of `{ w : stoichiometry · w = 0 }`.
    ///
    /// Each vector `w` satisfies `Σ_s w[s] · du[s] = 0` under mass-action
    /// kinetics, whatever the rates. Every vector is primitive and its first
    /// nonzero entry is positive.
    pub fn conservation_laws(&self) -> Vec<Vec<BigInt>> {
        let stoichiometry = self.matrices().stoichiometry();
        let rows = stoichiometry
            .rows()
            .map(|(_, row)| row.iter().map(|value| BigInt::from(*value)).collect())
            .collect::<Vec<Vec<BigInt>>>();
        integer_kernel(rows, self.species_count())
    }
}

/// Fraction-free Gauss-Jordan elimination. Row `r` of the reduced system
/// keeps a single nonzero among the pivot columns, at `pivots[r]`.
fn integer_kernel(mut rows: Vec<Vec<BigInt>>, cols: usize) -> Vec<Vec<BigInt>> {
    let mut pivots: Vec<usize> = Vec::new();
    for col in 0..cols {
        let next = pivots.len();
        let Some(found) = (next..rows.len()).find(|&r| !rows[r][col].is_zero()) else {
            continue;
        };
        rows.swap(next, found);
        let pivot = rows[next].clone();
        for (r, row) in rows.iter_mut().enumerate() {
            if r == next || row[col].is_zero() {
                continue;
            }
            let factor = row[col].clone();
            for (value, p) in row.iter_mut().zip(&pivot) {
                *value = &*value * &pivot[col] - p * &factor;
            }
            make_primitive(row);
        }
        pivots.push(col);
    }

    let scale = pivots
        .iter()
        .enumerate()
        .fold(BigInt::one(), |scale, (r, &c)| scale.lcm(&rows[r][c]));
    (0..cols)
        .filter(|col| !pivots.contains(col))
        .map(|free| {
            let mut law = vec![BigInt::zero(); cols];
            law[free] = scale.clone();
            for (r, &c) in pivots.iter().enumerate() {
                law[c] = -(&rows[r][free] * &scale / &rows[r][c]);
            }
            make_primitive(&mut law);
            if law.iter().find(|value| !value.is_zero()).is_some_and(Signed::is_negative) {
                law.iter_mut().for_each(|value| *value = -&*value);
            }
            law
        })
        .collect()
}

/// Divides out the gcd of the entries.
fn make_primitive(vector: &mut [BigInt]) {
    let gcd = vector.iter().fold(BigInt::zero(), |gcd, value| gcd.gcd(value));
    if gcd > BigInt::one() {
        vector.iter_mut().for_each(|value| *value /= &gcd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::construct::TransitionSpec;

    #[test]
    fn sir_conserves_total_population() {
        let net = Net::new(
            3,
            [
                TransitionSpec::indices([1, 2], [2, 2]),
                TransitionSpec::indices([2], [3]),
            ],
        )
        .unwrap();
        assert_eq!(net.conservation_laws(), vec![vec![BigInt::from(1); 3]]);
    }

    #[test]
    fn binding_conserves_each_reactant_with_the_complex() {
        let net = Net::new(3, [TransitionSpec::indices([1, 2], [3])]).unwrap();
        let laws = net.conservation_laws();
        let expected = [[1, -1, 0], [1, 0, 1]]
            .map(|law| law.map(BigInt::from).to_vec())
            .to_vec();
        assert_eq!(laws, expected);
    }

    #[test]
    fn laws_annihilate_every_transition() {
        let net = Net::new(
            4,
            [
                TransitionSpec::indices([1, 1], [2]),
                TransitionSpec::indices([2, 3], [4]),
                TransitionSpec::indices([4], [1, 3]),
            ],
        )
        .unwrap();
        let stoichiometry = net.matrices().stoichiometry();
        let laws = net.conservation_laws();
        assert!(!laws.is_empty());
        for law in &laws {
            for (_, row) in stoichiometry.rows() {
                let total = row
                    .iter()
                    .zip(law)
                    .fold(BigInt::zero(), |acc, (s, w)| acc + BigInt::from(*s) * w);
                assert!(total.is_zero());
            }
        }
    }

    #[test]
    fn transition_free_net_conserves_every_species() {
        let mut net = Net::empty();
        net.add_species(2).unwrap();
        assert_eq!(net.conservation_laws().len(), 2);
    }
}
