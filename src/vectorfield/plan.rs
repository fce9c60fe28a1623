use smallvec::SmallVec;

use crate::net::{Key, Net, NetError, Rate};
use crate::vectorfield::layout::{SpeciesLayout, State};
use crate::vectorfield::{EvaluationError, Parameters, Vectorfield, check_shape, resolve_rate};

/// One transition of an evaluation plan.
#[derive(Clone, Debug)]
pub struct PlannedTransition {
    pub key: Key,
    pub rate: Rate,
    /// `(slot, exponent)` for every species with nonzero input stoichiometry,
    /// by ascending slot.
    pub factors: SmallVec<[(usize, i32); 4]>,
    /// `(slot, output - input)` for every species the transition changes,
    /// by ascending slot.
    pub deltas: SmallVec<[(usize, f64); 4]>,
}

/// Mass-action kinetics flattened into straight index lists at compile time.
#[derive(Clone, Debug)]
pub struct PlannedVectorfield {
    plan: Vec<PlannedTransition>,
    layout: SpeciesLayout,
}

impl PlannedVectorfield {
    pub fn new(net: &Net) -> Result<Self, NetError> {
        let rates = net.rates()?;
        let stoichiometry = net.matrices();
        let plan = stoichiometry
            .input
            .rows()
            .map(|(transition, inputs)| {
                let outputs = stoichiometry.output.row(transition);
                let factors = inputs
                    .iter()
                    .enumerate()
                    .filter(|(_, exponent)| **exponent != 0)
                    .map(|(slot, exponent)| (slot, *exponent as i32))
                    .collect();
                let deltas = outputs
                    .iter()
                    .zip(inputs)
                    .enumerate()
                    .filter_map(|(slot, (produced, consumed))| {
                        let delta = *produced as i64 - *consumed as i64;
                        (delta != 0).then_some((slot, delta as f64))
                    })
                    .collect();
                PlannedTransition {
                    key: net.transition_key(transition),
                    rate: rates[transition].clone(),
                    factors,
                    deltas,
                }
            })
            .collect::<Vec<_>>();
        log::trace!("evaluation plan: {:?}", plan);
        Ok(Self {
            plan,
            layout: SpeciesLayout::of(net),
        })
    }

    pub fn plan(&self) -> &[PlannedTransition] {
        &self.plan
    }
}

impl Vectorfield for PlannedVectorfield {
    fn layout(&self) -> &SpeciesLayout {
        &self.layout
    }

    fn eval(
        &self,
        du: &mut [f64],
        u: &[f64],
        p: &Parameters,
        t: f64,
    ) -> Result<(), EvaluationError> {
        check_shape(&self.layout, du, u)?;
        du.fill(0.0);
        let state = State::new(&self.layout, u);
        for step in &self.plan {
            let mut propensity = resolve_rate(&step.rate, &step.key, &state, p, t)?;
            for &(slot, exponent) in &step.factors {
                propensity *= u[slot].powi(exponent);
            }
            for &(slot, delta) in &step.deltas {
                du[slot] += propensity * delta;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::TransitionSpec;

    #[test]
    fn plan_skips_zero_entries() {
        let net = Net::reaction(
            [1.0, 1.0, 1.0],
            [(2.0, TransitionSpec::indices([1, 1, 2], [1, 3]))],
        )
        .unwrap();
        let f = PlannedVectorfield::new(&net).unwrap();
        let step = &f.plan()[0];
        assert_eq!(step.factors.as_slice(), &[(0, 2), (1, 1)]);
        assert_eq!(step.deltas.as_slice(), &[(0, -1.0), (1, -1.0), (2, 1.0)]);
    }

    #[test]
    fn catalyst_species_stays_constant() {
        let net = Net::reaction(
            [2.0, 3.0],
            [(0.5, TransitionSpec::indices([1, 2], [1]))],
        )
        .unwrap();
        let du = net
            .vectorfield()
            .unwrap()
            .derivative(&[2.0, 3.0], &Parameters::new(), 0.0)
            .unwrap();
        assert_eq!(du, vec![0.0, -3.0]);
    }

    #[test]
    fn state_dependent_rates_see_current_state() {
        let net = Net::labelled_reaction(
            [("S", 9.0), ("I", 1.0)],
            [(
                (
                    "inf",
                    Rate::state_varying(|u, _t| 1.0 / u.total()),
                ),
                TransitionSpec::new(["S", "I"], ["I", "I"]),
            )],
        )
        .unwrap();
        let du = net
            .vectorfield()
            .unwrap()
            .derivative(&[9.0, 1.0], &Parameters::new(), 0.0)
            .unwrap();
        assert_eq!(du, vec![-0.9, 0.9]);
    }
}
