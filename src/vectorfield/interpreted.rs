use crate::net::{Idx, Key, Net, NetError, Rate, TransitionMatrices};
use crate::vectorfield::layout::{SpeciesLayout, State};
use crate::vectorfield::{EvaluationError, Parameters, Vectorfield, check_shape, resolve_rate};

/// Evaluates mass-action kinetics by scanning the full transition matrices
/// on every call.
#[derive(Clone, Debug)]
pub struct InterpretedVectorfield {
    matrices: TransitionMatrices,
    rates: Vec<Rate>,
    transitions: Vec<Key>,
    layout: SpeciesLayout,
}

impl InterpretedVectorfield {
    pub fn new(net: &Net) -> Result<Self, NetError> {
        Ok(Self {
            rates: net.rates()?.iter().cloned().collect(),
            matrices: net.matrices(),
            transitions: net.transition_keys(),
            layout: SpeciesLayout::of(net),
        })
    }
}

impl Vectorfield for InterpretedVectorfield {
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
        for (transition, inputs) in self.matrices.input.rows() {
            let outputs = self.matrices.output.row(transition);
            let slot = transition.index();
            let mut propensity =
                resolve_rate(&self.rates[slot], &self.transitions[slot], &state, p, t)?;
            for (species, &exponent) in inputs.iter().enumerate() {
                if exponent != 0 {
                    propensity *= u[species].powi(exponent as i32);
                }
            }
            for (species, (&produced, &consumed)) in outputs.iter().zip(inputs).enumerate() {
                let delta = produced as i64 - consumed as i64;
                if delta != 0 {
                    du[species] += propensity * delta as f64;
                }
            }
        }
        Ok(())
    }
}
