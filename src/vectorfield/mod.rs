//! Mass-action vectorfields.
//!
//! For a net with rates `k_t` the derivative of species `s` is
//!
//! ```text
//! du[s] = Σ_t k_t(u, t) · Π_r u[r]^input[t, r] · (output[t, s] - input[t, s])
//! ```
//!
//! Two evaluators implement the same [`Vectorfield`] contract:
//! [`InterpretedVectorfield`] walks the dense matrices on every call, while
//! [`PlannedVectorfield`] flattens them once into per-transition index lists.
//! Both perform the same floating-point operations in the same order, so they
//! agree exactly on deterministic rates.
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::{Key, Net, NetError, Rate};

mod interpreted;
mod layout;
mod plan;

pub use interpreted::InterpretedVectorfield;
pub use layout::{SpeciesLayout, State};
pub use plan::{PlannedTransition, PlannedVectorfield};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RateEvaluationError {
    #[error("transition `{0}` has a parameter rate but no value was supplied")]
    MissingParameter(Key),
    #[error("rate of transition `{transition}` evaluated to {value} at t = {time}")]
    NonFinite { transition: Key, value: f64, time: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(transparent)]
    Rate(#[from] RateEvaluationError),
    #[error("{buffer} has {found} entries but the net has {expected} species")]
    Shape {
        buffer: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("no species is keyed `{0}`")]
    UnknownSpecies(Key),
}

/// Values for rates left as [`Rate::Parameter`], keyed by transition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(IndexMap<Key, f64>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, transition: impl Into<Key>, value: f64) -> Self {
        self.0.insert(transition.into(), value);
        self
    }

    pub fn insert(&mut self, transition: impl Into<Key>, value: f64) -> Option<f64> {
        self.0.insert(transition.into(), value)
    }

    /// Value for `transition`, or else for its [`Key::alias`].
    pub fn get(&self, transition: &Key) -> Option<f64> {
        self.0
            .get(transition)
            .or_else(|| transition.alias().and_then(|alias| self.0.get(&alias)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<Key>> FromIterator<(K, f64)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

/// `f(du, u, p, t)`: overwrites `du` with the derivative at state `u`.
pub trait Vectorfield: Send + Sync {
    fn layout(&self) -> &SpeciesLayout;

    /// On error the contents of `du` are unspecified.
    fn eval(
        &self,
        du: &mut [f64],
        u: &[f64],
        p: &Parameters,
        t: f64,
    ) -> Result<(), EvaluationError>;

    fn derivative(&self, u: &[f64], p: &Parameters, t: f64) -> Result<Vec<f64>, EvaluationError> {
        let mut du = vec![0.0; self.layout().len()];
        self.eval(&mut du, u, p, t)?;
        Ok(du)
    }

    /// Keyed convenience wrapper around [`Vectorfield::eval`]. Species
    /// missing from `u` start at zero; a key naming no species is an error.
    fn eval_keyed(
        &self,
        u: &IndexMap<Key, f64>,
        p: &Parameters,
        t: f64,
    ) -> Result<IndexMap<Key, f64>, EvaluationError> {
        let layout = self.layout();
        let mut dense = vec![0.0; layout.len()];
        for (key, value) in u {
            let slot = layout
                .slot(key)
                .ok_or_else(|| EvaluationError::UnknownSpecies(key.clone()))?;
            dense[slot] = *value;
        }
        let du = self.derivative(&dense, p, t)?;
        Ok(layout.keyed(&du))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorKind {
    Interpreted,
    #[default]
    Planned,
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvaluatorKind::Interpreted => "interpreted",
            EvaluatorKind::Planned => "planned",
        })
    }
}

impl FromStr for EvaluatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interpreted" => Ok(EvaluatorKind::Interpreted),
            "planned" => Ok(EvaluatorKind::Planned),
            other => Err(format!("unknown evaluator `{other}`")),
        }
    }
}

/// Compiles the vectorfield of `net`, which must carry a rate column.
pub fn compile(net: &Net, kind: EvaluatorKind) -> Result<Box<dyn Vectorfield>, NetError> {
    log::debug!(
        "compiling {kind} vectorfield for {} species, {} transitions",
        net.species_count(),
        net.transition_count()
    );
    Ok(match kind {
        EvaluatorKind::Interpreted => Box::new(InterpretedVectorfield::new(net)?),
        EvaluatorKind::Planned => Box::new(PlannedVectorfield::new(net)?),
    })
}

impl Net {
    pub fn vectorfield(&self) -> Result<PlannedVectorfield, NetError> {
        PlannedVectorfield::new(self)
    }
}

/// Instantaneous rate constant of one transition.
pub(crate) fn resolve_rate(
    rate: &Rate,
    transition: &Key,
    state: &State<'_>,
    p: &Parameters,
    t: f64,
) -> Result<f64, RateEvaluationError> {
    let value = match rate {
        Rate::Constant(value) => *value,
        Rate::TimeVarying(f) => f(t),
        Rate::StateVarying(f) => f(state, t),
        Rate::Parameter => p
            .get(transition)
            .ok_or_else(|| RateEvaluationError::MissingParameter(transition.clone()))?,
    };
    if !value.is_finite() {
        return Err(RateEvaluationError::NonFinite {
            transition: transition.clone(),
            value,
            time: t,
        });
    }
    Ok(value)
}

pub(crate) fn check_shape(
    layout: &SpeciesLayout,
    du: &[f64],
    u: &[f64],
) -> Result<(), EvaluationError> {
    let expected = layout.len();
    if du.len() != expected {
        return Err(EvaluationError::Shape {
            buffer: "du",
            expected,
            found: du.len(),
        });
    }
    if u.len() != expected {
        return Err(EvaluationError::Shape {
            buffer: "u",
            expected,
            found: u.len(),
        });
    }
    Ok(())
}
