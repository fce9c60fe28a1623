//! Transition rates for mass-action kinetics.
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::vectorfield::State;

pub type TimeFn = dyn Fn(f64) -> f64 + Send + Sync;
pub type StateFn = dyn for<'a> Fn(&State<'a>, f64) -> f64 + Send + Sync;

/// Rate constant of one transition.
///
/// The shape of a rate function is fixed when the rate is built, so evaluation
/// never has to guess which arguments a function accepts.
#[derive(Clone)]
pub enum Rate {
    Constant(f64),
    /// Depends on time only.
    TimeVarying(Arc<TimeFn>),
    /// Depends on the current state and time.
    StateVarying(Arc<StateFn>),
    /// Placeholder resolved from the parameter map under the transition's key.
    Parameter,
}

impl Rate {
    pub fn constant(value: f64) -> Self {
        Rate::Constant(value)
    }

    pub fn time_varying(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Rate::TimeVarying(Arc::new(f))
    }

    pub fn state_varying(f: impl for<'a> Fn(&State<'a>, f64) -> f64 + Send + Sync + 'static) -> Self {
        Rate::StateVarying(Arc::new(f))
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Rate::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self, Rate::Constant(_) | Rate::Parameter)
    }
}

impl From<f64> for Rate {
    fn from(value: f64) -> Self {
        Rate::Constant(value)
    }
}

impl fmt::Debug for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Rate::TimeVarying(_) => f.write_str("TimeVarying(<fn(t)>)"),
            Rate::StateVarying(_) => f.write_str("StateVarying(<fn(u, t)>)"),
            Rate::Parameter => f.write_str("Parameter"),
        }
    }
}

/// Function rates compare by identity.
impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rate::Constant(a), Rate::Constant(b)) => a == b,
            (Rate::TimeVarying(a), Rate::TimeVarying(b)) => Arc::ptr_eq(a, b),
            (Rate::StateVarying(a), Rate::StateVarying(b)) => Arc::ptr_eq(a, b),
            (Rate::Parameter, Rate::Parameter) => true,
            _ => false,
        }
    }
}

#[derive(Serialize, Deserialize)]
enum RateRepr {
    Constant(f64),
    Parameter,
}

impl Serialize for Rate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Rate::Constant(value) => RateRepr::Constant(*value).serialize(serializer),
            Rate::Parameter => RateRepr::Parameter.serialize(serializer),
            Rate::TimeVarying(_) | Rate::StateVarying(_) => Err(serde::ser::Error::custom(
                "rate functions cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RateRepr::deserialize(deserializer)? {
            RateRepr::Constant(value) => Rate::Constant(value),
            RateRepr::Parameter => Rate::Parameter,
        })
    }
}
