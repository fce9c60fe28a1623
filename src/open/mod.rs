//! # Open Petri nets
//!
//! An [`OpenNet`] is an apex [`Net`] together with an ordered list of legs,
//! each leg a sequence of apex species exposed for gluing. Open nets are
//! combined by [`compose`] along a [`Wiring`]: every box of the wiring is
//! bound to an open net, its ports to the legs of that net, and species that
//! meet at a junction are identified in the composite.
//!
//! ```rust
//! use petri_algebra::net::{Net, TransitionSpec};
//! use petri_algebra::open::OpenNet;
//!
//! let infection = Net::labelled(["S", "I"], [("inf", TransitionSpec::new(["S", "I"], ["I", "I"]))])?;
//! let recovery = Net::labelled(["I", "R"], [("rec", TransitionSpec::new(["I"], ["R"]))])?;
//!
//! let inf = OpenNet::with_named_legs(infection, [["S"], ["I"]])?;
//! let rec = OpenNet::with_named_legs(recovery, [["I"], ["R"]])?;
//! let sir = inf.then(&rec)?;
//!
//! assert_eq!(sir.apex().species_count(), 3);
//! assert_eq!(sir.apex().transition_count(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::{Net, NetError, SpeciesId};

mod compose;
mod wiring;

pub use compose::{compose, coproduct};
pub use wiring::{BoxId, JunctionId, Wiring, WiringBox};

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("box `{name}` has {ports} ports but its net has {legs} legs")]
    ArityMismatch {
        name: String,
        ports: usize,
        legs: usize,
    },
    #[error("junction `{0}` is not declared in the wiring")]
    UnknownPort(String),
    #[error("box `{0}` is not bound to an open net")]
    UnboundBox(String),
    #[error("legs glued at junction `{junction}` differ in length: {expected} vs {found}")]
    LegLengthMismatch {
        junction: String,
        expected: usize,
        found: usize,
    },
    #[error("outer port `{0}` is not attached to any box")]
    UnattachedJunction(String),
    #[error("box `{0}` is declared twice")]
    DuplicateBox(String),
    #[error(transparent)]
    Net(#[from] NetError),
}

/// An ordered sequence of apex species. Repeats are allowed.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leg(Vec<SpeciesId>);

impl Leg {
    pub fn new(species: impl IntoIterator<Item = SpeciesId>) -> Self {
        Self(species.into_iter().collect())
    }

    pub fn singleton(species: SpeciesId) -> Self {
        Self(vec![species])
    }

    pub fn species(&self) -> &[SpeciesId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.0.iter().copied()
    }

    pub(crate) fn map(&self, f: impl FnMut(SpeciesId) -> SpeciesId) -> Leg {
        Leg(self.iter().map(f).collect())
    }
}

impl From<Vec<SpeciesId>> for Leg {
    fn from(species: Vec<SpeciesId>) -> Self {
        Self(species)
    }
}

impl From<SpeciesId> for Leg {
    fn from(species: SpeciesId) -> Self {
        Self::singleton(species)
    }
}

impl<const N: usize> From<[SpeciesId; N]> for Leg {
    fn from(species: [SpeciesId; N]) -> Self {
        Self(species.to_vec())
    }
}

impl FromIterator<SpeciesId> for Leg {
    fn from_iter<I: IntoIterator<Item = SpeciesId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[derive(Serialize, Deserialize)]
struct OpenNetRepr {
    apex: Net,
    legs: Vec<Leg>,
}

/// A net with exposed legs. Legs are fixed at construction.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "OpenNetRepr", into = "OpenNetRepr")]
pub struct OpenNet {
    apex: Net,
    legs: Vec<Leg>,
}

impl OpenNet {
    /// Exposes every species as its own singleton leg, in id order.
    pub fn new(apex: Net) -> Self {
        let legs = apex.species().map(Leg::singleton).collect();
        Self { apex, legs }
    }

    pub fn with_legs(
        apex: Net,
        legs: impl IntoIterator<Item = impl Into<Leg>>,
    ) -> Result<Self, NetError> {
        let legs = legs.into_iter().map(Into::into).collect::<Vec<Leg>>();
        for leg in &legs {
            for species in leg.iter() {
                apex.store().check_species(species)?;
            }
        }
        Ok(Self { apex, legs })
    }

    /// A cospan `left -> apex <- right`.
    pub fn span(left: impl Into<Leg>, apex: Net, right: impl Into<Leg>) -> Result<Self, NetError> {
        let legs: [Leg; 2] = [left.into(), right.into()];
        Self::with_legs(apex, legs)
    }

    /// Legs given by species names, resolved to the first species so named.
    pub fn with_named_legs<L, S>(apex: Net, legs: impl IntoIterator<Item = L>) -> Result<Self, NetError>
    where
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let legs = legs
            .into_iter()
            .map(|names| {
                names
                    .into_iter()
                    .map(|name| apex.find_species(name.as_ref()))
                    .collect::<Result<Leg, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { apex, legs })
    }

    pub fn apex(&self) -> &Net {
        &self.apex
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn leg(&self, index: usize) -> Option<&Leg> {
        self.legs.get(index)
    }

    pub fn arity(&self) -> usize {
        self.legs.len()
    }

    pub fn into_parts(self) -> (Net, Vec<Leg>) {
        (self.apex, self.legs)
    }
}

impl From<Net> for OpenNet {
    fn from(apex: Net) -> Self {
        Self::new(apex)
    }
}

impl TryFrom<OpenNetRepr> for OpenNet {
    type Error = NetError;

    fn try_from(repr: OpenNetRepr) -> Result<Self, Self::Error> {
        Self::with_legs(repr.apex, repr.legs)
    }
}

impl From<OpenNet> for OpenNetRepr {
    fn from(open: OpenNet) -> Self {
        Self {
            apex: open.apex,
            legs: open.legs,
        }
    }
}
