//! # Attributed Petri nets
//!
//! A net is four relational tables: species `S`, transitions `T`, input arcs
//! `I ⊆ T × S` and output arcs `O ⊆ T × S` (as multisets, so repeated pairs
//! encode stoichiometry). On top of the tables a net carries any subset of
//! attribute columns: names, concentrations, rates and opaque properties.
//! The usual variants are named column sets ([`Columns::LABELLED`],
//! [`Columns::REACTION`], ...), not separate types.
//!
//! From the arcs we derive the matrices `input, output ∈ ℕ^{|T|×|S|}` and the
//! stoichiometry `output - input` that drive mass-action kinetics.
//!
//! ## Example
//!
//! ```rust
//! use petri_algebra::net::*;
//!
//! let sir = Net::labelled_reaction(
//!     [("S", 10.0), ("I", 1.0), ("R", 0.0)],
//!     [
//!         (("inf", 0.4), TransitionSpec::new(["S", "I"], ["I", "I"])),
//!         (("rec", 0.4), TransitionSpec::new(["I"], ["R"])),
//!     ],
//! )
//! .unwrap();
//!
//! let matrices = sir.matrices();
//! assert_eq!(matrices.shape(), (2, 3));
//! assert_eq!(sir.find_species("I").unwrap(), SpeciesId::new(2));
//! ```

pub mod cast;
pub mod columns;
pub mod construct;
pub mod core;
pub mod ids;
pub mod incidence;
pub mod index_vec;
#[cfg(feature = "invariants")]
pub mod invariants;
pub mod io;
pub mod key;
pub mod rate;
pub mod store;

pub use cast::CastAttributes;
pub use columns::{Column, Columns, SpeciesRecord, TransitionRecord};
pub use construct::TransitionSpec;
pub use core::{Net, NetError};
pub use ids::{ArcId, IdRange, SpeciesId, TransitionId};
pub use incidence::{Incidence, TransitionMatrices};
pub use index_vec::{Idx, IndexVec};
pub use key::Key;
pub use rate::Rate;
pub use store::{Arc, NetStore};
