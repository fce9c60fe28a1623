//! Attributed Petri nets, their open-net composition algebra and mass-action
//! vectorfields.
//!
//! - [`net`]: the relational net store, attribute columns, casting and
//!   incidence matrices.
//! - [`open`]: open nets and composition along wiring diagrams.
//! - [`vectorfield`]: compilation of a rated net into `f(du, u, p, t)`.

pub mod config;
pub mod net;
pub mod open;
pub mod options;
pub mod vectorfield;
