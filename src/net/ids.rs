//! Typed 1-based identifiers for species, transitions and arcs.
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::net::index_vec::Idx;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// `raw` is the 1-based identifier; zero is never a valid id.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, stringify!($name))?;
                f.debug_tuple("").field(&self.0).finish()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl $crate::net::index_vec::Idx for $name {
            fn index(self) -> usize {
                debug_assert!(self.0 > 0, "identifiers are 1-based");
                (self.0 - 1) as usize
            }

            fn from_usize(idx: usize) -> Self {
                Self(idx as u32 + 1)
            }
        }
    };
}

pub(crate) use define_id;

define_id!(SpeciesId, "s");
define_id!(TransitionId, "t");
define_id!(ArcId, "a");

/// Contiguous block of identifiers handed out by a bulk insertion.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IdRange<I> {
    pub start: I,
    pub end: I,
}

impl<I: Idx> IdRange<I> {
    pub(crate) fn from_positions(positions: Range<usize>) -> Self {
        Self {
            start: I::from_usize(positions.start),
            end: I::from_usize(positions.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.index() - self.start.index()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = I> + use<I> {
        (self.start.index()..self.end.index()).map(I::from_usize)
    }
}
