//! Geometry classification
//!
//! A tag describing how far a raymarcher can trust a distance estimate.
//! Composition can only keep or weaken a tag, and `Distorted` is absorbing.

use std::fmt;

/// Safety contract of a distance estimate, ordered from strongest to weakest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// True Euclidean distance everywhere
    Exact,
    /// Exact under parameter conditions (e.g. repetition cells larger than the shape)
    ExactConditional,
    /// Never overestimates
    Bounded,
    /// Bound under parameter conditions
    BoundedConditional,
    /// Iterated estimate; step conservatively
    Complex,
    /// Contains a recurse loop
    Recurse,
    /// Space is warped; no bound guarantee
    Distorted,
}

impl Geometry {
    fn rank(self) -> u8 {
        match self {
            Self::Exact => 0,
            Self::ExactConditional => 1,
            Self::Bounded => 2,
            Self::BoundedConditional => 3,
            Self::Complex => 4,
            Self::Recurse => 5,
            Self::Distorted => 6,
        }
    }

    /// The weaker of two tags.
    pub fn weakest(self, other: Self) -> Self {
        if other.rank() > self.rank() { other } else { self }
    }

    /// Combine two input tags under a node's declared tag: `declared`, unless
    /// either input is `Distorted`.
    pub fn combine(a: Self, b: Self, declared: Self) -> Self {
        if a == Self::Distorted || b == Self::Distorted {
            Self::Distorted
        } else {
            declared
        }
    }

    /// Tag of `self` after a modifier declaring `modifier`; never stronger than the input.
    pub fn modified_by(self, modifier: Self) -> Self {
        Self::combine(self, modifier, self.weakest(modifier))
    }

    /// Tag of `self` wrapped in a recurse loop.
    pub fn recursed(self) -> Self {
        Self::combine(self, self, Self::Complex)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
