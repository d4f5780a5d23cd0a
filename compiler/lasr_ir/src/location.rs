//! Source locations attached to every IR node.
//!
//! A [`Location`] is a pair of byte offsets into the source file. Nodes
//! synthesized by passes reuse the location of the node they replace, so
//! diagnostics always point back at user code.

use std::fmt;

/// Byte range `first..=last` in the source file.
///
/// Layout: 8 bytes total (two `u32` offsets).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct Location {
    pub first: u32,
    pub last: u32,
}

impl Location {
    /// Location for nodes that have no source counterpart.
    pub const DUMMY: Location = Location { first: 0, last: 0 };

    #[inline]
    pub const fn new(first: u32, last: u32) -> Self {
        Location { first, last }
    }

    /// Smallest location covering both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Location) -> Location {
        Location {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }

    /// Number of bytes covered (inclusive range).
    #[inline]
    pub const fn len(&self) -> u32 {
        self.last.saturating_sub(self.first) + 1
    }

    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.first == 0 && self.last == 0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.first, self.last)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}
