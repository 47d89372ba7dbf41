//! Interned string identifier.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Interned string identifier.
///
/// A plain index into the owning tree's [`NameInterner`]. Comparing two
/// `Name`s from the same interner is an O(1) integer compare.
///
/// [`NameInterner`]: crate::NameInterner
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from a raw interner index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Hash for Name {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_raw_round_trip() {
        let name = Name::from_raw(1000);
        assert_eq!(name.raw(), 1000);
        assert_eq!(name.index(), 1000);
    }

    #[test]
    fn test_name_empty() {
        assert_eq!(Name::EMPTY.raw(), 0);
        assert_eq!(Name::default(), Name::EMPTY);
    }

    #[test]
    fn test_name_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Name::from_raw(1));
        set.insert(Name::from_raw(1)); // duplicate
        set.insert(Name::from_raw(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_name_ord() {
        assert!(Name::from_raw(1) < Name::from_raw(2));
    }
}
