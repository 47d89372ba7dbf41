//! String interning.
//!
//! The rewriting engine is single-threaded, so the interner is a plain
//! map + table pair with no locking. Each [`Tree`] owns one interner;
//! [`Name`]s are only meaningful against the interner that produced them.
//!
//! [`Tree`]: crate::Tree

use rustc_hash::FxHashMap;

use crate::Name;

/// Single-threaded string interner.
#[derive(Debug, Clone, Default)]
pub struct NameInterner {
    map: FxHashMap<Box<str>, Name>,
    names: Vec<Box<str>>,
}

impl NameInterner {
    /// Create an interner with the empty string pre-interned as
    /// [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut interner = NameInterner {
            map: FxHashMap::default(),
            names: Vec::new(),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern a string, returning its stable identifier.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.map.get(text) {
            return name;
        }
        let name = Name::from_raw(self.names.len() as u32);
        self.names.push(text.into());
        self.map.insert(text.into(), name);
        name
    }

    /// Look up a string without interning it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.map.get(text).copied()
    }

    /// Resolve a name back to its string.
    ///
    /// # Panics
    /// Panics if `name` did not come from this interner.
    pub fn resolve(&self, name: Name) -> &str {
        &self.names[name.index()]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check whether only the pre-interned empty string is present.
    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_intern_round_trip() {
        let mut interner = NameInterner::new();
        let hello = interner.intern("hello");
        let world = interner.intern("world");
        assert_ne!(hello, world);
        assert_eq!(interner.resolve(hello), "hello");
        assert_eq!(interner.resolve(world), "world");
    }

    #[test]
    fn test_intern_dedupes() {
        let mut interner = NameInterner::new();
        let a = interner.intern("value");
        let b = interner.intern("value");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 2); // "" + "value"
    }

    #[test]
    fn test_empty_pre_interned() {
        let mut interner = NameInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.resolve(Name::EMPTY), "");
        assert!(interner.is_empty());
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut interner = NameInterner::new();
        assert_eq!(interner.get("missing"), None);
        let name = interner.intern("missing");
        assert_eq!(interner.get("missing"), Some(name));
    }
}
