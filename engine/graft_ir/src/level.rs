//! Source language levels.

/// Language level a tree was built against.
///
/// The level decides which structural properties a node kind exposes. The
/// visible differences for rewriting:
/// - `Jls2` represents declaration modifiers as one scalar bitmask property;
///   `Jls3` and later use a child list of modifier and annotation nodes.
/// - `Jls3` adds generics (type parameters, parameterized types), enums and
///   annotations; `Jls4` adds try-with-resources; `Jls8` is the baseline for
///   everything after that.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LanguageLevel {
    /// Pre-generics Java (1.4 and earlier).
    Jls2,
    /// Java 5 language (generics, enums, annotations, varargs).
    Jls3,
    /// Java 7 language (try-with-resources, diamond).
    Jls4,
    /// Java 8 and later.
    #[default]
    Jls8,
}

impl LanguageLevel {
    /// Whether declaration modifiers are a scalar bitmask property.
    #[inline]
    pub fn uses_modifier_flags(self) -> bool {
        self == LanguageLevel::Jls2
    }
}
