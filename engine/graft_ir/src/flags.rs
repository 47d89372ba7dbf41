//! Source modifier flags.
//!
//! The classic bitmask representation of Java declaration modifiers, using
//! the reflection bit numbering. Trees at [`LanguageLevel::Jls2`] store
//! modifiers as one scalar bitmask property; later levels use a child list
//! of modifier nodes instead (see [`ModifierKeyword`]).
//!
//! [`LanguageLevel::Jls2`]: crate::LanguageLevel::Jls2

use bitflags::bitflags;

bitflags! {
    /// Declaration modifier bitmask.
    ///
    /// Bit values follow `java.lang.reflect.Modifier`, which keeps the
    /// scalar modifiers property interchangeable with reflective values.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ModifierFlags: u32 {
        // === Visibility (bits 0-2) ===

        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;

        // === Member shape (bits 3-5) ===

        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;

        // === Field / method semantics (bits 6-11) ===

        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICTFP = 0x0800;
    }
}

impl ModifierFlags {
    /// Keyword text for a single-bit flag value, `None` for compound sets.
    pub fn keyword_text(self) -> Option<&'static str> {
        Some(match self {
            ModifierFlags::PUBLIC => "public",
            ModifierFlags::PRIVATE => "private",
            ModifierFlags::PROTECTED => "protected",
            ModifierFlags::STATIC => "static",
            ModifierFlags::FINAL => "final",
            ModifierFlags::SYNCHRONIZED => "synchronized",
            ModifierFlags::VOLATILE => "volatile",
            ModifierFlags::TRANSIENT => "transient",
            ModifierFlags::NATIVE => "native",
            ModifierFlags::ABSTRACT => "abstract",
            ModifierFlags::STRICTFP => "strictfp",
            _ => return None,
        })
    }
}

// Serialized as the raw bitmask; unknown bits are dropped on the way in.
#[cfg(feature = "cache")]
impl serde::Serialize for ModifierFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

#[cfg(feature = "cache")]
impl<'de> serde::Deserialize<'de> for ModifierFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Ok(ModifierFlags::from_bits_truncate(bits))
    }
}

/// Modifier keyword carried by a dedicated modifier node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierKeyword {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Synchronized,
    Volatile,
    Native,
    Strictfp,
    Transient,
}

impl ModifierKeyword {
    /// Keyword text as written in source.
    pub fn as_str(self) -> &'static str {
        match self {
            ModifierKeyword::Public => "public",
            ModifierKeyword::Protected => "protected",
            ModifierKeyword::Private => "private",
            ModifierKeyword::Static => "static",
            ModifierKeyword::Abstract => "abstract",
            ModifierKeyword::Final => "final",
            ModifierKeyword::Synchronized => "synchronized",
            ModifierKeyword::Volatile => "volatile",
            ModifierKeyword::Native => "native",
            ModifierKeyword::Strictfp => "strictfp",
            ModifierKeyword::Transient => "transient",
        }
    }

    /// Corresponding bitmask flag.
    pub fn flag(self) -> ModifierFlags {
        match self {
            ModifierKeyword::Public => ModifierFlags::PUBLIC,
            ModifierKeyword::Protected => ModifierFlags::PROTECTED,
            ModifierKeyword::Private => ModifierFlags::PRIVATE,
            ModifierKeyword::Static => ModifierFlags::STATIC,
            ModifierKeyword::Abstract => ModifierFlags::ABSTRACT,
            ModifierKeyword::Final => ModifierFlags::FINAL,
            ModifierKeyword::Synchronized => ModifierFlags::SYNCHRONIZED,
            ModifierKeyword::Volatile => ModifierFlags::VOLATILE,
            ModifierKeyword::Native => ModifierFlags::NATIVE,
            ModifierKeyword::Strictfp => ModifierFlags::STRICTFP,
            ModifierKeyword::Transient => ModifierFlags::TRANSIENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_keyword_text_single_bits() {
        assert_eq!(ModifierFlags::PUBLIC.keyword_text(), Some("public"));
        assert_eq!(ModifierFlags::STRICTFP.keyword_text(), Some("strictfp"));
        assert_eq!(
            (ModifierFlags::PUBLIC | ModifierFlags::STATIC).keyword_text(),
            None
        );
        assert_eq!(ModifierFlags::empty().keyword_text(), None);
    }

    #[test]
    fn test_keyword_flag_round_trip() {
        let keywords = [
            ModifierKeyword::Public,
            ModifierKeyword::Protected,
            ModifierKeyword::Private,
            ModifierKeyword::Static,
            ModifierKeyword::Abstract,
            ModifierKeyword::Final,
            ModifierKeyword::Synchronized,
            ModifierKeyword::Volatile,
            ModifierKeyword::Native,
            ModifierKeyword::Strictfp,
            ModifierKeyword::Transient,
        ];
        for keyword in keywords {
            assert_eq!(keyword.flag().keyword_text(), Some(keyword.as_str()));
        }
    }

    #[test]
    fn test_reflection_bit_values() {
        assert_eq!(ModifierFlags::PUBLIC.bits(), 0x0001);
        assert_eq!(ModifierFlags::ABSTRACT.bits(), 0x0400);
        assert_eq!(ModifierFlags::STRICTFP.bits(), 0x0800);
    }
}
