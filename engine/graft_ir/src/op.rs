//! Operator and primitive-type tokens.
//!
//! One flat operator enum serves assignment, infix, prefix and postfix
//! positions; the owning node kind decides which subset is legal. The
//! rewriter only ever needs the token text, so the enum carries no
//! precedence information.

/// Operator token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    // Assignment
    Assign,
    PlusAssign,
    MinusAssign,
    TimesAssign,
    DivideAssign,
    RemainderAssign,
    LeftShiftAssign,
    RightShiftSignedAssign,
    RightShiftUnsignedAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,

    // Arithmetic
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,

    // Shift
    LeftShift,
    RightShiftSigned,
    RightShiftUnsigned,

    // Comparison
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    Equals,
    NotEquals,

    // Bitwise / logical
    BitAnd,
    BitOr,
    BitXor,
    ConditionalAnd,
    ConditionalOr,

    // Prefix / postfix
    Increment,
    Decrement,
    Not,
    Complement,
}

impl Operator {
    /// Returns the source-level token for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            // Assignment
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::TimesAssign => "*=",
            Self::DivideAssign => "/=",
            Self::RemainderAssign => "%=",
            Self::LeftShiftAssign => "<<=",
            Self::RightShiftSignedAssign => ">>=",
            Self::RightShiftUnsignedAssign => ">>>=",
            Self::BitAndAssign => "&=",
            Self::BitOrAssign => "|=",
            Self::BitXorAssign => "^=",
            // Arithmetic
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
            // Shift
            Self::LeftShift => "<<",
            Self::RightShiftSigned => ">>",
            Self::RightShiftUnsigned => ">>>",
            // Comparison
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEquals => "<=",
            Self::GreaterEquals => ">=",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            // Bitwise / logical
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ConditionalAnd => "&&",
            Self::ConditionalOr => "||",
            // Prefix / postfix
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::Not => "!",
            Self::Complement => "~",
        }
    }
}

/// Primitive type keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Void,
}

impl PrimitiveKind {
    /// Returns the type keyword as written in source.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Void => "void",
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::Assign.as_symbol(), "=");
        assert_eq!(Operator::RightShiftUnsignedAssign.as_symbol(), ">>>=");
        assert_eq!(Operator::ConditionalAnd.as_symbol(), "&&");
        assert_eq!(Operator::Complement.as_symbol(), "~");
    }

    #[test]
    fn test_primitive_keywords() {
        assert_eq!(PrimitiveKind::Int.as_str(), "int");
        assert_eq!(PrimitiveKind::Boolean.as_str(), "boolean");
        assert_eq!(PrimitiveKind::Void.as_str(), "void");
    }
}
