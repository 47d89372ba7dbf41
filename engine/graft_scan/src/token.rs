//! Token model.

use graft_ir::Span;

/// Kind of a scanned token.
///
/// Compound operators are lexed with maximal munch so boundary probes
/// never land inside a token. Queries that search for `Greater` accept
/// any token starting with `>` (see [`TokenKind::starts_with_greater`]),
/// which is how closing angle brackets of nested generics are found.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // === Keywords ===
    Abstract,
    Assert,
    Boolean,
    Break,
    Byte,
    Case,
    Catch,
    Char,
    Class,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extends,
    Final,
    Finally,
    Float,
    For,
    If,
    Implements,
    Import,
    Instanceof,
    Int,
    Interface,
    Long,
    Native,
    New,
    Package,
    Private,
    Protected,
    Public,
    Return,
    Short,
    Static,
    Strictfp,
    Super,
    Switch,
    Synchronized,
    This,
    Throw,
    Throws,
    Transient,
    Try,
    Void,
    Volatile,
    While,
    NullKeyword,
    TrueKeyword,
    FalseKeyword,

    // === Identifiers & literals ===
    Identifier,
    NumberLiteral,
    StringLiteral,
    CharLiteral,

    // === Comments ===
    LineComment,
    BlockComment,
    DocComment,

    // === Separators ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Ellipsis,
    At,

    // === Operators ===
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    BarAssign,
    CaretAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Amp,
    Bar,
    Caret,
    Tilde,
    Bang,
    AndAnd,
    OrOr,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    EqualsEquals,
    NotEquals,
    Question,
    Colon,
}

impl TokenKind {
    /// Whether this is one of the three comment forms.
    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment
        )
    }

    /// Whether the token's first character is `>`.
    ///
    /// Maximal munch fuses closing brackets of nested generics into shift
    /// tokens; a probe for `Greater` treats any of these as a hit one
    /// character wide.
    #[inline]
    pub fn starts_with_greater(self) -> bool {
        matches!(
            self,
            TokenKind::Greater
                | TokenKind::GreaterEquals
                | TokenKind::RightShift
                | TokenKind::UnsignedRightShift
                | TokenKind::RightShiftAssign
                | TokenKind::UnsignedRightShiftAssign
        )
    }

    /// Resolve a word to its keyword kind.
    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "abstract" => TokenKind::Abstract,
            "assert" => TokenKind::Assert,
            "boolean" => TokenKind::Boolean,
            "break" => TokenKind::Break,
            "byte" => TokenKind::Byte,
            "case" => TokenKind::Case,
            "catch" => TokenKind::Catch,
            "char" => TokenKind::Char,
            "class" => TokenKind::Class,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "do" => TokenKind::Do,
            "double" => TokenKind::Double,
            "else" => TokenKind::Else,
            "enum" => TokenKind::Enum,
            "extends" => TokenKind::Extends,
            "final" => TokenKind::Final,
            "finally" => TokenKind::Finally,
            "float" => TokenKind::Float,
            "for" => TokenKind::For,
            "if" => TokenKind::If,
            "implements" => TokenKind::Implements,
            "import" => TokenKind::Import,
            "instanceof" => TokenKind::Instanceof,
            "int" => TokenKind::Int,
            "interface" => TokenKind::Interface,
            "long" => TokenKind::Long,
            "native" => TokenKind::Native,
            "new" => TokenKind::New,
            "package" => TokenKind::Package,
            "private" => TokenKind::Private,
            "protected" => TokenKind::Protected,
            "public" => TokenKind::Public,
            "return" => TokenKind::Return,
            "short" => TokenKind::Short,
            "static" => TokenKind::Static,
            "strictfp" => TokenKind::Strictfp,
            "super" => TokenKind::Super,
            "switch" => TokenKind::Switch,
            "synchronized" => TokenKind::Synchronized,
            "this" => TokenKind::This,
            "throw" => TokenKind::Throw,
            "throws" => TokenKind::Throws,
            "transient" => TokenKind::Transient,
            "try" => TokenKind::Try,
            "void" => TokenKind::Void,
            "volatile" => TokenKind::Volatile,
            "while" => TokenKind::While,
            "null" => TokenKind::NullKeyword,
            "true" => TokenKind::TrueKeyword,
            "false" => TokenKind::FalseKeyword,
            _ => return None,
        })
    }
}

/// One scanned token: its kind and buffer span.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Token start offset.
    #[inline]
    pub fn start(&self) -> u32 {
        self.span.start
    }

    /// Token end offset (exclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.span.end
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::from_keyword("else"), Some(TokenKind::Else));
        assert_eq!(
            TokenKind::from_keyword("synchronized"),
            Some(TokenKind::Synchronized)
        );
        assert_eq!(TokenKind::from_keyword("elsewhere"), None);
        assert_eq!(TokenKind::from_keyword(""), None);
    }

    #[test]
    fn test_comment_predicate() {
        assert!(TokenKind::LineComment.is_comment());
        assert!(TokenKind::DocComment.is_comment());
        assert!(!TokenKind::Slash.is_comment());
    }

    #[test]
    fn test_greater_family() {
        assert!(TokenKind::Greater.starts_with_greater());
        assert!(TokenKind::UnsignedRightShiftAssign.starts_with_greater());
        assert!(!TokenKind::Less.starts_with_greater());
        assert!(!TokenKind::LeftShift.starts_with_greater());
    }
}
