//! Node kinds.
//!
//! One sum type covers every supported Java construct. Child links are
//! [`NodeId`]s into the owning [`Tree`]; lists are plain `Vec`s because the
//! rewriter reorders and splices them structurally.
//!
//! [`Tree`]: crate::Tree

use crate::{ModifierFlags, ModifierKeyword, Name, NodeId, Operator, PrimitiveKind};

/// Declaration modifiers in either language-level representation.
///
/// `Flags` is the scalar bitmask used by [`LanguageLevel::Jls2`] trees;
/// `Nodes` is the ordered child list of `Modifier` / annotation nodes used
/// from [`LanguageLevel::Jls3`] on.
///
/// [`LanguageLevel::Jls2`]: crate::LanguageLevel::Jls2
/// [`LanguageLevel::Jls3`]: crate::LanguageLevel::Jls3
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Modifiers {
    Flags(ModifierFlags),
    Nodes(Vec<NodeId>),
}

impl Modifiers {
    /// Empty modifier list in the node representation.
    pub const NONE: Modifiers = Modifiers::Nodes(Vec::new());

    /// The bitmask, if this is the scalar representation.
    pub fn flags(&self) -> Option<ModifierFlags> {
        match self {
            Modifiers::Flags(flags) => Some(*flags),
            Modifiers::Nodes(_) => None,
        }
    }

    /// The modifier nodes, if this is the list representation.
    pub fn nodes(&self) -> Option<&[NodeId]> {
        match self {
            Modifiers::Flags(_) => None,
            Modifiers::Nodes(nodes) => Some(nodes),
        }
    }
}

/// The kind (and payload) of a syntax tree node.
///
/// Fields named after the structural property they populate; see
/// [`Property`] for the generic access path used by the rewriter.
///
/// [`Property`]: crate::Property
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    // === Compilation unit & declarations ===
    /// Top-level unit: package declaration, imports, type declarations.
    CompilationUnit {
        package: Option<NodeId>,
        imports: Vec<NodeId>,
        types: Vec<NodeId>,
    },

    /// `package a.b.c;`
    PackageDeclaration {
        javadoc: Option<NodeId>,
        annotations: Vec<NodeId>,
        name: NodeId,
    },

    /// `import [static] a.b.C[.*];`
    ImportDeclaration {
        is_static: bool,
        name: NodeId,
        on_demand: bool,
    },

    /// `class C<T> extends S implements I { ... }` (or `interface`)
    TypeDeclaration {
        javadoc: Option<NodeId>,
        modifiers: Modifiers,
        is_interface: bool,
        name: NodeId,
        type_parameters: Vec<NodeId>,
        superclass: Option<NodeId>,
        super_interfaces: Vec<NodeId>,
        body: Vec<NodeId>,
    },

    /// `enum E implements I { A, B; ... }`
    EnumDeclaration {
        javadoc: Option<NodeId>,
        modifiers: Modifiers,
        name: NodeId,
        super_interfaces: Vec<NodeId>,
        constants: Vec<NodeId>,
        body: Vec<NodeId>,
    },

    /// `A(arguments)` inside an enum body.
    EnumConstantDeclaration {
        javadoc: Option<NodeId>,
        modifiers: Modifiers,
        name: NodeId,
        arguments: Vec<NodeId>,
    },

    /// `private int x = 1, y;`
    FieldDeclaration {
        javadoc: Option<NodeId>,
        modifiers: Modifiers,
        field_type: NodeId,
        fragments: Vec<NodeId>,
    },

    /// Method or constructor declaration.
    MethodDeclaration {
        javadoc: Option<NodeId>,
        modifiers: Modifiers,
        type_parameters: Vec<NodeId>,
        is_constructor: bool,
        return_type: Option<NodeId>,
        name: NodeId,
        parameters: Vec<NodeId>,
        extra_dimensions: u32,
        thrown: Vec<NodeId>,
        body: Option<NodeId>,
    },

    /// `static { ... }` or instance initializer block.
    Initializer {
        javadoc: Option<NodeId>,
        modifiers: Modifiers,
        body: NodeId,
    },

    /// `final Type name[] = init` (parameter or resource).
    SingleVariableDeclaration {
        modifiers: Modifiers,
        param_type: NodeId,
        is_varargs: bool,
        name: NodeId,
        extra_dimensions: u32,
        initializer: Option<NodeId>,
    },

    /// `name[] = init` inside a field or variable declaration.
    VariableDeclarationFragment {
        name: NodeId,
        extra_dimensions: u32,
        initializer: Option<NodeId>,
    },

    /// Doc comment, kept as one opaque text blob.
    Javadoc { text: Name },

    /// A single modifier keyword node.
    Modifier { keyword: ModifierKeyword },

    /// `@Name`
    MarkerAnnotation { type_name: NodeId },

    /// `@Name(value)`
    SingleMemberAnnotation { type_name: NodeId, value: NodeId },

    /// `@Name(a = 1, b = 2)`
    NormalAnnotation {
        type_name: NodeId,
        values: Vec<NodeId>,
    },

    /// `name = value` inside a normal annotation.
    MemberValuePair { name: NodeId, value: NodeId },

    // === Statements ===
    /// `{ ... }`
    Block { statements: Vec<NodeId> },

    /// `expression;`
    ExpressionStatement { expression: NodeId },

    /// `return [expression];`
    ReturnStatement { expression: Option<NodeId> },

    /// `throw expression;`
    ThrowStatement { expression: NodeId },

    /// `assert expression [: message];`
    AssertStatement {
        expression: NodeId,
        message: Option<NodeId>,
    },

    /// `if (expression) then [else other]`
    IfStatement {
        expression: NodeId,
        then_statement: NodeId,
        else_statement: Option<NodeId>,
    },

    /// `while (expression) body`
    WhileStatement { expression: NodeId, body: NodeId },

    /// `do body while (expression);`
    DoStatement { body: NodeId, expression: NodeId },

    /// `for (initializers; expression; updaters) body`
    ForStatement {
        initializers: Vec<NodeId>,
        expression: Option<NodeId>,
        updaters: Vec<NodeId>,
        body: NodeId,
    },

    /// `for (parameter : expression) body`
    EnhancedForStatement {
        parameter: NodeId,
        expression: NodeId,
        body: NodeId,
    },

    /// `switch (expression) { statements }`
    SwitchStatement {
        expression: NodeId,
        statements: Vec<NodeId>,
    },

    /// `case expression:` or `default:` when the expression is absent.
    SwitchCase { expression: Option<NodeId> },

    /// `break [label];`
    BreakStatement { label: Option<NodeId> },

    /// `continue [label];`
    ContinueStatement { label: Option<NodeId> },

    /// `label: body`
    LabeledStatement { label: NodeId, body: NodeId },

    /// `synchronized (expression) body`
    SynchronizedStatement { expression: NodeId, body: NodeId },

    /// `try [(resources)] body [catch...] [finally]`
    TryStatement {
        resources: Vec<NodeId>,
        body: NodeId,
        catch_clauses: Vec<NodeId>,
        finally_block: Option<NodeId>,
    },

    /// `catch (exception) body`
    CatchClause { exception: NodeId, body: NodeId },

    /// `final Type a = 1, b;` as a statement.
    VariableDeclarationStatement {
        modifiers: Modifiers,
        declared_type: NodeId,
        fragments: Vec<NodeId>,
    },

    /// Variable declaration in expression position (`for` initializer).
    VariableDeclarationExpression {
        modifiers: Modifiers,
        declared_type: NodeId,
        fragments: Vec<NodeId>,
    },

    /// `;`
    EmptyStatement,

    // === Expressions ===
    /// Identifier.
    SimpleName { identifier: Name },

    /// `qualifier.name`
    QualifiedName { qualifier: NodeId, name: NodeId },

    /// Integer or floating-point literal, kept as its source token.
    NumberLiteral { token: Name },

    /// String literal, kept in escaped source form including quotes.
    StringLiteral { escaped: Name },

    /// Character literal, kept in escaped source form including quotes.
    CharacterLiteral { escaped: Name },

    /// `true` / `false`
    BooleanLiteral { value: bool },

    /// `null`
    NullLiteral,

    /// `[qualifier.]this`
    ThisExpression { qualifier: Option<NodeId> },

    /// `left operator right` where operator is an assignment.
    Assignment {
        left: NodeId,
        operator: Operator,
        right: NodeId,
    },

    /// `left operator right [operator extended...]`
    InfixExpression {
        left: NodeId,
        operator: Operator,
        right: NodeId,
        extended_operands: Vec<NodeId>,
    },

    /// `operator operand`
    PrefixExpression { operator: Operator, operand: NodeId },

    /// `operand operator`
    PostfixExpression { operand: NodeId, operator: Operator },

    /// `[expression.]name(arguments)`
    MethodInvocation {
        expression: Option<NodeId>,
        name: NodeId,
        arguments: Vec<NodeId>,
    },

    /// `[expression.]new Type(arguments)`
    ClassInstanceCreation {
        expression: Option<NodeId>,
        created_type: NodeId,
        arguments: Vec<NodeId>,
    },

    /// `expression.name`
    FieldAccess { expression: NodeId, name: NodeId },

    /// `array[index]`
    ArrayAccess { array: NodeId, index: NodeId },

    /// `new Type[dim]...[initializer]`
    ArrayCreation {
        array_type: NodeId,
        dimensions: Vec<NodeId>,
        initializer: Option<NodeId>,
    },

    /// `{ expressions }`
    ArrayInitializer { expressions: Vec<NodeId> },

    /// `(expression)`
    ParenthesizedExpression { expression: NodeId },

    /// `condition ? then : else`
    ConditionalExpression {
        condition: NodeId,
        then_expression: NodeId,
        else_expression: NodeId,
    },

    /// `(Type) expression`
    CastExpression { cast_type: NodeId, expression: NodeId },

    /// `left instanceof Type`
    InstanceofExpression { left: NodeId, right_type: NodeId },

    // === Types ===
    /// `int`, `boolean`, `void`, ...
    PrimitiveType { kind: PrimitiveKind },

    /// A type named by a simple or qualified name.
    SimpleType { name: NodeId },

    /// `element[]...` with the dimension count kept scalar.
    ArrayType { element_type: NodeId, dimensions: u32 },

    /// `Base<type arguments>`
    ParameterizedType {
        base_type: NodeId,
        type_arguments: Vec<NodeId>,
    },

    /// `T extends A & B` in a type parameter list.
    TypeParameter { name: NodeId, bounds: Vec<NodeId> },
}

impl NodeKind {
    /// Construct-kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit { .. } => "CompilationUnit",
            NodeKind::PackageDeclaration { .. } => "PackageDeclaration",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::TypeDeclaration { .. } => "TypeDeclaration",
            NodeKind::EnumDeclaration { .. } => "EnumDeclaration",
            NodeKind::EnumConstantDeclaration { .. } => "EnumConstantDeclaration",
            NodeKind::FieldDeclaration { .. } => "FieldDeclaration",
            NodeKind::MethodDeclaration { .. } => "MethodDeclaration",
            NodeKind::Initializer { .. } => "Initializer",
            NodeKind::SingleVariableDeclaration { .. } => "SingleVariableDeclaration",
            NodeKind::VariableDeclarationFragment { .. } => "VariableDeclarationFragment",
            NodeKind::Javadoc { .. } => "Javadoc",
            NodeKind::Modifier { .. } => "Modifier",
            NodeKind::MarkerAnnotation { .. } => "MarkerAnnotation",
            NodeKind::SingleMemberAnnotation { .. } => "SingleMemberAnnotation",
            NodeKind::NormalAnnotation { .. } => "NormalAnnotation",
            NodeKind::MemberValuePair { .. } => "MemberValuePair",
            NodeKind::Block { .. } => "Block",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::AssertStatement { .. } => "AssertStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoStatement { .. } => "DoStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::EnhancedForStatement { .. } => "EnhancedForStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::SynchronizedStatement { .. } => "SynchronizedStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::VariableDeclarationStatement { .. } => "VariableDeclarationStatement",
            NodeKind::VariableDeclarationExpression { .. } => "VariableDeclarationExpression",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::SimpleName { .. } => "SimpleName",
            NodeKind::QualifiedName { .. } => "QualifiedName",
            NodeKind::NumberLiteral { .. } => "NumberLiteral",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::CharacterLiteral { .. } => "CharacterLiteral",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::ThisExpression { .. } => "ThisExpression",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::InfixExpression { .. } => "InfixExpression",
            NodeKind::PrefixExpression { .. } => "PrefixExpression",
            NodeKind::PostfixExpression { .. } => "PostfixExpression",
            NodeKind::MethodInvocation { .. } => "MethodInvocation",
            NodeKind::ClassInstanceCreation { .. } => "ClassInstanceCreation",
            NodeKind::FieldAccess { .. } => "FieldAccess",
            NodeKind::ArrayAccess { .. } => "ArrayAccess",
            NodeKind::ArrayCreation { .. } => "ArrayCreation",
            NodeKind::ArrayInitializer { .. } => "ArrayInitializer",
            NodeKind::ParenthesizedExpression { .. } => "ParenthesizedExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::CastExpression { .. } => "CastExpression",
            NodeKind::InstanceofExpression { .. } => "InstanceofExpression",
            NodeKind::PrimitiveType { .. } => "PrimitiveType",
            NodeKind::SimpleType { .. } => "SimpleType",
            NodeKind::ArrayType { .. } => "ArrayType",
            NodeKind::ParameterizedType { .. } => "ParameterizedType",
            NodeKind::TypeParameter { .. } => "TypeParameter",
        }
    }

    /// Whether two kinds are the same construct, ignoring payloads.
    #[inline]
    pub fn same_construct(&self, other: &NodeKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Whether this node is a statement.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block { .. }
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::ReturnStatement { .. }
                | NodeKind::ThrowStatement { .. }
                | NodeKind::AssertStatement { .. }
                | NodeKind::IfStatement { .. }
                | NodeKind::WhileStatement { .. }
                | NodeKind::DoStatement { .. }
                | NodeKind::ForStatement { .. }
                | NodeKind::EnhancedForStatement { .. }
                | NodeKind::SwitchStatement { .. }
                | NodeKind::SwitchCase { .. }
                | NodeKind::BreakStatement { .. }
                | NodeKind::ContinueStatement { .. }
                | NodeKind::LabeledStatement { .. }
                | NodeKind::SynchronizedStatement { .. }
                | NodeKind::TryStatement { .. }
                | NodeKind::VariableDeclarationStatement { .. }
                | NodeKind::EmptyStatement
        )
    }

    /// Whether this node is a field declaration (blank-line policy hook).
    #[inline]
    pub fn is_field_declaration(&self) -> bool {
        matches!(self, NodeKind::FieldDeclaration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_construct_ignores_payload() {
        let a = NodeKind::BreakStatement { label: None };
        let b = NodeKind::BreakStatement {
            label: Some(NodeId::from_raw(7)),
        };
        assert!(a.same_construct(&b));
        assert!(!a.same_construct(&NodeKind::EmptyStatement));
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(NodeKind::EmptyStatement.kind_name(), "EmptyStatement");
        let field = NodeKind::FieldDeclaration {
            javadoc: None,
            modifiers: Modifiers::NONE,
            field_type: NodeId::from_raw(0),
            fragments: vec![NodeId::from_raw(1)],
        };
        assert_eq!(field.kind_name(), "FieldDeclaration");
        assert!(field.is_field_declaration());
    }

    #[test]
    fn test_is_statement() {
        assert!(NodeKind::EmptyStatement.is_statement());
        assert!(NodeKind::Block { statements: vec![] }.is_statement());
        assert!(!NodeKind::NullLiteral.is_statement());
    }
}
