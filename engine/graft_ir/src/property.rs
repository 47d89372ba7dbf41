//! Structural properties.
//!
//! Every rewritable slot of every node kind has one name in the flat
//! [`Property`] enum. The rewriter is driven entirely through this layer:
//! events are keyed by `(NodeId, Property)`, and both the original and the
//! new state of a slot are read back as [`PropertyRef`] / [`PropertyValue`].
//!
//! [`NodeKind::properties`] lists a node's slots in source order, so a
//! generic walk over `properties()` + [`Tree::property`] visits children in
//! the order they appear in the buffer.

use crate::{
    ModifierFlags, ModifierKeyword, Modifiers, Name, NodeId, NodeKind, Operator, PrimitiveKind,
    Tree,
};

/// Name of a structural slot.
///
/// One flat namespace across all node kinds; a given property keeps the
/// same [`PropertyShape`] everywhere it appears.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Property {
    // Compilation unit
    Package,
    Imports,
    Types,

    // Declarations
    Javadoc,
    Annotations,
    Name,
    StaticFlag,
    OnDemand,
    Modifiers,
    ModifierList,
    InterfaceFlag,
    TypeParameters,
    Superclass,
    SuperInterfaces,
    BodyDeclarations,
    EnumConstants,
    Arguments,
    Type,
    Fragments,
    ConstructorFlag,
    ReturnType,
    Parameters,
    ExtraDimensions,
    Thrown,
    Body,
    VarargsFlag,
    Initializer,
    CommentText,
    Keyword,
    TypeName,
    Value,
    Values,

    // Statements
    Statements,
    Expression,
    Message,
    ThenStatement,
    ElseStatement,
    Initializers,
    Updaters,
    Parameter,
    Label,
    Resources,
    CatchClauses,
    Finally,
    Exception,

    // Expressions
    Identifier,
    Qualifier,
    Token,
    EscapedValue,
    BooleanValue,
    LeftHandSide,
    Operator,
    RightHandSide,
    LeftOperand,
    RightOperand,
    ExtendedOperands,
    Operand,
    Array,
    Index,
    Dimensions,
    Expressions,
    ThenExpression,
    ElseExpression,

    // Types
    PrimitiveTypeCode,
    ElementType,
    DimensionCount,
    TypeArguments,
    TypeBounds,
}

/// Value shape of a structural slot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PropertyShape {
    /// Single child node, possibly absent.
    Child,
    /// Ordered child node list.
    List,
    Flag,
    Number,
    Text,
    Operator,
    Keyword,
    Primitive,
    Flags,
}

impl Property {
    /// The shape this property has on every kind that declares it.
    pub fn shape(self) -> PropertyShape {
        use Property as P;
        match self {
            P::Package | P::Javadoc | P::Name | P::Superclass | P::Type | P::ReturnType
            | P::Body | P::Initializer | P::TypeName | P::Value | P::Expression | P::Message
            | P::ThenStatement | P::ElseStatement | P::Parameter | P::Label | P::Finally
            | P::Exception | P::Qualifier | P::LeftHandSide | P::RightHandSide
            | P::LeftOperand | P::RightOperand | P::Operand | P::Array | P::Index
            | P::ThenExpression | P::ElseExpression | P::ElementType => PropertyShape::Child,

            P::Imports | P::Types | P::Annotations | P::ModifierList | P::TypeParameters
            | P::SuperInterfaces | P::BodyDeclarations | P::EnumConstants | P::Arguments
            | P::Fragments | P::Parameters | P::Thrown | P::Values | P::Statements
            | P::Initializers | P::Updaters | P::Resources | P::CatchClauses
            | P::ExtendedOperands | P::Dimensions | P::Expressions | P::TypeArguments
            | P::TypeBounds => PropertyShape::List,

            P::StaticFlag | P::OnDemand | P::InterfaceFlag | P::ConstructorFlag
            | P::VarargsFlag | P::BooleanValue => PropertyShape::Flag,

            P::ExtraDimensions | P::DimensionCount => PropertyShape::Number,

            P::CommentText | P::Identifier | P::Token | P::EscapedValue => PropertyShape::Text,

            P::Operator => PropertyShape::Operator,
            P::Keyword => PropertyShape::Keyword,
            P::PrimitiveTypeCode => PropertyShape::Primitive,
            P::Modifiers => PropertyShape::Flags,
        }
    }
}

/// Borrowed view of a slot's current value in the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyRef<'t> {
    Child(Option<NodeId>),
    List(&'t [NodeId]),
    Flag(bool),
    Number(u32),
    Text(Name),
    Operator(Operator),
    Keyword(ModifierKeyword),
    Primitive(PrimitiveKind),
    Flags(ModifierFlags),
}

impl PropertyRef<'_> {
    /// Convert to an owned value; an absent optional child has none.
    pub fn to_value(self) -> Option<PropertyValue> {
        match self {
            PropertyRef::Child(None) => None,
            PropertyRef::Child(Some(id)) => Some(PropertyValue::Child(id)),
            PropertyRef::List(ids) => Some(PropertyValue::List(ids.to_vec())),
            PropertyRef::Flag(v) => Some(PropertyValue::Flag(v)),
            PropertyRef::Number(v) => Some(PropertyValue::Number(v)),
            PropertyRef::Text(v) => Some(PropertyValue::Text(v)),
            PropertyRef::Operator(v) => Some(PropertyValue::Operator(v)),
            PropertyRef::Keyword(v) => Some(PropertyValue::Keyword(v)),
            PropertyRef::Primitive(v) => Some(PropertyValue::Primitive(v)),
            PropertyRef::Flags(v) => Some(PropertyValue::Flags(v)),
        }
    }

    /// The child node, when this is a present child slot.
    pub fn child(self) -> Option<NodeId> {
        match self {
            PropertyRef::Child(child) => child,
            _ => None,
        }
    }
}

impl<'t> PropertyRef<'t> {
    /// The list slice, when this is a list slot.
    pub fn list(self) -> Option<&'t [NodeId]> {
        match self {
            PropertyRef::List(list) => Some(list),
            _ => None,
        }
    }
}

/// Owned slot value, as carried inside rewrite events.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyValue {
    Child(NodeId),
    List(Vec<NodeId>),
    Flag(bool),
    Number(u32),
    Text(Name),
    Operator(Operator),
    Keyword(ModifierKeyword),
    Primitive(PrimitiveKind),
    Flags(ModifierFlags),
}

impl PropertyValue {
    /// The child node, when this is a child value.
    pub fn as_child(&self) -> Option<NodeId> {
        match self {
            PropertyValue::Child(id) => Some(*id),
            _ => None,
        }
    }

    /// The node list, when this is a list value.
    pub fn as_list(&self) -> Option<&[NodeId]> {
        match self {
            PropertyValue::List(ids) => Some(ids),
            _ => None,
        }
    }

    /// The flag, when this is a flag value.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(v) => Some(*v),
            _ => None,
        }
    }

    /// The number, when this is a numeric value.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The interned text, when this is a text value.
    pub fn as_text(&self) -> Option<Name> {
        match self {
            PropertyValue::Text(v) => Some(*v),
            _ => None,
        }
    }

    /// The operator, when this is an operator value.
    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            PropertyValue::Operator(v) => Some(*v),
            _ => None,
        }
    }

    /// The modifier bitmask, when this is a flags value.
    pub fn as_flags(&self) -> Option<ModifierFlags> {
        match self {
            PropertyValue::Flags(v) => Some(*v),
            _ => None,
        }
    }

    /// The shape this value satisfies.
    pub fn shape(&self) -> PropertyShape {
        match self {
            PropertyValue::Child(_) => PropertyShape::Child,
            PropertyValue::List(_) => PropertyShape::List,
            PropertyValue::Flag(_) => PropertyShape::Flag,
            PropertyValue::Number(_) => PropertyShape::Number,
            PropertyValue::Text(_) => PropertyShape::Text,
            PropertyValue::Operator(_) => PropertyShape::Operator,
            PropertyValue::Keyword(_) => PropertyShape::Keyword,
            PropertyValue::Primitive(_) => PropertyShape::Primitive,
            PropertyValue::Flags(_) => PropertyShape::Flags,
        }
    }
}

/// Property list for declarations whose modifiers slot depends on the
/// stored representation.
macro_rules! decl_properties {
    ($modifiers:expr, [$($before:expr),*], [$($after:expr),*]) => {{
        const WITH_FLAGS: &[Property] =
            &[$($before,)* Property::Modifiers, $($after,)*];
        const WITH_NODES: &[Property] =
            &[$($before,)* Property::ModifierList, $($after,)*];
        match $modifiers {
            Modifiers::Flags(_) => WITH_FLAGS,
            Modifiers::Nodes(_) => WITH_NODES,
        }
    }};
}

impl NodeKind {
    /// Structural slots of this kind, in source order.
    pub fn properties(&self) -> &'static [Property] {
        use Property as P;
        match self {
            NodeKind::CompilationUnit { .. } => &[P::Package, P::Imports, P::Types],
            NodeKind::PackageDeclaration { .. } => &[P::Javadoc, P::Annotations, P::Name],
            NodeKind::ImportDeclaration { .. } => &[P::StaticFlag, P::Name, P::OnDemand],
            NodeKind::TypeDeclaration { modifiers, .. } => decl_properties!(
                modifiers,
                [P::Javadoc],
                [
                    P::InterfaceFlag,
                    P::Name,
                    P::TypeParameters,
                    P::Superclass,
                    P::SuperInterfaces,
                    P::BodyDeclarations
                ]
            ),
            NodeKind::EnumDeclaration { modifiers, .. } => decl_properties!(
                modifiers,
                [P::Javadoc],
                [
                    P::Name,
                    P::SuperInterfaces,
                    P::EnumConstants,
                    P::BodyDeclarations
                ]
            ),
            NodeKind::EnumConstantDeclaration { modifiers, .. } => {
                decl_properties!(modifiers, [P::Javadoc], [P::Name, P::Arguments])
            }
            NodeKind::FieldDeclaration { modifiers, .. } => {
                decl_properties!(modifiers, [P::Javadoc], [P::Type, P::Fragments])
            }
            NodeKind::MethodDeclaration { modifiers, .. } => decl_properties!(
                modifiers,
                [P::Javadoc],
                [
                    P::TypeParameters,
                    P::ConstructorFlag,
                    P::ReturnType,
                    P::Name,
                    P::Parameters,
                    P::ExtraDimensions,
                    P::Thrown,
                    P::Body
                ]
            ),
            NodeKind::Initializer { modifiers, .. } => {
                decl_properties!(modifiers, [P::Javadoc], [P::Body])
            }
            NodeKind::SingleVariableDeclaration { modifiers, .. } => decl_properties!(
                modifiers,
                [],
                [
                    P::Type,
                    P::VarargsFlag,
                    P::Name,
                    P::ExtraDimensions,
                    P::Initializer
                ]
            ),
            NodeKind::VariableDeclarationFragment { .. } => {
                &[P::Name, P::ExtraDimensions, P::Initializer]
            }
            NodeKind::Javadoc { .. } => &[P::CommentText],
            NodeKind::Modifier { .. } => &[P::Keyword],
            NodeKind::MarkerAnnotation { .. } => &[P::TypeName],
            NodeKind::SingleMemberAnnotation { .. } => &[P::TypeName, P::Value],
            NodeKind::NormalAnnotation { .. } => &[P::TypeName, P::Values],
            NodeKind::MemberValuePair { .. } => &[P::Name, P::Value],
            NodeKind::Block { .. } => &[P::Statements],
            NodeKind::ExpressionStatement { .. }
            | NodeKind::ThrowStatement { .. }
            | NodeKind::ReturnStatement { .. }
            | NodeKind::SwitchCase { .. } => &[P::Expression],
            NodeKind::AssertStatement { .. } => &[P::Expression, P::Message],
            NodeKind::IfStatement { .. } => &[P::Expression, P::ThenStatement, P::ElseStatement],
            NodeKind::WhileStatement { .. } | NodeKind::SynchronizedStatement { .. } => {
                &[P::Expression, P::Body]
            }
            NodeKind::DoStatement { .. } => &[P::Body, P::Expression],
            NodeKind::ForStatement { .. } => {
                &[P::Initializers, P::Expression, P::Updaters, P::Body]
            }
            NodeKind::EnhancedForStatement { .. } => &[P::Parameter, P::Expression, P::Body],
            NodeKind::SwitchStatement { .. } => &[P::Expression, P::Statements],
            NodeKind::BreakStatement { .. } | NodeKind::ContinueStatement { .. } => &[P::Label],
            NodeKind::LabeledStatement { .. } => &[P::Label, P::Body],
            NodeKind::TryStatement { .. } => {
                &[P::Resources, P::Body, P::CatchClauses, P::Finally]
            }
            NodeKind::CatchClause { .. } => &[P::Exception, P::Body],
            NodeKind::VariableDeclarationStatement { modifiers, .. }
            | NodeKind::VariableDeclarationExpression { modifiers, .. } => {
                decl_properties!(modifiers, [], [P::Type, P::Fragments])
            }
            NodeKind::EmptyStatement | NodeKind::NullLiteral => &[],
            NodeKind::SimpleName { .. } => &[P::Identifier],
            NodeKind::QualifiedName { .. } => &[P::Qualifier, P::Name],
            NodeKind::NumberLiteral { .. } => &[P::Token],
            NodeKind::StringLiteral { .. } | NodeKind::CharacterLiteral { .. } => {
                &[P::EscapedValue]
            }
            NodeKind::BooleanLiteral { .. } => &[P::BooleanValue],
            NodeKind::ThisExpression { .. } => &[P::Qualifier],
            NodeKind::Assignment { .. } => &[P::LeftHandSide, P::Operator, P::RightHandSide],
            NodeKind::InfixExpression { .. } => {
                &[P::LeftOperand, P::Operator, P::RightOperand, P::ExtendedOperands]
            }
            NodeKind::PrefixExpression { .. } => &[P::Operator, P::Operand],
            NodeKind::PostfixExpression { .. } => &[P::Operand, P::Operator],
            NodeKind::MethodInvocation { .. } => &[P::Expression, P::Name, P::Arguments],
            NodeKind::ClassInstanceCreation { .. } => &[P::Expression, P::Type, P::Arguments],
            NodeKind::FieldAccess { .. } => &[P::Expression, P::Name],
            NodeKind::ArrayAccess { .. } => &[P::Array, P::Index],
            NodeKind::ArrayCreation { .. } => &[P::Type, P::Dimensions, P::Initializer],
            NodeKind::ArrayInitializer { .. } => &[P::Expressions],
            NodeKind::ParenthesizedExpression { .. } => &[P::Expression],
            NodeKind::ConditionalExpression { .. } => {
                &[P::Expression, P::ThenExpression, P::ElseExpression]
            }
            NodeKind::CastExpression { .. } => &[P::Type, P::Expression],
            NodeKind::InstanceofExpression { .. } => &[P::LeftOperand, P::RightOperand],
            NodeKind::PrimitiveType { .. } => &[P::PrimitiveTypeCode],
            NodeKind::SimpleType { .. } => &[P::Name],
            NodeKind::ArrayType { .. } => &[P::ElementType, P::DimensionCount],
            NodeKind::ParameterizedType { .. } => &[P::Type, P::TypeArguments],
            NodeKind::TypeParameter { .. } => &[P::Name, P::TypeBounds],
        }
    }
}

fn modifiers_ref(modifiers: &Modifiers, property: Property) -> Option<PropertyRef<'_>> {
    match (modifiers, property) {
        (Modifiers::Flags(flags), Property::Modifiers) => Some(PropertyRef::Flags(*flags)),
        (Modifiers::Nodes(nodes), Property::ModifierList) => Some(PropertyRef::List(nodes)),
        _ => None,
    }
}

impl Tree {
    /// Generic read access to a structural slot.
    ///
    /// Returns `None` when the node's kind has no such property.
    pub fn property(&self, id: NodeId, property: Property) -> Option<PropertyRef<'_>> {
        use Property as P;
        use PropertyRef as R;
        let kind = self.kind(id);
        Some(match (kind, property) {
            (NodeKind::CompilationUnit { package, .. }, P::Package) => R::Child(*package),
            (NodeKind::CompilationUnit { imports, .. }, P::Imports) => R::List(imports),
            (NodeKind::CompilationUnit { types, .. }, P::Types) => R::List(types),

            (NodeKind::PackageDeclaration { javadoc, .. }, P::Javadoc) => R::Child(*javadoc),
            (NodeKind::PackageDeclaration { annotations, .. }, P::Annotations) => {
                R::List(annotations)
            }
            (NodeKind::PackageDeclaration { name, .. }, P::Name) => R::Child(Some(*name)),

            (NodeKind::ImportDeclaration { is_static, .. }, P::StaticFlag) => R::Flag(*is_static),
            (NodeKind::ImportDeclaration { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::ImportDeclaration { on_demand, .. }, P::OnDemand) => R::Flag(*on_demand),

            (NodeKind::TypeDeclaration { javadoc, .. }, P::Javadoc) => R::Child(*javadoc),
            (NodeKind::TypeDeclaration { modifiers, .. }, P::Modifiers | P::ModifierList) => {
                modifiers_ref(modifiers, property)?
            }
            (NodeKind::TypeDeclaration { is_interface, .. }, P::InterfaceFlag) => {
                R::Flag(*is_interface)
            }
            (NodeKind::TypeDeclaration { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::TypeDeclaration { type_parameters, .. }, P::TypeParameters) => {
                R::List(type_parameters)
            }
            (NodeKind::TypeDeclaration { superclass, .. }, P::Superclass) => R::Child(*superclass),
            (NodeKind::TypeDeclaration { super_interfaces, .. }, P::SuperInterfaces) => {
                R::List(super_interfaces)
            }
            (NodeKind::TypeDeclaration { body, .. }, P::BodyDeclarations) => R::List(body),

            (NodeKind::EnumDeclaration { javadoc, .. }, P::Javadoc) => R::Child(*javadoc),
            (NodeKind::EnumDeclaration { modifiers, .. }, P::Modifiers | P::ModifierList) => {
                modifiers_ref(modifiers, property)?
            }
            (NodeKind::EnumDeclaration { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::EnumDeclaration { super_interfaces, .. }, P::SuperInterfaces) => {
                R::List(super_interfaces)
            }
            (NodeKind::EnumDeclaration { constants, .. }, P::EnumConstants) => R::List(constants),
            (NodeKind::EnumDeclaration { body, .. }, P::BodyDeclarations) => R::List(body),

            (NodeKind::EnumConstantDeclaration { javadoc, .. }, P::Javadoc) => R::Child(*javadoc),
            (
                NodeKind::EnumConstantDeclaration { modifiers, .. },
                P::Modifiers | P::ModifierList,
            ) => modifiers_ref(modifiers, property)?,
            (NodeKind::EnumConstantDeclaration { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::EnumConstantDeclaration { arguments, .. }, P::Arguments) => {
                R::List(arguments)
            }

            (NodeKind::FieldDeclaration { javadoc, .. }, P::Javadoc) => R::Child(*javadoc),
            (NodeKind::FieldDeclaration { modifiers, .. }, P::Modifiers | P::ModifierList) => {
                modifiers_ref(modifiers, property)?
            }
            (NodeKind::FieldDeclaration { field_type, .. }, P::Type) => R::Child(Some(*field_type)),
            (NodeKind::FieldDeclaration { fragments, .. }, P::Fragments) => R::List(fragments),

            (NodeKind::MethodDeclaration { javadoc, .. }, P::Javadoc) => R::Child(*javadoc),
            (NodeKind::MethodDeclaration { modifiers, .. }, P::Modifiers | P::ModifierList) => {
                modifiers_ref(modifiers, property)?
            }
            (NodeKind::MethodDeclaration { type_parameters, .. }, P::TypeParameters) => {
                R::List(type_parameters)
            }
            (NodeKind::MethodDeclaration { is_constructor, .. }, P::ConstructorFlag) => {
                R::Flag(*is_constructor)
            }
            (NodeKind::MethodDeclaration { return_type, .. }, P::ReturnType) => {
                R::Child(*return_type)
            }
            (NodeKind::MethodDeclaration { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::MethodDeclaration { parameters, .. }, P::Parameters) => R::List(parameters),
            (NodeKind::MethodDeclaration { extra_dimensions, .. }, P::ExtraDimensions) => {
                R::Number(*extra_dimensions)
            }
            (NodeKind::MethodDeclaration { thrown, .. }, P::Thrown) => R::List(thrown),
            (NodeKind::MethodDeclaration { body, .. }, P::Body) => R::Child(*body),

            (NodeKind::Initializer { javadoc, .. }, P::Javadoc) => R::Child(*javadoc),
            (NodeKind::Initializer { modifiers, .. }, P::Modifiers | P::ModifierList) => {
                modifiers_ref(modifiers, property)?
            }
            (NodeKind::Initializer { body, .. }, P::Body) => R::Child(Some(*body)),

            (
                NodeKind::SingleVariableDeclaration { modifiers, .. },
                P::Modifiers | P::ModifierList,
            ) => modifiers_ref(modifiers, property)?,
            (NodeKind::SingleVariableDeclaration { param_type, .. }, P::Type) => {
                R::Child(Some(*param_type))
            }
            (NodeKind::SingleVariableDeclaration { is_varargs, .. }, P::VarargsFlag) => {
                R::Flag(*is_varargs)
            }
            (NodeKind::SingleVariableDeclaration { name, .. }, P::Name) => R::Child(Some(*name)),
            (
                NodeKind::SingleVariableDeclaration { extra_dimensions, .. },
                P::ExtraDimensions,
            ) => R::Number(*extra_dimensions),
            (NodeKind::SingleVariableDeclaration { initializer, .. }, P::Initializer) => {
                R::Child(*initializer)
            }

            (NodeKind::VariableDeclarationFragment { name, .. }, P::Name) => R::Child(Some(*name)),
            (
                NodeKind::VariableDeclarationFragment { extra_dimensions, .. },
                P::ExtraDimensions,
            ) => R::Number(*extra_dimensions),
            (NodeKind::VariableDeclarationFragment { initializer, .. }, P::Initializer) => {
                R::Child(*initializer)
            }

            (NodeKind::Javadoc { text }, P::CommentText) => R::Text(*text),
            (NodeKind::Modifier { keyword }, P::Keyword) => R::Keyword(*keyword),

            (NodeKind::MarkerAnnotation { type_name }, P::TypeName) => R::Child(Some(*type_name)),
            (NodeKind::SingleMemberAnnotation { type_name, .. }, P::TypeName) => {
                R::Child(Some(*type_name))
            }
            (NodeKind::SingleMemberAnnotation { value, .. }, P::Value) => R::Child(Some(*value)),
            (NodeKind::NormalAnnotation { type_name, .. }, P::TypeName) => {
                R::Child(Some(*type_name))
            }
            (NodeKind::NormalAnnotation { values, .. }, P::Values) => R::List(values),
            (NodeKind::MemberValuePair { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::MemberValuePair { value, .. }, P::Value) => R::Child(Some(*value)),

            (NodeKind::Block { statements }, P::Statements) => R::List(statements),
            (NodeKind::ExpressionStatement { expression }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::ReturnStatement { expression }, P::Expression) => R::Child(*expression),
            (NodeKind::ThrowStatement { expression }, P::Expression) => R::Child(Some(*expression)),
            (NodeKind::AssertStatement { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::AssertStatement { message, .. }, P::Message) => R::Child(*message),
            (NodeKind::IfStatement { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::IfStatement { then_statement, .. }, P::ThenStatement) => {
                R::Child(Some(*then_statement))
            }
            (NodeKind::IfStatement { else_statement, .. }, P::ElseStatement) => {
                R::Child(*else_statement)
            }
            (NodeKind::WhileStatement { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::WhileStatement { body, .. }, P::Body) => R::Child(Some(*body)),
            (NodeKind::DoStatement { body, .. }, P::Body) => R::Child(Some(*body)),
            (NodeKind::DoStatement { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::ForStatement { initializers, .. }, P::Initializers) => R::List(initializers),
            (NodeKind::ForStatement { expression, .. }, P::Expression) => R::Child(*expression),
            (NodeKind::ForStatement { updaters, .. }, P::Updaters) => R::List(updaters),
            (NodeKind::ForStatement { body, .. }, P::Body) => R::Child(Some(*body)),
            (NodeKind::EnhancedForStatement { parameter, .. }, P::Parameter) => {
                R::Child(Some(*parameter))
            }
            (NodeKind::EnhancedForStatement { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::EnhancedForStatement { body, .. }, P::Body) => R::Child(Some(*body)),
            (NodeKind::SwitchStatement { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::SwitchStatement { statements, .. }, P::Statements) => R::List(statements),
            (NodeKind::SwitchCase { expression }, P::Expression) => R::Child(*expression),
            (NodeKind::BreakStatement { label }, P::Label) => R::Child(*label),
            (NodeKind::ContinueStatement { label }, P::Label) => R::Child(*label),
            (NodeKind::LabeledStatement { label, .. }, P::Label) => R::Child(Some(*label)),
            (NodeKind::LabeledStatement { body, .. }, P::Body) => R::Child(Some(*body)),
            (NodeKind::SynchronizedStatement { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::SynchronizedStatement { body, .. }, P::Body) => R::Child(Some(*body)),
            (NodeKind::TryStatement { resources, .. }, P::Resources) => R::List(resources),
            (NodeKind::TryStatement { body, .. }, P::Body) => R::Child(Some(*body)),
            (NodeKind::TryStatement { catch_clauses, .. }, P::CatchClauses) => {
                R::List(catch_clauses)
            }
            (NodeKind::TryStatement { finally_block, .. }, P::Finally) => R::Child(*finally_block),
            (NodeKind::CatchClause { exception, .. }, P::Exception) => R::Child(Some(*exception)),
            (NodeKind::CatchClause { body, .. }, P::Body) => R::Child(Some(*body)),
            (
                NodeKind::VariableDeclarationStatement { modifiers, .. }
                | NodeKind::VariableDeclarationExpression { modifiers, .. },
                P::Modifiers | P::ModifierList,
            ) => modifiers_ref(modifiers, property)?,
            (
                NodeKind::VariableDeclarationStatement { declared_type, .. }
                | NodeKind::VariableDeclarationExpression { declared_type, .. },
                P::Type,
            ) => R::Child(Some(*declared_type)),
            (
                NodeKind::VariableDeclarationStatement { fragments, .. }
                | NodeKind::VariableDeclarationExpression { fragments, .. },
                P::Fragments,
            ) => R::List(fragments),

            (NodeKind::SimpleName { identifier }, P::Identifier) => R::Text(*identifier),
            (NodeKind::QualifiedName { qualifier, .. }, P::Qualifier) => {
                R::Child(Some(*qualifier))
            }
            (NodeKind::QualifiedName { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::NumberLiteral { token }, P::Token) => R::Text(*token),
            (NodeKind::StringLiteral { escaped }, P::EscapedValue) => R::Text(*escaped),
            (NodeKind::CharacterLiteral { escaped }, P::EscapedValue) => R::Text(*escaped),
            (NodeKind::BooleanLiteral { value }, P::BooleanValue) => R::Flag(*value),
            (NodeKind::ThisExpression { qualifier }, P::Qualifier) => R::Child(*qualifier),
            (NodeKind::Assignment { left, .. }, P::LeftHandSide) => R::Child(Some(*left)),
            (NodeKind::Assignment { operator, .. }, P::Operator) => R::Operator(*operator),
            (NodeKind::Assignment { right, .. }, P::RightHandSide) => R::Child(Some(*right)),
            (NodeKind::InfixExpression { left, .. }, P::LeftOperand) => R::Child(Some(*left)),
            (NodeKind::InfixExpression { operator, .. }, P::Operator) => R::Operator(*operator),
            (NodeKind::InfixExpression { right, .. }, P::RightOperand) => R::Child(Some(*right)),
            (NodeKind::InfixExpression { extended_operands, .. }, P::ExtendedOperands) => {
                R::List(extended_operands)
            }
            (NodeKind::PrefixExpression { operator, .. }, P::Operator) => R::Operator(*operator),
            (NodeKind::PrefixExpression { operand, .. }, P::Operand) => R::Child(Some(*operand)),
            (NodeKind::PostfixExpression { operand, .. }, P::Operand) => R::Child(Some(*operand)),
            (NodeKind::PostfixExpression { operator, .. }, P::Operator) => R::Operator(*operator),
            (NodeKind::MethodInvocation { expression, .. }, P::Expression) => {
                R::Child(*expression)
            }
            (NodeKind::MethodInvocation { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::MethodInvocation { arguments, .. }, P::Arguments) => R::List(arguments),
            (NodeKind::ClassInstanceCreation { expression, .. }, P::Expression) => {
                R::Child(*expression)
            }
            (NodeKind::ClassInstanceCreation { created_type, .. }, P::Type) => {
                R::Child(Some(*created_type))
            }
            (NodeKind::ClassInstanceCreation { arguments, .. }, P::Arguments) => R::List(arguments),
            (NodeKind::FieldAccess { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::FieldAccess { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::ArrayAccess { array, .. }, P::Array) => R::Child(Some(*array)),
            (NodeKind::ArrayAccess { index, .. }, P::Index) => R::Child(Some(*index)),
            (NodeKind::ArrayCreation { array_type, .. }, P::Type) => R::Child(Some(*array_type)),
            (NodeKind::ArrayCreation { dimensions, .. }, P::Dimensions) => R::List(dimensions),
            (NodeKind::ArrayCreation { initializer, .. }, P::Initializer) => R::Child(*initializer),
            (NodeKind::ArrayInitializer { expressions }, P::Expressions) => R::List(expressions),
            (NodeKind::ParenthesizedExpression { expression }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::ConditionalExpression { condition, .. }, P::Expression) => {
                R::Child(Some(*condition))
            }
            (NodeKind::ConditionalExpression { then_expression, .. }, P::ThenExpression) => {
                R::Child(Some(*then_expression))
            }
            (NodeKind::ConditionalExpression { else_expression, .. }, P::ElseExpression) => {
                R::Child(Some(*else_expression))
            }
            (NodeKind::CastExpression { cast_type, .. }, P::Type) => R::Child(Some(*cast_type)),
            (NodeKind::CastExpression { expression, .. }, P::Expression) => {
                R::Child(Some(*expression))
            }
            (NodeKind::InstanceofExpression { left, .. }, P::LeftOperand) => R::Child(Some(*left)),
            (NodeKind::InstanceofExpression { right_type, .. }, P::RightOperand) => {
                R::Child(Some(*right_type))
            }

            (NodeKind::PrimitiveType { kind }, P::PrimitiveTypeCode) => R::Primitive(*kind),
            (NodeKind::SimpleType { name }, P::Name) => R::Child(Some(*name)),
            (NodeKind::ArrayType { element_type, .. }, P::ElementType) => {
                R::Child(Some(*element_type))
            }
            (NodeKind::ArrayType { dimensions, .. }, P::DimensionCount) => R::Number(*dimensions),
            (NodeKind::ParameterizedType { base_type, .. }, P::Type) => R::Child(Some(*base_type)),
            (NodeKind::ParameterizedType { type_arguments, .. }, P::TypeArguments) => {
                R::List(type_arguments)
            }
            (NodeKind::TypeParameter { name, .. }, P::Name) => R::Child(Some(*name)),
            (NodeKind::TypeParameter { bounds, .. }, P::TypeBounds) => R::List(bounds),

            _ => return None,
        })
    }

    /// Child nodes in source order, across all child and list slots.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &property in self.kind(id).properties() {
            match self.property(id, property) {
                Some(PropertyRef::Child(Some(child))) => out.push(child),
                Some(PropertyRef::List(list)) => out.extend_from_slice(list),
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{LanguageLevel, Span};

    fn sample_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let cond = tree.simple_name("flag");
        let then_branch = tree.alloc(NodeKind::EmptyStatement, Span::new(10, 11));
        let stmt = tree.alloc(
            NodeKind::IfStatement {
                expression: cond,
                then_statement: then_branch,
                else_statement: None,
            },
            Span::new(0, 11),
        );
        (tree, stmt)
    }

    #[test]
    fn test_property_read() {
        let (tree, stmt) = sample_tree();
        let Some(PropertyRef::Child(Some(cond))) = tree.property(stmt, Property::Expression)
        else {
            panic!("expected condition child");
        };
        assert!(matches!(
            tree.kind(cond),
            NodeKind::SimpleName { .. }
        ));
        assert_eq!(
            tree.property(stmt, Property::ElseStatement),
            Some(PropertyRef::Child(None))
        );
        assert_eq!(tree.property(stmt, Property::Arguments), None);
    }

    #[test]
    fn test_properties_in_source_order() {
        let (tree, stmt) = sample_tree();
        assert_eq!(
            tree.kind(stmt).properties(),
            &[
                Property::Expression,
                Property::ThenStatement,
                Property::ElseStatement
            ]
        );
    }

    #[test]
    fn test_modifier_representation_switches_slot() {
        let field_flags = NodeKind::FieldDeclaration {
            javadoc: None,
            modifiers: Modifiers::Flags(ModifierFlags::PRIVATE),
            field_type: NodeId::from_raw(0),
            fragments: vec![],
        };
        assert!(field_flags.properties().contains(&Property::Modifiers));
        assert!(!field_flags.properties().contains(&Property::ModifierList));

        let field_nodes = NodeKind::FieldDeclaration {
            javadoc: None,
            modifiers: Modifiers::NONE,
            field_type: NodeId::from_raw(0),
            fragments: vec![],
        };
        assert!(field_nodes.properties().contains(&Property::ModifierList));
    }

    #[test]
    fn test_children_in_source_order() {
        let (tree, stmt) = sample_tree();
        let children = tree.children(stmt);
        assert_eq!(children.len(), 2);
        assert!(matches!(
            tree.kind(children[0]),
            NodeKind::SimpleName { .. }
        ));
        assert!(matches!(tree.kind(children[1]), NodeKind::EmptyStatement));
    }

    #[test]
    fn test_shapes_are_stable() {
        assert_eq!(Property::Expression.shape(), PropertyShape::Child);
        assert_eq!(Property::Statements.shape(), PropertyShape::List);
        assert_eq!(Property::ExtraDimensions.shape(), PropertyShape::Number);
        assert_eq!(Property::Modifiers.shape(), PropertyShape::Flags);
        assert_eq!(Property::Identifier.shape(), PropertyShape::Text);
    }

    #[test]
    fn test_property_value_round_trip() {
        let value = PropertyRef::Flag(true).to_value();
        assert_eq!(value, Some(PropertyValue::Flag(true)));
        assert_eq!(PropertyRef::Child(None).to_value(), None);
        assert_eq!(
            PropertyValue::Child(NodeId::from_raw(4)).as_child(),
            Some(NodeId::from_raw(4))
        );
    }
}
