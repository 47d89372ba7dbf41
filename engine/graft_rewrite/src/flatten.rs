//! The default formatter: an event-aware flattener.
//!
//! Renders a subtree's NEW state to plain Java text. Every property is read
//! through the event store, so changes recorded below the rendered node
//! appear in the output, and placeholder nodes emit markers instead of
//! structure. No line-wrapping policy: statements go one per line at the
//! current indent, expressions render inline.

use graft_ir::{ModifierFlags, NodeId, NodeKind, Operator, Property, PropertyValue};

use crate::format::{
    FormatContext, FormattedText, MarkerData, NodeMarker, RewriteFormatter, RewriteOptions,
};
use crate::placeholder::PlaceholderData;
use crate::stack::ensure_sufficient_stack;

/// Canonical source order for bitmask modifiers.
pub(crate) const FLAG_ORDER: &[ModifierFlags] = &[
    ModifierFlags::PUBLIC,
    ModifierFlags::PROTECTED,
    ModifierFlags::PRIVATE,
    ModifierFlags::STATIC,
    ModifierFlags::ABSTRACT,
    ModifierFlags::FINAL,
    ModifierFlags::SYNCHRONIZED,
    ModifierFlags::VOLATILE,
    ModifierFlags::NATIVE,
    ModifierFlags::STRICTFP,
    ModifierFlags::TRANSIENT,
];

/// Event-aware pretty printer used when no external formatter is supplied.
#[derive(Clone, Debug)]
pub struct Flattener {
    tab_width: u32,
    indent_width: u32,
    use_tabs: bool,
    indent_switch_cases: bool,
    line_delimiter: String,
}

impl Flattener {
    pub fn new(options: &RewriteOptions) -> Self {
        Flattener {
            tab_width: options.tab_width,
            indent_width: options.indent_width,
            use_tabs: options.use_tabs,
            indent_switch_cases: options.indent_switch_cases,
            line_delimiter: options.line_delimiter.clone(),
        }
    }
}

impl RewriteFormatter for Flattener {
    fn format_node(&self, cx: FormatContext<'_>, node: NodeId, indent: u32) -> FormattedText {
        let mut printer = Printer {
            cx,
            f: self,
            out: String::new(),
            markers: Vec::new(),
            indent,
        };
        printer.node(node);
        FormattedText {
            text: printer.out,
            markers: printer.markers,
        }
    }

    fn line_delimiter(&self) -> &str {
        &self.line_delimiter
    }

    fn tab_width(&self) -> u32 {
        self.tab_width
    }

    fn indent_width(&self) -> u32 {
        self.indent_width
    }

    fn use_tabs(&self) -> bool {
        self.use_tabs
    }
}

struct Printer<'a, 'f> {
    cx: FormatContext<'a>,
    f: &'f Flattener,
    out: String,
    markers: Vec<NodeMarker>,
    indent: u32,
}

impl<'a> Printer<'a, '_> {
    /// Render one node: placeholders emit markers, everything else goes
    /// through the construct dispatch. Tracked nodes get a marker wrapping
    /// whatever was emitted, inserted at its preorder position.
    fn node(&mut self, id: NodeId) {
        let cx = self.cx;
        let start = self.out.len() as u32;
        let marker_index = self.markers.len();
        if let Some(data) = cx.placeholders.get(id) {
            match data {
                PlaceholderData::Code(code) => {
                    let len = code.len() as u32;
                    self.out.push_str(code);
                    self.markers.push(NodeMarker {
                        offset: start,
                        len,
                        data: MarkerData::StringPlaceholder(id),
                    });
                }
                PlaceholderData::Copy(_) => {
                    self.markers.push(NodeMarker {
                        offset: start,
                        len: 0,
                        data: MarkerData::CopyPlaceholder(id),
                    });
                }
            }
        } else {
            ensure_sufficient_stack(|| self.render(id));
        }
        if let Some(tracked) = cx.events.tracked(id) {
            let len = self.out.len() as u32 - start;
            self.markers.insert(
                marker_index,
                NodeMarker {
                    offset: start,
                    len,
                    data: MarkerData::Tracked(tracked),
                },
            );
        }
    }

    // === Event-aware property access ===

    fn value(&self, node: NodeId, property: Property) -> Option<PropertyValue> {
        self.cx.events.new_value(self.cx.tree, node, property)
    }

    fn child_id(&self, node: NodeId, property: Property) -> Option<NodeId> {
        self.value(node, property).and_then(|v| v.as_child())
    }

    fn list(&self, node: NodeId, property: Property) -> Vec<NodeId> {
        match self.value(node, property) {
            Some(PropertyValue::List(ids)) => ids,
            _ => Vec::new(),
        }
    }

    fn flag(&self, node: NodeId, property: Property) -> bool {
        self.value(node, property)
            .and_then(|v| v.as_flag())
            .unwrap_or(false)
    }

    fn number(&self, node: NodeId, property: Property) -> u32 {
        self.value(node, property)
            .and_then(|v| v.as_number())
            .unwrap_or(0)
    }

    fn text(&self, node: NodeId, property: Property) -> &'a str {
        match self.value(node, property) {
            Some(PropertyValue::Text(name)) => self.cx.tree.text(name),
            _ => "",
        }
    }

    fn operator(&self, node: NodeId, property: Property) -> &'static str {
        self.value(node, property)
            .and_then(|v| v.as_operator())
            .map_or("", Operator::as_symbol)
    }

    // === Emission helpers ===

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push_str(&self.f.line_delimiter);
    }

    fn newline_indent(&mut self, level: u32) {
        self.out.push_str(&self.f.line_delimiter);
        let indent = self.f.indent_string(level);
        self.out.push_str(&indent);
    }

    fn opt_child(&mut self, node: NodeId, property: Property, prefix: &str, suffix: &str) {
        if let Some(child) = self.child_id(node, property) {
            self.push(prefix);
            self.node(child);
            self.push(suffix);
        }
    }

    fn join(&mut self, items: &[NodeId], separator: &str) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            self.node(item);
        }
    }

    fn javadoc(&mut self, node: NodeId) {
        if let Some(doc) = self.child_id(node, Property::Javadoc) {
            self.node(doc);
            self.newline_indent(self.indent);
        }
    }

    /// Modifiers in source order, each followed by one space.
    fn modifiers(&mut self, node: NodeId) {
        if let Some(PropertyValue::Flags(flags)) = self.value(node, Property::Modifiers) {
            for &flag in FLAG_ORDER {
                if !flags.contains(flag) {
                    continue;
                }
                if let Some(keyword) = flag.keyword_text() {
                    self.push(keyword);
                    self.push(" ");
                }
            }
            return;
        }
        for modifier in self.list(node, Property::ModifierList) {
            self.node(modifier);
            self.push(" ");
        }
    }

    fn block_of(&mut self, statements: &[NodeId]) {
        self.push("{");
        self.indent += 1;
        for &stmt in statements {
            self.newline_indent(self.indent);
            self.node(stmt);
        }
        self.indent -= 1;
        self.newline_indent(self.indent);
        self.push("}");
    }

    fn type_body(&mut self, members: &[NodeId]) {
        self.push(" {");
        self.indent += 1;
        for &member in members {
            self.newline_indent(self.indent);
            self.node(member);
        }
        self.indent -= 1;
        self.newline_indent(self.indent);
        self.push("}");
    }

    // === Construct dispatch ===

    fn render(&mut self, id: NodeId) {
        use Property as P;
        let tree = self.cx.tree;
        match tree.kind(id) {
            NodeKind::CompilationUnit { .. } => {
                if let Some(package) = self.child_id(id, P::Package) {
                    self.node(package);
                    self.newline();
                }
                for import in self.list(id, P::Imports) {
                    self.node(import);
                    self.newline();
                }
                for ty in self.list(id, P::Types) {
                    self.node(ty);
                    self.newline();
                }
            }
            NodeKind::PackageDeclaration { .. } => {
                self.javadoc(id);
                for annotation in self.list(id, P::Annotations) {
                    self.node(annotation);
                    self.push(" ");
                }
                self.push("package ");
                self.opt_child(id, P::Name, "", "");
                self.push(";");
            }
            NodeKind::ImportDeclaration { .. } => {
                self.push("import ");
                if self.flag(id, P::StaticFlag) {
                    self.push("static ");
                }
                self.opt_child(id, P::Name, "", "");
                if self.flag(id, P::OnDemand) {
                    self.push(".*");
                }
                self.push(";");
            }
            NodeKind::TypeDeclaration { .. } => {
                self.javadoc(id);
                self.modifiers(id);
                let is_interface = self.flag(id, P::InterfaceFlag);
                self.push(if is_interface { "interface " } else { "class " });
                self.opt_child(id, P::Name, "", "");
                let type_parameters = self.list(id, P::TypeParameters);
                if !type_parameters.is_empty() {
                    self.push("<");
                    self.join(&type_parameters, ", ");
                    self.push(">");
                }
                self.opt_child(id, P::Superclass, " extends ", "");
                let interfaces = self.list(id, P::SuperInterfaces);
                if !interfaces.is_empty() {
                    self.push(if is_interface {
                        " extends "
                    } else {
                        " implements "
                    });
                    self.join(&interfaces, ", ");
                }
                let members = self.list(id, P::BodyDeclarations);
                self.type_body(&members);
            }
            NodeKind::EnumDeclaration { .. } => {
                self.javadoc(id);
                self.modifiers(id);
                self.push("enum ");
                self.opt_child(id, P::Name, "", "");
                let interfaces = self.list(id, P::SuperInterfaces);
                if !interfaces.is_empty() {
                    self.push(" implements ");
                    self.join(&interfaces, ", ");
                }
                self.push(" {");
                self.indent += 1;
                self.newline_indent(self.indent);
                let constants = self.list(id, P::EnumConstants);
                self.join(&constants, ", ");
                let members = self.list(id, P::BodyDeclarations);
                if !members.is_empty() {
                    self.push(";");
                    for member in members {
                        self.newline_indent(self.indent);
                        self.node(member);
                    }
                }
                self.indent -= 1;
                self.newline_indent(self.indent);
                self.push("}");
            }
            NodeKind::EnumConstantDeclaration { .. } => {
                self.javadoc(id);
                self.modifiers(id);
                self.opt_child(id, P::Name, "", "");
                let arguments = self.list(id, P::Arguments);
                if !arguments.is_empty() {
                    self.push("(");
                    self.join(&arguments, ", ");
                    self.push(")");
                }
            }
            NodeKind::FieldDeclaration { .. } => {
                self.javadoc(id);
                self.modifiers(id);
                self.opt_child(id, P::Type, "", " ");
                let fragments = self.list(id, P::Fragments);
                self.join(&fragments, ", ");
                self.push(";");
            }
            NodeKind::MethodDeclaration { .. } => {
                self.javadoc(id);
                self.modifiers(id);
                let type_parameters = self.list(id, P::TypeParameters);
                if !type_parameters.is_empty() {
                    self.push("<");
                    self.join(&type_parameters, ", ");
                    self.push("> ");
                }
                if !self.flag(id, P::ConstructorFlag) {
                    self.opt_child(id, P::ReturnType, "", " ");
                }
                self.opt_child(id, P::Name, "", "");
                self.push("(");
                let parameters = self.list(id, P::Parameters);
                self.join(&parameters, ", ");
                self.push(")");
                for _ in 0..self.number(id, P::ExtraDimensions) {
                    self.push("[]");
                }
                let thrown = self.list(id, P::Thrown);
                if !thrown.is_empty() {
                    self.push(" throws ");
                    self.join(&thrown, ", ");
                }
                match self.child_id(id, P::Body) {
                    Some(body) => {
                        self.push(" ");
                        self.node(body);
                    }
                    None => self.push(";"),
                }
            }
            NodeKind::Initializer { .. } => {
                self.javadoc(id);
                self.modifiers(id);
                self.opt_child(id, P::Body, "", "");
            }
            NodeKind::SingleVariableDeclaration { .. } => {
                self.modifiers(id);
                self.opt_child(id, P::Type, "", "");
                if self.flag(id, P::VarargsFlag) {
                    self.push("...");
                }
                self.push(" ");
                self.opt_child(id, P::Name, "", "");
                for _ in 0..self.number(id, P::ExtraDimensions) {
                    self.push("[]");
                }
                self.opt_child(id, P::Initializer, " = ", "");
            }
            NodeKind::VariableDeclarationFragment { .. } => {
                self.opt_child(id, P::Name, "", "");
                for _ in 0..self.number(id, P::ExtraDimensions) {
                    self.push("[]");
                }
                self.opt_child(id, P::Initializer, " = ", "");
            }
            NodeKind::Javadoc { .. } => {
                let text = self.text(id, P::CommentText);
                self.push(text);
            }
            NodeKind::Modifier { .. } => {
                if let Some(PropertyValue::Keyword(keyword)) = self.value(id, P::Keyword) {
                    self.push(keyword.as_str());
                }
            }
            NodeKind::MarkerAnnotation { .. } => {
                self.push("@");
                self.opt_child(id, P::TypeName, "", "");
            }
            NodeKind::SingleMemberAnnotation { .. } => {
                self.push("@");
                self.opt_child(id, P::TypeName, "", "");
                self.push("(");
                self.opt_child(id, P::Value, "", "");
                self.push(")");
            }
            NodeKind::NormalAnnotation { .. } => {
                self.push("@");
                self.opt_child(id, P::TypeName, "", "");
                self.push("(");
                let values = self.list(id, P::Values);
                self.join(&values, ", ");
                self.push(")");
            }
            NodeKind::MemberValuePair { .. } => {
                self.opt_child(id, P::Name, "", " = ");
                self.opt_child(id, P::Value, "", "");
            }
            NodeKind::Block { .. } => {
                let statements = self.list(id, P::Statements);
                self.block_of(&statements);
            }
            NodeKind::ExpressionStatement { .. } => {
                self.opt_child(id, P::Expression, "", ";");
            }
            NodeKind::ReturnStatement { .. } => {
                self.push("return");
                self.opt_child(id, P::Expression, " ", "");
                self.push(";");
            }
            NodeKind::ThrowStatement { .. } => {
                self.push("throw ");
                self.opt_child(id, P::Expression, "", "");
                self.push(";");
            }
            NodeKind::AssertStatement { .. } => {
                self.push("assert ");
                self.opt_child(id, P::Expression, "", "");
                self.opt_child(id, P::Message, " : ", "");
                self.push(";");
            }
            NodeKind::IfStatement { .. } => {
                self.push("if (");
                self.opt_child(id, P::Expression, "", "");
                self.push(") ");
                self.opt_child(id, P::ThenStatement, "", "");
                self.opt_child(id, P::ElseStatement, " else ", "");
            }
            NodeKind::WhileStatement { .. } => {
                self.push("while (");
                self.opt_child(id, P::Expression, "", "");
                self.push(") ");
                self.opt_child(id, P::Body, "", "");
            }
            NodeKind::DoStatement { .. } => {
                self.push("do ");
                self.opt_child(id, P::Body, "", "");
                self.push(" while (");
                self.opt_child(id, P::Expression, "", "");
                self.push(");");
            }
            NodeKind::ForStatement { .. } => {
                self.push("for (");
                let initializers = self.list(id, P::Initializers);
                self.join(&initializers, ", ");
                self.push("; ");
                self.opt_child(id, P::Expression, "", "");
                self.push("; ");
                let updaters = self.list(id, P::Updaters);
                self.join(&updaters, ", ");
                self.push(") ");
                self.opt_child(id, P::Body, "", "");
            }
            NodeKind::EnhancedForStatement { .. } => {
                self.push("for (");
                self.opt_child(id, P::Parameter, "", "");
                self.push(" : ");
                self.opt_child(id, P::Expression, "", "");
                self.push(") ");
                self.opt_child(id, P::Body, "", "");
            }
            NodeKind::SwitchStatement { .. } => {
                self.push("switch (");
                self.opt_child(id, P::Expression, "", "");
                self.push(") {");
                let base = self.indent + 1;
                for stmt in self.list(id, P::Statements) {
                    let is_case = matches!(tree.kind(stmt), NodeKind::SwitchCase { .. });
                    let level = if is_case || !self.f.indent_switch_cases {
                        base
                    } else {
                        base + 1
                    };
                    self.newline_indent(level);
                    let saved = self.indent;
                    self.indent = level;
                    self.node(stmt);
                    self.indent = saved;
                }
                self.newline_indent(self.indent);
                self.push("}");
            }
            NodeKind::SwitchCase { .. } => match self.child_id(id, P::Expression) {
                Some(expression) => {
                    self.push("case ");
                    self.node(expression);
                    self.push(":");
                }
                None => self.push("default:"),
            },
            NodeKind::BreakStatement { .. } => {
                self.push("break");
                self.opt_child(id, P::Label, " ", "");
                self.push(";");
            }
            NodeKind::ContinueStatement { .. } => {
                self.push("continue");
                self.opt_child(id, P::Label, " ", "");
                self.push(";");
            }
            NodeKind::LabeledStatement { .. } => {
                self.opt_child(id, P::Label, "", ": ");
                self.opt_child(id, P::Body, "", "");
            }
            NodeKind::SynchronizedStatement { .. } => {
                self.push("synchronized (");
                self.opt_child(id, P::Expression, "", "");
                self.push(") ");
                self.opt_child(id, P::Body, "", "");
            }
            NodeKind::TryStatement { .. } => {
                self.push("try ");
                let resources = self.list(id, P::Resources);
                if !resources.is_empty() {
                    self.push("(");
                    self.join(&resources, "; ");
                    self.push(") ");
                }
                self.opt_child(id, P::Body, "", "");
                for catch in self.list(id, P::CatchClauses) {
                    self.push(" ");
                    self.node(catch);
                }
                self.opt_child(id, P::Finally, " finally ", "");
            }
            NodeKind::CatchClause { .. } => {
                self.push("catch (");
                self.opt_child(id, P::Exception, "", "");
                self.push(") ");
                self.opt_child(id, P::Body, "", "");
            }
            NodeKind::VariableDeclarationStatement { .. } => {
                self.modifiers(id);
                self.opt_child(id, P::Type, "", " ");
                let fragments = self.list(id, P::Fragments);
                self.join(&fragments, ", ");
                self.push(";");
            }
            NodeKind::VariableDeclarationExpression { .. } => {
                self.modifiers(id);
                self.opt_child(id, P::Type, "", " ");
                let fragments = self.list(id, P::Fragments);
                self.join(&fragments, ", ");
            }
            NodeKind::EmptyStatement => self.push(";"),
            NodeKind::SimpleName { .. } => {
                let text = self.text(id, P::Identifier);
                self.push(text);
            }
            NodeKind::QualifiedName { .. } => {
                self.opt_child(id, P::Qualifier, "", ".");
                self.opt_child(id, P::Name, "", "");
            }
            NodeKind::NumberLiteral { .. } => {
                let text = self.text(id, P::Token);
                self.push(text);
            }
            NodeKind::StringLiteral { .. } | NodeKind::CharacterLiteral { .. } => {
                let text = self.text(id, P::EscapedValue);
                self.push(text);
            }
            NodeKind::BooleanLiteral { .. } => {
                self.push(if self.flag(id, P::BooleanValue) {
                    "true"
                } else {
                    "false"
                });
            }
            NodeKind::NullLiteral => self.push("null"),
            NodeKind::ThisExpression { .. } => {
                self.opt_child(id, P::Qualifier, "", ".");
                self.push("this");
            }
            NodeKind::Assignment { .. } => {
                self.opt_child(id, P::LeftHandSide, "", "");
                let op = self.operator(id, P::Operator);
                self.push(" ");
                self.push(op);
                self.push(" ");
                self.opt_child(id, P::RightHandSide, "", "");
            }
            NodeKind::InfixExpression { .. } => {
                self.opt_child(id, P::LeftOperand, "", "");
                let op = self.operator(id, P::Operator);
                self.push(" ");
                self.push(op);
                self.push(" ");
                self.opt_child(id, P::RightOperand, "", "");
                for operand in self.list(id, P::ExtendedOperands) {
                    self.push(" ");
                    self.push(op);
                    self.push(" ");
                    self.node(operand);
                }
            }
            NodeKind::PrefixExpression { .. } => {
                let op = self.operator(id, P::Operator);
                self.push(op);
                self.opt_child(id, P::Operand, "", "");
            }
            NodeKind::PostfixExpression { .. } => {
                self.opt_child(id, P::Operand, "", "");
                let op = self.operator(id, P::Operator);
                self.push(op);
            }
            NodeKind::MethodInvocation { .. } => {
                self.opt_child(id, P::Expression, "", ".");
                self.opt_child(id, P::Name, "", "");
                self.push("(");
                let arguments = self.list(id, P::Arguments);
                self.join(&arguments, ", ");
                self.push(")");
            }
            NodeKind::ClassInstanceCreation { .. } => {
                self.opt_child(id, P::Expression, "", ".");
                self.push("new ");
                self.opt_child(id, P::Type, "", "");
                self.push("(");
                let arguments = self.list(id, P::Arguments);
                self.join(&arguments, ", ");
                self.push(")");
            }
            NodeKind::FieldAccess { .. } => {
                self.opt_child(id, P::Expression, "", ".");
                self.opt_child(id, P::Name, "", "");
            }
            NodeKind::ArrayAccess { .. } => {
                self.opt_child(id, P::Array, "", "");
                self.push("[");
                self.opt_child(id, P::Index, "", "");
                self.push("]");
            }
            NodeKind::ArrayCreation { .. } => {
                self.push("new ");
                let dimensions = self.list(id, P::Dimensions);
                let array_type = self.child_id(id, P::Type);
                match array_type {
                    Some(at)
                        if !self.cx.placeholders.is_placeholder(at)
                            && matches!(tree.kind(at), NodeKind::ArrayType { .. }) =>
                    {
                        self.opt_child(at, P::ElementType, "", "");
                        for &dim in &dimensions {
                            self.push("[");
                            self.node(dim);
                            self.push("]");
                        }
                        let total = self.number(at, P::DimensionCount);
                        for _ in dimensions.len() as u32..total {
                            self.push("[]");
                        }
                    }
                    Some(at) => self.node(at),
                    None => {}
                }
                self.opt_child(id, P::Initializer, " ", "");
            }
            NodeKind::ArrayInitializer { .. } => {
                self.push("{");
                let expressions = self.list(id, P::Expressions);
                self.join(&expressions, ", ");
                self.push("}");
            }
            NodeKind::ParenthesizedExpression { .. } => {
                self.push("(");
                self.opt_child(id, P::Expression, "", "");
                self.push(")");
            }
            NodeKind::ConditionalExpression { .. } => {
                self.opt_child(id, P::Expression, "", "");
                self.opt_child(id, P::ThenExpression, " ? ", "");
                self.opt_child(id, P::ElseExpression, " : ", "");
            }
            NodeKind::CastExpression { .. } => {
                self.push("(");
                self.opt_child(id, P::Type, "", "");
                self.push(") ");
                self.opt_child(id, P::Expression, "", "");
            }
            NodeKind::InstanceofExpression { .. } => {
                self.opt_child(id, P::LeftOperand, "", "");
                self.push(" instanceof ");
                self.opt_child(id, P::RightOperand, "", "");
            }
            NodeKind::PrimitiveType { .. } => {
                if let Some(PropertyValue::Primitive(kind)) = self.value(id, P::PrimitiveTypeCode) {
                    self.push(kind.as_str());
                }
            }
            NodeKind::SimpleType { .. } => {
                self.opt_child(id, P::Name, "", "");
            }
            NodeKind::ArrayType { .. } => {
                self.opt_child(id, P::ElementType, "", "");
                for _ in 0..self.number(id, P::DimensionCount) {
                    self.push("[]");
                }
            }
            NodeKind::ParameterizedType { .. } => {
                self.opt_child(id, P::Type, "", "");
                self.push("<");
                let arguments = self.list(id, P::TypeArguments);
                self.join(&arguments, ", ");
                self.push(">");
            }
            NodeKind::TypeParameter { .. } => {
                self.opt_child(id, P::Name, "", "");
                let bounds = self.list(id, P::TypeBounds);
                if !bounds.is_empty() {
                    self.push(" extends ");
                    self.join(&bounds, " & ");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use graft_ir::{LanguageLevel, ModifierFlags, Modifiers, Span, Tree};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::{NodeRewriteEvent, RewriteEventStore, TrackedId};
    use crate::placeholder::PlaceholderStore;

    fn format(
        tree: &Tree,
        events: &RewriteEventStore,
        placeholders: &PlaceholderStore,
        node: NodeId,
        indent: u32,
    ) -> FormattedText {
        let flattener = Flattener::new(&RewriteOptions::default());
        let cx = FormatContext {
            tree,
            events,
            placeholders,
        };
        flattener.format_node(cx, node, indent)
    }

    fn call_statement(tree: &mut Tree, name: &str) -> NodeId {
        let callee = tree.simple_name(name);
        let call = tree.alloc(
            NodeKind::MethodInvocation {
                expression: None,
                name: callee,
                arguments: vec![],
            },
            Span::DUMMY,
        );
        tree.alloc(
            NodeKind::ExpressionStatement { expression: call },
            Span::DUMMY,
        )
    }

    #[test]
    fn test_statement_rendering() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let stmt = call_statement(&mut tree, "foo");
        let events = RewriteEventStore::new();
        let placeholders = PlaceholderStore::new();
        let out = format(&tree, &events, &placeholders, stmt, 0);
        assert_eq!(out.text, "foo();");
        assert!(out.markers.is_empty());
    }

    #[test]
    fn test_block_indents_statements() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let a = call_statement(&mut tree, "a");
        let b = call_statement(&mut tree, "b");
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![a, b],
            },
            Span::DUMMY,
        );
        let events = RewriteEventStore::new();
        let placeholders = PlaceholderStore::new();
        let out = format(&tree, &events, &placeholders, block, 1);
        assert_eq!(out.text, "{\n        a();\n        b();\n    }");
    }

    #[test]
    fn test_field_declaration_with_flag_modifiers() {
        let mut tree = Tree::new(LanguageLevel::Jls2);
        let name = tree.simple_name("count");
        let fragment = tree.alloc(
            NodeKind::VariableDeclarationFragment {
                name,
                extra_dimensions: 0,
                initializer: None,
            },
            Span::DUMMY,
        );
        let int_type = tree.alloc(
            NodeKind::PrimitiveType {
                kind: graft_ir::PrimitiveKind::Int,
            },
            Span::DUMMY,
        );
        let field = tree.alloc(
            NodeKind::FieldDeclaration {
                javadoc: None,
                modifiers: Modifiers::Flags(ModifierFlags::PRIVATE | ModifierFlags::STATIC),
                field_type: int_type,
                fragments: vec![fragment],
            },
            Span::DUMMY,
        );
        let events = RewriteEventStore::new();
        let placeholders = PlaceholderStore::new();
        let out = format(&tree, &events, &placeholders, field, 0);
        assert_eq!(out.text, "private static int count;");
    }

    #[test]
    fn test_renders_new_state_from_events() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let stmt = call_statement(&mut tree, "foo");
        let Some(call) = tree.property(stmt, Property::Expression).and_then(|r| r.child()) else {
            panic!("expected call child");
        };
        let replacement = tree.simple_name("bar");
        let mut events = RewriteEventStore::new();
        events.set_node_event(
            call,
            Property::Name,
            NodeRewriteEvent::new(
                tree.property(call, Property::Name).and_then(|r| r.to_value()),
                Some(PropertyValue::Child(replacement)),
            ),
        );
        let placeholders = PlaceholderStore::new();
        let out = format(&tree, &events, &placeholders, stmt, 0);
        assert_eq!(out.text, "bar();");
    }

    #[test]
    fn test_method_with_throws_and_no_body() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let name = tree.simple_name("run");
        let void_type = tree.alloc(
            NodeKind::PrimitiveType {
                kind: graft_ir::PrimitiveKind::Void,
            },
            Span::DUMMY,
        );
        let exc_name = tree.simple_name("Exception");
        let exc = tree.alloc(NodeKind::SimpleType { name: exc_name }, Span::DUMMY);
        let method = tree.alloc(
            NodeKind::MethodDeclaration {
                javadoc: None,
                modifiers: Modifiers::NONE,
                type_parameters: vec![],
                is_constructor: false,
                return_type: Some(void_type),
                name,
                parameters: vec![],
                extra_dimensions: 0,
                thrown: vec![exc],
                body: None,
            },
            Span::DUMMY,
        );
        let events = RewriteEventStore::new();
        let placeholders = PlaceholderStore::new();
        let out = format(&tree, &events, &placeholders, method, 0);
        assert_eq!(out.text, "void run() throws Exception;");
    }

    #[test]
    fn test_string_placeholder_marker() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let placeholder_node = tree.alloc(NodeKind::EmptyStatement, Span::DUMMY);
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![placeholder_node],
            },
            Span::DUMMY,
        );
        let events = RewriteEventStore::new();
        let mut placeholders = PlaceholderStore::new();
        placeholders.insert(
            placeholder_node,
            PlaceholderData::Code("x(); // verbatim".to_owned()),
        );
        let out = format(&tree, &events, &placeholders, block, 0);
        assert_eq!(out.text, "{\n    x(); // verbatim\n}");
        assert_eq!(
            out.markers,
            vec![NodeMarker {
                offset: 6,
                len: 16,
                data: MarkerData::StringPlaceholder(placeholder_node),
            }]
        );
    }

    #[test]
    fn test_tracked_marker_wraps_and_keeps_preorder() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let stmt = call_statement(&mut tree, "foo");
        let Some(call) = tree.property(stmt, Property::Expression).and_then(|r| r.child()) else {
            panic!("expected call child");
        };
        let Some(callee) = tree.property(call, Property::Name).and_then(|r| r.child()) else {
            panic!("expected callee name");
        };
        let mut events = RewriteEventStore::new();
        events.set_tracked(call, TrackedId::from_raw(0));
        events.set_tracked(callee, TrackedId::from_raw(1));
        let placeholders = PlaceholderStore::new();
        let out = format(&tree, &events, &placeholders, stmt, 0);
        assert_eq!(out.text, "foo();");
        assert_eq!(
            out.markers,
            vec![
                NodeMarker {
                    offset: 0,
                    len: 5,
                    data: MarkerData::Tracked(TrackedId::from_raw(0)),
                },
                NodeMarker {
                    offset: 0,
                    len: 3,
                    data: MarkerData::Tracked(TrackedId::from_raw(1)),
                },
            ]
        );
    }

    #[test]
    fn test_copy_placeholder_is_zero_length() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let target = tree.alloc(NodeKind::EmptyStatement, Span::DUMMY);
        let tail = call_statement(&mut tree, "tail");
        let block = tree.alloc(
            NodeKind::Block {
                statements: vec![target, tail],
            },
            Span::DUMMY,
        );
        let mut events = RewriteEventStore::new();
        let copy = events.create_copy_source(NodeId::from_raw(0), false);
        let mut placeholders = PlaceholderStore::new();
        placeholders.insert(target, PlaceholderData::Copy(copy));
        let out = format(&tree, &events, &placeholders, block, 0);
        assert_eq!(out.text, "{\n    \n    tail();\n}");
        assert_eq!(
            out.markers,
            vec![NodeMarker {
                offset: 6,
                len: 0,
                data: MarkerData::CopyPlaceholder(target),
            }]
        );
    }

    #[test]
    fn test_if_else_and_switch() {
        let mut tree = Tree::new(LanguageLevel::Jls8);
        let cond = tree.simple_name("flag");
        let then_branch = call_statement(&mut tree, "yes");
        let else_branch = call_statement(&mut tree, "no");
        let if_stmt = tree.alloc(
            NodeKind::IfStatement {
                expression: cond,
                then_statement: then_branch,
                else_statement: Some(else_branch),
            },
            Span::DUMMY,
        );
        let events = RewriteEventStore::new();
        let placeholders = PlaceholderStore::new();
        let out = format(&tree, &events, &placeholders, if_stmt, 0);
        assert_eq!(out.text, "if (flag) yes(); else no();");

        let selector = tree.simple_name("x");
        let one = tree.intern("1");
        let label = tree.alloc(NodeKind::NumberLiteral { token: one }, Span::DUMMY);
        let case = tree.alloc(
            NodeKind::SwitchCase {
                expression: Some(label),
            },
            Span::DUMMY,
        );
        let body = call_statement(&mut tree, "handle");
        let brk = tree.alloc(NodeKind::BreakStatement { label: None }, Span::DUMMY);
        let switch = tree.alloc(
            NodeKind::SwitchStatement {
                expression: selector,
                statements: vec![case, body, brk],
            },
            Span::DUMMY,
        );
        let out = format(&tree, &events, &placeholders, switch, 0);
        assert_eq!(
            out.text,
            "switch (x) {\n    case 1:\n        handle();\n        break;\n}"
        );
    }
}
