//! Class-file disassembler: renders a [`ClassFile`] model to javap-like text.
//!
//! Rendering is a pure, deterministic depth-first walk of the model. The
//! mode bitmask gates which sections appear; the caller supplies the line
//! separator and the indentation unit is two spaces. The renderer assumes a
//! structurally valid model and never fails.

use std::fmt::Write as _;

use bitflags::bitflags;

use crate::descriptor;
use crate::model::{
    invisible_annotations, visible_annotations, AccessFlags, Annotation, AnnotationValue, Attribute,
    ClassFile, ConstantPool, ConstantPoolEntry, ConstantValue, FieldInfo, MethodInfo,
    ModuleAttribute,
};

bitflags! {
    /// Disassembly mode bits, combinable with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DisassemblyMode: u32 {
        /// Headers, attribute tables and compact annotations.
        const DETAILED = 0x0001;
        /// Members with reconstructed headers, nothing else.
        const DEFAULT = 0x0002;
        /// Everything DETAILED shows plus the raw constant pool dump.
        const SYSTEM = 0x0004;
        /// Reduce class names to their simple names.
        const COMPACT = 0x0008;
        /// Pseudo-source output that fabricates bodies so the result looks
        /// like compilable Java.
        const WORKING_COPY = 0x0010;
    }
}

/// Fixed, canonical modifier keyword order per construct position.
const TYPE_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::FINAL, "final"),
];

const INNER_CLASS_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
];

const FIELD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::TRANSIENT, "transient"),
    (AccessFlags::VOLATILE, "volatile"),
    (AccessFlags::ENUM, "enum"),
];

/// Same as [`FIELD_MODIFIERS`] minus the enum bit, which is not a source
/// keyword in field position.
const FIELD_MODIFIERS_WORKING_COPY: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::TRANSIENT, "transient"),
    (AccessFlags::VOLATILE, "volatile"),
];

/// The volatile bit means `bridge` in method position.
const METHOD_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::SYNCHRONIZED, "synchronized"),
    (AccessFlags::NATIVE, "native"),
    (AccessFlags::STRICT, "strictfp"),
    (AccessFlags::BRIDGE, "bridge"),
];

const PARAMETER_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::FINAL, "final"),
    (AccessFlags::MANDATED, "mandated"),
    (AccessFlags::SYNTHETIC, "synthetic"),
];

/// The static-phase bit means `static` in requires position.
const REQUIRES_MODIFIERS: &[(AccessFlags, &str)] = &[
    (AccessFlags::TRANSITIVE, "transitive"),
    (AccessFlags::STATIC_PHASE, "static"),
];

/// Renders class-file models to text for a fixed mode.
#[derive(Debug, Clone)]
pub struct Disassembler {
    mode: DisassemblyMode,
}

impl Disassembler {
    pub fn new(mode: DisassemblyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DisassemblyMode {
        self.mode
    }

    /// Render `class` using the given line separator.
    pub fn disassemble(&self, class: &ClassFile, line_separator: &str) -> String {
        let mut renderer = Renderer {
            mode: self.mode,
            line_separator,
            buf: String::new(),
        };
        renderer.render_class(class);
        renderer.buf
    }
}

struct Renderer<'a> {
    mode: DisassemblyMode,
    line_separator: &'a str,
    buf: String,
}

impl Renderer<'_> {
    fn has(&self, bits: DisassemblyMode) -> bool {
        self.mode.intersects(bits)
    }

    fn compact(&self) -> bool {
        self.has(DisassemblyMode::COMPACT)
    }

    fn working_copy(&self) -> bool {
        self.has(DisassemblyMode::WORKING_COPY)
    }

    fn newline(&mut self, tab: u32) {
        self.buf.push_str(self.line_separator);
        for _ in 0..tab {
            self.buf.push_str("  ");
        }
    }

    /// Append the checklist keywords present in `flags`, in checklist order,
    /// with a trailing space when anything was written.
    fn push_modifiers(&mut self, flags: AccessFlags, checklist: &[(AccessFlags, &str)]) {
        let mut first = true;
        for &(bit, keyword) in checklist {
            if flags.contains(bit) {
                if !first {
                    self.buf.push(' ');
                }
                self.buf.push_str(keyword);
                first = false;
            }
        }
        if !first {
            self.buf.push(' ');
        }
    }

    /// Checklist rendering for the inner-class table: no trailing space, and
    /// package visibility prints as `default`.
    fn push_modifiers_or_default(&mut self, flags: AccessFlags, checklist: &[(AccessFlags, &str)]) {
        let mut first = true;
        for &(bit, keyword) in checklist {
            if flags.contains(bit) {
                if !first {
                    self.buf.push(' ');
                }
                self.buf.push_str(keyword);
                first = false;
            }
        }
        if first {
            self.buf.push_str("default");
        }
    }

    fn render_class(&mut self, class: &ClassFile) {
        let flags = class.access_flags;
        let is_enum = class.is_enum();
        let is_module = class.is_module();
        let dotted = class.class_name.replace('/', ".");

        if self.has(DisassemblyMode::SYSTEM | DisassemblyMode::DETAILED) {
            self.buf.push_str("// ");
            if let Some(source_file) = class.source_file() {
                let _ = write!(self.buf, "Compiled from {source_file} ");
            }
            let super_text = if flags.contains(AccessFlags::SUPER) {
                "super bit"
            } else {
                "no super bit"
            };
            let deprecated_text = if class.is_deprecated() { ", deprecated" } else { "" };
            let _ = write!(
                self.buf,
                "(version {} : {}.{}, {super_text}{deprecated_text})",
                version_string(class.major_version),
                class.major_version,
                class.minor_version,
            );
            self.newline(0);
            if let Some(signature) = class.signature() {
                let _ = write!(self.buf, "// Signature: {signature}");
                self.newline(0);
            }
        }

        let simple_start = dotted.rfind('.').map(|dot| dot + 1);
        if self.working_copy() {
            if let Some(start) = simple_start {
                let _ = write!(self.buf, "package {};", &dotted[..start - 1]);
                self.newline(0);
            }
        }

        if self.has(DisassemblyMode::DETAILED) {
            if let Some(annotations) = invisible_annotations(&class.attributes) {
                self.push_annotation_line(annotations);
                self.newline(0);
            }
            if let Some(annotations) = visible_annotations(&class.attributes) {
                self.push_annotation_line(annotations);
                self.newline(0);
            }
        }

        if is_enum && self.working_copy() {
            self.push_modifiers(flags & AccessFlags::PUBLIC, TYPE_MODIFIERS);
        } else {
            // the inner-class table entry for the class itself carries the
            // source-level modifiers
            let own_entry = class.inner_classes().and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e.inner_class_name.as_deref() == Some(class.class_name.as_str()))
            });
            if let Some(entry) = own_entry {
                let entry_flags = entry.access_flags;
                self.push_modifiers(entry_flags, INNER_CLASS_MODIFIERS);
            } else {
                self.push_modifiers(flags, TYPE_MODIFIERS);
                if class.is_synthetic() {
                    self.buf.push_str("synthetic ");
                }
            }
        }

        let is_interface = class.is_interface();
        if is_enum {
            self.buf.push_str("enum ");
        } else if is_module {
            // rendered below, from the module attribute
        } else if is_interface {
            if class.is_annotation() {
                self.buf.push('@');
            }
            self.buf.push_str("interface ");
        } else if class.is_record() {
            self.buf.push_str("record ");
        } else {
            self.buf.push_str("class ");
        }

        if self.working_copy() {
            self.buf.push_str(&dotted[simple_start.unwrap_or(0)..]);
            if let Some(signature) = class.signature() {
                self.push_type_parameters(signature);
            }
        } else if !is_module {
            self.buf.push_str(&dotted);
        }

        if let Some(superclass) = &class.superclass_name {
            if superclass != "java/lang/Object" && !is_enum {
                self.buf.push_str(" extends ");
                let text = descriptor::display_name(superclass, self.compact());
                self.buf.push_str(&text);
            }
        }

        if !(class.is_annotation() && self.working_copy()) && !class.interface_names.is_empty() {
            self.buf.push_str(if is_interface { " extends " } else { " implements " });
            for (i, interface) in class.interface_names.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                let text = descriptor::display_name(interface, self.compact());
                self.buf.push_str(&text);
            }
        }

        if !is_module {
            self.buf.push_str(" {");
        }
        if self.has(DisassemblyMode::SYSTEM) {
            self.push_constant_pool(&class.constant_pool);
        }
        if is_module {
            if let Some(module) = class.module() {
                if module.flags.contains(AccessFlags::OPEN) {
                    self.buf.push_str("open ");
                }
                let _ = write!(self.buf, "module {} {{", module.name);
                self.push_module(module);
                self.push_module_packages(class);
            }
        }
        self.render_members(class);
        if self.has(DisassemblyMode::SYSTEM | DisassemblyMode::DETAILED) {
            self.push_class_attribute_sections(class);
        }
        self.newline(0);
        self.buf.push('}');
    }

    fn render_members(&mut self, class: &ClassFile) {
        if class.is_enum() && self.working_copy() {
            self.render_enum_members(class);
            return;
        }
        for field in &class.fields {
            if self.working_copy() && field.is_synthetic() {
                continue;
            }
            self.newline(1);
            self.render_field(field);
        }
        for method in &class.methods {
            if self.working_copy() && method.is_synthetic() {
                continue;
            }
            self.newline(1);
            self.render_method(class, method);
        }
    }

    /// Enum pseudo-source: constants first, as constructor calls with
    /// synthesized default arguments, then the remaining members with the
    /// compiler-generated ones filtered out.
    fn render_enum_members(&mut self, class: &ClassFile) {
        let constructor_arguments: Vec<String> = class
            .methods
            .iter()
            .find(|m| m.is_constructor())
            .map(|m| {
                let raw = descriptor::parameter_descriptors(&m.descriptor);
                // drop the implicit (String name, int ordinal) pair
                raw.into_iter().skip(2).collect()
            })
            .unwrap_or_default();

        let constant_count = class
            .fields
            .iter()
            .take_while(|f| f.access_flags.contains(AccessFlags::ENUM))
            .count();
        for (i, field) in class.fields[..constant_count].iter().enumerate() {
            self.newline(1);
            self.render_enum_constant(field, &constructor_arguments, i + 1 == constant_count);
        }

        let mut skipped_values_array = false;
        for field in &class.fields[constant_count..] {
            if !skipped_values_array && (field.name == "$VALUES" || field.name == "ENUM$VALUES") {
                skipped_values_array = true;
                continue;
            }
            if field.is_synthetic() {
                continue;
            }
            self.newline(1);
            self.render_field(field);
        }

        let values_descriptor = format!("()[L{};", class.class_name);
        let value_of_descriptor = format!("(Ljava/lang/String;)L{};", class.class_name);
        for method in &class.methods {
            if method.name == "values" && method.descriptor == values_descriptor {
                continue;
            }
            if method.name == "valueOf" && method.descriptor == value_of_descriptor {
                continue;
            }
            if method.is_clinit() || method.is_synthetic() {
                continue;
            }
            self.newline(1);
            if method.is_constructor() {
                self.render_enum_constructor(class, method);
            } else {
                self.render_method(class, method);
            }
        }
    }

    fn render_enum_constant(&mut self, field: &FieldInfo, argument_types: &[String], last: bool) {
        self.newline(1);
        if let Some(annotations) = invisible_annotations(&field.attributes) {
            self.push_annotation_line(annotations);
            self.newline(1);
        }
        if let Some(annotations) = visible_annotations(&field.attributes) {
            self.push_annotation_line(annotations);
            self.newline(1);
        }
        self.buf.push_str(&field.name);
        self.buf.push('(');
        for (i, raw) in argument_types.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            self.buf.push_str(default_value(raw));
        }
        self.buf.push(')');
        self.buf.push(if last { ';' } else { ',' });
    }

    /// The enum constructor renders without its two implicit parameters.
    fn render_enum_constructor(&mut self, class: &ClassFile, method: &MethodInfo) {
        self.newline(1);
        self.push_modifiers(method.access_flags & AccessFlags::PRIVATE, METHOD_MODIFIERS);
        let raw_parameters: Vec<String> = descriptor::parameter_descriptors(&method.descriptor)
            .into_iter()
            .skip(2)
            .collect();
        let types: Vec<String> = raw_parameters
            .iter()
            .map(|raw| descriptor::field_type(raw, self.compact()))
            .collect();
        let names: Vec<String> = (0..types.len()).map(|i| format!("arg{i}")).collect();
        let simple = descriptor::display_name(&class.class_name, true);
        self.buf.push_str(&simple);
        self.push_parameter_list(&types, &names, false);
        self.push_throws(method);
        if method
            .access_flags
            .intersects(AccessFlags::NATIVE | AccessFlags::ABSTRACT)
        {
            self.buf.push(';');
        } else {
            self.push_fabricated_body(descriptor::return_descriptor(&method.descriptor));
        }
    }

    fn render_field(&mut self, field: &FieldInfo) {
        self.newline(1);
        if self.has(DisassemblyMode::SYSTEM | DisassemblyMode::DETAILED) {
            let _ = write!(self.buf, "// Field descriptor: {}", field.descriptor);
            if field.is_deprecated() {
                self.buf.push_str(" (deprecated)");
            }
            self.newline(1);
            if let Some(signature) = field.signature() {
                let _ = write!(self.buf, "// Signature: {signature}");
                self.newline(1);
            }
        }
        if self.has(DisassemblyMode::DETAILED) {
            if let Some(annotations) = invisible_annotations(&field.attributes) {
                self.push_annotation_line(annotations);
                self.newline(1);
            }
            if let Some(annotations) = visible_annotations(&field.attributes) {
                self.push_annotation_line(annotations);
                self.newline(1);
            }
        }
        if self.working_copy() {
            self.push_modifiers(field.access_flags, FIELD_MODIFIERS_WORKING_COPY);
            let source = field.signature().unwrap_or(&field.descriptor);
            let text = descriptor::field_type(source, self.compact());
            self.buf.push_str(&text);
        } else {
            self.push_modifiers(field.access_flags, FIELD_MODIFIERS);
            if field.is_synthetic() {
                self.buf.push_str("synthetic ");
            }
            let text = descriptor::field_type(&field.descriptor, self.compact());
            self.buf.push_str(&text);
        }
        self.buf.push(' ');
        self.buf.push_str(&field.name);
        if let Some(value) = field.constant_value() {
            self.buf.push_str(" = ");
            self.push_constant_value(value, &field.descriptor);
        }
        self.buf.push(';');
        if self.has(DisassemblyMode::SYSTEM) {
            self.push_other_attribute_headers(&field.attributes, 1);
            self.push_annotation_attributes_long(&field.attributes, 1);
        }
    }

    fn push_constant_value(&mut self, value: &ConstantValue, field_descriptor: &str) {
        match value {
            ConstantValue::Long(v) => {
                let _ = write!(self.buf, "{v}L");
            }
            ConstantValue::Float(v) => {
                let _ = write!(self.buf, "{}f", format_float(*v));
            }
            ConstantValue::Double(v) => {
                if self.working_copy() && v.is_infinite() {
                    self.buf
                        .push_str(if *v > 0.0 { "1.0 / 0.0" } else { "-1.0 / 0.0" });
                } else {
                    self.buf.push_str(&format_double(*v));
                }
            }
            ConstantValue::Integer(v) => match field_descriptor.chars().next() {
                Some('C') => {
                    self.buf.push('\'');
                    let c = u32::try_from(*v)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    push_escaped_char(&mut self.buf, c, false);
                    self.buf.push('\'');
                }
                Some('Z') => {
                    self.buf.push_str(if *v == 1 { "true" } else { "false" });
                }
                _ => {
                    let _ = write!(self.buf, "{v}");
                }
            },
            ConstantValue::String(s) => {
                self.buf.push('"');
                push_escaped_str(&mut self.buf, s);
                self.buf.push('"');
            }
        }
    }

    fn render_method(&mut self, class: &ClassFile, method: &MethodInfo) {
        self.newline(1);
        if self.has(DisassemblyMode::SYSTEM | DisassemblyMode::DETAILED) {
            let _ = write!(self.buf, "// Method descriptor: {}", method.descriptor);
            if method.is_deprecated() {
                self.buf.push_str(" (deprecated)");
            }
            self.newline(1);
            if let Some(signature) = method.signature() {
                let _ = write!(self.buf, "// Signature: {signature}");
                self.newline(1);
            }
            if let Some(code) = method.code() {
                let _ = write!(self.buf, "// Stack: {}, Locals: {}", code.max_stack, code.max_locals);
                self.newline(1);
            }
        }
        if self.has(DisassemblyMode::DETAILED) {
            if let Some(annotations) = invisible_annotations(&method.attributes) {
                self.push_annotation_line(annotations);
                self.newline(1);
            }
            if let Some(annotations) = visible_annotations(&method.attributes) {
                self.push_annotation_line(annotations);
                self.newline(1);
            }
        }
        self.push_modifiers(method.access_flags, METHOD_MODIFIERS);
        if method.is_synthetic() && !self.working_copy() {
            self.buf.push_str("synthetic ");
        }

        if method.is_clinit() {
            self.buf.push_str("{}");
            if !self.working_copy() {
                self.buf.push(';');
            }
            return;
        }

        let use_signature = self.working_copy() && method.signature().is_some();
        let header_source = if use_signature {
            // working copy reconstructs the generic header
            method.signature().unwrap_or(&method.descriptor)
        } else {
            &method.descriptor
        };
        if use_signature {
            let parameters = descriptor::signature_type_parameters(header_source, self.compact());
            if !parameters.is_empty() {
                self.push_type_parameters(header_source);
                self.buf.push(' ');
            }
        }
        let decoded = descriptor::method_descriptor(header_source, self.compact());
        let raw_parameters = descriptor::parameter_descriptors(&method.descriptor);
        let names = parameter_names(method, &raw_parameters);
        if method.is_constructor() {
            let simple = descriptor::display_name(&class.class_name, true);
            self.buf.push_str(&simple);
        } else {
            self.buf.push_str(&decoded.return_type);
            self.buf.push(' ');
            self.buf.push_str(&method.name);
        }
        let varargs = method.access_flags.contains(AccessFlags::VARARGS);
        self.push_parameter_list(&decoded.parameters, &names, varargs);
        self.push_throws(method);

        if self.has(DisassemblyMode::DETAILED) || self.working_copy() {
            if let Some(default) = method.annotation_default() {
                self.buf.push_str(" default ");
                self.push_annotation_value(default);
            }
        }

        if self.working_copy() {
            if method
                .access_flags
                .intersects(AccessFlags::NATIVE | AccessFlags::ABSTRACT)
            {
                self.buf.push(';');
            } else {
                self.push_fabricated_body(descriptor::return_descriptor(&method.descriptor));
            }
        } else {
            self.buf.push(';');
        }

        if self.has(DisassemblyMode::SYSTEM | DisassemblyMode::DETAILED) {
            if let Some(code) = method.code() {
                if !code.local_variable_table.is_empty() {
                    self.newline(2);
                    self.buf.push_str("Local variable table:");
                    for entry in &code.local_variable_table {
                        self.newline(3);
                        let text = descriptor::field_type(&entry.descriptor, self.compact());
                        let _ = write!(self.buf, "[slot {}] {}: {}", entry.slot, entry.name, text);
                    }
                }
            }
            if let Some(parameters) = method.method_parameters() {
                self.newline(2);
                self.buf.push_str("Method parameters:");
                for (i, parameter) in parameters.iter().enumerate() {
                    self.newline(3);
                    self.push_modifiers(parameter.access_flags, PARAMETER_MODIFIERS);
                    match &parameter.name {
                        Some(name) => self.buf.push_str(name),
                        None => {
                            let _ = write!(self.buf, "arg{i}");
                        }
                    }
                }
            }
        }
        if self.has(DisassemblyMode::SYSTEM) {
            self.push_other_attribute_headers(&method.attributes, 1);
            self.push_annotation_attributes_long(&method.attributes, 1);
        }
    }

    fn push_parameter_list(&mut self, types: &[String], names: &[String], varargs: bool) {
        self.buf.push('(');
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            if varargs && i + 1 == types.len() && ty.ends_with("[]") {
                self.buf.push_str(&ty[..ty.len() - 2]);
                self.buf.push_str("...");
            } else {
                self.buf.push_str(ty);
            }
            self.buf.push(' ');
            match names.get(i) {
                Some(name) => self.buf.push_str(name),
                None => {
                    let _ = write!(self.buf, "arg{i}");
                }
            }
        }
        self.buf.push(')');
    }

    fn push_throws(&mut self, method: &MethodInfo) {
        if let Some(exceptions) = method.exceptions() {
            if exceptions.is_empty() {
                return;
            }
            self.buf.push_str(" throws ");
            for (i, exception) in exceptions.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                let text = descriptor::display_name(exception, self.compact());
                self.buf.push_str(&text);
            }
        }
    }

    /// Fabricate a javac-acceptable body for working-copy output.
    fn push_fabricated_body(&mut self, return_descriptor: &str) {
        self.buf.push_str(" {");
        match return_descriptor {
            "V" => self.newline(1),
            "B" | "C" | "D" | "F" | "I" | "J" | "S" => {
                self.newline(2);
                self.buf.push_str("return 0;");
                self.newline(1);
            }
            "Z" => {
                self.newline(2);
                self.buf.push_str("return false;");
                self.newline(1);
            }
            _ => {
                self.newline(2);
                self.buf.push_str("return null;");
                self.newline(1);
            }
        }
        self.buf.push('}');
    }

    fn push_type_parameters(&mut self, signature: &str) {
        let parameters = descriptor::signature_type_parameters(signature, self.compact());
        if parameters.is_empty() {
            return;
        }
        self.buf.push('<');
        for (i, parameter) in parameters.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            self.buf.push_str(&parameter.name);
            if !parameter.bounds.is_empty() {
                self.buf.push_str(" extends ");
                for (j, bound) in parameter.bounds.iter().enumerate() {
                    if j > 0 {
                        self.buf.push_str(" & ");
                    }
                    self.buf.push_str(bound);
                }
            }
        }
        self.buf.push('>');
    }

    fn push_annotation_line(&mut self, annotations: &[Annotation]) {
        for (i, annotation) in annotations.iter().enumerate() {
            if i > 0 {
                self.buf.push(' ');
            }
            self.push_annotation(annotation);
        }
    }

    fn push_annotation(&mut self, annotation: &Annotation) {
        self.buf.push('@');
        let name = descriptor::field_type(&annotation.type_name, self.compact());
        self.buf.push_str(&name);
        if annotation.components.is_empty() {
            return;
        }
        self.buf.push('(');
        for (i, (name, value)) in annotation.components.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            self.buf.push_str(name);
            self.buf.push('=');
            self.push_annotation_value(value);
        }
        self.buf.push(')');
    }

    fn push_annotation_value(&mut self, value: &AnnotationValue) {
        match value {
            AnnotationValue::Byte(v) | AnnotationValue::Short(v) | AnnotationValue::Int(v) => {
                let _ = write!(self.buf, "{v}");
            }
            AnnotationValue::Char(c) => {
                self.buf.push('\'');
                push_escaped_char(&mut self.buf, *c, false);
                self.buf.push('\'');
            }
            AnnotationValue::Long(v) => {
                let _ = write!(self.buf, "{v}L");
            }
            AnnotationValue::Float(v) => {
                let _ = write!(self.buf, "{}f", format_float(*v));
            }
            AnnotationValue::Double(v) => {
                let text = format_double(*v);
                self.buf.push_str(&text);
            }
            AnnotationValue::Boolean(v) => {
                self.buf.push_str(if *v { "true" } else { "false" });
            }
            AnnotationValue::String(s) => {
                self.buf.push('"');
                push_escaped_str(&mut self.buf, s);
                self.buf.push('"');
            }
            AnnotationValue::Enum {
                type_name,
                constant_name,
            } => {
                let name = descriptor::field_type(type_name, self.compact());
                let _ = write!(self.buf, "{name}.{constant_name}");
            }
            AnnotationValue::Class(type_name) => {
                let name = descriptor::field_type(type_name, self.compact());
                let _ = write!(self.buf, "{name}.class");
            }
            AnnotationValue::Annotation(annotation) => {
                self.push_annotation(annotation);
            }
            AnnotationValue::Array(values) => {
                self.buf.push('{');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.buf.push_str(", ");
                    }
                    self.push_annotation_value(value);
                }
                self.buf.push('}');
            }
        }
    }

    /// SYSTEM long form: one attribute header plus one annotation per line.
    fn push_annotation_attributes_long(&mut self, attributes: &[Attribute], tab: u32) {
        if let Some(annotations) = visible_annotations(attributes) {
            self.newline(tab + 1);
            self.buf.push_str("RuntimeVisibleAnnotations:");
            for annotation in annotations {
                self.newline(tab + 2);
                self.push_annotation(annotation);
            }
        }
        if let Some(annotations) = invisible_annotations(attributes) {
            self.newline(tab + 1);
            self.buf.push_str("RuntimeInvisibleAnnotations:");
            for annotation in annotations {
                self.newline(tab + 2);
                self.push_annotation(annotation);
            }
        }
    }

    fn push_other_attribute_headers(&mut self, attributes: &[Attribute], tab: u32) {
        for attribute in attributes {
            if let Attribute::Other { name, length } = attribute {
                self.newline(tab + 1);
                let _ = write!(self.buf, "Attribute: {name} Length: {length}");
            }
        }
    }

    fn push_constant_pool(&mut self, pool: &ConstantPool) {
        if pool.is_empty() {
            return;
        }
        self.newline(1);
        self.buf.push_str("Constant pool:");
        for (index, entry) in pool.indexed() {
            self.newline(2);
            let _ = write!(self.buf, "{index}. ");
            self.push_constant_pool_entry(entry);
        }
    }

    fn push_constant_pool_entry(&mut self, entry: &ConstantPoolEntry) {
        match entry {
            ConstantPoolEntry::Utf8(s) => {
                self.buf.push_str("Utf8: \"");
                push_escaped_str(&mut self.buf, s);
                self.buf.push('"');
            }
            ConstantPoolEntry::Integer(v) => {
                let _ = write!(self.buf, "Integer: {v}");
            }
            ConstantPoolEntry::Float(v) => {
                let _ = write!(self.buf, "Float: {}f", format_float(*v));
            }
            ConstantPoolEntry::Long(v) => {
                let _ = write!(self.buf, "Long: {v}L");
            }
            ConstantPoolEntry::Double(v) => {
                let _ = write!(self.buf, "Double: {}", format_double(*v));
            }
            ConstantPoolEntry::Class(name) => {
                let _ = write!(self.buf, "Class: {name}");
            }
            ConstantPoolEntry::String(s) => {
                self.buf.push_str("String: \"");
                push_escaped_str(&mut self.buf, s);
                self.buf.push('"');
            }
            ConstantPoolEntry::FieldRef {
                class_name,
                name,
                descriptor,
            } => {
                let _ = write!(self.buf, "Fieldref: {class_name}.{name} {descriptor}");
            }
            ConstantPoolEntry::MethodRef {
                class_name,
                name,
                descriptor,
            } => {
                let _ = write!(self.buf, "Methodref: {class_name}.{name} {descriptor}");
            }
            ConstantPoolEntry::InterfaceMethodRef {
                class_name,
                name,
                descriptor,
            } => {
                let _ = write!(self.buf, "InterfaceMethodref: {class_name}.{name} {descriptor}");
            }
            ConstantPoolEntry::NameAndType { name, descriptor } => {
                let _ = write!(self.buf, "NameAndType: {name} {descriptor}");
            }
            ConstantPoolEntry::MethodHandle {
                reference_kind,
                description,
            } => {
                let _ = write!(self.buf, "MethodHandle: kind {reference_kind} {description}");
            }
            ConstantPoolEntry::MethodType(descriptor) => {
                let _ = write!(self.buf, "MethodType: {descriptor}");
            }
            ConstantPoolEntry::Dynamic {
                bootstrap_method_index,
                name,
                descriptor,
            } => {
                let _ = write!(
                    self.buf,
                    "Dynamic: bootstrap #{bootstrap_method_index} {name} {descriptor}"
                );
            }
            ConstantPoolEntry::InvokeDynamic {
                bootstrap_method_index,
                name,
                descriptor,
            } => {
                let _ = write!(
                    self.buf,
                    "InvokeDynamic: bootstrap #{bootstrap_method_index} {name} {descriptor}"
                );
            }
            ConstantPoolEntry::Module(name) => {
                let _ = write!(self.buf, "Module: {name}");
            }
            ConstantPoolEntry::Package(name) => {
                let _ = write!(self.buf, "Package: {name}");
            }
            ConstantPoolEntry::Unusable => {
                self.buf.push_str("(unusable)");
            }
        }
    }

    fn push_module(&mut self, module: &ModuleAttribute) {
        self.newline(1);
        match &module.version {
            Some(version) => {
                let _ = write!(self.buf, "// Version: {version}");
            }
            None => self.buf.push_str("// Version: none"),
        }
        for requires in &module.requires {
            self.newline(1);
            self.buf.push_str("requires ");
            self.push_modifiers(requires.flags, REQUIRES_MODIFIERS);
            let name = module_name(&requires.name);
            self.buf.push_str(&name);
            self.buf.push(';');
        }
        for exports in &module.exports {
            self.newline(1);
            let _ = write!(self.buf, "exports {}", module_name(&exports.package));
            self.push_visibility_targets(&exports.to);
            self.buf.push(';');
        }
        for opens in &module.opens {
            self.newline(1);
            let _ = write!(self.buf, "opens {}", module_name(&opens.package));
            self.push_visibility_targets(&opens.to);
            self.buf.push(';');
        }
        for uses in &module.uses {
            self.newline(1);
            let _ = write!(self.buf, "uses {};", module_name(uses));
        }
        for provides in &module.provides {
            self.newline(1);
            let _ = write!(self.buf, "provides {}", module_name(&provides.service));
            if !provides.with.is_empty() {
                self.buf.push_str(" with ");
                for (i, implementation) in provides.with.iter().enumerate() {
                    if i > 0 {
                        self.buf.push_str(", ");
                    }
                    let name = module_name(implementation);
                    self.buf.push_str(&name);
                }
            }
            self.buf.push(';');
        }
    }

    fn push_visibility_targets(&mut self, to: &[String]) {
        if to.is_empty() {
            return;
        }
        self.buf.push_str(" to ");
        for (i, target) in to.iter().enumerate() {
            if i > 0 {
                self.buf.push_str(", ");
            }
            let name = module_name(target);
            self.buf.push_str(&name);
        }
    }

    fn push_module_packages(&mut self, class: &ClassFile) {
        for attribute in &class.attributes {
            match attribute {
                Attribute::ModulePackages(packages) => {
                    self.newline(1);
                    self.buf.push_str("// Module packages:");
                    for package in packages {
                        self.newline(2);
                        let name = module_name(package);
                        self.buf.push_str(&name);
                    }
                }
                Attribute::ModuleMainClass(name) => {
                    self.newline(1);
                    let _ = write!(self.buf, "// Main class: {}", module_name(name));
                }
                _ => {}
            }
        }
    }

    fn push_class_attribute_sections(&mut self, class: &ClassFile) {
        if let Some(entries) = class.inner_classes() {
            self.newline(1);
            self.buf.push_str("Inner classes:");
            for entry in entries {
                self.newline(2);
                self.buf.push_str("[inner class info: ");
                match &entry.inner_class_name {
                    Some(name) => {
                        let text = name.replace('/', ".");
                        self.buf.push_str(&text);
                    }
                    None => self.buf.push_str("<not a member>"),
                }
                self.buf.push_str(", outer class info: ");
                match &entry.outer_class_name {
                    Some(name) => {
                        let text = name.replace('/', ".");
                        self.buf.push_str(&text);
                    }
                    None => self.buf.push_str("<not a member>"),
                }
                self.buf.push_str("], inner name: ");
                match &entry.inner_name {
                    Some(name) => self.buf.push_str(name),
                    None => self.buf.push_str("<anonymous>"),
                }
                self.buf.push_str(", accessflags: ");
                self.push_modifiers_or_default(entry.access_flags, INNER_CLASS_MODIFIERS);
            }
        }
        for attribute in &class.attributes {
            match attribute {
                Attribute::EnclosingMethod { class_name, method } => {
                    self.newline(1);
                    let text = class_name.replace('/', ".");
                    let _ = write!(self.buf, "Enclosing method: {text}");
                    if let Some((name, descriptor)) = method {
                        let _ = write!(self.buf, ".{name}{descriptor}");
                    }
                }
                Attribute::NestHost(name) => {
                    self.newline(1);
                    let text = name.replace('/', ".");
                    let _ = write!(self.buf, "Nest host: {text}");
                }
                Attribute::NestMembers(members) => {
                    self.newline(1);
                    self.buf.push_str("Nest members:");
                    for member in members {
                        self.newline(2);
                        let text = member.replace('/', ".");
                        self.buf.push_str(&text);
                    }
                }
                Attribute::Record(components) => {
                    self.newline(1);
                    self.buf.push_str("Record components:");
                    for component in components {
                        self.newline(2);
                        let text = descriptor::field_type(&component.descriptor, self.compact());
                        let _ = write!(self.buf, "{text} {};", component.name);
                    }
                }
                Attribute::PermittedSubclasses(names) => {
                    self.newline(1);
                    self.buf.push_str("Permitted subclasses:");
                    for name in names {
                        self.newline(2);
                        let text = name.replace('/', ".");
                        self.buf.push_str(&text);
                    }
                }
                _ => {}
            }
        }
        self.push_other_attribute_headers(&class.attributes, 0);
        if self.has(DisassemblyMode::SYSTEM) {
            self.push_annotation_attributes_long(&class.attributes, 0);
        }
    }
}

/// Parameter names: MethodParameters attribute first, then the local
/// variable table (accounting for slot doubling of long/double), then
/// fabricated `arg<n>` names.
fn parameter_names(method: &MethodInfo, raw_parameters: &[String]) -> Vec<String> {
    if method.is_clinit() {
        return Vec::new();
    }
    let count = raw_parameters.len();
    if let Some(parameters) = method.method_parameters() {
        return (0..count)
            .map(|i| {
                parameters
                    .get(i)
                    .and_then(|p| p.name.clone())
                    .unwrap_or_else(|| format!("arg{i}"))
            })
            .collect();
    }
    if let Some(code) = method.code() {
        if !code.local_variable_table.is_empty() {
            let mut slot: u16 = if method.access_flags.contains(AccessFlags::STATIC) {
                0
            } else {
                1
            };
            return raw_parameters
                .iter()
                .enumerate()
                .map(|(i, raw)| {
                    let entry = code.local_variable_table.iter().find(|e| e.slot == slot);
                    slot += descriptor::slot_width(raw);
                    entry.map_or_else(|| format!("arg{i}"), |e| e.name.clone())
                })
                .collect();
        }
    }
    (0..count).map(|i| format!("arg{i}")).collect()
}

/// Default value text for a synthesized enum constructor argument.
fn default_value(raw_descriptor: &str) -> &'static str {
    match raw_descriptor {
        "B" | "I" | "J" | "D" | "F" | "S" => "0",
        "Z" => "false",
        "C" => "' '",
        _ => "null",
    }
}

fn version_string(major: u16) -> String {
    match major {
        45 => "1.1".to_owned(),
        46 => "1.2".to_owned(),
        47 => "1.3".to_owned(),
        48 => "1.4".to_owned(),
        49 => "1.5".to_owned(),
        50 => "1.6".to_owned(),
        51 => "1.7".to_owned(),
        52 => "1.8".to_owned(),
        m if m > 52 => (m - 44).to_string(),
        _ => "unknown".to_owned(),
    }
}

fn format_float(v: f32) -> String {
    if v.is_nan() {
        return "NaN".to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    format!("{v:?}")
}

fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    format!("{v:?}")
}

fn module_name(name: &str) -> String {
    name.replace(['/', '$'], ".")
}

fn push_escaped_str(buf: &mut String, s: &str) {
    for c in s.chars() {
        push_escaped_char(buf, c, true);
    }
}

fn push_escaped_char(buf: &mut String, c: char, in_string: bool) {
    match c {
        '\u{8}' => buf.push_str("\\b"),
        '\t' => buf.push_str("\\t"),
        '\n' => buf.push_str("\\n"),
        '\u{c}' => buf.push_str("\\f"),
        '\r' => buf.push_str("\\r"),
        '"' if in_string => buf.push_str("\\\""),
        '\'' if !in_string => buf.push_str("\\'"),
        '\\' => buf.push_str("\\\\"),
        c if (c as u32) < 0x20 => {
            let _ = write!(buf, "\\u{:04x}", c as u32);
        }
        c => buf.push(c),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{CodeAttribute, LocalVariable, MethodParameter, ModuleRequires, PackageVisibility};

    fn class(name: &str) -> ClassFile {
        ClassFile {
            minor_version: 0,
            major_version: 52,
            access_flags: AccessFlags::PUBLIC | AccessFlags::SUPER,
            class_name: name.to_owned(),
            superclass_name: Some("java/lang/Object".to_owned()),
            interface_names: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            constant_pool: ConstantPool::default(),
        }
    }

    fn field(name: &str, descriptor: &str, flags: AccessFlags) -> FieldInfo {
        FieldInfo {
            access_flags: flags,
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            attributes: Vec::new(),
        }
    }

    fn method(name: &str, descriptor: &str, flags: AccessFlags) -> MethodInfo {
        MethodInfo {
            access_flags: flags,
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            attributes: Vec::new(),
        }
    }

    fn render(class: &ClassFile, mode: DisassemblyMode) -> String {
        Disassembler::new(mode).disassemble(class, "\n")
    }

    #[test]
    fn test_default_mode_renders_bare_class() {
        let output = render(&class("com/example/Foo"), DisassemblyMode::DEFAULT);
        assert_eq!(output, "public class com.example.Foo {\n}");
    }

    #[test]
    fn test_compact_mode_reduces_heritage_names_only() {
        let mut subject = class("com/example/Foo");
        subject.superclass_name = Some("com/example/Base".to_owned());
        subject.interface_names = vec!["com/example/Marker".to_owned()];
        let output = render(&subject, DisassemblyMode::DEFAULT | DisassemblyMode::COMPACT);
        assert_eq!(
            output,
            "public class com.example.Foo extends Base implements Marker {\n}"
        );
    }

    #[test]
    fn test_working_copy_prints_package_and_simple_name() {
        let output = render(&class("com/example/Foo"), DisassemblyMode::WORKING_COPY);
        assert_eq!(output, "package com.example;\npublic class Foo {\n}");
    }

    #[test]
    fn test_interface_heritage_uses_extends() {
        let mut subject = class("com/example/Foo");
        subject.access_flags = AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT;
        subject.interface_names = vec!["java/lang/Runnable".to_owned()];
        let output = render(&subject, DisassemblyMode::DEFAULT);
        assert_eq!(
            output,
            "public abstract interface com.example.Foo extends java.lang.Runnable {\n}"
        );
    }

    #[test]
    fn test_inner_class_entry_overrides_type_modifiers() {
        let mut subject = class("com/example/Outer$Inner");
        subject.attributes.push(Attribute::InnerClasses(vec![crate::model::InnerClass {
            inner_class_name: Some("com/example/Outer$Inner".to_owned()),
            outer_class_name: Some("com/example/Outer".to_owned()),
            inner_name: Some("Inner".to_owned()),
            access_flags: AccessFlags::PROTECTED | AccessFlags::STATIC,
        }]));
        let output = render(&subject, DisassemblyMode::DEFAULT);
        assert!(output.starts_with("protected static class com.example.Outer$Inner"));
    }

    #[test]
    fn test_field_constant_value_formatting() {
        let constant = AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL;
        let mut subject = class("Foo");
        let mut x = field("X", "J", constant);
        x.attributes.push(Attribute::ConstantValue(ConstantValue::Long(9)));
        let mut c = field("C", "C", constant);
        c.attributes.push(Attribute::ConstantValue(ConstantValue::Integer(65)));
        let mut b = field("B", "Z", constant);
        b.attributes.push(Attribute::ConstantValue(ConstantValue::Integer(1)));
        let mut s = field("S", "Ljava/lang/String;", constant);
        s.attributes
            .push(Attribute::ConstantValue(ConstantValue::String("a\nb".to_owned())));
        subject.fields = vec![x, c, b, s];
        let output = render(&subject, DisassemblyMode::DEFAULT);
        assert_eq!(
            output,
            "public class Foo {\
             \n  \n  public static final long X = 9L;\
             \n  \n  public static final char C = 'A';\
             \n  \n  public static final boolean B = true;\
             \n  \n  public static final java.lang.String S = \"a\\nb\";\n}"
        );
    }

    #[test]
    fn test_method_header_fabricates_parameter_names() {
        let mut subject = class("Foo");
        subject.methods.push(method(
            "max",
            "(II)I",
            AccessFlags::PUBLIC | AccessFlags::STATIC,
        ));
        let output = render(&subject, DisassemblyMode::DEFAULT);
        assert_eq!(
            output,
            "public class Foo {\n  \n  public static int max(int arg0, int arg1);\n}"
        );
    }

    #[test]
    fn test_method_parameters_attribute_names_and_varargs() {
        let mut subject = class("Foo");
        let mut join = method(
            "join",
            "(Ljava/lang/String;[Ljava/lang/String;)Ljava/lang/String;",
            AccessFlags::PUBLIC | AccessFlags::VARARGS,
        );
        join.attributes.push(Attribute::MethodParameters(vec![
            MethodParameter {
                name: Some("sep".to_owned()),
                access_flags: AccessFlags::empty(),
            },
            MethodParameter {
                name: Some("parts".to_owned()),
                access_flags: AccessFlags::empty(),
            },
        ]));
        subject.methods.push(join);
        let output = render(&subject, DisassemblyMode::DEFAULT | DisassemblyMode::COMPACT);
        assert_eq!(
            output,
            "public class Foo {\n  \n  public String join(String sep, String... parts);\n}"
        );
    }

    #[test]
    fn test_local_variable_table_supplies_parameter_names() {
        let mut subject = class("Foo");
        let mut scale = method("scale", "(D)D", AccessFlags::PUBLIC);
        scale.attributes.push(Attribute::Code(CodeAttribute {
            max_stack: 2,
            max_locals: 3,
            local_variable_table: vec![
                LocalVariable {
                    slot: 0,
                    name: "this".to_owned(),
                    descriptor: "LFoo;".to_owned(),
                },
                LocalVariable {
                    slot: 1,
                    name: "factor".to_owned(),
                    descriptor: "D".to_owned(),
                },
            ],
        }));
        subject.methods.push(scale);
        let output = render(&subject, DisassemblyMode::DEFAULT);
        assert_eq!(
            output,
            "public class Foo {\n  \n  public double scale(double factor);\n}"
        );
    }

    #[test]
    fn test_working_copy_fabricates_method_bodies() {
        let mut subject = class("Foo");
        subject.methods.push(method("run", "()V", AccessFlags::PUBLIC));
        subject.methods.push(method("count", "()I", AccessFlags::PUBLIC));
        subject.methods.push(method(
            "stop",
            "()V",
            AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
        ));
        let output = render(&subject, DisassemblyMode::WORKING_COPY);
        assert_eq!(
            output,
            "public class Foo {\
             \n  \n  public void run() {\n  }\
             \n  \n  public int count() {\n    return 0;\n  }\
             \n  \n  public abstract void stop();\n}"
        );
    }

    #[test]
    fn test_annotation_member_default_clause() {
        let mut subject = class("Retry");
        subject.access_flags = AccessFlags::PUBLIC
            | AccessFlags::INTERFACE
            | AccessFlags::ABSTRACT
            | AccessFlags::ANNOTATION;
        let mut timeout = method("timeout", "()I", AccessFlags::PUBLIC | AccessFlags::ABSTRACT);
        timeout
            .attributes
            .push(Attribute::AnnotationDefault(AnnotationValue::Int(3)));
        subject.methods.push(timeout);
        let output = render(&subject, DisassemblyMode::WORKING_COPY);
        assert!(output.contains("@interface Retry"));
        assert!(output.contains("public abstract int timeout() default 3;"));
    }

    #[test]
    fn test_detailed_mode_renders_annotations_as_modifiers() {
        let mut subject = class("com/example/Foo");
        subject
            .attributes
            .push(Attribute::RuntimeVisibleAnnotations(vec![Annotation {
                type_name: "Ljava/lang/Deprecated;".to_owned(),
                components: Vec::new(),
            }]));
        let output = render(&subject, DisassemblyMode::DETAILED);
        assert!(output.contains("@java.lang.Deprecated\npublic class com.example.Foo"));
    }

    #[test]
    fn test_system_mode_dumps_constant_pool() {
        let mut subject = class("com/example/Foo");
        subject.constant_pool = ConstantPool {
            entries: vec![
                ConstantPoolEntry::Utf8("hello".to_owned()),
                ConstantPoolEntry::Class("java/lang/Object".to_owned()),
                ConstantPoolEntry::MethodRef {
                    class_name: "java/lang/Object".to_owned(),
                    name: "<init>".to_owned(),
                    descriptor: "()V".to_owned(),
                },
            ],
        };
        let output = render(&subject, DisassemblyMode::SYSTEM);
        assert!(output.contains("(version 1.8 : 52.0, super bit)"));
        assert!(output.contains("Constant pool:"));
        assert!(output.contains("1. Utf8: \"hello\""));
        assert!(output.contains("2. Class: java/lang/Object"));
        assert!(output.contains("3. Methodref: java/lang/Object.<init> ()V"));
    }

    #[test]
    fn test_module_rendering() {
        let mut subject = class("module-info");
        subject.access_flags = AccessFlags::MODULE;
        subject.superclass_name = None;
        subject.attributes.push(Attribute::Module(ModuleAttribute {
            name: "com.app".to_owned(),
            flags: AccessFlags::OPEN,
            version: Some("1.0".to_owned()),
            requires: vec![ModuleRequires {
                name: "com.other".to_owned(),
                flags: AccessFlags::TRANSITIVE,
                version: None,
            }],
            exports: vec![PackageVisibility {
                package: "com/app/api".to_owned(),
                to: Vec::new(),
            }],
            opens: Vec::new(),
            uses: vec!["com/app/spi/Hook".to_owned()],
            provides: Vec::new(),
        }));
        let output = render(&subject, DisassemblyMode::DEFAULT);
        assert!(output.contains("open module com.app {"));
        assert!(output.contains("requires transitive com.other;"));
        assert!(output.contains("exports com.app.api;"));
        assert!(output.contains("uses com.app.spi.Hook;"));
    }

    fn sample_enum() -> ClassFile {
        let mut subject = class("E");
        subject.access_flags = AccessFlags::PUBLIC
            | AccessFlags::FINAL
            | AccessFlags::SUPER
            | AccessFlags::ENUM;
        subject.superclass_name = Some("java/lang/Enum".to_owned());
        let constant = AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL | AccessFlags::ENUM;
        subject.fields = vec![
            field("A", "LE;", constant),
            field("B", "LE;", constant),
            field(
                "$VALUES",
                "[LE;",
                AccessFlags::PRIVATE | AccessFlags::STATIC | AccessFlags::FINAL | AccessFlags::SYNTHETIC,
            ),
        ];
        subject.methods = vec![
            method("<init>", "(Ljava/lang/String;I)V", AccessFlags::PRIVATE),
            method("values", "()[LE;", AccessFlags::PUBLIC | AccessFlags::STATIC),
            method(
                "valueOf",
                "(Ljava/lang/String;)LE;",
                AccessFlags::PUBLIC | AccessFlags::STATIC,
            ),
            method("<clinit>", "()V", AccessFlags::STATIC),
        ];
        subject
    }

    #[test]
    fn test_enum_working_copy_filters_synthetic_members() {
        let output = render(&sample_enum(), DisassemblyMode::WORKING_COPY);
        assert_eq!(
            output,
            "public enum E {\
             \n  \n  A(),\
             \n  \n  B();\
             \n  \n  private E() {\n  }\n}"
        );
        assert!(!output.contains("values"));
        assert!(!output.contains("valueOf"));
        assert!(!output.contains("$VALUES"));
    }

    #[test]
    fn test_enum_constants_synthesize_default_arguments() {
        let mut subject = sample_enum();
        subject.methods[0] = method(
            "<init>",
            "(Ljava/lang/String;IILjava/lang/String;Z)V",
            AccessFlags::PRIVATE,
        );
        let output = render(&subject, DisassemblyMode::WORKING_COPY);
        assert!(output.contains("A(0, null, false),"));
        assert!(output.contains("private E(int arg0, java.lang.String arg1, boolean arg2) {"));
    }

    #[test]
    fn test_disassembly_is_deterministic() {
        let mut subject = sample_enum();
        subject
            .attributes
            .push(Attribute::RuntimeVisibleAnnotations(vec![Annotation {
                type_name: "Lcom/example/Tag;".to_owned(),
                components: vec![(
                    "value".to_owned(),
                    AnnotationValue::Array(vec![
                        AnnotationValue::String("x".to_owned()),
                        AnnotationValue::Enum {
                            type_name: "Lcom/example/Kind;".to_owned(),
                            constant_name: "LEFT".to_owned(),
                        },
                    ]),
                )],
            }]));
        subject.constant_pool = ConstantPool {
            entries: vec![ConstantPoolEntry::Utf8("E".to_owned())],
        };
        let mode = DisassemblyMode::SYSTEM | DisassemblyMode::DETAILED | DisassemblyMode::COMPACT;
        let first = Disassembler::new(mode).disassemble(&subject, "\r\n");
        let second = Disassembler::new(mode).disassemble(&subject, "\r\n");
        assert_eq!(first, second);
    }
}
