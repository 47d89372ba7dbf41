//! Descriptor and generic-signature decoding.
//!
//! Turns JVM binary type descriptors (`[Ljava/lang/String;`, `(IJ)V`) and
//! generic signatures (`Ljava/util/List<TT;>;`) into Java source type text.
//! Slashes become dots; when `compact` is requested every class name is
//! reduced to its simple name, including names nested inside type arguments.
//!
//! Decoding is infallible: a malformed descriptor degrades to the text
//! decoded so far, since the renderer assumes a parser-validated model.

use std::iter::Peekable;
use std::str::Chars;

/// A decoded method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<String>,
    pub return_type: String,
}

/// A type parameter from a generic signature, bounds already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    /// Empty when the only bound was `java.lang.Object`.
    pub bounds: Vec<String>,
}

/// Decode a field descriptor or field type signature into source text.
pub fn field_type(descriptor: &str, compact: bool) -> String {
    let mut cursor = descriptor.chars().peekable();
    decode_type(&mut cursor, compact)
}

/// Decode a method descriptor or method signature.
///
/// A leading type parameter section is skipped; use
/// [`signature_type_parameters`] to decode it separately.
pub fn method_descriptor(descriptor: &str, compact: bool) -> MethodDescriptor {
    let mut cursor = descriptor.chars().peekable();
    skip_type_parameters(&mut cursor);
    let mut parameters = Vec::new();
    if eat(&mut cursor, '(') {
        while cursor.peek().is_some() && cursor.peek() != Some(&')') {
            parameters.push(decode_type(&mut cursor, compact));
        }
        eat(&mut cursor, ')');
    }
    let return_type = decode_type(&mut cursor, compact);
    MethodDescriptor {
        parameters,
        return_type,
    }
}

/// Split the parameter section of a method descriptor into raw per-parameter
/// descriptors, without decoding them.
pub fn parameter_descriptors(descriptor: &str) -> Vec<String> {
    let mut cursor = descriptor.chars().peekable();
    skip_type_parameters(&mut cursor);
    let mut raw = Vec::new();
    if eat(&mut cursor, '(') {
        while cursor.peek().is_some() && cursor.peek() != Some(&')') {
            let mut one = String::new();
            copy_raw_type(&mut cursor, &mut one);
            raw.push(one);
        }
    }
    raw
}

/// The raw return descriptor of a method descriptor.
pub fn return_descriptor(descriptor: &str) -> &str {
    match descriptor.rfind(')') {
        Some(close) => &descriptor[close + 1..],
        None => descriptor,
    }
}

/// Decode the `<T:...>` section of a generic class or method signature.
pub fn signature_type_parameters(signature: &str, compact: bool) -> Vec<TypeParameter> {
    let mut cursor = signature.chars().peekable();
    let mut parameters = Vec::new();
    if !eat(&mut cursor, '<') {
        return parameters;
    }
    while cursor.peek().is_some() && cursor.peek() != Some(&'>') {
        let mut name = String::new();
        while let Some(&c) = cursor.peek() {
            if c == ':' {
                break;
            }
            name.push(c);
            cursor.next();
        }
        let mut bounds = Vec::new();
        while eat(&mut cursor, ':') {
            // an empty class bound is written as `::`
            if cursor.peek() == Some(&':') {
                continue;
            }
            bounds.push(decode_type(&mut cursor, compact));
        }
        if bounds.len() == 1 && (bounds[0] == "java.lang.Object" || (compact && bounds[0] == "Object")) {
            bounds.clear();
        }
        parameters.push(TypeParameter { name, bounds });
    }
    parameters
}

/// Convert an internal (slash-form) class name to source form, reducing to
/// the simple name when `compact`.
pub fn display_name(name: &str, compact: bool) -> String {
    let dotted = name.replace('/', ".");
    if compact {
        if let Some(dot) = dotted.rfind('.') {
            return dotted[dot + 1..].to_owned();
        }
    }
    dotted
}

type Cursor<'a> = Peekable<Chars<'a>>;

fn skip_type_parameters(cursor: &mut Cursor<'_>) {
    if cursor.peek() != Some(&'<') {
        return;
    }
    let mut depth = 0u32;
    for c in cursor.by_ref() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}

fn eat(cursor: &mut Cursor<'_>, expected: char) -> bool {
    if cursor.peek() == Some(&expected) {
        cursor.next();
        return true;
    }
    false
}

fn decode_type(cursor: &mut Cursor<'_>, compact: bool) -> String {
    let mut dimensions = 0;
    while eat(cursor, '[') {
        dimensions += 1;
    }
    let mut text = match cursor.next() {
        Some('B') => "byte".to_owned(),
        Some('C') => "char".to_owned(),
        Some('D') => "double".to_owned(),
        Some('F') => "float".to_owned(),
        Some('I') => "int".to_owned(),
        Some('J') => "long".to_owned(),
        Some('S') => "short".to_owned(),
        Some('Z') => "boolean".to_owned(),
        Some('V') => "void".to_owned(),
        Some('L') => decode_class(cursor, compact),
        Some('T') => decode_type_variable(cursor),
        Some('+') => format!("? extends {}", decode_type(cursor, compact)),
        Some('-') => format!("? super {}", decode_type(cursor, compact)),
        Some('*') => "?".to_owned(),
        _ => String::new(),
    };
    for _ in 0..dimensions {
        text.push_str("[]");
    }
    text
}

fn decode_class(cursor: &mut Cursor<'_>, compact: bool) -> String {
    let mut out = String::new();
    let mut name = String::new();
    loop {
        match cursor.next() {
            Some(';') | None => {
                push_name(&mut out, &name, compact);
                return out;
            }
            Some('<') => {
                push_name(&mut out, &name, compact);
                name.clear();
                out.push('<');
                let mut first = true;
                while cursor.peek().is_some() && cursor.peek() != Some(&'>') {
                    if !first {
                        out.push_str(", ");
                    }
                    out.push_str(&decode_type(cursor, compact));
                    first = false;
                }
                eat(cursor, '>');
                out.push('>');
            }
            // inner-class segment of a generic signature
            Some('.') => {
                push_name(&mut out, &name, compact);
                name.clear();
                out.push('.');
            }
            Some('/') => name.push('.'),
            Some(c) => name.push(c),
        }
    }
}

fn decode_type_variable(cursor: &mut Cursor<'_>) -> String {
    let mut name = String::new();
    for c in cursor.by_ref() {
        if c == ';' {
            break;
        }
        name.push(c);
    }
    name
}

fn push_name(out: &mut String, name: &str, compact: bool) {
    if compact {
        if let Some(dot) = name.rfind('.') {
            out.push_str(&name[dot + 1..]);
            return;
        }
    }
    out.push_str(name);
}

/// Copy one raw type descriptor from the cursor, including array prefixes
/// and any generic type arguments.
fn copy_raw_type(cursor: &mut Cursor<'_>, out: &mut String) {
    while let Some(&c) = cursor.peek() {
        if c != '[' {
            break;
        }
        out.push(c);
        cursor.next();
    }
    match cursor.next() {
        Some(c @ ('L' | 'T')) => {
            out.push(c);
            let mut depth = 0u32;
            for c in cursor.by_ref() {
                out.push(c);
                match c {
                    '<' => depth += 1,
                    '>' => depth = depth.saturating_sub(1),
                    ';' if depth == 0 => break,
                    _ => {}
                }
            }
        }
        Some(c) => out.push(c),
        None => {}
    }
}

/// Stack width of one raw parameter descriptor: `long` and `double` take
/// two local variable slots.
pub(crate) fn slot_width(raw_descriptor: &str) -> u16 {
    match raw_descriptor {
        "J" | "D" => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_primitive_and_array_field_types() {
        assert_eq!(field_type("I", false), "int");
        assert_eq!(field_type("[[Z", false), "boolean[][]");
        assert_eq!(field_type("[Ljava/lang/String;", false), "java.lang.String[]");
    }

    #[test]
    fn test_compact_reduces_nested_names() {
        assert_eq!(
            field_type("Ljava/util/Map<Ljava/lang/String;Ljava/util/List<[I>;>;", true),
            "Map<String, List<int[]>>"
        );
    }

    #[test]
    fn test_generic_signature_with_wildcards() {
        assert_eq!(
            field_type("Ljava/util/List<+Ljava/lang/Number;>;", false),
            "java.util.List<? extends java.lang.Number>"
        );
        assert_eq!(field_type("Ljava/util/List<*>;", false), "java.util.List<?>");
        assert_eq!(field_type("TT;", false), "T");
    }

    #[test]
    fn test_method_descriptor_parameters_and_return() {
        let decoded = method_descriptor("(IJLjava/lang/String;)V", false);
        assert_eq!(decoded.parameters, vec!["int", "long", "java.lang.String"]);
        assert_eq!(decoded.return_type, "void");
    }

    #[test]
    fn test_method_signature_skips_type_parameter_section() {
        let decoded = method_descriptor("<T:Ljava/lang/Object;>(TT;)TT;", false);
        assert_eq!(decoded.parameters, vec!["T"]);
        assert_eq!(decoded.return_type, "T");
    }

    #[test]
    fn test_parameter_descriptors_keep_raw_form() {
        assert_eq!(
            parameter_descriptors("(I[JLjava/lang/String;D)V"),
            vec!["I", "[J", "Ljava/lang/String;", "D"]
        );
        assert_eq!(return_descriptor("(I)[LE;"), "[LE;");
    }

    #[test]
    fn test_type_parameters_filter_object_bound() {
        let parameters = signature_type_parameters(
            "<T:Ljava/lang/Object;U:Ljava/lang/Number;:Ljava/lang/Comparable<TU;>;>()V",
            false,
        );
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "T");
        assert!(parameters[0].bounds.is_empty());
        assert_eq!(parameters[1].name, "U");
        assert_eq!(
            parameters[1].bounds,
            vec!["java.lang.Number", "java.lang.Comparable<U>"]
        );
    }

    #[test]
    fn test_display_name_reduction() {
        assert_eq!(display_name("com/example/Foo", false), "com.example.Foo");
        assert_eq!(display_name("com/example/Foo", true), "Foo");
        assert_eq!(display_name("Foo", true), "Foo");
    }
}
