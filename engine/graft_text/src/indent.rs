//! Indentation measurement and rewriting.
//!
//! Indentation is measured in UNITS: visual columns (tabs expand to the
//! next tab stop) divided by the indent width. Copied and formatted code
//! moves between contexts by stripping the source's units and prepending
//! the destination's indent string.

use memchr::memchr;

/// Leading whitespace of a line.
pub fn extract_indent(line: &str) -> &str {
    let end = line
        .as_bytes()
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(line.len());
    &line[..end]
}

fn columns_of(prefix: &str, tab_width: u32) -> u32 {
    let mut col = 0u32;
    for b in prefix.bytes() {
        match b {
            b' ' => col += 1,
            b'\t' if tab_width > 0 => col = (col / tab_width + 1) * tab_width,
            b'\t' => col += 1,
            _ => break,
        }
    }
    col
}

/// Indent units of a line's leading whitespace.
pub fn indent_units(line: &str, tab_width: u32, indent_width: u32) -> u32 {
    if indent_width == 0 {
        return 0;
    }
    columns_of(extract_indent(line), tab_width) / indent_width
}

/// Build the indent string for `units` indent units.
pub fn create_indent(units: u32, use_tabs: bool, tab_width: u32, indent_width: u32) -> String {
    let columns = units * indent_width;
    if use_tabs && tab_width > 0 {
        let mut out = "\t".repeat((columns / tab_width) as usize);
        out.push_str(&" ".repeat((columns % tab_width) as usize));
        out
    } else {
        " ".repeat(columns as usize)
    }
}

/// Drop up to `units` indent units of leading whitespace.
///
/// A tab that overshoots the boundary is still consumed whole.
fn strip_indent_units(line: &str, units: u32, tab_width: u32, indent_width: u32) -> &str {
    let target = units * indent_width;
    let mut col = 0u32;
    let mut end = 0usize;
    for (i, b) in line.bytes().enumerate() {
        if col >= target {
            break;
        }
        match b {
            b' ' => col += 1,
            b'\t' if tab_width > 0 => col = (col / tab_width + 1) * tab_width,
            b'\t' => col += 1,
            _ => break,
        }
        end = i + 1;
    }
    &line[end..]
}

/// Re-indent a multi-line snippet for a new context.
///
/// The first line is left alone (spliced text starts mid-line); every
/// following line loses `source_units` of indentation and gains
/// `dest_indent` instead. Whitespace-only lines come out empty and the
/// original delimiters (`\n` or `\r\n`) are preserved.
pub fn change_indent(
    code: &str,
    source_units: u32,
    tab_width: u32,
    indent_width: u32,
    dest_indent: &str,
) -> String {
    let bytes = code.as_bytes();
    let mut out = String::with_capacity(code.len() + dest_indent.len() * 4);
    let mut start = 0usize;
    let mut first = true;
    while start <= code.len() {
        let (line, delim, next) = match memchr(b'\n', &bytes[start..]) {
            Some(rel) => {
                let nl = start + rel;
                let mut content_end = nl;
                if content_end > start && bytes[content_end - 1] == b'\r' {
                    content_end -= 1;
                }
                (&code[start..content_end], &code[content_end..=nl], nl + 1)
            }
            None => (&code[start..], "", code.len() + 1),
        };
        if first {
            out.push_str(line);
            first = false;
        } else {
            let stripped = strip_indent_units(line, source_units, tab_width, indent_width);
            if !stripped.is_empty() {
                out.push_str(dest_indent);
                out.push_str(stripped);
            }
        }
        out.push_str(delim);
        start = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_measurement() {
        assert_eq!(extract_indent("    x"), "    ");
        assert_eq!(extract_indent("\t\tx"), "\t\t");
        assert_eq!(extract_indent("x"), "");
        assert_eq!(indent_units("        x", 4, 4), 2);
        assert_eq!(indent_units("\tx", 4, 4), 1);
        assert_eq!(indent_units("\t  x", 4, 2), 3);
        assert_eq!(indent_units("x", 4, 4), 0);
        assert_eq!(indent_units("  x", 4, 0), 0);
    }

    #[test]
    fn test_create() {
        assert_eq!(create_indent(2, false, 4, 4), "        ");
        assert_eq!(create_indent(2, true, 4, 4), "\t\t");
        assert_eq!(create_indent(3, true, 4, 2), "\t  ");
        assert_eq!(create_indent(0, true, 4, 4), "");
    }

    #[test]
    fn test_change_indent() {
        let code = "if (x) {\n        y();\n    }";
        assert_eq!(
            change_indent(code, 1, 4, 4, "\t"),
            "if (x) {\n\t    y();\n\t}"
        );
    }

    #[test]
    fn test_change_indent_keeps_first_line_and_delimiters() {
        let code = "a();\r\n    b();\r\n";
        assert_eq!(change_indent(code, 1, 4, 4, "  "), "a();\r\n  b();\r\n");
    }

    #[test]
    fn test_change_indent_blank_lines_stay_blank() {
        let code = "a();\n    \n    b();";
        assert_eq!(change_indent(code, 1, 4, 4, "  "), "a();\n\n  b();");
    }

    #[test]
    fn test_tab_overshoot_is_consumed() {
        // One unit of two columns; the tab jumps four, the rest survives.
        assert_eq!(strip_indent_units("\tx", 1, 4, 2), "x");
    }
}
