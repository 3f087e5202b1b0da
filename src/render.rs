use crate::model::{Annotation, Field, SourceUnit};

const INDENT: &str = "    ";

/// Renders a unit to Java source. Output depends only on the unit.
pub fn render(unit: &SourceUnit) -> String {
    let mut out = String::new();

    if !unit.package_name().is_empty() {
        out.push_str(&format!("package {};\n\n", unit.package_name()));
    }

    out.push_str(&format!("{} class {} {{\n", unit.visibility().keyword(), unit.name()));
    for field in unit.fields() {
        out.push('\n');
        render_field(&mut out, field);
    }
    out.push_str("}\n");

    out
}

fn render_field(out: &mut String, field: &Field) {
    for annotation in field.annotations() {
        out.push_str(INDENT);
        out.push_str(&render_annotation(annotation));
        out.push('\n');
    }
    out.push_str(&format!(
        "{INDENT}{} {} {};\n",
        field.visibility().keyword(),
        field.ty(),
        field.name()
    ));
}

pub fn render_annotation(annotation: &Annotation) -> String {
    if annotation.is_marker() {
        return format!("@{}", annotation.qualified_name());
    }

    let args: Vec<String> = annotation
        .arguments()
        .iter()
        .map(|(key, value)| format!("{key} = {}", quote(value)))
        .collect();
    format!("@{}({})", annotation.qualified_name(), args.join(", "))
}

pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
