//! Reads Java source back into a [`SourceUnit`].
//!
//! tree-sitter does the tokenizing; this module walks the tree and accepts only
//! the subset [`crate::render`] produces, modulo formatting. A file with
//! anything else in it (imports, methods, comments, initializers) is refused
//! rather than partially modelled, so a later rewrite can never drop content.

use tree_sitter::{Node, Parser};

use crate::error::{Result, ScaffoldError};
use crate::model::{Annotation, SourceUnit, Visibility, is_type_name};

pub fn parse_source(source: &str) -> Result<SourceUnit> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| malformed(format!("Java grammar unavailable: {e}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| malformed("parser produced no tree"))?;
    let root = tree.root_node();
    let bytes = source.as_bytes();

    if root.has_error() {
        let at = first_error(&root).unwrap_or(root).start_position();
        return Err(malformed(format!(
            "syntax error at line {}, column {}",
            at.row + 1,
            at.column + 1
        )));
    }

    let mut cursor = root.walk();
    let items: Vec<Node> = root.named_children(&mut cursor).collect();

    let mut types = items.iter().filter(|n| type_kind(n.kind()).is_some());
    let class = match types.next() {
        Some(node) if node.kind() == "class_declaration" => *node,
        Some(node) => {
            return Err(ScaffoldError::UnsupportedKind {
                kind: type_kind(node.kind()).unwrap_or("type").to_string(),
            });
        }
        None => return Err(malformed("no type declaration found")),
    };
    if types.next().is_some() {
        return Err(unsupported("more than one top-level type"));
    }

    let mut package_name = String::new();
    for item in &items {
        match item.kind() {
            "package_declaration" => package_name = extract_package(item, bytes)?,
            "class_declaration" => {}
            "import_declaration" => return Err(unsupported("import declaration")),
            kind if is_comment(kind) => return Err(unsupported("comment")),
            kind => return Err(unsupported(kind.replace('_', " "))),
        }
    }

    let name = class
        .child_by_field_name("name")
        .map(|n| node_text(&n, bytes).to_string())
        .ok_or_else(|| malformed("class without a name"))?;
    check_class_header(&class, bytes)?;

    let mut unit = SourceUnit::new_class(package_name, name)?;
    let body = class
        .child_by_field_name("body")
        .ok_or_else(|| malformed("class without a body"))?;
    let mut cursor = body.walk();
    let members: Vec<Node> = body.named_children(&mut cursor).collect();
    for member in &members {
        match member.kind() {
            "field_declaration" => {
                let field = extract_field(member, bytes)?;
                let added = unit.add_field(field.name, field.ty, Visibility::Private)?;
                for annotation in field.annotations {
                    added.push_annotation(annotation);
                }
            }
            "method_declaration" => return Err(unsupported("method")),
            "constructor_declaration" => return Err(unsupported("constructor")),
            "block" | "static_initializer" => return Err(unsupported("initializer block")),
            kind if is_comment(kind) => return Err(unsupported("comment")),
            kind if type_kind(kind).is_some() => return Err(unsupported("nested type")),
            kind => return Err(unsupported(kind.replace('_', " "))),
        }
    }

    Ok(unit)
}

fn type_kind(kind: &str) -> Option<&'static str> {
    match kind {
        "class_declaration" => Some("class"),
        "interface_declaration" => Some("interface"),
        "enum_declaration" => Some("enum"),
        "record_declaration" => Some("record"),
        "annotation_type_declaration" => Some("annotation type"),
        "module_declaration" => Some("module"),
        _ => None,
    }
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment" | "comment")
}

fn extract_package(node: &Node, source: &[u8]) -> Result<String> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "scoped_identifier" | "identifier" => return Ok(compact(node_text(&child, source))),
            "marker_annotation" | "annotation" => return Err(unsupported("package annotation")),
            _ => {}
        }
    }
    Err(malformed("package declaration without a name"))
}

fn check_class_header(class: &Node, source: &[u8]) -> Result<()> {
    for field in ["type_parameters", "superclass", "interfaces", "permits"] {
        if class.child_by_field_name(field).is_some() {
            return Err(unsupported(format!("class {}", field.replace('_', " "))));
        }
    }

    let mut public = false;
    if let Some(modifiers) = find_child(class, "modifiers") {
        let mut cursor = modifiers.walk();
        for modifier in modifiers.children(&mut cursor) {
            match modifier.kind() {
                "public" if !public => public = true,
                "marker_annotation" | "annotation" => {
                    return Err(unsupported("class annotation"));
                }
                _ => {
                    return Err(unsupported(format!(
                        "'{}' class modifier",
                        node_text(&modifier, source)
                    )));
                }
            }
        }
    }

    if public {
        Ok(())
    } else {
        Err(unsupported("non-public class"))
    }
}

struct FieldDeclaration {
    name: String,
    ty: String,
    annotations: Vec<Annotation>,
}

fn extract_field(node: &Node, source: &[u8]) -> Result<FieldDeclaration> {
    let mut annotations = Vec::new();
    let mut private = false;

    if let Some(modifiers) = find_child(node, "modifiers") {
        let mut cursor = modifiers.walk();
        for modifier in modifiers.children(&mut cursor) {
            match modifier.kind() {
                "marker_annotation" | "annotation" => {
                    annotations.push(extract_annotation(&modifier, source)?);
                }
                "private" if !private => private = true,
                _ => {
                    return Err(unsupported(format!(
                        "'{}' field modifier",
                        node_text(&modifier, source)
                    )));
                }
            }
        }
    }
    if !private {
        return Err(unsupported("non-private field"));
    }

    let ty = node
        .child_by_field_name("type")
        .map(|n| compact(node_text(&n, source)))
        .ok_or_else(|| malformed("field without a type"))?;
    if !is_type_name(&ty) {
        return Err(unsupported(format!("field type '{ty}'")));
    }

    let mut cursor = node.walk();
    let declarators: Vec<Node> = node
        .children_by_field_name("declarator", &mut cursor)
        .collect();
    let [declarator] = declarators.as_slice() else {
        return Err(unsupported("multiple variables in one field declaration"));
    };
    if declarator.child_by_field_name("value").is_some() {
        return Err(unsupported("field initializer"));
    }
    if declarator.child_by_field_name("dimensions").is_some() {
        return Err(unsupported("array dimensions on field name"));
    }
    let name = declarator
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())
        .ok_or_else(|| malformed("field without a name"))?;

    Ok(FieldDeclaration {
        name,
        ty,
        annotations,
    })
}

fn extract_annotation(node: &Node, source: &[u8]) -> Result<Annotation> {
    let name = node
        .child_by_field_name("name")
        .map(|n| compact(node_text(&n, source)))
        .ok_or_else(|| malformed("annotation without a name"))?;
    let mut annotation = Annotation::new(name)?;

    let Some(arguments) = node.child_by_field_name("arguments") else {
        return Ok(annotation);
    };

    let mut cursor = arguments.walk();
    let values: Vec<Node> = arguments.named_children(&mut cursor).collect();
    for value in &values {
        match value.kind() {
            "element_value_pair" => {
                let key = value
                    .child_by_field_name("key")
                    .map(|n| node_text(&n, source).to_string())
                    .ok_or_else(|| malformed("annotation argument without a key"))?;
                let literal = value
                    .child_by_field_name("value")
                    .ok_or_else(|| malformed("annotation argument without a value"))?;
                annotation.set_argument(key, string_value(&literal, source)?)?;
            }
            kind if is_comment(kind) => return Err(unsupported("comment")),
            _ => annotation.set_argument("value", string_value(value, source)?)?,
        }
    }

    Ok(annotation)
}

fn string_value(node: &Node, source: &[u8]) -> Result<String> {
    if node.kind() != "string_literal" {
        return Err(unsupported("non-string annotation argument"));
    }
    let raw = node_text(node, source);
    if raw.starts_with("\"\"\"") {
        return Err(unsupported("text block annotation argument"));
    }
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| malformed(format!("unterminated string literal {raw}")))?;
    unescape(inner)
}

pub fn unescape(inner: &str) -> Result<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars
            .next()
            .ok_or_else(|| malformed("dangling escape in string literal"))?;
        match escaped {
            'b' => out.push('\u{8}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{c}'),
            'r' => out.push('\r'),
            's' => out.push(' '),
            '"' | '\'' | '\\' => out.push(escaped),
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .ok_or_else(|| malformed(format!("bad unicode escape \\u{hex}")))?;
                let decoded = char::from_u32(code)
                    .ok_or_else(|| malformed(format!("unpaired surrogate \\u{hex}")))?;
                out.push(decoded);
            }
            '0'..='7' => {
                let max_digits = if escaped <= '3' { 3 } else { 2 };
                let mut code = escaped.to_digit(8).unwrap_or(0);
                for _ in 1..max_digits {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            other => return Err(malformed(format!("unknown escape \\{other}"))),
        }
    }

    Ok(out)
}

fn find_child<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn first_error<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children
        .iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error)
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn compact(s: &str) -> String {
    s.split_whitespace().collect()
}

fn malformed(message: impl Into<String>) -> ScaffoldError {
    ScaffoldError::MalformedSource {
        message: message.into(),
    }
}

fn unsupported(what: impl Into<String>) -> ScaffoldError {
    ScaffoldError::UnsupportedConstruct { what: what.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;

    const PAGE: &str = r#"
package com.app.pages;

public class LoginPage {

    @org.jboss.arquillian.graphene.spi.annotations.Root
    private org.openqa.selenium.WebElement root;

    @org.openqa.selenium.support.FindBy(id = "submit")
    private org.openqa.selenium.WebElement submitButton;
}
"#;

    #[test]
    fn parses_generated_page() {
        let unit = parse_source(PAGE).unwrap();
        assert_eq!(unit.package_name(), "com.app.pages");
        assert_eq!(unit.name(), "LoginPage");
        assert_eq!(unit.fields().len(), 2);

        let root = &unit.fields()[0];
        assert_eq!(root.name(), "root");
        assert_eq!(root.ty(), "org.openqa.selenium.WebElement");
        assert_eq!(root.visibility(), Visibility::Private);
        assert_eq!(
            root.annotations()[0].qualified_name(),
            "org.jboss.arquillian.graphene.spi.annotations.Root"
        );
        assert!(root.annotations()[0].is_marker());

        let submit = &unit.fields()[1];
        assert_eq!(submit.annotations()[0].argument("id"), Some("submit"));
    }

    #[test]
    fn round_trips_rendered_unit() {
        let mut unit = SourceUnit::new_class("com.shop", "CartPage").unwrap();
        let field = unit
            .add_field("checkout", "org.openqa.selenium.WebElement", Visibility::Private)
            .unwrap();
        field.add_annotation("x.Marker").unwrap();
        let find_by = field.add_annotation("x.FindBy").unwrap();
        find_by.set_argument("xpath", "//a[@href=\"/pay\"]\\n\t").unwrap();
        find_by.set_argument("how", "XPATH").unwrap();

        assert_eq!(parse_source(&render(&unit)).unwrap(), unit);
    }

    #[test]
    fn tolerates_reformatted_source() {
        let source = "public   class Home\n{ @a.B( value=\"x\" ,other = \"y\" ) private\n a . C  el ; }";
        let unit = parse_source(source).unwrap();
        assert_eq!(unit.package_name(), "");
        assert_eq!(unit.fields()[0].ty(), "a.C");
        assert_eq!(unit.fields()[0].annotations()[0].argument("other"), Some("y"));
    }

    #[test]
    fn single_element_annotation_maps_to_value_key() {
        let source = "public class P { @x.Find(\"q\") private x.E e; }";
        let unit = parse_source(source).unwrap();
        assert_eq!(unit.fields()[0].annotations()[0].argument("value"), Some("q"));
    }

    #[test]
    fn rejects_interface_and_enum() {
        let err = parse_source("package a; public interface Page { }").unwrap_err();
        assert!(matches!(err, ScaffoldError::UnsupportedKind { ref kind } if kind == "interface"));

        let err = parse_source("public enum Color { RED }").unwrap_err();
        assert!(matches!(err, ScaffoldError::UnsupportedKind { ref kind } if kind == "enum"));
    }

    #[test]
    fn rejects_content_outside_the_model() {
        let cases = [
            "import a.B; public class P { }",
            "public class P { public void open() { } }",
            "public class P { // note\n }",
            "public class P { private x.E a = null; }",
            "public class P { private x.E a, b; }",
            "public class P { private int a; }",
            "public class P { private java.util.List<x.E> a; }",
            "public class P { private x.E[] a; }",
            "public class P { public int a; }",
            "public abstract class P { }",
            "class P { }",
            "public class P<T> { }",
            "public class P extends Base { }",
            "public class P { @x.Find(id = 3) private x.E e; }",
        ];
        for source in cases {
            let err = parse_source(source).unwrap_err();
            assert!(
                matches!(err, ScaffoldError::UnsupportedConstruct { .. }),
                "{source}: {err}"
            );
        }
    }

    #[test]
    fn reports_syntax_errors() {
        let err = parse_source("public class P { private x.E ").unwrap_err();
        assert!(matches!(err, ScaffoldError::MalformedSource { .. }));

        let err = parse_source("package a.b;").unwrap_err();
        assert!(matches!(err, ScaffoldError::MalformedSource { .. }));
    }

    #[test]
    fn duplicate_field_in_source_is_a_name_conflict() {
        let err = parse_source("public class P { private x.E e; private x.E e; }").unwrap_err();
        assert!(matches!(err, ScaffoldError::NameConflict { .. }));
    }

    #[test]
    fn unescape_handles_java_escapes() {
        assert_eq!(unescape(r#"a\"b\\c\n"#).unwrap(), "a\"b\\c\n");
        assert_eq!(unescape(r"A\uu0042").unwrap(), "AB");
        assert_eq!(unescape(r"\101\7").unwrap(), "A\u{7}");
        assert!(unescape(r"\q").is_err());
    }
}
