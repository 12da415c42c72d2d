//! Emitter: `Tree` → compact tree notation.
//!
//! Output round-trips through [`parse_tree`](crate::notation::parse_tree) as
//! long as component names are capitalized and intrinsic names are not.

use crate::model::*;
use std::fmt::Write;

/// Emit a tree on a single line: `div#A[button#b1, span#s1], div#B`.
#[must_use]
pub fn emit_tree(tree: &[Child]) -> String {
    let mut out = String::with_capacity(64);
    emit_slots(&mut out, tree);
    out
}

/// Emit a tree with one slot per line, children indented two spaces.
#[must_use]
pub fn emit_tree_pretty(tree: &[Child]) -> String {
    let mut out = String::with_capacity(256);
    for child in tree {
        emit_pretty(&mut out, child, 0);
    }
    out
}

fn emit_slots(out: &mut String, slots: &[Child]) {
    for (i, child) in slots.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match child {
            Child::Text(s) => emit_string(out, s),
            Child::Empty => out.push('_'),
            Child::Element(node) => {
                emit_head(out, node);
                if !node.children.is_empty() {
                    out.push('[');
                    emit_slots(out, &node.children);
                    out.push(']');
                }
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn emit_pretty(out: &mut String, child: &Child, depth: usize) {
    indent(out, depth);
    match child {
        Child::Text(s) => emit_string(out, s),
        Child::Empty => out.push('_'),
        Child::Element(node) => {
            emit_head(out, node);
            if !node.children.is_empty() {
                out.push_str(" [\n");
                for grandchild in &node.children {
                    emit_pretty(out, grandchild, depth + 1);
                }
                indent(out, depth);
                out.push(']');
            }
        }
    }
    out.push_str(",\n");
}

/// `name#identity(attrs)`
fn emit_head(out: &mut String, node: &Node) {
    out.push_str(node.ty.name());
    if let Some(identity) = &node.identity {
        let _ = write!(out, "#{identity}");
    }
    if node.attrs.is_empty() {
        return;
    }
    out.push('(');
    for (i, (name, value)) in node.attrs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{name}=");
        match value {
            AttrValue::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            AttrValue::Number(n) => out.push_str(&format_num(*n)),
            AttrValue::Str(s) => emit_string(out, s),
        }
    }
    out.push(')');
}

fn emit_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Format a number without a trailing `.0` for whole values.
fn format_num(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::parse_tree;
    use pretty_assertions::assert_eq;

    #[test]
    fn emits_compact_line() {
        let tree: Tree = vec![
            Node::element("div")
                .with_identity("A")
                .with_child(Node::element("button").with_identity("b1"))
                .with_child(Node::element("span").with_identity("s1"))
                .into(),
            Node::element("div").with_identity("B").into(),
        ];
        assert_eq!(emit_tree(&tree), "div#A[button#b1, span#s1], div#B");
    }

    #[test]
    fn emits_attributes_in_sorted_order() {
        let tree: Tree = vec![
            Node::element("input")
                .with_attr("size", 12.0)
                .with_attr("ratio", 0.25)
                .with_attr("disabled", true)
                .with_attr("label", "say \"hi\"")
                .into(),
        ];
        assert_eq!(
            emit_tree(&tree),
            r#"input(disabled=true, label="say \"hi\"", ratio=0.25, size=12)"#
        );
    }

    #[test]
    fn roundtrip_mixed_slots() {
        let input = r#"section#bar(gap=8)["Title", _, Card#c1[span], button]"#;
        let tree = parse_tree(input).unwrap();
        let output = emit_tree(&tree);
        assert_eq!(output, input);

        let reparsed = parse_tree(&output).expect("re-parse of emitted output failed");
        assert_eq!(reparsed, tree);
    }

    #[test]
    fn pretty_output_reparses() {
        let tree = parse_tree(r#"div#A[button#b1["ok"], span#s1], div#B"#).unwrap();
        let pretty = emit_tree_pretty(&tree);
        assert_eq!(
            pretty,
            "div#A [\n  button#b1 [\n    \"ok\",\n  ],\n  span#s1,\n],\ndiv#B,\n"
        );
        assert_eq!(parse_tree(&pretty).unwrap(), tree);
    }
}
