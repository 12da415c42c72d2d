//! Parser for the compact tree notation → `Tree`.
//!
//! Built on `winnow` 0.7. The notation exists for fixtures and diagnostics:
//!
//! ```text
//! div#A(class="row")[button#b1["Click"], span#s1], _, Card#c
//! ```
//!
//! - `name#identity(attr=value, ...)[children]`, every part after the name
//!   optional
//! - lowercase names are intrinsic elements, capitalized names are components
//! - `"text"` is a text slot, `_` an empty slot
//! - `//` starts a comment running to the end of the line

use crate::model::*;
use std::rc::Rc;
use winnow::combinator::preceded;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Parse a tree in compact notation.
#[must_use = "parsing result should be used"]
pub fn parse_tree(input: &str) -> Result<Tree, String> {
    let mut rest = input;
    let tree = parse_children
        .parse_next(&mut rest)
        .map_err(|e| format!("Tree parse error: {e}"))?;

    skip_ws_and_comments(&mut rest);
    if !rest.is_empty() {
        let preview: String = rest.chars().take(16).collect();
        return Err(format!("Tree parse error: unexpected input at `{preview}`"));
    }
    Ok(tree)
}

/// Parse a single element in compact notation.
pub fn parse_node(input: &str) -> Result<NodeRef, String> {
    let tree = parse_tree(input)?;
    match tree.as_slice() {
        [Child::Element(node)] => Ok(node.clone()),
        _ => Err(format!(
            "Tree parse error: expected exactly one element, found {} slots",
            tree.len()
        )),
    }
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn skip_ws_and_comments(input: &mut &str) {
    loop {
        let before = *input;
        *input = input.trim_start();
        if input.starts_with("//") {
            if let Some(pos) = input.find('\n') {
                *input = &input[pos + 1..];
            } else {
                *input = "";
            }
            continue;
        }
        if *input == before {
            break;
        }
    }
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

/// Names, attribute names and identities. No `-`: it separates key segments.
fn parse_identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched.parse::<f64>().map_err(|_| backtrack())
}

/// Quoted string with `\"`, `\\` and `\n` escapes.
fn parse_string(input: &mut &str) -> ModalResult<String> {
    let _ = '"'.parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk: &str = take_till(0.., |c: char| c == '"' || c == '\\').parse_next(input)?;
        out.push_str(chunk);

        let mut chars = input.chars();
        match chars.next() {
            Some('"') => {
                *input = &input[1..];
                return Ok(out);
            }
            Some('\\') => {
                let escaped = chars.next().ok_or_else(backtrack)?;
                out.push(if escaped == 'n' { '\n' } else { escaped });
                *input = &input[1 + escaped.len_utf8()..];
            }
            // Unterminated string.
            _ => return Err(backtrack()),
        }
    }
}

fn parse_attr_value(input: &mut &str) -> ModalResult<AttrValue> {
    if input.starts_with('"') {
        return parse_string.map(AttrValue::Str).parse_next(input);
    }
    if input.starts_with("true") {
        *input = &input[4..];
        return Ok(AttrValue::Bool(true));
    }
    if input.starts_with("false") {
        *input = &input[5..];
        return Ok(AttrValue::Bool(false));
    }
    parse_number.map(AttrValue::Number).parse_next(input)
}

fn parse_attrs(input: &mut &str, attrs: &mut Attrs) -> ModalResult<()> {
    let _ = '('.parse_next(input)?;
    skip_ws_and_comments(input);

    while !input.starts_with(')') {
        let name = parse_identifier.parse_next(input)?;
        skip_ws_and_comments(input);
        let _ = '='.parse_next(input)?;
        skip_ws_and_comments(input);
        let value = parse_attr_value(input)?;
        attrs.insert(name.to_string(), value);

        skip_ws_and_comments(input);
        if input.starts_with(',') {
            *input = &input[1..];
            skip_ws_and_comments(input);
        } else if !input.starts_with(')') {
            return Err(backtrack());
        }
    }

    let _ = ')'.parse_next(input)?;
    Ok(())
}

// ─── Tree parser ─────────────────────────────────────────────────────────

/// Comma-separated child slots, up to a closing `]` or the end of input.
/// A trailing comma is allowed.
fn parse_children(input: &mut &str) -> ModalResult<Tree> {
    let mut children = Vec::new();
    skip_ws_and_comments(input);

    while !input.is_empty() && !input.starts_with(']') {
        children.push(parse_child(input)?);
        skip_ws_and_comments(input);
        if input.starts_with(',') {
            *input = &input[1..];
            skip_ws_and_comments(input);
        } else {
            break;
        }
    }

    Ok(children)
}

fn parse_child(input: &mut &str) -> ModalResult<Child> {
    if input.starts_with('"') {
        return parse_string.map(Child::Text).parse_next(input);
    }

    let name = parse_identifier.parse_next(input)?;
    if name == "_" {
        return Ok(Child::Empty);
    }

    let ty = if name.starts_with(|c: char| c.is_uppercase()) {
        ElementType::Component(name.to_string())
    } else {
        ElementType::Intrinsic(name.to_string())
    };
    let mut node = Node::new(ty);

    if input.starts_with('#') {
        let identity = preceded('#', parse_identifier).parse_next(input)?;
        node.identity = Some(identity.to_string());
    }

    if input.starts_with('(') {
        parse_attrs(input, &mut node.attrs)?;
    }

    let checkpoint = *input;
    skip_ws_and_comments(input);
    if input.starts_with('[') {
        *input = &input[1..];
        node.children = parse_children(input)?;
        skip_ws_and_comments(input);
        let _ = ']'.parse_next(input)?;
    } else {
        *input = checkpoint;
    }

    Ok(Child::Element(Rc::new(node)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_elements_with_identities() {
        let tree = parse_tree("div#A[button#b1, span#s1], div#B[]").unwrap();
        assert_eq!(tree.len(), 2);

        let a = tree[0].as_node().unwrap();
        assert_eq!(a.ty, ElementType::Intrinsic("div".into()));
        assert_eq!(a.identity.as_deref(), Some("A"));
        let ids: Vec<_> = a
            .element_children()
            .map(|n| n.identity.clone().unwrap())
            .collect();
        assert_eq!(ids, ["b1", "s1"]);

        let b = tree[1].as_node().unwrap();
        assert!(b.children.is_empty());
    }

    #[test]
    fn parses_text_empty_and_components() {
        let tree = parse_tree(r#""hello", _, Card#c1"#).unwrap();
        assert_eq!(tree[0], Child::text("hello"));
        assert_eq!(tree[1], Child::Empty);
        let card = tree[2].as_node().unwrap();
        assert_eq!(card.ty, ElementType::Component("Card".into()));
    }

    #[test]
    fn parses_attributes() {
        let node =
            parse_node(r#"input(type="text", size=12, disabled=false, ratio=-0.5)"#).unwrap();
        assert_eq!(node.attrs["type"], AttrValue::Str("text".into()));
        assert_eq!(node.attrs["size"], AttrValue::Number(12.0));
        assert_eq!(node.attrs["disabled"], AttrValue::Bool(false));
        assert_eq!(node.attrs["ratio"], AttrValue::Number(-0.5));
    }

    #[test]
    fn parses_escapes() {
        let tree = parse_tree(r#""say \"hi\"\n""#).unwrap();
        assert_eq!(tree[0], Child::text("say \"hi\"\n"));
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let input = r#"
// toolbar
section#bar [
  button#ok,   // primary
  button#cancel,
]
"#;
        let tree = parse_tree(input).unwrap();
        let bar = tree[0].as_node().unwrap();
        assert_eq!(bar.children.len(), 2);
    }

    #[test]
    fn empty_input_is_an_empty_tree() {
        assert_eq!(parse_tree("   ").unwrap(), Vec::<Child>::new());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_tree("div[span").is_err());
        assert!(parse_tree(r#""unterminated"#).is_err());
        assert!(parse_tree("div] span").is_err());
        assert!(parse_tree("input(type)").is_err());
        assert!(parse_node("div, span").is_err());
    }

    #[test]
    fn identities_cannot_contain_the_key_separator() {
        // `a-b` would key as `R-a-b`, the same as child `b` of `R-a`.
        assert!(parse_tree("div#a-b").is_err());
        let node = parse_node("div#a_b").unwrap();
        assert_eq!(node.identity.as_deref(), Some("a_b"));
    }
}
