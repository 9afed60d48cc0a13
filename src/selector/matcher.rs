//! Matching compiled selectors against JSON trees.
//!
//! Ancestry slices run from the outermost node to the direct parent, so `ancestry.last()` is
//! the parent of the node being tested.

use super::{AttributeValue, Combinator, Complex, Compound, Condition, Selector, Test};
use crate::tree::visitor_keys;
use serde_json::Value;

fn kind_of(node: &Value) -> Option<&str> {
    node.get("type")?.as_str()
}

/// Child nodes reachable through the traversal keys, in key order.
pub(super) fn children(node: &Value) -> Vec<&Value> {
    let Some(keys) = kind_of(node).and_then(visitor_keys) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for key in keys {
        match node.get(*key) {
            Some(Value::Array(items)) => found.extend(items.iter().filter(|item| item.is_object())),
            Some(child @ Value::Object(_)) => found.push(child),
            _ => {}
        }
    }
    found
}

/// Pre-order walk handing each node its ancestry.
pub(super) fn traverse<'a>(
    node: &'a Value,
    ancestry: &mut Vec<&'a Value>,
    visit: &mut impl FnMut(&'a Value, &[&'a Value]),
) {
    visit(node, ancestry);
    ancestry.push(node);
    for child in children(node) {
        traverse(child, ancestry, visit);
    }
    ancestry.pop();
}

pub(super) fn matches(node: &Value, selector: &Selector, ancestry: &[&Value]) -> bool {
    selector
        .alternatives
        .iter()
        .any(|complex| matches_complex(node, complex, complex.rest.len(), ancestry))
}

fn compound_at(complex: &Complex, index: usize) -> &Compound {
    match index {
        0 => &complex.head,
        _ => &complex.rest[index - 1].1,
    }
}

/// Match compound `index` against `node`, then walk left through the combinators.
fn matches_complex(node: &Value, complex: &Complex, index: usize, ancestry: &[&Value]) -> bool {
    if !matches_compound(node, compound_at(complex, index), ancestry) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match complex.rest[index - 1].0 {
        Combinator::Child => match ancestry.split_last() {
            Some((parent, above)) => matches_complex(parent, complex, index - 1, above),
            None => false,
        },
        Combinator::Descendant => (0..ancestry.len())
            .rev()
            .any(|i| matches_complex(ancestry[i], complex, index - 1, &ancestry[..i])),
    }
}

fn matches_compound(node: &Value, compound: &Compound, ancestry: &[&Value]) -> bool {
    if let Some(kind) = &compound.kind {
        if !kind_of(node).is_some_and(|k| k.eq_ignore_ascii_case(kind)) {
            return false;
        }
    }
    compound
        .tests
        .iter()
        .all(|test| passes(node, test, ancestry))
}

fn passes(node: &Value, test: &Test, ancestry: &[&Value]) -> bool {
    match test {
        Test::Attribute { path, condition } => {
            let value = lookup(node, path);
            match condition {
                None => value.is_some_and(|v| !v.is_null()),
                Some(condition) => compare(value, condition),
            }
        }
        Test::Has(selector) => has_descendant(node, selector),
        Test::Not(selector) => !matches(node, selector, ancestry),
        Test::Matches(selector) => matches(node, selector, ancestry),
        Test::NthChild(n) => sibling_position(node, ancestry).is_some_and(|(i, _)| i + 1 == *n),
        Test::NthLastChild(n) => {
            sibling_position(node, ancestry).is_some_and(|(i, len)| len - i == *n)
        }
        Test::Scope => ancestry.is_empty(),
    }
}

fn lookup<'a>(node: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(node, |current, segment| current.get(segment))
}

/// Text form of a scalar attribute; `None` for arrays and objects.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value {
        None => Some("undefined".to_string()),
        Some(Value::Null) => Some("null".to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        Some(Value::Array(_)) | Some(Value::Object(_)) => None,
    }
}

fn compare(value: Option<&Value>, condition: &Condition) -> bool {
    match &condition.value {
        AttributeValue::Literal(expected) => {
            let equal = scalar_text(value).is_some_and(|text| &text == expected);
            equal != condition.negated
        }
        AttributeValue::Pattern(regex) => match value {
            Some(Value::String(text)) => regex.is_match(text) != condition.negated,
            _ => false,
        },
    }
}

/// Any node below `node` matches, with ancestry rooted at `node`.
fn has_descendant(node: &Value, selector: &Selector) -> bool {
    let mut found = false;
    let mut ancestry = vec![node];
    for child in children(node) {
        traverse(child, &mut ancestry, &mut |candidate, above| {
            found = found || matches(candidate, selector, above);
        });
        if found {
            return true;
        }
    }
    false
}

/// 0-based index of `node` in its parent's child array, with the array length.
fn sibling_position(node: &Value, ancestry: &[&Value]) -> Option<(usize, usize)> {
    let parent = ancestry.last()?;
    let keys = kind_of(parent).and_then(visitor_keys)?;
    keys.iter().find_map(|key| match parent.get(*key) {
        Some(Value::Array(items)) => items
            .iter()
            .position(|item| std::ptr::eq(item, node))
            .map(|i| (i, items.len())),
        _ => None,
    })
}
