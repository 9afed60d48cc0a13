//! Canonical printing of type trees.

use super::{Brackets, Position, Separator, TypeNode};

/// Print a type tree with canonical spacing.
pub fn stringify(node: &TypeNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_list(nodes: &[TypeNode], separator: &str, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        write_node(node, out);
    }
}

fn write_quoted(value: &str, quote: Option<char>, out: &mut String) {
    match quote {
        Some(q) => {
            out.push(q);
            out.push_str(value);
            out.push(q);
        }
        None => out.push_str(value),
    }
}

fn write_node(node: &TypeNode, out: &mut String) {
    match node {
        TypeNode::Name { value } => out.push_str(value),
        TypeNode::Union { elements } => write_list(elements, " | ", out),
        TypeNode::Intersection { elements } => write_list(elements, " & ", out),
        TypeNode::Generic {
            left,
            elements,
            meta,
        } => match meta.brackets {
            Brackets::Square => {
                write_list(elements, ", ", out);
                out.push_str("[]");
            }
            Brackets::Angle => {
                write_node(left, out);
                out.push_str(if meta.dot { ".<" } else { "<" });
                write_list(elements, ", ", out);
                out.push('>');
            }
        },
        TypeNode::Nullable { element, meta } => write_modifier("?", element, meta.position, out),
        TypeNode::NotNullable { element, meta } => {
            write_modifier("!", element, meta.position, out)
        }
        TypeNode::Optional { element, meta } => write_modifier("=", element, meta.position, out),
        TypeNode::Variadic { element, meta } => match element {
            None => out.push_str("..."),
            Some(element) if meta.square_brackets => {
                out.push_str("...[");
                write_node(element, out);
                out.push(']');
            }
            Some(element) => write_modifier(
                "...",
                element,
                meta.position.unwrap_or(Position::Prefix),
                out,
            ),
        },
        TypeNode::Any => out.push('*'),
        TypeNode::Unknown => out.push('?'),
        TypeNode::Null => out.push_str("null"),
        TypeNode::Undefined => out.push_str("undefined"),
        TypeNode::StringValue { value, meta } => {
            write_quoted(value, Some(meta.quote.as_char()), out)
        }
        TypeNode::Number { value } => out.push_str(&value.to_string()),
        TypeNode::Function {
            parameters,
            return_type,
            arrow,
            parenthesis,
        } => {
            if *arrow {
                out.push('(');
                write_list(parameters, ", ", out);
                out.push_str(") => ");
                if let Some(return_type) = return_type {
                    write_node(return_type, out);
                }
                return;
            }
            out.push_str("function");
            if *parenthesis {
                out.push('(');
                write_list(parameters, ", ", out);
                out.push(')');
            }
            if let Some(return_type) = return_type {
                out.push_str(": ");
                write_node(return_type, out);
            }
        }
        TypeNode::Object { elements, meta } => {
            let separator = match meta.separator {
                Some(Separator::Semicolon) | Some(Separator::Linebreak) => "; ",
                Some(Separator::Comma) | None => ", ",
            };
            out.push('{');
            write_list(elements, separator, out);
            out.push('}');
        }
        TypeNode::ObjectField {
            key,
            right,
            optional,
            readonly,
            meta,
        } => {
            if *readonly {
                out.push_str("readonly ");
            }
            write_quoted(key, meta.quote.map(|q| q.as_char()), out);
            if *optional {
                out.push('?');
            }
            if let Some(right) = right {
                out.push_str(": ");
                write_node(right, out);
            }
        }
        TypeNode::KeyValue {
            key,
            right,
            optional,
            variadic,
        } => {
            if *variadic {
                out.push_str("...");
            }
            out.push_str(key);
            if *optional {
                out.push('?');
            }
            if let Some(right) = right {
                out.push_str(": ");
                write_node(right, out);
            }
        }
        TypeNode::Parenthesis { element } => {
            out.push('(');
            write_node(element, out);
            out.push(')');
        }
        TypeNode::Tuple { elements } => {
            out.push('[');
            write_list(elements, ", ", out);
            out.push(']');
        }
        TypeNode::Typeof { element } => {
            out.push_str("typeof ");
            write_node(element, out);
        }
        TypeNode::Keyof { element } => {
            out.push_str("keyof ");
            write_node(element, out);
        }
        TypeNode::NamePath {
            left,
            right,
            path_type,
        } => {
            write_node(left, out);
            out.push(path_type.separator());
            write_node(right, out);
        }
        TypeNode::Property { value, meta } => {
            write_quoted(value, meta.quote.map(|q| q.as_char()), out)
        }
        TypeNode::SpecialNamePath {
            value,
            special_type,
        } => {
            out.push_str(special_type.as_str());
            out.push(':');
            out.push_str(value);
        }
    }
}

fn write_modifier(symbol: &str, element: &TypeNode, position: Position, out: &mut String) {
    match position {
        Position::Prefix => {
            out.push_str(symbol);
            write_node(element, out);
        }
        Position::Suffix => {
            write_node(element, out);
            out.push_str(symbol);
        }
    }
}
