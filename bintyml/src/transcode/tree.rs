//! Syntax tree outline: one line per node, indented two spaces per level.
//! Leaf nodes show their decoded text and source position.
//!
//! ```text
//! ObjectValue
//!   Pair
//!     Key
//!       Identifier "port" 1:1
//!     NumberValue 8080 1:7
//! ```

use libtyml::{Node, Value};

/// Render the outline of a parsed document.
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    value.walk(|node, depth| {
        let detail = match node {
            Node::String(s) => format!(" {:?} {}", s.value, s.token.position),
            Node::Identifier(i) => format!(" {:?} {}", i.value, i.token.position),
            Node::Number(n) => format!(" {} {}", n.value, n.token.position),
            Node::Object(_) | Node::Pair(_) | Node::Key(_) => String::new(),
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.name());
        out.push_str(&detail);
        out.push('\n');
    });
    out
}
