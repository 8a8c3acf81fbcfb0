use std::sync::Arc;

use smol_str::SmolStr;

use crate::{
    hir::format_number,
    trivia::{indent_buffer, Trivia, WithTrivia},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    String(SmolStr),
    Number(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Literal(Literal),
    Word(SmolStr),
    Apply(TNode, Vec<TNode>),
}

/// Nodes are shared rather than boxed so closures can hold on to their body
/// without copying the subtree.
pub type TNode = Trivia<Arc<Node>>;

impl Node {
    pub fn as_word(&self) -> Option<&SmolStr> {
        match self {
            Node::Word(name) => Some(name),
            _ => None,
        }
    }
}

impl WithTrivia for TNode {
    fn pretty_string(&self, indent: usize) -> String {
        let buffer = indent_buffer(indent);

        match &*self.inner {
            Node::Literal(Literal::String(str)) => {
                format!("{buffer}\"{str}\" {}..{}", self.span.start, self.span.end)
            }
            Node::Literal(Literal::Number(number)) => format!(
                "{buffer}{} {}..{}",
                format_number(*number),
                self.span.start,
                self.span.end
            ),
            Node::Word(name) => {
                tagged_pretty_string(name, "Word", self.span.start, self.span.end, indent)
            }
            Node::Apply(operator, args) => {
                let line = format!("{buffer}Apply {}..{}", self.span.start, self.span.end);
                let mut lines = vec![line, operator.pretty_string(indent + 2)];
                lines.extend(args.iter().map(|arg| arg.pretty_string(indent + 2)));

                lines.join("\n")
            }
        }
    }
}

pub fn tagged_pretty_string(
    s: &SmolStr,
    tag: &str,
    start: usize,
    end: usize,
    indent: usize,
) -> String {
    let buffer = indent_buffer(indent);
    format!("{buffer}{tag}({s}) {}..{}", start, end)
}
