use archery::ArcK;
use errors::InterpretingError;
use rpds::Vector;
use smol_str::SmolStr;
use std::{fmt, io::Write, sync::Arc};

use crate::{
    ast::TNode,
    scope::Scope,
    trivia::{Range, Trivia},
};

/// Per-run state handed to every builtin. `print` writes here.
pub struct Context<'o> {
    pub out: &'o mut dyn Write,
}

impl<'o> Context<'o> {
    pub fn new(out: &'o mut dyn Write) -> Self {
        Self { out }
    }
}

pub type RFunc = Result<Val, InterpretingError>;
pub type NativeApply = fn(&mut Context<'_>, Range, &[Val]) -> RFunc;

#[derive(Clone, Debug)]
pub struct NativeFunction {
    pub name: SmolStr,
    pub apply: NativeApply,
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

pub struct Closure {
    pub params: Vec<Trivia<SmolStr>>,
    pub body: TNode,
    pub scope: Scope,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the captured scope may contain this very closure
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

pub type Array = Vector<Val, ArcK>;

#[derive(Clone, Debug)]
pub enum Val {
    Bool(bool),
    Number(f64),
    String(SmolStr),
    Array(Array),
    Closure(Arc<Closure>),
    NativeFunction(NativeFunction),
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Bool(l), Val::Bool(r)) => l == r,
            (Val::Number(l), Val::Number(r)) => l == r,
            (Val::String(l), Val::String(r)) => l == r,
            (Val::Array(l), Val::Array(r)) => l == r,
            (Val::Closure(l), Val::Closure(r)) => Arc::ptr_eq(l, r),
            (Val::NativeFunction(l), Val::NativeFunction(r)) => l == r,
            _ => false,
        }
    }
}

impl Val {
    /// `false` doubles as the "no result" value.
    pub const NOTHING: Val = Val::Bool(false);

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Val::Bool(false))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Val::Closure(_) | Val::NativeFunction(_))
    }

    pub fn to_readable_type(&self) -> SmolStr {
        match self {
            Val::Bool(_) => "Bool",
            Val::Number(_) => "Number",
            Val::String(_) => "String",
            Val::Array(_) => "Array",
            Val::Closure(_) => "Func",
            Val::NativeFunction(_) => "Builtin",
        }
        .into()
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::String(str) => write!(f, "\"{str}\""),
            v => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Bool(bool) => write!(f, "{bool}"),
            Val::Number(number) => f.write_str(&format_number(*number)),
            Val::String(str) => f.write_str(str),
            Val::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Val::Closure(closure) => {
                let params = closure
                    .params
                    .iter()
                    .map(|p| p.inner.as_str())
                    .collect::<Vec<_>>();
                write!(f, "<func({})>", params.join(", "))
            }
            Val::NativeFunction(NativeFunction { name, .. }) => write!(f, "<builtin {name}>"),
        }
    }
}

pub fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".into()
    } else if number.is_infinite() {
        let sign = if number > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if number == 0.0 {
        "0".into()
    } else {
        format!("{number}")
    }
}
