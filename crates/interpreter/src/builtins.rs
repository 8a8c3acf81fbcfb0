use std::cmp::Ordering;

use ast::{
    hir::{format_number, Context, NativeFunction, RFunc, Val},
    scope::Scope,
    trivia::Range,
};
use errors::{IndexError, InterpretingError, OutputError, TypeError};
use lazy_static::lazy_static;
use native_derive::native;
use rpds::HashTrieMapSync;
use smol_str::SmolStr;

fn mismatch<V: AsRef<str>, I: IntoIterator<Item = V>>(
    span: Range,
    current: &Val,
    v_types: I,
) -> InterpretingError {
    InterpretingError::TypeError(TypeError {
        arg_start: span.start,
        arg_end: span.end,
        func_start: span.start,
        func_end: span.end,
        current_type: current.to_readable_type(),
        valid_types: v_types.into_iter().map(|x| x.as_ref().into()).collect(),
    })
}

fn type_error<V: AsRef<str>, I: IntoIterator<Item = V>>(
    span: Range,
    current: &Val,
    v_types: I,
) -> RFunc {
    Err(mismatch(span, current, v_types))
}

fn numbers(span: Range, l: &Val, r: &Val) -> Result<(f64, f64), InterpretingError> {
    match (l, r) {
        (Val::Number(lhs), Val::Number(rhs)) => Ok((*lhs, *rhs)),
        (Val::Number(_), v) | (v, _) => Err(mismatch(span, v, ["Number"])),
    }
}

fn compare(span: Range, l: &Val, r: &Val) -> Result<Option<Ordering>, InterpretingError> {
    match (l, r) {
        (Val::Number(lhs), Val::Number(rhs)) => Ok(lhs.partial_cmp(rhs)),
        (Val::String(lhs), Val::String(rhs)) => Ok(Some(lhs.cmp(rhs))),
        (Val::Number(_), v) => Err(mismatch(span, v, ["Number"])),
        (Val::String(_), v) => Err(mismatch(span, v, ["String"])),
        (v, _) => Err(mismatch(span, v, ["Number", "String"])),
    }
}

#[native(+)]
fn add(_ctx: &mut Context, span: Range, l: &Val, r: &Val) -> RFunc {
    let (lhs, rhs) = numbers(span, l, r)?;
    Ok(Val::Number(lhs + rhs))
}

#[native(-)]
fn sub(_ctx: &mut Context, span: Range, l: &Val, r: &Val) -> RFunc {
    let (lhs, rhs) = numbers(span, l, r)?;
    Ok(Val::Number(lhs - rhs))
}

#[native(*)]
fn mul(_ctx: &mut Context, span: Range, l: &Val, r: &Val) -> RFunc {
    let (lhs, rhs) = numbers(span, l, r)?;
    Ok(Val::Number(lhs * rhs))
}

#[native(/)]
fn div(_ctx: &mut Context, span: Range, l: &Val, r: &Val) -> RFunc {
    let (lhs, rhs) = numbers(span, l, r)?;
    Ok(Val::Number(lhs / rhs))
}

#[native(==)]
fn eq(_ctx: &mut Context, span: Range, l: &Val, r: &Val) -> RFunc {
    Ok(Val::Bool(l == r))
}

#[native(<)]
fn lt(_ctx: &mut Context, span: Range, l: &Val, r: &Val) -> RFunc {
    Ok(Val::Bool(compare(span, l, r)? == Some(Ordering::Less)))
}

#[native(>)]
fn gt(_ctx: &mut Context, span: Range, l: &Val, r: &Val) -> RFunc {
    Ok(Val::Bool(compare(span, l, r)? == Some(Ordering::Greater)))
}

#[native]
fn print(ctx: &mut Context, span: Range, value: &Val) -> RFunc {
    tracing::debug!(%value, "print");
    writeln!(ctx.out, "{value}").map_err(|e| {
        InterpretingError::OutputError(OutputError {
            start: span.start,
            end: span.end,
            message: e.to_string().into(),
        })
    })?;

    Ok(value.clone())
}

#[native]
fn length(_ctx: &mut Context, span: Range, seq: &Val) -> RFunc {
    match seq {
        Val::Array(items) => Ok(Val::Number(items.len() as f64)),
        Val::String(string) => Ok(Val::Number(string.chars().count() as f64)),
        v => type_error(span, v, ["Array", "String"]),
    }
}

#[native]
fn element(_ctx: &mut Context, span: Range, seq: &Val, n: &Val) -> RFunc {
    let Val::Number(index) = n else {
        return type_error(span, n, ["Number"]);
    };

    let length = match seq {
        Val::Array(items) => items.len(),
        Val::String(string) => string.chars().count(),
        v => return type_error(span, v, ["Array", "String"]),
    };

    let out_of_range = || {
        InterpretingError::IndexError(IndexError {
            start: span.start,
            end: span.end,
            index: format_number(*index).into(),
            length,
        })
    };

    // only whole, non-negative indices below the length address an element
    if index.fract() != 0.0 || *index < 0.0 || *index >= length as f64 {
        return Err(out_of_range());
    }

    let idx = *index as usize;
    match seq {
        Val::Array(items) => items.get(idx).cloned().ok_or_else(out_of_range),
        Val::String(string) => string
            .chars()
            .nth(idx)
            .map(|c| Val::String(SmolStr::from(c.to_string())))
            .ok_or_else(out_of_range),
        v => type_error(span, v, ["Array", "String"]),
    }
}

/// `array` is the only variadic builtin, so it skips the arity-checking macro.
fn array() -> (SmolStr, Val) {
    fn array(_ctx: &mut Context, _span: Range, params: &[Val]) -> RFunc {
        Ok(Val::Array(params.iter().cloned().collect()))
    }

    let nfunc = NativeFunction {
        name: "array".into(),
        apply: array,
    };

    ("array".into(), Val::NativeFunction(nfunc))
}

lazy_static! {
    static ref GLOBAL: Scope = {
        let mut bindings = HashTrieMapSync::new_sync();
        bindings.insert_mut(SmolStr::from("true"), Val::Bool(true));
        bindings.insert_mut(SmolStr::from("false"), Val::Bool(false));

        for func in [
            add, sub, mul, div, // arithmetic
            eq, lt, gt, // comparisons
            print, // output
            array, length, element, // arrays
        ] {
            let (name, f) = func();
            bindings.insert_mut(name, f);
        }

        Scope::sealed(bindings)
    };
}

/// The process-wide root frame. It is sealed: runs shadow it, never write it.
pub fn global_scope() -> Scope {
    GLOBAL.clone()
}
