use std::sync::Arc;

use ast::{
    ast::TNode,
    hir::{Closure, Context, Val},
    scope::Scope,
    trivia::{new, Range},
};
use errors::{FormError, InterpretingError};
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::eval::{bind_error, eval};

type Res = Result<Val, InterpretingError>;

/// Special forms get their arguments unevaluated.
pub type Form = fn(&mut Context<'_>, &Scope, &[TNode], Range) -> Res;

lazy_static! {
    static ref FORMS: FxHashMap<&'static str, Form> = {
        let mut forms: FxHashMap<&'static str, Form> = FxHashMap::default();
        forms.insert("if", eval_if);
        forms.insert("while", eval_while);
        forms.insert("do", eval_do);
        forms.insert("define", eval_define);
        forms.insert("set", eval_set);
        forms.insert("func", eval_func);
        forms
    };
}

pub fn lookup(name: &str) -> Option<Form> {
    FORMS.get(name).copied()
}

fn form_error(form: &str, expected: &str, span: Range) -> InterpretingError {
    InterpretingError::FormError(FormError {
        start: span.start,
        end: span.end,
        form: form.into(),
        expected: expected.into(),
    })
}

fn eval_if(ctx: &mut Context<'_>, scope: &Scope, args: &[TNode], span: Range) -> Res {
    let [predicate, then, otherwise] = args else {
        return Err(form_error("if", "exactly 3 arguments", span));
    };

    if eval(ctx, scope, predicate)?.is_truthy() {
        eval(ctx, scope, then)
    } else {
        eval(ctx, scope, otherwise)
    }
}

fn eval_while(ctx: &mut Context<'_>, scope: &Scope, args: &[TNode], span: Range) -> Res {
    let [predicate, body] = args else {
        return Err(form_error("while", "exactly 2 arguments", span));
    };

    while eval(ctx, scope, predicate)?.is_truthy() {
        eval(ctx, scope, body)?;
    }

    Ok(Val::NOTHING)
}

fn eval_do(ctx: &mut Context<'_>, scope: &Scope, args: &[TNode], _span: Range) -> Res {
    let mut value = Val::NOTHING;
    for arg in args {
        value = eval(ctx, scope, arg)?;
    }

    Ok(value)
}

/// Shape shared by `define` and `set`: a word and the expression to bind.
fn binding<'a>(
    form: &str,
    args: &'a [TNode],
    span: Range,
) -> Result<(&'a SmolStr, Range, &'a TNode), InterpretingError> {
    match args {
        [target, value] => match target.inner.as_word() {
            Some(name) => Ok((name, target.span, value)),
            None => Err(form_error(form, "a word as the first argument", target.span)),
        },
        _ => Err(form_error(form, "exactly 2 arguments", span)),
    }
}

fn eval_define(ctx: &mut Context<'_>, scope: &Scope, args: &[TNode], span: Range) -> Res {
    let (name, name_span, value) = binding("define", args, span)?;

    let value = eval(ctx, scope, value)?;
    scope
        .define(name.clone(), value.clone())
        .map_err(|e| bind_error(e, name, name_span))?;

    Ok(value)
}

fn eval_set(ctx: &mut Context<'_>, scope: &Scope, args: &[TNode], span: Range) -> Res {
    let (name, name_span, value) = binding("set", args, span)?;

    let value = eval(ctx, scope, value)?;
    scope
        .set(name, value.clone())
        .map_err(|e| bind_error(e, name, name_span))?;

    Ok(value)
}

fn eval_func(_ctx: &mut Context<'_>, scope: &Scope, args: &[TNode], span: Range) -> Res {
    let Some((body, params)) = args.split_last() else {
        return Err(form_error("func", "a body", span));
    };

    let params = params
        .iter()
        .map(|param| match param.inner.as_word() {
            Some(name) => Ok(new(name.clone(), param.span)),
            None => Err(form_error("func", "parameter names to be words", param.span)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Val::Closure(Arc::new(Closure {
        params,
        body: body.clone(),
        scope: scope.clone(),
    })))
}
