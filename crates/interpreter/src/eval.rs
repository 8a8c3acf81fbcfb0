use ast::{
    ast::{Literal, Node, TNode},
    hir::{Closure, Context, NativeFunction, Val},
    scope::{BindError, Scope},
    trivia::Range,
};
use errors::{ArityError, FuncError, InterpretingError, LookupError, SealedError};
use smol_str::SmolStr;

use crate::forms;

type Res = Result<Val, InterpretingError>;

pub fn eval(ctx: &mut Context<'_>, scope: &Scope, node: &TNode) -> Res {
    tracing::trace!(span = ?node.span, "eval");
    match &*node.inner {
        Node::Literal(literal) => Ok(eval_literal(literal)),
        Node::Word(name) => eval_word(scope, name, node.span),
        Node::Apply(operator, args) => eval_apply(ctx, scope, operator, args, node.span),
    }
}

fn eval_literal(literal: &Literal) -> Val {
    match literal {
        Literal::String(string) => Val::String(string.clone()),
        Literal::Number(number) => Val::Number(*number),
    }
}

fn eval_word(scope: &Scope, name: &SmolStr, span: Range) -> Res {
    scope
        .find(name)
        .ok_or_else(|| bind_error(BindError::Unbound, name, span))
}

fn eval_apply(
    ctx: &mut Context<'_>,
    scope: &Scope,
    operator: &TNode,
    args: &[TNode],
    outer_span: Range,
) -> Res {
    if let Some(name) = operator.inner.as_word() {
        if let Some(form) = forms::lookup(name) {
            tracing::debug!(form = %name, "special form");
            return form(ctx, scope, args, outer_span);
        }
    }

    let func = eval(ctx, scope, operator)?;
    if !func.is_callable() {
        return Err(InterpretingError::FuncError(FuncError {
            outer_start: outer_span.start,
            outer_end: outer_span.end,
            func_start: operator.span.start,
            func_end: operator.span.end,
            func_type: func.to_readable_type(),
        }));
    }

    let args = args
        .iter()
        .map(|arg| eval(ctx, scope, arg))
        .collect::<Result<Vec<_>, _>>()?;

    let name = match operator.inner.as_word() {
        Some(name) => name.clone(),
        None => "func".into(),
    };

    apply(ctx, &func, &args, &name, outer_span)
}

/// Calls an already evaluated function value. `name` is only used to label
/// arity errors.
pub fn apply(ctx: &mut Context<'_>, func: &Val, args: &[Val], name: &str, span: Range) -> Res {
    match func {
        Val::Closure(closure) => call_closure(ctx, closure, args, name, span),
        Val::NativeFunction(NativeFunction { apply, .. }) => apply(ctx, span, args),
        v => Err(InterpretingError::FuncError(FuncError {
            outer_start: span.start,
            outer_end: span.end,
            func_start: span.start,
            func_end: span.end,
            func_type: v.to_readable_type(),
        })),
    }
}

fn call_closure(
    ctx: &mut Context<'_>,
    closure: &Closure,
    args: &[Val],
    name: &str,
    span: Range,
) -> Res {
    if args.len() != closure.params.len() {
        return Err(InterpretingError::ArityError(ArityError {
            start: span.start,
            end: span.end,
            name: name.into(),
            expected: closure.params.len(),
            found: args.len(),
        }));
    }

    tracing::debug!(func = %name, arity = args.len(), "calling closure");

    let frame = closure.scope.child();
    let exec = closure
        .params
        .iter()
        .zip(args)
        .try_for_each(|(param, arg)| {
            frame
                .define(param.inner.clone(), arg.clone())
                .map_err(|e| bind_error(e, &param.inner, param.span))
        })
        .and_then(|()| eval(ctx, &frame, &closure.body));

    frame.release();
    exec
}

pub(crate) fn bind_error(e: BindError, name: &SmolStr, span: Range) -> InterpretingError {
    match e {
        BindError::Unbound => InterpretingError::LookupError(LookupError {
            start: span.start,
            end: span.end,
            name: name.clone(),
        }),
        BindError::Sealed => InterpretingError::SealedError(SealedError {
            start: span.start,
            end: span.end,
            name: name.clone(),
        }),
    }
}
