use ast::{hir::Context, trivia::Range};
use errors::{AtomError, ErrorKind, InterpretingError};
use indoc::indoc;
use insta::assert_snapshot;
use parser::parse;

use crate::{apply, eval, global_scope, run_with_output};

/// Printed lines in brackets, then either the value or the error.
fn e(s: &str) -> String {
    let mut out: Vec<u8> = Vec::new();
    let res = run_with_output(s, &mut out);
    let printed = String::from_utf8(out).unwrap();
    let printed = printed.lines().collect::<Vec<_>>().join(", ");

    match res {
        Ok(o) => format!("[{printed}] => {o}"),
        Err(e) => format!("[{printed}] !! {e}"),
    }
}

fn kind(s: &str) -> ErrorKind {
    run_with_output(s, &mut Vec::<u8>::new()).unwrap_err().kind()
}

#[test]
fn test_literals() {
    assert_snapshot!(e("1"), @"[] => 1");
    assert_snapshot!(e(r#""hi there""#), @"[] => hi there");
    assert_snapshot!(e("true"), @"[] => true");
    assert_snapshot!(e("  # nothing but a number\n 42 "), @"[] => 42");
}

#[test]
fn test_truthiness() {
    assert_snapshot!(e(r#"if(0, print("a"), print("b"))"#), @"[a] => a");
    assert_snapshot!(e(r#"if("", "yes", "no")"#), @"[] => yes");
    assert_snapshot!(e(r#"if(array(), "yes", "no")"#), @"[] => yes");
    assert_snapshot!(e(r#"if(false, "yes", "no")"#), @"[] => no");
    assert_snapshot!(e(r#"if(==(1, 2), "yes", "no")"#), @"[] => no");
}

#[test]
fn test_while() {
    assert_snapshot!(e("while(false, print(1))"), @"[] => false");
    assert_snapshot!(
        e("do(define(i, 0), while(<(i, 3), do(print(i), set(i, +(i, 1)))), i)"),
        @"[0, 1, 2] => 3"
    );
    assert_snapshot!(
        e("do(define(i, 0), while(<(i, 3), set(i, +(i, 1))))"),
        @"[] => false"
    );
}

#[test]
fn test_do() {
    assert_snapshot!(e("do()"), @"[] => false");
    assert_snapshot!(e("do(print(1), print(2), 3)"), @"[1, 2] => 3");
    assert_snapshot!(e("do(do(define(z, 1)), z)"), @"[] => 1");
}

#[test]
fn test_define_and_set() {
    assert_snapshot!(e("define(x, 5)"), @"[] => 5");
    assert_snapshot!(
        e("do(define(x,10), define(f, func(x, x)), print(f(1)), print(x))"),
        @"[1, 10] => 10"
    );
    assert_snapshot!(
        e("do(define(x,10), define(setX, func(v, set(x,v))), setX(20), print(x))"),
        @"[20] => 20"
    );
    assert_snapshot!(
        e("do(define(x, 10), define(f, func(do(define(x, 1), x))), f(), x)"),
        @"[] => 10"
    );
    assert_snapshot!(e("set(y, 1)"), @"[] !! interpreting failed: unbound reference `y`");
    assert_snapshot!(
        e("set(print, 1)"),
        @"[] !! interpreting failed: `print` is a global and cannot be set"
    );
    assert_snapshot!(e(r#"do(define(true, false), if(true, "yes", "no"))"#), @"[] => no");
}

#[test]
fn test_func() {
    assert_snapshot!(
        e("do(define(f, func(a, func(b, +(a,b)))), print(f(4)(5)))"),
        @"[9] => 9"
    );
    assert_snapshot!(
        e("do(define(plusOne, func(a, +(a, 1))), print(plusOne(10)))"),
        @"[11] => 11"
    );
    assert_snapshot!(
        e("do(define(mk, func(n, func(n))), define(c, mk(7)), c())"),
        @"[] => 7"
    );
    assert_snapshot!(e("do(define(f, func(a, a, a)), f(1, 2))"), @"[] => 2");
    assert_snapshot!(e("func(a, b, a)"), @"[] => <func(a, b)>");
    assert_snapshot!(e("print(+)"), @"[<builtin +>] => <builtin +>");
    assert_snapshot!(
        e(indoc! {r#"
            do(define(pow, func(base, exp,
                if(==(exp, 0),
                1,
                *(base, pow(base, -(exp, 1)))))),
                print(pow(2, 10)))
        "#}),
        @"[1024] => 1024"
    );
}

#[test]
fn test_special_forms_win() {
    assert_snapshot!(e("do(define(if, 1), if(true, 1, 2))"), @"[] => 1");
}

#[test]
fn test_argument_order() {
    assert_snapshot!(e("+(print(1), print(2))"), @"[1, 2] => 3");
}

#[test]
fn test_builtins() {
    assert_snapshot!(e("/(1, 2)"), @"[] => 0.5");
    assert_snapshot!(e("-(1, 3)"), @"[] => -2");
    assert_snapshot!(e("*(6, 7)"), @"[] => 42");
    assert_snapshot!(e("/(1, 0)"), @"[] => Infinity");
    assert_snapshot!(e(r#"==("a", "a")"#), @"[] => true");
    assert_snapshot!(e(r#"==(1, "1")"#), @"[] => false");
    assert_snapshot!(e("==(array(1, 2), array(1, 2))"), @"[] => true");
    assert_snapshot!(e(r#"<("a", "b")"#), @"[] => true");
    assert_snapshot!(e(">(3, 2)"), @"[] => true");
    assert_snapshot!(e(">(2, 2)"), @"[] => false");
    assert_snapshot!(
        e("+(1)"),
        @"[] !! interpreting failed: `+` takes 2 argument(s) but got 1"
    );
    assert_snapshot!(
        e(r#"+(1, "a")"#),
        @"[] !! interpreting failed: expected one of (Number) but got String"
    );
    assert_snapshot!(
        e(r#"<(1, "a")"#),
        @"[] !! interpreting failed: expected one of (Number) but got String"
    );
}

#[test]
fn test_arrays() {
    assert_snapshot!(
        e(indoc! {"
            do(define(arr, array(1,2,3)),
                print(arr),
                print(length(arr)),
                print(element(arr, 0)))
        "}),
        @"[[1, 2, 3], 3, 1] => 1"
    );
    assert_snapshot!(e(r#"print(array("a", 1))"#), @r#"[["a", 1]] => ["a", 1]"#);
    assert_snapshot!(e(r#"element("abc", 1)"#), @"[] => b");
    assert_snapshot!(e(r#"length("abc")"#), @"[] => 3");
    assert_snapshot!(e("length(array())"), @"[] => 0");
    assert_snapshot!(
        e("element(array(1), 5)"),
        @"[] !! interpreting failed: index 5 is out of range for length 1"
    );
    assert_snapshot!(
        e("element(array(1), /(1, 2))"),
        @"[] !! interpreting failed: index 0.5 is out of range for length 1"
    );
    assert_snapshot!(
        e(r#"element(array(1), "0")"#),
        @"[] !! interpreting failed: expected one of (Number) but got String"
    );
    assert_snapshot!(
        e("length(1)"),
        @"[] !! interpreting failed: expected one of (Array, String) but got Number"
    );
}

#[test]
fn test_errors() {
    assert_snapshot!(e("x"), @"[] !! interpreting failed: unbound reference `x`");
    assert_snapshot!(
        e("do(define(f, func(a, a)), f(1, 2))"),
        @"[] !! interpreting failed: `f` takes 1 argument(s) but got 2"
    );
    assert_snapshot!(
        e("do(define(f, func(a, func(b, b))), f(1)())"),
        @"[] !! interpreting failed: `func` takes 1 argument(s) but got 0"
    );
    assert_snapshot!(
        e("1(2)"),
        @"[] !! interpreting failed: cannot apply a value of type Number"
    );
    assert_snapshot!(
        e("if(true, 1)"),
        @"[] !! interpreting failed: bad use of `if`: expected exactly 3 arguments"
    );
    assert_snapshot!(
        e("while(true)"),
        @"[] !! interpreting failed: bad use of `while`: expected exactly 2 arguments"
    );
    assert_snapshot!(
        e("define(1, 2)"),
        @"[] !! interpreting failed: bad use of `define`: expected a word as the first argument"
    );
    assert_snapshot!(
        e("func()"),
        @"[] !! interpreting failed: bad use of `func`: expected a body"
    );
    assert_snapshot!(
        e("func(1, x)"),
        @"[] !! interpreting failed: bad use of `func`: expected parameter names to be words"
    );
    assert_snapshot!(
        e("do(print(1), x, print(2))"),
        @"[1] !! interpreting failed: unbound reference `x`"
    );
}

#[test]
fn test_error_kinds() {
    assert_eq!(kind("f(a b)"), ErrorKind::Parse);
    assert_eq!(kind("do(1) 2"), ErrorKind::Parse);
    assert_eq!(kind("set(1, 2)"), ErrorKind::Syntax);
    assert_eq!(kind("nope"), ErrorKind::Unbound);
    assert_eq!(kind(r#""s"(1)"#), ErrorKind::Type);
    assert_eq!(kind("do(define(f, func(a, a)), f())"), ErrorKind::Type);

    let err = run_with_output("do(define(f, func(a, a)), f())", &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(
        err,
        AtomError::InterpretingError(InterpretingError::ArityError(_))
    ));
}

#[test]
fn test_report() {
    let src = "do(x)";
    let err = run_with_output(src, &mut Vec::<u8>::new()).unwrap_err();
    let report = err.to_report(src);

    assert!(report.contains("atom.eval.lookup_err"));
    assert!(report.contains("no frame binds `x`"));
}

#[test]
fn test_runs_are_isolated() {
    assert_snapshot!(e("define(leak, 1)"), @"[] => 1");
    assert_snapshot!(e("leak"), @"[] !! interpreting failed: unbound reference `leak`");
}

#[test]
fn test_concurrent_runs() {
    std::thread::scope(|s| {
        for i in 0..4 {
            s.spawn(move || {
                let src = format!("do(define(n, {i}), set(n, +(n, 1)), n)");
                let mut out: Vec<u8> = Vec::new();
                let val = run_with_output(src, &mut out).unwrap();
                assert_eq!(val.to_string(), (i + 1).to_string());
            });
        }
    });
}

#[test]
fn test_call_frames_are_freed() {
    let program = parse(indoc! {"
        do(
          define(mk, func(n, do(
            define(down, func(k, if(<(k, 1), n, down(-(k, 1))))),
            down(n)))),
          define(i, 0),
          while(<(i, 5), do(set(i, +(i, 1)), mk(i))),
          mk(3))
    "})
    .unwrap();

    let run = global_scope().child();
    let mut out: Vec<u8> = Vec::new();
    let val = eval(&mut Context::new(&mut out), &run, &program).unwrap();
    assert_eq!(val.to_string(), "3");

    // this handle and `mk`; no call frame kept its parent alive
    assert_eq!(run.holders(), 2);

    let weak = run.downgrade();
    run.release();
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_escaped_closure_outlives_run() {
    let mut out: Vec<u8> = Vec::new();
    let f = run_with_output("do(define(k, 7), define(f, func(k)), f)", &mut out).unwrap();

    let val = apply(&mut Context::new(&mut out), &f, &[], "f", Range::new(0, 0)).unwrap();
    assert_eq!(val.to_string(), "7");
}
