use std::io::{self, Write};

use ast::hir::{Context, Val};
use errors::AtomError;
use parser::parse;

mod builtins;
mod eval;
mod forms;

pub use builtins::global_scope;
pub use eval::{apply, eval};

#[cfg(test)]
mod test;

/// Runs a program, printing to stdout.
pub fn run_on_src<S>(src: S) -> Result<Val, AtomError>
where
    S: AsRef<str>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(src, &mut out)
}

/// Runs a program in a fresh child of the global scope, so top-level
/// definitions never outlive the run.
pub fn run_with_output<S>(src: S, out: &mut dyn Write) -> Result<Val, AtomError>
where
    S: AsRef<str>,
{
    let expr = parse(src)?;

    let scope = global_scope().child();
    let mut ctx = Context::new(out);
    let exec = eval(&mut ctx, &scope, &expr);

    scope.release();
    Ok(exec?)
}
