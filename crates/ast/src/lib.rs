pub mod ast;
pub mod hir;
pub mod scope;
pub mod trivia;
