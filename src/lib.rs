//! An LL(1) engine (lexer, FIRST/FOLLOW solvers, parsing table builder and predictive parser)
//! together with the parenthesized reverse-Polish language it was written for.
pub mod error;
pub mod parsing;

pub use error::{check, Error};
