use thiserror::Error;

use crate::parsing::rpn::{self, RpnTerminal};
use crate::parsing::{DerivationStep, GrammarConflictError, GrammarError, ScanError, SyntaxError};

/// Any failure of the pipeline, from loading a grammar to parsing a program.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("lexical error: {0}")]
    Lexical(#[from] ScanError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Conflict(#[from] GrammarConflictError),
}

/// Tokenize and parse `text` against the built-in grammar.
///
/// ```
/// use rpn_ll1::{check, Error};
///
/// assert!(check("(5 3 + A)\n(A 2 ^)").is_ok());
/// assert!(matches!(check("(5 3 + a)"), Err(Error::Lexical(_))));
/// assert!(matches!(check("((A B + C)"), Err(Error::Syntax(_))));
/// ```
pub fn check(text: &str) -> Result<Vec<DerivationStep<RpnTerminal>>, Error> {
    let tokens = rpn::tokenize(text)?;
    Ok(rpn::parse(&tokens).into_result()?)
}
