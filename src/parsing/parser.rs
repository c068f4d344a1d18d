//! Table-driven predictive parsing of LL(1) grammars.
use log::trace;
use thiserror::Error;

use super::{Grammar, NonTerminalId, ParsingTable, ProductionId, Symbol, Terminal, TextPoint, Token};

/// One entry of a derivation trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DerivationStep<T> {
    /// The terminal on top of the stack matched the current token.
    Match {
        terminal: T,
        lexeme: String,
        position: TextPoint,
    },
    /// A nonterminal was replaced by one of its productions.
    Expand {
        nonterminal: NonTerminalId,
        production: ProductionId,
    },
}

impl<T: Terminal> DerivationStep<T> {
    pub fn describe(&self, grammar: &Grammar<T>) -> String {
        match self {
            DerivationStep::Match {
                terminal, lexeme, ..
            } => format!("match {} {:?}", terminal.name(), lexeme),
            DerivationStep::Expand { production, .. } => grammar.describe(*production),
        }
    }
}

/// Why a token sequence is not a sentence of the grammar. Parsing stops at the first one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error(
        "{position}: unexpected {found} {lexeme:?} while expanding `{nonterminal}`, expected one of: {}",
        .expected.join(", ")
    )]
    NoRule {
        nonterminal: String,
        found: &'static str,
        lexeme: String,
        position: TextPoint,
        expected: Vec<&'static str>,
    },

    #[error("{position}: expected {expected}, found {found} {lexeme:?}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
        lexeme: String,
        position: TextPoint,
    },

    #[error("{position}: input not fully consumed, {remaining} token(s) left starting with {found} {lexeme:?}")]
    TrailingInput {
        found: &'static str,
        lexeme: String,
        position: TextPoint,
        remaining: usize,
    },
}

impl SyntaxError {
    pub fn position(&self) -> TextPoint {
        match self {
            SyntaxError::NoRule { position, .. }
            | SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::TrailingInput { position, .. } => *position,
        }
    }

    /// Name of the terminal kind the parser choked on.
    pub fn found(&self) -> &'static str {
        match self {
            SyntaxError::NoRule { found, .. }
            | SyntaxError::UnexpectedToken { found, .. }
            | SyntaxError::TrailingInput { found, .. } => found,
        }
    }
}

/// The outcome of one parse: the derivation trace up to the point where parsing stopped, and the
/// error that stopped it, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResult<T> {
    pub derivation: Vec<DerivationStep<T>>,
    pub error: Option<SyntaxError>,
}

impl<T> ParseResult<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<DerivationStep<T>>, SyntaxError> {
        match self.error {
            None => Ok(self.derivation),
            Some(error) => Err(error),
        }
    }
}

/// A stack machine driven by a [`ParsingTable`]. Holds no state between parses, so a single
/// parser (or many parsers sharing one table) can be used from several threads at once.
///
/// # Example
///
/// ```
/// use rpn_ll1::parsing::{rpn, PredictiveParser};
///
/// let parser = PredictiveParser::new(rpn::default_table());
/// let tokens = rpn::tokenize("(15 3 /)").unwrap();
/// let result = parser.parse(&tokens);
/// assert!(result.is_success());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PredictiveParser<'t, T: Terminal> {
    table: &'t ParsingTable<T>,
}

impl<'t, T: Terminal> PredictiveParser<'t, T> {
    pub fn new(table: &'t ParsingTable<T>) -> Self {
        PredictiveParser { table }
    }

    pub fn table(&self) -> &'t ParsingTable<T> {
        self.table
    }

    /// Parse `tokens`, normally ending with the end-of-input marker. A missing marker is treated
    /// as if it were there.
    pub fn parse(&self, tokens: &[Token<T>]) -> ParseResult<T> {
        let mut derivation = Vec::new();
        let error = self.run(tokens, &mut derivation).err();
        ParseResult { derivation, error }
    }

    fn run(
        &self,
        tokens: &[Token<T>],
        derivation: &mut Vec<DerivationStep<T>>,
    ) -> Result<(), SyntaxError> {
        let grammar = self.table.grammar();
        let mut stack = vec![
            Symbol::Terminal(T::end_of_input()),
            Symbol::NonTerminal(grammar.start()),
        ];
        let mut cursor = 0;

        while let Some(&top) = stack.last() {
            let (lookahead, lexeme, position) = Self::lookahead(tokens, cursor);
            trace!(
                "top {} lookahead {} at {}",
                grammar.symbol_name(&top),
                lookahead.name(),
                position
            );

            match top {
                Symbol::Terminal(expected) if expected == lookahead => {
                    stack.pop();
                    cursor = (cursor + 1).min(tokens.len());
                    derivation.push(DerivationStep::Match {
                        terminal: lookahead,
                        lexeme: lexeme.to_owned(),
                        position,
                    });
                }
                Symbol::Terminal(expected) if expected.is_end_of_input() => {
                    return Err(Self::trailing(tokens, cursor));
                }
                Symbol::Terminal(expected) => {
                    return Err(SyntaxError::UnexpectedToken {
                        expected: expected.name(),
                        found: lookahead.name(),
                        lexeme: lexeme.to_owned(),
                        position,
                    });
                }
                Symbol::NonTerminal(nonterminal) => {
                    let id = self.table.get(nonterminal, lookahead).ok_or_else(|| {
                        SyntaxError::NoRule {
                            nonterminal: grammar.name(nonterminal).to_owned(),
                            found: lookahead.name(),
                            lexeme: lexeme.to_owned(),
                            position,
                            expected: self
                                .table
                                .expected(nonterminal)
                                .iter()
                                .map(Terminal::name)
                                .collect(),
                        }
                    })?;

                    stack.pop();
                    let production = grammar.production(id);
                    if !production.is_epsilon() {
                        // rightmost first, so that the leftmost symbol ends up on top
                        stack.extend(production.symbols().iter().rev().copied());
                    }
                    derivation.push(DerivationStep::Expand {
                        nonterminal,
                        production: id,
                    });
                }
                Symbol::Epsilon => {
                    stack.pop();
                }
            }
        }

        if cursor < tokens.len() {
            return Err(Self::trailing(tokens, cursor));
        }
        Ok(())
    }

    /// The token under the cursor, or a synthesized end-of-input marker past the end.
    fn lookahead(tokens: &[Token<T>], cursor: usize) -> (T, &str, TextPoint) {
        match tokens.get(cursor) {
            Some(token) => (token.kind, token.lexeme.as_str(), token.position()),
            None => (
                T::end_of_input(),
                "",
                tokens
                    .last()
                    .map_or(TextPoint::START, |token| token.location.end),
            ),
        }
    }

    fn trailing(tokens: &[Token<T>], cursor: usize) -> SyntaxError {
        let (found, lexeme, position) = Self::lookahead(tokens, cursor);
        SyntaxError::TrailingInput {
            found: found.name(),
            lexeme: lexeme.to_owned(),
            position,
            remaining: tokens[cursor.min(tokens.len())..]
                .iter()
                .filter(|token| !token.kind.is_end_of_input())
                .count(),
        }
    }
}
