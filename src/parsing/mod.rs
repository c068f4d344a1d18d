mod grammar;
mod lexer;
mod location;
mod parser;
pub mod rpn;
mod sets;
mod table;

/// A closed set of lexical categories that a [`Grammar`] is written against.
///
/// Implementations are usually plain enums deriving `strum`'s `EnumIter`, `EnumString` and
/// `IntoStaticStr`, see [`rpn::RpnTerminal`].
pub trait Terminal: Copy + Eq + Ord + std::hash::Hash + std::fmt::Debug + 'static {
    type ValueIterator: Iterator<Item = Self>;

    /// Every terminal kind, in declaration order.
    fn possible_terminals() -> Self::ValueIterator;

    /// The kind of the marker token appended after the last real token.
    fn end_of_input() -> Self;

    /// Stable spelling of the kind, used in grammar files and diagnostics.
    fn name(&self) -> &'static str;

    /// Reverse of [`name`](Terminal::name).
    fn from_name(name: &str) -> Option<Self>;

    fn is_end_of_input(&self) -> bool {
        *self == Self::end_of_input()
    }
}

pub use grammar::{
    Grammar, GrammarBuilder, GrammarError, NonTerminalId, Production, ProductionId, RuleSymbol,
    Symbol,
};
pub use lexer::{Lexer, LexerRule, ScanError, Token, TokenBuilder, TokenIterator};
pub use location::{Location, TextPoint};
pub use parser::{DerivationStep, ParseResult, PredictiveParser, SyntaxError};
pub use sets::{compute_first, compute_follow, FirstSet, FirstSets, FollowSets};
pub use table::{build_table, GrammarConflictError, ParsingTable};
