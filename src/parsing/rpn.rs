//! The parenthesized reverse-Polish language: its terminals, its lexer and its built-in grammar.
use std::fmt;

use once_cell::sync::Lazy;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::{
    Grammar, Lexer, LexerRule, ParseResult, ParsingTable, PredictiveParser, ScanError, Terminal,
    Token,
};

/// Every lexical category of the language. Names (as used in grammar files) are the variant
/// names in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RpnTerminal {
    // parentheses
    OpenParen,
    CloseParen,

    // arithmetic operators
    Plus,
    Minus,
    Times,
    /// `|`, division over reals
    RealDivide,
    /// `/`, division over integers
    IntegerDivide,
    Modulo,
    Power,

    // relational operators
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,

    // logical operators, symbolic or spelled out
    And,
    Or,
    Not,

    // control keywords
    For,
    While,
    #[strum(serialize = "IFELSE")]
    IfElse,
    /// Recall of a previous line's result
    Res,

    Number,
    Identifier,
    EndOfInput,
}

impl Terminal for RpnTerminal {
    type ValueIterator = RpnTerminalIter;

    fn possible_terminals() -> RpnTerminalIter {
        Self::iter()
    }

    fn end_of_input() -> Self {
        RpnTerminal::EndOfInput
    }

    fn name(&self) -> &'static str {
        self.into()
    }

    fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl fmt::Display for RpnTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Spelling of every operator and parenthesis. The lexer prefers the longest spelling, so `>=`
/// is never read as `>` followed by `=`.
pub const OPERATORS: &[(&str, RpnTerminal)] = {
    use RpnTerminal::*;
    &[
        ("(", OpenParen),
        (")", CloseParen),
        ("+", Plus),
        ("-", Minus),
        ("*", Times),
        ("|", RealDivide),
        ("/", IntegerDivide),
        ("%", Modulo),
        ("^", Power),
        ("<", Less),
        (">", Greater),
        ("<=", LessEqual),
        (">=", GreaterEqual),
        ("==", Equal),
        ("!=", NotEqual),
        ("&&", And),
        ("||", Or),
        ("!", Not),
    ]
};

/// Uppercase words with a meaning of their own. Any other uppercase word is an identifier.
pub const KEYWORDS: &[(&str, RpnTerminal)] = {
    use RpnTerminal::*;
    &[
        ("AND", And),
        ("OR", Or),
        ("NOT", Not),
        ("FOR", For),
        ("WHILE", While),
        ("IFELSE", IfElse),
        ("RES", Res),
    ]
};

impl RpnTerminal {
    pub fn from_operator(spelling: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(text, _)| *text == spelling)
            .map(|(_, kind)| *kind)
    }

    /// Classify an uppercase word: a keyword if it is one, an identifier otherwise.
    pub fn from_word(word: &str) -> Self {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == word)
            .map_or(RpnTerminal::Identifier, |(_, kind)| *kind)
    }
}

/// Lexer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexerConfig {
    /// Characters allowed inside a word after its first uppercase letter, as in `REAL_RESULT`.
    pub identifier_separators: Vec<char>,
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig {
            identifier_separators: vec!['_'],
        }
    }
}

fn rpn_lexing_rules(config: &LexerConfig) -> Vec<LexerRule<RpnTerminal>> {
    let word_tail: String = std::iter::once("[A-Z]".to_owned())
        .chain(
            config
                .identifier_separators
                .iter()
                .map(|separator| regex::escape(&separator.to_string())),
        )
        .collect::<Vec<_>>()
        .join("|");

    let mut rules: Vec<LexerRule<RpnTerminal>> = OPERATORS
        .iter()
        .map(|(spelling, _)| -> LexerRule<RpnTerminal> {
            (regex::escape(spelling), RpnTerminal::from_operator)
        })
        .collect();
    rules.push((format!("[A-Z](?:{})*", word_tail), |word| {
        Some(RpnTerminal::from_word(word))
    }));
    rules.push((r"[0-9][0-9.]*".to_owned(), |_| Some(RpnTerminal::Number)));
    rules.push((r"\s+".to_owned(), |_| None));
    rules
}

/// Build and return a [`Lexer`](Lexer) for the language.
///
/// # Example
///
/// ```
/// use rpn_ll1::parsing::rpn::{build_rpn_lexer, LexerConfig};
///
/// let lexer = build_rpn_lexer(&LexerConfig::default());
/// let token_iterator = lexer.scan("(IFELSE ((A B >) (C D <=) &&)(1)(0))");
/// assert_eq!(token_iterator.count(), 22);
/// ```
pub fn build_rpn_lexer(config: &LexerConfig) -> Lexer<RpnTerminal> {
    Lexer::new(rpn_lexing_rules(config)).expect("Internal error initializing the lexer")
}

/// The built-in grammar, in the format read by [`Grammar::from_text`].
pub const DEFAULT_GRAMMAR: &str = include_str!("rpn.ll1");

static DEFAULT_LEXER: Lazy<Lexer<RpnTerminal>> =
    Lazy::new(|| build_rpn_lexer(&LexerConfig::default()));

static DEFAULT_TABLE: Lazy<ParsingTable<RpnTerminal>> = Lazy::new(|| {
    let grammar = default_grammar();
    ParsingTable::from_grammar(&grammar).expect("the built-in grammar is LL(1)")
});

pub fn default_grammar() -> Grammar<RpnTerminal> {
    Grammar::from_text(DEFAULT_GRAMMAR).expect("the built-in grammar is well formed")
}

/// The parsing table of the built-in grammar, built on first use and shared afterwards.
pub fn default_table() -> &'static ParsingTable<RpnTerminal> {
    &DEFAULT_TABLE
}

/// Scan `text` with the default lexer settings. The last token is always the end-of-input marker.
///
/// # Example
///
/// ```
/// use rpn_ll1::parsing::rpn::{tokenize, RpnTerminal::*};
///
/// let kinds: Vec<_> = tokenize("(5 A)").unwrap().iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![OpenParen, Number, Identifier, CloseParen, EndOfInput]);
///
/// let error = tokenize("(5 a)").unwrap_err();
/// assert_eq!((error.character, error.position.column), ('a', 4));
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token<RpnTerminal>>, ScanError> {
    DEFAULT_LEXER.tokenize(text)
}

/// Parse `tokens` against the built-in grammar.
pub fn parse(tokens: &[Token<RpnTerminal>]) -> ParseResult<RpnTerminal> {
    PredictiveParser::new(default_table()).parse(tokens)
}
