//! Typed grammar representation, shared by the FIRST/FOLLOW solvers, the table builder and the
//! predictive parser.
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use log::warn;
use thiserror::Error;

use super::Terminal;

/// Index of a nonterminal inside its [`Grammar`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminalId(usize);

impl NonTerminalId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One element of a production's right-hand side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol<T> {
    Terminal(T),
    NonTerminal(NonTerminalId),
    Epsilon,
}

/// Designates one alternative of one nonterminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId {
    pub nonterminal: NonTerminalId,
    pub alternative: usize,
}

/// An ordered sequence of symbols. The empty production is the single-element `[Epsilon]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production<T> {
    symbols: Vec<Symbol<T>>,
}

impl<T> Production<T> {
    pub fn symbols(&self) -> &[Symbol<T>] {
        &self.symbols
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self.symbols.as_slice(), [Symbol::Epsilon])
    }
}

/// A right-hand side symbol as written by whoever authors a grammar, before nonterminal names are
/// resolved to ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleSymbol<T> {
    Terminal(T),
    NonTerminal(String),
    Epsilon,
}

impl<T: Terminal> RuleSymbol<T> {
    fn name(&self) -> &str {
        match self {
            RuleSymbol::Terminal(terminal) => terminal.name(),
            RuleSymbol::NonTerminal(name) => name,
            RuleSymbol::Epsilon => "ε",
        }
    }

    /// Classify a word of a textual grammar.
    fn from_word(word: &str) -> Self {
        match word {
            "EPSILON" | "ε" => RuleSymbol::Epsilon,
            _ => T::from_name(word)
                .map(RuleSymbol::Terminal)
                .unwrap_or_else(|| RuleSymbol::NonTerminal(word.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("the grammar has no rules")]
    Empty,

    #[error("start symbol `{0}` has no rules")]
    UndefinedStart(String),

    #[error("unknown symbol `{name}` in a rule for `{nonterminal}`")]
    UnknownSymbol { nonterminal: String, name: String },

    #[error("terminal `{0}` cannot be the left-hand side of a rule")]
    TerminalOnLeft(String),

    #[error("epsilon must be alone in its production: `{nonterminal} -> {production}`")]
    MisplacedEpsilon {
        nonterminal: String,
        production: String,
    },

    #[error("`{nonterminal} -> {production}` is listed twice")]
    DuplicateAlternative {
        nonterminal: String,
        production: String,
    },

    #[error("`{nonterminal}` is directly left-recursive")]
    LeftRecursion { nonterminal: String },
}

/// The internal representation of a grammar: every nonterminal with its ordered alternatives.
///
/// Alternative order does not matter to the parsing table but is kept so that diagnostics are
/// reproducible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar<T> {
    names: Vec<String>,
    alternatives: Vec<Vec<Production<T>>>,
    start: NonTerminalId,
}

impl<T: Terminal> Grammar<T> {
    pub fn start(&self) -> NonTerminalId {
        self.start
    }

    pub fn nonterminal_count(&self) -> usize {
        self.names.len()
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = NonTerminalId> {
        (0..self.names.len()).map(NonTerminalId)
    }

    pub fn name(&self, nonterminal: NonTerminalId) -> &str {
        &self.names[nonterminal.0]
    }

    pub fn lookup(&self, name: &str) -> Option<NonTerminalId> {
        self.names.iter().position(|n| n == name).map(NonTerminalId)
    }

    pub fn alternatives(&self, nonterminal: NonTerminalId) -> &[Production<T>] {
        &self.alternatives[nonterminal.0]
    }

    pub fn production(&self, id: ProductionId) -> &Production<T> {
        &self.alternatives[id.nonterminal.0][id.alternative]
    }

    /// Every production of the grammar, nonterminal by nonterminal, in authoring order.
    pub fn productions(&self) -> impl Iterator<Item = (ProductionId, &Production<T>)> + '_ {
        self.alternatives
            .iter()
            .enumerate()
            .flat_map(|(nonterminal, alternatives)| {
                alternatives
                    .iter()
                    .enumerate()
                    .map(move |(alternative, production)| {
                        let id = ProductionId {
                            nonterminal: NonTerminalId(nonterminal),
                            alternative,
                        };
                        (id, production)
                    })
            })
    }

    pub fn symbol_name<'a>(&'a self, symbol: &Symbol<T>) -> &'a str {
        match symbol {
            Symbol::Terminal(terminal) => terminal.name(),
            Symbol::NonTerminal(nonterminal) => self.name(*nonterminal),
            Symbol::Epsilon => "ε",
        }
    }

    /// Render a production as `Lhs -> a b c`.
    pub fn describe(&self, id: ProductionId) -> String {
        let rhs: Vec<&str> = self
            .production(id)
            .symbols()
            .iter()
            .map(|symbol| self.symbol_name(symbol))
            .collect();
        format!("{} -> {}", self.name(id.nonterminal), rhs.join(" "))
    }

    /// Load a grammar from its textual form.
    ///
    /// One rule per line, `Lhs -> a b | c d | EPSILON`. A line starting with `|` adds
    /// alternatives to the previous rule and `#` starts a comment. Words that name a terminal
    /// (see [`Terminal::from_name`]) are terminals, every other word is a nonterminal. The first
    /// rule defines the start symbol.
    ///
    /// # Example
    ///
    /// ```
    /// use rpn_ll1::parsing::{rpn::RpnTerminal, Grammar};
    ///
    /// let grammar = Grammar::<RpnTerminal>::from_text(
    ///     "Pair -> OPEN_PAREN Item Item CLOSE_PAREN
    ///      Item -> NUMBER
    ///           | IDENTIFIER",
    /// )
    /// .unwrap();
    ///
    /// let item = grammar.lookup("Item").unwrap();
    /// assert_eq!(grammar.alternatives(item).len(), 2);
    /// ```
    pub fn from_text(text: &str) -> Result<Self, GrammarError> {
        let mut builder: Option<GrammarBuilder<T>> = None;
        let mut current_lhs: Option<String> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw_line.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let (lhs, rhs) = if let Some(rest) = content.strip_prefix('|') {
                let lhs = current_lhs.clone().ok_or_else(|| GrammarError::Syntax {
                    line,
                    message: "alternative without a rule to attach to".to_owned(),
                })?;
                (lhs, rest)
            } else {
                let (lhs, rest) = content.split_once("->").ok_or_else(|| GrammarError::Syntax {
                    line,
                    message: "expected `->`".to_owned(),
                })?;
                let lhs = lhs.trim();
                if lhs.is_empty() || lhs.contains(char::is_whitespace) {
                    return Err(GrammarError::Syntax {
                        line,
                        message: format!("invalid left-hand side `{}`", lhs),
                    });
                }
                (lhs.to_owned(), rest)
            };

            let target = builder.get_or_insert_with(|| GrammarBuilder::new(lhs.clone()));
            for alternative in rhs.split('|') {
                let symbols: Vec<RuleSymbol<T>> = alternative
                    .split_whitespace()
                    .map(RuleSymbol::from_word)
                    .collect();
                if symbols.is_empty() {
                    return Err(GrammarError::Syntax {
                        line,
                        message: "empty alternative, write EPSILON for the empty production"
                            .to_owned(),
                    });
                }
                target.rule(lhs.clone(), symbols);
            }
            current_lhs = Some(lhs);
        }

        builder.ok_or(GrammarError::Empty)?.build()
    }

    /// Nonterminals that no derivation from the start symbol ever reaches.
    fn unreachable(&self) -> Vec<NonTerminalId> {
        let mut seen = HashSet::from([self.start]);
        let mut queue = VecDeque::from([self.start]);
        while let Some(nonterminal) = queue.pop_front() {
            for production in self.alternatives(nonterminal) {
                for symbol in production.symbols() {
                    if let Symbol::NonTerminal(next) = symbol {
                        if seen.insert(*next) {
                            queue.push_back(*next);
                        }
                    }
                }
            }
        }
        self.nonterminals().filter(|nt| !seen.contains(nt)).collect()
    }
}

impl<T: Terminal> fmt::Display for Grammar<T> {
    /// Writes the grammar back in the form read by [`Grammar::from_text`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for nonterminal in self.nonterminals() {
            let alternatives: Vec<String> = self
                .alternatives(nonterminal)
                .iter()
                .map(|production| {
                    production
                        .symbols()
                        .iter()
                        .map(|symbol| match symbol {
                            Symbol::Epsilon => "EPSILON",
                            other => self.symbol_name(other),
                        })
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
            writeln!(f, "{} -> {}", self.name(nonterminal), alternatives.join(" | "))?;
        }
        Ok(())
    }
}

/// Accumulates rules and resolves them into a validated [`Grammar`].
///
/// An empty symbol list, or a list holding only [`RuleSymbol::Epsilon`], is the empty
/// production. See [`gen_grammar`](crate::gen_grammar) for a compact way to drive it.
#[derive(Clone, Debug)]
pub struct GrammarBuilder<T> {
    start: String,
    rules: Vec<(String, Vec<RuleSymbol<T>>)>,
}

impl<T: Terminal> GrammarBuilder<T> {
    pub fn new(start: impl Into<String>) -> Self {
        GrammarBuilder {
            start: start.into(),
            rules: Vec::new(),
        }
    }

    pub fn rule(&mut self, lhs: impl Into<String>, symbols: Vec<RuleSymbol<T>>) -> &mut Self {
        self.rules.push((lhs.into(), symbols));
        self
    }

    pub fn build(self) -> Result<Grammar<T>, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut names: Vec<String> = Vec::new();
        let mut ids: HashMap<String, NonTerminalId> = HashMap::new();
        for (lhs, _) in &self.rules {
            if T::from_name(lhs).is_some() {
                return Err(GrammarError::TerminalOnLeft(lhs.clone()));
            }
            if !ids.contains_key(lhs) {
                ids.insert(lhs.clone(), NonTerminalId(names.len()));
                names.push(lhs.clone());
            }
        }
        let start = *ids
            .get(&self.start)
            .ok_or_else(|| GrammarError::UndefinedStart(self.start.clone()))?;

        let mut alternatives: Vec<Vec<Production<T>>> = vec![Vec::new(); names.len()];
        for (lhs, rule_symbols) in &self.rules {
            let nonterminal = ids[lhs];
            let render = || {
                rule_symbols
                    .iter()
                    .map(RuleSymbol::name)
                    .collect::<Vec<_>>()
                    .join(" ")
            };

            let symbols = if rule_symbols.iter().all(|s| *s == RuleSymbol::Epsilon) {
                vec![Symbol::Epsilon]
            } else if rule_symbols.contains(&RuleSymbol::Epsilon) {
                return Err(GrammarError::MisplacedEpsilon {
                    nonterminal: lhs.clone(),
                    production: render(),
                });
            } else {
                rule_symbols
                    .iter()
                    .map(|symbol| match symbol {
                        RuleSymbol::Terminal(terminal) => Ok(Symbol::Terminal(*terminal)),
                        RuleSymbol::NonTerminal(name) => ids
                            .get(name)
                            .map(|id| Symbol::NonTerminal(*id))
                            .ok_or_else(|| GrammarError::UnknownSymbol {
                                nonterminal: lhs.clone(),
                                name: name.clone(),
                            }),
                        RuleSymbol::Epsilon => Ok(Symbol::Epsilon),
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };

            if symbols.first() == Some(&Symbol::NonTerminal(nonterminal)) {
                return Err(GrammarError::LeftRecursion {
                    nonterminal: lhs.clone(),
                });
            }

            let production = Production { symbols };
            if alternatives[nonterminal.0].contains(&production) {
                return Err(GrammarError::DuplicateAlternative {
                    nonterminal: lhs.clone(),
                    production: render(),
                });
            }
            alternatives[nonterminal.0].push(production);
        }

        let grammar = Grammar {
            names,
            alternatives,
            start,
        };
        for nonterminal in grammar.unreachable() {
            warn!(
                "nonterminal `{}` is unreachable from `{}`",
                grammar.name(nonterminal),
                grammar.name(grammar.start)
            );
        }
        Ok(grammar)
    }
}

/// Build a [`Grammar`] from a compact literal description.
///
/// Nonterminals are string literals, terminals are identifiers naming values of the grammar's
/// [`Terminal`] type (bring them in scope with a `use`), and `[]` is the empty production. The
/// macro evaluates to `Result<Grammar<_>, GrammarError>`.
///
/// # Example
///
/// This example builds a representation of Grammar 3.11 from Andrew Appel's book (page 45)
///
/// ```
/// use rpn_ll1::{gen_grammar, parsing::Terminal};
/// use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// #[derive(EnumIter, EnumString, IntoStaticStr)]
/// #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
/// enum G311 {
///     Begin,
///     Else,
///     End,
///     EqualSign,
///     If,
///     Num,
///     Print,
///     Semicolon,
///     Then,
///     Eof,
/// }
///
/// impl Terminal for G311 {
///     type ValueIterator = G311Iter;
///     fn possible_terminals() -> G311Iter { G311::iter() }
///     fn end_of_input() -> Self { G311::Eof }
///     fn name(&self) -> &'static str { self.into() }
///     fn from_name(name: &str) -> Option<Self> { name.parse().ok() }
/// }
///
/// let grammar = {
///     use G311::*;
///     gen_grammar! {
///         start "Stm";
///         "Stm" => [If "Expr" Then "Stm" Else "Stm"] | [Begin "Stm" "StmList"] | [Print "Expr"];
///         "StmList" => [End] | [Semicolon "Stm" "StmList"];
///         "Expr" => [Num EqualSign Num];
///     }
/// }
/// .unwrap();
///
/// assert_eq!(grammar.nonterminal_count(), 3);
/// ```
#[macro_export]
macro_rules! gen_grammar {
    (
        start $start:literal;
        // One rule per nonterminal, each alternative between brackets
        $( $lhs:literal => $( [ $($rhs:tt)* ] )|+ ; )+
    ) => {{
        let mut builder = $crate::parsing::GrammarBuilder::new($start);
        $( $(
            builder.rule($lhs, vec![ $( $crate::gen_grammar!(@symbol $rhs) ),* ]);
        )+ )+
        builder.build()
    }};
    (@symbol $name:literal) => {
        $crate::parsing::RuleSymbol::NonTerminal(::std::string::String::from($name))
    };
    (@symbol $terminal:ident) => {
        $crate::parsing::RuleSymbol::Terminal($terminal)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::rpn::RpnTerminal::{self, *};

    fn nt(name: &str) -> RuleSymbol<RpnTerminal> {
        RuleSymbol::NonTerminal(name.to_owned())
    }

    #[test]
    fn epsilon_alternatives_are_normalized() {
        let mut builder = GrammarBuilder::new("List");
        builder
            .rule("List", vec![RuleSymbol::Terminal(Number), nt("List")])
            .rule("List", vec![])
            .rule("Other", vec![RuleSymbol::Epsilon]);
        let grammar = builder.build().unwrap();

        let list = grammar.lookup("List").unwrap();
        assert!(grammar.alternatives(list)[1].is_epsilon());
        let other = grammar.lookup("Other").unwrap();
        assert_eq!(grammar.alternatives(other)[0].symbols(), &[Symbol::Epsilon]);
    }

    #[test]
    fn epsilon_mixed_with_symbols() {
        let mut builder = GrammarBuilder::new("S");
        builder.rule("S", vec![RuleSymbol::Terminal(Number), RuleSymbol::Epsilon]);
        assert_eq!(
            builder.build(),
            Err(GrammarError::MisplacedEpsilon {
                nonterminal: "S".to_owned(),
                production: "NUMBER ε".to_owned(),
            })
        );
    }

    #[test]
    fn undefined_nonterminal() {
        let result = Grammar::<RpnTerminal>::from_text("S -> OPEN_PAREN Body CLOSE_PAREN");
        assert_eq!(
            result,
            Err(GrammarError::UnknownSymbol {
                nonterminal: "S".to_owned(),
                name: "Body".to_owned(),
            })
        );
    }

    #[test]
    fn terminal_names_cannot_be_defined() {
        let result = Grammar::<RpnTerminal>::from_text("S -> NUMBER\nNUMBER -> IDENTIFIER");
        assert_eq!(result, Err(GrammarError::TerminalOnLeft("NUMBER".to_owned())));
    }

    #[test]
    fn direct_left_recursion() {
        let result = Grammar::<RpnTerminal>::from_text("E -> E PLUS NUMBER | NUMBER");
        assert_eq!(
            result,
            Err(GrammarError::LeftRecursion {
                nonterminal: "E".to_owned()
            })
        );
    }

    #[test]
    fn duplicated_alternative() {
        let result = Grammar::<RpnTerminal>::from_text("S -> NUMBER\n   | NUMBER");
        assert!(matches!(
            result,
            Err(GrammarError::DuplicateAlternative { .. })
        ));
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let result = Grammar::<RpnTerminal>::from_text("# header\nS -> NUMBER\nT NUMBER");
        assert!(matches!(result, Err(GrammarError::Syntax { line: 3, .. })));

        let result = Grammar::<RpnTerminal>::from_text("| NUMBER");
        assert!(matches!(result, Err(GrammarError::Syntax { line: 1, .. })));

        let result = Grammar::<RpnTerminal>::from_text("S -> NUMBER | | IDENTIFIER");
        assert!(matches!(result, Err(GrammarError::Syntax { line: 1, .. })));
    }

    #[test]
    fn empty_text() {
        let result = Grammar::<RpnTerminal>::from_text("# nothing\n\n");
        assert_eq!(result, Err(GrammarError::Empty));
    }

    #[test]
    fn display_round_trips_through_text() {
        let text = "S -> OPEN_PAREN Items CLOSE_PAREN\nItems -> NUMBER Items | EPSILON\n";
        let grammar = Grammar::<RpnTerminal>::from_text(text).unwrap();
        assert_eq!(grammar.to_string(), text);

        let reparsed = Grammar::<RpnTerminal>::from_text(&grammar.to_string()).unwrap();
        assert_eq!(reparsed, grammar);
    }

    #[test]
    fn macro_and_text_agree() {
        let from_macro = gen_grammar! {
            start "S";
            "S" => [OpenParen "Items" CloseParen];
            "Items" => [Number "Items"] | [];
        }
        .unwrap();
        let from_text = Grammar::<RpnTerminal>::from_text(
            "S -> OPEN_PAREN Items CLOSE_PAREN\nItems -> NUMBER Items | ε",
        )
        .unwrap();
        assert_eq!(from_macro, from_text);
    }

    #[test]
    fn describe_productions() {
        let grammar =
            Grammar::<RpnTerminal>::from_text("S -> NUMBER Tail\nTail -> PLUS | EPSILON").unwrap();
        let tail = grammar.lookup("Tail").unwrap();
        let ids: Vec<String> = grammar
            .productions()
            .filter(|(id, _)| id.nonterminal == tail)
            .map(|(id, _)| grammar.describe(id))
            .collect();
        assert_eq!(ids, vec!["Tail -> PLUS", "Tail -> ε"]);
    }
}
