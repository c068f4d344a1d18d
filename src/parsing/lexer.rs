//! A regex-based lexer strongly inspired by [krsnik02](https://crates.io/users/krsnik02)'s
//! [regex-lexer](https://crates.io/crates/regex-lexer) crate. It essentially works the same way,
//! with the addition of a [`Location`](Location) attached to each token and an explicit
//! end-of-input token closing every scan.

use super::{Location, Terminal, TextPoint};
use regex::{Regex, RegexSet};
use thiserror::Error;

/// A scanned token: its kind, the exact text it was scanned from and where that text is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<T> {
    pub kind: T,
    pub lexeme: String,
    pub location: Location,
}

impl<T> Token<T> {
    pub fn new(kind: T, lexeme: impl Into<String>, location: Location) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn position(&self) -> TextPoint {
        self.location.start
    }

    pub fn line(&self) -> usize {
        self.location.start.line
    }

    pub fn column(&self) -> usize {
        self.location.start.column
    }
}

/// No lexing rule matched the input at `position`. Scanning is all-or-nothing: once this is
/// returned no further token is produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognized character {character:?} at {position}")]
pub struct ScanError {
    pub character: char,
    pub position: TextPoint,
}

/// Functions associated to a regex that decide what the matched text is. Returning `None` drops
/// the text (whitespace, comments).
pub type TokenBuilder<T> = fn(&str) -> Option<T>;

/// An association similar to flex's production rule. The first element of the tuple is a regex
/// description, the second one is a [`TokenBuilder`](TokenBuilder) function that classifies the
/// matched string. Patterns are anchored to the current position by the lexer.
pub type LexerRule<T> = (String, TokenBuilder<T>);

/// A Lexer capable of scanning [`Token`](Token)s described by a set of [`LexerRule`](LexerRule)s.
///
/// The rule matching the longest text wins; when several rules match the same length, the last
/// one in the list wins.
///
/// # Example
///
/// ```
/// use rpn_ll1::parsing::{Lexer, LexerRule, Terminal};
/// use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// #[derive(EnumIter, EnumString, IntoStaticStr)]
/// #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
/// enum Tok {
///     Id,
///     If,
///     Equal,
///     Eof,
/// }
///
/// impl Terminal for Tok {
///     type ValueIterator = TokIter;
///     fn possible_terminals() -> TokIter { Tok::iter() }
///     fn end_of_input() -> Self { Tok::Eof }
///     fn name(&self) -> &'static str { self.into() }
///     fn from_name(name: &str) -> Option<Self> { name.parse().ok() }
/// }
///
/// let rules: Vec<LexerRule<Tok>> = vec![
///     // Ids first so they have lower priority than keywords
///     (r"[a-z]+".into(), |_| Some(Tok::Id)),
///     (r"if".into(), |_| Some(Tok::If)),
///     (r"=".into(), |_| Some(Tok::Equal)),
///     (r"\s+".into(), |_| None),
/// ];
///
/// let lexer = Lexer::new(rules).unwrap();
/// let kinds: Vec<Tok> = lexer
///     .tokenize("if a = iffy")
///     .unwrap()
///     .into_iter()
///     .map(|token| token.kind)
///     .collect();
///
/// assert_eq!(kinds, vec![Tok::If, Tok::Id, Tok::Equal, Tok::Id, Tok::Eof]);
/// ```
pub struct Lexer<T: Terminal> {
    regex_set: RegexSet,
    regex_list: Vec<Regex>,
    production_rules: Vec<LexerRule<T>>,
}

impl<T: Terminal> Lexer<T> {
    pub fn new(production_rules: Vec<LexerRule<T>>) -> Result<Self, regex::Error> {
        let anchored: Vec<String> = production_rules
            .iter()
            .map(|(pattern, _)| format!("^(?:{})", pattern))
            .collect();

        let regex_set = RegexSet::new(&anchored)?;
        let regex_list = anchored
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            regex_set,
            regex_list,
            production_rules,
        })
    }

    /// Return an [`Iterator`](TokenIterator) over the scanned tokens of `input`, without the
    /// end-of-input marker.
    pub fn scan<'a, 'b>(&'a self, input: &'b str) -> TokenIterator<'a, 'b, T> {
        TokenIterator {
            lexer: self,
            input,
            current_pos: TextPoint::START,
            failed: false,
        }
    }

    /// Scan the whole input and append the end-of-input marker, so that a parser never has to
    /// look past the last token.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token<T>>, ScanError> {
        let mut iterator = self.scan(input);
        let mut tokens = Vec::new();
        for token in &mut iterator {
            tokens.push(token?);
        }
        tokens.push(Token::new(
            T::end_of_input(),
            "",
            Location::at(iterator.current_pos),
        ));
        Ok(tokens)
    }
}

/// An iterator that yields [`Token`](Token)s, or a single [`ScanError`] after which it stops.
pub struct TokenIterator<'a, 'b, T: Terminal> {
    lexer: &'a Lexer<T>,
    input: &'b str,
    current_pos: TextPoint,
    failed: bool,
}

impl<'a, 'b, T: Terminal> TokenIterator<'a, 'b, T> {
    /// Find the rule matching the longest prefix of `next_input`.
    fn best_match(&self, next_input: &str) -> Option<(usize, usize)> {
        self.lexer
            .regex_set
            .matches(next_input)
            .into_iter()
            .filter_map(|rule_index| {
                // RegexSet only tells which regex matched, run it a second time for the length
                let region = self.lexer.regex_list.get(rule_index)?.find(next_input)?;
                Some((rule_index, region.end()))
            })
            .filter(|&(_, match_length)| match_length > 0)
            // keep only the largest match
            .max_by_key(|&(_, match_length)| match_length)
    }
}

impl<'a, 'b, T: Terminal> Iterator for TokenIterator<'a, 'b, T> {
    type Item = Result<Token<T>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }

            let next_input = &self.input[self.current_pos.index..];
            let character = next_input.chars().next()?;

            let (rule_index, matched_length) = match self.best_match(next_input) {
                Some(found) => found,
                None => {
                    self.failed = true;
                    return Some(Err(ScanError {
                        character,
                        position: self.current_pos,
                    }));
                }
            };

            let matched_text = &next_input[..matched_length];
            let last_char_len = matched_text.chars().last().map_or(0, char::len_utf8);
            let loc = Location {
                start: self.current_pos,
                end: self
                    .current_pos
                    .advanced_by(&matched_text[..matched_length - last_char_len]),
            };
            self.current_pos = self.current_pos.advanced_by(matched_text);

            let (_, token_builder) = &self.lexer.production_rules[rule_index];
            if let Some(kind) = token_builder(matched_text) {
                return Some(Ok(Token::new(kind, matched_text, loc)));
            }
        }
    }
}
