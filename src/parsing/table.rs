//! Predictive parsing table construction.
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use log::debug;
use thiserror::Error;

use super::{
    compute_first, compute_follow, FirstSets, FollowSets, Grammar, NonTerminalId, ProductionId,
    Terminal,
};

/// Two different productions claim the same table cell: the grammar is not LL(1) as given.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(
    "grammar is not LL(1): ({nonterminal}, {terminal}) is claimed by both `{existing}` and `{candidate}`"
)]
pub struct GrammarConflictError {
    pub nonterminal: String,
    pub terminal: &'static str,
    /// The production that filled the cell first.
    pub existing: String,
    /// The production that was refused.
    pub candidate: String,
}

/// A deterministic `(nonterminal, lookahead) -> production` map, along with the grammar it was
/// built from. Immutable once built; share it by reference between parses.
#[derive(Clone, Debug)]
pub struct ParsingTable<T: Terminal> {
    grammar: Grammar<T>,
    cells: HashMap<(NonTerminalId, T), ProductionId>,
}

impl<T: Terminal> ParsingTable<T> {
    /// Compute FIRST and FOLLOW sets of `grammar`, then build its table.
    pub fn from_grammar(grammar: &Grammar<T>) -> Result<Self, GrammarConflictError> {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        build_table(grammar, &first, &follow)
    }

    pub fn grammar(&self) -> &Grammar<T> {
        &self.grammar
    }

    pub fn get(&self, nonterminal: NonTerminalId, lookahead: T) -> Option<ProductionId> {
        self.cells.get(&(nonterminal, lookahead)).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The lookaheads `nonterminal` has an entry for, in terminal order.
    pub fn expected(&self, nonterminal: NonTerminalId) -> Vec<T> {
        let mut expected: Vec<T> = self
            .cells
            .keys()
            .filter(|(nt, _)| *nt == nonterminal)
            .map(|(_, terminal)| *terminal)
            .collect();
        expected.sort();
        expected
    }

    /// Every cell, sorted by nonterminal then terminal.
    pub fn entries(&self) -> Vec<(NonTerminalId, T, ProductionId)> {
        let mut entries: Vec<_> = self
            .cells
            .iter()
            .map(|(&(nonterminal, terminal), &production)| (nonterminal, terminal, production))
            .collect();
        entries.sort();
        entries
    }
}

impl<T: Terminal> fmt::Display for ParsingTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (nonterminal, terminal, production) in self.entries() {
            writeln!(
                f,
                "[{}, {}] {}",
                self.grammar.name(nonterminal),
                terminal.name(),
                self.grammar.describe(production)
            )?;
        }
        Ok(())
    }
}

/// Fill the table: `A -> α` goes in every cell `(A, t)` with `t` in FIRST(α), and if α is
/// nullable in every cell `(A, t)` with `t` in FOLLOW(A).
///
/// A cell already holding a different production is a conflict and aborts the build.
pub fn build_table<T: Terminal>(
    grammar: &Grammar<T>,
    first: &FirstSets<T>,
    follow: &FollowSets<T>,
) -> Result<ParsingTable<T>, GrammarConflictError> {
    let mut cells: HashMap<(NonTerminalId, T), ProductionId> = HashMap::new();

    for (id, production) in grammar.productions() {
        let first_alpha = first.of_sequence(production.symbols());
        let mut lookaheads = first_alpha.terminals;
        if first_alpha.nullable {
            lookaheads.extend(follow.of(id.nonterminal).iter().copied());
        }

        for terminal in lookaheads {
            match cells.entry((id.nonterminal, terminal)) {
                Entry::Vacant(cell) => {
                    cell.insert(id);
                }
                Entry::Occupied(cell) if *cell.get() == id => {}
                Entry::Occupied(cell) => {
                    let conflict = GrammarConflictError {
                        nonterminal: grammar.name(id.nonterminal).to_owned(),
                        terminal: terminal.name(),
                        existing: grammar.describe(*cell.get()),
                        candidate: grammar.describe(id),
                    };
                    debug!("{}", conflict);
                    return Err(conflict);
                }
            }
        }
    }

    debug!(
        "parsing table built: {} nonterminals, {} entries",
        grammar.nonterminal_count(),
        cells.len()
    );
    Ok(ParsingTable {
        grammar: grammar.clone(),
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::rpn::RpnTerminal::{self, *};

    #[test]
    fn epsilon_productions_fill_follow_cells() {
        let grammar = Grammar::<RpnTerminal>::from_text(
            "S -> OPEN_PAREN Tail CLOSE_PAREN
             Tail -> NUMBER Tail | EPSILON",
        )
        .unwrap();
        let table = ParsingTable::from_grammar(&grammar).unwrap();
        let tail = grammar.lookup("Tail").unwrap();

        let on_number = table.get(tail, Number).unwrap();
        assert_eq!(grammar.describe(on_number), "Tail -> NUMBER Tail");
        let on_close = table.get(tail, CloseParen).unwrap();
        assert!(grammar.production(on_close).is_epsilon());
        assert_eq!(table.get(tail, Plus), None);
        assert_eq!(table.expected(tail), vec![CloseParen, Number]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn nullable_alternatives_overlapping_on_follow() {
        // both alternatives of Opt derive the empty string
        let grammar = Grammar::<RpnTerminal>::from_text(
            "S -> Opt CLOSE_PAREN
             Opt -> Empty | EPSILON
             Empty -> EPSILON",
        )
        .unwrap();
        let conflict = ParsingTable::from_grammar(&grammar).unwrap_err();
        assert_eq!(
            conflict,
            GrammarConflictError {
                nonterminal: "Opt".to_owned(),
                terminal: "CLOSE_PAREN",
                existing: "Opt -> Empty".to_owned(),
                candidate: "Opt -> ε".to_owned(),
            }
        );
    }

    #[test]
    fn display_lists_cells_in_order() {
        let grammar =
            Grammar::<RpnTerminal>::from_text("S -> NUMBER | IDENTIFIER").unwrap();
        let table = ParsingTable::from_grammar(&grammar).unwrap();
        assert_eq!(
            table.to_string(),
            "[S, NUMBER] S -> NUMBER\n[S, IDENTIFIER] S -> IDENTIFIER\n"
        );
    }
}
