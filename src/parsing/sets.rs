//! FIRST and FOLLOW sets, computed by iterating to a fixed point.
//!
//! Every pass only ever adds terminals (or the nullable flag) to finite sets, so both solvers stop
//! after at most as many passes as there are (nonterminal, terminal) pairs.
use std::collections::BTreeSet;

use log::debug;

use super::{Grammar, NonTerminalId, Symbol, Terminal};

/// The terminals that can start a derivation, and whether the empty string can be derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirstSet<T: Ord> {
    pub terminals: BTreeSet<T>,
    pub nullable: bool,
}

impl<T: Ord> Default for FirstSet<T> {
    fn default() -> Self {
        FirstSet {
            terminals: BTreeSet::new(),
            nullable: false,
        }
    }
}

impl<T: Ord> FirstSet<T> {
    pub fn contains(&self, terminal: &T) -> bool {
        self.terminals.contains(terminal)
    }
}

/// FIRST set of every nonterminal of a grammar. FIRST of a terminal is the terminal itself and
/// FIRST of Epsilon is only nullable, see [`FirstSets::of_symbol`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirstSets<T: Ord> {
    nonterminals: Vec<FirstSet<T>>,
}

impl<T: Terminal> FirstSets<T> {
    /// The starting point of the solver: every nonterminal has an empty FIRST set.
    pub fn empty(grammar: &Grammar<T>) -> Self {
        FirstSets {
            nonterminals: vec![FirstSet::default(); grammar.nonterminal_count()],
        }
    }

    pub fn of_nonterminal(&self, nonterminal: NonTerminalId) -> &FirstSet<T> {
        &self.nonterminals[nonterminal.index()]
    }

    pub fn of_symbol(&self, symbol: &Symbol<T>) -> FirstSet<T> {
        self.of_sequence(std::slice::from_ref(symbol))
    }

    /// FIRST of a symbol string. The empty string is nullable and starts with nothing.
    pub fn of_sequence(&self, symbols: &[Symbol<T>]) -> FirstSet<T> {
        let mut first = FirstSet::default();
        for symbol in symbols {
            match symbol {
                Symbol::Terminal(terminal) => {
                    first.terminals.insert(*terminal);
                    return first;
                }
                Symbol::NonTerminal(nonterminal) => {
                    let set = self.of_nonterminal(*nonterminal);
                    first.terminals.extend(set.terminals.iter().copied());
                    if !set.nullable {
                        return first;
                    }
                }
                Symbol::Epsilon => {}
            }
        }
        first.nullable = true;
        first
    }

    /// Run one pass over every production. Returns whether any set grew.
    pub fn grow(&mut self, grammar: &Grammar<T>) -> bool {
        let mut changed = false;
        for (id, production) in grammar.productions() {
            let first = self.of_sequence(production.symbols());
            let set = &mut self.nonterminals[id.nonterminal.index()];
            for terminal in first.terminals {
                changed |= set.terminals.insert(terminal);
            }
            if first.nullable && !set.nullable {
                set.nullable = true;
                changed = true;
            }
        }
        changed
    }
}

/// FOLLOW set of every nonterminal of a grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowSets<T: Ord> {
    nonterminals: Vec<BTreeSet<T>>,
}

impl<T: Terminal> FollowSets<T> {
    /// The starting point of the solver: only the start symbol is followed, by the end of input.
    pub fn empty(grammar: &Grammar<T>) -> Self {
        let mut nonterminals = vec![BTreeSet::new(); grammar.nonterminal_count()];
        nonterminals[grammar.start().index()].insert(T::end_of_input());
        FollowSets { nonterminals }
    }

    pub fn of(&self, nonterminal: NonTerminalId) -> &BTreeSet<T> {
        &self.nonterminals[nonterminal.index()]
    }

    /// Run one pass over every nonterminal occurrence `A -> α X β`. Returns whether any set grew.
    pub fn grow(&mut self, grammar: &Grammar<T>, first: &FirstSets<T>) -> bool {
        let mut changed = false;
        for (id, production) in grammar.productions() {
            let symbols = production.symbols();
            for (position, symbol) in symbols.iter().enumerate() {
                let target = match symbol {
                    Symbol::NonTerminal(nonterminal) => *nonterminal,
                    _ => continue,
                };

                let rest = first.of_sequence(&symbols[position + 1..]);
                let mut additions = rest.terminals;
                if rest.nullable {
                    additions.extend(self.of(id.nonterminal).iter().copied());
                }

                let set = &mut self.nonterminals[target.index()];
                for terminal in additions {
                    changed |= set.insert(terminal);
                }
            }
        }
        changed
    }
}

/// Compute FIRST of every nonterminal of `grammar`.
pub fn compute_first<T: Terminal>(grammar: &Grammar<T>) -> FirstSets<T> {
    let mut sets = FirstSets::empty(grammar);
    let mut passes = 1;
    while sets.grow(grammar) {
        passes += 1;
    }
    debug!("FIRST sets converged after {} passes", passes);
    sets
}

/// Compute FOLLOW of every nonterminal of `grammar`, given its converged FIRST sets.
pub fn compute_follow<T: Terminal>(grammar: &Grammar<T>, first: &FirstSets<T>) -> FollowSets<T> {
    let mut sets = FollowSets::empty(grammar);
    let mut passes = 1;
    while sets.grow(grammar, first) {
        passes += 1;
    }
    debug!("FOLLOW sets converged after {} passes", passes);
    sets
}
