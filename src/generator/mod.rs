//! Random derivations of a grammar.
//!
//! Both generators repeatedly replace a non-terminal by one of its rule's
//! alternatives, asking a [`SymbolIndex`] which one. The caller-supplied limit
//! bounds the work of every call; exceeding it fails the call instead of
//! returning a partial result.

mod sentence;
mod tree;

use std::sync::Arc;

use crate::cfg::{Cfg, Expression, NonTerminal, Terminal};
use crate::index::SymbolIndex;
use crate::utils::{GrammarError, Result};

pub use sentence::SentenceGenerator;
pub use tree::{DerivationTree, DerivationTreeGenerator, NodeId};

/// Order in which pending non-terminals are expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    /// Always expand the leftmost non-terminal, one substitution at a time
    #[default]
    LeftFirst,
    /// Sweep the sentential form from left to right, expanding every
    /// non-terminal under the cursor; repeat until a sweep changes nothing
    LeftToRight,
}

/// Configuration options for the generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Expansion order
    pub expansion: Expansion,
    /// Maximum substitutions for sentences, maximum nodes for trees
    pub limit: usize,
}

impl GeneratorConfig {
    pub fn new(limit: usize) -> Self {
        GeneratorConfig {
            expansion: Expansion::default(),
            limit,
        }
    }

    pub fn with_expansion(mut self, expansion: Expansion) -> Self {
        self.expansion = expansion;
        self
    }
}

/// Produces a derivation result from a grammar
pub trait Generator<T> {
    type Output;

    fn generate(&mut self, cfg: &Cfg<T>) -> Result<Self::Output>;
}

/// A sentential form under derivation
trait Form<T> {
    fn len(&self) -> usize;

    /// The non-terminal at `pos`, if the element there still needs expanding
    fn pending(&self, pos: usize) -> Option<Arc<NonTerminal>>;

    /// Replace the element at `pos` by the symbols of `expression`
    fn substitute(&mut self, pos: usize, expression: &Expression<T>) -> Result<()>;
}

fn select<'c, T, I: SymbolIndex>(
    cfg: &'c Cfg<T>,
    non_terminal: &NonTerminal,
    index: &mut I,
) -> Result<&'c Expression<T>> {
    let rule = cfg
        .rule(non_terminal)
        .ok_or_else(|| GrammarError::MissingRule(non_terminal.name().to_string()))?;
    let bound = rule.alternatives().len();
    let choice = index.next(bound);
    rule.alternatives()
        .get(choice)
        .ok_or(GrammarError::IndexOutOfBounds {
            index: choice,
            bound,
        })
}

fn expand<T, I: SymbolIndex, F: Form<T>>(
    cfg: &Cfg<T>,
    index: &mut I,
    form: &mut F,
    pos: usize,
    non_terminal: &NonTerminal,
) -> Result<()> {
    let expression = select(cfg, non_terminal, index)?;
    form.substitute(pos, expression)
}

/// Run a derivation until no pending non-terminal is left
fn derive<T, I: SymbolIndex, F: Form<T>>(
    cfg: &Cfg<T>,
    index: &mut I,
    expansion: Expansion,
    form: &mut F,
) -> Result<()> {
    match expansion {
        Expansion::LeftFirst => {
            // Everything left of the last substitution is already terminal.
            let mut from = 0;
            while let Some((pos, non_terminal)) =
                (from..form.len()).find_map(|pos| form.pending(pos).map(|nt| (pos, nt)))
            {
                expand(cfg, index, form, pos, &non_terminal)?;
                from = pos;
            }
        }
        Expansion::LeftToRight => loop {
            let mut substituted = false;
            let mut cursor = 0;
            while cursor < form.len() {
                if let Some(non_terminal) = form.pending(cursor) {
                    expand(cfg, index, form, cursor, &non_terminal)?;
                    substituted = true;
                }
                cursor += 1;
            }
            if !substituted {
                break;
            }
        },
    }
    Ok(())
}

/// Concatenate the names of a terminal sequence
pub fn join<T>(terminals: &[Arc<Terminal<T>>], separator: &str) -> String {
    terminals
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnf;
    use crate::cfg::Symbol;
    use std::cell::Cell;

    #[test]
    fn test_config() {
        let config = GeneratorConfig::new(25);
        assert_eq!(config.expansion, Expansion::LeftFirst);
        assert_eq!(config.limit, 25);

        let config = config.with_expansion(Expansion::LeftToRight);
        assert_eq!(config.expansion, Expansion::LeftToRight);
    }

    #[test]
    fn test_join() {
        let cfg = bnf::parse("<s> ::= a b c").unwrap();
        assert_eq!(join(cfg.terminals(), ""), "abc");
        assert_eq!(join(cfg.terminals(), " "), "a b c");
    }

    #[test]
    fn test_select_rejects_out_of_range_index() {
        let cfg = bnf::parse("<s> ::= a | b").unwrap();
        let mut index = |bound: usize| bound;
        let err = select(&cfg, cfg.start(), &mut index).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::IndexOutOfBounds { index: 2, bound: 2 }
        ));
    }

    /// A plain sentential form that counts how often it is inspected
    struct Counted {
        symbols: Vec<Symbol<String>>,
        inspected: Cell<usize>,
    }

    impl Form<String> for Counted {
        fn len(&self) -> usize {
            self.symbols.len()
        }

        fn pending(&self, pos: usize) -> Option<Arc<NonTerminal>> {
            self.inspected.set(self.inspected.get() + 1);
            self.symbols[pos].as_non_terminal().cloned()
        }

        fn substitute(&mut self, pos: usize, expression: &Expression<String>) -> Result<()> {
            self.symbols
                .splice(pos..pos + 1, expression.symbols().iter().cloned());
            Ok(())
        }
    }

    #[test]
    fn test_left_first_scan_is_linear() {
        let cfg = bnf::parse("<l> ::= x <l> | x").unwrap();
        let steps = 2000;
        let mut calls = 0;
        let mut index = |_: usize| -> usize {
            calls += 1;
            if calls <= steps { 0 } else { 1 }
        };
        let mut form = Counted {
            symbols: vec![Symbol::NonTerminal(Arc::clone(cfg.start()))],
            inspected: Cell::new(0),
        };

        derive(&cfg, &mut index, Expansion::LeftFirst, &mut form).unwrap();

        assert_eq!(form.symbols.len(), steps + 1);
        assert!(form.inspected.get() <= 2 * steps + 3);
    }
}
