use std::sync::Arc;

use super::{Form, Generator, GeneratorConfig, derive};
use crate::cfg::{Cfg, Expression, NonTerminal, Symbol, Terminal};
use crate::index::SymbolIndex;
use crate::utils::{GrammarError, Result};

/// Generates terminal sequences from a grammar.
///
/// The limit is the maximum number of substitutions one call may perform.
#[derive(Debug, Clone)]
pub struct SentenceGenerator<I> {
    index: I,
    config: GeneratorConfig,
}

impl<I: SymbolIndex> SentenceGenerator<I> {
    /// Create a generator with leftmost expansion
    pub fn new(index: I, limit: usize) -> Self {
        SentenceGenerator::with_config(index, GeneratorConfig::new(limit))
    }

    pub fn with_config(index: I, config: GeneratorConfig) -> Self {
        SentenceGenerator { index, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Give back the decision source
    pub fn into_index(self) -> I {
        self.index
    }
}

struct Sentence<T> {
    symbols: Vec<Symbol<T>>,
    substitutions: usize,
    limit: usize,
}

impl<T> Form<T> for Sentence<T> {
    fn len(&self) -> usize {
        self.symbols.len()
    }

    fn pending(&self, pos: usize) -> Option<Arc<NonTerminal>> {
        self.symbols[pos].as_non_terminal().cloned()
    }

    fn substitute(&mut self, pos: usize, expression: &Expression<T>) -> Result<()> {
        if self.substitutions >= self.limit {
            return Err(GrammarError::RecursionLimit { limit: self.limit });
        }
        self.substitutions += 1;
        self.symbols
            .splice(pos..pos + 1, expression.symbols().iter().cloned());
        Ok(())
    }
}

impl<T, I: SymbolIndex> Generator<T> for SentenceGenerator<I> {
    type Output = Vec<Arc<Terminal<T>>>;

    fn generate(&mut self, cfg: &Cfg<T>) -> Result<Self::Output> {
        let mut sentence = Sentence {
            symbols: vec![Symbol::NonTerminal(Arc::clone(cfg.start()))],
            substitutions: 0,
            limit: self.config.limit,
        };
        derive(cfg, &mut self.index, self.config.expansion, &mut sentence)?;

        Ok(sentence
            .symbols
            .into_iter()
            .filter_map(|symbol| match symbol {
                Symbol::Terminal(t) => Some(t),
                Symbol::NonTerminal(_) => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnf;
    use crate::generator::{Expansion, join};
    use crate::index::{Codons, RandomIndex};
    use crate::utils::ErrorKind;

    const ARITHMETIC: &str = r#"
        <expr> ::= <num> | '(' <expr> <op> <expr> ')'
        <op>   ::= + | -
        <num>  ::= 1 | 2
    "#;

    /// Returns 1 on the first call and 0 afterwards
    fn one_then_zeros() -> impl FnMut(usize) -> usize {
        let mut first = true;
        move |_| {
            if first {
                first = false;
                1
            } else {
                0
            }
        }
    }

    fn zeros(_: usize) -> usize {
        0
    }

    fn generate(text: &str, index: impl SymbolIndex, config: GeneratorConfig) -> Result<String> {
        let cfg = bnf::parse(text)?;
        let mut generator = SentenceGenerator::with_config(index, config);
        Ok(join(&generator.generate(&cfg)?, ""))
    }

    #[test]
    fn test_scripted_decisions() {
        for expansion in [Expansion::LeftFirst, Expansion::LeftToRight] {
            let config = GeneratorConfig::new(100).with_expansion(expansion);
            let sentence = generate(ARITHMETIC, one_then_zeros(), config).unwrap();
            assert_eq!(sentence, "(1+1)");
        }
    }

    #[test]
    fn test_decisions_are_requested_per_substitution() {
        let cfg = bnf::parse(ARITHMETIC).unwrap();
        let mut bounds = Vec::new();
        let mut index = |bound: usize| -> usize {
            bounds.push(bound);
            if bounds.len() == 1 { 1 } else { 0 }
        };
        let mut generator = SentenceGenerator::new(&mut index, 100);
        generator.generate(&cfg).unwrap();
        drop(generator);

        // expr, expr, num, op, expr, num
        assert_eq!(bounds, vec![2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_orderings_diverge_on_multiple_pending() {
        let text = "<s> ::= <a> <b>\n<a> ::= x | <c> <c>\n<b> ::= y | z\n<c> ::= p | q";
        let scripted = || {
            let mut decisions = vec![0usize, 1, 0, 1].into_iter();
            move |_: usize| -> usize { decisions.next().unwrap_or(0) }
        };

        let left_first = generate(text, scripted(), GeneratorConfig::new(10)).unwrap();
        let left_to_right = generate(
            text,
            scripted(),
            GeneratorConfig::new(10).with_expansion(Expansion::LeftToRight),
        )
        .unwrap();

        // Leftmost: s, a -> <c> <c>, c -> p, c -> q, b -> y
        assert_eq!(left_first, "pqy");
        // Sweep: s at the cursor, which then moves on to b -> z; the next
        // sweep expands a -> x.
        assert_eq!(left_to_right, "xz");
    }

    #[test]
    fn test_non_recursive_grammar_terminates() {
        let text = "<s> ::= <a> <b> | <b>\n<a> ::= x | y\n<b> ::= 1 | 2 | <a>";
        let cfg = bnf::parse(text).unwrap();
        let mut generator = SentenceGenerator::new(RandomIndex::seeded(3), 10);
        for _ in 0..100 {
            let sentence = generator.generate(&cfg).unwrap();
            assert!(!sentence.is_empty());
            assert!(sentence.iter().all(|t| cfg.terminals().contains(t)));
        }
    }

    #[test]
    fn test_result_uses_canonical_terminals() {
        let cfg = bnf::parse("<s> ::= a <s> | a").unwrap();
        let mut generator = SentenceGenerator::new(Codons::new(vec![0, 0, 1]), 10);
        let sentence = generator.generate(&cfg).unwrap();
        assert_eq!(sentence.len(), 3);
        assert!(sentence.iter().all(|t| Arc::ptr_eq(t, &cfg.terminals()[0])));
    }

    #[test]
    fn test_recursion_limit() {
        let text = "<s> ::= a <t>\n<t> ::= b <u>\n<u> ::= c | <s>";
        for expansion in [Expansion::LeftFirst, Expansion::LeftToRight] {
            let config = GeneratorConfig::new(2).with_expansion(expansion);
            let err = generate(text, zeros, config).unwrap_err();
            assert!(matches!(err, GrammarError::RecursionLimit { limit: 2 }));
            assert_eq!(err.kind(), ErrorKind::BoundedRecursion);

            let config = GeneratorConfig::new(3).with_expansion(expansion);
            assert_eq!(generate(text, zeros, config).unwrap(), "abc");
        }
    }

    #[test]
    fn test_endless_recursion_fails() {
        let config = GeneratorConfig::new(1000);
        let err = generate("<loop> ::= x <loop>", RandomIndex::seeded(1), config).unwrap_err();
        assert!(matches!(err, GrammarError::RecursionLimit { limit: 1000 }));
    }

    #[test]
    fn test_missing_rule() {
        let err = generate("<s> ::= <undefined>", zeros, GeneratorConfig::new(10)).unwrap_err();
        assert!(matches!(err, GrammarError::MissingRule(name) if name == "undefined"));
    }

    #[test]
    fn test_zero_limit() {
        let err = generate("<s> ::= a", zeros, GeneratorConfig::new(0)).unwrap_err();
        assert!(matches!(err, GrammarError::RecursionLimit { limit: 0 }));
    }
}
