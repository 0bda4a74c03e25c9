//! cfg-gen is a context-free grammar engine.
//!
//! Grammars are read from BNF text or built programmatically, normalized into
//! an immutable [`Cfg`], and used to generate random sentences or derivation
//! trees. Every choice between alternatives comes from a pluggable
//! [`SymbolIndex`], so derivations can be random, seeded or fully scripted.
//!
//! # Example
//!
//! ```rust
//! use cfg_gen::{Generator, RandomIndex, SentenceGenerator, bnf, join};
//!
//! let cfg = bnf::parse(
//!     "<greeting> ::= Hello <subject>\n<subject> ::= world | Rust",
//! )
//! .unwrap();
//!
//! let mut generator = SentenceGenerator::new(RandomIndex::seeded(7), 10);
//! let text = join(&generator.generate(&cfg).unwrap(), " ");
//! assert!(text == "Hello world" || text == "Hello Rust");
//! ```

pub mod bnf;
pub mod cfg;
pub mod generator;
pub mod index;
pub mod tokenizer;
pub mod utils;

pub use cfg::{Annotation, Cfg, CfgBuilder, Expression, NonTerminal, Rule, Symbol, Terminal};
pub use generator::{
    DerivationTree, DerivationTreeGenerator, Expansion, Generator, GeneratorConfig, NodeId,
    SentenceGenerator, join,
};
pub use index::{Codons, RandomIndex, SymbolIndex};
pub use utils::{ErrorKind, GrammarError, Result};
