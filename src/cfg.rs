//! Symbol model and the normalized context-free grammar.
//!
//! A [`Cfg`] is validated and normalized once, at construction time, and is
//! immutable afterwards. Every distinct symbol is interned: all rules that
//! mention it share the same [`Arc`] allocation.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::utils::{GrammarError, OptionExt, Result};

/// Valid non-terminal names; anything else could not be written back as BNF
pub(crate) static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.\-]+$").expect("valid identifier pattern"));

static NON_TERMINAL_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([^>]+)>$").expect("valid non-terminal pattern"));

/// Opaque user data attached to a symbol, expression or rule.
///
/// Annotations are carried along but never compared or hashed: two elements
/// that differ only in their annotation are equal.
#[derive(Clone)]
pub struct Annotation(Arc<dyn Any + Send + Sync>);

impl Annotation {
    pub fn new<A: Any + Send + Sync>(value: A) -> Self {
        Annotation(Arc::new(value))
    }

    pub fn downcast_ref<A: Any>(&self) -> Option<&A> {
        self.0.downcast_ref()
    }

    /// Whether both annotations wrap the same value allocation
    pub fn same_instance(&self, other: &Annotation) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Annotation(..)")
    }
}

/// An internal grammar symbol, expanded through its rule
#[derive(Debug, Clone, Serialize)]
pub struct NonTerminal {
    name: String,
    #[serde(skip)]
    annotation: Option<Annotation>,
}

impl NonTerminal {
    /// Create a non-terminal; the name must be a non-empty run of word
    /// characters, `.` or `-`
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !IDENTIFIER.is_match(&name) {
            return Err(GrammarError::InvalidGrammar(format!(
                "Invalid non-terminal name: '{}'",
                name
            )));
        }
        Ok(NonTerminal {
            name,
            annotation: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// A copy of this non-terminal carrying `annotation`
    pub fn at(&self, annotation: impl Into<Option<Annotation>>) -> Self {
        NonTerminal {
            name: self.name.clone(),
            annotation: annotation.into(),
        }
    }
}

impl PartialEq for NonTerminal {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NonTerminal {}

impl Hash for NonTerminal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for NonTerminal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NonTerminal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// A leaf grammar symbol with an attached payload
#[derive(Debug, Clone, Serialize)]
pub struct Terminal<T = String> {
    name: String,
    value: T,
    #[serde(skip)]
    annotation: Option<Annotation>,
}

impl<T> Terminal<T> {
    /// Create a terminal; the name must not be empty
    pub fn new(name: impl Into<String>, value: T) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(GrammarError::InvalidGrammar(
                "Terminal name must not be empty".to_string(),
            ));
        }
        Ok(Terminal {
            name,
            value,
            annotation: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }
}

impl<T: Clone> Terminal<T> {
    /// A copy of this terminal carrying `annotation`
    pub fn at(&self, annotation: impl Into<Option<Annotation>>) -> Self {
        Terminal {
            name: self.name.clone(),
            value: self.value.clone(),
            annotation: annotation.into(),
        }
    }
}

impl Terminal<String> {
    /// Create a terminal whose value is its own name
    pub fn of(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Terminal::new(name.clone(), name)
    }
}

impl<T: PartialEq> PartialEq for Terminal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl<T: Eq> Eq for Terminal<T> {}

impl<T: Hash> Hash for Terminal<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value.hash(state);
    }
}

/// A symbol occurrence inside a rule.
///
/// Equality and hashing compare symbol values. Use [`Symbol::same_instance`]
/// to check whether two occurrences share the canonical allocation.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Symbol<T = String> {
    NonTerminal(Arc<NonTerminal>),
    Terminal(Arc<Terminal<T>>),
}

impl<T> Clone for Symbol<T> {
    fn clone(&self) -> Self {
        match self {
            Symbol::NonTerminal(nt) => Symbol::NonTerminal(Arc::clone(nt)),
            Symbol::Terminal(t) => Symbol::Terminal(Arc::clone(t)),
        }
    }
}

impl<T> Symbol<T> {
    /// A freshly allocated non-terminal occurrence
    pub fn non_terminal(name: impl Into<String>) -> Result<Self> {
        Ok(Symbol::NonTerminal(Arc::new(NonTerminal::new(name)?)))
    }

    /// A freshly allocated terminal occurrence
    pub fn terminal(name: impl Into<String>, value: T) -> Result<Self> {
        Ok(Symbol::Terminal(Arc::new(Terminal::new(name, value)?)))
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::NonTerminal(nt) => nt.name(),
            Symbol::Terminal(t) => t.name(),
        }
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Symbol::NonTerminal(nt) => nt.annotation(),
            Symbol::Terminal(t) => t.annotation(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn as_non_terminal(&self) -> Option<&Arc<NonTerminal>> {
        match self {
            Symbol::NonTerminal(nt) => Some(nt),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&Arc<Terminal<T>>> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    /// Whether both occurrences point at the same allocation
    pub fn same_instance(&self, other: &Symbol<T>) -> bool {
        match (self, other) {
            (Symbol::NonTerminal(a), Symbol::NonTerminal(b)) => Arc::ptr_eq(a, b),
            (Symbol::Terminal(a), Symbol::Terminal(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Symbol<String> {
    /// A freshly allocated terminal whose value is its name
    pub fn terminal_of(name: impl Into<String>) -> Result<Self> {
        Ok(Symbol::Terminal(Arc::new(Terminal::of(name)?)))
    }
}

/// One alternative of a rule: a non-empty sequence of symbols
#[derive(Debug, Serialize)]
pub struct Expression<T = String> {
    symbols: Vec<Symbol<T>>,
    #[serde(skip)]
    annotation: Option<Annotation>,
}

impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        Expression {
            symbols: self.symbols.clone(),
            annotation: self.annotation.clone(),
        }
    }
}

impl<T> Expression<T> {
    pub fn new(symbols: Vec<Symbol<T>>) -> Result<Self> {
        if symbols.is_empty() {
            return Err(GrammarError::EmptyProduction(
                "The list of symbols must not be empty".to_string(),
            ));
        }
        Ok(Expression {
            symbols,
            annotation: None,
        })
    }

    pub fn symbols(&self) -> &[Symbol<T>] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// A copy of this expression carrying `annotation`
    pub fn at(&self, annotation: impl Into<Option<Annotation>>) -> Self {
        Expression {
            symbols: self.symbols.clone(),
            annotation: annotation.into(),
        }
    }
}

impl<T: PartialEq> PartialEq for Expression<T> {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl<T: Eq> Eq for Expression<T> {}

impl<T: Hash> Hash for Expression<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbols.hash(state);
    }
}

/// The alternatives of one non-terminal
#[derive(Debug, Serialize)]
pub struct Rule<T = String> {
    start: Arc<NonTerminal>,
    alternatives: Vec<Expression<T>>,
    #[serde(skip)]
    annotation: Option<Annotation>,
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Rule {
            start: Arc::clone(&self.start),
            alternatives: self.alternatives.clone(),
            annotation: self.annotation.clone(),
        }
    }
}

impl<T> Rule<T> {
    pub fn new(start: Arc<NonTerminal>, alternatives: Vec<Expression<T>>) -> Result<Self> {
        if alternatives.is_empty() {
            return Err(GrammarError::EmptyProduction(format!(
                "Rule <{}> has no alternatives",
                start.name()
            )));
        }
        Ok(Rule {
            start,
            alternatives,
            annotation: None,
        })
    }

    pub fn start(&self) -> &Arc<NonTerminal> {
        &self.start
    }

    pub fn alternatives(&self) -> &[Expression<T>] {
        &self.alternatives
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// A copy of this rule carrying `annotation`
    pub fn at(&self, annotation: impl Into<Option<Annotation>>) -> Self {
        Rule {
            start: Arc::clone(&self.start),
            alternatives: self.alternatives.clone(),
            annotation: annotation.into(),
        }
    }

    /// The rule's start followed by every symbol of every alternative
    fn symbols(&self) -> impl Iterator<Item = Symbol<T>> + '_ {
        std::iter::once(Symbol::NonTerminal(Arc::clone(&self.start))).chain(
            self.alternatives
                .iter()
                .flat_map(|expr| expr.symbols.iter().cloned()),
        )
    }
}

impl<T: PartialEq> PartialEq for Rule<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.alternatives == other.alternatives
    }
}

impl<T: Eq> Eq for Rule<T> {}

impl<T: Hash> Hash for Rule<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.alternatives.hash(state);
    }
}

/// A validated, normalized context-free grammar `G = (N, T, R, S)`
#[derive(Debug)]
pub struct Cfg<T = String> {
    non_terminals: Vec<Arc<NonTerminal>>,
    terminals: Vec<Arc<Terminal<T>>>,
    rules: Vec<Rule<T>>,
    start: Arc<NonTerminal>,
    rule_index: HashMap<String, usize>,
}

impl<T> Clone for Cfg<T> {
    fn clone(&self) -> Self {
        Cfg {
            non_terminals: self.non_terminals.clone(),
            terminals: self.terminals.clone(),
            rules: self.rules.clone(),
            start: Arc::clone(&self.start),
            rule_index: self.rule_index.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for Cfg<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.rules == other.rules
    }
}

impl<T: Eq> Eq for Cfg<T> {}

impl<T: Eq + Hash + Clone> Cfg<T> {
    /// Validate and normalize a grammar from its declared symbol sets.
    ///
    /// Rule blocks sharing a start symbol are merged in first-seen order, the
    /// start rule is moved to the front, and every symbol occurrence is
    /// replaced by its first declared instance. Declared symbols no rule
    /// mentions are dropped.
    ///
    /// Declared symbols lose their annotations. Annotated occurrences inside
    /// the rules keep their own allocation.
    pub fn new(
        non_terminals: Vec<Arc<NonTerminal>>,
        terminals: Vec<Arc<Terminal<T>>>,
        rules: Vec<Rule<T>>,
        start: Arc<NonTerminal>,
    ) -> Result<Self> {
        if rules.is_empty() {
            return Err(GrammarError::InvalidGrammar(
                "The list of rules must not be empty".to_string(),
            ));
        }

        let mut declared_non_terminals = Vec::new();
        let mut non_terminal_table: HashSet<Arc<NonTerminal>> = HashSet::new();
        for nt in non_terminals {
            let nt = if nt.annotation.is_some() {
                Arc::new(nt.at(None))
            } else {
                nt
            };
            if non_terminal_table.insert(Arc::clone(&nt)) {
                declared_non_terminals.push(nt);
            }
        }

        let mut declared_terminals = Vec::new();
        let mut terminal_table: HashSet<Arc<Terminal<T>>> = HashSet::new();
        for t in terminals {
            let t = if t.annotation.is_some() {
                Arc::new(t.at(None))
            } else {
                t
            };
            if terminal_table.insert(Arc::clone(&t)) {
                declared_terminals.push(t);
            }
        }

        // Every referenced symbol must be declared.
        let mut missing: Vec<String> = Vec::new();
        let referenced = rules
            .iter()
            .flat_map(|rule| rule.symbols())
            .chain(std::iter::once(Symbol::NonTerminal(Arc::clone(&start))));
        for symbol in referenced {
            let known = match &symbol {
                Symbol::NonTerminal(nt) => non_terminal_table.contains(nt.as_ref()),
                Symbol::Terminal(t) => terminal_table.contains(t.as_ref()),
            };
            let label = match &symbol {
                Symbol::NonTerminal(nt) => format!("<{}>", nt.name()),
                Symbol::Terminal(t) => t.name().to_string(),
            };
            if !known && !missing.contains(&label) {
                missing.push(label);
            }
        }
        if !missing.is_empty() {
            return Err(GrammarError::UnknownSymbols(missing));
        }

        if !rules.iter().any(|rule| rule.start == start) {
            return Err(GrammarError::MissingStartRule(start.name().to_string()));
        }

        let non_terminal_names: HashSet<&str> =
            declared_non_terminals.iter().map(|nt| nt.name()).collect();
        let mut collisions: Vec<String> = declared_terminals
            .iter()
            .map(|t| t.name())
            .filter(|name| non_terminal_names.contains(name))
            .map(str::to_string)
            .collect();
        if !collisions.is_empty() {
            collisions.sort();
            collisions.dedup();
            return Err(GrammarError::NameCollision(collisions));
        }

        let canonical_non_terminal = |nt: &Arc<NonTerminal>| -> Arc<NonTerminal> {
            match non_terminal_table.get(nt.as_ref()) {
                Some(found) if nt.annotation.is_none() => Arc::clone(found),
                _ => Arc::clone(nt),
            }
        };
        let canonical = |symbol: &Symbol<T>| -> Symbol<T> {
            match symbol {
                Symbol::NonTerminal(nt) => Symbol::NonTerminal(canonical_non_terminal(nt)),
                Symbol::Terminal(t) => match terminal_table.get(t.as_ref()) {
                    Some(found) if t.annotation.is_none() => Symbol::Terminal(Arc::clone(found)),
                    _ => symbol.clone(),
                },
            }
        };

        // Merge rule blocks with the same start symbol. The first block's
        // annotation is kept.
        let mut merged: Vec<Rule<T>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for rule in &rules {
            let alternatives = rule.alternatives.iter().map(|expr| Expression {
                symbols: expr.symbols.iter().map(&canonical).collect(),
                annotation: expr.annotation.clone(),
            });
            match positions.get(rule.start.name()) {
                Some(&pos) => merged[pos].alternatives.extend(alternatives),
                None => {
                    positions.insert(rule.start.name().to_string(), merged.len());
                    merged.push(Rule {
                        start: canonical_non_terminal(&rule.start),
                        alternatives: alternatives.collect(),
                        annotation: rule.annotation.clone(),
                    });
                }
            }
        }

        let start_pos = positions
            .get(start.name())
            .copied()
            .ok_or_grammar_err(|| format!("No rule found for start symbol <{}>", start.name()))?;
        let start_rule = merged.remove(start_pos);
        merged.insert(0, start_rule);
        let rules = merged;

        let mut used_non_terminals: HashSet<&str> = HashSet::new();
        let mut used_terminals: HashSet<&Terminal<T>> = HashSet::new();
        for rule in &rules {
            used_non_terminals.insert(rule.start.name());
            for symbol in rule.alternatives.iter().flat_map(|e| e.symbols.iter()) {
                match symbol {
                    Symbol::NonTerminal(nt) => {
                        used_non_terminals.insert(nt.name());
                    }
                    Symbol::Terminal(t) => {
                        used_terminals.insert(t.as_ref());
                    }
                }
            }
        }
        let non_terminals: Vec<Arc<NonTerminal>> = declared_non_terminals
            .into_iter()
            .filter(|nt| used_non_terminals.contains(nt.name()))
            .collect();
        let terminals: Vec<Arc<Terminal<T>>> = declared_terminals
            .into_iter()
            .filter(|t| used_terminals.contains(t.as_ref()))
            .collect();

        let start = non_terminal_table
            .get(start.as_ref())
            .map(Arc::clone)
            .unwrap_or(start);
        let rule_index = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.start.name().to_string(), i))
            .collect();

        Ok(Cfg {
            non_terminals,
            terminals,
            rules,
            start,
            rule_index,
        })
    }

    /// Build a grammar from rules alone; the first rule's start symbol is
    /// the grammar's start symbol
    pub fn of(rules: Vec<Rule<T>>) -> Result<Self> {
        let start = rules
            .first()
            .map(|rule| Arc::clone(&rule.start))
            .ok_or_grammar_err(|| "The list of rules must not be empty".to_string())?;
        let (non_terminals, terminals) = declared_symbols(&rules);
        Cfg::new(non_terminals, terminals, rules, start)
    }

    /// Map every terminal payload, keeping the grammar structure.
    ///
    /// `mapper` runs once per canonical terminal. Terminals that become equal
    /// after mapping collapse into one canonical instance. Annotations are
    /// carried over.
    pub fn map<A, F>(&self, mut mapper: F) -> Cfg<A>
    where
        A: Eq + Hash + Clone,
        F: FnMut(&Terminal<T>) -> A,
    {
        let mut table: HashSet<Arc<Terminal<A>>> = HashSet::new();
        let mut terminals = Vec::new();
        let mut mapping: HashMap<&Terminal<T>, Arc<Terminal<A>>> = HashMap::new();

        for terminal in &self.terminals {
            let mapped = Terminal {
                name: terminal.name.clone(),
                value: mapper(terminal),
                annotation: None,
            };
            let canonical = match table.get(&mapped) {
                Some(found) => Arc::clone(found),
                None => {
                    let created = Arc::new(mapped);
                    table.insert(Arc::clone(&created));
                    terminals.push(Arc::clone(&created));
                    created
                }
            };
            mapping.insert(terminal.as_ref(), canonical);
        }

        let map_terminal = |t: &Arc<Terminal<T>>| -> Arc<Terminal<A>> {
            let canonical = &mapping[&**t];
            if t.annotation.is_some() {
                Arc::new(canonical.at(t.annotation.clone()))
            } else {
                Arc::clone(canonical)
            }
        };

        let rules = self
            .rules
            .iter()
            .map(|rule| Rule {
                start: Arc::clone(&rule.start),
                alternatives: rule
                    .alternatives
                    .iter()
                    .map(|expr| Expression {
                        symbols: expr
                            .symbols
                            .iter()
                            .map(|symbol| match symbol {
                                Symbol::NonTerminal(nt) => Symbol::NonTerminal(Arc::clone(nt)),
                                Symbol::Terminal(t) => Symbol::Terminal(map_terminal(t)),
                            })
                            .collect(),
                        annotation: expr.annotation.clone(),
                    })
                    .collect(),
                annotation: rule.annotation.clone(),
            })
            .collect();

        Cfg {
            non_terminals: self.non_terminals.clone(),
            terminals,
            rules,
            start: Arc::clone(&self.start),
            rule_index: self.rule_index.clone(),
        }
    }
}

impl<T> Cfg<T> {
    pub fn non_terminals(&self) -> &[Arc<NonTerminal>] {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &[Arc<Terminal<T>>] {
        &self.terminals
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn start(&self) -> &Arc<NonTerminal> {
        &self.start
    }

    /// The rule of the given non-terminal, if any
    pub fn rule(&self, start: &NonTerminal) -> Option<&Rule<T>> {
        self.rule_index
            .get(start.name())
            .map(|&index| &self.rules[index])
    }

    /// All canonical symbols, non-terminals first
    pub fn symbols(&self) -> impl Iterator<Item = Symbol<T>> + '_ {
        self.non_terminals
            .iter()
            .map(|nt| Symbol::NonTerminal(Arc::clone(nt)))
            .chain(self.terminals.iter().map(|t| Symbol::Terminal(Arc::clone(t))))
    }
}

impl Cfg<String> {
    pub fn builder() -> CfgBuilder {
        CfgBuilder::new()
    }
}

/// Distinct symbols of the rules in first-seen order, by value
fn declared_symbols<T: Eq + Hash>(
    rules: &[Rule<T>],
) -> (Vec<Arc<NonTerminal>>, Vec<Arc<Terminal<T>>>) {
    let mut non_terminals = Vec::new();
    let mut terminals = Vec::new();
    let mut seen_non_terminals: HashSet<Arc<NonTerminal>> = HashSet::new();
    let mut seen_terminals: HashSet<Arc<Terminal<T>>> = HashSet::new();

    for symbol in rules.iter().flat_map(|rule| rule.symbols()) {
        match symbol {
            Symbol::NonTerminal(nt) => {
                if seen_non_terminals.insert(Arc::clone(&nt)) {
                    non_terminals.push(nt);
                }
            }
            Symbol::Terminal(t) => {
                if seen_terminals.insert(Arc::clone(&t)) {
                    terminals.push(t);
                }
            }
        }
    }

    (non_terminals, terminals)
}

/// Builder for constructing `Cfg<String>` instances from string rules.
///
/// Elements written as `<name>` are non-terminals, everything else is a
/// terminal whose value is its name.
#[derive(Debug, Default)]
pub struct CfgBuilder {
    start: Option<String>,
    rules: Vec<Rule<String>>,
    error: Option<GrammarError>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        CfgBuilder::default()
    }

    /// Use the given non-terminal as start symbol instead of the first rule's
    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    /// Add one alternative for `non_terminal`
    pub fn add_rule(mut self, non_terminal: &str, elements: &[&str]) -> Self {
        if self.error.is_some() {
            return self;
        }
        match Self::parse_rule(non_terminal, elements) {
            Ok(rule) => self.rules.push(rule),
            Err(err) => self.error = Some(err),
        }
        self
    }

    fn parse_rule(non_terminal: &str, elements: &[&str]) -> Result<Rule<String>> {
        let start = Arc::new(NonTerminal::new(non_terminal)?);
        let symbols = elements
            .iter()
            .map(|element| match NON_TERMINAL_ELEMENT.captures(element) {
                Some(captures) => Symbol::non_terminal(&captures[1]),
                None => Symbol::terminal_of(*element),
            })
            .collect::<Result<Vec<_>>>()?;
        Rule::new(start, vec![Expression::new(symbols)?])
    }

    /// Build the grammar, reporting the first error encountered
    pub fn build(self) -> Result<Cfg<String>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let start = match self.start {
            Some(name) => Arc::new(NonTerminal::new(name)?),
            None => self
                .rules
                .first()
                .map(|rule| Arc::clone(&rule.start))
                .ok_or_grammar_err(|| "Grammar builder has no rules".to_string())?,
        };
        let (non_terminals, terminals) = declared_symbols(&self.rules);
        Cfg::new(non_terminals, terminals, self.rules, start)
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name)
    }
}
