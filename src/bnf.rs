//! Reading and writing grammars in BNF notation.
//!
//! ```text
//! <expr> ::= <num> | '(' <expr> <op> <expr> ')'
//! <op>   ::= + | -
//! <num>  ::= 1 | 2
//! ```

use std::fmt;
use std::fs;
use std::mem;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cfg::{Cfg, Expression, IDENTIFIER, NonTerminal, Rule, Symbol, Terminal};
use crate::tokenizer::{Token, TokenKind, tokenize};
use crate::utils::{GrammarError, Result};

static BARE_TERMINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s:=<>|']+$").expect("valid bare terminal pattern"));

/// A token after non-terminal brackets have been resolved
#[derive(Debug)]
enum Item {
    NonTerminal(String, usize),
    Terminal(String, usize),
    Assign(usize),
    Bar(usize),
}

fn items(tokens: Vec<Token>) -> Result<Vec<Item>> {
    let mut items = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        let pos = token.span.start;
        let item = match token.kind {
            TokenKind::LessThan => {
                let name = match tokens.next() {
                    Some(name)
                        if name.kind == TokenKind::Bare && IDENTIFIER.is_match(&name.value) =>
                    {
                        name.value
                    }
                    _ => {
                        return Err(GrammarError::parse(
                            pos,
                            "expected non-terminal name after '<'",
                        ));
                    }
                };
                match tokens.next() {
                    Some(close) if close.kind == TokenKind::GreaterThan => {}
                    _ => {
                        return Err(GrammarError::parse(
                            pos,
                            format!("missing '>' after '<{}'", name),
                        ));
                    }
                }
                Item::NonTerminal(name, pos)
            }
            TokenKind::GreaterThan => return Err(GrammarError::parse(pos, "unexpected '>'")),
            TokenKind::Assign => Item::Assign(pos),
            TokenKind::Bar => Item::Bar(pos),
            TokenKind::Quoted if token.value.is_empty() => {
                return Err(GrammarError::parse(pos, "empty quoted terminal"));
            }
            TokenKind::Bare | TokenKind::Quoted => Item::Terminal(token.value, pos),
        };
        items.push(item);
    }

    Ok(items)
}

/// Parser state: the pending rule, its closed alternatives and the symbols
/// of the open alternative
#[derive(Default)]
struct RuleCollector {
    rules: Vec<Rule<String>>,
    start: Option<Arc<NonTerminal>>,
    alternatives: Vec<Expression<String>>,
    symbols: Vec<Symbol<String>>,
}

impl RuleCollector {
    fn push(&mut self, symbol: Symbol<String>, pos: usize) -> Result<()> {
        if self.start.is_none() {
            return Err(GrammarError::parse(
                pos,
                format!("symbol '{}' outside of a rule", symbol.name()),
            ));
        }
        self.symbols.push(symbol);
        Ok(())
    }

    fn close_alternative(&mut self, pos: usize) -> Result<()> {
        match &self.start {
            None => Err(GrammarError::parse(pos, "'|' outside of a rule")),
            Some(start) if self.symbols.is_empty() => Err(GrammarError::parse(
                pos,
                format!("empty alternative in rule <{}>", start.name()),
            )),
            Some(_) => {
                let symbols = mem::take(&mut self.symbols);
                self.alternatives.push(Expression::new(symbols)?);
                Ok(())
            }
        }
    }

    fn close_rule(&mut self, pos: usize) -> Result<()> {
        if self.start.is_none() {
            return Ok(());
        }
        self.close_alternative(pos)?;
        if let Some(start) = self.start.take() {
            let alternatives = mem::take(&mut self.alternatives);
            self.rules.push(Rule::new(start, alternatives)?);
        }
        Ok(())
    }
}

/// Parse BNF text into a normalized grammar
pub fn parse(text: &str) -> Result<Cfg<String>> {
    let mut collector = RuleCollector::default();
    let mut items = items(tokenize(text)?)?.into_iter().peekable();

    while let Some(item) = items.next() {
        match item {
            Item::NonTerminal(name, pos) if matches!(items.peek(), Some(Item::Assign(_))) => {
                items.next();
                collector.close_rule(pos)?;
                collector.start = Some(Arc::new(NonTerminal::new(name)?));
            }
            Item::NonTerminal(name, pos) => collector.push(Symbol::non_terminal(name)?, pos)?,
            Item::Terminal(value, pos) => collector.push(Symbol::terminal_of(value)?, pos)?,
            Item::Bar(pos) => collector.close_alternative(pos)?,
            Item::Assign(pos) => {
                return Err(GrammarError::parse(
                    pos,
                    "'::=' must be preceded by a non-terminal",
                ));
            }
        }
    }
    collector.close_rule(text.len())?;

    Cfg::of(collector.rules)
}

/// Parse a grammar from a file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Cfg<String>> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

impl FromStr for Cfg<String> {
    type Err = GrammarError;

    fn from_str(text: &str) -> Result<Self> {
        parse(text)
    }
}

/// Render a grammar as BNF text, one line per rule
pub fn format<T>(cfg: &Cfg<T>) -> String {
    cfg.rules()
        .iter()
        .map(|rule| rule.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A terminal name as it must appear in BNF text
fn terminal_literal(name: &str) -> String {
    if BARE_TERMINAL.is_match(name) {
        return name.to_string();
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('\'');
    for c in name.chars() {
        if c == '\\' || c == '\'' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

impl<T> fmt::Display for Symbol<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::NonTerminal(nt) => write!(f, "{}", nt),
            Symbol::Terminal(t) => write!(f, "{}", terminal_literal(t.name())),
        }
    }
}

impl<T> fmt::Display for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<String> = self.symbols().iter().map(|s| s.to_string()).collect();
        write!(f, "{}", symbols.join(" "))
    }
}

impl<T> fmt::Display for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternatives: Vec<String> =
            self.alternatives().iter().map(|e| e.to_string()).collect();
        write!(f, "{} ::= {}", self.start(), alternatives.join(" | "))
    }
}

impl<T> fmt::Display for Cfg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format(self))
    }
}

impl<T> fmt::Display for Terminal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorKind;

    const EXPRESSION: &str = r#"
        <expr> ::= <num> | <var> | '(' <expr> <op> <expr> ')'
        <op>   ::= + | - | * | /
        <var>  ::= x | y
        <num>  ::= 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9
    "#;

    fn parse_error_position(text: &str) -> usize {
        match parse(text).unwrap_err() {
            GrammarError::Parse { position, .. } => position,
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_expression_grammar() {
        let cfg = parse(EXPRESSION).unwrap();

        assert_eq!(cfg.start().name(), "expr");
        assert_eq!(cfg.rules().len(), 4);
        assert_eq!(cfg.non_terminals().len(), 4);
        assert_eq!(cfg.terminals().len(), 18);

        let expr = &cfg.rules()[0];
        assert_eq!(expr.alternatives().len(), 3);
        let names: Vec<&str> = expr.alternatives()[2]
            .symbols()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["(", "expr", "op", "expr", ")"]);
        assert!(expr.alternatives()[2].symbols()[0].is_terminal());
        assert!(!expr.alternatives()[2].symbols()[1].is_terminal());
    }

    #[test]
    fn test_rule_blocks_are_merged() {
        let split = parse("<var> ::= x\n<var> ::= y").unwrap();
        let joined = parse("<var> ::= x | y").unwrap();
        assert_eq!(split, joined);
    }

    #[test]
    fn test_format() {
        let cfg = parse(EXPRESSION).unwrap();
        let text = format(&cfg);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "<expr> ::= <num> | <var> | ( <expr> <op> <expr> )");
        assert_eq!(lines[1], "<op> ::= + | - | * | /");
        assert_eq!(cfg.to_string(), text);
    }

    #[test]
    fn test_round_trip() {
        let cfg = parse(EXPRESSION).unwrap();
        assert_eq!(parse(&format(&cfg)).unwrap(), cfg);
    }

    #[test]
    fn test_quoted_terminals_round_trip() {
        let text = r"<s> ::= '::=' | '|' | 'a b' | '\'\'' | 'post\\' | '<x>' | back\slash";
        let cfg = parse(text).unwrap();
        let names: Vec<&str> = cfg.terminals().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["::=", "|", "a b", "''", r"post\", "<x>", r"back\slash"]);

        let text = format(&cfg);
        assert_eq!(
            text,
            r"<s> ::= '::=' | '|' | 'a b' | '\'\'' | post\ | '<x>' | back\slash"
        );
        assert_eq!(parse(&text).unwrap(), cfg);
    }

    #[test]
    fn test_assign_without_non_terminal() {
        assert_eq!(parse_error_position("<a> ::= x ::= y"), 10);
        assert_eq!(parse_error_position("::= y"), 0);
    }

    #[test]
    fn test_malformed_non_terminals() {
        assert_eq!(parse_error_position("<a> ::= <> | x"), 8);
        assert_eq!(parse_error_position("<a> ::= <b x"), 8);
        assert_eq!(parse_error_position("<a> ::= b > x"), 10);
    }

    #[test]
    fn test_empty_alternatives() {
        assert_eq!(parse_error_position("<a> ::= x | | y"), 12);
        assert_eq!(parse_error_position("<a> ::= x |"), 11);
        assert_eq!(parse_error_position("<a> ::= <b> ::= x"), 8);
        assert_eq!(parse_error_position("<a> ::= ''"), 8);
    }

    #[test]
    fn test_symbols_outside_of_rule() {
        assert_eq!(parse_error_position("x <a> ::= y"), 0);
        assert_eq!(parse_error_position("| <a> ::= y"), 0);
    }

    #[test]
    fn test_error_taxonomy() {
        assert_eq!(parse("<a> := x").unwrap_err().kind(), ErrorKind::Lexing);
        assert_eq!(parse("<a> ::= 'x").unwrap_err().kind(), ErrorKind::Lexing);
        assert_eq!(parse("::= x").unwrap_err().kind(), ErrorKind::Parsing);

        let err = parse("<expr> ::= <op> | op\n<op> ::= +").unwrap_err();
        assert!(matches!(err, GrammarError::NameCollision(_)));
        assert_eq!(err.kind(), ErrorKind::Construction);

        assert_eq!(parse("").unwrap_err().kind(), ErrorKind::Construction);
    }

    #[test]
    fn test_from_str() {
        let cfg: Cfg = "<greeting> ::= hello <who>\n<who> ::= world".parse().unwrap();
        assert_eq!(cfg.start().name(), "greeting");
        assert_eq!(cfg.rules().len(), 2);
    }

    #[test]
    fn test_undefined_non_terminal_is_allowed() {
        let cfg = parse("<a> ::= <b> | x").unwrap();
        assert_eq!(cfg.non_terminals().len(), 2);
        assert!(cfg.rule(&NonTerminal::new("b").unwrap()).is_none());
    }
}
