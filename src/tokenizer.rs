//! Lexer for the BNF notation.
//!
//! The characters `:`, `=`, `<`, `>`, `|` and `'` are reserved. Quoted
//! tokens decode `\'` and `\\`; any other backslash is kept as is.

use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

use crate::utils::{GrammarError, Result};

const RESERVED: [char; 6] = [':', '=', '<', '>', '|', '\''];

pub const ASSIGN: &str = "::=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LessThan,
    GreaterThan,
    Assign,
    Bar,
    /// An unquoted run of non-reserved, non-whitespace characters
    Bare,
    /// The decoded content of a quoted region
    Quoted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    /// Byte range of the token in the source text
    pub span: Range<usize>,
}

impl Token {
    fn new(value: impl Into<String>, kind: TokenKind, span: Range<usize>) -> Self {
        Token {
            value: value.into(),
            kind,
            span,
        }
    }
}

fn is_assignment(c: char) -> bool {
    c == ':' || c == '='
}

fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

pub struct Tokenizer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Byte offset of the next unread character
    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(pos, _)| pos)
            .unwrap_or(self.input.len())
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        while let Some(&(pos, c)) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '<' => {
                    self.chars.next();
                    return Ok(Some(Token::new("<", TokenKind::LessThan, pos..pos + 1)));
                }
                '>' => {
                    self.chars.next();
                    return Ok(Some(Token::new(">", TokenKind::GreaterThan, pos..pos + 1)));
                }
                '|' => {
                    self.chars.next();
                    if let Some(&(next, n)) = self.chars.peek() {
                        if is_assignment(n) {
                            return Err(GrammarError::lex(
                                next,
                                format!("unexpected '{}' after '|'", n),
                            ));
                        }
                    }
                    return Ok(Some(Token::new("|", TokenKind::Bar, pos..pos + 1)));
                }
                ':' | '=' => return self.lex_assignment(pos).map(Some),
                '\'' => return self.lex_quoted(pos).map(Some),
                _ => return Ok(Some(self.lex_bare(pos))),
            }
        }
        Ok(None)
    }

    fn lex_assignment(&mut self, start: usize) -> Result<Token> {
        let mut run = String::new();
        while let Some(&(pos, c)) = self.chars.peek() {
            if !is_assignment(c) {
                break;
            }
            if run.len() == ASSIGN.len() {
                return Err(GrammarError::lex(
                    pos,
                    format!("unexpected '{}' after '{}'", c, ASSIGN),
                ));
            }
            run.push(c);
            self.chars.next();
        }

        if run != ASSIGN {
            return Err(GrammarError::lex(
                start,
                format!("expected '{}' but found '{}'", ASSIGN, run),
            ));
        }
        let end = self.offset();
        Ok(Token::new(run, TokenKind::Assign, start..end))
    }

    fn lex_quoted(&mut self, start: usize) -> Result<Token> {
        self.chars.next(); // Consume open quote
        let mut value = String::new();

        while let Some((pos, c)) = self.chars.next() {
            match c {
                '\\' => match self.chars.peek() {
                    Some(&(_, escaped)) if escaped == '\'' || escaped == '\\' => {
                        value.push(escaped);
                        self.chars.next();
                    }
                    _ => value.push('\\'),
                },
                '\'' => return Ok(Token::new(value, TokenKind::Quoted, start..pos + 1)),
                _ => value.push(c),
            }
        }

        Err(GrammarError::lex(start, "unterminated quoted terminal"))
    }

    fn lex_bare(&mut self, start: usize) -> Token {
        let mut value = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() || is_reserved(c) {
                break;
            }
            value.push(c);
            self.chars.next();
        }
        let end = self.offset();
        Token::new(value, TokenKind::Bare, start..end)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Split BNF text into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Tokenizer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|token| (token.kind, token.value))
            .collect()
    }

    fn lex_error_position(input: &str) -> usize {
        match tokenize(input).unwrap_err() {
            GrammarError::Lex { position, .. } => position,
            other => panic!("Expected lexing error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize(" \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_rule_tokens() {
        use TokenKind::*;
        let tokens = values("<expr> ::= <num> | '(' x+y");
        let expected = vec![
            (LessThan, "<"),
            (Bare, "expr"),
            (GreaterThan, ">"),
            (Assign, "::="),
            (LessThan, "<"),
            (Bare, "num"),
            (GreaterThan, ">"),
            (Bar, "|"),
            (Quoted, "("),
            (Bare, "x+y"),
        ];
        let expected: Vec<(TokenKind, String)> = expected
            .into_iter()
            .map(|(kind, value)| (kind, value.to_string()))
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("<a> ::= 'b c'").unwrap();
        let spans: Vec<Range<usize>> = tokens.iter().map(|t| t.span.clone()).collect();
        assert_eq!(spans, vec![0..1, 1..2, 2..3, 4..7, 8..13]);
    }

    #[test]
    fn test_assignment_without_spaces() {
        use TokenKind::*;
        let kinds: Vec<TokenKind> = values("<a>::=b|c").into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![LessThan, Bare, GreaterThan, Assign, Bare, Bar, Bare]
        );
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(
            values(r"'\'\''"),
            vec![(TokenKind::Quoted, "''".to_string())]
        );
        assert_eq!(
            values(r"'post\\'"),
            vec![(TokenKind::Quoted, r"post\".to_string())]
        );
        assert_eq!(
            values(r"'a\b'"),
            vec![(TokenKind::Quoted, r"a\b".to_string())]
        );
        assert_eq!(
            values("'::= | <x>'"),
            vec![(TokenKind::Quoted, "::= | <x>".to_string())]
        );
    }

    #[test]
    fn test_bare_backslash_is_verbatim() {
        assert_eq!(
            values(r"a\b \\"),
            vec![
                (TokenKind::Bare, r"a\b".to_string()),
                (TokenKind::Bare, r"\\".to_string())
            ]
        );
    }

    #[test]
    fn test_quote_ends_bare_token() {
        assert_eq!(
            values("ab'cd'"),
            vec![
                (TokenKind::Bare, "ab".to_string()),
                (TokenKind::Quoted, "cd".to_string())
            ]
        );
    }

    #[test]
    fn test_malformed_assignment() {
        assert_eq!(lex_error_position("<a> := b"), 4);
        assert_eq!(lex_error_position("<a> = b"), 4);
        assert_eq!(lex_error_position("<a> ==: b"), 4);
        assert_eq!(lex_error_position("<a> ::== b"), 7);
    }

    #[test]
    fn test_bar_followed_by_assignment() {
        assert_eq!(lex_error_position("a |= b"), 3);
        assert_eq!(lex_error_position("a |::= b"), 3);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(lex_error_position("<a> ::= 'abc"), 8);
        assert_eq!(lex_error_position(r"<a> ::= 'abc\'"), 8);
    }

    #[test]
    fn test_iterator_yields_error() {
        let mut tokenizer = Tokenizer::new("a := b");
        assert!(tokenizer.next().unwrap().is_ok());
        assert!(tokenizer.next().unwrap().is_err());
    }
}
