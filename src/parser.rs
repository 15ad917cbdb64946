//! Noun text syntax.
//!
//! `[a b c]` is `[a [b c]]`. Atoms are decimal (`1.000` groups allowed),
//! hexadecimal (`0xff`), or `%term` cords. `::` starts a line comment.
use crate::arena::{Graph, NodeId};
use num_bigint::BigUint;
use num_traits::Num;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected '{0}'")]
    Unexpected(String),
    #[error("cell needs at least two elements")]
    ShortCell,
    #[error("bad atom literal '{0}'")]
    BadAtom(String),
    #[error("trailing input after noun: '{0}'")]
    Trailing(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LBrack,
    RBrack,
    Atom(String),
    Term(String),
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable() }
    }

    fn next_token(&mut self) -> Option<Token> {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }
            match c {
                '[' => { self.chars.next(); return Some(Token::LBrack); }
                ']' => { self.chars.next(); return Some(Token::RBrack); }
                ':' => {
                    // `::` comment to end of line; a lone ':' lexes as a bad atom
                    self.chars.next();
                    if self.chars.peek() == Some(&':') {
                        while let Some(&x) = self.chars.peek() {
                            if x == '\n' { break; }
                            self.chars.next();
                        }
                        continue;
                    }
                    return Some(Token::Atom(":".into()));
                }
                '%' => {
                    self.chars.next();
                    return Some(Token::Term(self.word()));
                }
                _ => return Some(Token::Atom(self.word())),
            }
        }
        None
    }

    fn word(&mut self) -> String {
        let mut s = String::new();
        while let Some(&x) = self.chars.peek() {
            if x.is_whitespace() || x == '[' || x == ']' { break; }
            s.push(x);
            self.chars.next();
        }
        s
    }
}

pub struct Parser<'a> {
    undo: Option<Token>,
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { undo: None, lexer: Lexer::new(input) }
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.undo.is_none() {
            self.undo = self.lexer.next_token();
        }
        self.undo.as_ref()
    }

    fn consume(&mut self) -> Option<Token> {
        if let Some(t) = self.undo.take() { Some(t) } else { self.lexer.next_token() }
    }

    pub fn has_more(&mut self) -> bool {
        self.peek().is_some()
    }

    pub fn parse_noun(&mut self, g: &mut Graph) -> Result<NodeId, ParseError> {
        match self.consume() {
            None => Err(ParseError::UnexpectedEof),
            Some(Token::RBrack) => Err(ParseError::Unexpected("]".into())),
            Some(Token::Atom(text)) => parse_atom(g, &text),
            Some(Token::Term(text)) => Ok(g.cord(&text)),
            Some(Token::LBrack) => {
                let mut elems: Vec<NodeId> = Vec::new();
                loop {
                    match self.peek() {
                        None => return Err(ParseError::UnexpectedEof),
                        Some(Token::RBrack) => {
                            self.consume();
                            break;
                        }
                        Some(_) => elems.push(self.parse_noun(g)?),
                    }
                }
                if elems.len() < 2 {
                    return Err(ParseError::ShortCell);
                }
                let mut acc = elems.pop().ok_or(ParseError::ShortCell)?;
                while let Some(head) = elems.pop() {
                    acc = g.cell(head, acc);
                }
                Ok(acc)
            }
        }
    }
}

fn parse_atom(g: &mut Graph, text: &str) -> Result<NodeId, ParseError> {
    let bad = || ParseError::BadAtom(text.to_string());
    let value = if let Some(hex) = text.strip_prefix("0x") {
        let digits: String = hex.chars().filter(|c| *c != '.').collect();
        BigUint::from_str_radix(&digits, 16).map_err(|_| bad())?
    } else {
        if text.starts_with('.') || text.ends_with('.') || text.contains("..") {
            return Err(bad());
        }
        let digits: String = text.chars().filter(|c| *c != '.').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad());
        }
        BigUint::from_str_radix(&digits, 10).map_err(|_| bad())?
    };
    Ok(g.atom_big(value))
}

/// Parse exactly one noun from `input`.
pub fn parse_noun(g: &mut Graph, input: &str) -> Result<NodeId, ParseError> {
    let mut p = Parser::new(input);
    let noun = p.parse_noun(g)?;
    if let Some(tok) = p.consume() {
        return Err(ParseError::Trailing(format!("{:?}", tok)));
    }
    Ok(noun)
}
