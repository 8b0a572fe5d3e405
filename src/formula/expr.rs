//! Arithmetic expression AST for scaling formulas.
//!
//! Formulas are parsed once into an [Expr] tree and evaluated against a
//! variable binding. Only literals, variable references, unary minus and the
//! binary operators `+ - * / //` exist; there is no way to reach anything
//! other than arithmetic.

use std::collections::HashMap;
use std::fmt;

use crate::formula::FormulaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Variable lookup used during evaluation.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<f64>;
}

impl Bindings for HashMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Bindings for HashMap<&str, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Expr {
    pub fn parse(input: &str) -> Result<Self, FormulaError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let expr = parser.expression()?;
        if let Some((token, offset)) = parser.tokens.get(parser.pos) {
            return Err(FormulaError::parse(
                input,
                *offset,
                format!("unexpected trailing {token}"),
            ));
        }
        Ok(expr)
    }

    pub fn evaluate(&self, bindings: &dyn Bindings) -> Result<f64, FormulaError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Variable(name) => bindings
                .lookup(name)
                .ok_or_else(|| FormulaError::UnboundVariable(name.clone())),
            Self::Neg(inner) => Ok(-inner.evaluate(bindings)?),
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(bindings)?;
                let rhs = rhs.evaluate(bindings)?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div if rhs == 0.0 => Err(FormulaError::DivisionByZero),
                    BinaryOp::Div => Ok(lhs / rhs),
                    BinaryOp::FloorDiv if rhs == 0.0 => Err(FormulaError::DivisionByZero),
                    BinaryOp::FloorDiv => Ok((lhs / rhs).floor()),
                }
            }
        }
    }

    /// Names of all variables referenced, in first-seen order.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::Neg(inner) => inner.collect_variables(names),
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value:?}"),
            Self::Variable(name) => write!(f, "{name}"),
            Self::Neg(inner) => write!(f, "-({inner})"),
            Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "number {value}"),
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Op(op) => write!(f, "operator '{}'", op.symbol()),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push((Token::Op(BinaryOp::Add), offset));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Op(BinaryOp::Sub), offset));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Op(BinaryOp::Mul), offset));
                i += 1;
            }
            '/' => {
                if chars.get(i + 1).map(|(_, next)| *next) == Some('/') {
                    tokens.push((Token::Op(BinaryOp::FloorDiv), offset));
                    i += 2;
                } else {
                    tokens.push((Token::Op(BinaryOp::Div), offset));
                    i += 1;
                }
            }
            '(' => {
                tokens.push((Token::LParen, offset));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, offset));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                    i += 1;
                }
                // exponent part as produced by f64 Debug formatting, e.g. 1e-5
                if i < chars.len() && (chars[i].1 == 'e' || chars[i].1 == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j].1 == '-' || chars[j].1 == '+') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].1.is_ascii_digit() {
                        while j < chars.len() && chars[j].1.is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let end = chars.get(i).map_or(input.len(), |(o, _)| *o);
                let text = &input[offset..end];
                let value = text.parse::<f64>().map_err(|_| {
                    FormulaError::parse(input, chars[start].0, format!("invalid number '{text}'"))
                })?;
                tokens.push((Token::Number(value), offset));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].1.is_ascii_alphanumeric() || chars[i].1 == '_') {
                    i += 1;
                }
                let end = chars.get(i).map_or(input.len(), |(o, _)| *o);
                tokens.push((Token::Ident(input[offset..end].to_string()), offset));
            }
            other => {
                return Err(FormulaError::parse(
                    input,
                    offset,
                    format!("unexpected character '{other}'"),
                ));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.input.len(), |(_, offset)| *offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    // term := unary (('*' | '/' | '//') unary)*
    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div | BinaryOp::FloorDiv))) =
            self.peek().cloned()
        {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek().cloned() {
            Some(Token::Op(BinaryOp::Sub)) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Op(BinaryOp::Add)) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let offset = self.offset();
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => Ok(Expr::Variable(name)),
            Some(Token::LParen) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(FormulaError::parse(self.input, offset, "unclosed '('")),
                }
            }
            Some(token) => Err(FormulaError::parse(
                self.input,
                offset,
                format!("unexpected {token}"),
            )),
            None => Err(FormulaError::parse(
                self.input,
                offset,
                "unexpected end of formula",
            )),
        }
    }
}
