//! User-defined arithmetic formulas over record fields.
//!
//! Expressions are parsed into a small typed AST and evaluated by a tree
//! walker; only `+ - * /`, unary minus, parentheses, numeric literals and
//! field references exist. Unknown fields and non-numeric operands read as
//! 0, and a non-finite result (division by zero) is stored as 0.
//!
//! # Example
//!
//! ```
//! use insight_forecast::core::Record;
//! use insight_forecast::transform::formula::Formula;
//!
//! let f = Formula::parse("a + b*2").unwrap();
//! let row = Record::new().with("a", 1.0).with("b", 2.0);
//! assert_eq!(f.evaluate(&row), 5.0);
//! ```

use crate::core::Record;
use thiserror::Error;
use tracing::warn;

/// Why an expression was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("malformed number '{0}'")]
    BadNumber(String),
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Deepest expression tree the parser accepts.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
        }
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Field(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn eval(&self, row: &Record) -> f64 {
        match self {
            Expr::Literal(v) => *v,
            Expr::Field(name) => row.number(name).unwrap_or(0.0),
            Expr::Negate(inner) => -inner.eval(row),
            Expr::Binary { op, lhs, rhs } => op.apply(lhs.eval(row), rhs.eval(row)),
        }
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Field(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Negate(inner) => inner.collect_fields(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_fields(out);
                rhs.collect_fields(out);
            }
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

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, FormulaError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' | '-' | '*' | '/' => {
                let op = match c {
                    '+' => BinaryOp::Add,
                    '-' => BinaryOp::Sub,
                    '*' => BinaryOp::Mul,
                    _ => BinaryOp::Div,
                };
                tokens.push((i, Token::Op(op)));
                i += 1;
            }
            '(' => {
                tokens.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::RParen));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // exponent part: 1e3, 2.5E-4
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| FormulaError::BadNumber(text.clone()))?;
                tokens.push((start, Token::Number(value)));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push((start, Token::Ident(chars[start..i].iter().collect())));
            }
            other => return Err(FormulaError::UnexpectedChar { ch: other, pos: i }),
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser:
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := '-' factor | NUMBER | IDENT | '(' expr ')'
/// ```
///
/// Each rule returns the tree together with its depth so that both
/// nesting and long operator chains stay under [`MAX_DEPTH`].
struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn deeper(depth: usize) -> Result<usize, FormulaError> {
        if depth >= MAX_DEPTH {
            Err(FormulaError::TooDeep(MAX_DEPTH))
        } else {
            Ok(depth + 1)
        }
    }

    fn expr(&mut self) -> Result<(Expr, usize), FormulaError> {
        let (mut lhs, mut depth) = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let (rhs, rhs_depth) = self.term()?;
            depth = Self::deeper(depth.max(rhs_depth))?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok((lhs, depth))
    }

    fn term(&mut self) -> Result<(Expr, usize), FormulaError> {
        let (mut lhs, mut depth) = self.factor()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let (rhs, rhs_depth) = self.factor()?;
            depth = Self::deeper(depth.max(rhs_depth))?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok((lhs, depth))
    }

    fn factor(&mut self) -> Result<(Expr, usize), FormulaError> {
        self.nesting = Self::deeper(self.nesting)?;
        let parsed = self.primary();
        self.nesting -= 1;
        parsed
    }

    fn primary(&mut self) -> Result<(Expr, usize), FormulaError> {
        match self.next() {
            Some((_, Token::Op(BinaryOp::Sub))) => {
                let (inner, depth) = self.factor()?;
                Ok((Expr::Negate(Box::new(inner)), Self::deeper(depth)?))
            }
            Some((_, Token::Number(v))) => Ok((Expr::Literal(v), 1)),
            Some((_, Token::Ident(name))) => Ok((Expr::Field(name), 1)),
            Some((_, Token::LParen)) => {
                let inner = self.expr()?;
                match self.next() {
                    Some((_, Token::RParen)) => Ok(inner),
                    Some((pos, _)) => Err(FormulaError::UnexpectedToken(pos)),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((pos, _)) => Err(FormulaError::UnexpectedToken(pos)),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

/// A parsed, reusable formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expr,
}

impl Formula {
    /// Parse an expression. Structural errors are reported, never panics.
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            nesting: 0,
        };
        let (expr, _) = parser.expr()?;
        if let Some((pos, _)) = parser.tokens.get(parser.pos) {
            return Err(FormulaError::UnexpectedToken(*pos));
        }
        Ok(Self { expr })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Field names referenced by the formula, in first-use order.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.expr.collect_fields(&mut out);
        out
    }

    /// Evaluate against one row; non-finite results become 0.
    pub fn evaluate(&self, row: &Record) -> f64 {
        let value = self.expr.eval(row);
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// Add a field computed from `expression` to every row.
///
/// An invalid expression or empty target name leaves the input unchanged.
pub fn apply_formula(records: &[Record], name: &str, expression: &str) -> Vec<Record> {
    if name.trim().is_empty() {
        warn!("formula has no target field name; skipping");
        return records.to_vec();
    }
    let formula = match Formula::parse(expression) {
        Ok(f) => f,
        Err(err) => {
            warn!(%err, expression, "formula rejected; skipping derive step");
            return records.to_vec();
        }
    };
    records
        .iter()
        .map(|row| {
            let mut out = row.clone();
            out.set(name, formula.evaluate(row));
            out
        })
        .collect()
}
