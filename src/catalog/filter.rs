use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::store::CatalogError;
use crate::core::table::{Column, Table};

/// Comparison operator in a filter predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// The operator with its operands swapped (`a < b` == `b > a`)
    fn flipped(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
            other => other,
        }
    }

    fn apply<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

/// Literal operand of a comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Number(f64),
    Bool(bool),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
        }
    }
}

/// Typed row predicate over named columns.
///
/// Filters can be built directly or parsed from the string form used by
/// catalog queries, e.g. `"(halo_mass > 1e14) & (is_central == True)"`.
/// Serialized filters use the string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Filter {
    Compare {
        column: String,
        op: CompareOp,
        value: Literal,
    },
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn compare(column: impl Into<String>, op: CompareOp, value: Literal) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            value,
        }
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: f64) -> Self {
        Self::compare(column, CompareOp::Gt, Literal::Number(value))
    }

    /// `column == True` / `column == False`
    pub fn is(column: impl Into<String>, value: bool) -> Self {
        Self::compare(column, CompareOp::Eq, Literal::Bool(value))
    }

    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Filter) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Combine optional filters with `&`
    #[must_use]
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Option<Self> {
        filters.into_iter().reduce(Filter::and)
    }

    /// Column names referenced by the predicate
    #[must_use]
    pub fn columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Compare { column, .. } => {
                out.insert(column.clone());
            }
            Self::And(a, b) | Self::Or(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
            Self::Not(a) => a.collect_columns(out),
        }
    }

    /// Evaluate the predicate on every row of `table`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownQuantity` if a referenced column is
    /// absent, or `CatalogError::InvalidFilter` if a comparison does not fit
    /// the column kind (e.g. `<` on a boolean column).
    pub fn evaluate(&self, table: &Table) -> Result<Vec<bool>, CatalogError> {
        match self {
            Self::Compare { column, op, value } => evaluate_compare(table, column, *op, *value),
            Self::And(a, b) => {
                let lhs = a.evaluate(table)?;
                let rhs = b.evaluate(table)?;
                Ok(lhs.iter().zip(&rhs).map(|(x, y)| *x && *y).collect())
            }
            Self::Or(a, b) => {
                let lhs = a.evaluate(table)?;
                let rhs = b.evaluate(table)?;
                Ok(lhs.iter().zip(&rhs).map(|(x, y)| *x || *y).collect())
            }
            Self::Not(a) => Ok(a.evaluate(table)?.into_iter().map(|x| !x).collect()),
        }
    }

    /// Parse the string form of a filter
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidFilter` describing the first syntax error.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser { tokens, pos: 0 };
        let filter = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(CatalogError::InvalidFilter(format!(
                "unexpected {token:?} after complete expression in '{text}'"
            )));
        }
        Ok(filter)
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compare { column, op, value } => write!(f, "{column} {} {value}", op.symbol()),
            Self::And(a, b) => write!(f, "({a}) & ({b})"),
            Self::Or(a, b) => write!(f, "({a}) | ({b})"),
            Self::Not(a) => write!(f, "~({a})"),
        }
    }
}

impl std::str::FromStr for Filter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Filter {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.to_string()
    }
}

fn evaluate_compare(
    table: &Table,
    name: &str,
    op: CompareOp,
    value: Literal,
) -> Result<Vec<bool>, CatalogError> {
    let column = table
        .column(name)
        .map_err(|_| CatalogError::UnknownQuantity(name.to_string()))?;

    let equality_only = |kind: &str| {
        if matches!(op, CompareOp::Eq | CompareOp::Ne) {
            Ok(())
        } else {
            Err(CatalogError::InvalidFilter(format!(
                "'{}' is not defined for {kind} comparison on column '{name}'",
                op.symbol()
            )))
        }
    };

    match (column, value) {
        (Column::Float(values), Literal::Number(n)) => {
            Ok(values.iter().map(|&x| op.apply(x, n)).collect())
        }
        #[allow(clippy::cast_precision_loss)]
        (Column::Int(values), Literal::Number(n)) => {
            Ok(values.iter().map(|&x| op.apply(x as f64, n)).collect())
        }
        (Column::Bool(values), Literal::Bool(b)) => {
            equality_only("boolean")?;
            Ok(values.iter().map(|&x| op.apply(x, b)).collect())
        }
        (Column::Int(values), Literal::Bool(b)) => {
            equality_only("boolean")?;
            let target = i64::from(b);
            Ok(values.iter().map(|&x| op.apply(x, target)).collect())
        }
        (Column::Bool(_), Literal::Number(_)) => Err(CatalogError::InvalidFilter(format!(
            "column '{name}' is boolean but compared with a number"
        ))),
        (Column::Float(_), Literal::Bool(_)) => Err(CatalogError::InvalidFilter(format!(
            "column '{name}' is float but compared with a boolean"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Bool(bool),
    Op(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, CatalogError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '&' => {
                tokens.push(Token::And);
                i += if next == Some('&') { 2 } else { 1 };
            }
            '|' => {
                tokens.push(Token::Or);
                i += if next == Some('|') { 2 } else { 1 };
            }
            '~' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Op(CompareOp::Ne));
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '=' if next == Some('=') => {
                tokens.push(Token::Op(CompareOp::Eq));
                i += 2;
            }
            '<' | '>' => {
                let or_equal = next == Some('=');
                let op = match (c, or_equal) {
                    ('<', true) => CompareOp::Le,
                    ('<', false) => CompareOp::Lt,
                    (_, true) => CompareOp::Ge,
                    (_, false) => CompareOp::Gt,
                };
                tokens.push(Token::Op(op));
                i += if or_equal { 2 } else { 1 };
            }
            c if c.is_ascii_digit()
                || c == '.'
                || ((c == '-' || c == '+')
                    && next.is_some_and(|n| n.is_ascii_digit() || n == '.')) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() {
                    let d = chars[i];
                    let exponent_sign =
                        (d == '-' || d == '+') && matches!(chars[i - 1], 'e' | 'E');
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let number = literal.parse::<f64>().map_err(|_| {
                    CatalogError::InvalidFilter(format!("invalid number '{literal}'"))
                })?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "True" | "true" => Token::Bool(true),
                    "False" | "false" => Token::Bool(false),
                    _ => Token::Ident(word),
                });
            }
            other => {
                return Err(CatalogError::InvalidFilter(format!(
                    "unexpected character '{other}' at position {i}"
                )));
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser; `|` binds looser than `&`, which binds looser than `~`
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<Filter, CatalogError> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            lhs = lhs.or(self.parse_and()?);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Filter, CatalogError> {
        let mut lhs = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            lhs = lhs.and(self.parse_unary()?);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Filter, CatalogError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(self.parse_unary()?.not());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Filter, CatalogError> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    other => Err(CatalogError::InvalidFilter(format!(
                        "expected ')', found {other:?}"
                    ))),
                }
            }
            Some(Token::Ident(column)) => {
                let op = self.expect_op()?;
                let value = self.expect_literal()?;
                Ok(Filter::compare(column, op, value))
            }
            Some(Token::Number(n)) => self.reversed_comparison(Literal::Number(n)),
            Some(Token::Bool(b)) => self.reversed_comparison(Literal::Bool(b)),
            other => Err(CatalogError::InvalidFilter(format!(
                "expected a comparison, found {other:?}"
            ))),
        }
    }

    /// `literal op column`
    fn reversed_comparison(&mut self, value: Literal) -> Result<Filter, CatalogError> {
        let op = self.expect_op()?;
        match self.next() {
            Some(Token::Ident(column)) => Ok(Filter::compare(column, op.flipped(), value)),
            other => Err(CatalogError::InvalidFilter(format!(
                "expected a column name, found {other:?}"
            ))),
        }
    }

    fn expect_op(&mut self) -> Result<CompareOp, CatalogError> {
        match self.next() {
            Some(Token::Op(op)) => Ok(op),
            other => Err(CatalogError::InvalidFilter(format!(
                "expected a comparison operator, found {other:?}"
            ))),
        }
    }

    fn expect_literal(&mut self) -> Result<Literal, CatalogError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Literal::Number(n)),
            Some(Token::Bool(b)) => Ok(Literal::Bool(b)),
            other => Err(CatalogError::InvalidFilter(format!(
                "expected a number or True/False, found {other:?}"
            ))),
        }
    }
}
