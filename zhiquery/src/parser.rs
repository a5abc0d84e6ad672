//! Recursive-descent parser for bracketed filter expressions.
//!
//! The grammar is
//!
//! ```text
//! Group    := "[" Operand (Operator Operand)* "]"
//! Operand  := Group | Atom
//! Atom     := Kind ":" Argument
//! Operator := "and" | "or"
//! ```
//!
//! Tokens arrive already split (typically straight from the command line), so
//! there is no lexer. Operators inside a group have no precedence: they are
//! applied strictly left to right, which makes `[A and B or C]` read as
//! `(A and B) or C`. Brackets are the only way to group differently.
use crate::errors::SyntaxError;
use crate::predicate::{FilterKind, Predicate};

pub const GROUP_START: &str = "[";
pub const GROUP_END: &str = "]";

const KIND_SEPARATOR: char = ':';
// Groups recurse on the call stack; deeper input is rejected.
const MAX_NESTING: usize = 1_000;

/// Binary operator joining two operands of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "and" => Some(Operator::And),
            "or" => Some(Operator::Or),
            _ => None,
        }
    }

    fn apply(self, lhs: Predicate, rhs: Predicate) -> Predicate {
        match self {
            Operator::And => lhs.and(rhs),
            Operator::Or => lhs.or(rhs),
        }
    }
}

/// Cursor over an immutable token list
#[derive(Debug)]
pub struct Parser<'a, S> {
    tokens: &'a [S],
    pos: usize,
    depth: usize,
}

impl<'a, S: AsRef<str>> Parser<'a, S> {
    pub fn new(tokens: &'a [S]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Number of tokens consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|token| token.as_ref())
    }

    /// Parses one group starting at the cursor, leaving the cursor just past
    /// its closing bracket.
    pub fn parse_group(&mut self) -> Result<Predicate, SyntaxError> {
        let open = self.pos;
        match self.peek() {
            Some(GROUP_START) => self.pos += 1,
            Some(token) => return Err(SyntaxError::MissingGroupStart(token.to_string())),
            None => return Err(SyntaxError::EmptyTokens),
        }

        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(SyntaxError::NestingTooDeep(MAX_NESTING));
        }

        let mut operands = Vec::new();
        let mut operators = Vec::new();

        loop {
            let position = self.pos;
            let Some(token) = self.peek() else {
                return Err(SyntaxError::UnfinishedTokens);
            };
            let expecting_operand = operands.len() == operators.len();

            if token == GROUP_END {
                self.pos += 1;
                self.depth -= 1;
                if operands.is_empty() {
                    return Err(SyntaxError::EmptyGroup(open));
                }
                if expecting_operand {
                    return Err(SyntaxError::DanglingOperator(open));
                }
                return fold_left(operands, operators);
            }

            if let Some(operator) = Operator::from_token(token) {
                if expecting_operand {
                    return Err(SyntaxError::UnexpectedOperator {
                        operator: token.to_string(),
                        position,
                    });
                }
                operators.push(operator);
                self.pos += 1;
                continue;
            }

            if !expecting_operand {
                return Err(SyntaxError::MissingOperator {
                    token: token.to_string(),
                    position,
                });
            }

            let operand = if token == GROUP_START {
                self.parse_group()?
            } else {
                self.pos += 1;
                parse_atom(token)?
            };
            operands.push(operand);
        }
    }
}

/// Parses a single `Kind:argument` token, splitting on the first separator
pub fn parse_atom(token: &str) -> Result<Predicate, SyntaxError> {
    let (kind, arg) = token
        .split_once(KIND_SEPARATOR)
        .ok_or_else(|| SyntaxError::MissingSeparator(token.to_string()))?;
    kind.parse::<FilterKind>()?.build(arg)
}

/// Folds `operands` left to right, joining neighbours with `operators`
fn fold_left(operands: Vec<Predicate>, operators: Vec<Operator>) -> Result<Predicate, SyntaxError> {
    if operators.len() + 1 != operands.len() {
        return Err(SyntaxError::OperatorMismatch {
            operands: operands.len(),
            operators: operators.len(),
            expected: operands.len().saturating_sub(1),
        });
    }

    let mut operands = operands.into_iter();
    let first = operands.next().ok_or(SyntaxError::EmptyGroup(0))?;
    Ok(operators
        .into_iter()
        .zip(operands)
        .fold(first, |acc, (operator, rhs)| operator.apply(acc, rhs)))
}

/// Parses the group at the start of `tokens`.
///
/// Returns the predicate and the number of tokens it spans, both brackets
/// included. Anything after the closing bracket is left untouched.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<(Predicate, usize), SyntaxError> {
    if tokens.is_empty() {
        return Err(SyntaxError::EmptyTokens);
    }
    let mut parser = Parser::new(tokens);
    let predicate = parser.parse_group()?;
    Ok((predicate, parser.position()))
}

/// Parses a whole filter expression, rejecting tokens after the outer group
pub fn compile<S: AsRef<str>>(tokens: &[S]) -> Result<Predicate, SyntaxError> {
    let (predicate, consumed) = parse(tokens)?;
    if consumed < tokens.len() {
        return Err(SyntaxError::TrailingTokens(
            tokens[consumed..]
                .iter()
                .map(|token| token.as_ref().to_string())
                .collect(),
        ));
    }
    Ok(predicate)
}
