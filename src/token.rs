use crate::functions::Function;
use crate::operator::Operator;
use std::fmt;
use std::sync::Arc;

/// Possible tokens of a postfix program
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A literal value
    Number(f64),
    /// A variable, resolved against the bindings at evaluation time
    Variable(String),
    /// An operator, applied to the values on top of the stack
    Operator(Arc<Operator>),
    /// A function, applied to the values on top of the stack
    Function(Arc<Function>),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Variable(name) => f.write_str(name),
            Self::Operator(op) => write!(f, "{}", op),
            Self::Function(func) => write!(f, "{}", func),
        }
    }
}

/// Possible tokens to find in an infix token stream, as produced by the
/// lexer
#[derive(Debug, Clone, PartialEq)]
pub enum InfixToken {
    /// A literal value
    Number(f64),
    /// A variable name
    Variable(String),
    /// An operator, with its arity already decided
    Operator(Arc<Operator>),
    /// A function name, followed by a parenthesised argument list
    Function(Arc<Function>),
    /// Left parenthesis
    OpenParen,
    /// Right parenthesis
    CloseParen,
    /// Function argument separator
    Separator,
}

impl InfixToken {
    /// Check if the token ends an operand, i.e. a value can not follow it
    /// without an operator in between
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Variable(_) | Self::CloseParen
        )
    }
}

/// Write a postfix program as space separated tokens.
///
/// # Examples
/// ```
/// # use rpncrunch::{to_postfix, display_program, Lexer};
/// let program = to_postfix(Lexer::new("2 ^ 3 ^ 2").tokenize().unwrap()).unwrap();
/// assert_eq!(display_program(&program), "2 3 2 ^ ^");
/// ```
pub fn display_program(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
