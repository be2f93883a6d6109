#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_docs_in_private_items,
    clippy::non_ascii_literal,
    clippy::module_name_repetitions,
    clippy::cast_possible_wrap
)]

//! rpncrunch, a crate for compiling mathematical expressions to postfix
//! programs and evaluating them repeatedly.
//!
//! The easiest way to use this crate is with the [`eval`](fn.eval.html)
//! function:
//!
//! ```
//! use std::collections::HashMap;
//! assert_eq!(rpncrunch::eval("3 + 5 * 2", &HashMap::new()), Ok(13.0));
//! ```
//!
//! The second argument to `eval` is a `HashMap` that can define variables:
//!
//! ```
//! use std::collections::HashMap;
//!
//! let mut context :HashMap<String,f64> = HashMap::new();
//! context.insert("a".into(), 3.5);
//! assert_eq!(rpncrunch::eval("2 * a", &context), Ok(7.0));
//! ```
//!
//! Compiling once and evaluating many times is done with the
//! [`Expression`](struct.Expression.html) type, which owns the values of its
//! variables and a stack sized for its program:
//!
//! ```
//! use rpncrunch::Expression;
//!
//! let mut expr = Expression::parse("3 / c + b").unwrap();
//! assert!(expr.validate(false).is_valid());
//!
//! expr.set_variable("c", 1.0).unwrap();
//! expr.set_variable("b", 5.0).unwrap();
//! assert_eq!(expr.evaluate(), Ok(8.0));
//!
//! expr.set_variable("b", 10.0).unwrap();
//! assert_eq!(expr.evaluate(), Ok(13.0));
//! ```
//!
//! # Language definition
//!
//! - float literal values: `12`, `0.0045`, `.5`, `4.5e78`, ...;
//! - left and right parenthesis, and `,` between function arguments;
//! - binary operators: `+`, `-`, `*`, `/`, `%` (IEEE remainder) and `^`
//!   (`f64::powf`, right associative), unary `-` and `+`;
//! - variables. Variables names are ASCII only, start by a letter or `_`,
//!   and can contain letters, digits, `.` or `_`;
//! - function calls: `sin(a)`, `pow(2, x)`. The builtin functions are
//!   `sin`, `cos`, `tan`, `cot`, `csc`, `sec`, `sinh`, `cosh`, `tanh`,
//!   `csch`, `sech`, `coth`, `asin`, `acos`, `atan`, `sqrt`, `cbrt`, `abs`,
//!   `ceil`, `floor`, `pow`, `exp`, `expm1`, `log`, `log10`, `log2`,
//!   `log1p`, `logb`, `signum`, `toradian` and `todegree`;
//! - implicit multiplication: `2x`, `2(x + 1)`, `(a)(b)`.
//!
//! Custom functions and operators are registered with an
//! [`ExpressionBuilder`](struct.ExpressionBuilder.html).
//!
//! # Technical details
//!
//! Expressions are scanned to infix tokens, converted to a postfix program
//! with the Shunting-Yard algorithm, and analyzed once to size the
//! evaluation stack. Evaluation is a single pass over the program that does
//! not allocate.
//!
//! Variables are resolved at evaluation time: an unbound variable is an
//! evaluation error, not a parse error. `cot`, `csc` and `sec` report a
//! domain error where they divide by zero, the other functions follow IEEE
//! semantics.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod analyzer;
mod builder;
mod error;
mod expr;
mod functions;
mod lexer;
mod operator;
mod postfix;
mod token;

pub use analyzer::{analyze, check_balance, required_stack_size};
pub use builder::ExpressionBuilder;
pub use error::Error;
pub use expr::{eval, Expression, ValidationResult};
pub use functions::{
    builtin_function, builtin_function_names, is_builtin_function, Function, FunctionFn,
};
pub use lexer::{is_variable, Lexer};
pub use operator::{
    builtin_operator, Operator, OperatorFn, PRECEDENCE_ADDITION, PRECEDENCE_MULTIPLICATION,
    PRECEDENCE_POWER, PRECEDENCE_UNARY,
};
pub use postfix::to_postfix;
pub use token::{display_program, InfixToken, Token};
