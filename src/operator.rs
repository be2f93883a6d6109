use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;

/// Precedence of `+` and `-`
pub const PRECEDENCE_ADDITION: i32 = 500;
/// Precedence of `*`, `/` and `%`
pub const PRECEDENCE_MULTIPLICATION: i32 = 1000;
/// Precedence of the unary `+` and `-`
pub const PRECEDENCE_UNARY: i32 = 5000;
/// Precedence of `^`
pub const PRECEDENCE_POWER: i32 = 10000;

/// Characters an operator symbol can be made of
pub const ALLOWED_OPERATOR_CHARS: &str = "+-*/^%!#§$&;:~<>|=";

/// The numeric operation behind an operator
#[derive(Debug, Clone, Copy)]
pub enum OperatorFn {
    /// Consumes one operand
    Unary(fn(f64) -> f64),
    /// Consumes a left and a right operand
    Binary(fn(f64, f64) -> f64),
}

/// An immutable operator descriptor.
///
/// # Examples
/// ```
/// # use rpncrunch::{Operator, OperatorFn};
/// let factorial = Operator::new("!", 20000, true, OperatorFn::Unary(|x| {
///     (1..=(x as u64)).map(|i| i as f64).product()
/// }));
/// assert_eq!(factorial.arity(), 1);
/// assert_eq!(factorial.apply_unary(4.0), Some(24.0));
/// ```
#[derive(Debug, Clone)]
pub struct Operator {
    symbol: String,
    precedence: i32,
    left_associative: bool,
    operation: OperatorFn,
}

impl Operator {
    /// Create a new operator descriptor
    pub fn new<S: Into<String>>(
        symbol: S,
        precedence: i32,
        left_associative: bool,
        operation: OperatorFn,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            precedence,
            left_associative,
            operation,
        }
    }

    /// The symbol of the operator in infix notation
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of operands consumed by the operator, 1 or 2
    pub fn arity(&self) -> usize {
        match self.operation {
            OperatorFn::Unary(_) => 1,
            OperatorFn::Binary(_) => 2,
        }
    }

    /// Get the operator precedence. Operators with higher precedence should be
    /// evaluated first.
    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    /// Check if the operator is left associative
    pub fn is_left_associative(&self) -> bool {
        self.left_associative
    }

    /// The numeric operation
    pub fn operation(&self) -> OperatorFn {
        self.operation
    }

    /// Apply a unary operator, `None` if the operator is binary
    pub fn apply_unary(&self, operand: f64) -> Option<f64> {
        match self.operation {
            OperatorFn::Unary(op) => Some(op(operand)),
            OperatorFn::Binary(_) => None,
        }
    }

    /// Apply a binary operator, `None` if the operator is unary
    pub fn apply_binary(&self, left: f64, right: f64) -> Option<f64> {
        match self.operation {
            OperatorFn::Binary(op) => Some(op(left, right)),
            OperatorFn::Unary(_) => None,
        }
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.arity() == other.arity()
            && self.precedence == other.precedence
            && self.left_associative == other.left_associative
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Check if `c` can appear in an operator symbol
pub fn is_operator_char(c: char) -> bool {
    ALLOWED_OPERATOR_CHARS.contains(c)
}

/// Check if `symbol` is a non-empty string of operator characters
pub fn is_operator_symbol(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.chars().all(is_operator_char)
}

fn binary(
    symbol: &str,
    precedence: i32,
    left_associative: bool,
    op: fn(f64, f64) -> f64,
) -> Arc<Operator> {
    Arc::new(Operator::new(
        symbol,
        precedence,
        left_associative,
        OperatorFn::Binary(op),
    ))
}

lazy_static! {
    /// Binary builtin operators, keyed by symbol
    static ref BINARY_OPERATORS: HashMap<&'static str, Arc<Operator>> = {
        let mut map = HashMap::<&'static str, Arc<Operator>>::new();
        map.insert("+", binary("+", PRECEDENCE_ADDITION, true, |a, b| a + b));
        map.insert("-", binary("-", PRECEDENCE_ADDITION, true, |a, b| a - b));
        map.insert("*", binary("*", PRECEDENCE_MULTIPLICATION, true, |a, b| a * b));
        map.insert("/", binary("/", PRECEDENCE_MULTIPLICATION, true, |a, b| a / b));
        map.insert("%", binary("%", PRECEDENCE_MULTIPLICATION, true, |a, b| a % b));
        map.insert("^", binary("^", PRECEDENCE_POWER, false, f64::powf));
        map.shrink_to_fit();
        map
    };

    static ref UNARY_MINUS: Arc<Operator> =
        Arc::new(Operator::new("-", PRECEDENCE_UNARY, false, OperatorFn::Unary(|x| -x)));
    static ref UNARY_PLUS: Arc<Operator> =
        Arc::new(Operator::new("+", PRECEDENCE_UNARY, false, OperatorFn::Unary(|x| x)));
}

/// Get the builtin operator for `symbol`. `unary` selects between the unary
/// and binary variants of `+` and `-`; no other builtin operator is unary.
///
/// # Examples
/// ```
/// # use rpncrunch::builtin_operator;
/// assert_eq!(builtin_operator("-", true).unwrap().apply_unary(3.0), Some(-3.0));
/// assert_eq!(builtin_operator("^", false).unwrap().apply_binary(2.0, 3.0), Some(8.0));
/// assert!(builtin_operator("^", true).is_none());
/// ```
pub fn builtin_operator(symbol: &str, unary: bool) -> Option<Arc<Operator>> {
    if unary {
        match symbol {
            "-" => Some(Arc::clone(&UNARY_MINUS)),
            "+" => Some(Arc::clone(&UNARY_PLUS)),
            _ => None,
        }
    } else {
        BINARY_OPERATORS.get(symbol).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("+", 2.0, 3.0 => 5.0 ; "addition")]
    #[test_case("-", 2.0, 3.0 => -1.0 ; "subtraction")]
    #[test_case("*", 2.0, 3.0 => 6.0 ; "multiplication")]
    #[test_case("/", 3.0, 2.0 => 1.5 ; "division")]
    #[test_case("%", 7.0, 3.0 => 1.0 ; "remainder")]
    #[test_case("^", 2.0, 10.0 => 1024.0 ; "power")]
    fn binary_operators(symbol: &str, left: f64, right: f64) -> f64 {
        builtin_operator(symbol, false)
            .and_then(|op| op.apply_binary(left, right))
            .unwrap()
    }

    #[test]
    fn division_by_zero_is_ieee() {
        let div = builtin_operator("/", false).unwrap();
        assert_eq!(div.apply_binary(1.0, 0.0), Some(f64::INFINITY));
        assert!(div.apply_binary(0.0, 0.0).unwrap().is_nan());
    }

    #[test]
    fn precedence_and_associativity() {
        let pow = builtin_operator("^", false).unwrap();
        let neg = builtin_operator("-", true).unwrap();
        let mul = builtin_operator("*", false).unwrap();
        let add = builtin_operator("+", false).unwrap();
        assert!(pow.precedence() > neg.precedence());
        assert!(neg.precedence() > mul.precedence());
        assert!(mul.precedence() > add.precedence());
        assert!(!pow.is_left_associative());
        assert!(add.is_left_associative());
        assert_eq!(neg.arity(), 1);
        assert_eq!(add.arity(), 2);
    }

    #[test]
    fn symbols() {
        assert!(is_operator_symbol("<>"));
        assert!(is_operator_symbol("!"));
        assert!(!is_operator_symbol(""));
        assert!(!is_operator_symbol("a+"));
        assert!(!is_operator_char('('));
    }
}
