use crate::error::Error;
use crate::expr::Expression;
use crate::functions::Function;
use crate::lexer::{is_variable, Lexer};
use crate::operator::{is_operator_symbol, Operator};
use crate::postfix::to_postfix;
use hashbrown::HashMap;
use std::sync::Arc;

/// Configure how an expression is scanned before building it.
///
/// # Examples
/// ```
/// # use rpncrunch::{ExpressionBuilder, Function, FunctionFn, Operator, OperatorFn};
/// let mut expr = ExpressionBuilder::new("avg(a, b) >> 1")
///     .function(Function::new("avg", FunctionFn::Binary(|a, b| Ok((a + b) / 2.0))))
///     .operator(Operator::new(">>", 100, true, OperatorFn::Binary(|a, b| a / 2f64.powf(b))))
///     .build()
///     .unwrap();
/// expr.set_variable("a", 6.0).unwrap();
/// expr.set_variable("b", 10.0).unwrap();
/// assert_eq!(expr.evaluate(), Ok(4.0));
/// ```
#[derive(Debug, Clone)]
pub struct ExpressionBuilder<'a> {
    input: &'a str,
    functions: HashMap<String, Arc<Function>>,
    operators: HashMap<String, Arc<Operator>>,
    implicit_multiplication: bool,
}

impl<'a> ExpressionBuilder<'a> {
    /// A builder for `input`, knowing the builtin functions and operators
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            functions: HashMap::new(),
            operators: HashMap::new(),
            implicit_multiplication: true,
        }
    }

    /// Make `function` callable from the expression. It shadows a builtin
    /// function with the same name.
    #[must_use]
    pub fn function(mut self, function: Function) -> Self {
        self.functions
            .insert(function.name().to_string(), Arc::new(function));
        self
    }

    /// Make every function of `functions` callable from the expression
    #[must_use]
    pub fn functions<I: IntoIterator<Item = Function>>(self, functions: I) -> Self {
        functions.into_iter().fold(self, Self::function)
    }

    /// Make `operator` usable in the expression. It shadows the builtin
    /// operators with the same symbol. A unary operator is prefix when right
    /// associative, and postfix when left associative.
    #[must_use]
    pub fn operator(mut self, operator: Operator) -> Self {
        self.operators
            .insert(operator.symbol().to_string(), Arc::new(operator));
        self
    }

    /// Make every operator of `operators` usable in the expression
    #[must_use]
    pub fn operators<I: IntoIterator<Item = Operator>>(self, operators: I) -> Self {
        operators.into_iter().fold(self, Self::operator)
    }

    /// Read `2x` as `2 * x`. Enabled by default.
    #[must_use]
    pub fn implicit_multiplication(mut self, enabled: bool) -> Self {
        self.implicit_multiplication = enabled;
        self
    }

    /// Scan and convert the input to a postfix program. The program is not
    /// validated, see [`Expression::validate`].
    ///
    /// # Examples
    /// ```
    /// # use rpncrunch::ExpressionBuilder;
    /// let expr = ExpressionBuilder::new("2 3")
    ///     .implicit_multiplication(false)
    ///     .build()
    ///     .unwrap();
    /// assert!(!expr.validate(false).is_valid());
    /// ```
    pub fn build(self) -> Result<Expression, Error> {
        for name in self.functions.keys() {
            if !is_variable(name) {
                return Err(Error::Parse(format!("invalid function name '{}'", name)));
            }
        }
        for symbol in self.operators.keys() {
            if !is_operator_symbol(symbol) {
                return Err(Error::Parse(format!("invalid operator symbol '{}'", symbol)));
            }
        }
        if !self.functions.is_empty() || !self.operators.is_empty() {
            debug!(
                "building with {} custom functions and {} custom operators",
                self.functions.len(),
                self.operators.len()
            );
        }

        let tokens = Lexer::new(self.input)
            .with_functions(self.functions)
            .with_operators(self.operators)
            .implicit_multiplication(self.implicit_multiplication)
            .tokenize()?;
        Ok(Expression::from_program(to_postfix(tokens)?))
    }
}
