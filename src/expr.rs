use crate::analyzer::{analyze, check_balance, required_stack_size};
use crate::builder::ExpressionBuilder;
use crate::functions::{is_builtin_function, FunctionFn};
use crate::operator::OperatorFn;
use crate::postfix::to_postfix;
use crate::token::{display_program, InfixToken, Token};
use crate::Error;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Evaluate a single expression from `input`.
///
/// Returns `Ok(result)` if the evaluation is successful, or `Err(cause)` if
/// parsing or evaluating the expression failed.
///
/// # Example
///
/// ```
/// # use std::collections::HashMap;
/// # use rpncrunch::{eval};
///
/// assert_eq!(eval("45 - 2^3", &HashMap::new()), Ok(37.0));
///
/// let mut context :HashMap<String,f64> = HashMap::new();
/// context.insert("a".into(), -5.0);
/// assert_eq!(eval("3 * a", &context), Ok(-15.0));
/// ```
pub fn eval(input: &str, context: &HashMap<String, f64>) -> Result<f64, Error> {
    let mut expr = Expression::parse(input)?;
    expr.set_variables(context)?;
    expr.evaluate()
}

/// The outcome of [`Expression::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Check if no error was found
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Every error found, in program order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// The evaluation stack. Its capacity is the required stack size of the
/// program, so pushing never reallocates.
#[derive(Debug)]
struct Stack {
    values: Vec<f64>,
}

impl Stack {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn push(&mut self, value: f64) {
        debug_assert!(self.values.len() < self.values.capacity());
        self.values.push(value);
    }

    /// Pop a value, `len()` has been checked by the caller
    fn pop(&mut self) -> f64 {
        self.values.pop().unwrap_or(f64::NAN)
    }
}

/// A compiled mathematical expression: a postfix program, the values bound
/// to its variables and a stack to evaluate it.
///
/// Cloning an expression copies the bindings and shares the program, each
/// copy can be evaluated independently.
///
/// # Examples
/// ```
/// # use rpncrunch::Expression;
/// let mut expr = Expression::parse("3 + 5 * 2").unwrap();
/// assert_eq!(expr.evaluate(), Ok(13.0));
///
/// let mut expr = Expression::parse("-2 * a").unwrap();
/// expr.set_variable("a", 42.0).unwrap();
/// assert_eq!(expr.evaluate(), Ok(-84.0));
/// ```
#[derive(Debug)]
pub struct Expression {
    program: Arc<[Token]>,
    variables: HashMap<String, f64>,
    stack_size: usize,
    stack: Stack,
}

impl Clone for Expression {
    fn clone(&self) -> Self {
        Self {
            program: Arc::clone(&self.program),
            variables: self.variables.clone(),
            stack_size: self.stack_size,
            stack: Stack::with_capacity(self.stack_size),
        }
    }
}

impl Expression {
    /// Parse the given mathematical `expression` with the builtin functions
    /// and operators.
    ///
    /// # Examples
    /// ```
    /// # use rpncrunch::Expression;
    /// // A valid expression
    /// assert!(Expression::parse("3 + 5 * 2").is_ok());
    /// // an invalid expression
    /// assert!(Expression::parse("(3 + 5 * 2").is_err());
    /// ```
    pub fn parse(expression: &str) -> Result<Self, Error> {
        ExpressionBuilder::new(expression).build()
    }

    /// Convert and analyze an infix token stream. Analysis errors are
    /// reported as [`Error::Validation`].
    pub fn compile<I>(tokens: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = InfixToken>,
    {
        let program = to_postfix(tokens)?;
        match analyze(program) {
            Ok((stack_size, program)) => Ok(Self::with_stack_size(program, stack_size)),
            Err(errors) => {
                debug!("rejected postfix program: {}", errors.join("; "));
                Err(Error::Validation(errors))
            }
        }
    }

    /// Wrap a postfix program without validating it. Faults in the program
    /// are reported by [`Expression::validate`] or surface as errors from
    /// [`Expression::evaluate`].
    pub fn from_program(program: Vec<Token>) -> Self {
        let stack_size = required_stack_size(&program);
        Self::with_stack_size(program, stack_size)
    }

    fn with_stack_size(program: Vec<Token>, stack_size: usize) -> Self {
        debug!(
            "compiled expression: {} tokens, stack size {}",
            program.len(),
            stack_size
        );
        Self {
            program: program.into(),
            variables: HashMap::new(),
            stack_size,
            stack: Stack::with_capacity(stack_size),
        }
    }

    /// Bind `value` to the variable `name`, overwriting any previous value.
    ///
    /// Fails without touching the bindings if `name` is a builtin function.
    ///
    /// # Examples
    /// ```
    /// # use rpncrunch::{Expression, Error};
    /// let mut expr = Expression::parse("x * 2").unwrap();
    /// assert!(expr.set_variable("x", 5.0).is_ok());
    /// assert_eq!(
    ///     expr.set_variable("sin", 3.0).map(|_| ()),
    ///     Err(Error::NamingConflict("sin".into()))
    /// );
    /// ```
    pub fn set_variable(&mut self, name: &str, value: f64) -> Result<&mut Self, Error> {
        if is_builtin_function(name) {
            warn!("refusing to bind variable '{}', it names a function", name);
            return Err(Error::NamingConflict(name.to_string()));
        }
        if let Some(slot) = self.variables.get_mut(name) {
            *slot = value;
        } else {
            self.variables.insert(name.to_string(), value);
        }
        Ok(self)
    }

    /// Bind every entry of `variables`, stopping at the first naming
    /// conflict. Entries bound before the conflict are kept.
    pub fn set_variables<'a, I>(&mut self, variables: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        for (name, value) in variables {
            self.set_variable(name, *value)?;
        }
        Ok(self)
    }

    /// Remove every binding
    pub fn clear_variables(&mut self) -> &mut Self {
        self.variables.clear();
        self
    }

    /// Check if a value is bound to `name`
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Names of the bound variables
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Names of the variables used by the program.
    ///
    /// # Examples
    /// ```
    /// # use rpncrunch::Expression;
    /// # use std::collections::HashSet;
    /// let expr = Expression::parse("3 + 5 * 2").unwrap();
    /// assert_eq!(expr.variables(), HashSet::new());
    ///
    /// let expr = Expression::parse("a * log(b + a)").unwrap();
    /// assert_eq!(expr.variables(), HashSet::from(["a", "b"]));
    /// ```
    pub fn variables(&self) -> HashSet<&str> {
        self.program
            .iter()
            .filter_map(|token| match token {
                Token::Variable(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The postfix program
    pub fn program(&self) -> &[Token] {
        &self.program
    }

    /// Number of stack slots needed to evaluate the program
    pub fn required_stack_size(&self) -> usize {
        self.stack_size
    }

    /// An independent copy: bindings are copied, the program is shared
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Check the program balance and, if `check_variables` is set, that
    /// every variable it uses has a value.
    ///
    /// # Examples
    /// ```
    /// # use rpncrunch::Expression;
    /// let mut expr = Expression::parse("x + y").unwrap();
    /// expr.set_variable("x", 1.0).unwrap();
    /// assert!(expr.validate(false).is_valid());
    /// assert_eq!(
    ///     expr.validate(true).errors(),
    ///     ["the variable 'y' has not been set"]
    /// );
    /// ```
    pub fn validate(&self, check_variables: bool) -> ValidationResult {
        let mut errors = Vec::new();
        if check_variables {
            for token in self.program.iter() {
                if let Token::Variable(name) = token {
                    if !self.variables.contains_key(name) {
                        errors.push(format!("the variable '{}' has not been set", name));
                    }
                }
            }
        }
        errors.extend(check_balance(&self.program));
        if !errors.is_empty() {
            debug!("validation failed: {}", errors.join("; "));
        }
        ValidationResult::from_errors(errors)
    }

    /// Evaluate the program with the current bindings.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rpncrunch::{Expression, Error};
    /// let mut expr = Expression::parse("3 + a").unwrap();
    /// assert_eq!(expr.evaluate(), Err(Error::UnboundVariable("a".into())));
    ///
    /// expr.set_variable("a", -5.0).unwrap();
    /// assert_eq!(expr.evaluate(), Ok(-2.0));
    /// expr.set_variable("a", 2.0).unwrap();
    /// assert_eq!(expr.evaluate(), Ok(5.0));
    /// ```
    pub fn evaluate(&mut self) -> Result<f64, Error> {
        let stack = &mut self.stack;
        stack.clear();
        for token in self.program.iter() {
            match token {
                Token::Number(value) => stack.push(*value),
                Token::Variable(name) => {
                    let value = self
                        .variables
                        .get(name)
                        .ok_or_else(|| Error::UnboundVariable(name.clone()))?;
                    stack.push(*value);
                }
                Token::Operator(op) => {
                    if stack.len() < op.arity() {
                        return Err(Error::OperandUnderflow(op.symbol().to_string()));
                    }
                    let result = match op.operation() {
                        OperatorFn::Unary(apply) => apply(stack.pop()),
                        OperatorFn::Binary(apply) => {
                            let right = stack.pop();
                            let left = stack.pop();
                            apply(left, right)
                        }
                    };
                    stack.push(result);
                }
                Token::Function(func) => {
                    if stack.len() < func.arity() {
                        return Err(Error::OperandUnderflow(func.name().to_string()));
                    }
                    let result = match func.operation() {
                        FunctionFn::Nullary(apply) => apply()?,
                        FunctionFn::Unary(apply) => apply(stack.pop())?,
                        FunctionFn::Binary(apply) => {
                            let arg2 = stack.pop();
                            let arg1 = stack.pop();
                            apply(arg1, arg2)?
                        }
                    };
                    stack.push(result);
                }
            }
        }
        match stack.len() {
            1 => Ok(stack.pop()),
            0 => Err(Error::Internal("evaluation finished with an empty stack")),
            left => Err(Error::SurplusOperands(left)),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_program(&self.program))
    }
}

#[cfg(test)]
mod tests {
    use super::{Expression, HashMap};
    use crate::functions::{builtin_function, Function};
    use crate::operator::builtin_operator;
    use crate::token::Token;
    use crate::Error;
    use std::collections::HashSet;
    use test_case::test_case;

    fn evaluate(input: &str) -> Result<f64, Error> {
        Expression::parse(input)?.evaluate()
    }

    #[test]
    fn parse() {
        let valid_expressions = [
            "3 + +5e67",
            "(3 + -5)*45",
            "(3. + 5.0)*\t\n45",
            "(3 + 5^5e-6)*45",
            "sin(34.0) ^ sqrt(28.0)",
            "abc.ty8789",
        ];
        for expr in &valid_expressions {
            assert!(Expression::parse(expr).is_ok(), "{}", expr);
        }
    }

    #[test_case("3 + 5" => Ok(8.0) ; "addition")]
    #[test_case("2 - 5" => Ok(-3.0) ; "subtraction")]
    #[test_case("2 * 5" => Ok(10.0) ; "multiplication")]
    #[test_case("10 / 5" => Ok(2.0) ; "division")]
    #[test_case("7 % 4" => Ok(3.0) ; "remainder")]
    #[test_case("2 ^ 3" => Ok(8.0) ; "power")]
    #[test_case("2 ^ 3 ^ 2" => Ok(512.0) ; "power is right associative")]
    #[test_case("8 - 3 - 2" => Ok(3.0) ; "minus is left associative")]
    #[test_case("-2 ^ 2" => Ok(-4.0) ; "power before negation")]
    #[test_case("2 ^ -1" => Ok(0.5) ; "negative exponent")]
    #[test_case("-3" => Ok(-3.0) ; "negative literal")]
    #[test_case("25 + -3" => Ok(22.0) ; "adding a negative")]
    #[test_case("25 - -3" => Ok(28.0) ; "subtracting a negative")]
    #[test_case("3 + 5 * 2" => Ok(13.0) ; "multiplication before addition")]
    #[test_case("sqrt(9)" => Ok(3.0) ; "square root")]
    #[test_case("pow(2, 10)" => Ok(1024.0) ; "binary function")]
    #[test_case("2(3 + 1)" => Ok(8.0) ; "implicit multiplication")]
    #[test_case("1 / 0" => Ok(f64::INFINITY) ; "division follows ieee")]
    #[test_case("cot(0)" => matches Err(Error::Domain(_)) ; "cotangent where tangent is zero")]
    #[test_case("csc(0)" => matches Err(Error::Domain(_)) ; "cosecant where sine is zero")]
    #[test_case("csch(0)" => Ok(0.0) ; "hyperbolic cosecant convention")]
    fn evaluation(input: &str) -> Result<f64, Error> {
        evaluate(input)
    }

    #[test]
    fn sine_of_zero() {
        assert!(evaluate("sin(0)").unwrap().abs() < 1e-15);
    }

    #[test]
    fn variables() {
        let mut expr = Expression::parse("x * 2").unwrap();
        assert_eq!(expr.evaluate(), Err(Error::UnboundVariable("x".into())));
        expr.set_variable("x", 5.0).unwrap();
        assert_eq!(expr.evaluate(), Ok(10.0));

        let expr = Expression::parse("(a + b)^2").unwrap();
        assert_eq!(expr.variables(), HashSet::from(["a", "b"]));
    }

    #[test]
    fn naming_conflict_leaves_bindings_untouched() {
        let mut expr = Expression::parse("x + 1").unwrap();
        expr.set_variable("x", 1.0).unwrap();
        assert_eq!(
            expr.set_variable("sin", 3.0).map(|_| ()),
            Err(Error::NamingConflict("sin".into()))
        );
        assert!(!expr.has_variable("sin"));
        assert_eq!(expr.variable_names().collect::<Vec<_>>(), ["x"]);
    }

    #[test]
    fn set_variables() {
        let mut context: HashMap<String, f64> = HashMap::new();
        context.insert("a".into(), 1.0);
        context.insert("b".into(), 2.0);
        let mut expr = Expression::parse("(a + b)^2").unwrap();
        expr.set_variables(&context).unwrap();
        assert_eq!(expr.evaluate(), Ok(9.0));

        expr.clear_variables();
        assert!(!expr.has_variable("a"));
        assert_eq!(expr.evaluate(), Err(Error::UnboundVariable("a".into())));
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let mut expr = Expression::parse("sin(x) * exp(y) / 3").unwrap();
        expr.set_variable("x", 0.7).unwrap();
        expr.set_variable("y", 1.3).unwrap();
        let first = expr.evaluate().unwrap();
        let second = expr.evaluate().unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn duplicates_are_independent() {
        let mut source = Expression::parse("x * 2").unwrap();
        source.set_variable("x", 1.0).unwrap();
        let mut copy = source.duplicate();
        copy.set_variable("x", 10.0).unwrap();
        source.set_variable("x", 3.0).unwrap();
        assert_eq!(source.evaluate(), Ok(6.0));
        assert_eq!(copy.evaluate(), Ok(20.0));
        assert_eq!(copy.program(), source.program());
        assert_eq!(copy.required_stack_size(), source.required_stack_size());
    }

    #[test]
    fn runtime_errors_leave_expression_reusable() {
        let mut expr = Expression::parse("cot(x)").unwrap();
        expr.set_variable("x", 0.0).unwrap();
        assert!(matches!(expr.evaluate(), Err(Error::Domain(_))));
        expr.set_variable("x", std::f64::consts::FRAC_PI_4).unwrap();
        assert!((expr.evaluate().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unvalidated_programs_fail_at_runtime() {
        let plus = Token::Operator(builtin_operator("+", false).unwrap());
        let pow = Token::Function(builtin_function("pow").unwrap());

        let mut expr = Expression::from_program(vec![Token::Number(3.0), plus]);
        assert_eq!(expr.evaluate(), Err(Error::OperandUnderflow("+".into())));

        let mut expr = Expression::from_program(vec![Token::Number(3.0), pow]);
        assert_eq!(expr.evaluate(), Err(Error::OperandUnderflow("pow".into())));

        let mut expr = Expression::from_program(vec![Token::Number(3.0), Token::Number(4.0)]);
        assert_eq!(expr.evaluate(), Err(Error::SurplusOperands(2)));
        assert_eq!(expr.validate(false).errors(), ["too many operands"]);

        let mut expr = Expression::from_program(Vec::new());
        assert!(matches!(expr.evaluate(), Err(Error::Internal(_))));
        let result = expr.validate(false);
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["empty program"]);
    }

    #[test]
    fn validate() {
        let mut expr = Expression::parse("x * y").unwrap();
        expr.set_variable("x", 2.0).unwrap();
        let result = expr.validate(true);
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["the variable 'y' has not been set"]);
        assert!(expr.validate(false).is_valid());

        let expr = Expression::from_program(vec![
            Token::Number(2.0),
            Token::Function(builtin_function("pow").unwrap()),
        ]);
        assert_eq!(
            expr.validate(false).errors(),
            ["not enough arguments for 'pow'", "too many operators"]
        );
    }

    #[test]
    fn compile_rejects_unbalanced_programs() {
        use crate::lexer::Lexer;
        let tokens = Lexer::new("2 3")
            .implicit_multiplication(false)
            .tokenize()
            .unwrap();
        assert_eq!(
            Expression::compile(tokens).map(|_| ()),
            Err(Error::Validation(vec!["too many operands".into()]))
        );
    }

    #[test]
    fn nullary_functions() {
        use crate::functions::FunctionFn;
        let answer = std::sync::Arc::new(Function::new(
            "answer",
            FunctionFn::Nullary(|| Ok(42.0)),
        ));
        let mut expr = Expression::from_program(vec![
            Token::Function(answer),
            Token::Number(2.0),
            Token::Operator(builtin_operator("/", false).unwrap()),
        ]);
        assert!(expr.validate(false).is_valid());
        assert_eq!(expr.required_stack_size(), 2);
        assert_eq!(expr.evaluate(), Ok(21.0));
    }

    #[test]
    fn display() {
        let expr = Expression::parse("2 ^ 3 ^ 2").unwrap();
        assert_eq!(expr.to_string(), "2 3 2 ^ ^");
    }

    #[test]
    fn shared_across_threads() {
        let mut expr = Expression::parse("x ^ 2").unwrap();
        expr.set_variable("x", 0.0).unwrap();
        let handles: Vec<_> = (1..=4_i32)
            .map(|i| {
                let mut copy = expr.duplicate();
                std::thread::spawn(move || {
                    copy.set_variable("x", f64::from(i)).unwrap();
                    copy.evaluate().unwrap()
                })
            })
            .collect();
        let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, [1.0, 4.0, 9.0, 16.0]);
        assert_eq!(expr.evaluate(), Ok(0.0));
    }
}
