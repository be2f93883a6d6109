use crate::error::Error;
use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;

/// The numeric operation behind a function, keyed by arity
#[derive(Debug, Clone, Copy)]
pub enum FunctionFn {
    /// A constant-like function taking no argument
    Nullary(fn() -> Result<f64, Error>),
    /// A function of one argument
    Unary(fn(f64) -> Result<f64, Error>),
    /// A function of two arguments, in declaration order
    Binary(fn(f64, f64) -> Result<f64, Error>),
}

/// An immutable function descriptor.
///
/// # Examples
/// ```
/// # use rpncrunch::{Function, FunctionFn};
/// let hypot = Function::new("hypot", FunctionFn::Binary(|a, b| Ok(a.hypot(b))));
/// assert_eq!(hypot.arity(), 2);
/// assert_eq!(hypot.name(), "hypot");
/// ```
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    operation: FunctionFn,
}

impl Function {
    /// Create a new function descriptor
    pub fn new<S: Into<String>>(name: S, operation: FunctionFn) -> Self {
        Self {
            name: name.into(),
            operation,
        }
    }

    /// The name used to call the function
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments the function takes
    pub fn arity(&self) -> usize {
        match self.operation {
            FunctionFn::Nullary(_) => 0,
            FunctionFn::Unary(_) => 1,
            FunctionFn::Binary(_) => 2,
        }
    }

    /// The numeric operation
    pub fn operation(&self) -> FunctionFn {
        self.operation
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity() == other.arity()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn unary(
    map: &mut HashMap<&'static str, Arc<Function>>,
    name: &'static str,
    op: fn(f64) -> Result<f64, Error>,
) {
    map.insert(name, Arc::new(Function::new(name, FunctionFn::Unary(op))));
}

fn binary(
    map: &mut HashMap<&'static str, Arc<Function>>,
    name: &'static str,
    op: fn(f64, f64) -> Result<f64, Error>,
) {
    map.insert(name, Arc::new(Function::new(name, FunctionFn::Binary(op))));
}

fn reciprocal(value: f64, name: &str) -> Result<f64, Error> {
    if value == 0.0 {
        return Err(Error::Domain(format!("division by zero in {}", name)));
    }
    Ok(1.0 / value)
}

lazy_static! {
    static ref FUNCTIONS: HashMap<&'static str, Arc<Function>> = {
        let mut map = HashMap::<&'static str, Arc<Function>>::new();
        unary(&mut map, "sin", |x| Ok(x.sin()));
        unary(&mut map, "cos", |x| Ok(x.cos()));
        unary(&mut map, "tan", |x| Ok(x.tan()));
        unary(&mut map, "cot", |x| reciprocal(x.tan(), "cotangent"));
        unary(&mut map, "csc", |x| reciprocal(x.sin(), "cosecant"));
        unary(&mut map, "sec", |x| reciprocal(x.cos(), "secant"));
        unary(&mut map, "sinh", |x| Ok(x.sinh()));
        unary(&mut map, "cosh", |x| Ok(x.cosh()));
        unary(&mut map, "tanh", |x| Ok(x.tanh()));
        // csch(0) is zero by convention, sech and coth keep IEEE results
        unary(&mut map, "csch", |x| Ok(if x == 0.0 { 0.0 } else { 1.0 / x.sinh() }));
        unary(&mut map, "sech", |x| Ok(1.0 / x.cosh()));
        unary(&mut map, "coth", |x| Ok(x.cosh() / x.sinh()));
        unary(&mut map, "asin", |x| Ok(x.asin()));
        unary(&mut map, "acos", |x| Ok(x.acos()));
        unary(&mut map, "atan", |x| Ok(x.atan()));
        unary(&mut map, "sqrt", |x| Ok(x.sqrt()));
        unary(&mut map, "cbrt", |x| Ok(libm::cbrt(x)));
        unary(&mut map, "abs", |x| Ok(x.abs()));
        unary(&mut map, "ceil", |x| Ok(x.ceil()));
        unary(&mut map, "floor", |x| Ok(x.floor()));
        binary(&mut map, "pow", |base, exponent| Ok(base.powf(exponent)));
        unary(&mut map, "exp", |x| Ok(x.exp()));
        unary(&mut map, "expm1", |x| Ok(libm::expm1(x)));
        unary(&mut map, "log", |x| Ok(x.ln()));
        unary(&mut map, "log10", |x| Ok(x.log10()));
        unary(&mut map, "log2", |x| Ok(x.ln() / 2f64.ln()));
        unary(&mut map, "log1p", |x| Ok(libm::log1p(x)));
        binary(&mut map, "logb", |base, value| Ok(value.ln() / base.ln()));
        unary(&mut map, "signum", |x| Ok(signum(x)));
        unary(&mut map, "toradian", |x| Ok(x.to_radians()));
        unary(&mut map, "todegree", |x| Ok(x.to_degrees()));
        map.shrink_to_fit();
        map
    };
}

/// Sign of `x`, with `signum(±0) = 0` and `signum(NaN) = 0`
fn signum(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Get the builtin function called `name`. The lookup is exact and case
/// sensitive.
///
/// # Examples
/// ```
/// # use rpncrunch::builtin_function;
/// assert_eq!(builtin_function("pow").map(|f| f.arity()), Some(2));
/// assert!(builtin_function("Sin").is_none());
/// ```
pub fn builtin_function(name: &str) -> Option<Arc<Function>> {
    FUNCTIONS.get(name).cloned()
}

/// Check if `name` is reserved by a builtin function
pub fn is_builtin_function(name: &str) -> bool {
    FUNCTIONS.contains_key(name)
}

/// Names of all builtin functions, in no particular order
pub fn builtin_function_names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};
    use test_case::test_case;

    fn call1(name: &str, x: f64) -> Result<f64, Error> {
        match builtin_function(name).map(|f| f.operation()) {
            Some(FunctionFn::Unary(op)) => op(x),
            other => panic!("{} is not a unary builtin: {:?}", name, other),
        }
    }

    fn call2(name: &str, a: f64, b: f64) -> Result<f64, Error> {
        match builtin_function(name).map(|f| f.operation()) {
            Some(FunctionFn::Binary(op)) => op(a, b),
            other => panic!("{} is not a binary builtin: {:?}", name, other),
        }
    }

    #[test_case("sqrt", 9.0, 3.0)]
    #[test_case("cbrt", 27.0, 3.0)]
    #[test_case("abs", -2.5, 2.5)]
    #[test_case("ceil", 1.2, 2.0)]
    #[test_case("floor", 1.8, 1.0)]
    #[test_case("log2", 8.0, 3.0)]
    #[test_case("log10", 1000.0, 3.0)]
    #[test_case("log", 1.0, 0.0)]
    #[test_case("exp", 0.0, 1.0)]
    #[test_case("expm1", 0.0, 0.0)]
    #[test_case("log1p", 0.0, 0.0)]
    #[test_case("signum", -3.0, -1.0)]
    #[test_case("signum", 0.0, 0.0 ; "signum of zero")]
    #[test_case("signum", -0.0, 0.0 ; "signum of negative zero")]
    #[test_case("signum", 42.0, 1.0)]
    #[test_case("todegree", PI, 180.0)]
    #[test_case("toradian", 180.0, PI)]
    #[test_case("csch", 0.0, 0.0 ; "csch at zero by convention")]
    fn unary_builtins(name: &str, x: f64, expected: f64) {
        let value = call1(name, x).unwrap();
        assert!(
            (value - expected).abs() < 1e-12,
            "{}({}) = {}, expected {}",
            name,
            x,
            value,
            expected
        );
    }

    #[test]
    fn binary_builtins() {
        assert_eq!(call2("pow", 2.0, 10.0), Ok(1024.0));
        assert!((call2("logb", 2.0, 8.0).unwrap() - 3.0).abs() < 1e-12);
        assert!((call2("logb", 10.0, 1000.0).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn reciprocal_trigonometry_domain() {
        assert!(matches!(call1("cot", 0.0), Err(Error::Domain(_))));
        assert!(matches!(call1("csc", 0.0), Err(Error::Domain(_))));
        assert!((call1("cot", PI / 4.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((call1("sec", 0.0).unwrap() - 1.0).abs() < 1e-12);
        // cos(pi/2) is not exactly zero in f64
        assert!(call1("sec", FRAC_PI_2).unwrap().is_finite());
    }

    #[test]
    fn reciprocal_hyperbolic_at_zero() {
        assert_eq!(call1("csch", 0.0), Ok(0.0));
        assert_eq!(call1("sech", 0.0), Ok(1.0));
        assert_eq!(call1("coth", 0.0), Ok(f64::INFINITY));
    }

    #[test]
    fn catalog() {
        assert_eq!(builtin_function_names().count(), 31);
        for name in builtin_function_names() {
            assert!(is_builtin_function(name));
            assert_eq!(builtin_function(name).unwrap().name(), name);
        }
        assert!(!is_builtin_function("ln"));
        assert!(!is_builtin_function("SIN"));
        assert!(!is_builtin_function("si"));
    }
}
