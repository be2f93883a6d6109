use crate::error::Error;
use crate::functions::{builtin_function, Function};
use crate::operator::{builtin_operator, is_operator_char, Operator};
use crate::token::InfixToken;
use hashbrown::HashMap;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

#[must_use]
/// Check if `ident` is a valid variable or function name
///
/// # Examples
///
/// ```
/// # use rpncrunch::is_variable;
///
/// assert_eq!(is_variable("__abc3"), true);
/// assert_eq!(is_variable("x.y_2"), true);
/// assert_eq!(is_variable("34zb"), false);
/// ```
pub fn is_variable(ident: &str) -> bool {
    let mut chars = ident.chars();
    // Check first char
    if !chars.next().map_or(false, is_variable_start) {
        return false;
    }
    // Check all others
    for c in chars {
        if !is_variable_part(c) {
            return false;
        }
    }
    return true;
}

/// An helper struct for scanning the input into infix tokens
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    functions: HashMap<String, Arc<Function>>,
    operators: HashMap<String, Arc<Operator>>,
    implicit_multiplication: bool,
    last: Option<InfixToken>,
}

impl<'a> Lexer<'a> {
    /// A lexer knowing only the builtin functions and operators, with
    /// implicit multiplication enabled
    pub fn new(string: &'a str) -> Lexer<'a> {
        Lexer {
            input: string.chars().peekable(),
            functions: HashMap::new(),
            operators: HashMap::new(),
            implicit_multiplication: true,
            last: None,
        }
    }

    /// Use `functions` in addition to the builtin ones. They take
    /// precedence over builtin functions with the same name.
    #[must_use]
    pub fn with_functions(mut self, functions: HashMap<String, Arc<Function>>) -> Self {
        self.functions = functions;
        self
    }

    /// Use `operators` in addition to the builtin ones. They take
    /// precedence over builtin operators with the same symbol.
    #[must_use]
    pub fn with_operators(mut self, operators: HashMap<String, Arc<Operator>>) -> Self {
        self.operators = operators;
        self
    }

    /// Insert a `*` between two adjacent operands, as in `2x` or `(a)(b)`
    #[must_use]
    pub fn implicit_multiplication(mut self, enabled: bool) -> Self {
        self.implicit_multiplication = enabled;
        self
    }

    /// Scan the whole input.
    ///
    /// # Examples
    /// ```
    /// # use rpncrunch::{Lexer, InfixToken};
    /// let tokens = Lexer::new("2x").tokenize().unwrap();
    /// assert_eq!(tokens.len(), 3);
    /// assert_eq!(tokens[1].to_owned(), InfixToken::Operator(
    ///     rpncrunch::builtin_operator("*", false).unwrap()
    /// ));
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<InfixToken>, Error> {
        let mut output = Vec::new();
        while let Some(token) = self.next_token()? {
            let starts_operand = matches!(
                token,
                InfixToken::Number(_)
                    | InfixToken::Variable(_)
                    | InfixToken::Function(_)
                    | InfixToken::OpenParen
            );
            let after_operand = self.last.as_ref().map_or(false, InfixToken::ends_operand);
            if self.implicit_multiplication && starts_operand && after_operand {
                let mul = self.operator("*", false)?;
                output.push(InfixToken::Operator(mul));
            }
            self.last = Some(token.clone());
            output.push(token);
        }
        Ok(output)
    }

    fn next_token(&mut self) -> Result<Option<InfixToken>, Error> {
        if let Some(&c) = self.input.peek() {
            let token = match c {
                ' ' | '\t' | '\n' | '\r' => {
                    self.input.next();
                    return self.next_token();
                }
                c if c.is_ascii_digit() || c == '.' => self.number()?,
                c if is_variable_start(c) => self.identifier(),
                c if is_operator_char(c) => self.symbol()?,
                '(' => {
                    self.input.next();
                    InfixToken::OpenParen
                }
                ')' => {
                    self.input.next();
                    InfixToken::CloseParen
                }
                ',' => {
                    self.input.next();
                    InfixToken::Separator
                }
                other => {
                    return Err(Error::Parse(format!(
                        "unexpected character in input: {}",
                        other
                    )));
                }
            };
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }

    fn number(&mut self) -> Result<InfixToken, Error> {
        let mut literal = String::new();
        while let Some(&c) = self.input.peek() {
            if c.is_ascii_digit() || c == '.' {
                literal.push(c);
                self.input.next();
            } else {
                break;
            }
        }
        // Only read an exponent if digits follow, `2e` is `2 * e`
        if let Some(&e) = self.input.peek() {
            if e == 'e' || e == 'E' {
                let mut lookahead = self.input.clone();
                lookahead.next();
                let sign = lookahead.next_if(|&c| c == '+' || c == '-');
                if lookahead.peek().map_or(false, char::is_ascii_digit) {
                    literal.push(e);
                    self.input.next();
                    if let Some(sign) = sign {
                        literal.push(sign);
                        self.input.next();
                    }
                    while let Some(c) = self.input.next_if(char::is_ascii_digit) {
                        literal.push(c);
                    }
                }
            }
        }
        literal
            .parse()
            .map(InfixToken::Number)
            .map_err(|_| Error::Parse(format!("invalid number {}", literal)))
    }

    fn identifier(&mut self) -> InfixToken {
        let mut ident = String::new();
        while let Some(c) = self.input.next_if(|&c| is_variable_part(c)) {
            ident.push(c);
        }
        if let Some(func) = self.functions.get(&ident) {
            InfixToken::Function(Arc::clone(func))
        } else if let Some(func) = builtin_function(&ident) {
            InfixToken::Function(func)
        } else {
            InfixToken::Variable(ident)
        }
    }

    fn symbol(&mut self) -> Result<InfixToken, Error> {
        let run: Vec<char> = self
            .input
            .clone()
            .take_while(|&c| is_operator_char(c))
            .collect();
        let unary = match self.last {
            None | Some(InfixToken::OpenParen) | Some(InfixToken::Separator) => true,
            // a left associative unary operator is postfix and ends an operand
            Some(InfixToken::Operator(ref op)) => !(op.arity() == 1 && op.is_left_associative()),
            Some(_) => false,
        };
        // Longest registered symbol wins
        for len in (1..=run.len()).rev() {
            let symbol: String = run[..len].iter().collect();
            if let Ok(op) = self.operator(&symbol, unary) {
                for _ in 0..len {
                    self.input.next();
                }
                return Ok(InfixToken::Operator(op));
            }
        }
        let symbol: String = run.iter().collect();
        Err(Error::Parse(format!("unknown operator {}", symbol)))
    }

    fn operator(&self, symbol: &str, unary: bool) -> Result<Arc<Operator>, Error> {
        self.operators
            .get(symbol)
            .cloned()
            .or_else(|| builtin_operator(symbol, unary))
            .or_else(|| builtin_operator(symbol, false))
            .ok_or_else(|| Error::Parse(format!("unknown operator {}", symbol)))
    }
}

/// Check if `c` can appear at the first character of a variable
fn is_variable_start(c: char) -> bool {
    c == '_' || (c.is_ascii() && c.is_alphabetic())
}

/// Check if `c` can appear inside a variable
fn is_variable_part(c: char) -> bool {
    c == '.' || c == '_' || (c.is_ascii() && c.is_alphanumeric())
}
