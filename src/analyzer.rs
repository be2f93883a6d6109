use crate::token::Token;

/// Message for a function called with fewer values than its arity
pub fn not_enough_arguments(name: &str) -> String {
    format!("not enough arguments for '{}'", name)
}

/// Message for a program whose operators consume every value
pub const TOO_MANY_OPERATORS: &str = "too many operators";
/// Message for a program leaving more than one value
pub const TOO_MANY_OPERANDS: &str = "too many operands";
/// Message for a program without any token
pub const EMPTY_PROGRAM: &str = "empty program";

/// Analyze a postfix program: compute the stack size needed to evaluate it
/// and check that its operands, operators and functions balance.
///
/// Returns the required stack size along with the program, or every
/// validation message found.
///
/// # Examples
/// ```
/// # use rpncrunch::{analyze, to_postfix, Lexer};
/// let program = to_postfix(Lexer::new("1 + 2 * 3").tokenize().unwrap()).unwrap();
/// let (stack_size, _program) = analyze(program).unwrap();
/// assert_eq!(stack_size, 3);
///
/// let tokens = Lexer::new("1 2")
///     .implicit_multiplication(false)
///     .tokenize()
///     .unwrap();
/// let program = to_postfix(tokens).unwrap();
/// assert_eq!(analyze(program), Err(vec!["too many operands".to_string()]));
/// ```
pub fn analyze(program: Vec<Token>) -> Result<(usize, Vec<Token>), Vec<String>> {
    let stack_size = required_stack_size(&program);
    let errors = check_balance(&program);
    if errors.is_empty() {
        Ok((stack_size, program))
    } else {
        Err(errors)
    }
}

/// Compute the maximum depth the evaluation stack reaches while running
/// `program`, and at least 1.
///
/// This does not validate the program: a token consuming more values than
/// available is counted as if the stack were empty before it produces its
/// result.
pub fn required_stack_size(program: &[Token]) -> usize {
    let mut depth: usize = 0;
    let mut max_depth: usize = 0;
    for token in program {
        depth = match token {
            Token::Number(_) | Token::Variable(_) => depth + 1,
            Token::Operator(op) => depth.saturating_sub(op.arity()) + 1,
            Token::Function(func) => depth.saturating_sub(func.arity()) + 1,
        };
        max_depth = max_depth.max(depth);
    }
    max_depth.max(1)
}

/// Check that every operator and function has enough values to consume and
/// that exactly one value is left at the end of `program`. An empty program
/// leaves no value and is rejected.
///
/// Stops at the first point where no value is left, later tokens can not be
/// checked meaningfully.
pub fn check_balance(program: &[Token]) -> Vec<String> {
    let mut errors = Vec::new();
    if program.is_empty() {
        errors.push(EMPTY_PROGRAM.to_string());
        return errors;
    }
    let mut count: isize = 0;
    for token in program {
        match token {
            Token::Number(_) | Token::Variable(_) => count += 1,
            Token::Function(func) => {
                let arity = func.arity() as isize;
                if arity > count {
                    errors.push(not_enough_arguments(func.name()));
                }
                if arity > 1 {
                    count -= arity - 1;
                } else if arity == 0 {
                    count += 1;
                }
            }
            Token::Operator(op) => {
                if op.arity() == 2 {
                    count -= 1;
                }
            }
        }
        if count < 1 {
            errors.push(TOO_MANY_OPERATORS.to_string());
            return errors;
        }
    }
    if count > 1 {
        errors.push(TOO_MANY_OPERANDS.to_string());
    }
    errors
}
