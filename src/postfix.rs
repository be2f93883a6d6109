use crate::error::Error;
use crate::functions::Function;
use crate::operator::Operator;
use crate::token::{InfixToken, Token};
use std::sync::Arc;

/// An entry of the operator side-buffer
enum Pending {
    Operator(Arc<Operator>),
    Function(Arc<Function>),
    /// An open parenthesis. `call` is set when it opens the argument list of
    /// the function right below it.
    Paren { call: bool, separators: usize },
}

/// Convert an infix token stream to a postfix program, using the
/// Shunting-Yard algorithm.
///
/// Parenthesis and argument separators are consumed, the output only holds
/// numbers, variables, operators and functions.
///
/// # Examples
/// ```
/// # use rpncrunch::{to_postfix, display_program, Lexer};
/// let tokens = Lexer::new("3 + 4 * pow(2, x)").tokenize().unwrap();
/// let program = to_postfix(tokens).unwrap();
/// assert_eq!(display_program(&program), "3 4 2 x pow * +");
/// ```
pub fn to_postfix<I>(tokens: I) -> Result<Vec<Token>, Error>
where
    I: IntoIterator<Item = InfixToken>,
{
    let mut output = Vec::new();
    let mut operators: Vec<Pending> = Vec::new();
    let mut previous: Option<InfixToken> = None;

    for token in tokens {
        if let Some(InfixToken::Function(ref func)) = previous {
            if token != InfixToken::OpenParen {
                return Err(missing_call_paren(func));
            }
        }

        match token {
            InfixToken::Number(value) => output.push(Token::Number(value)),
            InfixToken::Variable(ref name) => output.push(Token::Variable(name.clone())),
            InfixToken::Function(ref func) => operators.push(Pending::Function(Arc::clone(func))),
            InfixToken::Operator(ref o1) => {
                while let Some(Pending::Operator(o2)) = operators.last() {
                    // a prefix operator has no left operand to steal
                    if o1.arity() == 1 && o2.arity() == 2 {
                        break;
                    }
                    let pop_me = o2.precedence() > o1.precedence()
                        || (o2.precedence() == o1.precedence() && o1.is_left_associative());
                    if !pop_me {
                        break;
                    }
                    output.push(Token::Operator(Arc::clone(o2)));
                    operators.pop();
                }
                operators.push(Pending::Operator(Arc::clone(o1)));
            }
            InfixToken::OpenParen => {
                let call = matches!(previous, Some(InfixToken::Function(_)));
                operators.push(Pending::Paren {
                    call,
                    separators: 0,
                });
            }
            InfixToken::Separator => {
                if matches!(
                    previous,
                    None | Some(InfixToken::OpenParen) | Some(InfixToken::Separator)
                ) {
                    return Err(Error::Parse("missing function argument".into()));
                }
                flush_operators(&mut operators, &mut output);
                match operators.last_mut() {
                    Some(Pending::Paren {
                        call: true,
                        separators,
                    }) => *separators += 1,
                    _ => {
                        return Err(Error::Parse(
                            "misplaced argument separator or mismatched parenthesis".into(),
                        ))
                    }
                }
            }
            InfixToken::CloseParen => {
                if matches!(previous, Some(InfixToken::Separator)) {
                    return Err(Error::Parse("missing function argument".into()));
                }
                let empty = matches!(previous, Some(InfixToken::OpenParen));
                flush_operators(&mut operators, &mut output);
                match operators.pop() {
                    Some(Pending::Paren { call: true, separators }) => {
                        let given = if empty { 0 } else { separators + 1 };
                        match operators.pop() {
                            Some(Pending::Function(func)) => {
                                if func.arity() != given {
                                    return Err(Error::Parse(format!(
                                        "function '{}' expects {} argument(s), got {}",
                                        func.name(),
                                        func.arity(),
                                        given
                                    )));
                                }
                                output.push(Token::Function(func));
                            }
                            _ => return Err(Error::Parse("argument list without a function".into())),
                        }
                    }
                    Some(Pending::Paren { call: false, .. }) => {
                        if empty {
                            return Err(Error::Parse("empty parenthesis".into()));
                        }
                    }
                    _ => return Err(Error::Parse("mismatched parenthesis".into())),
                }
            }
        }
        previous = Some(token);
    }

    if let Some(InfixToken::Function(ref func)) = previous {
        return Err(missing_call_paren(func));
    }

    while let Some(pending) = operators.pop() {
        match pending {
            Pending::Operator(op) => output.push(Token::Operator(op)),
            Pending::Function(func) => output.push(Token::Function(func)),
            Pending::Paren { .. } => return Err(Error::Parse("mismatched parenthesis".into())),
        }
    }

    if output.is_empty() {
        return Err(Error::Parse("empty expression".into()));
    }
    Ok(output)
}

/// Move operators from the side-buffer to the output, up to the innermost
/// open parenthesis
fn flush_operators(operators: &mut Vec<Pending>, output: &mut Vec<Token>) {
    while let Some(Pending::Operator(op)) = operators.last() {
        output.push(Token::Operator(Arc::clone(op)));
        operators.pop();
    }
}

fn missing_call_paren(func: &Function) -> Error {
    Error::Parse(format!("missing '(' after function '{}'", func.name()))
}
