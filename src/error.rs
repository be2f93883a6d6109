use thiserror::Error;

/// Error type for the rpncrunch crate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Error while scanning or converting an expression to postfix
    #[error("ParseError: {0}")]
    Parse(String),
    /// The postfix program failed validation. Holds every message found,
    /// in program order.
    #[error("ValidationError: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// A variable was read during evaluation without having a value
    #[error("UnboundVariable: no value has been set for the variable '{0}'")]
    UnboundVariable(String),
    /// An operator or function found fewer values on the stack than its
    /// arity
    #[error("OperandUnderflow: not enough operands available for '{0}'")]
    OperandUnderflow(String),
    /// More than one value was left on the stack after a full pass
    #[error("SurplusOperands: {0} values left on the stack after evaluation")]
    SurplusOperands(usize),
    /// A function is undefined at the given argument
    #[error("DomainError: {0}")]
    Domain(String),
    /// A variable name collides with a builtin function name
    #[error("NamingConflict: the variable name '{0}' is invalid, a function with the same name exists")]
    NamingConflict(String),
    /// An evaluation invariant was violated
    #[error("InternalError: {0}")]
    Internal(&'static str),
}
