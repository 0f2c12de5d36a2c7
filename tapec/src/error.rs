use crate::grammer::ast::Type;
use crate::grammer::token::{Pos, Token, TokenKind};
use color_print::cprintln;
use itertools::Itertools;
use std::fmt;
use strum::Display;
use thiserror::Error;

// Token information for error reports
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl From<Token> for TokenInfo {
    fn from(token: Token) -> Self {
        TokenInfo {
            kind: token.kind,
            pos: token.pos,
        }
    }
}

impl From<&Token> for TokenInfo {
    fn from(token: &Token) -> Self {
        TokenInfo {
            kind: token.kind.clone(),
            pos: token.pos,
        }
    }
}

fn expected(list: &[&str]) -> String {
    match list {
        [] => "something else".to_string(),
        [one] => one.to_string(),
        _ => format!("one of {}", list.iter().join(", ")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Category {
    #[strum(serialize = "lexical")]
    Lexical,
    #[strum(serialize = "syntactic")]
    Syntactic,
    #[strum(serialize = "binding")]
    Binding,
    #[strum(serialize = "semantic")]
    Semantic,
    #[strum(serialize = "constant-range")]
    ConstantRange,
    #[strum(serialize = "layout")]
    Layout,
}

#[derive(Debug, Clone, Error)]
pub enum Error {
    // Lexical errors
    #[error("Unknown character `{0}`")]
    UnknownCharacter(String),

    #[error("Number literal `{0}` does not fit in 64 bits")]
    InvalidNumber(String),

    // Parse errors
    #[error("Unexpected end of file, expected {}", expected(.0))]
    UnexpectedEOF(Vec<&'static str>),

    #[error("Unexpected token {tok}, expected {exp}", tok = .0, exp = expected(.1))]
    UnexpectedToken(TokenInfo, Vec<&'static str>),

    #[error("Unbalanced `{0}` in asm block")]
    UnbalancedAsm(char),

    // Range errors
    #[error("Value of {0} overflowed, literals must be at most 255")]
    LiteralOverflow(u64),

    // Binding errors
    #[error("Struct `{0}` is defined multiple times")]
    DuplicateStruct(String),

    #[error("`{1}` is declared multiple times in `{0}`")]
    DuplicateField(String, String),

    #[error("Function `{0}` is defined multiple times")]
    DuplicateFunction(String),

    #[error("`{0}` previously defined here")]
    PreviousDefinition(String),

    #[error("Unknown type `{0}`")]
    UnknownType(String),

    #[error("Struct `{0}` contains itself")]
    RecursiveStruct(String),

    #[error("Field or parameter `{0}` cannot have type `void`")]
    VoidField(String),

    #[error("Recursive call is not supported: {0}")]
    RecursiveCall(String),

    // Semantic errors
    #[error("Unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("Variable `{0}` is already declared in this scope")]
    DuplicateLocal(String),

    #[error("Variable `{0}` cannot have type `void`")]
    VoidVariable(String),

    #[error("Operator `{0}` expects `u8` operands, found `{1}`")]
    OperandType(String, Type),

    #[error("Condition must be `u8`, found `{0}`")]
    ConditionType(Type),

    #[error("Cannot assign `{1}` to `{0}`")]
    MismatchedAssign(Type, Type),

    #[error("Left side of assignment is not a variable or a field")]
    InvalidLValue,

    #[error("Unknown function `{0}`")]
    UnknownFunction(String),

    #[error("No matching signature for `{0}`")]
    NoMatchingSignature(String),

    #[error("Cannot cast `{0}` to `{1}`")]
    InvalidCast(Type, Type),

    #[error("Type `{0}` has no field `{1}`")]
    NoSuchField(Type, String),

    #[error("Function `{0}` may end without returning `{1}`")]
    MissingReturn(String, Type),

    #[error("Expected return value of type `{0}`, found `{1}`")]
    ReturnType(Type, Type),

    #[error("Asm argument cannot have type `void`")]
    VoidArgument,

    #[error("Asm block moves the pointer by {0} cells, it must end where it started")]
    UnbalancedPointer(isize),

    // Layout errors
    #[error("Tape overflow: `{0}` needs {1} cells")]
    TapeOverflow(String, usize),

    #[error("`{0}` was not resolved before code generation")]
    Unresolved(String),
}

impl Error {
    pub fn category(&self) -> Category {
        match self {
            Error::UnknownCharacter(_) | Error::InvalidNumber(_) => Category::Lexical,

            Error::UnexpectedEOF(_) | Error::UnexpectedToken(..) | Error::UnbalancedAsm(_) => {
                Category::Syntactic
            }

            Error::LiteralOverflow(_) => Category::ConstantRange,

            Error::DuplicateStruct(_)
            | Error::DuplicateField(..)
            | Error::DuplicateFunction(_)
            | Error::PreviousDefinition(_)
            | Error::UnknownType(_)
            | Error::RecursiveStruct(_)
            | Error::VoidField(_)
            | Error::RecursiveCall(_) => Category::Binding,

            Error::UnknownVariable(_)
            | Error::DuplicateLocal(_)
            | Error::VoidVariable(_)
            | Error::OperandType(..)
            | Error::ConditionType(_)
            | Error::MismatchedAssign(..)
            | Error::InvalidLValue
            | Error::UnknownFunction(_)
            | Error::NoMatchingSignature(_)
            | Error::InvalidCast(..)
            | Error::NoSuchField(..)
            | Error::MissingReturn(..)
            | Error::ReturnType(..)
            | Error::VoidArgument
            | Error::UnbalancedPointer(_) => Category::Semantic,

            Error::TapeOverflow(..) | Error::Unresolved(_) => Category::Layout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Severity {
    #[strum(serialize = "error")]
    Error,
    #[strum(serialize = "note")]
    Note,
}

/// An error anchored to a source position
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub pos: Pos,
    pub error: Error,
}

impl Diagnostic {
    pub fn error(pos: Pos, error: Error) -> Self {
        Diagnostic {
            severity: Severity::Error,
            pos,
            error,
        }
    }

    pub fn note(pos: Pos, error: Error) -> Self {
        Diagnostic {
            severity: Severity::Note,
            pos,
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn category(&self) -> Category {
        self.error.category()
    }

    pub fn print(&self, file: &str, source: &str) {
        match self.severity {
            Severity::Error => cprintln!("<red,bold>error</>[{}]: {}", self.category(), self),
            Severity::Note => cprintln!("<cyan,bold>note</>: {}", self),
        }
        cprintln!(
            "     <blue>--></> <underline>{}:{}</>",
            file,
            self.pos
        );
        cprintln!("      <blue>|</>");
        let line = source.lines().nth(self.pos.row.saturating_sub(1)).unwrap_or("");
        cprintln!(" <blue>{:>4} |</> {}", self.pos.row, line);
        cprintln!(
            "      <blue>|</> {}<red,bold>^</>",
            " ".repeat(self.pos.col.saturating_sub(1))
        );
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}
