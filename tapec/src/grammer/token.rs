use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos) -> Self {
        Token { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Double character tokens
    LAngleLAngle, // '<<'
    RAngleRAngle, // '>>'
    Arrow,        // '->'

    // Single character tokens
    Equal,     // '='
    Plus,      // '+'
    Minus,     // '-'
    Star,      // '*'
    Slash,     // '/'
    Percent,   // '%'
    Ampasand,  // '&'
    Pipe,      // '|'
    Caret,     // '^'
    Tilde,     // '~'
    Semicolon, // ';'
    Comma,     // ','
    Period,    // '.'
    LParen,    // '('
    RParen,    // ')'
    LBracket,  // '['
    RBracket,  // ']'
    LCurly,    // '{'
    RCurly,    // '}'
    LAngle,    // '<'
    RAngle,    // '>'

    // Keywords
    KwIf,     // "if"
    KwElse,   // "else"
    KwWhile,  // "while"
    KwType,   // "type"
    KwFunc,   // "func"
    KwReturn, // "return"
    KwAsm,    // "asm"
    KwU8,     // "u8"
    KwVoid,   // "void"
    KwAs,     // "as"

    // Identifier
    Ident(String),

    // Literals
    Number(String, u64),

    // Special
    Comment(String), // Comment
    Error(String),   // Error
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let s = match self {
            LAngleLAngle => "<<",
            RAngleRAngle => ">>",
            Arrow => "->",
            Equal => "=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Ampasand => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            Semicolon => ";",
            Comma => ",",
            Period => ".",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LCurly => "{",
            RCurly => "}",
            LAngle => "<",
            RAngle => ">",
            KwIf => "if",
            KwElse => "else",
            KwWhile => "while",
            KwType => "type",
            KwFunc => "func",
            KwReturn => "return",
            KwAsm => "asm",
            KwU8 => "u8",
            KwVoid => "void",
            KwAs => "as",
            Ident(s) | Number(s, _) | Error(s) => s,
            Comment(s) => return write!(f, "// {s}"),
        };
        write!(f, "`{s}`")
    }
}

/// Source position, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}
