use super::token::{Pos, Token, TokenKind};
use crate::error::{Diagnostic, Error};
use itertools::Itertools;
use std::iter::Peekable;

pub struct Parser<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    errors: Vec<Diagnostic>,
    tried: Vec<&'static str>,
    last: Pos,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Parser {
            tokens: tokens.peekable(),
            errors: Vec::new(),
            tried: Vec::new(),
            last: Pos::new(1, 1),
        }
    }

    pub fn error(&mut self, e: Diagnostic) {
        self.errors.push(e);
    }

    pub fn geterrors(self) -> Vec<Diagnostic> {
        self.errors
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    /// Skip all invalid tokens
    fn skip(&mut self) {
        while let Some(token) = self.tokens.peek() {
            match &token.kind {
                TokenKind::Comment(_) | TokenKind::Error(_) => self.tokens.next(),
                _ => break,
            };
        }
    }

    /// Peek : Watch next token without consuming it
    pub fn peek(&mut self) -> Option<&Token> {
        self.skip();
        self.tokens.peek()
    }

    /// Next : Consume next token and return it
    pub fn next(&mut self) -> Option<Token> {
        self.skip();
        let token = self.tokens.next()?;
        self.last = token.pos;
        self.tried.clear();
        Some(token)
    }

    /// Position of the next token, or of the last one at end of input
    pub fn pos(&mut self) -> Pos {
        let last = self.last;
        self.peek().map(|token| token.pos).unwrap_or(last)
    }

    /// Whether the next token starts a later line than the last consumed one
    pub fn line_break(&mut self) -> bool {
        let row = self.last.row;
        self.peek().is_some_and(|token| token.pos.row > row)
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&mut self, what: &'static str, cond: F) -> bool {
        self.skip();
        if let Some(token) = self.tokens.peek() {
            if cond(token) {
                return true;
            }
        }
        self.tried.push(spell(what));
        false
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, what: &'static str, cond: F) -> Option<Token> {
        if self.check_if(what, cond) {
            self.next()
        } else {
            None
        }
    }

    /// Consume until next token is match with condition
    pub fn consume_until<F: Fn(&Token) -> bool>(&mut self, cond: F) {
        while let Some(tok) = self.tokens.peek() {
            if cond(tok) {
                return;
            }
            self.tokens.next();
        }
    }

    /// Next token must be match with condition (skipping comments)
    pub fn expect_tobe<F: Fn(&Token) -> bool>(
        &mut self,
        what: &'static str,
        cond: F,
    ) -> Result<Token, Diagnostic> {
        if self.check_if(what, cond) {
            if let Some(token) = self.next() {
                return Ok(token);
            }
        }
        Err(self.unexpected(what))
    }

    /// Build an error for the next token, which is not `what`
    pub fn unexpected(&mut self, what: &'static str) -> Diagnostic {
        self.tried.push(spell(what));
        let tried = std::mem::take(&mut self.tried).into_iter().unique().collect();
        let last = self.last;
        match self.peek() {
            Some(token) => Diagnostic::error(token.pos, Error::UnexpectedToken(token.into(), tried)),
            None => Diagnostic::error(last, Error::UnexpectedEOF(tried)),
        }
    }
}

/// Human readable form of a token pattern
fn spell(pattern: &'static str) -> &'static str {
    match pattern {
        "LAngleLAngle" => "`<<`",
        "RAngleRAngle" => "`>>`",
        "Arrow" => "`->`",
        "Equal" => "`=`",
        "Plus" => "`+`",
        "Minus" => "`-`",
        "Star" => "`*`",
        "Slash" => "`/`",
        "Percent" => "`%`",
        "Ampasand" => "`&`",
        "Pipe" => "`|`",
        "Caret" => "`^`",
        "Tilde" => "`~`",
        "Semicolon" => "`;`",
        "Comma" => "`,`",
        "Period" => "`.`",
        "LParen" => "`(`",
        "RParen" => "`)`",
        "LBracket" => "`[`",
        "RBracket" => "`]`",
        "LCurly" => "`{`",
        "RCurly" => "`}`",
        "KwElse" => "`else`",
        "KwAs" => "`as`",
        "Ident(_)" => "identifier",
        "KwU8 | KwVoid | Ident(_)" => "type",
        "Number(_, _)" => "number",
        other => other,
    }
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(stringify!($kind), |token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:pat) => {
        $parser.expect_tobe(stringify!($kind), |token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! optional {
    ($parser:expr, $trigger:pat, $following:expr) => {
        if check!($parser, $trigger) {
            expect!($parser, $trigger)?;
            Some($following)
        } else {
            None
        }
    };
    ($parser:expr, $trigger:pat) => {
        $parser.consume_if(stringify!($trigger), |token| matches!(&token.kind, $trigger))
    };
}

/// Parse repeated elements with optional delimiters
/// 3 args: { element } terminal (no delimiter)
/// 4 args: [ element { delimiter element } ] terminal (with delimiter)
#[macro_export]
macro_rules! repeat {
    // Without delimiter: { element } terminal
    ($parser:expr, $elem:expr, $terminal:pat) => {{
        let mut items = Vec::new();
        while !check!($parser, $terminal) {
            items.push($elem?);
        }
        items
    }};

    // With delimiter: [ element { delimiter element } ] terminal
    ($parser:expr, $elem:expr, $delimiter:pat, $terminal:pat) => {{
        let mut items = Vec::new();
        if !check!($parser, $terminal) {
            items.push($elem?);
            while check!($parser, $delimiter) {
                expect!($parser, $delimiter)?;
                items.push($elem?);
            }
        }
        items
    }};
}

/// Skip tokens until the start of the next definition
#[macro_export]
macro_rules! recover {
    ($parser:expr, $kind:pat) => {
        $parser.consume_until(|token| matches!(&token.kind, $kind))
    };
}
