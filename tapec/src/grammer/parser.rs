use super::ast::{BinaryOp, Def, Expr, ExprKind, Field, Stmt, Type, UnaryOp, AST};
use super::parsercore::Parser;
use super::token::{Pos, Token, TokenKind::*};
use crate::error::{Diagnostic, Error};
use crate::{check, expect, optional, recover, repeat};
use arch::Inst;

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn parse(mut self) -> (AST, Vec<Diagnostic>) {
        let program = self.parse_program();
        (program, self.geterrors())
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    fn parse_program(&mut self) -> AST {
        let mut defs = Vec::new();
        while self.peek().is_some() {
            match self.parse_def() {
                Ok(def) => {
                    defs.push(def);
                }
                Err(err) => {
                    self.error(err);
                    recover!(self, KwType | KwFunc);
                }
            }
        }
        AST(defs)
    }

    /// def = func-def | type-def | expr [ ";" ]
    fn parse_def(&mut self) -> Result<Def, Diagnostic> {
        let pos = self.pos();
        match self.peek().map(|token| &token.kind) {
            // func-def = "func" ident "(" fields ")" [ "->" type ] "{" { stmt } "}"
            Some(KwFunc) => {
                expect!(self, KwFunc)?;
                let name = self.parse_ident()?;
                expect!(self, LParen)?;
                let args = self.parse_fields()?;
                expect!(self, RParen)?;
                let ret = optional!(self, Arrow, self.parse_type()?).unwrap_or(Type::Void);
                expect!(self, LCurly)?;
                let stmts = repeat!(self, self.parse_stmt(), RCurly);
                expect!(self, RCurly)?;
                Ok(Def::Func(pos, name, args, ret, stmts))
            }

            // type-def = "type" ident "{" fields "}" [ ";" ]
            Some(KwType) => {
                expect!(self, KwType)?;
                let name = self.parse_ident()?;
                expect!(self, LCurly)?;
                let fields = self.parse_fields()?;
                expect!(self, RCurly)?;
                optional!(self, Semicolon);
                Ok(Def::Struct(pos, name, fields))
            }

            // Global expression: expr [ ";" ]
            _ => {
                let expr = self.parse_expr()?;
                optional!(self, Semicolon);
                Ok(Def::Expr(expr))
            }
        }
    }

    /// type = "u8" | "void" | ident
    fn parse_type(&mut self) -> Result<Type, Diagnostic> {
        match self.peek().map(|token| &token.kind) {
            Some(KwU8) => {
                expect!(self, KwU8)?;
                Ok(Type::U8)
            }
            Some(KwVoid) => {
                expect!(self, KwVoid)?;
                Ok(Type::Void)
            }
            Some(Ident(_)) => Ok(Type::Forward(self.parse_ident()?)),
            _ => Err(self.unexpected("type")),
        }
    }

    /// fields = [ type ident { "," [ type ] ident } ]
    fn parse_fields(&mut self) -> Result<Vec<Field>, Diagnostic> {
        let mut fields: Vec<Field> = Vec::new();
        if !check!(self, KwU8 | KwVoid | Ident(_)) {
            return Ok(fields);
        }
        loop {
            let ty = self.parse_type()?;
            let field = match (check!(self, Ident(_)), ty, fields.last()) {
                // Full form: type ident
                (true, ty, _) => Field::new(self.parse_ident()?, ty),
                // Shorthand: ident, inheriting the previous type
                (false, Type::Forward(name), Some(prev)) => Field::new(name, prev.ty.clone()),
                _ => return Err(self.unexpected("identifier")),
            };
            fields.push(field);
            if optional!(self, Comma).is_none() {
                return Ok(fields);
            }
        }
    }

    /// stmt = block | if-stmt | while-stmt | return-stmt | expr-stmt
    fn parse_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let pos = self.pos();
        match self.peek().map(|token| &token.kind) {
            // Block statement: "{" { stmt } "}"
            Some(LCurly) => {
                expect!(self, LCurly)?;
                let stmts = repeat!(self, self.parse_stmt(), RCurly);
                expect!(self, RCurly)?;
                Ok(Stmt::Block(stmts))
            }

            // Conditional statement: "if" expr stmt [ "else" stmt ]
            Some(KwIf) => {
                expect!(self, KwIf)?;
                let cond = self.parse_expr()?;
                let then = Box::new(self.parse_stmt()?);
                match optional!(self, KwElse, Box::new(self.parse_stmt()?)) {
                    Some(els) => Ok(Stmt::IfElse(cond, then, els)),
                    None => Ok(Stmt::If(cond, then)),
                }
            }

            // Loop statement: "while" expr stmt
            Some(KwWhile) => {
                expect!(self, KwWhile)?;
                let cond = self.parse_expr()?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::While(cond, body))
            }

            // Return statement: "return" [ expr ] [ ";" ]
            Some(KwReturn) => {
                expect!(self, KwReturn)?;
                if optional!(self, Semicolon).is_some() || check!(self, RCurly) {
                    return Ok(Stmt::Return(pos, None));
                }
                let expr = self.parse_expr()?;
                optional!(self, Semicolon);
                Ok(Stmt::Return(pos, Some(expr)))
            }

            // Expression statement: expr ( ";" | end-of-line )
            // Implicit return: expr, closed by "}" or "else" or followed on the same line
            _ => {
                let expr = self.parse_expr()?;
                if optional!(self, Semicolon).is_some() {
                    return Ok(Stmt::Expr(expr));
                }
                let closed = matches!(self.peek().map(|token| &token.kind), None | Some(RCurly | KwElse));
                if !closed && self.line_break() {
                    Ok(Stmt::Expr(expr))
                } else {
                    Ok(Stmt::Tail(expr))
                }
            }
        }
    }

    /// expr = or-expr
    fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        self.parse_or_expr()
    }

    /// or-expr = xor-expr { "|" xor-expr }
    fn parse_or_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut lhs = self.parse_xor_expr()?;
        while check!(self, Pipe) {
            // Bitwise OR: expr "|" xor-expr
            let pos = expect!(self, Pipe)?.pos;
            let rhs = self.parse_xor_expr()?;
            lhs = binary(BinaryOp::Or, lhs, rhs, pos);
        }
        Ok(lhs)
    }

    /// xor-expr = and-expr { "^" and-expr }
    fn parse_xor_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut lhs = self.parse_and_expr()?;
        while check!(self, Caret) {
            // Bitwise XOR: expr "^" and-expr
            let pos = expect!(self, Caret)?.pos;
            let rhs = self.parse_and_expr()?;
            lhs = binary(BinaryOp::Xor, lhs, rhs, pos);
        }
        Ok(lhs)
    }

    /// and-expr = shift-expr { "&" shift-expr }
    fn parse_and_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut lhs = self.parse_shift_expr()?;
        while check!(self, Ampasand) {
            // Bitwise AND: expr "&" shift-expr
            let pos = expect!(self, Ampasand)?.pos;
            let rhs = self.parse_shift_expr()?;
            lhs = binary(BinaryOp::And, lhs, rhs, pos);
        }
        Ok(lhs)
    }

    /// shift-expr = add-expr { ( "<<" | ">>" ) add-expr }
    fn parse_shift_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut lhs = self.parse_add_expr()?;
        loop {
            // Left shift: expr "<<" add-expr
            if check!(self, LAngleLAngle) {
                let pos = expect!(self, LAngleLAngle)?.pos;
                let rhs = self.parse_add_expr()?;
                lhs = binary(BinaryOp::Shl, lhs, rhs, pos);
            }
            // Right shift: expr ">>" add-expr
            else if check!(self, RAngleRAngle) {
                let pos = expect!(self, RAngleRAngle)?.pos;
                let rhs = self.parse_add_expr()?;
                lhs = binary(BinaryOp::Shr, lhs, rhs, pos);
            } else {
                return Ok(lhs);
            }
        }
    }

    /// add-expr = mul-expr { ( "+" | "-" ) mul-expr }
    fn parse_add_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut lhs = self.parse_mul_expr()?;
        loop {
            // Addition: expr "+" mul-expr
            if check!(self, Plus) {
                let pos = expect!(self, Plus)?.pos;
                let rhs = self.parse_mul_expr()?;
                lhs = binary(BinaryOp::Add, lhs, rhs, pos);
            }
            // Subtraction: expr "-" mul-expr
            else if check!(self, Minus) {
                let pos = expect!(self, Minus)?.pos;
                let rhs = self.parse_mul_expr()?;
                lhs = binary(BinaryOp::Sub, lhs, rhs, pos);
            } else {
                return Ok(lhs);
            }
        }
    }

    /// mul-expr = unary-expr { ( "*" | "/" | "%" ) unary-expr }
    fn parse_mul_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut lhs = self.parse_unary_expr()?;
        loop {
            let op = if check!(self, Star) {
                BinaryOp::Mul
            } else if check!(self, Slash) {
                BinaryOp::Div
            } else if check!(self, Percent) {
                BinaryOp::Mod
            } else {
                return Ok(lhs);
            };
            let pos = expect!(self, Star | Slash | Percent)?.pos;
            let rhs = self.parse_unary_expr()?;
            lhs = binary(op, lhs, rhs, pos);
        }
    }

    /// unary-expr = ( "-" | "~" ) unary-expr | postfix-expr
    fn parse_unary_expr(&mut self) -> Result<Expr, Diagnostic> {
        // Negation: "-" unary-expr
        if let Some(token) = optional!(self, Minus) {
            let expr = self.parse_unary_expr()?;
            return Ok(unary(UnaryOp::Neg, expr, token));
        }
        // Complement: "~" unary-expr
        if let Some(token) = optional!(self, Tilde) {
            let expr = self.parse_unary_expr()?;
            return Ok(unary(UnaryOp::Not, expr, token));
        }
        self.parse_postfix_expr()
    }

    /// postfix-expr = prim-expr { "." ident | "as" type } [ "=" expr ]
    fn parse_postfix_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_prim_expr()?;
        loop {
            // Member access: expr "." ident
            if let Some(token) = optional!(self, Period) {
                let field = self.parse_ident()?;
                expr = Expr::new(ExprKind::Member(Box::new(expr), field), token.pos);
                continue;
            }

            // Type cast: expr "as" type
            if let Some(token) = optional!(self, KwAs) {
                let ty = self.parse_type()?;
                expr = Expr::new(ExprKind::Cast(Box::new(expr), ty), token.pos);
                continue;
            }

            break;
        }

        // Assignment: place "=" expr
        if let Some(token) = optional!(self, Equal) {
            let rhs = self.parse_expr()?;
            expr = Expr::new(ExprKind::Assign(Box::new(expr), Box::new(rhs)), token.pos);
        }
        Ok(expr)
    }

    /// prim-expr = "(" expr ")" | num-lit | ident | ident "(" args ")" | type ident | asm-expr
    fn parse_prim_expr(&mut self) -> Result<Expr, Diagnostic> {
        let pos = self.pos();
        match self.peek().map(|token| token.kind.clone()) {
            // Parenthesized expression: "(" expr ")"
            Some(LParen) => {
                expect!(self, LParen)?;
                let inner = self.parse_expr()?;
                expect!(self, RParen)?;
                Ok(inner)
            }

            // Number literal: num-lit
            Some(Number(_, val)) => {
                expect!(self, Number(_, _))?;
                match u8::try_from(val) {
                    Ok(val) => Ok(Expr::new(ExprKind::Lit(val), pos)),
                    Err(_) => Err(Diagnostic::error(pos, Error::LiteralOverflow(val))),
                }
            }

            // Scalar declaration: ( "u8" | "void" ) ident
            Some(KwU8 | KwVoid) => {
                let ty = self.parse_type()?;
                let name = self.parse_ident()?;
                Ok(Expr::new(ExprKind::Decl(ty, name, None), pos))
            }

            Some(Ident(name)) => {
                expect!(self, Ident(_))?;

                // Function call: ident "(" [ expr { "," expr } ] ")"
                if optional!(self, LParen).is_some() {
                    let args = repeat!(self, self.parse_expr(), Comma, RParen);
                    expect!(self, RParen)?;
                    return Ok(Expr::new(ExprKind::Call(name, args, None), pos));
                }

                // Struct declaration: ident ident
                if check!(self, Ident(_)) {
                    let var = self.parse_ident()?;
                    let ty = Type::Forward(name);
                    return Ok(Expr::new(ExprKind::Decl(ty, var, None), pos));
                }

                // Variable: ident
                Ok(Expr::new(ExprKind::Var(name, None), pos))
            }

            // Inline assembly: "asm" "(" [ expr { "," expr } ] ")" "->" type "{" { prim } "}"
            Some(KwAsm) => {
                expect!(self, KwAsm)?;
                expect!(self, LParen)?;
                let args = repeat!(self, self.parse_expr(), Comma, RParen);
                expect!(self, RParen)?;
                expect!(self, Arrow)?;
                let ty = self.parse_type()?;
                expect!(self, LCurly)?;
                let body = self.parse_asm_body()?;
                expect!(self, RCurly)?;
                Ok(Expr::new(ExprKind::Asm(args, ty, body), pos))
            }

            _ => Err(self.unexpected("expression")),
        }
    }

    /// prims = { "+" | "-" | "<" | ">" | "," | "." | "[" prims "]" }
    fn parse_asm_body(&mut self) -> Result<Vec<Inst>, Diagnostic> {
        let mut body = Vec::new();
        let mut opens = Vec::new();
        loop {
            let pos = self.pos();
            let insts: &[Inst] = match self.peek().map(|token| &token.kind) {
                Some(Plus) => &[Inst::Inc],
                Some(Minus) => &[Inst::Dec],
                Some(LAngle) => &[Inst::Left],
                Some(RAngle) => &[Inst::Right],
                Some(LAngleLAngle) => &[Inst::Left, Inst::Left],
                Some(RAngleRAngle) => &[Inst::Right, Inst::Right],
                Some(Arrow) => &[Inst::Dec, Inst::Right],
                Some(Comma) => &[Inst::Read],
                Some(Period) => &[Inst::Write],
                Some(LBracket) => {
                    opens.push(pos);
                    &[Inst::Open]
                }
                Some(RBracket) => {
                    if opens.pop().is_none() {
                        return Err(Diagnostic::error(pos, Error::UnbalancedAsm(']')));
                    }
                    &[Inst::Close]
                }
                Some(RCurly) => {
                    return match opens.pop() {
                        Some(open) => Err(Diagnostic::error(open, Error::UnbalancedAsm('['))),
                        None => Ok(body),
                    };
                }
                _ => return Err(self.unexpected("asm instruction")),
            };
            body.extend_from_slice(insts);
            self.next();
        }
    }

    /// ident = ( "A".."Z" | "a".."z" | "_" ) { "0".."9" | "A".."Z" | "a".."z" | "_" }
    fn parse_ident(&mut self) -> Result<String, Diagnostic> {
        match expect!(self, Ident(_))?.kind {
            Ident(name) => Ok(name),
            _ => Err(self.unexpected("identifier")),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, pos: Pos) -> Expr {
    Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), pos)
}

fn unary(op: UnaryOp, expr: Expr, token: Token) -> Expr {
    Expr::new(ExprKind::Unary(op, Box::new(expr)), token.pos)
}
