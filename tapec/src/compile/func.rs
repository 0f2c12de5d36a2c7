use super::tape::Tape;
use super::{Compiled, Frame};
use crate::error::Error;
use crate::grammer::ast::{Expr, ExprKind, Stmt, Type, UnaryOp};
use arch::Inst;
use indexmap::IndexMap;

/// Lowers one function body into tape code over its static frame.
/// Callees must already be compiled.
pub struct FuncCompiler<'a> {
    done: &'a IndexMap<usize, Compiled>,
    frame: Frame,
    tape: Tape,
}

impl<'a> FuncCompiler<'a> {
    pub fn new(
        done: &'a IndexMap<usize, Compiled>,
        frame: Frame,
        cursor: usize,
    ) -> Self {
        let tape = Tape::new(cursor, frame.scratch());
        Self {
            done,
            frame,
            tape,
        }
    }

    /// Body of a function. Starts and ends with the pointer on the frame base.
    pub fn compile(mut self, body: &[Stmt]) -> Result<Compiled, Error> {
        if let Some(live) = self.frame.live {
            self.tape.add(live, 1);
        }
        self.stmts(body)?;
        if let Some(live) = self.frame.live {
            self.tape.clear(live);
        }
        self.tape.goto(self.frame.base);
        Ok(self.finish())
    }

    /// Global expressions, evaluated in order and discarded
    pub fn entry(mut self, exprs: &[&Expr]) -> Result<Compiled, Error> {
        for expr in exprs {
            self.discard(expr)?;
        }
        Ok(self.finish())
    }

    fn finish(mut self) -> Compiled {
        self.frame.size = self.tape.peak() - self.frame.base;
        Compiled {
            frame: self.frame,
            body: self.tape.finish(),
        }
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl<'a> FuncCompiler<'a> {
    fn stmts(&mut self, stmts: &[Stmt]) -> Result<(), Error> {
        for (i, stmt) in stmts.iter().enumerate() {
            self.stmt(stmt)?;
            if stmt.may_return() && i + 1 < stmts.len() {
                return self.guarded(&stmts[i + 1..]);
            }
        }
        Ok(())
    }

    /// Run statements only while the function has not returned
    fn guarded(&mut self, stmts: &[Stmt]) -> Result<(), Error> {
        let Some(live) = self.frame.live else {
            return self.stmts(stmts);
        };
        let g = self.tape.temp(1);
        self.tape.copy(live, g);
        self.tape.open(g);
        self.stmts(stmts)?;
        self.tape.clear(g);
        self.tape.close(g);
        self.tape.release(g);
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Block(stmts) => self.stmts(stmts)?,
            Stmt::Expr(expr) => self.discard(expr)?,
            Stmt::Tail(expr) => self.ret(Some(expr))?,
            Stmt::Return(_, value) => self.ret(value.as_ref())?,

            // c [ body c[-] ]
            Stmt::If(cond, body) => {
                let c = self.tape.temp(1);
                self.expr(cond, c)?;
                self.tape.open(c);
                self.stmt(body)?;
                self.tape.clear(c);
                self.tape.close(c);
                self.tape.release(c);
            }

            // e+ c [ then e- c[-] ] e [ else e- ]
            Stmt::IfElse(cond, then, els) => {
                let c = self.tape.temp(1);
                let e = self.tape.temp(1);
                self.expr(cond, c)?;
                self.tape.add(e, 1);
                self.tape.open(c);
                self.stmt(then)?;
                self.tape.sub(e, 1);
                self.tape.clear(c);
                self.tape.close(c);
                self.tape.open(e);
                self.stmt(els)?;
                self.tape.sub(e, 1);
                self.tape.close(e);
                self.tape.release(c);
            }

            // c [ body c[-] c ]
            Stmt::While(cond, body) => {
                let gate = body.may_return();
                let c = self.tape.temp(1);
                self.cond(cond, c, gate)?;
                self.tape.open(c);
                self.stmt(body)?;
                self.tape.clear(c);
                self.cond(cond, c, gate)?;
                self.tape.close(c);
                self.tape.release(c);
            }
        }
        Ok(())
    }

    /// Loop condition, forced to zero once the function has returned
    fn cond(&mut self, cond: &Expr, c: usize, gate: bool) -> Result<(), Error> {
        self.expr(cond, c)?;
        let Some(live) = self.frame.live.filter(|_| gate) else {
            return Ok(());
        };
        let l = self.tape.temp(1);
        let r = self.tape.temp(1);
        self.tape.copy(live, l);
        self.tape.open(c);
        self.tape.open(l);
        self.tape.add(r, 1);
        self.tape.clear(l);
        self.tape.close(l);
        self.tape.clear(c);
        self.tape.close(c);
        self.tape.clear(l);
        self.tape.mov(r, c);
        self.tape.release(l);
        Ok(())
    }

    fn ret(&mut self, value: Option<&Expr>) -> Result<(), Error> {
        match value {
            Some(expr) if self.frame.ret_size > 0 => self.expr(expr, self.frame.ret)?,
            Some(expr) => self.discard(expr)?,
            None => {}
        }
        if let Some(live) = self.frame.live {
            self.tape.clear(live);
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl<'a> FuncCompiler<'a> {
    /// Add the value of `expr` into the zeroed cells at `dst`
    fn expr(&mut self, expr: &Expr, dst: usize) -> Result<(), Error> {
        let size = expr.ty().sizeof();
        match &expr.kind {
            ExprKind::Lit(val) => self.tape.add(dst, *val),

            ExprKind::Var(..) => {
                let addr = self.place(expr)?;
                self.tape.copy_range(addr, dst, size);
            }

            // A fresh variable reads as zero
            ExprKind::Decl(..) => {
                let addr = self.place(expr)?;
                self.tape.clear_range(addr, size);
            }

            ExprKind::Member(base, field) if !base.is_place() => {
                let width = base.ty().sizeof();
                let (offset, _) = field_of(base.ty(), field)?;
                let t = self.tape.temp(width);
                self.expr(base, t)?;
                self.tape.mov_range(t + offset, dst, size);
                self.tape.clear_range(t, width);
                self.tape.release(t);
            }

            ExprKind::Member(..) => {
                let addr = self.place(expr)?;
                self.tape.copy_range(addr, dst, size);
            }

            ExprKind::Assign(lhs, rhs) => {
                let addr = self.assign(lhs, rhs)?;
                self.tape.copy_range(addr, dst, size);
            }

            ExprKind::Binary(op, lhs, rhs) => {
                self.expr(lhs, dst)?;
                let t = self.tape.temp(1);
                self.expr(rhs, t)?;
                self.tape.binary(*op, dst, t);
                self.tape.release(t);
            }

            ExprKind::Unary(op, operand) => {
                let t = self.tape.temp(1);
                self.expr(operand, t)?;
                match op {
                    UnaryOp::Neg => self.tape.negate(t, dst),
                    UnaryOp::Not => self.tape.complement(t, dst),
                }
                self.tape.release(t);
            }

            ExprKind::Call(name, args, id) => self.call(name, args, *id, Some(dst))?,

            ExprKind::Cast(operand, _) => self.expr(operand, dst)?,

            ExprKind::Asm(args, ty, code) => self.asm(args, ty, code, Some(dst))?,
        }
        Ok(())
    }

    /// Evaluate `expr` for its effects only
    fn discard(&mut self, expr: &Expr) -> Result<(), Error> {
        match &expr.kind {
            ExprKind::Assign(lhs, rhs) => {
                self.assign(lhs, rhs)?;
            }
            ExprKind::Decl(..) => {
                let addr = self.place(expr)?;
                self.tape.clear_range(addr, expr.ty().sizeof());
            }
            ExprKind::Call(name, args, id) => self.call(name, args, *id, None)?,
            ExprKind::Asm(args, ty, code) => self.asm(args, ty, code, None)?,
            _ => {
                let width = expr.ty().sizeof();
                let t = self.tape.temp(width);
                self.expr(expr, t)?;
                self.tape.clear_range(t, width);
                self.tape.release(t);
            }
        }
        Ok(())
    }

    /// Absolute address of a variable or field
    fn place(&self, expr: &Expr) -> Result<usize, Error> {
        match &expr.kind {
            ExprKind::Var(name, slot) | ExprKind::Decl(_, name, slot) => slot
                .map(|offset| self.frame.base + offset)
                .ok_or_else(|| Error::Unresolved(name.clone())),
            ExprKind::Member(base, field) => {
                let addr = self.place(base)?;
                let (offset, _) = field_of(base.ty(), field)?;
                Ok(addr + offset)
            }
            _ => Err(Error::InvalidLValue),
        }
    }

    /// Store `rhs` into `lhs` and return the address written
    fn assign(&mut self, lhs: &Expr, rhs: &Expr) -> Result<usize, Error> {
        let width = rhs.ty().sizeof();
        let t = self.tape.temp(width);
        self.expr(rhs, t)?;
        let addr = self.place(lhs)?;
        self.tape.clear_range(addr, width);
        self.tape.mov_range(t, addr, width);
        self.tape.release(t);
        Ok(addr)
    }

    /// Arguments go through scratch first, so they may read any frame
    /// including the callee's own parameters.
    fn call(
        &mut self,
        name: &str,
        args: &[Expr],
        id: Option<usize>,
        dst: Option<usize>,
    ) -> Result<(), Error> {
        let done = self.done;
        let callee = id
            .and_then(|id| done.get(&id))
            .ok_or_else(|| Error::Unresolved(name.to_string()))?;

        let mut slots = Vec::new();
        for arg in args {
            let width = arg.ty().sizeof();
            let t = self.tape.temp(width);
            self.expr(arg, t)?;
            slots.push((t, width));
        }
        for (&(t, width), param) in slots.iter().zip(callee.frame.layout.params()) {
            let addr = callee.frame.base + param.offset;
            self.tape.clear_range(addr, width);
            self.tape.mov_range(t, addr, width);
        }
        if let Some(&(first, _)) = slots.first() {
            self.tape.release(first);
        }

        self.tape.splice(callee.frame.base, &callee.body);

        let ret = callee.frame.ret;
        let size = callee.frame.ret_size;
        match dst {
            Some(dst) => self.tape.mov_range(ret, dst, size),
            None => self.tape.clear_range(ret, size),
        }
        Ok(())
    }

    /// Arguments are laid out in a window starting under the pointer.
    /// The first cells of the window hold the result afterwards.
    fn asm(
        &mut self,
        args: &[Expr],
        ty: &Type,
        code: &[Inst],
        dst: Option<usize>,
    ) -> Result<(), Error> {
        let size = ty.sizeof();
        let width = args
            .iter()
            .map(|arg| arg.ty().sizeof())
            .sum::<usize>()
            .max(size)
            .max(1);
        let w = self.tape.temp(width);
        let mut offset = 0;
        for arg in args {
            self.expr(arg, w + offset)?;
            offset += arg.ty().sizeof();
        }

        self.tape.goto(w);
        self.tape.raw(code);

        match dst {
            Some(dst) => {
                self.tape.mov_range(w, dst, size);
                self.tape.clear_range(w + size, width - size);
            }
            None => self.tape.clear_range(w, width),
        }
        self.tape.release(w);
        Ok(())
    }
}

fn field_of<'t>(ty: &'t Type, field: &str) -> Result<(usize, &'t Type), Error> {
    ty.field(field)
        .ok_or_else(|| Error::NoSuchField(ty.clone(), field.to_string()))
}
