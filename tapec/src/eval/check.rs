use crate::error::{Diagnostic, Error};
use crate::eval::global::Global;
use crate::eval::local::{FrameLayout, Local};
use crate::grammer::ast::{Def, Expr, ExprKind, Stmt, Type, AST};
use arch::Inst;
use indexmap::{IndexMap, IndexSet};

/// Result of checking one function body (or the global expressions)
#[derive(Debug, Clone, Default)]
pub struct CheckedFunc {
    pub layout: FrameLayout,
    pub calls: IndexSet<usize>,
}

#[derive(Debug, Default)]
pub struct Checked {
    pub funcs: IndexMap<usize, CheckedFunc>,
    pub entry: CheckedFunc,
}

/// Resolve names and types of every function body and global expression.
/// Expressions are annotated in place.
pub fn check(global: &Global, ast: &mut AST) -> (Checked, Vec<Diagnostic>) {
    let mut errors = Vec::new();
    let mut checked = Checked::default();

    for (idx, def) in ast.0.iter_mut().enumerate() {
        let Def::Func(pos, _, _, _, body) = def else {
            continue;
        };
        let Some(id) = global.by_def(idx) else {
            continue;
        };
        let sig = global.func(id);
        let mut checker = Checker::new(global, Some(&sig.ret));
        if let Err(e) = checker.local.args(&sig.params) {
            errors.push(Diagnostic::error(*pos, e));
            continue;
        }
        checker.block(body);
        if !sig.ret.is_void() && !body.iter().any(Stmt::always_returns) {
            let e = Error::MissingReturn(sig.to_string(), sig.ret.clone());
            checker.errors.push(Diagnostic::error(*pos, e));
        }
        let (func, errs) = checker.finish();
        errors.extend(errs);
        checked.funcs.insert(id, func);
    }

    let mut checker = Checker::new(global, None);
    for def in ast.0.iter_mut() {
        if let Def::Expr(expr) = def {
            if let Err(e) = checker.expr(expr) {
                checker.errors.push(e);
            }
        }
    }
    let (entry, errs) = checker.finish();
    errors.extend(errs);
    checked.entry = entry;

    (checked, errors)
}

struct Checker<'a> {
    global: &'a Global,
    local: Local<'a>,
    ret: Option<&'a Type>,
    calls: IndexSet<usize>,
    errors: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    fn new(global: &'a Global, ret: Option<&'a Type>) -> Self {
        Checker {
            global,
            local: Local::fork(global),
            ret,
            calls: IndexSet::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (CheckedFunc, Vec<Diagnostic>) {
        let func = CheckedFunc {
            layout: self.local.finish(),
            calls: self.calls,
        };
        (func, self.errors)
    }

    fn ret(&self) -> Type {
        self.ret.cloned().unwrap_or(Type::Void)
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl<'a> Checker<'a> {
    fn block(&mut self, stmts: &mut [Stmt]) {
        self.local.enter();
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.local.exit();
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        if let Err(e) = self.check_stmt(stmt) {
            self.errors.push(e);
        }
    }

    fn cond(&mut self, cond: &mut Expr) {
        match self.expr(cond) {
            Ok(Type::U8) => {}
            Ok(ty) => self.errors.push(Diagnostic::error(cond.pos, Error::ConditionType(ty))),
            Err(e) => self.errors.push(e),
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Diagnostic> {
        match stmt {
            Stmt::Block(stmts) => self.block(stmts),
            Stmt::Expr(expr) => {
                self.expr(expr)?;
            }
            // A tail in a void function only discards its value
            Stmt::Tail(expr) => {
                let ty = self.expr(expr)?;
                let ret = self.ret();
                if !ret.is_void() && ty != ret {
                    return Err(Diagnostic::error(expr.pos, Error::ReturnType(ret, ty)));
                }
            }
            Stmt::Return(pos, value) => {
                let ty = match value {
                    Some(expr) => self.expr(expr)?,
                    None => Type::Void,
                };
                let ret = self.ret();
                if ty != ret {
                    return Err(Diagnostic::error(*pos, Error::ReturnType(ret, ty)));
                }
            }
            Stmt::If(cond, body) => {
                self.cond(cond);
                self.stmt(body);
            }
            Stmt::IfElse(cond, then, els) => {
                self.cond(cond);
                self.stmt(then);
                self.stmt(els);
            }
            Stmt::While(cond, body) => {
                self.cond(cond);
                self.stmt(body);
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl<'a> Checker<'a> {
    fn expr(&mut self, expr: &mut Expr) -> Result<Type, Diagnostic> {
        let ty = self.typeof_expr(expr)?;
        expr.ty = Some(ty.clone());
        Ok(ty)
    }

    fn typeof_expr(&mut self, expr: &mut Expr) -> Result<Type, Diagnostic> {
        let pos = expr.pos;
        let err = |e: Error| Diagnostic::error(pos, e);
        match &mut expr.kind {
            ExprKind::Lit(_) => Ok(Type::U8),

            ExprKind::Var(name, slot) => {
                let var = self
                    .local
                    .lookup(name)
                    .ok_or_else(|| err(Error::UnknownVariable(name.clone())))?;
                *slot = Some(var.offset);
                Ok(var.ty.clone())
            }

            ExprKind::Decl(ty, name, slot) => {
                let var = self.local.push(name, ty).map_err(err)?;
                *slot = Some(var.offset);
                *ty = var.ty.clone();
                Ok(var.ty.clone())
            }

            ExprKind::Assign(lhs, rhs) => {
                let rt = match self.expr(rhs) {
                    Ok(ty) => ty,
                    Err(e) => {
                        // Still declare the target so later uses do not cascade
                        if matches!(lhs.kind, ExprKind::Decl(..)) {
                            if let Err(decl) = self.expr(lhs) {
                                self.errors.push(decl);
                            }
                        }
                        return Err(e);
                    }
                };
                let lt = self.expr(lhs)?;
                if !lhs.is_place() {
                    return Err(Diagnostic::error(lhs.pos, Error::InvalidLValue));
                }
                if lt != rt {
                    return Err(err(Error::MismatchedAssign(lt, rt)));
                }
                Ok(lt)
            }

            ExprKind::Binary(op, lhs, rhs) => {
                let lt = self.expr(lhs)?;
                let rt = self.expr(rhs)?;
                for ty in [lt, rt] {
                    if ty != Type::U8 {
                        return Err(err(Error::OperandType(op.to_string(), ty)));
                    }
                }
                Ok(Type::U8)
            }

            ExprKind::Unary(op, operand) => match self.expr(operand)? {
                Type::U8 => Ok(Type::U8),
                ty => Err(err(Error::OperandType(op.to_string(), ty))),
            },

            ExprKind::Call(name, args, id) => {
                let mut types = Vec::new();
                for arg in args.iter_mut() {
                    types.push(self.expr(arg)?);
                }
                let func = self.global.lookup(name, &types).map_err(err)?;
                *id = Some(func);
                self.calls.insert(func);
                Ok(self.global.func(func).ret.clone())
            }

            ExprKind::Cast(operand, ty) => {
                let from = self.expr(operand)?;
                let to = self.local.resolve(ty).map_err(err)?;
                if !from.castable(&to) {
                    return Err(err(Error::InvalidCast(from, to)));
                }
                *ty = to.clone();
                Ok(to)
            }

            ExprKind::Member(base, field) => {
                let ty = self.expr(base)?;
                match ty.field(field) {
                    Some((_, fty)) => Ok(fty.clone()),
                    None => Err(err(Error::NoSuchField(ty.clone(), field.clone()))),
                }
            }

            ExprKind::Asm(args, ty, body) => {
                for arg in args.iter_mut() {
                    if self.expr(arg)?.is_void() {
                        return Err(Diagnostic::error(arg.pos, Error::VoidArgument));
                    }
                }
                if let Err(shift) = balance(body) {
                    return Err(err(Error::UnbalancedPointer(shift)));
                }
                let to = self.local.resolve(ty).map_err(err)?;
                *ty = to.clone();
                Ok(to)
            }
        }
    }
}

/// The pointer must rest where it started, overall and around every loop
fn balance(body: &[Inst]) -> Result<(), isize> {
    let mut opens = Vec::new();
    let mut shift = 0;
    for inst in body {
        match inst {
            Inst::Open => opens.push(shift),
            Inst::Close => {
                let start = opens.pop().unwrap_or(0);
                if shift != start {
                    return Err(shift - start);
                }
            }
            inst => shift += inst.shift(),
        }
    }
    match shift {
        0 => Ok(()),
        shift => Err(shift),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_balance() {
        let code = |s: &str| s.chars().filter_map(Inst::from_char).collect::<Vec<_>>();
        assert!(balance(&code("+>-<")).is_ok());
        assert!(balance(&code("[->+<]")).is_ok());
        assert_eq!(balance(&code(">>")), Err(2));
        assert_eq!(balance(&code("[>]<")), Err(1));
    }
}
