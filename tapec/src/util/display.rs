use super::maps::SymbolMap;
use crate::compile::Code;
use crate::grammer::ast::{Def, Expr, ExprKind, Field, Stmt, Type, UnaryOp, AST};
use arch::inst::render;
use color_print::cprintln;
use itertools::Itertools;
use std::fmt;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::U8 => write!(f, "u8"),
            Type::Struct(name, _) | Type::Forward(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

// ----------------------------------------------------------------------------
// Canonical source form
// ----------------------------------------------------------------------------

/// Binaries are fully parenthesized. Other operands are wrapped only
/// when they would re-parse differently.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ExprKind::Lit(val) => write!(f, "{}", val),
            ExprKind::Var(name, _) => write!(f, "{}", name),
            ExprKind::Decl(ty, name, _) => write!(f, "{} {}", ty, name),
            ExprKind::Assign(lhs, rhs) => write!(f, "{} = {}", Postfix(lhs), rhs),
            ExprKind::Binary(op, lhs, rhs) => {
                write!(f, "({} {} {})", Operand(lhs), op, Operand(rhs))
            }
            ExprKind::Unary(op, operand) => write!(f, "{}{}", op, Operand(operand)),
            ExprKind::Call(name, args, _) => write!(f, "{}({})", name, args.iter().join(", ")),
            ExprKind::Cast(operand, ty) => write!(f, "{} as {}", Postfix(operand), ty),
            ExprKind::Member(base, field) => write!(f, "{}.{}", Postfix(base), field),
            ExprKind::Asm(args, ty, code) => write!(
                f,
                "asm({}) -> {} {{ {} }}",
                args.iter().join(", "),
                ty,
                render(code)
            ),
        }
    }
}

/// Operand of a prefix or binary operator
struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.kind {
            ExprKind::Assign(..) => write!(f, "({})", self.0),
            _ => write!(f, "{}", self.0),
        }
    }
}

/// Operand of `.field`, `as` or the left of `=`
struct Postfix<'a>(&'a Expr);

impl fmt::Display for Postfix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.kind {
            ExprKind::Assign(..) | ExprKind::Unary(..) => write!(f, "({})", self.0),
            _ => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for AST {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut printer = Printer::default();
        for def in &self.0 {
            printer.def(def);
        }
        write!(f, "{}", printer.out)
    }
}

impl fmt::Display for Def {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut printer = Printer::default();
        printer.def(self);
        write!(f, "{}", printer.out)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut printer = Printer::default();
        printer.stmt(self, true);
        write!(f, "{}", printer.out)
    }
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
    join: bool,
}

impl Printer {
    fn line(&mut self, text: impl fmt::Display) {
        if std::mem::take(&mut self.join) {
            self.out.pop();
            self.out.push(' ');
        } else {
            self.out.push_str(&"    ".repeat(self.depth));
        }
        self.out.push_str(&text.to_string());
        self.out.push('\n');
    }

    fn def(&mut self, def: &Def) {
        match def {
            Def::Func(_, name, params, ret, body) => {
                let params = params.iter().join(", ");
                match ret {
                    Type::Void => self.line(format!("func {}({}) {{", name, params)),
                    ret => self.line(format!("func {}({}) -> {} {{", name, params, ret)),
                }
                self.stmts(body);
                self.line("}");
            }
            Def::Struct(_, name, fields) => {
                self.line(format!("type {} {{ {} }}", name, fields.iter().join(", ")));
            }
            Def::Expr(expr) => self.line(format!("{};", expr)),
        }
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        self.depth += 1;
        for (i, stmt) in stmts.iter().enumerate() {
            self.stmt(stmt, i + 1 == stmts.len());
        }
        self.depth -= 1;
    }

    /// A tail expression that is not followed by `}` is wrapped in parens
    /// and shares its line with the next statement, since a line break
    /// would end it as a plain expression statement.
    fn stmt(&mut self, stmt: &Stmt, last: bool) {
        match stmt {
            Stmt::Block(stmts) => {
                self.line("{");
                self.stmts(stmts);
                self.line("}");
            }
            Stmt::Expr(expr) => self.line(format!("{};", Leading(expr))),
            Stmt::Tail(expr) if last => self.line(Leading(expr)),
            Stmt::Tail(expr) => {
                self.line(format!("({})", expr));
                self.join = true;
            }
            Stmt::Return(_, Some(expr)) => self.line(format!("return {};", expr)),
            Stmt::Return(_, None) => self.line("return;"),
            Stmt::If(cond, body) => self.nested(format!("if ({})", cond), body, last),
            Stmt::IfElse(cond, then, els) => {
                self.nested(format!("if ({})", cond), then, true);
                self.nested("else".to_string(), els, last);
            }
            Stmt::While(cond, body) => self.nested(format!("while ({})", cond), body, last),
        }
    }

    fn nested(&mut self, head: String, body: &Stmt, last: bool) {
        match body {
            Stmt::Block(stmts) => {
                self.line(format!("{} {{", head));
                self.stmts(stmts);
                self.line("}");
            }
            body => {
                self.line(head);
                self.depth += 1;
                self.stmt(body, last);
                self.depth -= 1;
            }
        }
    }
}

/// Statement-leading expression: a leading `-` would continue the previous line
struct Leading<'a>(&'a Expr);

impl fmt::Display for Leading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.kind {
            ExprKind::Unary(UnaryOp::Neg, _) => write!(f, "({})", self.0),
            _ => write!(f, "{}", self.0),
        }
    }
}

// ----------------------------------------------------------------------------
// Verbose layout
// ----------------------------------------------------------------------------

pub fn layout_print(map: &SymbolMap, code: &Code) {
    println!("+-[Tape]-+------------------------------------------------------------------------");
    for (name, frame) in &map.frames {
        cprintln!(
            "+--------+ <green>{}</green> : {} cells",
            name,
            frame.size
        );
        for var in &frame.vars {
            cprintln!(
                "| {:>6} : <m>{}</m> {}",
                var.addr,
                var.ty,
                var.name
            );
        }
        if let Some(ret) = frame.ret {
            cprintln!("| {:>6} : <y>return</y>", ret);
        }
    }
    println!("+-[Code]-+------------------------------------------------------------------------");
    println!("| {} instructions", code.0.len());
}
