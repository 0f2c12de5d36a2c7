use super::token::Pos;
use arch::Inst;
use strum::Display;

#[derive(Debug, Clone)]
pub struct AST(pub Vec<Def>); // defs = { def }

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,                       // "void"
    U8,                         // "u8"
    Struct(String, Vec<Field>), // resolved struct layout
    Forward(String),            // ident
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum Def {
    Func(Pos, String, Vec<Field>, Type, Vec<Stmt>), // "func" ident "(" fields ")" [ "->" type ] "{" { stmt } "}"
    Struct(Pos, String, Vec<Field>),                // "type" ident "{" fields "}"
    Expr(Expr),                                     // expr [ ";" ]
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),                         // "{" { stmt } "}"
    Expr(Expr),                               // expr ";"
    Tail(Expr),                               // expr
    If(Expr, Box<Stmt>),                      // "if" expr stmt
    IfElse(Expr, Box<Stmt>, Box<Stmt>),       // "if" expr stmt "else" stmt
    While(Expr, Box<Stmt>),                   // "while" expr stmt
    Return(Pos, Option<Expr>),                // "return" [ expr ] [ ";" ]
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
    pub ty: Option<Type>, // filled by the checker
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Lit(u8),                                // num-lit
    Var(String, Option<usize>),             // ident
    Decl(Type, String, Option<usize>),      // type ident
    Assign(Box<Expr>, Box<Expr>),           // place "=" expr
    Binary(BinaryOp, Box<Expr>, Box<Expr>), // expr (binop) expr
    Unary(UnaryOp, Box<Expr>),              // ( "-" | "~" ) expr
    Call(String, Vec<Expr>, Option<usize>), // ident "(" [ expr { "," expr } ] ")"
    Cast(Box<Expr>, Type),                  // expr "as" type
    Member(Box<Expr>, String),              // expr "." ident
    Asm(Vec<Expr>, Type, Vec<Inst>),        // "asm" "(" args ")" "->" type "{" prims "}"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UnaryOp {
    #[strum(serialize = "-")]
    Neg,
    #[strum(serialize = "~")]
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "^")]
    Xor,
    #[strum(serialize = "<<")]
    Shl,
    #[strum(serialize = ">>")]
    Shr,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Pos) -> Self {
        Expr { kind, pos, ty: None }
    }

    /// Type assigned by the checker, void before checking
    pub fn ty(&self) -> &Type {
        self.ty.as_ref().unwrap_or(&Type::Void)
    }
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

impl Stmt {
    /// Whether executing this statement can leave the function
    pub fn may_return(&self) -> bool {
        match self {
            Stmt::Return(..) | Stmt::Tail(_) => true,
            Stmt::Expr(_) => false,
            Stmt::Block(stmts) => stmts.iter().any(Stmt::may_return),
            Stmt::If(_, body) | Stmt::While(_, body) => body.may_return(),
            Stmt::IfElse(_, then, els) => then.may_return() || els.may_return(),
        }
    }

    /// Whether every path through this statement leaves the function
    pub fn always_returns(&self) -> bool {
        match self {
            Stmt::Return(..) | Stmt::Tail(_) => true,
            Stmt::Expr(_) | Stmt::If(..) | Stmt::While(..) => false,
            Stmt::Block(stmts) => stmts.iter().any(Stmt::always_returns),
            Stmt::IfElse(_, then, els) => then.always_returns() && els.always_returns(),
        }
    }
}

impl Expr {
    /// Whether this expression names storage that can be assigned
    pub fn is_place(&self) -> bool {
        match &self.kind {
            ExprKind::Var(..) | ExprKind::Decl(..) => true,
            ExprKind::Member(base, _) => base.is_place(),
            _ => false,
        }
    }
}
