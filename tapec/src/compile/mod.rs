pub mod arith;
pub mod func;
pub mod tape;

use crate::error::{Diagnostic, Error};
use crate::eval::check::{check, Checked};
use crate::eval::global::Global;
use crate::eval::local::FrameLayout;
use crate::grammer::ast::{Def, Expr, AST};
use crate::grammer::lexer::Lexer;
use crate::grammer::parsercore::Parser;
use crate::grammer::token::{Pos, Token, TokenKind};
use crate::linker::allocator::Allocator;
use crate::linker::deps::{dependency, filter, order};
use crate::util::maps::SymbolMap;
use arch::machine::TAPE_CELLS;
use arch::Inst;
use func::FuncCompiler;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

pub const ENTRY: &str = "<entry>";

/// Straight-line instruction stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Code(pub Vec<Inst>);

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", arch::inst::render(&self.0))
    }
}

/// Absolute placement of one function on the tape.
/// Cells from `base`: variables, return slot, live flag, then scratch.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub base: usize,
    pub layout: FrameLayout,
    pub ret: usize,
    pub ret_size: usize,
    pub live: Option<usize>,
    pub size: usize,
}

impl Frame {
    pub fn new(name: &str, base: usize, layout: FrameLayout, ret_size: usize, live: bool) -> Self {
        let ret = base + layout.size;
        Frame {
            name: name.to_string(),
            base,
            layout,
            ret,
            ret_size,
            live: live.then_some(ret + ret_size),
            size: 0,
        }
    }

    pub fn scratch(&self) -> usize {
        self.ret + self.ret_size + self.live.map_or(0, |_| 1)
    }
}

#[derive(Debug, Clone)]
pub struct Compiled {
    pub frame: Frame,
    pub body: Code,
}

#[derive(Debug)]
pub struct Output {
    pub code: Code,
    pub map: SymbolMap,
}

/// Source text to program, or every diagnostic of the first failing phase
pub fn compile(source: &str) -> Result<Output, Vec<Diagnostic>> {
    let tokens = Lexer::new(source).parse();
    let mut diags: Vec<Diagnostic> = tokens.iter().filter_map(lexical).collect();

    let (mut ast, errors) = Parser::new(tokens.into_iter()).parse();
    diags.extend(errors);
    if !diags.is_empty() {
        return Err(diags);
    }

    let (global, errors) = Global::bind(&ast);
    diags.extend(errors);
    let (checked, errors) = check(&global, &mut ast);
    diags.extend(errors);
    let deps = dependency(&checked);
    let order = match order(&global, &deps) {
        Ok(order) => order,
        Err(errors) => {
            diags.extend(errors);
            Vec::new()
        }
    };
    if diags.iter().any(Diagnostic::is_error) {
        return Err(diags);
    }

    generate(&global, &ast, &checked, &deps, &order).map_err(|e| vec![e])
}

fn lexical(token: &Token) -> Option<Diagnostic> {
    match &token.kind {
        TokenKind::Error(text) if text.chars().all(|c| c.is_ascii_digit()) => Some(
            Diagnostic::error(token.pos, Error::InvalidNumber(text.clone())),
        ),
        TokenKind::Error(text) => Some(Diagnostic::error(
            token.pos,
            Error::UnknownCharacter(text.clone()),
        )),
        _ => None,
    }
}

/// Lay out every reachable function callee-first, then the entry frame
pub fn generate(
    global: &Global,
    ast: &AST,
    checked: &Checked,
    deps: &HashMap<usize, Vec<usize>>,
    order: &[usize],
) -> Result<Output, Diagnostic> {
    let roots: Vec<usize> = checked.entry.calls.iter().copied().collect();
    let used = filter(deps, &roots);
    let mut alloc = Allocator::new(TAPE_CELLS);
    let mut done: IndexMap<usize, Compiled> = IndexMap::new();

    for &id in order.iter().filter(|id| used.contains(id)) {
        let sig = global.func(id);
        let Some(Def::Func(pos, .., body)) = ast.0.get(sig.def) else {
            continue;
        };
        let layout = checked
            .funcs
            .get(&id)
            .map(|func| func.layout.clone())
            .ok_or_else(|| Diagnostic::error(*pos, Error::Unresolved(sig.to_string())))?;

        let base = alloc.tail();
        let frame = Frame::new(&sig.to_string(), base, layout, sig.ret.sizeof(), true);
        let compiled = FuncCompiler::new(&done, frame, base)
            .compile(body)
            .map_err(|e| Diagnostic::error(*pos, e))?;
        alloc
            .allocate(compiled.frame.size, &compiled.frame.name)
            .map_err(|e| Diagnostic::error(*pos, e))?;
        done.insert(id, compiled);
    }

    let exprs: Vec<&Expr> = ast
        .0
        .iter()
        .filter_map(|def| match def {
            Def::Expr(expr) => Some(expr),
            _ => None,
        })
        .collect();
    let pos = exprs.first().map_or(Pos::default(), |expr| expr.pos);
    let base = alloc.tail();
    let frame = Frame::new(ENTRY, base, checked.entry.layout.clone(), 0, false);
    let entry = FuncCompiler::new(&done, frame, 0)
        .entry(&exprs)
        .map_err(|e| Diagnostic::error(pos, e))?;
    alloc
        .allocate(entry.frame.size, ENTRY)
        .map_err(|e| Diagnostic::error(pos, e))?;

    let map = SymbolMap::generate(done.values().chain([&entry]).map(|c| &c.frame));
    Ok(Output {
        code: entry.body,
        map,
    })
}
