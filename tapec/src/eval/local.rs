use crate::error::Error;
use crate::eval::global::Global;
use crate::grammer::ast::{Field, Type};
use indexmap::IndexMap;
use std::ops::Range;

/// A variable placed in a function frame
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: Type,
    pub offset: usize,
}

impl Var {
    pub fn cells(&self) -> Range<usize> {
        self.offset..self.offset + self.ty.sizeof()
    }
}

/// Static layout of one function frame.
/// Parameters come first, then locals in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FrameLayout {
    pub vars: Vec<Var>,
    pub params: usize,
    pub size: usize,
}

impl FrameLayout {
    pub fn params(&self) -> &[Var] {
        &self.vars[..self.params]
    }
}

/// Scope of one function body: a stack of frames mapping names to variables
pub struct Local<'a> {
    global: &'a Global,
    frames: Vec<IndexMap<String, usize>>,
    layout: FrameLayout,
}

impl<'a> Local<'a> {
    pub fn fork(global: &'a Global) -> Self {
        Self {
            global,
            frames: vec![IndexMap::new()],
            layout: FrameLayout::default(),
        }
    }

    pub fn args(&mut self, args: &[Field]) -> Result<(), Error> {
        for arg in args {
            self.push(&arg.name, &arg.ty)?;
        }
        self.layout.params = self.layout.vars.len();
        Ok(())
    }

    pub fn enter(&mut self) {
        self.frames.push(IndexMap::new());
    }

    pub fn exit(&mut self) {
        self.frames.pop();
    }

    /// Declare a variable in the innermost frame
    pub fn push(&mut self, name: &str, ty: &Type) -> Result<&Var, Error> {
        let ty = self.global.resolve(ty)?;
        if ty.is_void() {
            return Err(Error::VoidVariable(name.to_string()));
        }
        let frame = self.frames.last_mut().ok_or(Error::UnknownVariable(name.to_string()))?;
        if frame.contains_key(name) {
            return Err(Error::DuplicateLocal(name.to_string()));
        }

        let idx = self.layout.vars.len();
        let offset = self.layout.size;
        self.layout.size += ty.sizeof();
        frame.insert(name.to_string(), idx);
        self.layout.vars.push(Var {
            name: name.to_string(),
            ty,
            offset,
        });
        Ok(&self.layout.vars[idx])
    }

    /// Find the innermost visible variable called `name`
    pub fn lookup(&self, name: &str) -> Option<&Var> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .map(|&idx| &self.layout.vars[idx])
    }

    pub fn resolve(&self, ty: &Type) -> Result<Type, Error> {
        self.global.resolve(ty)
    }

    pub fn finish(self) -> FrameLayout {
        self.layout
    }
}
