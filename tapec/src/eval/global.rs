use crate::error::{Diagnostic, Error};
use crate::grammer::ast::{Def, Field, Type, AST};
use crate::grammer::token::Pos;
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;

/// A registered function signature
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Field>,
    pub ret: Type,
    pub pos: Pos,
    pub def: usize, // index of the definition in the AST
}

impl Signature {
    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|field| &field.ty)
    }

    fn accepts(&self, args: &[Type]) -> bool {
        self.params.len() == args.len() && self.param_types().zip(args).all(|(p, a)| p == a)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.param_types().join(", "))
    }
}

/// Program-wide symbol table: struct layouts and function signatures
pub struct Global {
    structs: IndexMap<String, Type>,
    funcs: Vec<Signature>,
    overloads: IndexMap<String, Vec<usize>>,
}

impl Global {
    pub fn bind(ast: &AST) -> (Self, Vec<Diagnostic>) {
        let mut errors = Vec::new();
        let structs = collect_structs(ast, &mut errors);
        let mut global = Global {
            structs,
            funcs: Vec::new(),
            overloads: IndexMap::new(),
        };
        for (idx, def) in ast.0.iter().enumerate() {
            if let Def::Func(pos, name, params, ret, _) = def {
                if let Err(e) = global.register(idx, *pos, name, params, ret) {
                    errors.extend(e);
                }
            }
        }
        (global, errors)
    }

    fn register(
        &mut self,
        def: usize,
        pos: Pos,
        name: &str,
        params: &[Field],
        ret: &Type,
    ) -> Result<usize, Vec<Diagnostic>> {
        let mut errors = Vec::new();
        let mut resolved: Vec<Field> = Vec::new();
        for param in params {
            if resolved.iter().any(|f| f.name == param.name) {
                let e = Error::DuplicateField(name.to_string(), param.name.clone());
                errors.push(Diagnostic::error(pos, e));
                continue;
            }
            match self.resolve(&param.ty) {
                Ok(Type::Void) => {
                    errors.push(Diagnostic::error(pos, Error::VoidField(param.name.clone())));
                }
                Ok(ty) => resolved.push(Field::new(param.name.clone(), ty)),
                Err(e) => errors.push(Diagnostic::error(pos, e)),
            }
        }
        let ret = self
            .resolve(ret)
            .map_err(|e| errors.push(Diagnostic::error(pos, e)));
        let Ok(ret) = ret else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let sig = Signature {
            name: name.to_string(),
            params: resolved,
            ret,
            pos,
            def,
        };
        let args = sig.param_types().cloned().collect::<Vec<_>>();
        let overloads = self.overloads.entry(name.to_string()).or_default();
        if let Some(&prev) = overloads.iter().find(|&&id| self.funcs[id].accepts(&args)) {
            let prev = &self.funcs[prev];
            return Err(vec![
                Diagnostic::error(pos, Error::DuplicateFunction(sig.to_string())),
                Diagnostic::note(prev.pos, Error::PreviousDefinition(prev.to_string())),
            ]);
        }
        let id = self.funcs.len();
        overloads.push(id);
        self.funcs.push(sig);
        Ok(id)
    }
}

impl Global {
    /// Replace a forward struct reference by its layout
    pub fn resolve(&self, ty: &Type) -> Result<Type, Error> {
        match ty {
            Type::Forward(name) => self
                .structs
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnknownType(name.clone())),
            ty => Ok(ty.clone()),
        }
    }

    pub fn funcs(&self) -> &[Signature] {
        &self.funcs
    }

    pub fn func(&self, id: usize) -> &Signature {
        &self.funcs[id]
    }

    /// Signature registered for the definition at `def`
    pub fn by_def(&self, def: usize) -> Option<usize> {
        self.funcs.iter().position(|sig| sig.def == def)
    }

    /// Overload resolution: exactly one signature must match the argument types
    pub fn lookup(&self, name: &str, args: &[Type]) -> Result<usize, Error> {
        let candidates = self
            .overloads
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        candidates
            .iter()
            .copied()
            .find(|&id| self.funcs[id].accepts(args))
            .ok_or_else(|| Error::NoMatchingSignature(format!("{}({})", name, args.iter().join(", "))))
    }
}

type RawStructs<'a> = IndexMap<&'a str, (Pos, &'a [Field])>;

fn collect_structs(ast: &AST, errors: &mut Vec<Diagnostic>) -> IndexMap<String, Type> {
    let mut raw: RawStructs = IndexMap::new();
    for def in &ast.0 {
        let Def::Struct(pos, name, fields) = def else {
            continue;
        };
        if let Some((prev, _)) = raw.get(name.as_str()) {
            errors.push(Diagnostic::error(*pos, Error::DuplicateStruct(name.clone())));
            errors.push(Diagnostic::note(*prev, Error::PreviousDefinition(name.clone())));
            continue;
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                let e = Error::DuplicateField(name.clone(), field.name.clone());
                errors.push(Diagnostic::error(*pos, e));
            }
        }
        raw.insert(name, (*pos, fields));
    }

    let mut done = IndexMap::new();
    for name in raw.keys() {
        resolve_struct(*name, &raw, &mut done, &mut Vec::new(), errors);
    }
    // Keep declaration order
    raw.keys()
        .filter_map(|name| done.shift_remove_entry(*name))
        .collect()
}

fn resolve_struct<'a>(
    name: &'a str,
    raw: &RawStructs<'a>,
    done: &mut IndexMap<String, Type>,
    visiting: &mut Vec<&'a str>,
    errors: &mut Vec<Diagnostic>,
) -> Option<Type> {
    if let Some(ty) = done.get(name) {
        return Some(ty.clone());
    }
    let &(pos, fields) = raw.get(name)?;
    if visiting.contains(&name) {
        errors.push(Diagnostic::error(pos, Error::RecursiveStruct(name.to_string())));
        return None;
    }

    visiting.push(name);
    let mut resolved: Vec<Field> = Vec::new();
    for field in fields {
        if resolved.iter().any(|f| f.name == field.name) {
            continue;
        }
        let ty = match &field.ty {
            Type::Void => {
                errors.push(Diagnostic::error(pos, Error::VoidField(field.name.clone())));
                continue;
            }
            Type::Forward(inner) if !raw.contains_key(inner.as_str()) => {
                errors.push(Diagnostic::error(pos, Error::UnknownType(inner.clone())));
                continue;
            }
            Type::Forward(inner) => match resolve_struct(inner, raw, done, visiting, errors) {
                Some(ty) => ty,
                None => continue,
            },
            ty => ty.clone(),
        };
        resolved.push(Field::new(field.name.clone(), ty));
    }
    visiting.pop();

    let ty = Type::Struct(name.to_string(), resolved);
    done.insert(name.to_string(), ty.clone());
    Some(ty)
}
