use crate::grammer::ast::{Field, Type};

impl Type {
    /// Number of tape cells a value of this type occupies
    pub fn sizeof(&self) -> usize {
        match self {
            Type::Void => 0,
            Type::U8 => 1,
            Type::Struct(_, fields) => fields.iter().map(|field| field.ty.sizeof()).sum(),
            Type::Forward(_) => 0, // unresolved, never reaches code generation
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Struct name, for resolved and forward struct types alike
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Type::Struct(name, _) | Type::Forward(name) => Some(name),
            _ => None,
        }
    }

    /// Offset and type of a struct field
    pub fn field(&self, name: &str) -> Option<(usize, &Type)> {
        let Type::Struct(_, fields) = self else {
            return None;
        };
        let mut offset = 0;
        for Field { name: fname, ty } in fields {
            if fname == name {
                return Some((offset, ty));
            }
            offset += ty.sizeof();
        }
        None
    }

    /// Casts keep the value and may only rename a type to itself:
    /// `u8` to `u8`, or a struct to the same struct.
    pub fn castable(&self, to: &Type) -> bool {
        match (self, to) {
            (Type::U8, Type::U8) => true,
            (a, b) => a.struct_name().is_some() && a.struct_name() == b.struct_name(),
        }
    }
}
