use color_print::cformat;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One instruction of the tape machine.
/// The discriminant is the ASCII symbol of the instruction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Inst {
    #[strum(serialize = "+")]
    Inc = 0x2B,
    #[strum(serialize = "-")]
    Dec = 0x2D,
    #[strum(serialize = "<")]
    Left = 0x3C,
    #[strum(serialize = ">")]
    Right = 0x3E,
    #[strum(serialize = ",")]
    Read = 0x2C,
    #[strum(serialize = ".")]
    Write = 0x2E,
    #[strum(serialize = "[")]
    Open = 0x5B,
    #[strum(serialize = "]")]
    Close = 0x5D,
}

impl Inst {
    pub fn from_char(ch: char) -> Option<Self> {
        u8::try_from(ch).ok().and_then(|b| Inst::try_from(b).ok())
    }

    pub fn symbol(self) -> char {
        u8::from(self) as char
    }

    /// Pointer displacement caused by this instruction
    pub fn shift(self) -> isize {
        match self {
            Inst::Left => -1,
            Inst::Right => 1,
            _ => 0,
        }
    }

    pub fn cformat(&self) -> String {
        match self {
            Inst::Inc | Inst::Dec => cformat!("<g>{}</>", self.symbol()),
            Inst::Left | Inst::Right => cformat!("<b>{}</>", self.symbol()),
            Inst::Read | Inst::Write => cformat!("<y,s>{}</>", self.symbol()),
            Inst::Open | Inst::Close => cformat!("<r>{}</>", self.symbol()),
        }
    }
}

/// Render an instruction sequence as program text
pub fn render(insts: &[Inst]) -> String {
    insts.iter().map(|inst| inst.symbol()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn symbol_matches_display() {
        for inst in Inst::iter() {
            assert_eq!(inst.symbol().to_string(), inst.to_string());
            assert_eq!(Inst::from_str(&inst.to_string()).ok(), Some(inst));
            assert_eq!(Inst::from_char(inst.symbol()), Some(inst));
        }
    }

    #[test]
    fn other_characters_are_not_instructions() {
        for ch in ['a', ' ', '\n', '#', '0', 'ß'] {
            assert_eq!(Inst::from_char(ch), None);
        }
    }

    #[test]
    fn render_text() {
        let code = [Inst::Inc, Inst::Open, Inst::Dec, Inst::Right, Inst::Close];
        assert_eq!(render(&code), "+[->]");
    }
}
