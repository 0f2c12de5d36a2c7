use crate::error::Error;
use crate::inst::{render, Inst};
use std::fmt;

/// A bracket-checked instruction sequence with its jump table
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    insts: Vec<Inst>,
    jump: Vec<usize>,
}

impl Program {
    pub fn new(insts: Vec<Inst>) -> Result<Self, Error> {
        let mut jump = vec![0; insts.len()];
        let mut stack = Vec::new();
        for (idx, inst) in insts.iter().enumerate() {
            match inst {
                Inst::Open => stack.push(idx),
                Inst::Close => {
                    let open = stack.pop().ok_or(Error::UnmatchedClose(idx))?;
                    jump[open] = idx;
                    jump[idx] = open;
                }
                _ => {}
            }
        }
        if let Some(open) = stack.pop() {
            return Err(Error::UnmatchedOpen(open));
        }
        Ok(Self { insts, jump })
    }

    /// Parse program text. Characters other than the eight symbols are ignored.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::new(text.chars().filter_map(Inst::from_char).collect())
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn get(&self, pc: usize) -> Option<Inst> {
        self.insts.get(pc).copied()
    }

    /// Index of the bracket matching the one at `pc`
    pub fn partner(&self, pc: usize) -> usize {
        self.jump[pc]
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(&self.insts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_skipped() {
        let prog = Program::parse("add one: + then loop [ - ]").unwrap();
        assert_eq!(prog.to_string(), "+[-]");
    }

    #[test]
    fn nested_partners() {
        let prog = Program::parse("[[]]").unwrap();
        assert_eq!(prog.partner(0), 3);
        assert_eq!(prog.partner(1), 2);
        assert_eq!(prog.partner(2), 1);
        assert_eq!(prog.partner(3), 0);
    }

    #[test]
    fn unmatched_brackets() {
        assert!(matches!(Program::parse("[[]"), Err(Error::UnmatchedOpen(0))));
        assert!(matches!(Program::parse("+]"), Err(Error::UnmatchedClose(1))));
    }
}
