use crate::error::Error;
use crate::inst::Inst;
use crate::program::Program;
use std::collections::VecDeque;
use std::fs;

/// Number of cells on the tape
pub const TAPE_CELLS: usize = 30000;

pub struct State {
    program: Program,
    tape: Vec<u8>,
    ptr: usize,
    pc: usize,
    input: VecDeque<u8>,
    output: Vec<u8>,
}

// Tape access
impl State {
    pub fn get(&self, addr: usize) -> u8 {
        self.tape.get(addr).copied().unwrap_or(0)
    }

    pub fn set(&mut self, addr: usize, val: u8) {
        if let Some(cell) = self.tape.get_mut(addr) {
            *cell = val;
        }
    }

    pub fn ptr(&self) -> usize {
        self.ptr
    }

    pub fn pc(&self) -> usize {
        self.pc
    }
}

// Input and output
impl State {
    /// Queue bytes to be consumed by `,`
    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take every byte written since the last call
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

impl State {
    pub fn new(program: Program) -> Self {
        State {
            program,
            tape: vec![0; TAPE_CELLS],
            ptr: 0,
            pc: 0,
            input: VecDeque::new(),
            output: Vec::new(),
        }
    }

    pub fn load_file(fname: &str) -> Result<Self, Error> {
        let text = fs::read_to_string(fname)?;
        Ok(Self::new(Program::parse(&text)?))
    }

    pub fn is_terminated(&self) -> bool {
        self.pc >= self.program.len()
    }

    /// Execute one instruction and return its address and kind.
    /// Reading past the end of input stores 0.
    pub fn exec(&mut self) -> Result<(usize, Inst), Error> {
        let pc = self.pc;
        let Some(inst) = self.program.get(pc) else {
            return Err(Error::Terminated);
        };
        match inst {
            Inst::Inc => self.tape[self.ptr] = self.tape[self.ptr].wrapping_add(1),
            Inst::Dec => self.tape[self.ptr] = self.tape[self.ptr].wrapping_sub(1),
            Inst::Left => {
                self.ptr = self.ptr.checked_sub(1).ok_or(Error::PointerUnderflow(pc))?;
            }
            Inst::Right => {
                if self.ptr + 1 >= self.tape.len() {
                    return Err(Error::PointerOverflow(pc, self.tape.len()));
                }
                self.ptr += 1;
            }
            Inst::Read => self.tape[self.ptr] = self.input.pop_front().unwrap_or(0),
            Inst::Write => self.output.push(self.tape[self.ptr]),
            Inst::Open => {
                if self.tape[self.ptr] == 0 {
                    self.pc = self.program.partner(pc);
                }
            }
            Inst::Close => {
                if self.tape[self.ptr] != 0 {
                    self.pc = self.program.partner(pc);
                }
            }
        }
        self.pc += 1;
        Ok((pc, inst))
    }

    /// Run until the program ends. Returns the number of executed steps.
    pub fn run(&mut self, tmax: Option<u64>) -> Result<u64, Error> {
        let mut time = 0;
        while !self.is_terminated() {
            if tmax.is_some_and(|t| time >= t) {
                return Err(Error::StepLimit(time));
            }
            self.exec()?;
            time += 1;
        }
        Ok(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, input: &[u8]) -> State {
        let mut state = State::new(Program::parse(text).unwrap());
        state.feed(input);
        state.run(Some(1_000_000)).unwrap();
        state
    }

    #[test]
    fn cells_wrap() {
        let state = run("-", &[]);
        assert_eq!(state.get(0), 255);
        let state = run("-+", &[]);
        assert_eq!(state.get(0), 0);
    }

    #[test]
    fn echo_input() {
        let state = run(",.>,.", b"hi");
        assert_eq!(state.output(), b"hi");
    }

    #[test]
    fn read_past_end_is_zero() {
        let state = run("+,", &[]);
        assert_eq!(state.get(0), 0);
    }

    #[test]
    fn loop_moves_value() {
        let state = run("+++++[->++<]", &[]);
        assert_eq!(state.get(0), 0);
        assert_eq!(state.get(1), 10);
    }

    #[test]
    fn pointer_underflow() {
        let mut state = State::new(Program::parse("<").unwrap());
        assert!(matches!(state.run(None), Err(Error::PointerUnderflow(0))));
    }

    #[test]
    fn step_limit() {
        let mut state = State::new(Program::parse("+[]").unwrap());
        assert!(matches!(state.run(Some(100)), Err(Error::StepLimit(100))));
    }
}
