use super::Code;
use arch::Inst;

/// Instruction emitter for one frame.
/// Tracks the absolute pointer position and a LIFO pool of scratch cells.
/// Every scratch cell is zero when it is handed out and when it is released.
pub struct Tape {
    code: Vec<Inst>,
    cursor: usize,
    top: usize,
    peak: usize,
}

impl Tape {
    pub fn new(cursor: usize, scratch: usize) -> Self {
        Tape {
            code: Vec::new(),
            cursor,
            top: scratch,
            peak: scratch,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// First cell past every scratch cell used so far
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn finish(self) -> Code {
        Code(self.code)
    }
}

// ----------------------------------------------------------------------------
// Scratch cells
// ----------------------------------------------------------------------------

impl Tape {
    pub fn temp(&mut self, size: usize) -> usize {
        let addr = self.top;
        self.top += size;
        self.peak = self.peak.max(self.top);
        addr
    }

    /// Release `addr` and every cell allocated after it
    pub fn release(&mut self, addr: usize) {
        self.top = addr;
    }
}

// ----------------------------------------------------------------------------
// Primitives
// ----------------------------------------------------------------------------

impl Tape {
    pub fn goto(&mut self, addr: usize) {
        let (inst, n) = if addr >= self.cursor {
            (Inst::Right, addr - self.cursor)
        } else {
            (Inst::Left, self.cursor - addr)
        };
        self.code.extend(std::iter::repeat(inst).take(n));
        self.cursor = addr;
    }

    /// Add `n` to a cell, modulo 256
    pub fn add(&mut self, addr: usize, n: u8) {
        if n == 0 {
            return;
        }
        self.goto(addr);
        let (inst, count) = match n {
            1..=128 => (Inst::Inc, n as usize),
            _ => (Inst::Dec, 256 - n as usize),
        };
        self.code.extend(std::iter::repeat(inst).take(count));
    }

    pub fn sub(&mut self, addr: usize, n: u8) {
        self.add(addr, n.wrapping_neg());
    }

    /// `[` on `addr`, the matching `close` must use the same cell
    pub fn open(&mut self, addr: usize) {
        self.goto(addr);
        self.code.push(Inst::Open);
    }

    pub fn close(&mut self, addr: usize) {
        self.goto(addr);
        self.code.push(Inst::Close);
    }

    /// Emit pointer-balanced code at the current cursor
    pub fn raw(&mut self, code: &[Inst]) {
        self.code.extend_from_slice(code);
    }

    /// Emit a body that starts and ends at `at`
    pub fn splice(&mut self, at: usize, code: &Code) {
        self.goto(at);
        self.raw(&code.0);
    }
}

// ----------------------------------------------------------------------------
// Cell moves
// ----------------------------------------------------------------------------

impl Tape {
    /// cell = 0
    pub fn clear(&mut self, addr: usize) {
        self.open(addr);
        self.sub(addr, 1);
        self.close(addr);
    }

    pub fn clear_range(&mut self, addr: usize, size: usize) {
        for i in 0..size {
            self.clear(addr + i);
        }
    }

    /// dst += src, src = 0
    pub fn mov(&mut self, src: usize, dst: usize) {
        self.open(src);
        self.sub(src, 1);
        self.add(dst, 1);
        self.close(src);
    }

    pub fn mov_range(&mut self, src: usize, dst: usize, size: usize) {
        for i in 0..size {
            self.mov(src + i, dst + i);
        }
    }

    /// dst -= src, src = 0
    pub fn mov_neg(&mut self, src: usize, dst: usize) {
        self.open(src);
        self.sub(src, 1);
        self.sub(dst, 1);
        self.close(src);
    }

    /// dst += src, src unchanged
    pub fn copy(&mut self, src: usize, dst: usize) {
        let t = self.temp(1);
        self.open(src);
        self.sub(src, 1);
        self.add(dst, 1);
        self.add(t, 1);
        self.close(src);
        self.mov(t, src);
        self.release(t);
    }

    pub fn copy_range(&mut self, src: usize, dst: usize, size: usize) {
        for i in 0..size {
            self.copy(src + i, dst + i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::{Program, State};

    fn run(tape: Tape, init: &[(usize, u8)]) -> State {
        let mut state = State::new(Program::new(tape.finish().0).unwrap());
        for &(addr, val) in init {
            state.set(addr, val);
        }
        state.run(Some(1_000_000)).unwrap();
        state
    }

    #[test]
    fn relative_moves() {
        let mut tape = Tape::new(3, 10);
        tape.add(5, 2);
        tape.add(1, 255);
        assert_eq!(tape.cursor(), 1);
        assert_eq!(tape.finish().to_string(), ">>++<<<<-");
    }

    #[test]
    fn copy_keeps_source() {
        let mut tape = Tape::new(0, 10);
        tape.copy(0, 1);
        let state = run(tape, &[(0, 42)]);
        assert_eq!(state.get(0), 42);
        assert_eq!(state.get(1), 42);
        assert_eq!(state.get(10), 0);
    }

    #[test]
    fn scratch_is_lifo() {
        let mut tape = Tape::new(0, 4);
        let a = tape.temp(2);
        let b = tape.temp(1);
        assert_eq!((a, b), (4, 6));
        tape.release(a);
        assert_eq!(tape.temp(1), 4);
        assert_eq!(tape.peak(), 7);
    }
}
