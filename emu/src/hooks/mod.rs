pub mod dump;
pub mod serial;

use arch::{Inst, State};

/// Side effects observed around each executed instruction
pub trait Hook {
    fn init(&mut self, state: State) -> State;
    fn exec(&mut self, time: u64, pc: usize, inst: Inst, state: State) -> State;
    /// Called once when the run ends, whether halted, stopped or failed
    fn fini(&mut self, state: &State);
}
