mod hooks;

use arch::State;
use clap::Parser;
use color_print::cprintln;

use hooks::{dump::Dump, serial::Serial, Hook};

#[derive(Parser, Debug)]
#[clap(
    name = "Tape Emulator",
    version = "v1.0.0",
    about = "Emulator for the eight-symbol tape machine"
)]
struct Args {
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// Symbol map written by the compiler
    #[arg(short, long)]
    map: Option<String>,

    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Bytes consumed by `,`
    #[arg(short, long)]
    input: Option<String>,

    /// Copy of everything written by `.`
    #[arg(short, long)]
    output: Option<String>,

    #[arg(short, long)]
    style: bool,

    #[arg(default_value = "main.bf")]
    input_file: String,
}

fn main() {
    let args = Args::parse();
    println!("Tape Emulator");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    println!("+-----------------------------------------------+");

    // ------------------------------------------------------------------------
    // Initialize state machine model
    let state = State::load_file(&args.input_file).unwrap_or_else(|e| fail(&e.to_string()));

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let dump = Dump::arg(args.map, args.dump_all).unwrap_or_else(|e| fail(&e));
    let serial =
        Serial::arg(args.style, args.output, args.input).unwrap_or_else(|e| fail(&e.to_string()));
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(serial), Box::new(dump)];

    // ------------------------------------------------------------------------
    // Main loop
    let outcome = run(state, &mut hooks, args.tmax);
    drop(hooks);

    // Exit
    println!();
    println!("=================================================");
    if let Some(e) = outcome.error {
        fail(&e.to_string());
    }
    match outcome.state.is_terminated() {
        true => println!("Halted after {} steps", outcome.steps),
        false => cprintln!("<yellow>Stopped</> after {} steps", outcome.steps),
    }
}

/// Final state of a run and the machine error that ended it, if any
struct Outcome {
    state: State,
    steps: u64,
    error: Option<arch::Error>,
}

fn run(mut state: State, hooks: &mut [Box<dyn Hook>], tmax: Option<u64>) -> Outcome {
    state = hooks.iter_mut().fold(state, |state, hook| hook.init(state));
    let mut steps = 0;
    let mut error = None;
    for time in 0..tmax.unwrap_or(u64::MAX) {
        if state.is_terminated() {
            break;
        }
        let (pc, inst) = match state.exec() {
            Ok(step) => step,
            Err(e) => {
                error = Some(e);
                break;
            }
        };
        steps = time + 1;
        state = hooks
            .iter_mut()
            .fold(state, |state, hook| hook.exec(time, pc, inst, state));
    }
    for hook in hooks.iter_mut() {
        hook.fini(&state);
    }
    Outcome { state, steps, error }
}

fn fail(msg: &str) -> ! {
    cprintln!("<red,bold>error</>: {}", msg);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::{Inst, Program};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts executed steps and final calls
    struct Counter {
        steps: Rc<Cell<u64>>,
        finished: Rc<Cell<u32>>,
    }

    impl Hook for Counter {
        fn init(&mut self, state: State) -> State {
            state
        }
        fn exec(&mut self, _time: u64, _pc: usize, _inst: Inst, state: State) -> State {
            self.steps.set(self.steps.get() + 1);
            state
        }
        fn fini(&mut self, _state: &State) {
            self.finished.set(self.finished.get() + 1);
        }
    }

    fn state(text: &str) -> State {
        State::new(Program::parse(text).unwrap())
    }

    fn counting() -> (Box<dyn Hook>, Rc<Cell<u64>>, Rc<Cell<u32>>) {
        let steps = Rc::new(Cell::new(0));
        let finished = Rc::new(Cell::new(0));
        let hook = Counter {
            steps: steps.clone(),
            finished: finished.clone(),
        };
        (Box::new(hook), steps, finished)
    }

    #[test]
    fn halted() {
        let (hook, steps, finished) = counting();
        let outcome = run(state("+++"), &mut [hook], None);
        assert!(outcome.state.is_terminated());
        assert!(outcome.error.is_none());
        assert_eq!(outcome.steps, 3);
        assert_eq!(steps.get(), 3);
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn stopped_by_step_limit() {
        let (hook, _, finished) = counting();
        let outcome = run(state("+[]"), &mut [hook], Some(10));
        assert!(!outcome.state.is_terminated());
        assert_eq!(outcome.steps, 10);
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn machine_error_still_finishes() {
        let (hook, _, finished) = counting();
        let outcome = run(state("+<"), &mut [hook], None);
        assert!(matches!(outcome.error, Some(arch::Error::PointerUnderflow(_))));
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn output_file_survives_error() {
        let path = std::env::temp_dir().join(format!("tapeemu-{}.out", std::process::id()));
        let file = path.to_string_lossy().to_string();
        let serial = Serial::arg(false, Some(file), None).unwrap();
        let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(serial)];
        let outcome = run(state("+++++.<"), &mut hooks, None);
        assert!(outcome.error.is_some());
        assert_eq!(std::fs::read(&path).unwrap(), [5]);
        drop(hooks);
        let _ = std::fs::remove_file(&path);
    }
}
