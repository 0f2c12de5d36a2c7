use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unmatched `[` at instruction {0}")]
    UnmatchedOpen(usize),

    #[error("Unmatched `]` at instruction {0}")]
    UnmatchedClose(usize),

    #[error("Pointer moved left of cell 0 at instruction {0}")]
    PointerUnderflow(usize),

    #[error("Pointer moved past cell {1} at instruction {0}")]
    PointerOverflow(usize, usize),

    #[error("Program already terminated")]
    Terminated,

    #[error("Step limit of {0} reached")]
    StepLimit(u64),
}
