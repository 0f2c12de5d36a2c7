pub mod error;
pub mod inst;
pub mod machine;
pub mod program;

pub use error::Error;
pub use inst::Inst;
pub use machine::State;
pub use program::Program;
