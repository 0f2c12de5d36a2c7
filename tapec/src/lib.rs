pub mod compile;
pub mod error;
pub mod eval;
pub mod grammer;
pub mod linker;
pub mod util;

pub use compile::{compile, Code, Output};
pub use error::{Category, Diagnostic, Error};
pub use eval::check::check;
pub use eval::global::Global;
pub use grammer::lexer::Lexer;
pub use grammer::parsercore::Parser;
pub use linker::allocator::Allocator;
pub use util::display::layout_print;
pub use util::maps::SymbolMap;
