pub mod check;
pub mod global;
pub mod local;
pub mod types;
