pub mod allocator;
pub mod deps;
