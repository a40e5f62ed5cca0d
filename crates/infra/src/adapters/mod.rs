//! Storage adapter implementations

mod filesystem;

pub use filesystem::FileSystemAdapter;
