//! Decompressing line source

pub mod compression;
pub mod line_source;

pub use compression::Compression;
pub use line_source::{Line, LineSource};
