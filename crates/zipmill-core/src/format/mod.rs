//! Binary layout of the ZIP container.

pub mod dostime;
pub mod headers;

pub use headers::{CentralFileHeader, EndOfCentralDirectory, LocalFileHeader};
