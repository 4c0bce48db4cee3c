pub mod batch;
pub mod converter;
pub mod error;

pub use converter::{convert, Converter, DEFAULT_SCRIPT, ENTRY_POINT};
pub use error::{Error, ErrorKind, ExecStep, Result};
