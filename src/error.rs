use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which part of the script run failed after it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStep {
    /// Running the script's top-level chunk.
    TopLevel,
    /// Calling `midi_to_hydrogen`.
    Call,
}

impl fmt::Display for ExecStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecStep::TopLevel => f.write_str("top-level"),
            ExecStep::Call => f.write_str("call midi_to_hydrogen"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ScriptLoad,
    ScriptExec,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("script load failed: {message}")]
    ScriptLoad { path: PathBuf, message: String },

    #[error("script exec failed ({step}): {message}")]
    ScriptExec { step: ExecStep, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ScriptLoad { .. } => ErrorKind::ScriptLoad,
            Error::ScriptExec { .. } => ErrorKind::ScriptExec,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// The interpreter's diagnostic text, without the step prefix.
    pub fn message(&self) -> String {
        match self {
            Error::ScriptLoad { message, .. } | Error::ScriptExec { message, .. } => {
                message.clone()
            }
            Error::Io(e) => e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_display_names_step() {
        let err = Error::ScriptExec {
            step: ExecStep::Call,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "script exec failed (call midi_to_hydrogen): boom");
        assert_eq!(err.kind(), ErrorKind::ScriptExec);
    }

    #[test]
    fn test_load_display() {
        let err = Error::ScriptLoad {
            path: PathBuf::from("x.lua"),
            message: "unexpected symbol".into(),
        };
        assert_eq!(err.to_string(), "script load failed: unexpected symbol");
        assert_eq!(err.kind(), ErrorKind::ScriptLoad);
        assert_eq!(err.message(), "unexpected symbol");
    }
}
