//! MIDI to Hydrogen conversion through an external Lua script
//!
//! The script does all the real work. Running it is five ordered steps,
//! each in a fresh interpreter:
//!
//! 1. open a session
//! 2. load (compile) the script file
//! 3. run its top-level chunk, which must define `midi_to_hydrogen`
//! 4. call `midi_to_hydrogen(midi_path)`
//! 5. take the returned string as the song text
//!
//! The first failing step aborts the rest. The session is closed on every path.

pub mod session;

use crate::error::{Error, ExecStep, Result};
use log::debug;
use mlua::{Function, Lua, Value};
use session::Session;
use std::fs;
use std::path::{Path, PathBuf};

pub use session::live_sessions;

/// Name of the global function the script must define
pub const ENTRY_POINT: &str = "midi_to_hydrogen";

/// Script location used by the original deployment
pub const DEFAULT_SCRIPT: &str = "../midi_to_hydrogen.lua";

/// Converts MIDI files with one conversion script.
///
/// Holds only the script path; no interpreter state survives between calls.
#[derive(Debug, Clone)]
pub struct Converter {
    script: PathBuf,
}

impl Converter {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Convert one MIDI file, returning the Hydrogen song text.
    pub fn convert(&self, midi: &Path) -> Result<String> {
        debug!(
            "converting {} with {}",
            midi.display(),
            self.script.display()
        );

        let session = Session::open();
        let lua = session.lua();

        let chunk = self.load(lua)?;
        chunk
            .call::<_, ()>(())
            .map_err(|e| exec_error(ExecStep::TopLevel, &e))?;

        let entry = entry_point(lua)?;
        let arg = lua
            .create_string(midi.as_os_str().as_encoded_bytes())
            .map_err(|e| exec_error(ExecStep::Call, &e))?;
        let ret: Value = entry
            .call(arg)
            .map_err(|e| exec_error(ExecStep::Call, &e))?;

        song_text(ret)
    }

    /// Read and compile the script without running it.
    fn load<'lua>(&self, lua: &'lua Lua) -> Result<Function<'lua>> {
        let source = fs::read(&self.script).map_err(|e| Error::ScriptLoad {
            path: self.script.clone(),
            message: format!("cannot open {}: {}", self.script.display(), e),
        })?;

        lua.load(strip_preamble(&source))
            .set_name(format!("@{}", self.script.display()))
            .into_function()
            .map_err(|e| Error::ScriptLoad {
                path: self.script.clone(),
                message: diagnostic(&e),
            })
    }
}

/// Convert `midi` using the script at `script`.
pub fn convert(script: impl AsRef<Path>, midi: impl AsRef<Path>) -> Result<String> {
    Converter::new(script.as_ref()).convert(midi.as_ref())
}

fn entry_point(lua: &Lua) -> Result<Function<'_>> {
    let value: Value = lua
        .globals()
        .get(ENTRY_POINT)
        .map_err(|e| exec_error(ExecStep::Call, &e))?;

    match value {
        Value::Function(f) => Ok(f),
        Value::Nil => Err(Error::ScriptExec {
            step: ExecStep::Call,
            message: format!("global function '{}' is not defined", ENTRY_POINT),
        }),
        other => Err(Error::ScriptExec {
            step: ExecStep::Call,
            message: format!(
                "global '{}' is a {}, not a function",
                ENTRY_POINT,
                other.type_name()
            ),
        }),
    }
}

fn song_text(ret: Value) -> Result<String> {
    match ret {
        Value::String(s) => s
            .to_str()
            .map(str::to_owned)
            .map_err(|_| not_text("string with invalid UTF-8")),
        other => Err(not_text(other.type_name())),
    }
}

fn not_text(got: &str) -> Error {
    Error::ScriptExec {
        step: ExecStep::Call,
        message: format!("cannot convert return value to text (got {})", got),
    }
}

fn exec_error(step: ExecStep, err: &mlua::Error) -> Error {
    Error::ScriptExec {
        step,
        message: diagnostic(err),
    }
}

/// One-line diagnostic for an interpreter error.
///
/// Lua appends a stack traceback to runtime errors; only the first line is kept.
fn diagnostic(err: &mlua::Error) -> String {
    let text = match err {
        mlua::Error::SyntaxError { message, .. } => message.clone(),
        mlua::Error::RuntimeError(message) => message.clone(),
        mlua::Error::CallbackError { cause, .. } => return diagnostic(cause),
        other => other.to_string(),
    };
    first_line(&text)
}

fn first_line(text: &str) -> String {
    match text.lines().map(str::trim_end).find(|l| !l.is_empty()) {
        Some(line) => line.to_owned(),
        None => "unknown error".to_owned(),
    }
}

/// Skip a UTF-8 BOM and a leading `#` line, as the stock Lua file loader does.
///
/// The newline ending the `#` line is kept so line numbers in diagnostics
/// still match the file.
fn strip_preamble(source: &[u8]) -> &[u8] {
    let source = source.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(source);
    if source.first() == Some(&b'#') {
        match source.iter().position(|&b| b == b'\n') {
            Some(pos) => &source[pos..],
            None => &[],
        }
    } else {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_drops_traceback() {
        let text = "x.lua:3: boom\nstack traceback:\n\t[C]: in ?";
        assert_eq!(first_line(text), "x.lua:3: boom");
        assert_eq!(first_line("\n\n"), "unknown error");
    }

    #[test]
    fn test_strip_preamble() {
        assert_eq!(strip_preamble(b"#!/usr/bin/lua\nreturn 1"), b"\nreturn 1");
        assert_eq!(strip_preamble(b"\xEF\xBB\xBFreturn 1"), b"return 1");
        assert_eq!(strip_preamble(b"return 1"), b"return 1");
        assert_eq!(strip_preamble(b"# only a comment"), b"");
    }

    #[test]
    fn test_song_text_accepts_only_strings() {
        let lua = Lua::new();
        let s = lua.create_string("<song/>").unwrap();
        assert_eq!(song_text(Value::String(s)).unwrap(), "<song/>");

        let err = song_text(Value::Integer(7)).unwrap_err();
        assert_eq!(
            err.message(),
            "cannot convert return value to text (got integer)"
        );

        let err = song_text(Value::Nil).unwrap_err();
        assert!(err.message().contains("got nil"));
    }

    #[test]
    fn test_song_text_rejects_invalid_utf8() {
        let lua = Lua::new();
        let s = lua.create_string(b"\xFF\xFE").unwrap();
        let err = song_text(Value::String(s)).unwrap_err();
        assert!(err.message().contains("invalid UTF-8"));
    }

    #[test]
    fn test_syntax_error_diagnostic_is_one_line() {
        let lua = Lua::new();
        let err = match lua.load("local = 1").set_name("=t").into_function() {
            Ok(_) => panic!("expected a syntax error"),
            Err(e) => e,
        };
        let msg = diagnostic(&err);
        assert!(!msg.contains('\n'));
        assert!(msg.starts_with("t:1:"), "unexpected diagnostic: {}", msg);
    }
}
