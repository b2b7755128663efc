//! CLI-boundary error type for the `ember` binary.
//!
//! The compiler and VM report failures through `InterpretResult`
//! (spec.md §6), which is specific to the embedding convention of this
//! engine; this module only wraps the failures the command-line driver
//! itself can hit (file I/O, a script that didn't compile or run clean).

use thiserror::Error;

/// Top-level error for the `ember` binary.
#[derive(Error, Debug)]
pub enum EmberError {
    /// Couldn't read the script file.
    #[error("couldn't read script '{path}': {source}")]
    ReadScript {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error unrelated to a specific script path (REPL stdin/stdout).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The script failed to compile (spec.md §6: `COMPILE_ERROR`).
    #[error("compilation failed")]
    CompileError,

    /// The script compiled but raised an error at runtime (spec.md §6:
    /// `RUNTIME_ERROR`).
    #[error("runtime error")]
    RuntimeError,
}

/// Result type alias using `EmberError`.
pub type Result<T> = std::result::Result<T, EmberError>;
