// error.rs — Error types for spawning and waiting on commands.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    /// The command (or working directory) contains an interior NUL byte.
    #[error("cannot pass '{0}' to the shell: contains a NUL byte")]
    InvalidArgument(String),

    /// Allocating the pseudo-terminal failed.
    #[error("cannot open a pseudo-terminal: {0}")]
    OpenPty(std::io::Error),

    /// fork() failed.
    #[error("cannot spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// waitpid() failed.
    #[error("cannot wait for child {pid}: {source}")]
    Wait { pid: i32, source: std::io::Error },
}
