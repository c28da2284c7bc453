//! Tool Execution Subsystem
//!
//! Reconstructs a command line from structured arguments (`argv`) and runs
//! it as a bounded subprocess (`executor`). Commands are always spawned in
//! vector form, never through a shell, which eliminates shell-metacharacter
//! injection at this layer; content-level sanitization of argument values
//! is deliberately not performed (the calling agent is trusted).

pub mod argv;
pub mod executor;

pub use argv::build_argv;
pub use executor::{ExecutionError, ExecutionResult, ToolExecutor};
