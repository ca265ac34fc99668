//! procsup - supervisor for detached helper processes
//!
//! Each launch creates an output sink, spawns one external command in its own
//! process group with stdout and stderr pointed at the sink file, and attaches
//! a watcher. When the process exits or is killed by a signal, the watcher
//! runs the registered callbacks exactly once and then releases the sink.
//!
//! # Example
//!
//! ```ignore
//! use procsup::{Supervisor, SupervisorConfig};
//!
//! let supervisor = Supervisor::new(SupervisorConfig::default());
//! let handle = supervisor.launch_with("make -k", |h, state| {
//!     println!("{} finished: {}", h.command(), state);
//!     print!("{}", h.read_output().unwrap_or_default());
//! })?;
//! handle.wait().await;
//! ```

mod command;
mod error;
mod sink;
mod state;
mod supervisor;

pub use command::split_command;
pub use error::SupervisorError;
pub use sink::OutputSink;
pub use state::{ProcessState, signal_name};
pub use supervisor::{ProcessHandle, Supervisor, SupervisorConfig, TerminalCallback};
