//! Supervised process lifecycle states

use std::fmt;
use std::process::ExitStatus;

use serde::Serialize;
use tracing::debug;

/// Lifecycle state of a supervised process
///
/// `Pending -> Running -> {Exited, Signaled}`. The terminal states are sinks:
/// once reached, no further transition is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ProcessState {
    /// Launch requested, process not yet started
    Pending,
    /// Process is running
    Running,
    /// Process exited normally with the given code
    Exited { code: i32 },
    /// Process was terminated by a signal
    Signaled { signal: i32 },
}

impl ProcessState {
    /// Whether no further transition can happen from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited { .. } | Self::Signaled { .. })
    }

    /// Map a wait status onto a terminal state
    pub fn from_exit_status(status: ExitStatus) -> Self {
        debug!(?status, "ProcessState::from_exit_status: called");
        if let Some(code) = status.code() {
            return Self::Exited { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled { signal };
            }
        }

        // Neither a code nor a signal; treat like a failed exit
        Self::Exited { code: -1 }
    }

    /// Whether a transition from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: &ProcessState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Running) => true,
            (Self::Pending | Self::Running, n) if n.is_terminal() => true,
            _ => false,
        }
    }
}

/// Human-readable signal name, e.g. `SIGTERM`
pub fn signal_name(signal: i32) -> String {
    #[cfg(unix)]
    {
        if let Ok(sig) = nix::sys::signal::Signal::try_from(signal) {
            return sig.as_str().to_string();
        }
    }
    format!("signal {}", signal)
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Exited { code } => write!(f, "exited ({})", code),
            Self::Signaled { signal } => write!(f, "signaled ({})", signal_name(*signal)),
        }
    }
}
