//! Process supervisor
//!
//! Launches detached helper processes, binds each to its own output sink, and
//! watches for the terminal state. The first terminal observation runs the
//! registered callbacks and then releases the sink; every later observation
//! is a no-op.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::SupervisorError;
use crate::command::split_command;
use crate::sink::OutputSink;
use crate::state::ProcessState;

/// Callback invoked once when a process reaches a terminal state
pub type TerminalCallback = Box<dyn FnOnce(&ProcessHandle, &ProcessState) + Send + 'static>;

/// Supervisor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Directory where output sinks are created (default: `$TMPDIR/procsup`)
    #[serde(rename = "sink-dir")]
    pub sink_dir: Option<PathBuf>,
}

impl SupervisorConfig {
    /// Create config with sinks placed in `dir`
    pub fn with_sink_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            sink_dir: Some(dir.into()),
        }
    }
}

/// Launches and tracks supervised processes
#[derive(Debug, Clone)]
pub struct Supervisor {
    sink_dir: PathBuf,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}

impl Supervisor {
    /// Create a supervisor from configuration
    pub fn new(config: SupervisorConfig) -> Self {
        debug!(?config, "Supervisor::new: called");
        let sink_dir = config
            .sink_dir
            .unwrap_or_else(|| std::env::temp_dir().join("procsup"));
        Self { sink_dir }
    }

    /// Directory holding live output sinks
    pub fn sink_dir(&self) -> &Path {
        &self.sink_dir
    }

    /// Launch `command` without a terminal callback
    ///
    /// Returns as soon as the process has been spawned. Must be called from
    /// within a Tokio runtime.
    pub fn launch(&self, command: &str) -> Result<ProcessHandle, SupervisorError> {
        debug!(%command, "Supervisor::launch: called");
        self.spawn(command, Vec::new())
    }

    /// Launch `command` with a terminal callback attached before the watcher starts
    pub fn launch_with<F>(&self, command: &str, callback: F) -> Result<ProcessHandle, SupervisorError>
    where
        F: FnOnce(&ProcessHandle, &ProcessState) + Send + 'static,
    {
        debug!(%command, "Supervisor::launch_with: called");
        self.spawn(command, vec![Box::new(callback)])
    }

    fn spawn(&self, command: &str, callbacks: Vec<TerminalCallback>) -> Result<ProcessHandle, SupervisorError> {
        tokio::runtime::Handle::try_current().map_err(|_| SupervisorError::NoRuntime)?;

        let argv = split_command(command)?;
        let program = &argv[0];
        debug!(%program, args = ?&argv[1..], "Supervisor::spawn: parsed command");

        std::fs::create_dir_all(&self.sink_dir)?;

        // The child writes straight into the sink file; no task of ours sits in between
        let sink = OutputSink::create(&self.sink_dir, program)?;
        let writers = sink.writer().and_then(|out| Ok((out, sink.writer()?)));
        let (stdout, stderr) = match writers {
            Ok(writers) => writers,
            Err(e) => {
                sink.release();
                return Err(e);
            }
        };

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(false);

        // Own process group, so terminal signals aimed at us do not reach the child
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                debug!(%command, error = %source, "Supervisor::spawn: spawn failed");
                sink.release();
                return Err(SupervisorError::SpawnFailed {
                    command: command.to_string(),
                    source,
                });
            }
        };
        drop(cmd);

        let handle = ProcessHandle::pending(command, callbacks);
        handle.bind(child.id(), sink);
        info!(id = %handle.id(), pid = ?handle.pid(), %command, "Process launched");

        let watched = handle.clone();
        tokio::spawn(async move {
            let status = child.wait().await;
            debug!(id = %watched.id(), ?status, "Supervisor watcher: child finished");

            let state = match status {
                Ok(status) => ProcessState::from_exit_status(status),
                Err(e) => {
                    warn!(id = %watched.id(), error = %e, "Failed to wait for child");
                    ProcessState::Exited { code: -1 }
                }
            };
            watched.settle(state);
        });

        Ok(handle)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

struct Inner {
    state: ProcessState,
    pid: Option<u32>,
    sink: Option<OutputSink>,
    callbacks: Vec<TerminalCallback>,
}

struct Shared {
    id: Uuid,
    command: String,
    started_at: DateTime<Utc>,
    inner: Mutex<Inner>,
    settled: watch::Sender<bool>,
}

/// Handle to a supervised process
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct ProcessHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ProcessHandle")
            .field("id", &self.shared.id)
            .field("command", &self.shared.command)
            .field("pid", &inner.pid)
            .field("state", &inner.state)
            .field("sink", &inner.sink.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl ProcessHandle {
    fn pending(command: &str, callbacks: Vec<TerminalCallback>) -> Self {
        let (settled, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                id: Uuid::now_v7(),
                command: command.to_string(),
                started_at: Utc::now(),
                inner: Mutex::new(Inner {
                    state: ProcessState::Pending,
                    pid: None,
                    sink: None,
                    callbacks,
                }),
                settled,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the spawned child and its sink: `Pending -> Running`
    fn bind(&self, pid: Option<u32>, sink: OutputSink) {
        let mut inner = self.lock();
        inner.pid = pid;
        inner.sink = Some(sink);
        if inner.state.can_transition_to(&ProcessState::Running) {
            inner.state = ProcessState::Running;
        }
    }

    /// Unique id of this launch
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// The command string as given to `launch`
    pub fn command(&self) -> &str {
        &self.shared.command
    }

    /// When the launch was requested
    pub fn started_at(&self) -> DateTime<Utc> {
        self.shared.started_at
    }

    /// OS process id, once spawned
    pub fn pid(&self) -> Option<u32> {
        self.lock().pid
    }

    /// Current state; never fires callbacks
    pub fn poll(&self) -> ProcessState {
        self.lock().state
    }

    /// Whether the output sink is still held
    pub fn has_sink(&self) -> bool {
        self.lock().sink.is_some()
    }

    /// Path of the output sink, if it has not been released
    pub fn sink_path(&self) -> Option<PathBuf> {
        self.lock().sink.as_ref().map(|s| s.path().to_path_buf())
    }

    /// Everything the process has written so far
    pub fn read_output(&self) -> Result<String, SupervisorError> {
        let inner = self.lock();
        match inner.sink.as_ref() {
            Some(sink) => sink.contents(),
            None => Err(SupervisorError::SinkReleased {
                id: self.shared.id.to_string(),
            }),
        }
    }

    /// Register a callback for the terminal transition
    ///
    /// If the process is already terminal the callback runs immediately; the
    /// sink may have been released by then.
    pub fn on_terminal<F>(&self, callback: F)
    where
        F: FnOnce(&ProcessHandle, &ProcessState) + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            let state = inner.state;
            drop(inner);
            debug!(id = %self.shared.id, %state, "ProcessHandle::on_terminal: already terminal, running now");
            self.run_callback(Box::new(callback), &state);
        } else {
            inner.callbacks.push(Box::new(callback));
        }
    }

    /// Release the output sink
    ///
    /// Returns `false` if the sink was already released.
    pub fn release(&self) -> bool {
        let sink = self.lock().sink.take();
        match sink {
            Some(sink) => {
                debug!(id = %self.shared.id, sink = %sink.name(), "ProcessHandle::release: releasing sink");
                sink.release();
                true
            }
            None => {
                debug!(id = %self.shared.id, "ProcessHandle::release: already released");
                false
            }
        }
    }

    /// Apply a terminal observation
    ///
    /// Only the first terminal observation wins: it runs the callbacks, then
    /// releases the sink. Returns whether this call performed the transition.
    pub(crate) fn settle(&self, terminal: ProcessState) -> bool {
        let callbacks = {
            let mut inner = self.lock();
            if !inner.state.can_transition_to(&terminal) {
                debug!(id = %self.shared.id, current = %inner.state, "ProcessHandle::settle: ignoring repeat observation");
                return false;
            }
            inner.state = terminal;
            std::mem::take(&mut inner.callbacks)
        };

        info!(id = %self.shared.id, command = %self.shared.command, state = %terminal, "Process reached terminal state");
        for callback in callbacks {
            self.run_callback(callback, &terminal);
        }
        self.release();
        self.shared.settled.send_replace(true);
        true
    }

    /// Run one callback, containing any panic so release still happens
    fn run_callback(&self, callback: TerminalCallback, state: &ProcessState) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(self, state))) {
            warn!(
                id = %self.shared.id,
                panic = %panic_message(&*payload),
                "Terminal callback panicked"
            );
        }
    }

    /// Wait until the terminal transition, callbacks and release are complete
    pub async fn wait(&self) -> ProcessState {
        let mut rx = self.shared.settled.subscribe();
        let _ = rx.wait_for(|settled| *settled).await;
        self.poll()
    }
}
