//! End-to-end tests for the process supervisor
//!
//! These spawn real processes and verify the terminal-state contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use procsup::{ProcessState, Supervisor, SupervisorConfig, SupervisorError};
use tempfile::TempDir;

fn supervisor(dir: &TempDir) -> Supervisor {
    Supervisor::new(SupervisorConfig::with_sink_dir(dir.path()))
}

fn sink_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).map(|entries| entries.count()).unwrap_or(0)
}

async fn wait_until_running(handle: &procsup::ProcessHandle) {
    for _ in 0..50 {
        if handle.poll() == ProcessState::Running {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// =============================================================================
// Spawn failures
// =============================================================================

#[tokio::test]
async fn test_missing_binary_fails_without_sink() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);

    let result = sup.launch("nonexistent-binary");

    match result {
        Err(SupervisorError::SpawnFailed { command, .. }) => assert_eq!(command, "nonexistent-binary"),
        other => panic!("expected SpawnFailed, got {:?}", other),
    }
    assert_eq!(sink_files(&temp), 0, "no output sink may be allocated");
}

#[tokio::test]
async fn test_unbalanced_quote_fails_before_spawn() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);

    let result = sup.launch("echo \"unterminated");

    assert!(matches!(result, Err(SupervisorError::UnbalancedQuote { .. })));
    assert_eq!(sink_files(&temp), 0);
}

// =============================================================================
// Terminal callback contract
// =============================================================================

#[tokio::test]
async fn test_callback_fires_once_under_repeated_polling() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);
    let fired = Arc::new(AtomicUsize::new(0));

    let counter = fired.clone();
    let handle = sup
        .launch_with("sh -c 'sleep 0.1'", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("launch should succeed");

    for _ in 0..20 {
        let _ = handle.poll();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let state = handle.wait().await;
    for _ in 0..20 {
        assert_eq!(handle.poll(), state);
    }

    assert_eq!(state, ProcessState::Exited { code: 0 });
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_manual_release_then_watcher_is_noop() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);

    let handle = sup.launch("sh -c 'sleep 0.2'").expect("launch should succeed");
    wait_until_running(&handle).await;

    assert!(handle.release(), "first release frees the sink");
    assert!(!handle.release(), "second release is a no-op");
    assert_eq!(sink_files(&temp), 0);

    // Watcher still settles cleanly with nothing left to release
    assert_eq!(handle.wait().await, ProcessState::Exited { code: 0 });
    assert!(!handle.release());
}

#[tokio::test]
async fn test_callback_sees_output_before_release() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);
    let captured = Arc::new(Mutex::new(String::new()));

    let sink = captured.clone();
    let handle = sup
        .launch_with("sh -c 'echo out; echo err >&2'", move |h, _| {
            *sink.lock().unwrap() = h.read_output().unwrap_or_default();
        })
        .expect("launch should succeed");
    handle.wait().await;

    let output = captured.lock().unwrap().clone();
    assert!(output.contains("out"));
    assert!(output.contains("err"));
    assert_eq!(sink_files(&temp), 0, "sink released after the callback");
}

#[tokio::test]
async fn test_late_registration_runs_immediately() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);

    let handle = sup.launch("true").expect("launch should succeed");
    handle.wait().await;

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    handle.on_terminal(move |_, state| {
        assert!(state.is_terminal());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_signal_termination_uses_same_path() {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);
    let fired = Arc::new(AtomicUsize::new(0));

    let counter = fired.clone();
    let handle = sup
        .launch_with("sleep 30", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("launch should succeed");
    wait_until_running(&handle).await;

    let pid = handle.pid().expect("running process has a pid");
    kill(Pid::from_raw(pid as i32), Signal::SIGTERM).expect("Failed to send SIGTERM");

    let state = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("process should terminate");
    assert_eq!(state, ProcessState::Signaled { signal: Signal::SIGTERM as i32 });
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(sink_files(&temp), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_child_runs_in_own_process_group() {
    use nix::unistd::{Pid, getpgid};

    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);

    let handle = sup.launch("sleep 1").expect("launch should succeed");
    let pid = Pid::from_raw(handle.pid().expect("pid") as i32);

    let group = getpgid(Some(pid)).expect("Failed to read process group");
    assert_eq!(group, pid);
    assert_ne!(group, getpgid(None).expect("Failed to read own process group"));

    handle.wait().await;
}

#[tokio::test]
async fn test_panicking_callback_still_settles_and_releases() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);

    let handle = sup
        .launch_with("true", |_, _| panic!("callback failure"))
        .expect("launch should succeed");

    let state = tokio::time::timeout(Duration::from_secs(3), handle.wait())
        .await
        .expect("wait should return after a panicking callback");
    assert_eq!(state, ProcessState::Exited { code: 0 });
    assert!(!handle.has_sink());
    assert_eq!(sink_files(&temp), 0);
}

// =============================================================================
// Independence
// =============================================================================

#[tokio::test]
async fn test_concurrent_launches_are_independent() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let sup = supervisor(&temp);
    let outputs = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for i in 0..5 {
        let outputs = outputs.clone();
        let handle = sup
            .launch_with(&format!("echo job-{}", i), move |h, _| {
                outputs.lock().unwrap().push(h.read_output().unwrap_or_default());
            })
            .expect("launch should succeed");
        handles.push(handle);
    }
    for handle in &handles {
        assert_eq!(handle.wait().await, ProcessState::Exited { code: 0 });
    }

    let mut outputs = outputs.lock().unwrap().clone();
    outputs.sort();
    assert_eq!(outputs, vec!["job-0\n", "job-1\n", "job-2\n", "job-3\n", "job-4\n"]);
    assert_eq!(sink_files(&temp), 0);
}

#[test]
fn test_child_outlives_runtime() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let scratch = TempDir::new().expect("Failed to create temp dir");
    let marker = scratch.path().join("done");
    let sup = supervisor(&temp);

    let rt = tokio::runtime::Runtime::new().expect("Failed to build runtime");
    let handle = rt
        .block_on(async { sup.launch(&format!("sh -c 'sleep 1; echo line; touch {}'", marker.display())) })
        .expect("launch should succeed");
    drop(rt);

    std::thread::sleep(Duration::from_secs(3));

    assert!(marker.exists(), "child must finish after the runtime is gone");
    assert!(handle.read_output().expect("sink still held").contains("line"));
}
