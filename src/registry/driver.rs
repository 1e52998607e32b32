//! The Runtime Driver: an external container runtime, abstracted behind a
//! trait so the core stays testable without a real Docker daemon (§4.7).
//!
//! The original shells out to `docker -H tcp://<host>:2377 {run|update|kill
//! |inspect} ...`. `run` backs `/host/reschedule`, `update` backs the cut
//! path in `/host/updatetask`. `kill`/`inspect` are named by the §6
//! contract even though the distilled handler set never calls them
//! directly from the core — the trait carries them so the same
//! abstraction can back a future termination-confirmation path.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// A container the driver is asked to start.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub image: String,
    pub cpu_shares: i64,
    pub memory_bytes: i64,
    pub task_class: String,
    pub task_type: String,
}

/// Outcome of an invocation: the runtime's stdout/stderr, captured for
/// logging. A failed invocation is logged by the caller and never unwinds
/// state mutations already applied alongside it (§7) — `RuntimeDriver`
/// returns a plain `String` rather than [`crate::registry::error::RegistryError`]
/// because a driver failure is never the reason an operation handler itself
/// fails; `RegistryError::RuntimeDriver` exists for callers that do want to
/// surface a driver failure as the handler's own error.
#[derive(Debug, Clone, Default)]
pub struct DriverOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Abstraction over the external container runtime (§4.7, §6).
#[async_trait]
pub trait RuntimeDriver: Send + Sync {
    /// Start a new container for a rescheduled task.
    async fn run(&self, spec: RunSpec) -> Result<DriverOutput, String>;

    /// Resize a running task's cpu/memory allocation (the "cut" path).
    async fn update(&self, task_id: &str, cpu_shares: i64, memory_bytes: i64) -> Result<DriverOutput, String>;

    /// Terminate a running task.
    async fn kill(&self, task_id: &str) -> Result<DriverOutput, String>;

    /// Inspect a running task's current runtime-reported state.
    async fn inspect(&self, task_id: &str) -> Result<DriverOutput, String>;
}

/// Production adapter: shells out to a configurable binary (default
/// `docker`) talking to a configurable remote daemon endpoint.
pub struct ProcessRuntimeDriver {
    binary: String,
    endpoint: String,
}

impl ProcessRuntimeDriver {
    pub fn new(binary: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            endpoint: endpoint.into(),
        }
    }

    async fn run_command(&self, args: Vec<String>) -> Result<DriverOutput, String> {
        let output = Command::new(&self.binary)
            .arg("-H")
            .arg(&self.endpoint)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| format!("failed to spawn {}: {e}", self.binary))?;

        let result = DriverOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if output.status.success() {
            Ok(result)
        } else {
            Err(format!(
                "{} exited with {}: {}",
                self.binary, output.status, result.stderr
            ))
        }
    }
}

#[async_trait]
impl RuntimeDriver for ProcessRuntimeDriver {
    async fn run(&self, spec: RunSpec) -> Result<DriverOutput, String> {
        self.run_command(vec![
            "run".into(),
            "-itd".into(),
            "-c".into(),
            spec.cpu_shares.to_string(),
            "-m".into(),
            spec.memory_bytes.to_string(),
            "-e".into(),
            format!("affinity:requestclass=={}", spec.task_class),
            "-e".into(),
            format!("affinity:requesttype=={}", spec.task_type),
            "-e".into(),
            "affinity:rescheduled==yes".into(),
            spec.image,
        ])
        .await
    }

    async fn update(&self, task_id: &str, cpu_shares: i64, memory_bytes: i64) -> Result<DriverOutput, String> {
        self.run_command(vec![
            "update".into(),
            "-m".into(),
            memory_bytes.to_string(),
            "-c".into(),
            cpu_shares.to_string(),
            task_id.to_string(),
        ])
        .await
    }

    async fn kill(&self, task_id: &str) -> Result<DriverOutput, String> {
        self.run_command(vec!["kill".into(), task_id.to_string()]).await
    }

    async fn inspect(&self, task_id: &str) -> Result<DriverOutput, String> {
        self.run_command(vec!["inspect".into(), task_id.to_string()]).await
    }
}

/// Test double recording every invocation it receives, for use in unit
/// and integration tests that exercise handlers driving the runtime.
#[derive(Default)]
pub struct MockRuntimeDriver {
    pub calls: parking_lot::Mutex<Vec<String>>,
}

#[async_trait]
impl RuntimeDriver for MockRuntimeDriver {
    async fn run(&self, spec: RunSpec) -> Result<DriverOutput, String> {
        self.calls.lock().push(format!("run:{}", spec.image));
        Ok(DriverOutput::default())
    }

    async fn update(&self, task_id: &str, cpu_shares: i64, memory_bytes: i64) -> Result<DriverOutput, String> {
        self.calls
            .lock()
            .push(format!("update:{task_id}:{cpu_shares}:{memory_bytes}"));
        Ok(DriverOutput::default())
    }

    async fn kill(&self, task_id: &str) -> Result<DriverOutput, String> {
        self.calls.lock().push(format!("kill:{task_id}"));
        Ok(DriverOutput::default())
    }

    async fn inspect(&self, task_id: &str) -> Result<DriverOutput, String> {
        self.calls.lock().push(format!("inspect:{task_id}"));
        Ok(DriverOutput::default())
    }
}
