//! Bounded child-process execution for session probes.
//!
//! Probes run on every poll cycle, so each call gets a hard deadline and a cap
//! on how much output is kept. A hung multiplexer must not stall the watcher.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Captured output of a probe command.
#[derive(Debug)]
pub struct ProbeOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProbeOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.success()
    }
}

/// Run `cmd` with no stdin, killing it after `timeout`.
///
/// Both pipes are drained on reader threads; bytes past `output_limit_bytes`
/// are discarded.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_probe(
    mut cmd: Command,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<ProbeOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().context("spawn probe command")?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let stdout_reader = spawn_reader(stdout, output_limit_bytes);
    let stderr_reader = spawn_reader(stderr, output_limit_bytes);

    let (status, timed_out) = match child.wait_timeout(timeout).context("wait for probe")? {
        Some(status) => (status, false),
        None => {
            warn!(timeout_secs = timeout.as_secs(), "probe timed out, killing");
            child.kill().context("kill probe")?;
            (child.wait().context("wait probe after kill")?, true)
        }
    };

    let stdout = join_reader(stdout_reader).context("join stdout")?;
    let stderr = join_reader(stderr_reader).context("join stderr")?;
    debug!(exit_code = ?status.code(), timed_out, "probe finished");
    Ok(ProbeOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(reader: R, limit: usize) -> JoinHandle<Result<String>> {
    thread::spawn(move || read_limited(reader, limit))
}

fn join_reader(handle: JoinHandle<Result<String>>) -> Result<String> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader thread panicked"))?
}

fn read_limited<R: Read>(mut reader: R, limit: usize) -> Result<String> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = reader.read(&mut chunk).context("read probe output")?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
    Ok(String::from_utf8_lossy(&kept).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_status() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf 'hello'; exit 3"]);
        let out = run_probe(cmd, Duration::from_secs(5), 1024).expect("run");
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.status.code(), Some(3));
        assert!(!out.success());
    }

    #[test]
    fn truncates_output_to_limit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf 'abcdefghij'"]);
        let out = run_probe(cmd, Duration::from_secs(5), 4).expect("run");
        assert_eq!(out.stdout, "abcd");
        assert!(out.success());
    }

    #[test]
    fn kills_on_timeout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exec sleep 5"]);
        let out = run_probe(cmd, Duration::from_millis(100), 1024).expect("run");
        assert!(out.timed_out);
        assert!(!out.success());
    }
}
