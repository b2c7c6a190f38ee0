//! Worker subprocess transport.
//!
//! Launches the worker with piped stdin/stdout and hands the two ends
//! to the session, which treats them as an opaque duplex byte channel.
//! Stderr is inherited so worker diagnostics reach the terminal.

use std::io::{self, BufReader};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

#[derive(Debug)]
pub struct WorkerLink {
    child: Child,
}

impl WorkerLink {
    pub fn spawn(command: &str, args: &[String]) -> io::Result<Self> {
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                io::Error::new(e.kind(), format!("failed to spawn worker {command:?}: {e}"))
            })?;
        Ok(Self { child })
    }

    /// Take the worker's stdio handles: its stdout is our inbound
    /// stream, its stdin our outbound one. Callable once.
    pub fn split(&mut self) -> io::Result<(BufReader<ChildStdout>, ChildStdin)> {
        let stdout = self.child.stdout.take().ok_or_else(stdio_taken)?;
        let stdin = self.child.stdin.take().ok_or_else(stdio_taken)?;
        Ok((BufReader::new(stdout), stdin))
    }

    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }
}

fn stdio_taken() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "worker stdio already taken")
}

impl Drop for WorkerLink {
    /// Best-effort kill so no worker outlives its session.
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
