// SPDX-License-Identifier: MIT

//! Production `ToolAdapter` over a real pseudo-terminal, via `portable-pty`.
//!
//! The PTY reader is blocking, so it lives on its own OS thread; bytes
//! cross to the async caller over a `tokio::sync::mpsc` channel. This
//! keeps the rest of the session runner's main loop on a single-threaded
//! tokio runtime while still honoring the "one quantum of blocking" bound
//! on PTY reads.

use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tokio::sync::mpsc;

use super::{ToolAdapter, ToolError};

const READ_CHUNK_SIZE: usize = 4096;

pub struct PtyAdapter {
    inner: Mutex<Option<Inner>>,
}

struct Inner {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn std::io::Write + Send>,
    child: Box<dyn Child + Send + Sync>,
    rx: mpsc::Receiver<std::io::Result<Vec<u8>>>,
}

impl Default for PtyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PtyAdapter {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ToolAdapter for PtyAdapter {
    async fn spawn(&self, argv: &[String], cwd: &Path) -> Result<(), ToolError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ToolError::Spawn("empty argv".to_string()))?;

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: 50,
                cols: 200,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| ToolError::Spawn(e.to_string()))?;

        let mut cmd = CommandBuilder::new(program);
        cmd.args(args);
        cmd.cwd(cwd);

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ToolError::Spawn(e.to_string()))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| ToolError::Spawn(e.to_string()))?;
        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| ToolError::Spawn(e.to_string()))?;

        let (tx, rx) = mpsc::channel(64);
        std::thread::spawn(move || {
            let mut buf = [0u8; READ_CHUNK_SIZE];
            loop {
                let outcome = reader.read(&mut buf);
                let send_result = match &outcome {
                    Ok(0) => tx.blocking_send(Ok(Vec::new())),
                    Ok(n) => tx.blocking_send(Ok(buf[..*n].to_vec())),
                    Err(e) => tx.blocking_send(Err(std::io::Error::new(e.kind(), e.to_string()))),
                };
                if send_result.is_err() || matches!(outcome, Ok(0) | Err(_)) {
                    break;
                }
            }
        });

        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Inner {
            master: pair.master,
            writer,
            child,
            rx,
        });
        Ok(())
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), ToolError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = guard.as_mut().ok_or(ToolError::NotAlive)?;
        inner
            .writer
            .write_all(bytes)
            .map_err(|e| ToolError::Write(e.to_string()))?;
        inner.writer.flush().map_err(|e| ToolError::Write(e.to_string()))
    }

    async fn read_chunk(&self) -> Result<Option<Vec<u8>>, ToolError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = guard.as_mut().ok_or(ToolError::NotAlive)?;
        // Non-blocking: the runner's own poll quantum governs call frequency.
        match inner.rx.try_recv() {
            Ok(Ok(chunk)) if chunk.is_empty() => Ok(None),
            Ok(Ok(chunk)) => Ok(Some(chunk)),
            Ok(Err(e)) => Err(ToolError::Read(e.to_string())),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Ok(None),
        }
    }

    async fn send_signal_byte(&self, byte: u8) -> Result<(), ToolError> {
        self.write(&[byte]).await
    }

    async fn terminate(&self) -> Result<(), ToolError> {
        let pid = {
            let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            guard.as_ref().and_then(|i| i.child.process_id())
        };
        #[cfg(unix)]
        if let Some(pid) = pid {
            let pgid = nix::unistd::Pid::from_raw(-(pid as i32));
            let _ = nix::sys::signal::kill(pgid, nix::sys::signal::Signal::SIGTERM);
        }
        #[cfg(not(unix))]
        let _ = pid;
        Ok(())
    }

    async fn kill(&self) -> Result<(), ToolError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = guard.as_mut().ok_or(ToolError::NotAlive)?;
        inner.child.kill().map_err(|e| ToolError::Write(e.to_string()))
    }

    async fn is_alive(&self) -> Result<bool, ToolError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = guard.as_mut().ok_or(ToolError::NotAlive)?;
        match inner.child.try_wait() {
            Ok(None) => Ok(true),
            Ok(Some(_)) => Ok(false),
            Err(e) => Err(ToolError::Read(e.to_string())),
        }
    }
}
