//! In-memory test doubles for the transport and file-transfer channel.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWrite;

use crate::sftp::path_utils::trim_remote_path;
use crate::sftp::{FileTransferChannel, RemoteWriter, SftpError};
use crate::ssh::SshError;
use crate::transfer::{ProgressFactory, ProgressObserver, TransferJob, Transport, TransportSession};

/// Operation recorded by [`MemoryFs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Connect,
    OpenChannel,
    ListDir(String),
    CreateDir(String),
    CreateFile(String),
    CloseChannel,
    Disconnect,
}

#[derive(Default)]
struct MemoryState {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    ops: Vec<Op>,
    fail_list: HashSet<String>,
    fail_create_dir: HashSet<String>,
    fail_connect: HashSet<usize>,
    connects: usize,
    write_limit: Option<usize>,
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

fn leaf_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Shared in-memory remote filesystem
#[derive(Clone, Default)]
pub struct MemoryFs {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFs {
    pub fn with_dirs(dirs: &[&str]) -> Self {
        let fs = Self::default();
        {
            let mut state = fs.state.lock();
            state.dirs.insert("/".to_string());
            for dir in dirs {
                state.dirs.insert(trim_remote_path(dir).to_string());
            }
        }
        fs
    }

    pub fn put_file(&self, path: &str, data: &[u8]) {
        self.state.lock().files.insert(path.to_string(), data.to_vec());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.state.lock().dirs.contains(path)
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.lock().ops.clear();
    }

    /// Fail the next listing of `path`
    pub fn fail_list_once(&self, path: &str) {
        self.state.lock().fail_list.insert(path.to_string());
    }

    pub fn fail_create_dir(&self, path: &str) {
        self.state.lock().fail_create_dir.insert(path.to_string());
    }

    /// Fail any remote write that would take a file past `bytes`
    pub fn fail_writes_after(&self, bytes: usize) {
        self.state.lock().write_limit = Some(bytes);
    }

    /// Fail the n-th (0-based) connection attempt
    pub fn fail_connect(&self, attempt: usize) {
        self.state.lock().fail_connect.insert(attempt);
    }

    fn record(&self, op: Op) {
        self.state.lock().ops.push(op);
    }
}

#[async_trait]
impl FileTransferChannel for MemoryFs {
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, SftpError> {
        let path = trim_remote_path(path).to_string();
        self.record(Op::ListDir(path.clone()));

        let mut state = self.state.lock();
        if state.fail_list.remove(&path) {
            return Err(SftpError::PermissionDenied(path));
        }
        if !state.dirs.contains(&path) {
            return Err(SftpError::FileNotFound(path));
        }

        let dirs = state.dirs.iter().filter(|d| d.as_str() != "/");
        let files = state.files.keys();
        Ok(dirs
            .chain(files)
            .filter(|entry| parent_of(entry) == path)
            .map(|entry| leaf_of(entry).to_string())
            .collect())
    }

    async fn create_dir(&self, path: &str) -> Result<(), SftpError> {
        let path = trim_remote_path(path).to_string();
        self.record(Op::CreateDir(path.clone()));

        let mut state = self.state.lock();
        if state.fail_create_dir.contains(&path) {
            return Err(SftpError::PermissionDenied(path));
        }
        if !state.dirs.contains(&parent_of(&path)) {
            return Err(SftpError::FileNotFound(path));
        }
        if !state.dirs.insert(path.clone()) {
            return Err(SftpError::ProtocolError(format!("{}: already exists", path)));
        }
        Ok(())
    }

    async fn create_file(&self, path: &str) -> Result<RemoteWriter, SftpError> {
        self.record(Op::CreateFile(path.to_string()));

        let mut state = self.state.lock();
        if !state.dirs.contains(&parent_of(path)) {
            return Err(SftpError::FileNotFound(path.to_string()));
        }
        state.files.insert(path.to_string(), Vec::new());
        Ok(Box::new(MemoryWriter {
            fs: self.clone(),
            path: path.to_string(),
            written: 0,
        }))
    }

    async fn close(&self) -> Result<(), SftpError> {
        self.record(Op::CloseChannel);
        Ok(())
    }
}

struct MemoryWriter {
    fs: MemoryFs,
    path: String,
    written: usize,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let this = self.get_mut();
        let mut state = this.fs.state.lock();
        if let Some(limit) = state.write_limit {
            if this.written + buf.len() > limit {
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "link dropped",
                )));
            }
        }
        state
            .files
            .entry(this.path.clone())
            .or_default()
            .extend_from_slice(buf);
        this.written += buf.len();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Transport handing out sessions over one shared [`MemoryFs`]
pub struct MemoryTransport {
    pub fs: MemoryFs,
}

impl MemoryTransport {
    pub fn new(fs: MemoryFs) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&self) -> Result<Box<dyn TransportSession>, SshError> {
        self.fs.record(Op::Connect);
        let attempt = {
            let mut state = self.fs.state.lock();
            state.connects += 1;
            state.connects - 1
        };
        if self.fs.state.lock().fail_connect.contains(&attempt) {
            return Err(SshError::ConnectionFailed("connection refused".to_string()));
        }
        Ok(Box::new(MemorySession {
            fs: self.fs.clone(),
        }))
    }
}

struct MemorySession {
    fs: MemoryFs,
}

#[async_trait]
impl TransportSession for MemorySession {
    async fn open_channel(&self) -> Result<Box<dyn FileTransferChannel>, SftpError> {
        self.fs.record(Op::OpenChannel);
        Ok(Box::new(self.fs.clone()))
    }

    async fn disconnect(&self) -> Result<(), SshError> {
        self.fs.record(Op::Disconnect);
        Ok(())
    }
}

/// Progress events captured by [`RecordingProgress`]
#[derive(Clone, Default)]
pub struct ProgressLog {
    inner: Arc<Mutex<Vec<(String, Vec<(u64, u64)>, bool)>>>,
}

impl ProgressLog {
    /// Reports received for the upload of `file_name`
    pub fn reports(&self, file_name: &str) -> Vec<(u64, u64)> {
        self.inner
            .lock()
            .iter()
            .find(|(name, _, _)| name == file_name)
            .map(|(_, reports, _)| reports.clone())
            .unwrap_or_default()
    }

    pub fn finished(&self, file_name: &str) -> bool {
        self.inner
            .lock()
            .iter()
            .any(|(name, _, finished)| name == file_name && *finished)
    }
}

/// Observer that records every report
pub struct RecordingProgress {
    pub reports: Vec<(u64, u64)>,
    pub finished: bool,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
            finished: false,
        }
    }
}

impl ProgressObserver for RecordingProgress {
    fn on_progress(&mut self, transferred: u64, total: u64) {
        self.reports.push((transferred, total));
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

/// Factory whose observers write into a shared [`ProgressLog`]
#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub log: ProgressLog,
}

struct LoggedObserver {
    log: ProgressLog,
    slot: usize,
}

impl ProgressObserver for LoggedObserver {
    fn on_progress(&mut self, transferred: u64, total: u64) {
        self.log.inner.lock()[self.slot].1.push((transferred, total));
    }

    fn finish(&mut self) {
        self.log.inner.lock()[self.slot].2 = true;
    }
}

impl ProgressFactory for RecordingFactory {
    fn observer(&self, job: &TransferJob) -> Box<dyn ProgressObserver + Send> {
        let mut entries = self.log.inner.lock();
        entries.push((job.file_name.clone(), Vec::new(), false));
        Box::new(LoggedObserver {
            log: self.log.clone(),
            slot: entries.len() - 1,
        })
    }
}
