// pty.rs — A shell command running on a pseudo-terminal.
//
// The child gets the slave side of a fresh PTY as its controlling terminal
// and as stdin/stdout/stderr, so stdout and stderr arrive merged and in the
// order the child wrote them. The parent reads the master side on the
// calling thread and hands out complete lines.
//
// Everything the child needs (argv, envp, working directory) is turned into
// C strings before fork(); between fork() and execve() the child only makes
// raw libc calls.
//
// When the child exits and the slave side closes, Linux reports EIO on the
// master instead of a zero-length read. That is the normal end of a PTY
// stream and is reported as `StreamOutcome::ClosedBenignly`.

use std::ffi::{CString, OsStr};
use std::fs::File;
use std::io::{self, Read};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::ExitStatus;

use crate::error::ExecError;

const SHELL: &str = "/bin/sh";

const READ_CHUNK: usize = 4096;

/// How the output stream of a session ended.
#[derive(Debug)]
pub enum StreamOutcome {
    /// Zero-length read.
    Eof,
    /// EIO after the slave side closed. Expected on Linux.
    ClosedBenignly,
    /// Any other read error. The command counts as failed.
    IoError(io::Error),
}

impl StreamOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StreamOutcome::IoError(_))
    }
}

/// A running `/bin/sh -c <command>` attached to a PTY.
pub struct PtySession {
    master: File,
    child_pid: libc::pid_t,
    status: Option<ExitStatus>,
    pending: Vec<u8>,
    outcome: Option<StreamOutcome>,
}

/// Allocate a PTY pair using libc::openpty.
fn open_pty() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut master: RawFd = 0;
    let mut slave: RawFd = 0;

    // Safety: openpty writes to the provided pointers.
    let ret = unsafe {
        libc::openpty(
            &mut master,
            &mut slave,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }

    // Safety: fds are valid, just allocated by openpty.
    let master_owned = unsafe { OwnedFd::from_raw_fd(master) };
    let slave_owned = unsafe { OwnedFd::from_raw_fd(slave) };
    Ok((master_owned, slave_owned))
}

fn c_string(value: &OsStr) -> Result<CString, ExecError> {
    CString::new(value.as_bytes())
        .map_err(|_| ExecError::InvalidArgument(value.to_string_lossy().into_owned()))
}

/// The parent's environment with `PWD` pointing at `working_dir`.
fn child_environment(working_dir: &Path) -> Result<Vec<CString>, ExecError> {
    let mut envp = Vec::new();
    for (key, value) in std::env::vars_os() {
        if key == "PWD" {
            continue;
        }
        let mut entry = key.as_bytes().to_vec();
        entry.push(b'=');
        entry.extend_from_slice(value.as_bytes());
        // Entries with interior NULs cannot be passed on; drop them.
        if let Ok(entry) = CString::new(entry) {
            envp.push(entry);
        }
    }
    let mut pwd = b"PWD=".to_vec();
    pwd.extend_from_slice(working_dir.as_os_str().as_bytes());
    envp.push(CString::new(pwd).map_err(|_| {
        ExecError::InvalidArgument(working_dir.display().to_string())
    })?);
    Ok(envp)
}

fn null_terminated(strings: &[CString]) -> Vec<*const libc::c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

impl PtySession {
    /// Start `/bin/sh -c <command>` in `working_dir`.
    ///
    /// The parent's working directory is never changed; only the child's
    /// cwd and `PWD` point at `working_dir`.
    pub fn spawn(command: &str, working_dir: &Path) -> Result<Self, ExecError> {
        let argv = vec![
            c_string(OsStr::new(SHELL))?,
            c_string(OsStr::new("-c"))?,
            c_string(OsStr::new(command))?,
        ];
        let envp = child_environment(working_dir)?;
        let c_dir = c_string(working_dir.as_os_str())?;
        let argv_ptrs = null_terminated(&argv);
        let envp_ptrs = null_terminated(&envp);

        let (master_owned, slave_owned) = open_pty().map_err(ExecError::OpenPty)?;
        let master_fd = master_owned.as_raw_fd();
        let slave_fd = slave_owned.as_raw_fd();

        // Safety: the child only calls async-signal-safe libc functions
        // before execve or _exit.
        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(ExecError::Spawn {
                command: command.to_string(),
                source: io::Error::last_os_error(),
            });
        }

        if pid == 0 {
            // ── Child process ──
            unsafe {
                libc::close(master_fd);
                libc::setsid();
                libc::ioctl(slave_fd, libc::TIOCSCTTY.into(), 0);
                libc::dup2(slave_fd, libc::STDIN_FILENO);
                libc::dup2(slave_fd, libc::STDOUT_FILENO);
                libc::dup2(slave_fd, libc::STDERR_FILENO);
                if slave_fd > 2 {
                    libc::close(slave_fd);
                }
                if libc::chdir(c_dir.as_ptr()) != 0 {
                    libc::_exit(127);
                }
                libc::execve(argv_ptrs[0], argv_ptrs.as_ptr(), envp_ptrs.as_ptr());
                libc::_exit(127);
            }
        }

        // ── Parent process ──
        drop(slave_owned);
        tracing::debug!(pid, command, cwd = %working_dir.display(), "spawned command");

        Ok(PtySession {
            master: File::from(master_owned),
            child_pid: pid,
            status: None,
            pending: Vec::new(),
            outcome: None,
        })
    }

    /// Iterate over output lines until the stream ends.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { session: self }
    }

    /// Next complete line of output, without its line terminator.
    /// A trailing partial line is returned once the stream has ended.
    pub fn next_line(&mut self) -> Option<String> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                return Some(decode_line(&line[..pos]));
            }
            if self.outcome.is_some() {
                if self.pending.is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut self.pending);
                return Some(decode_line(&rest));
            }

            match self.master.read(&mut buf) {
                Ok(0) => self.outcome = Some(StreamOutcome::Eof),
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.raw_os_error() == Some(libc::EIO) => {
                    self.outcome = Some(StreamOutcome::ClosedBenignly)
                }
                Err(e) => {
                    tracing::debug!(pid = self.child_pid, error = %e, "pty read failed");
                    self.outcome = Some(StreamOutcome::IoError(e))
                }
            }
        }
    }

    /// How the stream ended; `None` while it is still open.
    pub fn outcome(&self) -> Option<&StreamOutcome> {
        self.outcome.as_ref()
    }

    /// Wait for the child to exit. Safe to call more than once.
    pub fn wait(&mut self) -> Result<ExitStatus, ExecError> {
        if let Some(status) = self.status {
            return Ok(status);
        }

        let mut raw: libc::c_int = 0;
        loop {
            // Safety: waiting on our own child pid.
            let ret = unsafe { libc::waitpid(self.child_pid, &mut raw, 0) };
            if ret >= 0 {
                break;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(ExecError::Wait {
                    pid: self.child_pid,
                    source: err,
                });
            }
        }

        let status = ExitStatus::from_raw(raw);
        tracing::debug!(pid = self.child_pid, ?status, "command exited");
        self.status = Some(status);
        Ok(status)
    }

    pub fn child_pid(&self) -> libc::pid_t {
        self.child_pid
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        if self.status.is_some() {
            return;
        }
        // Hang up on a child nobody waited for. If it survives, kill its
        // process group; either way the child is reaped.
        let mut raw: libc::c_int = 0;
        unsafe {
            libc::kill(self.child_pid, libc::SIGHUP);
            if libc::waitpid(self.child_pid, &mut raw, libc::WNOHANG) != 0 {
                return;
            }
            libc::kill(-self.child_pid, libc::SIGKILL);
        }
        loop {
            let rc = unsafe { libc::waitpid(self.child_pid, &mut raw, 0) };
            if rc != -1 || io::Error::last_os_error().kind() != io::ErrorKind::Interrupted {
                break;
            }
        }
        tracing::debug!(pid = self.child_pid, "reaped abandoned command");
    }
}

/// Lazy line iterator over a [`PtySession`].
pub struct Lines<'a> {
    session: &'a mut PtySession,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.session.next_line()
    }
}

/// The terminal turns `\n` into `\r\n`; drop the `\r`.
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run(command: &str, dir: &Path) -> (Vec<String>, PtySession) {
        let mut session = PtySession::spawn(command, dir).unwrap();
        let lines: Vec<String> = session.lines().collect();
        (lines, session)
    }

    #[test]
    fn collects_lines_and_exit_status() {
        let dir = tempdir().unwrap();
        let (lines, mut session) = run("echo one; echo two", dir.path());
        assert_eq!(lines, vec!["one", "two"]);
        assert!(!session.outcome().unwrap().is_failure());
        assert_eq!(session.wait().unwrap().code(), Some(0));
    }

    #[test]
    fn stderr_is_merged_into_the_stream() {
        let dir = tempdir().unwrap();
        let (lines, mut session) = run("echo out; echo err 1>&2; exit 3", dir.path());
        assert_eq!(lines, vec!["out", "err"]);
        assert_eq!(session.wait().unwrap().code(), Some(3));
    }

    #[test]
    fn child_runs_in_working_dir_with_pwd_set() {
        let dir = tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let before = std::env::current_dir().unwrap();

        let (lines, mut session) = run("pwd -P; echo \"$PWD\"", &canonical);
        session.wait().unwrap();

        assert_eq!(lines[0], canonical.display().to_string());
        assert_eq!(lines[1], canonical.display().to_string());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn partial_last_line_is_returned() {
        let dir = tempdir().unwrap();
        let (lines, mut session) = run("printf 'no newline'", dir.path());
        session.wait().unwrap();
        assert_eq!(lines, vec!["no newline"]);
    }

    #[test]
    fn silent_command_yields_no_lines() {
        let dir = tempdir().unwrap();
        let (lines, mut session) = run("true", dir.path());
        assert!(lines.is_empty());
        assert!(session.outcome().is_some());
        assert!(session.wait().unwrap().success());
    }

    #[test]
    fn missing_working_dir_exits_127() {
        let dir = tempdir().unwrap();
        let (_, mut session) = run("echo hi", &dir.path().join("nope"));
        assert_eq!(session.wait().unwrap().code(), Some(127));
    }

    #[test]
    fn wait_is_idempotent() {
        let dir = tempdir().unwrap();
        let (_, mut session) = run("exit 5", dir.path());
        assert_eq!(session.wait().unwrap().code(), Some(5));
        assert_eq!(session.wait().unwrap().code(), Some(5));
    }

    #[test]
    fn nul_in_command_is_rejected() {
        let dir = tempdir().unwrap();
        let result = PtySession::spawn("echo a\0b", dir.path());
        assert!(matches!(result, Err(ExecError::InvalidArgument(_))));
    }

    #[test]
    fn dropping_an_unwaited_session_reaps_the_child() {
        let dir = tempdir().unwrap();
        let session = PtySession::spawn("trap '' HUP; sleep 30", dir.path()).unwrap();
        let pid = session.child_pid();
        drop(session);

        let mut raw: libc::c_int = 0;
        let rc = unsafe { libc::waitpid(pid, &mut raw, libc::WNOHANG) };
        assert_eq!(rc, -1);
        assert_eq!(io::Error::last_os_error().raw_os_error(), Some(libc::ECHILD));
    }

    #[test]
    fn decode_line_strips_carriage_return() {
        assert_eq!(decode_line(b"hello\r"), "hello");
        assert_eq!(decode_line(b"hello"), "hello");
    }
}
