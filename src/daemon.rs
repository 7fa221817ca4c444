//! Background execution and PID file handling.
//!
//! [`detach`] re-executes the current binary without `--daemon`, with its
//! standard streams closed and in its own process group. The child can only
//! report problems through `--log-file`, so the caller watches it briefly
//! for an early exit before returning. The detached child writes its PID through [`PidFile`],
//! which removes the file again when dropped at shutdown.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::error::RelayError;

/// Start a detached copy of this process.
pub fn detach(pid_file: &Path) -> Result<Child, RelayError> {
    let exe = std::env::current_exe()?;
    let args = child_args(std::env::args_os().skip(1));

    let mut command = Command::new(exe);
    command
        .args(args)
        .env("RELAY_PID_FILE", pid_file)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    Ok(command.spawn()?)
}

fn child_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter().filter(|a| a != "--daemon").collect()
}

#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn create(path: &Path) -> Result<Self, RelayError> {
        let pid_error = |source| RelayError::PidFile {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(pid_error)?;
        }
        std::fs::write(path, format!("{}\n", std::process::id())).map_err(pid_error)?;
        tracing::debug!(path = %path.display(), "pid file written");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove pid file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daemon_flag_is_not_passed_to_child() {
        let args = child_args(
            ["run", "--daemon", "-r", "http://a:1"]
                .into_iter()
                .map(OsString::from),
        );
        assert_eq!(args, ["run", "-r", "http://a:1"]);
    }

    #[test]
    fn pid_file_lifecycle() {
        let path = std::env::temp_dir().join(format!(
            "multipart-relay-test-{}.pid",
            uuid::Uuid::new_v4()
        ));
        {
            let pid_file = PidFile::create(&path).unwrap();
            assert_eq!(pid_file.path(), path);
            let written = std::fs::read_to_string(&path).unwrap();
            assert_eq!(written.trim(), std::process::id().to_string());
        }
        assert!(!path.exists());
    }
}
