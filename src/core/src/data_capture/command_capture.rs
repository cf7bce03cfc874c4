//! Capture through an external screenshot program.
//!
//! Most desktop environments ship a command that writes a PNG to a path
//! given as its last argument (`grim`, `scrot`, `screencapture -x`,
//! `import -window root`). `CommandCapture` runs such a program once per
//! artifact and checks that it actually produced the file.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, error};

use crate::error_handling::types::CaptureError;

use super::capture::Capture;

#[derive(Debug, Clone)]
pub struct CommandCapture {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandCapture {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds an argument placed before the destination path.
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Capture for CommandCapture {
    fn capture(&self, path: &Path) -> Result<(), CaptureError> {
        debug!("Running {} for {}", self.program_name(), path.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|e| {
                error!("Failed to spawn {}: {}", self.program_name(), e);
                CaptureError::Io(e)
            })?;
        if !status.success() {
            return Err(CaptureError::CommandFailed {
                program: self.program_name(),
                status,
            });
        }
        if !path.is_file() {
            return Err(CaptureError::MissingOutput(path.to_path_buf()));
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_successful_command_writes_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1_home.png");
        CommandCapture::new("touch").capture(&target).unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn test_failing_command_is_reported() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1.png");
        let err = CommandCapture::new("false").capture(&target).unwrap_err();
        assert!(matches!(err, CaptureError::CommandFailed { ref program, .. } if program == "false"));
    }

    #[test]
    fn test_command_without_output_is_reported() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1.png");
        let err = CommandCapture::new("true").capture(&target).unwrap_err();
        assert!(matches!(err, CaptureError::MissingOutput(p) if p == target));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = CommandCapture::new("definitely-not-a-screenshot-tool")
            .args(["-x"])
            .capture(&dir.path().join("1.png"))
            .unwrap_err();
        assert!(matches!(err, CaptureError::Io(_)));
    }
}
