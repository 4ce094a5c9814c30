//! # External process action (`CommandAction`)
//!
//! Adapter that lets an OS command be submitted as a runnable unit. It only spawns
//! the process with inherited stdio, waits for it, and maps the exit status:
//!
//! ```text
//! status.success()        → Ok(())
//! exit code n != 0        → UnitError::Exit { code: n }
//! no exit code (signal)   → UnitError::Terminated
//! spawn/wait I/O error    → UnitError::Spawn { error }
//! ```
//!
//! Output is never captured or interpreted.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::process::Command;

use crate::error::UnitError;
use crate::units::action::{Action, BoxActionFuture};
use crate::units::unit::RunnableUnit;

/// An OS command to run as a unit.
///
/// Its identity is the program followed by its arguments, so two commands with the
/// same argument list share a derived key.
///
/// ## Example
/// ```rust
/// use keyvisor::{CommandAction, RunnableUnit};
///
/// let unit: RunnableUnit = CommandAction::new("ls").arg("-la").arg("/tmp").into();
/// assert_eq!(unit.key(), "ls -la /tmp");
/// ```
#[derive(Clone, Debug)]
pub struct CommandAction {
    /// Program followed by its arguments.
    argv: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CommandAction {
    /// Creates a command for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            argv: vec![program.into()],
            current_dir: None,
            envs: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory of the process. Not part of the identity.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable. Not part of the identity.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.argv[0]);
        cmd.args(&self.argv[1..]);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

impl Action for CommandAction {
    fn identity(&self) -> &[String] {
        &self.argv
    }

    fn run(&self) -> BoxActionFuture {
        let mut cmd = self.command();
        Box::pin(async move {
            let status = cmd
                .status()
                .await
                .map_err(|error| UnitError::Spawn { error })?;

            if status.success() {
                return Ok(());
            }
            match status.code() {
                Some(code) => Err(UnitError::Exit { code }),
                None => Err(UnitError::Terminated),
            }
        })
    }
}

impl From<CommandAction> for RunnableUnit {
    fn from(cmd: CommandAction) -> Self {
        RunnableUnit::new(Arc::new(cmd))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_argv() {
        let cmd = CommandAction::new("tar")
            .args(["-czf", "out.tgz"])
            .arg("dir")
            .env("LC_ALL", "C")
            .current_dir("/tmp");
        assert_eq!(cmd.identity(), ["tar", "-czf", "out.tgz", "dir"]);
        assert_eq!(cmd.program(), "tar");
    }

    #[tokio::test]
    async fn test_success_status() {
        CommandAction::new("true").run().await.unwrap();
    }

    #[tokio::test]
    async fn test_nonzero_exit_maps_to_exit_error() {
        let err = CommandAction::new("sh")
            .args(["-c", "exit 3"])
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, UnitError::Exit { code: 3 }), "{err:?}");
    }

    #[tokio::test]
    async fn test_killed_by_signal_maps_to_terminated() {
        let err = CommandAction::new("sh")
            .args(["-c", "kill -9 $$"])
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, UnitError::Terminated), "{err:?}");
        assert_eq!(err.as_label(), "unit_terminated");
    }

    #[tokio::test]
    async fn test_missing_program_maps_to_spawn_error() {
        let err = CommandAction::new("/definitely/not/a/real/program")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, UnitError::Spawn { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_env_and_dir_are_applied() {
        CommandAction::new("sh")
            .args(["-c", "test \"$KEYVISOR_T\" = yes && test \"$(pwd)\" = /"])
            .env("KEYVISOR_T", "yes")
            .current_dir("/")
            .run()
            .await
            .unwrap();
    }
}
