//! Process execution operations

use async_trait::async_trait;
use gotools_errors::{Error, PlatformError};
use std::path::PathBuf;

use crate::core::PlatformContext;

/// Platform-specific command builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env_vars: Vec<(String, String)>,
    env_clear: bool,
}

impl PlatformCommand {
    /// Create a new platform command
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            env_clear: false,
        }
    }

    /// Build a command from configured tokens (program followed by arguments)
    ///
    /// # Errors
    ///
    /// Returns an error if `tokens` is empty.
    pub fn from_tokens(tokens: &[String]) -> Result<Self, Error> {
        let (program, args) = tokens.split_first().ok_or(PlatformError::EmptyCommand)?;
        let mut cmd = Self::new(program);
        cmd.args(args);
        Ok(cmd)
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set an environment variable for the command
    pub fn env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Start from an empty environment instead of inheriting ours
    pub fn env_clear(&mut self) -> &mut Self {
        self.env_clear = true;
        self
    }

    /// Get the program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the current directory
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    /// Get the explicitly set environment variables
    pub fn get_env_vars(&self) -> &[(String, String)] {
        &self.env_vars
    }

    pub fn clears_env(&self) -> bool {
        self.env_clear
    }

    /// Program and arguments joined for logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Run a command to completion, streaming its output as events.
    ///
    /// Succeeds only if the process exits with status zero.
    async fn execute_command(&self, ctx: &PlatformContext, cmd: PlatformCommand)
        -> Result<(), Error>;

    /// Create a new command builder
    fn create_command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }
}
