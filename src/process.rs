use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

pub mod system;

#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    /// The child process could not be started.
    #[error("unable to spawn `{0}`: `{1}`")]
    Spawn(String, String),
    /// The stdin payload could not be delivered to the child.
    #[error("unable to write to the stdin of `{0}`: `{1}`")]
    Stdin(String, String),
    /// The child output could not be collected.
    #[error("unable to wait for `{0}`: `{1}`")]
    Wait(String, String),
}

/// A single external program execution: what to run, with which arguments and what to feed
/// through its standard input.
#[derive(Clone, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub stdin: Option<Vec<u8>>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::default(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
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

    /// Sets the bytes written to the child's standard input before waiting for it.
    pub fn stdin(mut self, input: impl AsRef<[u8]>) -> Self {
        self.stdin = Some(input.as_ref().to_vec());
        self
    }

    /// Program name to be used in logs and error messages.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

// stdin may carry secrets, only its length is shown.
impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("stdin_len", &self.stdin.as_ref().map(Vec::len))
            .finish()
    }
}

/// Result of an executed program. A non-zero exit is a regular value, callers decide what it means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// A synchronous trait to execute external programs.
pub trait CommandRunner {
    /// Runs the invocation to completion, blocking the caller.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError>;
}

// Accept closures as CommandRunner implementations
impl<F> CommandRunner for F
where
    F: Fn(&Invocation) -> Result<CommandOutput, RunnerError>,
{
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self(invocation)
    }
}
