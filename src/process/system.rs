use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{CommandOutput, CommandRunner, Invocation, RunnerError};

/// Runs invocations as child processes of the current one, blocking until they finish.
///
/// Standard input, output and error are always piped: the child never inherits the terminal,
/// so any secret it reads comes exclusively from [`Invocation::stdin`].
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let program = invocation.program_name();
        debug!(%program, args = ?invocation.args, "running external command");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RunnerError::Spawn(program.clone(), e.to_string()))?;

        // Taking the handle drops it at the end of the block, closing the pipe so the child sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            if let Some(input) = &invocation.stdin {
                if let Err(e) = stdin.write_all(input) {
                    // The child may exit before reading its input; reap it before reporting.
                    let _ = child.wait();
                    return Err(RunnerError::Stdin(program, e.to_string()));
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| RunnerError::Wait(program.clone(), e.to_string()))?;

        debug!(%program, exit_code = ?output.status.code(), "external command finished");

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
