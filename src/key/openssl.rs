use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::key::{KeyCipher, KeyType, Passphrase};
use crate::process::{CommandOutput, CommandRunner, Invocation, RunnerError};

/// Name of the tool looked up in the executable search path when none is provided.
pub const DEFAULT_TOOL_NAME: &str = "openssl";
/// Program used to look up the tool in the executable search path.
pub const LOCATOR: &str = "which";
/// Value for `-passin`/`-passout` making openssl read the passphrase from its standard input.
const PASS_FROM_STDIN: &str = "stdin";

/// Errors that can occur when operating the openssl binary.
#[derive(Error, Debug)]
pub enum OpenSslError {
    /// The tool is not in the executable search path.
    #[error("`{0}` not found in the executable search path")]
    NotFound(String),
    /// The tool could not be run at all.
    #[error("{0}")]
    Runner(#[from] RunnerError),
    /// The tool ran and returned an unsuccessful exit status.
    #[error("`{program}` exited with status `{status}`: `{stderr}`")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    /// Filesystem error while preparing the output location.
    #[error("filesystem i/o error on `{0}`: `{1}`")]
    Io(String, String),
    /// The tool reported success but the expected file is not there.
    #[error("expected output `{0}` was not written")]
    MissingOutput(String),
}

/// Handle over an openssl binary found in the executable search path.
pub struct OpenSsl<'a, R: CommandRunner> {
    runner: &'a R,
    binary: PathBuf,
}

impl<'a, R: CommandRunner> OpenSsl<'a, R> {
    /// Looks up `tool_name` with the [LOCATOR] program.
    ///
    /// Any failure of the lookup itself (locator missing, non-zero exit, empty output) means the
    /// tool can't be used.
    pub fn discover(runner: &'a R, tool_name: &str) -> Result<Self, OpenSslError> {
        let invocation = Invocation::new(LOCATOR).arg(tool_name);
        let output = runner.run(&invocation).map_err(|e| {
            debug!("locating `{tool_name}` failed: {e}");
            OpenSslError::NotFound(tool_name.to_string())
        })?;

        let location = output.stdout_lossy();
        let location = location.trim();
        if !output.success() || location.is_empty() {
            return Err(OpenSslError::NotFound(tool_name.to_string()));
        }

        debug!("using `{location}` as `{tool_name}`");
        Ok(Self {
            runner,
            binary: PathBuf::from(location),
        })
    }

    pub fn binary(&self) -> &Path {
        self.binary.as_path()
    }

    /// Writes an encrypted private key to `path`, creating its parent directory if needed.
    pub fn generate_private_key(
        &self,
        path: &Path,
        passphrase: &Passphrase,
        key_type: KeyType,
        cipher: KeyCipher,
    ) -> Result<(), OpenSslError> {
        ensure_parent_dir(path)?;
        let invocation = private_key_invocation(&self.binary, path, passphrase, key_type, cipher);
        self.run_for_output(&invocation, path)
    }

    /// Derives the public key of the private key at `private_key_path` into `public_key_path`,
    /// creating its parent directory if needed.
    pub fn extract_public_key(
        &self,
        private_key_path: &Path,
        public_key_path: &Path,
        passphrase: &Passphrase,
    ) -> Result<(), OpenSslError> {
        ensure_parent_dir(public_key_path)?;
        let invocation =
            public_key_invocation(&self.binary, private_key_path, public_key_path, passphrase);
        self.run_for_output(&invocation, public_key_path)
    }

    fn run_for_output(&self, invocation: &Invocation, output: &Path) -> Result<(), OpenSslError> {
        let result = self.runner.run(invocation)?;
        check_exit(invocation, &result)?;
        if !output.is_file() {
            return Err(OpenSslError::MissingOutput(output.display().to_string()));
        }
        Ok(())
    }
}

/// `openssl genrsa -passout stdin -out <path> -aes256 4096`
pub fn private_key_invocation(
    binary: &Path,
    path: &Path,
    passphrase: &Passphrase,
    key_type: KeyType,
    cipher: KeyCipher,
) -> Invocation {
    Invocation::new(binary)
        .args(["genrsa", "-passout", PASS_FROM_STDIN, "-out"])
        .arg(path)
        .arg(cipher.flag())
        .arg(key_type.bits().to_string())
        .stdin(passphrase_line(passphrase))
}

/// `openssl rsa -passin stdin -pubout -in <private> -out <public>`
pub fn public_key_invocation(
    binary: &Path,
    private_key_path: &Path,
    public_key_path: &Path,
    passphrase: &Passphrase,
) -> Invocation {
    Invocation::new(binary)
        .args(["rsa", "-passin", PASS_FROM_STDIN, "-pubout", "-in"])
        .arg(private_key_path)
        .arg("-out")
        .arg(public_key_path)
        .stdin(passphrase_line(passphrase))
}

/// openssl reads the passphrase as one line and rejects an empty read, so the line terminator is
/// always sent. openssl strips it, the key is encrypted with exactly the configured bytes.
fn passphrase_line(passphrase: &Passphrase) -> Vec<u8> {
    let mut line = passphrase.as_bytes().to_vec();
    line.push(b'\n');
    line
}

fn check_exit(invocation: &Invocation, output: &CommandOutput) -> Result<(), OpenSslError> {
    if output.success() {
        return Ok(());
    }
    Err(OpenSslError::Failed {
        program: invocation.program_name(),
        status: output
            .exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| String::from("terminated by signal")),
        stderr: output.stderr_lossy(),
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), OpenSslError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| OpenSslError::Io(parent.display().to_string(), e.to_string())),
        _ => Ok(()),
    }
}
