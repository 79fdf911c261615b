use std::env::{self, VarError};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::key::Passphrase;

pub const PRIVATE_KEY_PATH_ENV_NAME: &str = "JWT_PRIVATE_KEY_PATH";
pub const PUBLIC_KEY_PATH_ENV_NAME: &str = "JWT_PUBLIC_KEY_PATH";
pub const PASSPHRASE_ENV_NAME: &str = "JWT_PASSPHRASE";

pub const DEFAULT_PRIVATE_KEY_PATH: &str = "config/jwt/private.pem";
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "config/jwt/public.pem";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("the {0} key path cannot be empty")]
    EmptyPath(&'static str),
    #[error("unable to read passphrase: `{0}`")]
    Passphrase(String),
    #[error("the passphrase cannot contain line breaks")]
    MultilinePassphrase,
}

/// Everything needed to provision a key pair. It doesn't change during a provisioning run.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPairConfig {
    private_key_path: PathBuf,
    public_key_path: PathBuf,
    passphrase: Passphrase,
    force_overwrite: bool,
}

impl KeyPairConfig {
    pub fn new(
        private_key_path: PathBuf,
        public_key_path: PathBuf,
        passphrase: Passphrase,
    ) -> Result<Self, ConfigError> {
        if private_key_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("private"));
        }
        if public_key_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("public"));
        }
        // openssl reads a single line from stdin, anything after a line break would be dropped.
        if passphrase.has_line_break() {
            return Err(ConfigError::MultilinePassphrase);
        }
        Ok(Self {
            private_key_path,
            public_key_path,
            passphrase,
            force_overwrite: false,
        })
    }

    pub fn with_force_overwrite(self, force_overwrite: bool) -> Self {
        Self {
            force_overwrite,
            ..self
        }
    }

    pub fn private_key_path(&self) -> &Path {
        self.private_key_path.as_path()
    }

    pub fn public_key_path(&self) -> &Path {
        self.public_key_path.as_path()
    }

    pub fn passphrase(&self) -> &Passphrase {
        &self.passphrase
    }

    pub fn force_overwrite(&self) -> bool {
        self.force_overwrite
    }
}

/// Key paths resolved from explicit values, then the environment, then the defaults.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyPathsSource {
    pub private_key_path: Option<PathBuf>,
    pub public_key_path: Option<PathBuf>,
}

impl KeyPathsSource {
    /// Returns the private and public key paths taking missing values from the process environment.
    pub fn resolve_from_env(self) -> (PathBuf, PathBuf) {
        self.resolve_with(env::var)
    }

    /// Same as [KeyPathsSource::resolve_from_env] but using the provided `env_var` function to read
    /// the environment.
    pub fn resolve_with<F>(self, env_var: F) -> (PathBuf, PathBuf)
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        let private_key_path = self.private_key_path.unwrap_or_else(|| {
            env_path(&env_var, PRIVATE_KEY_PATH_ENV_NAME, DEFAULT_PRIVATE_KEY_PATH)
        });
        let public_key_path = self.public_key_path.unwrap_or_else(|| {
            env_path(&env_var, PUBLIC_KEY_PATH_ENV_NAME, DEFAULT_PUBLIC_KEY_PATH)
        });
        (private_key_path, public_key_path)
    }
}

fn env_path<F>(env_var: &F, name: &'static str, default: &str) -> PathBuf
where
    F: Fn(&'static str) -> Result<String, VarError>,
{
    env_var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Reads the passphrase from a file, dropping a single trailing line terminator.
pub fn passphrase_from_file(path: &Path) -> Result<Passphrase, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Passphrase(format!("{}: {e}", path.display())))?;
    let content = content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .unwrap_or(&content);
    Ok(Passphrase::from(content))
}

/// Reads the passphrase from the environment using the provided `env_var` function.
///
/// A present but empty variable is a valid, empty, passphrase.
pub fn passphrase_from_env<F>(env_var: F) -> Result<Option<Passphrase>, ConfigError>
where
    F: Fn(&'static str) -> Result<String, VarError>,
{
    match env_var(PASSPHRASE_ENV_NAME) {
        Ok(value) => Ok(Some(Passphrase::from(value))),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::Passphrase(format!(
            "{PASSPHRASE_ENV_NAME}: {e}"
        ))),
    }
}
