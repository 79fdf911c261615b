use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::KeyPairConfig;
use crate::confirm::Confirm;
use crate::key::openssl::{DEFAULT_TOOL_NAME, OpenSsl};
use crate::key::{KeyCipher, KeyType};
use crate::process::CommandRunner;

/// Result of a provisioning run that didn't fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisioningOutcome {
    /// Existing keys were kept because the overwrite was not confirmed.
    Skipped,
    /// Both keys were written.
    Created {
        private_key_path: PathBuf,
        public_key_path: PathBuf,
    },
}

/// Key written by a provisioning step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyRole {
    Private,
    Public,
}

/// Errors that can occur while provisioning, one per failing stage.
#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("command requires {0}")]
    MissingDependency(String),
    #[error("unable to generate private key: `{0}`")]
    PrivateKeyGeneration(String),
    #[error("unable to extract public key: `{0}`")]
    PublicKeyExtraction(String),
}

/// Ensures the key pair used to sign tokens exists, using the openssl binary found through
/// the runner.
pub struct KeyPairProvisioner<R: CommandRunner> {
    runner: R,
    tool_name: String,
    key_type: KeyType,
    cipher: KeyCipher,
}

impl<R: CommandRunner> KeyPairProvisioner<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            key_type: KeyType::Rsa4096,
            cipher: KeyCipher::Aes256,
        }
    }

    /// Looks up `tool_name` instead of `openssl`. It must accept the same arguments.
    pub fn with_tool_name(self, tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            ..self
        }
    }

    /// Provisions the key pair described by `config`.
    ///
    /// When any of the keys exists and `config` doesn't force the overwrite, `confirm` is asked
    /// once before anything is touched. Each external command runs at most once; a failure stops
    /// the run and whatever was already written stays on disk.
    pub fn provision<C: Confirm + ?Sized>(
        &self,
        config: &KeyPairConfig,
        confirm: &C,
    ) -> Result<ProvisioningOutcome, ProvisioningError> {
        self.provision_with_progress(config, confirm, |_, _| {})
    }

    /// Same as [KeyPairProvisioner::provision], calling `on_created` as soon as each key is
    /// written, so a later failure doesn't hide the files already on disk.
    pub fn provision_with_progress<C, F>(
        &self,
        config: &KeyPairConfig,
        confirm: &C,
        mut on_created: F,
    ) -> Result<ProvisioningOutcome, ProvisioningError>
    where
        C: Confirm + ?Sized,
        F: FnMut(KeyRole, &Path),
    {
        let private_key_path = config.private_key_path();
        let public_key_path = config.public_key_path();

        if overwrite_needs_confirmation(
            private_key_path,
            public_key_path,
            config.force_overwrite(),
        ) {
            debug!("keys already exist, asking for confirmation");
            if !confirm.confirm() {
                warn!("overwrite not confirmed, existing keys left untouched");
                return Ok(ProvisioningOutcome::Skipped);
            }
        }

        let openssl = OpenSsl::discover(&self.runner, &self.tool_name)
            .map_err(|_| ProvisioningError::MissingDependency(self.tool_name.clone()))?;

        info!("creating keys");
        openssl
            .generate_private_key(
                private_key_path,
                config.passphrase(),
                self.key_type,
                self.cipher,
            )
            .map_err(|e| ProvisioningError::PrivateKeyGeneration(e.to_string()))?;
        info!(path = %private_key_path.display(), "created private key");
        on_created(KeyRole::Private, private_key_path);

        openssl
            .extract_public_key(private_key_path, public_key_path, config.passphrase())
            .map_err(|e| {
                warn!(
                    path = %private_key_path.display(),
                    "private key kept without a public key"
                );
                ProvisioningError::PublicKeyExtraction(e.to_string())
            })?;
        info!(path = %public_key_path.display(), "created public key");
        on_created(KeyRole::Public, public_key_path);

        Ok(ProvisioningOutcome::Created {
            private_key_path: private_key_path.to_path_buf(),
            public_key_path: public_key_path.to_path_buf(),
        })
    }
}

/// Whether provisioning into these paths has to be confirmed first: any of the keys exists and
/// the overwrite isn't forced.
pub fn overwrite_needs_confirmation(
    private_key_path: &Path,
    public_key_path: &Path,
    force_overwrite: bool,
) -> bool {
    !force_overwrite && (private_key_path.exists() || public_key_path.exists())
}
