use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::config::KeyPairConfig;
use crate::confirm::Confirm;
use crate::parameters::OutputFormat;
use crate::process::CommandRunner;
use crate::provisioner::{KeyPairProvisioner, KeyRole, ProvisioningError, ProvisioningOutcome};

#[derive(Error, Debug)]
pub enum CreateKeysError {
    #[error("{0}")]
    Provisioning(#[from] ProvisioningError),
    #[error("unable to write report: `{0}`")]
    Report(String),
}

pub struct CreateKeysCommand<R, C>
where
    R: CommandRunner,
    C: Confirm,
{
    provisioner: KeyPairProvisioner<R>,
    confirm: C,
    output_format: OutputFormat,
}

impl<R, C> CreateKeysCommand<R, C>
where
    R: CommandRunner,
    C: Confirm,
{
    pub fn new(provisioner: KeyPairProvisioner<R>, confirm: C) -> Self {
        Self {
            provisioner,
            confirm,
            output_format: OutputFormat::Plain,
        }
    }

    pub fn with_output_format(self, output_format: OutputFormat) -> Self {
        Self {
            output_format,
            ..self
        }
    }

    /// Provisions the keys and writes the report into `out`.
    ///
    /// The Plain report names each key as soon as it is written, so a private key left behind
    /// by a failing public key step is still reported.
    pub fn execute<W: Write>(
        &self,
        config: &KeyPairConfig,
        out: &mut W,
    ) -> Result<ProvisioningOutcome, CreateKeysError> {
        let mut progress_error = None;
        let result = self
            .provisioner
            .provision_with_progress(config, &self.confirm, |role, path| {
                if self.output_format != OutputFormat::Plain || progress_error.is_some() {
                    return;
                }
                if let Err(e) = write_created(out, role, path) {
                    progress_error = Some(e);
                }
            });
        let outcome = result?;
        if let Some(e) = progress_error {
            return Err(CreateKeysError::Report(e.to_string()));
        }

        self.report(&outcome, out)
            .map_err(|e| CreateKeysError::Report(e.to_string()))?;
        Ok(outcome)
    }

    fn report<W: Write>(&self, outcome: &ProvisioningOutcome, out: &mut W) -> io::Result<()> {
        match self.output_format {
            OutputFormat::Plain => match outcome {
                ProvisioningOutcome::Skipped => writeln!(out, "Exiting..."),
                // Already written while provisioning.
                ProvisioningOutcome::Created { .. } => Ok(()),
            },
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, outcome)?;
                writeln!(out)
            }
        }
    }
}

fn write_created<W: Write>(out: &mut W, role: KeyRole, path: &Path) -> io::Result<()> {
    match role {
        KeyRole::Private => writeln!(out, "Created private key:")?,
        KeyRole::Public => {
            writeln!(out)?;
            writeln!(out, "Created public key:")?
        }
    }
    writeln!(out, "{}", path.display())
}
