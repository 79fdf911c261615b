use std::env::VarError;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::{
    ConfigError, KeyPairConfig, KeyPathsSource, passphrase_from_env, passphrase_from_file,
};
use crate::confirm::Confirm;
use crate::key::Passphrase;
use crate::key::openssl::DEFAULT_TOOL_NAME;
use crate::provisioner::overwrite_needs_confirmation;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the keys needed to sign and validate JWT tokens.
    ///
    /// The private key is a 4096 bits RSA key encrypted with AES-256, the public key is derived
    /// from it. The passphrase is taken from --passphrase-file, from the JWT_PASSPHRASE
    /// environment variable or asked interactively, in that order.
    CreateKeys(CreateKeysArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateKeysArgs {
    /// Force recreation of existing keys
    #[arg(short, long)]
    pub force: bool,

    /// Answer "yes" when asked to recreate existing keys
    #[arg(short, long)]
    pub yes: bool,

    /// Private key destination [default: $JWT_PRIVATE_KEY_PATH or config/jwt/private.pem]
    #[arg(long)]
    pub private_key_path: Option<PathBuf>,

    /// Public key destination [default: $JWT_PUBLIC_KEY_PATH or config/jwt/public.pem]
    #[arg(long)]
    pub public_key_path: Option<PathBuf>,

    /// File holding the passphrase of the private key
    #[arg(long)]
    pub passphrase_file: Option<PathBuf>,

    /// Name of the openssl binary to look up in the executable search path
    #[arg(long, default_value = DEFAULT_TOOL_NAME)]
    pub openssl: String,

    /// Select the format of the command report
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output_format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Default)]
pub enum OutputFormat {
    /// Human readable lines
    #[default]
    #[value(name = "Plain")]
    Plain,
    /// Json document with the outcome and the key paths
    #[value(name = "Json")]
    Json,
}

/// Builds the provisioning config out of the arguments, taking missing values from the
/// environment through `env_var` and calling `prompt` when there is no other passphrase source.
///
/// When existing keys would be overwritten, `confirm` is asked before the passphrase is read. A
/// declined overwrite leaves nothing to encrypt, so the passphrase stays empty and no source is
/// read. The provisioner asks `confirm` again, it should repeat the answer (see
/// [AskOnce](crate::confirm::AskOnce)).
pub fn create_config_for_keys<F, C, P>(
    args: &CreateKeysArgs,
    env_var: F,
    confirm: &C,
    prompt: P,
) -> Result<KeyPairConfig, ConfigError>
where
    F: Fn(&'static str) -> Result<String, VarError>,
    C: Confirm + ?Sized,
    P: FnOnce() -> Result<Passphrase, ConfigError>,
{
    let (private_key_path, public_key_path) = KeyPathsSource {
        private_key_path: args.private_key_path.clone(),
        public_key_path: args.public_key_path.clone(),
    }
    .resolve_with(&env_var);

    let declined =
        overwrite_needs_confirmation(&private_key_path, &public_key_path, args.force)
            && !confirm.confirm();

    let passphrase = if declined {
        Passphrase::default()
    } else {
        match &args.passphrase_file {
            Some(path) => passphrase_from_file(path)?,
            None => match passphrase_from_env(&env_var)? {
                Some(passphrase) => passphrase,
                None => prompt()?,
            },
        }
    };

    Ok(KeyPairConfig::new(private_key_path, public_key_path, passphrase)?
        .with_force_overwrite(args.force))
}

/// Asks for the passphrase on the terminal without echoing it.
pub fn prompt_passphrase() -> Result<Passphrase, ConfigError> {
    rpassword::prompt_password("Private key passphrase: ")
        .map(Passphrase::from)
        .map_err(|e| ConfigError::Passphrase(e.to_string()))
}
