use std::env;
use std::error::Error;
use std::io;

use clap::Parser;
use jwt_keys::commands::create_keys::CreateKeysCommand;
use jwt_keys::confirm::{AskOnce, Confirm, ConsolePrompt};
use jwt_keys::parameters::{Commands, create_config_for_keys, prompt_passphrase};
use jwt_keys::process::system::SystemCommandRunner;
use jwt_keys::provisioner::KeyPairProvisioner;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "jwt-keys", version, about)]
struct Cli {
    /// Maximum level of the log lines written to stderr
    #[arg(long, global = true, default_value_t = Level::WARN)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::CreateKeys(args) => {
            let assume_yes = args.yes;
            let prompt = ConsolePrompt::stdio();
            // The overwrite question comes before the passphrase prompt, the provisioner gets the
            // same answer again.
            let confirm = AskOnce::new(move || assume_yes || prompt.confirm());
            let config = create_config_for_keys(&args, env::var, &confirm, prompt_passphrase)?;
            let provisioner =
                KeyPairProvisioner::new(SystemCommandRunner).with_tool_name(args.openssl.as_str());
            CreateKeysCommand::new(provisioner, confirm)
                .with_output_format(args.output_format)
                .execute(&config, &mut io::stdout().lock())?;
            Ok(())
        }
    }
}
