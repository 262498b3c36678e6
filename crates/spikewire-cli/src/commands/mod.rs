mod config;
mod run;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Run(args) => run::execute(&cli.config, args).await,
        Command::Config => config::execute(&cli.config),
    }
}
