use clap::Parser;
use jdkswitch::cli::logging::init_logging;
use jdkswitch::cli::{Cli, CommandHandler, OutputFormat, FORMATTER};
use jdkswitch::{AppConfig, AppPaths, AppResult, CommandDispatcher};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = OutputFormat::from_flag(cli.json);

    if let Err(e) = run(cli).await {
        eprint!("{}", FORMATTER.format_error(&e, format));
        process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let paths = AppPaths::resolve(cli.data_dir)?;
    let config = AppConfig::load(&paths)?;
    let dispatcher = CommandDispatcher::open(&paths, &config);

    let handler = CommandHandler::new(dispatcher, OutputFormat::from_flag(cli.json));
    handler.handle_command(cli.command).await
}
