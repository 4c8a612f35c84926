use clap::{CommandFactory, Parser};
use custom_ca_manager::{telemetry, Cli, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _telemetry = telemetry::init();

    let config = match Config::try_from(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            println!("Invalid option: {e}\n");
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    custom_ca_manager::run(config).await?;
    Ok(())
}
