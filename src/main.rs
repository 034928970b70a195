use anyhow::Result;
use clap::Parser;
use log::info;
use meetwise::app::Application;
use meetwise::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    meetwise::init_logger();
    let cli = Cli::parse();

    info!("Starting Meetwise");
    let app = Application::from_cli(&cli)?;
    app.run(cli.command).await
}
