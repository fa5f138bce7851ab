use clap::Parser;
use deployment_verifier::{run, Args, Command, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::build(args.config_path)?;
    run(settings, args.command.unwrap_or(Command::Verify)).await
}
