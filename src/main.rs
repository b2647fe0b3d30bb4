use deck_counter::launch::LaunchArgs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = LaunchArgs::from_host_argv(std::env::args());
    deck_counter::client::run(args).await
}
