use campus_realtime::config::AppConfig;
use campus_realtime::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    server::init_tracing(&config.server);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    server::run(config).await?;
    Ok(())
}
