use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    itemvault_observability::init();

    let config = itemvault_api::config::ApiConfig::from_env().context("invalid configuration")?;
    let services = itemvault_api::app::build_services(&config)
        .await
        .context("failed to build services")?;
    let app = itemvault_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
