use pos_server::{Config, Server, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    setup_environment();

    tracing::info!("Boba POS Server starting...");

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Start the HTTP server (initializes storage, catalog, and engine)
    let server = Server::new(config);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
