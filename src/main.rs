use prompt_repo_mcp::config::ServerConfig;
use prompt_repo_mcp::server::McpServer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("prompt-repo-mcp: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let server = McpServer::new(config);
    if let Err(e) = server.run().await {
        eprintln!("prompt-repo-mcp: fatal error: {e}");
        std::process::exit(1);
    }
}
