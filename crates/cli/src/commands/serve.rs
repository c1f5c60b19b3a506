//! `wordsplit serve`: Start the HTTP API server.

use wordsplit_config::AppConfig;

pub async fn run(
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(host) = host_override {
        config.server.host = host;
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    println!("✂️  {} v{}", config.project_name, config.version);
    println!("   Listening:  {}:{}", config.server.host, config.server.port);
    println!("   API prefix: {}", config.api_prefix);
    println!("   Auth:       {}", if config.auth.require_token { "bearer token required" } else { "open" });

    wordsplit_gateway::start(config).await?;

    Ok(())
}
