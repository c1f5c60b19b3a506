//! `wordsplit status`: Show configuration and model status.

use wordsplit_config::AppConfig;
use wordsplit_core::Language;
use wordsplit_models::ModelRegistry;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = ModelRegistry::from_config(&config);

    println!("✂️  wordsplit Status");
    println!("===================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Models dir:   {}", config.models_dir().display());
    println!("  Server:       {}:{}{}", config.server.host, config.server.port, config.api_prefix);
    println!("  CORS:         {}", config.server.cors_origins.join(", "));
    println!("  Auth:         {}", if config.auth.require_token { "bearer token required" } else { "open" });
    println!("  Key Vault:    {}", if config.key_vault.is_configured() { "configured" } else { "not configured" });
    println!("  Eager load:   {}", config.models.eager_load);

    println!("\n  Models:");
    for spec in registry.specs() {
        let marker = if spec.path.is_file() { "✅" } else { "❌" };
        println!(
            "   {marker} {} → {} ({})",
            spec.language,
            spec.model,
            spec.path.display()
        );
    }

    println!("\n  Acronyms:");
    for language in Language::ALL {
        println!("   {language}: {}", config.acronyms_for(language).join(", "));
    }

    if AppConfig::config_path().exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `wordsplit init` first");
    }

    Ok(())
}
