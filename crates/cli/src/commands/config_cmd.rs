//! `wordsplit config`: Configuration management commands.

use wordsplit_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            if config.server.host == "0.0.0.0" && config.server.allows_any_origin() {
                warnings.push("Server bound to all interfaces with CORS open to any origin");
            }
            if config.auth.require_token && config.auth.secret_key.is_none() && !config.key_vault.is_configured() {
                warnings.push("Tokens required but no signing key set (SECRET_KEY or Key Vault)");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Server:    {}:{}", config.server.host, config.server.port);
            println!("   Prefix:    {}", config.api_prefix);
            println!("   Models:    {}", config.models_dir().display());
            println!("   Key Vault: {}", if config.key_vault.is_configured() { "configured" } else { "not configured" });
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", redacted_toml(config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

/// Render the config as TOML with secret values masked.
fn redacted_toml(mut config: AppConfig) -> Result<String, toml::ser::Error> {
    let mask = |value: &mut Option<String>| {
        if value.is_some() {
            *value = Some("[REDACTED]".into());
        }
    };
    mask(&mut config.auth.secret_key);
    mask(&mut config.key_vault.client_secret);
    toml::to_string_pretty(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = AppConfig::config_path();
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn show_masks_secrets() {
        let mut config = AppConfig::default();
        config.auth.secret_key = Some("super-secret".into());
        config.key_vault.client_secret = Some("vault-secret".into());

        let rendered = redacted_toml(config).unwrap();
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("vault-secret"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("api_prefix"));
    }
}
