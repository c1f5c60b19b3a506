//! `wordsplit doctor`: Diagnose setup problems.

use wordsplit_config::AppConfig;
use wordsplit_models::WordSegmenter;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 wordsplit Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — defaults in use (run `wordsplit init`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue found. Fix the config and re-run.");
            return Ok(());
        }
    };

    // Models: load each one and run the probe word through it.
    let status = WordSegmenter::from_config(&config).check_status();
    for (code, model) in &status.models {
        if model.loaded {
            println!("  ✅ Model {code}: {} loaded", model.model);
        } else {
            println!(
                "  ❌ Model {code}: {}",
                model.error.as_deref().unwrap_or("not loaded")
            );
            issues += 1;
        }
    }

    if config.key_vault.is_configured() {
        println!("  ✅ Azure Key Vault configured");
    } else {
        println!("  ℹ️  Azure Key Vault not configured");
    }

    let has_key = config.auth.secret_key.as_deref().is_some_and(|k| !k.is_empty());
    if has_key {
        println!("  ✅ Token signing key configured");
    } else if config.key_vault.is_configured() {
        println!(
            "  ℹ️  Token signing key will be read from Key Vault secret '{}'",
            config.key_vault.secret_key_name
        );
    } else {
        println!("  ⚠️  No signing key — tokens will not survive a restart (set SECRET_KEY)");
        if config.auth.require_token {
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
