//! `wordsplit init`: First-time setup.

use wordsplit_config::AppConfig;
use wordsplit_core::Language;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("✂️  wordsplit — First-Time Setup");
    println!("===============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let models_dir = config.models_dir();
    if !models_dir.exists() {
        std::fs::create_dir_all(&models_dir)?;
        println!("✅ Created models directory: {}", models_dir.display());
    }

    println!("\n📝 Next steps:");
    for language in Language::ALL {
        println!(
            "   • Build the {language} model: wordsplit model build --language {language} --words <list.txt>"
        );
    }
    println!("   • Start the API: wordsplit serve\n");

    Ok(())
}
