use clap::Parser;
use clipboard_ai_lib::cli::{self, Cli};
use clipboard_ai_lib::settings;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // .env.local → .env before the logger so RUST_LOG from those files applies
    let loaded = settings::load_env_files(std::path::Path::new("."));

    env_logger::init();

    match loaded {
        Ok(Some(path)) => log::info!("[STARTUP] Loaded {}", path.display()),
        Ok(None) => {}
        Err(e) => log::warn!("[STARTUP] {}", e),
    }

    let cli = Cli::parse();
    match cli::run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("[STARTUP] {}", e);
            let err = serde_json::json!({ "error": e.to_string() });
            eprintln!("{}", err);
            ExitCode::from(2)
        }
    }
}
