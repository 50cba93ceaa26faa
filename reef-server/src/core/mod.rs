//! Core server building blocks: configuration, shared state, lifecycle

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;

/// Set up the process environment: dotenv, work directory, logging
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/reef".into());
    std::fs::create_dir_all(&work_dir)?;

    let log_dir = std::path::Path::new(&work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    crate::utils::logger::init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.to_str(),
    );

    Ok(())
}

/// Print the startup banner
pub fn print_banner() {
    println!(
        r#"
  ── Reef ──
  room-service fulfillment v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
