use clap::Parser;
use taskboard::cli::commands::Cli;
use taskboard::cli::handlers;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the workspace's [log] level, otherwise warn
    let start = cli
        .workspace_dir
        .as_ref()
        .map(std::path::PathBuf::from)
        .or_else(|| std::env::current_dir().ok());
    let level = start
        .as_deref()
        .and_then(handlers::configured_log_level)
        .unwrap_or_else(|| "warn".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
