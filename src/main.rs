use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_writer(io::stderr).with_env_filter(filter).init();

    if let Err(e) = session_vault::cli::run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
