pub mod build;
pub mod cli;
pub mod config;
pub mod gate;
pub mod init;
pub mod staleness;
pub mod vcs;

/// Initialize tracing with a default filter if `RUST_LOG` is unset.
pub fn init_tracing() {
    let default_filter = "assetgate=info";
    let filter_layer = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(filter_layer)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
