use anyhow::Result;
use assetgate::{
    cli::{Cli, Commands},
    gate, init, init_tracing,
};
use clap::Parser;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run(opts)) => {
            gate::run(opts)?;
        }
        Some(Commands::Check(opts)) => {
            let stale = gate::check(&opts)?;
            if let Some(code) = gate::check_exit_code(stale, opts.exit_code) {
                std::process::exit(code);
            }
        }
        Some(Commands::Init(opts)) => {
            init::run(opts)?;
        }
        None => {
            gate::run(cli.run)?;
        }
    }

    Ok(())
}
