use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::error;

use org_reconciler::cli::Cli;
use org_reconciler::pipeline;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let summary = pipeline::run(&cli.input_dir, &cli.output_dir, &config)?;
    print!("{}", summary.render_text());
    Ok(())
}
