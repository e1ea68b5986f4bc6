//! rastype CLI - inspect fonts and rasterize text from the command line

mod cli;
mod info;
mod measure;
mod render;

use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Info(args) => info::run(&args),
        Commands::Measure(args) => measure::run(&args),
        Commands::Render(args) => render::run(&args),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
