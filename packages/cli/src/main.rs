mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{attribute, block, fmt, AttributeArgs, BlockArgs, Context};
use config::Config;
use tracing::Level;

/// hcledit - address-based edits of HCL files that keep their formatting
#[derive(Parser, Debug)]
#[command(name = "hcledit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file; `-` reads stdin
    #[arg(short, long, default_value = "-", global = true)]
    file: String,

    /// Write the result back to the input file
    #[arg(short, long, global = true)]
    update: bool,

    /// Keep blank lines left behind by `rm` commands
    #[arg(long, global = true)]
    no_tidy: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get, set or remove an attribute
    Attribute(AttributeArgs),

    /// Get, list or remove blocks
    Block(BlockArgs),

    /// Format the document
    Fmt,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // stdout carries the document
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();
    let config = Config::load(&cwd)?;

    // A config-level `update` does not apply to stdin; the flag does and fails.
    let update = cli.update || (config.update && cli.file != "-");
    let ctx = Context::new(cli.file, update, config.tidy_after_remove && !cli.no_tidy)?;
    tracing::debug!(?ctx, "resolved options");

    match cli.command {
        Command::Attribute(args) => attribute(args, &ctx),
        Command::Block(args) => block(args, &ctx),
        Command::Fmt => fmt(&ctx),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}
