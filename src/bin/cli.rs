use clap::{Args, Parser, Subcommand};
use servisheet::constants::{ERROR_MARKER, SUCCESS_MARKER};
use servisheet::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "svcli")]
#[command(about = "Servisheet CLI - Pivot customer visit logs into spreadsheet reports and back", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Suppress the run summary (the marker line is always printed)
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a visit log to a styled xlsx and a plain csv report
    Export(ExportArgs),
    /// Re-absorb an edited report into customer and visit tables
    Import(ImportArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the JSON visit record array
    #[arg(short, long)]
    input: PathBuf,
    /// Output base path; `.xlsx` and `.csv` are appended
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct ImportArgs {
    /// Path to the edited report (.xlsx or .csv)
    #[arg(short, long)]
    input: PathBuf,
    /// Directory for the two import tables
    #[arg(short, long)]
    output_dir: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    match cli.command {
        Commands::Export(args) => cmd_export(args, &config, cli.quiet),
        Commands::Import(args) => cmd_import(args, &config, cli.quiet),
    }
}

fn load_config(path: Option<&std::path::Path>) -> servisheet::Result<SheetConfig> {
    match path {
        Some(path) => SheetConfig::from_file(path),
        None => Ok(SheetConfig::load()),
    }
}

fn cmd_export(args: ExportArgs, config: &SheetConfig, quiet: bool) {
    match run_export(&args.input, &args.output, config) {
        Ok(report) => {
            if !quiet {
                report.print_summary();
            }
            println!(
                "{}: Exported {} customers to {}.xlsx and {}.csv",
                SUCCESS_MARKER,
                report.customers_exported,
                args.output.display(),
                args.output.display()
            );
        }
        Err(e) => fail(&e),
    }
}

fn cmd_import(args: ImportArgs, config: &SheetConfig, quiet: bool) {
    match run_import(&args.input, &args.output_dir, config) {
        Ok(report) => {
            if !quiet {
                report.print_summary();
            }
            println!(
                "{}: Imported {} customers and {} visits to {}",
                SUCCESS_MARKER,
                report.customers_imported,
                report.visits_imported,
                args.output_dir.display()
            );
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &ServisheetError) -> ! {
    eprintln!("{}: {}", ERROR_MARKER, e.user_message());
    std::process::exit(1);
}
