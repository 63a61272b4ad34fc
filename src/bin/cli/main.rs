//! CLI tool for SMPA archive operations.

mod commands;
mod exit_codes;
mod file_selector;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// SMPA single-file archive tool
#[derive(Parser)]
#[command(name = "smpa")]
#[command(author, version, about = "SMPA single-file archive tool", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List archive contents (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Show packed sizes, attributes and offsets
        #[arg(long)]
        technical: bool,
    },

    /// Extract files from archive (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Entry patterns to extract (glob patterns supported)
        #[arg(short = 'i', long)]
        include: Vec<String>,

        /// Entry patterns to exclude
        #[arg(short = 'e', long)]
        exclude: Vec<String>,
    },

    /// Add files to an archive, creating it if needed (alias: a)
    #[command(alias = "a")]
    Add {
        /// Archive file to create or update
        archive: PathBuf,

        /// Directory the added paths are relative to
        src_root: PathBuf,

        /// Files and directories to add, relative to the source root
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Archive directory to store the files under
        #[arg(short = 's', long, default_value = "")]
        sub_path: String,

        /// Store file names only, without directories
        #[arg(long)]
        flatten: bool,

        /// Delete the sources after they were packed
        #[arg(long = "move")]
        move_files: bool,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "6", value_parser = clap::value_parser!(u32).range(0..=9))]
        level: u32,
    },

    /// Delete entries from an archive (alias: d)
    #[command(alias = "d")]
    Delete {
        /// Archive file to update
        archive: PathBuf,

        /// Entry paths to delete; a trailing separator or `\*.*` selects a whole directory
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Check whether a file is an SMPA archive
    Probe {
        /// File to inspect
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    // The first Ctrl+C cancels through the progress callback, the second exits.
    ctrlc::set_handler(move || {
        if progress::request_cancel() {
            eprintln!("\nInterrupted");
            std::process::exit(exit_codes::USER_INTERRUPT);
        }
    })
    .ok();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::List { archive, technical } => commands::list(&archive, technical, cli.format),

        Commands::Extract {
            archive,
            output,
            include,
            exclude,
        } => commands::extract(&commands::ExtractConfig {
            archive_path: &archive,
            output_dir: &output,
            include: &include,
            exclude: &exclude,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Add {
            archive,
            files,
            src_root,
            sub_path,
            flatten,
            move_files,
            level,
        } => commands::add(&commands::AddConfig {
            archive_path: &archive,
            src_root: &src_root,
            files: &files,
            sub_path: &sub_path,
            flatten,
            move_files,
            level,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Delete { archive, entries } => {
            commands::delete(&archive, &entries, cli.format, cli.quiet)
        }

        Commands::Probe { file } => commands::probe(&file, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
