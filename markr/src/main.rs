use libmarker::{ScanOutcome, Scanner};
use markr::{find_in_file, run_batch, BatchOutcome, CaseResult, Failure};
use std::path::PathBuf;
use tracing::{warn, Level};

use anyhow::Result;
use clap::{Parser, Subcommand};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 99;

const DEFAULT_TEST_DIR: &str = "./tests";

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// finds markers in a BMP file and prints one "x, y" line per marker
    #[command(name = "find")]
    Find {
        /// The bmp image
        file: PathBuf,
    },

    /// finds markers in every BMP file of a directory and compares them with the correct
    /// output, e.g. test1.o holds the correct output for test1.bmp
    #[command(name = "test")]
    Test {
        /// The directory holding the test files
        #[arg(short, long, default_value = DEFAULT_TEST_DIR)]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and version go to stdout and are not failures
            let code = i32::from(e.use_stderr());
            e.print()?;
            std::process::exit(code);
        }
    };
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();

    let scanner = Scanner::default();
    match cli.command {
        Commands::Find { file } => {
            let (outcome, hits) = find_in_file(&scanner, &file);
            match outcome {
                ScanOutcome::Unreadable => {
                    println!("Can't open '{}' file. Does it exist?", file.display());
                }
                ScanOutcome::NotABitmap => println!("'{}' is not a bmp file!", file.display()),
                ScanOutcome::Success(_) => {
                    for hit in &hits {
                        println!("{hit}");
                    }
                    if hits.is_truncated() {
                        warn!(
                            "only the first {} markers are listed",
                            scanner.capacity()
                        );
                    }
                }
            }
        }
        Commands::Test { dir } => {
            println!("Testing with files in the '{}' directory...", dir.display());
            let outcome = run_batch(&scanner, &dir, |case, result| match result {
                CaseResult::Passed => {}
                CaseResult::Skipped => println!(
                    "Output file corresponding to '{}' has not been found, skipping!",
                    case.name()
                ),
                CaseResult::Failed(failure) => {
                    if *failure == Failure::NotABitmap {
                        println!("'{}' is not a bmp file! (fail)", case.image.display());
                    }
                    println!("'{}' FAILED the test!", case.name());
                }
            })?;
            match outcome {
                BatchOutcome::DirectoryCreated => {
                    println!("'{}' directory not found. Creating it...", dir.display());
                    println!("Done. Now you can put test files in there.");
                }
                BatchOutcome::Completed(summary) if summary.found == 0 => {
                    println!("No *.bmp files found in the '{}' directory.", dir.display());
                }
                BatchOutcome::Completed(summary) => {
                    println!("Files that PASSED the test: {}", summary.passed);
                    println!("Files that FAILED the test: {}", summary.failed);
                    println!("Skipped files: {}", summary.skipped);
                }
            }
        }
    }
    Ok(())
}
