//! minibase CLI entry point
//!
//! Parses arguments and evaluates via `cli::run`, printing any error to
//! stderr and exiting non-zero. All logic lives in the library.

use minibase::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
