use std::{fs, process::ExitCode};

use clap::Parser;
use interpreter::run_on_src;

/// Runs a program written in atom, the tiny apply-everything language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat `contents` as a path to a source file.
    #[arg(short, long)]
    file: bool,

    /// Also print the value the program evaluates to.
    #[arg(short, long)]
    print_result: bool,

    contents: String,
}

/// Enable with `RUST_LOG=interpreter=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let script = if args.file {
        match fs::read_to_string(&args.contents) {
            Ok(script) => script,
            Err(e) => {
                eprintln!("Failed to read the input file '{}': {e}", &args.contents);
                return ExitCode::FAILURE;
            }
        }
    } else {
        args.contents
    };

    match run_on_src(&script) {
        Ok(value) => {
            if args.print_result {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "run failed");
            eprint!("{}", e.to_report(&script));
            ExitCode::FAILURE
        }
    }
}
