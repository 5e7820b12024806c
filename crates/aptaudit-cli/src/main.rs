//! aptaudit - find installed packages that are not downloadable via
//! configured APT sources.

mod report;

use aptaudit_apt::AptDatabase;
use clap::Parser;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code when an interrupt signal cuts the run short.
const EXIT_INTERRUPTED: i32 = 10;

#[derive(Parser)]
#[command(name = "aptaudit", version)]
#[command(about = "Find installed packages that are not downloadable via configured APT sources.")]
struct Args {
    /// Be silent, only print found package's names
    #[arg(short, long)]
    silent: bool,
}

extern "C" fn on_interrupt(_signal: libc::c_int) {
    // Only async-signal-safe calls are allowed here.
    unsafe { libc::_exit(EXIT_INTERRUPTED) }
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout is reserved for the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    unsafe {
        libc::signal(
            libc::SIGINT,
            on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t,
        );
    }

    let code = match run(args.silent) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("aptaudit: {}", e);
            1
        }
    };
    process::exit(code);
}

fn run(silent: bool) -> aptaudit_core::Result<i32> {
    let mut db = AptDatabase::new()?;
    debug!(status_file = %db.status_file().display(), "Opened package database");
    report::run(&mut db, silent, &mut std::io::stdout())
}
