use rangedl_core::logging;

mod cli;

fn main() {
    // Initialize logging as early as possible; fall back to stderr if the log file is unusable.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, logging to stderr: {:#}", err);
    }

    if let Err(err) = cli::run_from_args() {
        eprintln!("rangedl error: {:#}", err);
        std::process::exit(1);
    }
}
