use std::process::ExitCode;

use skabelon::{logging, Cli};

fn main() -> ExitCode {
    if let Err(err) = ctrlc::set_handler(|| {
        eprintln!("...interrupted by user, exiting.");
        std::process::exit(1);
    }) {
        eprintln!("warning: could not install interrupt handler: {}", err);
    }

    let config = match Cli::parse_config() {
        Ok(config) => config,
        Err(err) => {
            let _ = err.print();
            // Help and version requests are not failures.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init(config.verbosity);
    tracing::debug!(?config, "parsed arguments");

    match skabelon::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}
