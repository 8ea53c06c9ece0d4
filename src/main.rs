use std::process::ExitCode;

use libfacecap::{cli::Args, logger};

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    if let Err(e) = logger::init(args.log_level()) {
        eprintln!("Unable to initialize logging: {e}");
    }

    match args.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
