/**
 * Binding Provider CLI - ko-bind
 *
 * Inspect binding annotations from the command line
 */
use std::process;

use binding_provider_cli::{cli, log_level, run};

fn main() {
    let matches = cli().get_matches();

    env_logger::Builder::from_default_env()
        .filter_level(log_level(&matches))
        .init();

    match run(&matches) {
        Ok(output) => println!("{}", output),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
