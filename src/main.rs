use std::env;

use ordnance::{cli, logging};

fn main() {
    logging::init_tracing();
    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
