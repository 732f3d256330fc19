use std::io;

use log::error;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rb_index::demo;

fn main() {
    initialize_logging();

    let (stdin, stdout) = (io::stdin(), io::stdout());
    if let Err(err) = demo::simulate(stdin.lock(), stdout.lock()) {
        error!("simulation aborted: {}", err);
    }
}

fn initialize_logging() {
    let res = TermLogger::init(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    if let Err(err) = res {
        eprintln!("unable to set logger: {}", err);
    }
}
