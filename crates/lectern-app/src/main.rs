//! Main application entry point.

use clap::Parser;
use lectern_app::Cli;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut stdout = std::io::stdout();
    if let Err(e) = pollster::block_on(lectern_app::run(cli, &mut stdout)) {
        log::error!("{}", e.report());
        std::process::exit(1);
    }
}
