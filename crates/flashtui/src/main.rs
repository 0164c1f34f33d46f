use clap::Parser;

use flashtui::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = cli::run(cli) {
        eprintln!("flashtui: {error}");
        std::process::exit(error.exit_code());
    }
}
