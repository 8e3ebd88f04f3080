use clap::Parser;
use convoy_app::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    convoy_logging::initialize_terminal(level);
    convoy_app::run(cli)
}
