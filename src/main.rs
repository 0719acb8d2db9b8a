use bookdesk::cli::Cli;
use log::error;

fn main() {
    // Logging is configured by the command line handler once the config is
    // loaded. Level comes from [logging] in config.toml or BOOKDESK_LOGGING__BOOKDESK.
    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
