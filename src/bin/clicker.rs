use clap::Parser;
use extractgen::clicker::CookieBot;
use extractgen::{logging, ClickerCli, GracefulShutdown, OutputFormatter, OutputMode};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = ClickerCli::parse();
    let formatter = OutputFormatter::new(OutputMode::Human, cli.verbose, cli.quiet);

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            return e.exit_code();
        }
    };

    if let Err(e) = logging::init_logging(&settings.logging) {
        formatter.warning(&format!("Logging disabled: {:#}", e));
    }

    let shutdown = match GracefulShutdown::new() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            return e.exit_code();
        }
    };

    formatter.start_operation(&format!("Playing {}", settings.clicker.game_url));
    formatter.info("Press Ctrl+C to stop");

    let bot = CookieBot::from_settings(&settings, shutdown);
    match bot.run().await {
        Ok(summary) => {
            formatter.print_bot_summary(&summary);
            0
        }
        Err(e) => {
            tracing::error!("{}", e);
            formatter.print_user_friendly_error(&e);
            e.exit_code()
        }
    }
}
