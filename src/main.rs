use clap::Parser;
use extractgen::{
    logging, Cli, ExtractGenError, ExtractGenerator, OutputFormatter, OutputMode, RunRequest,
    UserFriendlyError,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments; clap prints usage and exits non-zero when the
    // configuration name is missing
    let cli = Cli::parse();

    let config_name = match (cli.generate_settings, cli.config_name.as_deref()) {
        (false, Some(name)) => name,
        _ => return handle_generate_settings(&cli),
    };

    let generator = match ExtractGenerator::from_cli(&cli) {
        Ok(generator) => generator,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    if let Err(e) = logging::init_logging(&generator.settings().logging) {
        generator
            .output_formatter()
            .warning(&format!("Logging disabled: {:#}", e));
    }

    let mut request = RunRequest::new(config_name).with_send_email(!cli.skip_email);
    if let Some(date) = cli.date {
        request = request.with_run_date(date);
    }

    match generator.run(&request) {
        Ok(report) => {
            generator.output_formatter().print_run_report(&report);
            0
        }
        Err(e) => {
            generator.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_settings(cli: &Cli) -> i32 {
    let settings_path = cli
        .settings
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "extractgen.toml".to_string());

    match ExtractGenerator::generate_sample_settings(&settings_path) {
        Ok(()) => {
            println!("Generated sample settings file: {}", settings_path);
            println!("\nTo use these settings:");
            println!("  extractgen <config-name> --settings {}", settings_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate settings file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &ExtractGenError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
