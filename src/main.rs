//! ISP Service Checker - main entry point

use clap::Parser;
use isp_service_checker::{app::App, cli::Cli, error::ErrorReporter};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(!cli.no_color, cli.verbose || cli.debug);

    if let Err(e) = App::new(cli).run().await {
        reporter.report_error(&e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        process::exit(e.exit_code());
    }
}
