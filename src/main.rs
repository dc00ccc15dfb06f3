use std::io::{self, Write};
use std::process;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use passkc::cli::output;
use passkc::cli::{Cli, Dispatcher};
use passkc::config::Settings;
use passkc::infrastructure::di::ServiceContainer;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            output::error(&e);
            process::exit(1);
        }
    };

    let container = ServiceContainer::new(settings);
    let dispatcher = Dispatcher::new(&container, &cli);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut err = io::stderr();
    let result = dispatcher.execute(&cli.command, &mut out, &mut err);
    let _ = out.flush();

    if let Err(e) = result {
        if e.is_usage() {
            eprintln!("{e}");
        } else {
            output::error(&e);
        }
        process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("passkc: verbosity is capped at -vvv (trace)");
            LevelFilter::TRACE
        }
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
