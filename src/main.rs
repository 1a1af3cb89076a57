use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod columns;
mod controller;
mod debounce;
mod domain;
mod engine;
mod inputter;
mod loader;
mod model;
mod record;
mod ui;

use controller::Controller;
use domain::{PAGE_SIZE_OPTIONS, RVConfig, RVError, Variant};
use loader::{DataSource, PageRequest};
use model::{Model, Status};
use ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base url of the row server
    #[arg(long, default_value = loader::DEFAULT_BASE_URL)]
    url: String,

    /// Read rows from a json file instead of the server
    #[arg(long)]
    file: Option<String>,

    #[arg(long, value_enum, default_value_t = Variant::Nested)]
    variant: Variant,

    /// Rows per page (5, 10, 25 or 50)
    #[arg(long, default_value_t = 10, value_parser = parse_page_size)]
    page_size: usize,

    /// Delay in ms before the filter input is applied
    #[arg(long, default_value_t = 500)]
    debounce: u64,

    /// Log file
    #[arg(long, default_value = "rowview.log")]
    log: String,
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}"))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log) {
        eprintln!("Error: could not open log file {}: {e}", args.log);
        return ExitCode::FAILURE;
    }

    let result = run(args);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            if let RVError::Request { context, .. } = &e {
                eprintln!("{context}");
            }
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(path: &str) -> Result<(), RVError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), RVError> {
    info!("Starting rowview with {:?}", args);

    let cfg = RVConfig::default()
        .variant(args.variant)
        .page_size(args.page_size)
        .debounce_ms(args.debounce);

    let source = match args.file {
        Some(path) => DataSource::File(path),
        None => DataSource::Http(PageRequest {
            base_url: args.url,
            ..PageRequest::default()
        }),
    };

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(&cfg, size.width as usize, size.height as usize)?;
    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    // The table only exists after the first frame
    terminal.draw(|f| ui.draw(&model, f))?;
    let rows = source.load()?;
    model.load_rows(source.describe(), rows)?;

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;

        // Ticks without an event still advance the filter debounce
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye");
    Ok(())
}
