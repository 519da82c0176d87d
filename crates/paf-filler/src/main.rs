use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use paf_core::{FormFiller, DEFAULT_DATE_FORMAT};
use paf_filler::{load_dataset, validate_date, Config, ProfileDirLocator, Session, SystemViewer};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();

    info!("Starting paf-filler v{}", env!("CARGO_PKG_VERSION"));
    info!("  Data: {:?}", config.data);
    info!("  Template: {:?}", config.template);

    let dataset = load_dataset(&config.data, config.sheet.as_deref())
        .with_context(|| format!("Failed to load participants from {:?}", config.data))?;

    let mut filler = FormFiller::new(dataset).with_options(config.substitution_options());
    filler
        .load_template(&config.template)
        .with_context(|| format!("Failed to load template {:?}", config.template))?;

    let locator = match &config.output_dir {
        Some(dir) => ProfileDirLocator::new(dir),
        None => ProfileDirLocator::default(),
    };
    info!("  Output root: {:?}", locator.root());

    let viewer = SystemViewer;
    let mut session = Session::new(&filler, &locator).with_field_dump(config.dump_fields);
    if !config.no_open {
        session = session.with_viewer(&viewer);
    }

    let stdout = io::stdout();
    match config.center_id {
        Some(center_id) => {
            let today = chrono::Local::now().format(DEFAULT_DATE_FORMAT).to_string();
            let date = match config.date.as_deref() {
                Some(date) => validate_date(date)?,
                None => today.as_str(),
            };
            let path = session.fill_one(center_id, date, &mut stdout.lock())?;
            println!("Document saved to: {}", path.display());
        }
        None => {
            session.run(io::stdin().lock(), stdout.lock())?;
        }
    }

    Ok(())
}
