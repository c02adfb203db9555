use clap::Parser;
use kitstudio_core::app::{self, RenderedPage, EXIT_ERROR};
use kitstudio_core::{logging, MountState, StudioConfig, StudioResult};
use std::path::PathBuf;
use std::process;

/// Mount every catalog component declared in an XHTML page.
#[derive(Debug, Parser)]
#[command(name = "kitstudio", version)]
struct Args {
    /// Page template containing `component-type` mount points
    page: PathBuf,

    /// Catalog directory (overrides config and KITSTUDIO_CATALOG_DIR)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the rendered page here instead of stdout
    #[arg(long, short)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match StudioConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(EXIT_ERROR);
        }
    };
    if let Some(dir) = args.catalog.clone() {
        config.catalog_dir = dir;
    }
    logging::init(&config.log_level);

    let result = match app::render_page_file(&config, &args.page).await {
        Ok(rendered) => {
            report(&rendered);
            write_output(&args, &rendered).await.map(|_| rendered)
        }
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        tracing::error!(error = %e, "render failed");
        eprintln!("✗ {}", e);
    }

    process::exit(app::exit_code(&result));
}

fn report(rendered: &RenderedPage) {
    for report in &rendered.summary.reports {
        match &report.state {
            MountState::Mounted => eprintln!("✓ {} ({})", report.component_type, report.data_source),
            MountState::Failed(reason) => {
                eprintln!("✗ {} ({}): {}", report.component_type, report.data_source, reason)
            }
            _ => {}
        }
    }
}

async fn write_output(args: &Args, rendered: &RenderedPage) -> StudioResult<()> {
    match &args.out {
        Some(path) => tokio::fs::write(path, &rendered.html).await?,
        None => println!("{}", rendered.html),
    }
    Ok(())
}
