use sqlchain::config::{default_config_path, load_config, PipelineConfig};
use sqlchain::Result;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};

fn main() {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    info!("Starting sqlchain...");

    // Parse CLI arguments
    let args: Vec<String> = std::env::args().collect();
    let config_path = match args.len() {
        1 => match default_config_path() {
            Some(path) => path,
            None => {
                eprintln!("No pipeline file given and no config directory available.");
                eprintln!("Usage: {} [PIPELINE.toml]", args[0]);
                process::exit(2);
            }
        },
        _ => PathBuf::from(&args[1]),
    };

    if let Err(e) = run(&config_path) {
        error!(error = %e, "pipeline failed");
        eprintln!("Pipeline failed: {}", e);
        process::exit(1);
    }
}

fn run(config_path: &Path) -> Result<()> {
    info!(path = %config_path.display(), "loading pipeline");
    let config: PipelineConfig = load_config(config_path)?;
    let connection = config.open_database()?;
    let rows = config
        .template()
        .apply(&connection)
        .into_result()?
        .unwrap_or_default();
    for row in rows {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}
