use clap::{Parser, Subcommand, ValueEnum};
use cli::{load_config, ConfigFile};
use color_eyre::eyre::{Result, WrapErr};
use shapes::{typed_geojson::ShapeProperties, DetectorConfig, ShapeCommand};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and classify the shapes in an image
    Detect {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Classification to run (classify_polygons, harris_corners, shi_tomasi_corners)
        #[arg(short, long, default_value = "classify_polygons")]
        strategy: ShapeCommand,
        /// Detector configuration (.toml or .json); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Where to write the annotated image
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Where to write the GeoJSON report
        #[arg(short, long)]
        geojson: Option<PathBuf>,
        /// Print the full detection as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// List the available classification commands
    List,
    /// Print a JSON schema
    Schema {
        #[arg(value_enum, default_value = "config")]
        target: SchemaTarget,
    },
    /// Write the default configuration to a .toml or .json file
    InitConfig {
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaTarget {
    Config,
    Command,
    Properties,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Detect {
            input,
            strategy,
            config,
            output,
            geojson,
            json,
        } => {
            detect(
                input,
                *strategy,
                config.as_deref(),
                output.as_deref(),
                geojson.as_deref(),
                *json,
            )?;
        }
        Commands::List => {
            for command in ShapeCommand::iter() {
                println!("{:<20} {}", command.to_string(), command.description());
            }
        }
        Commands::Schema { target } => {
            let schema = match target {
                SchemaTarget::Config => DetectorConfig::schema(),
                SchemaTarget::Command => ShapeCommand::schema(),
                SchemaTarget::Properties => schemars::schema_for!(ShapeProperties),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::InitConfig { output } => {
            DetectorConfig::default()
                .to_file(output)
                .wrap_err_with(|| format!("failed to write {}", output.display()))?;
            info!(path = %output.display(), "wrote default configuration");
        }
    }

    Ok(())
}

fn detect(
    input: &Path,
    strategy: ShapeCommand,
    config: Option<&Path>,
    output: Option<&Path>,
    geojson: Option<&Path>,
    print_json: bool,
) -> Result<()> {
    let config = load_config(config).wrap_err("failed to load detector configuration")?;
    let image = image::open(input).wrap_err_with(|| format!("failed to open {}", input.display()))?;

    info!(input = %input.display(), %strategy, "running detection");
    let (annotated, detection) = shapes::execute(&image, strategy, &config)?;

    if detection.shapes.is_empty() {
        warn!("no shapes found");
    }
    for (id, shape) in detection.shapes.iter().enumerate() {
        info!(
            id,
            label = %shape.label,
            count = shape.count,
            x = shape.centroid.x.round(),
            y = shape.centroid.y.round(),
            "detected shape"
        );
    }

    if let Some(path) = output {
        annotated
            .save(path)
            .wrap_err_with(|| format!("failed to save {}", path.display()))?;
        info!(path = %path.display(), "saved annotated image");
    }
    if let Some(path) = geojson {
        detection.save_geojson(path)?;
    }
    if print_json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    }

    Ok(())
}
