use clap::{Parser, Subcommand};
use filtergraph::{FilterKind, RustBackend, config, output, render};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    if env!("FILTERGRAPH_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("FILTERGRAPH_GIT_HASH") {
        "" => "dev@unknown",
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "filtergraph")]
#[command(about = "Apply catalog image filters from the command line")]
#[command(long_about = "\
Apply catalog image filters from the command line

Each filter is a small chain of elementary operations sized to the input
image. A filter either fully transforms the image or produces nothing.

Filter ids:

  none            pass the image through unchanged
  sepia           warm brown tone (sepia@0.8 for a stronger tint)
  invert          invert colours
  vignette        darken towards the corners (vignette@0.5 for a softer edge)
  zoom-blur       radial blur, cropped by 10% per side (400x300 -> 320x240)
  hue-rotate-N    shift hue by N degrees
  noir            high-contrast black and white
  posterize       reduce to 6 levels per channel (posterize@4 for fewer)

Run 'filtergraph gen-config' to generate a documented filtergraph.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = "filtergraph.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the configured filter catalog
    Catalog {
        /// Print id/title pairs as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one filter to an image file
    Apply {
        /// Image to read (JPEG, PNG, TIFF, WebP)
        input: PathBuf,
        /// Filter id, e.g. `sepia` or `hue-rotate-90`
        #[arg(long, short)]
        filter: FilterKind,
        /// Where to write the result
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Render every catalog filter for one image
    Preview {
        /// Image to read
        input: PathBuf,
        /// Directory for the rendered previews
        #[arg(long, default_value = "previews")]
        out_dir: PathBuf,
    },
    /// Print a stock filtergraph.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Run a command. `Ok(false)` means it completed but some filter produced no image.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Catalog { json } => {
            let catalog = config::load_config(&cli.config)?.catalog()?;
            if json {
                println!("{}", output::format_catalog_json(&catalog)?);
            } else {
                output::print_catalog(&catalog);
            }
        }
        Command::Apply {
            input,
            filter,
            output: out_path,
        } => {
            let app_config = config::load_config(&cli.config)?;
            let rendered =
                render::render_file(&RustBackend, &filter, &input, &out_path, &app_config.output)?;
            output::print_apply_result(&rendered);
        }
        Command::Preview { input, out_dir } => {
            let app_config = config::load_config(&cli.config)?;
            init_thread_pool(&app_config.processing);
            let catalog = app_config.catalog()?;
            let image = filtergraph::PixelImage::open(&input)?;
            let results = render::render_previews(
                &RustBackend,
                &catalog,
                &image,
                file_stem(&input),
                &out_dir,
                &app_config.output,
            )?;
            output::print_preview_results(&results);
            return Ok(results.iter().all(|r| r.outcome.is_ok()));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(true)
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
}
