#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, scores and previews moodfield artworks.

mod config;
mod metadata;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use moodfield_core::{ActivityCount, MoodSeed};
use moodfield_engine::{build_scene, Engine, EngineConfig, GenerationError};
use moodfield_rendering::{CanvasSize, Color, PreviewBackend, Presentation};
use moodfield_rendering_macroquad::MacroquadPreview;
use moodfield_system_rarity as rarity;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use self::{config::CliConfig, metadata::TokenMetadata};

const PREVIEW_CLEAR_COLOR: Color = Color::from_rgb_u8(8, 8, 18);

#[derive(Parser)]
#[command(name = "moodfield")]
#[command(about = "Deterministic generative art from a mood and an activity count", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MOODFIELD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the artwork to a PNG file
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Destination of the PNG artifact
        #[arg(short, long, default_value = "moodfield.png")]
        output: PathBuf,

        /// Also write the token metadata document to this path
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Image URI recorded in the metadata instead of an inline data URI
        #[arg(long, requires = "metadata")]
        image_uri: Option<String>,

        /// Override the configured canvas size
        #[arg(long, value_parser = canvas_side())]
        canvas_size: Option<u32>,
    },

    /// Print display and ledger rarity without rendering
    Score {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Open an animated preview window
    Preview {
        #[command(flatten)]
        input: InputArgs,

        /// Override the configured canvas size
        #[arg(long, value_parser = canvas_side())]
        canvas_size: Option<u32>,

        /// Log frame timing once per second
        #[arg(long)]
        show_fps: bool,

        /// Render as fast as possible instead of syncing to the display
        #[arg(long)]
        no_vsync: bool,
    },
}

/// Canvas sides the rendering surface can be acquired for.
fn canvas_side() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(CanvasSize::MAX_SIDE))
}

#[derive(Args)]
struct InputArgs {
    /// Mood phrase seeding the artwork
    #[arg(short, long)]
    seed: String,

    /// Activity count of the creator
    #[arg(short, long, allow_negative_numbers = true)]
    activity: i64,
}

impl InputArgs {
    fn validate(&self) -> Result<(MoodSeed, ActivityCount)> {
        let seed = MoodSeed::new(self.seed.as_str()).map_err(|error| reject(error.into()))?;
        let activity =
            ActivityCount::from_signed(self.activity).map_err(|error| reject(error.into()))?;
        Ok((seed, activity))
    }
}

/// Reports a generation failure, keeping the cause chain behind a user-facing message.
fn reject(error: GenerationError) -> anyhow::Error {
    warn!(%error, retryable = error.is_retryable(), "generation failed");
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Command::Generate {
            input,
            output,
            metadata,
            image_uri,
            canvas_size,
        } => generate(
            &config,
            &input,
            GenerateTargets {
                output,
                metadata,
                image_uri,
            },
            canvas_size,
        ),
        Command::Score { input } => score(&input),
        Command::Preview {
            input,
            canvas_size,
            show_fps,
            no_vsync,
        } => preview(&config, &input, canvas_size, show_fps, !no_vsync),
    }
}

struct GenerateTargets {
    output: PathBuf,
    metadata: Option<PathBuf>,
    image_uri: Option<String>,
}

fn canvas_for(config: &CliConfig, canvas_size: Option<u32>) -> CanvasSize {
    canvas_size.map_or_else(|| config.canvas(), CanvasSize::new)
}

fn generate(
    config: &CliConfig,
    input: &InputArgs,
    targets: GenerateTargets,
    canvas_size: Option<u32>,
) -> Result<()> {
    let (seed, activity) = input.validate()?;
    let engine = Engine::new(EngineConfig {
        canvas: canvas_for(config, canvas_size),
    });
    let result = engine.generate(&seed, activity).map_err(reject)?;

    fs::write(&targets.output, result.artifact().bytes())
        .with_context(|| format!("failed to write artifact to {}", targets.output.display()))?;
    info!(path = %targets.output.display(), "wrote artifact");

    if let Some(path) = &targets.metadata {
        let document = TokenMetadata::describe(
            &seed,
            activity,
            &result,
            &config.metadata,
            targets.image_uri.as_deref(),
            Utc::now(),
        );
        let json = serde_json::to_string_pretty(&document)
            .context("failed to serialise token metadata")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write metadata to {}", path.display()))?;
        info!(path = %path.display(), "wrote metadata");
    }

    println!("artifact: {}", targets.output.display());
    println!("sha256: {}", result.artifact().digest_hex());
    println!("palette: {}", result.palette_name());
    println!("particles: {}", result.particle_count());
    println!("rarity: {}", result.rarity_score().get());
    Ok(())
}

fn score(input: &InputArgs) -> Result<()> {
    let (seed, activity) = input.validate()?;
    let breakdown = rarity::breakdown(activity, &seed);
    let ledger = rarity::ledger_score(activity, &seed);

    println!(
        "display rarity: {} (base {}, length +{}, diversity +{})",
        breakdown.total().get(),
        breakdown.base,
        breakdown.length_bonus,
        breakdown.diversity_bonus
    );
    println!("ledger rarity: {}", ledger.get());
    Ok(())
}

fn preview(
    config: &CliConfig,
    input: &InputArgs,
    canvas_size: Option<u32>,
    show_fps: bool,
    vsync: bool,
) -> Result<()> {
    let (seed, activity) = input.validate()?;
    let canvas = canvas_for(config, canvas_size);
    let scene = build_scene(&seed, activity);
    let engine = Engine::new(EngineConfig { canvas });
    info!(
        palette = %scene.palette.name(),
        particles = scene.particles.len(),
        "opening preview"
    );

    let presentation = Presentation::new(
        format!("moodfield: {seed}"),
        PREVIEW_CLEAR_COLOR,
        canvas,
    );
    MacroquadPreview::new()
        .with_vsync(vsync)
        .with_show_fps(show_fps)
        .run(presentation, move |elapsed| {
            engine
                .preview_frame(&scene, elapsed.as_secs_f32())
                .map_err(anyhow::Error::from)
        })
}
