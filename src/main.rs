use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taskmaster::api::{self, ApiState};
use taskmaster::camera::{Capture, Webcam};
use taskmaster::store::{FrameStore, NarrationStore};
use taskmaster::tts::{Narrator, TextToSpeech};
use taskmaster::{Config, Pipeline};

/// Taskmaster - webcam productivity critic service
#[derive(Parser)]
#[command(name = "taskmaster", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "TASKMASTER_PORT", default_value = "5000")]
    port: u16,

    /// Directory holding the frames and narration stores
    #[arg(long, env = "TASKMASTER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Capture one frame into the frame store and report its size
    TestCamera,
    /// Synthesize one narration and write it to the narration store
    TestTts {
        /// Text to narrate
        #[arg(default_value = "Back to work. That report will not write itself.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,taskmaster=info",
        1 => "info,taskmaster=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.data_dir)?;
    config.ensure_dirs()?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestCamera => test_camera(&config).await,
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    tracing::info!(port = cli.port, "starting taskmaster");

    let pipeline = Pipeline::from_config(&config)?;
    let state = Arc::new(ApiState { pipeline });

    api::serve(state, config.narration_dir, cli.port).await?;
    Ok(())
}

/// Capture one frame and report the stored result
async fn test_camera(config: &Config) -> anyhow::Result<()> {
    println!("Capturing one frame (2s warm-up)...");

    let store = FrameStore::new(&config.frames_dir);
    let capture = Capture::new(Arc::new(Webcam::new(0)));
    capture.run(&store).await?;

    let (width, height) = image::image_dimensions(store.path())?;
    println!("Frame stored at {} ({width}x{height})", store.path().display());
    println!("\nIf the image looks black, your camera may need a longer warm-up.");
    Ok(())
}

/// Synthesize one narration and report where it landed
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Synthesizing: \"{text}\"\n");

    let api_key = config
        .api_keys
        .elevenlabs
        .clone()
        .ok_or_else(|| anyhow::anyhow!("ELEVENLABS_API_KEY not set"))?;
    let tts = TextToSpeech::new(api_key, config.voice.voice_id.clone())
        .map_err(|e| anyhow::anyhow!("failed to create TTS client: {e}"))?;

    let audio = tts.narrate(text).await?;
    println!("Got {} bytes of audio data", audio.len());

    let store = NarrationStore::new(&config.narration_dir);
    let path = store.store(&audio)?;
    println!("Narration stored at {}", path.display());
    Ok(())
}
