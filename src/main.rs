use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use text2image::{
    logger::{self, LogLevel, LoggerConfig},
    models::{AspectRatio, GeneratedImage, GenerationSettings, StylePreset, MODELS},
    prompt::{self, syntax},
    storage, Config, ImageGenerator,
};

#[derive(Parser)]
#[command(name = "text2image", version, about = "Generate images from annotated prompts")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an image and record it in the history
    Generate {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Output file or directory (defaults to the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Do not record the result in the history
        #[arg(long)]
        no_history: bool,
    },
    /// Print the compiled prompt without calling the backend
    Compile {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// List known models
    Models,
    /// Print a random sample prompt
    Sample,
    /// Inspect and edit the history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List entries, newest first
    List,
    /// Show one entry's settings
    Show { id: String },
    /// Delete an entry
    Delete { id: String },
    /// Toggle the favorite flag
    Favorite { id: String },
    /// Print an entry's settings as JSON for reuse
    Remix { id: String },
    /// Write an entry's image to disk
    Export {
        id: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SettingsArgs {
    /// Prompt text; supports `a | b` blending and `(word:1.4)` weights
    prompt: String,

    #[arg(short, long, default_value = "")]
    negative: String,

    #[arg(short, long, default_value = "1:1")]
    aspect: AspectRatio,

    #[arg(short, long, default_value = "none")]
    style: StylePreset,

    #[arg(short, long, default_value = text2image::models::DEFAULT_MODEL_ID)]
    model: String,

    #[arg(long, default_value_t = text2image::models::DEFAULT_STEPS)]
    steps: u32,

    #[arg(long, default_value_t = text2image::models::DEFAULT_GUIDANCE_SCALE)]
    guidance: f32,

    #[arg(long)]
    seed: Option<i64>,
}

impl SettingsArgs {
    fn into_settings(self) -> GenerationSettings {
        let mut settings = GenerationSettings::new(self.prompt)
            .with_negative_prompt(self.negative)
            .with_aspect_ratio(self.aspect)
            .with_style(self.style)
            .with_model(self.model)
            .with_steps(self.steps)
            .with_guidance_scale(self.guidance);
        if let Some(seed) = self.seed {
            settings = settings.with_seed(seed);
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = LogLevel::parse(&cli.log_level).unwrap_or(LogLevel::Warn);
    logger::init_with_config(
        LoggerConfig::new()
            .with_level(level)
            .with_json_output(cli.json_logs),
    )?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    match cli.command {
        Command::Generate {
            settings,
            out,
            no_history,
        } => run_generate(&config, settings.into_settings(), out, no_history).await?,
        Command::Compile { settings } => {
            println!("{}", prompt::compile(&settings.into_settings()));
        }
        Command::Models => {
            for model in MODELS {
                println!("{:<28} {:<20} [{}] {}", model.id, model.name, model.family, model.description);
            }
        }
        Command::Sample => println!("{}", syntax::random_sample_prompt()),
        Command::History { action } => run_history(&config, action).await?,
    }

    Ok(())
}

async fn run_generate(
    config: &Config,
    settings: GenerationSettings,
    out: Option<PathBuf>,
    no_history: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if settings.prompt.trim().is_empty() {
        return Err("prompt must not be empty".into());
    }

    let generator = ImageGenerator::from_config(config)?;
    let (on_progress, mut progress) = text2image::progress_channel();

    let bar = tokio::spawn(async move {
        while let Some(percent) = progress.next().await {
            draw_progress(percent);
        }
        eprintln!();
    });

    let result = generator.generate(settings, Some(on_progress)).await;
    // The sender lives in the generator's callback; once generate returns it
    // has been dropped and the bar task drains and exits.
    let _ = bar.await;

    let image = result?;
    let path = write_image(&image, out.as_deref()).await?;
    println!("{}", path.display());

    if !no_history {
        let mut history = storage::open_history(&config.history).await?;
        history.record(image).await?;
    }

    Ok(())
}

async fn run_history(
    config: &Config,
    action: HistoryAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut history = storage::open_history(&config.history).await?;

    match action {
        HistoryAction::List => {
            for item in history.history().items() {
                let when = chrono::DateTime::from_timestamp_millis(item.image.timestamp)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                let star = if item.is_favorite() { "*" } else { " " };
                println!("{} {} {} {:<26} {}", star, item.id(), when, item.image.model, item.image.settings.prompt);
            }
        }
        HistoryAction::Show { id } => {
            let item = history.history().get(&id).ok_or("no such history entry")?;
            println!("{}", serde_json::to_string_pretty(&item.image.settings)?);
            println!("compiled: {}", prompt::compile(&item.image.settings));
        }
        HistoryAction::Delete { id } => {
            if !history.delete(&id).await? {
                return Err("no such history entry".into());
            }
        }
        HistoryAction::Favorite { id } => {
            let favorite = history
                .toggle_favorite(&id)
                .await?
                .ok_or("no such history entry")?;
            println!("{}", if favorite { "favorited" } else { "unfavorited" });
        }
        HistoryAction::Remix { id } => {
            let settings = history
                .history()
                .remix_settings(&id)
                .ok_or("no such history entry")?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        HistoryAction::Export { id, out } => {
            let item = history.history().get(&id).ok_or("no such history entry")?;
            let path = write_image(&item.image, out.as_deref()).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

async fn write_image(
    image: &GeneratedImage,
    out: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = match out {
        Some(path) if path.is_dir() => path.join(image.download_file_name()),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(image.download_file_name()),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, image.decode_bytes()?).await?;
    Ok(path)
}

fn draw_progress(percent: u8) {
    const WIDTH: usize = 30;
    let filled = WIDTH * percent as usize / 100;
    eprint!(
        "\r[{}{}] {:>3}%",
        "#".repeat(filled),
        " ".repeat(WIDTH - filled),
        percent
    );
    let _ = std::io::stderr().flush();
}
