//! subgen - AI subtitle generator
//!
//! Entry point: parses the command line, sets up logging and configuration,
//! then drives the transcription pipeline or the key/config helpers.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use subgen::cli::{Args, Commands, ConfigAction, KeyAction};
use subgen::config::Config;
use subgen::credential::{Credential, CredentialSource, CredentialStore};
use subgen::error::SubgenError;
use subgen::languages::{self, LANGUAGES};
use subgen::media::TempResourceStore;
use subgen::progress::SpinnerListener;
use subgen::transcribe::SubtitleServiceFactory;
use subgen::workflow::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = setup_logging(args.verbose)?;

    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Generate {
            input,
            lang,
            mode,
            output_dir,
            mime_type,
            preview,
        } => {
            generate(
                &config,
                &input,
                lang.as_deref(),
                mode,
                output_dir,
                mime_type.as_deref(),
                preview,
            )
            .await?;
        }
        Commands::Languages => {
            println!("{:<12} {}", "Code", "Name");
            println!("{}", "-".repeat(36));
            for language in LANGUAGES {
                println!("{:<12} {}", language.code, language.name);
            }
        }
        Commands::Key { action } => {
            let store = CredentialStore::from_config(&config.credential);
            match action {
                KeyAction::Set { key } => {
                    let credential = Credential::new(&key)
                        .ok_or_else(|| SubgenError::Config("API key must not be blank".to_string()))?;
                    store.save(&credential)?;
                    println!("API key saved to {}.", store.path().display());
                }
                KeyAction::Status => match store.resolve()? {
                    Some((_, CredentialSource::Environment(var))) => {
                        println!("API key is set (from environment variable {}).", var)
                    }
                    Some((_, CredentialSource::File(path))) => {
                        println!("API key is saved in {}.", path.display())
                    }
                    None => println!("No API key configured."),
                },
                KeyAction::Clear => {
                    if store.clear()? {
                        println!("API key removed.");
                    } else {
                        println!("No saved API key to remove.");
                    }
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                if path.exists() && !force {
                    return Err(SubgenError::Config(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    ))
                    .into());
                }
                Config::default().save_to_file(&path)?;
                println!("Wrote default configuration to {}", path.display());
            }
        },
    }

    Ok(())
}

async fn generate(
    config: &Config,
    input: &Path,
    lang: Option<&str>,
    mode: Option<subgen::config::OutputMode>,
    output_dir: Option<PathBuf>,
    mime_type: Option<&str>,
    preview: bool,
) -> Result<()> {
    let language = languages::find(lang.unwrap_or(config.output.default_language.as_str()))?;
    let mode = mode.unwrap_or(config.output.mode);

    let credential = CredentialStore::from_config(&config.credential)
        .resolve()?
        .map(|(credential, _)| credential);

    let service = SubtitleServiceFactory::create_default(config.model.clone())?;
    let resources = TempResourceStore::new()?;

    let mut pipeline = Pipeline::new(service, Box::new(resources))
        .with_listener(Box::new(SpinnerListener::new()));
    pipeline.set_credential(credential);
    pipeline.set_target_language(language);
    pipeline.set_mode(mode);
    pipeline.select_path(input, mime_type)?;

    info!(
        "Generating {} for {} (target: {})",
        mode,
        input.display(),
        language.name
    );

    let output = pipeline.generate().await?.clone();

    let output_dir = match output_dir {
        Some(dir) => dir,
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let saved = output.save_to(&output_dir).await?;
    println!(
        "Saved {} (generated {})",
        saved.display(),
        output.generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    if preview {
        if let Some(vtt) = pipeline.preview_vtt().await? {
            println!("\n{}", vtt);
        }
    }

    pipeline.shutdown();
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".subgen").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "subgen.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("subgen.log").display()
    );

    Ok(guard)
}
