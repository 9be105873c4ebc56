use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{DirectoryDownloads, FontFile, FormController, GenerationClient, SubmitOutcome};
use shared::domain::{GenerationConfig, GlyphsOption};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, parse_assignment, Settings, CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "arfont", about = "Generate MSDF ARFont packages from TTF/OTF fonts")]
struct Cli {
    /// Generation endpoint; overrides the config file and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a font, then download the generated artifact.
    Generate(GenerateArgs),
    /// List every atlas parameter path and its effective default.
    Fields,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    font: PathBuf,
    /// all, basic or selected (long forms such as `selectedGlyphs` also work).
    #[arg(long, default_value = "all")]
    glyphs: GlyphsOption,
    /// Characters to include when `--glyphs selected`.
    #[arg(long)]
    chars: Option<String>,
    /// Atlas parameter, e.g. `--set pxRange=4 --set aemPadding.left=0.1`.
    #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_assignment)]
    overrides: Vec<(String, String)>,
    /// Directory the artifact is saved into.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    match cli.command {
        Command::Generate(args) => generate(settings, args).await,
        Command::Fields => print_fields(&settings),
    }
}

async fn generate(settings: Settings, args: GenerateArgs) -> Result<()> {
    let download_dir = args.out.unwrap_or(settings.download_dir);
    info!(
        font = %args.font.display(),
        download_dir = %download_dir.display(),
        "loaded settings"
    );
    let controller = FormController::new(
        GenerationClient::new(settings.api_url),
        Arc::new(DirectoryDownloads::new(download_dir)),
    );

    let font = FontFile::from_path(&args.font).await?;
    controller.select_file(Some(font)).await;
    controller.set_glyphs_option(args.glyphs).await;
    if let Some(chars) = args.chars {
        controller.set_selected_glyphs(chars).await;
    }

    let assignments = settings.defaults.into_iter().chain(args.overrides);
    for (path, value) in assignments {
        controller
            .update_config(&path, value)
            .await
            .with_context(|| format!("cannot apply '{path}'"))?;
    }

    match controller.submit().await {
        SubmitOutcome::Completed {
            saved_to: Some(path),
        } => {
            println!("Saved {}", path.display());
            Ok(())
        }
        SubmitOutcome::Completed { saved_to: None } => {
            println!("Generation finished; the service returned no font artifact");
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => bail!("{errors}"),
        SubmitOutcome::Failed(message) => bail!("{message}"),
        SubmitOutcome::Busy => bail!("a submission is already running"),
    }
}

fn print_fields(settings: &Settings) -> Result<()> {
    let mut config = GenerationConfig::default();
    for (path, value) in &settings.defaults {
        config = config
            .with_field(path, value.as_str())
            .with_context(|| format!("cannot apply default '{path}' from config file"))?;
    }

    for path in GenerationConfig::leaf_paths() {
        let value = config.get(path).unwrap_or_default();
        println!("{path} = {value:?}");
    }
    Ok(())
}
