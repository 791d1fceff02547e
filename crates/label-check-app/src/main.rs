#![warn(missing_docs)]
//! # label-check binary
//!
//! Command-line front end: fills one label form from flags, attaches an image
//! from disk, submits it, and prints the resulting banner.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use label_check_app::{AppConfig, AppError, LabelForm, init_tracing, project_form_status};
use label_check_capture::{LabelFile, PreviewState};
use label_check_core::{TextField, VOLUME_UNITS, VolumeUnit};
use label_check_submit::HttpTransport;
use label_check_ui::{BannerTone, render_banner};

#[derive(Parser, Debug)]
#[command(
    name = "label-check",
    version = label_check_app::APP_VERSION,
    about = "Submit product label data and image for verification"
)]
struct Cli {
    /// Print the resolved outcome as JSON.
    #[arg(long, global = true)]
    json: bool,
    /// Backend base URL (overrides LABEL_CHECK_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one label for verification.
    Submit(SubmitArgs),
    /// List accepted net contents units.
    Units,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Brand name, e.g. "Acme Vodka".
    #[arg(long)]
    brand_name: String,
    /// Product class/type, e.g. "Vodka / Spirit".
    #[arg(long)]
    product_class: String,
    /// Alcohol content, e.g. 40 or 40%.
    #[arg(long)]
    alcohol_content: String,
    /// Net contents value, e.g. 750.
    #[arg(long)]
    net_contents: String,
    /// Net contents unit.
    #[arg(long, default_value = "mL")]
    unit: VolumeUnit,
    /// Label image file.
    #[arg(long)]
    image: PathBuf,
}

/// CLI entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    tracing::debug!(version = label_check_app::app_version(), "label-check starting");

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("label-check: {error}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    match cli.command {
        Command::Units => {
            for unit in VOLUME_UNITS {
                println!("{unit}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Submit(args) => submit(args, cli.api_url, cli.json).await,
    }
}

async fn submit(
    args: SubmitArgs,
    api_url: Option<String>,
    json: bool,
) -> Result<ExitCode, AppError> {
    let config = AppConfig::from_env()?.with_api_url(api_url);
    let endpoint = config.endpoint()?;
    if !endpoint.is_secure() {
        tracing::warn!(endpoint = %endpoint.url(), "backend endpoint is not using https");
    }
    let transport = HttpTransport::new(config.timeout)?;

    let mut form = LabelForm::new();
    for (field, value) in [
        (TextField::BrandName, args.brand_name),
        (TextField::ProductClass, args.product_class),
        (TextField::AlcoholContent, args.alcohol_content),
        (TextField::NetContents, args.net_contents),
    ] {
        if !form.set_field(field, value.clone()) {
            return Err(AppError::RejectedField {
                field: field.as_str(),
                value,
            });
        }
    }
    form.set_unit(args.unit);

    let file = LabelFile::from_path(&args.image);
    if !form.attach_image(Some(file.clone())).await {
        return Err(AppError::RejectedImage {
            name: file.name,
            media_type: file.media_type,
        });
    }
    if form.image().preview() == Some(&PreviewState::Unavailable) {
        tracing::warn!(image = %args.image.display(), "label image could not be read");
    }

    form.submit(&transport, &endpoint).await;

    let status = project_form_status(&form);
    if json {
        if let Some(resolution) = form.outcome().resolution() {
            println!("{}", serde_json::to_string_pretty(resolution)?);
        }
    } else if let Some(banner) = &status.banner {
        println!("{}", render_banner(banner));
    }

    let success = status
        .banner
        .is_some_and(|banner| banner.tone == BannerTone::Success);
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
