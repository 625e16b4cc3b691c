use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info};
use verdi_sdk::{
    config::Settings, logger, transport::ReqwestTransport, Session, UserSession,
    VerificationClient,
};

#[derive(Parser)]
#[command(name = "verdi")]
#[command(about = "Talk to the Verdi identity verification service")]
struct Cli {
    #[arg(short, long, default_value = "config/verdi.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the configured app id
    CheckAppId,
    /// Register the person described by a session file
    Register {
        #[arg(short, long)]
        session: PathBuf,
    },
    /// Verify an already registered person
    Verify {
        #[arg(short, long)]
        session: PathBuf,
    },
    /// Send a confirmation code to a phone number
    SendPhone {
        #[arg(long)]
        phone: String,
    },
    /// Check a confirmation code
    CheckPhone {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        code: String,
    },
}

/// Session fields as JSON, plus where to find the selfie.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SessionFile {
    #[serde(flatten)]
    user: UserSession,
    face_image_path: Option<PathBuf>,
    device_model: Option<String>,
}

impl SessionFile {
    fn load(path: &Path) -> anyhow::Result<(UserSession, String)> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading session file {}", path.display()))?;
        let file: SessionFile = serde_json::from_str(&raw).context("parsing session file")?;

        let mut user = file.user;
        if let Some(image) = file.face_image_path {
            user.face_image = Some(
                std::fs::read(&image)
                    .with_context(|| format!("reading face image {}", image.display()))?,
            );
        }
        Ok((user, file.device_model.unwrap_or_else(|| "verdi-cli".to_string())))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::load(&cli.config)?;

    // Initialize logging
    logger::init(&settings.logging)?;

    info!("Starting verdi v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", cli.config);

    if let Err(e) = run(&settings, cli.command).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
    let (user, device_model) = match &command {
        Command::Register { session } | Command::Verify { session } => SessionFile::load(session)?,
        _ => (UserSession::default(), "verdi-cli".to_string()),
    };

    let session = Arc::new(Session::new(settings.configuration(), device_model, user));
    let transport = Arc::new(ReqwestTransport::new(settings.logging.log_bodies)?);
    let client = VerificationClient::new(session, transport);

    let output = match command {
        Command::CheckAppId => {
            client.check_app_id().await?;
            serde_json::json!({ "appIdAvailable": client.is_app_id_available() })
        }
        Command::Register { .. } => serde_json::to_value(client.register_person().await?)?,
        Command::Verify { .. } => {
            // Open the gate first so verification is not rerouted to registration.
            client.check_app_id().await?;
            serde_json::to_value(client.verify_person().await?)?
        }
        Command::SendPhone { phone } => serde_json::to_value(client.send_phone(&phone).await?)?,
        Command::CheckPhone { phone, code } => {
            serde_json::to_value(client.check_phone(&phone, &code).await?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
