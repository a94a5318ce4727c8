//! `apns-send`: deliver a single notification from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use uuid::Uuid;

use apns_client::config::load_config;
use apns_client::observability::logging::init_logging;
use apns_client::payload::{Alert, Aps};
use apns_client::{ApnsError, Client, HeaderOption, Payload, Priority, PushType};

#[derive(Parser)]
#[command(name = "apns-send")]
#[command(about = "Send one push notification through APNs", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Hex device token
    device_token: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    body: Option<String>,

    #[arg(long)]
    badge: Option<u32>,

    #[arg(long)]
    sound: Option<String>,

    /// alert, background, voip, liveactivity, ...
    #[arg(long)]
    push_type: Option<PushType>,

    /// 10, 5 or 1
    #[arg(long)]
    priority: Option<u8>,

    #[arg(long)]
    collapse_id: Option<String>,

    /// Unix time after which APNs stops trying to deliver
    #[arg(long)]
    expiration: Option<u64>,

    /// Notification UUID; APNs assigns one when omitted
    #[arg(long)]
    id: Option<Uuid>,

    /// Retry connection and server failures using the configured policy
    #[arg(long)]
    retry: bool,
}

impl Cli {
    fn payload(&self) -> Payload {
        let alert = (self.title.is_some() || self.body.is_some()).then(|| Alert {
            title: self.title.clone(),
            body: self.body.clone(),
            ..Alert::default()
        });

        Payload::new(Aps {
            alert,
            badge: self.badge,
            sound: self.sound.clone(),
            ..Aps::default()
        })
    }

    fn options(&self) -> Result<Vec<HeaderOption>, ApnsError> {
        let mut options = Vec::new();
        if let Some(push_type) = self.push_type {
            options.push(HeaderOption::push_type(push_type));
        }
        if let Some(raw) = self.priority {
            let priority = Priority::from_u8(raw).ok_or_else(|| ApnsError::InvalidHeader {
                name: "apns-priority",
                message: format!("unsupported priority {}", raw),
            })?;
            options.push(HeaderOption::priority(priority));
        }
        if let Some(collapse_id) = &self.collapse_id {
            options.push(HeaderOption::collapse_id(collapse_id)?);
        }
        if let Some(expiration) = self.expiration {
            options.push(HeaderOption::expiration(expiration));
        }
        if let Some(id) = self.id {
            options.push(HeaderOption::notification_id(id)?);
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli, config).await {
        Ok(id) => {
            println!("{}", id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let class = e
                .classification()
                .map_or_else(|| "local".to_string(), |c| c.to_string());
            eprintln!("Error ({}): {}", class, e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: apns_client::ClientConfig) -> Result<String, ApnsError> {
    let client = Client::new(config)?;
    let payload = cli.payload();
    let options = cli.options()?;

    let response = if cli.retry {
        client.send_with_retry(&cli.device_token, &payload, &options).await?
    } else {
        client.send(&cli.device_token, &payload, &options).await?
    };

    client.stop_renewal().await;
    Ok(response.notification_id.unwrap_or_else(|| "accepted".to_string()))
}
