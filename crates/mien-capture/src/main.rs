use anyhow::{Context, Result};
use clap::Parser;
use mien_client::{ChannelClient, ParticipantInfo};
use mien_hw::Camera;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod config;
mod controller;
mod pump;
mod render;

use config::Config;
use controller::CaptureController;

#[derive(Parser)]
#[command(name = "mien-capture", about = "Mien capture client — stream webcam frames, watch live metrics")]
struct Cli {
    /// Participant first name
    #[arg(long)]
    first_name: Option<String>,
    /// Participant last name
    #[arg(long)]
    last_name: Option<String>,
    /// Project code
    #[arg(long, default_value = "")]
    project: String,
    /// List capture devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        for dev in Camera::list_devices() {
            println!("{}  {} ({}, {})", dev.path, dev.name, dev.driver, dev.bus);
        }
        return Ok(());
    }

    let (Some(first_name), Some(last_name)) = (cli.first_name, cli.last_name) else {
        anyhow::bail!("--first-name and --last-name are required to open a session");
    };
    let participant = ParticipantInfo {
        first_name,
        last_name,
        client_id: cli.project,
    };

    let config = Config::from_env();
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, participant = %participant.first_name, "capture client starting");

    // Camera grant is the idle → armed gate; a denial is a startup error,
    // surfaced once with no retry.
    let camera = Camera::open(&config.camera_device)
        .with_context(|| format!("cannot acquire camera {}", config.camera_device))?;
    camera.warm_up(config.warmup_frames)?;

    let (channel, mut updates) = ChannelClient::connect(&config.channel_url)
        .await
        .with_context(|| format!("cannot reach realtime channel {}", config.channel_url))?;

    let mut controller = CaptureController::new(participant);
    let pump = pump::spawn_pump(
        camera,
        channel.clone(),
        config.frame_interval,
        config.jpeg_quality,
    );
    controller.arm(channel, pump);

    println!("armed — commands: start | stop | reset | status | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(snapshot) => {
                    print!("\r{}", render::snapshot_line(&snapshot));
                    let _ = std::io::stdout().flush();
                    controller.on_update(snapshot);
                }
                None => {
                    println!();
                    tracing::warn!("realtime channel closed, shutting down");
                    break;
                }
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                println!();
                match line.trim() {
                    "start" => controller.start().await?,
                    "stop" => controller.stop().await?,
                    "reset" => controller.reset().await?,
                    "status" => println!("state: {:?}", controller.state()),
                    "quit" | "q" => break,
                    "" => {}
                    other => println!("unknown command: {other}"),
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                tracing::info!("interrupted");
                break;
            }
        }
    }

    controller.teardown().await?;
    if let Some(snapshot) = controller.last_snapshot() {
        println!("final: {}", render::snapshot_line(snapshot));
    }
    tracing::info!(%run_id, "capture client exiting");
    Ok(())
}
