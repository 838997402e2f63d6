//! Command-line client for the Waypoint memory journal.

use anyhow::{Context, bail};
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use waypoint_rs::config::{LayeredConfigOptions, WaypointConfig};
use waypoint_rs::core::RemoteOutcome;
use waypoint_rs::protocol::{
    Draft, EventSink, Location, MediaItem, Record, SortOrder, SyncEvent,
};
use waypoint_rs::{Waypoint, WaypointOptions};

/// Command-line options for the Waypoint client.
#[derive(Parser)]
#[command(name = "waypoint", version)]
struct Cli {
    /// Runtime config layer applied over the user and project layers
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Owner id to sync as, overriding the configured identity
    #[arg(long, global = true)]
    owner: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List memories
    List {
        #[arg(long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,
    },
    /// Create a memory
    Add {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit an existing memory
    Edit {
        id: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lng: Option<f64>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete one memory
    Delete { id: String },
    /// Delete every memory on this device and in the cloud
    DeleteAll,
    /// Fetch cloud memories and reconcile them with local ones
    Sync,
    /// Export memories as JSON
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    note: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    location_name: Option<String>,
    /// Image file to attach (repeatable)
    #[arg(long = "image")]
    images: Vec<PathBuf>,
    /// Video file to attach (repeatable)
    #[arg(long = "video")]
    videos: Vec<PathBuf>,
}

impl FieldArgs {
    fn media(&self) -> Vec<MediaItem> {
        self.images
            .iter()
            .map(|path| MediaItem::image(path.display().to_string()))
            .chain(
                self.videos
                    .iter()
                    .map(|path| MediaItem::video(path.display().to_string())),
            )
            .collect()
    }

    /// Apply given fields over `draft`; media is replaced only when provided.
    fn apply(self, mut draft: Draft) -> Draft {
        let media = self.media();
        if !media.is_empty() {
            draft.media = media;
        }
        let attributes = &mut draft.attributes;
        attributes.title = self.title.or(attributes.title.take());
        attributes.note = self.note.or(attributes.note.take());
        attributes.description = self.description.or(attributes.description.take());
        attributes.date = self.date.or(attributes.date.take());
        attributes.location_name = self.location_name.or(attributes.location_name.take());
        draft
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    Oldest,
    Title,
    Location,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Newest => SortOrder::Newest,
            SortArg::Oldest => SortOrder::Oldest,
            SortArg::Title => SortOrder::Title,
            SortArg::Location => SortOrder::Location,
        }
    }
}

/// Prints cloud problems to stderr; local results are printed by commands.
struct StderrSink;

impl EventSink for StderrSink {
    fn emit(&self, event: SyncEvent) {
        match event {
            SyncEvent::CloudSyncFailed { message, .. } => {
                eprintln!("warning: cloud sync failed: {message}");
            }
            SyncEvent::CloudUnavailable { reason } => {
                eprintln!("warning: cloud unavailable, working offline: {reason}");
            }
            _ => {}
        }
    }
}

/// Entry point for the Waypoint CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    waypoint_rs::init_logging();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        options = options.with_runtime_path(path);
    }
    let layered = WaypointConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let mut config = layered.config;
    if let Some(owner) = cli.owner {
        config.identity.owner_id = Some(owner);
    }

    let waypoint = Waypoint::open_with(
        config,
        WaypointOptions {
            event_sink: Some(Arc::new(StderrSink)),
            ..WaypointOptions::default()
        },
    )
    .context("failed to open waypoint")?;
    run(&waypoint, cli.command).await
}

async fn run(waypoint: &Waypoint, command: Command) -> anyhow::Result<()> {
    let orchestrator = waypoint.orchestrator();
    match command {
        Command::List { sort } => {
            waypoint.start().await.context("failed to load memories")?;
            for record in orchestrator.list_sorted(sort.into()).await {
                println!("{}", summary_line(&record));
            }
        }
        Command::Add { lat, lng, fields } => {
            waypoint.start().await.context("failed to load memories")?;
            let draft = fields.apply(Draft::new(Location::new(lat, lng)));
            save(waypoint, draft).await?;
        }
        Command::Edit {
            id,
            lat,
            lng,
            fields,
        } => {
            waypoint.start().await.context("failed to load memories")?;
            let Some(existing) = orchestrator
                .list()
                .await
                .into_iter()
                .find(|record| record.id == id)
            else {
                bail!("no memory with id {id}");
            };
            let location = Location::new(
                lat.unwrap_or(existing.location.latitude),
                lng.unwrap_or(existing.location.longitude),
            );
            let mut draft = Draft::editing(existing.id.clone(), location);
            draft.media = existing.media.clone();
            draft.attributes = existing.attributes.clone();
            save(waypoint, fields.apply(draft)).await?;
        }
        Command::Delete { id } => {
            waypoint.start().await.context("failed to load memories")?;
            let task = orchestrator
                .delete(&id)
                .await
                .context("failed to delete memory")?;
            task.wait().await?;
            println!("Deleted {id}.");
        }
        Command::DeleteAll => {
            waypoint.start().await.context("failed to load memories")?;
            let report = orchestrator
                .delete_all()
                .await
                .context("failed to delete memories")?;
            match report.remote_removed {
                Some(remote) => println!(
                    "Deleted {} local and {} cloud memories.",
                    report.local_removed, remote
                ),
                None => println!("Deleted {} local memories.", report.local_removed),
            }
        }
        Command::Sync => {
            orchestrator.load_local().await;
            let outcome = orchestrator
                .sync_remote()
                .await
                .context("failed to reconcile memories")?;
            info!("sync finished (outcome={:?})", outcome);
            println!("{outcome:?}");
        }
        Command::Export { out } => {
            waypoint.start().await.context("failed to load memories")?;
            let path = orchestrator
                .export(&out, Local::now().date_naive())
                .await
                .context("failed to export memories")?;
            println!("Exported to {}.", path.display());
        }
    }
    Ok(())
}

async fn save(waypoint: &Waypoint, draft: Draft) -> anyhow::Result<()> {
    let receipt = waypoint
        .orchestrator()
        .save(draft)
        .await
        .context("failed to save memory")?;
    let id = receipt.record.id.clone();
    let status = receipt.status;
    if let RemoteOutcome::Failed(message) = receipt.remote.wait().await? {
        debug!("remote upsert failed after save (id={}): {}", id, message);
    }
    println!("{} ({id})", status.message());
    Ok(())
}

fn summary_line(record: &Record) -> String {
    let when = DateTime::from_timestamp_millis(record.created_at)
        .map(|time| time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| record.created_at.to_string());
    let title = record.attributes.title.as_deref().unwrap_or("(untitled)");
    let place = record
        .attributes
        .location_name
        .clone()
        .unwrap_or_else(|| {
            format!(
                "{:.5},{:.5}",
                record.location.latitude, record.location.longitude
            )
        });
    let mut line = format!(
        "{}  {}  {:<5}  {}  [{}]  media={}",
        record.id,
        when,
        record.kind().as_str(),
        title,
        place,
        record.media.len()
    );
    if let Some(preview) = record.thumbnail() {
        line.push_str(&format!("  preview={}", preview.uri));
    }
    line
}
