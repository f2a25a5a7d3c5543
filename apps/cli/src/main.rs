use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Parser;
use console::style;
use figlytics_core::{ClientConfig, Figlytics, HostSignal};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use crate::{
    host::CliHost,
    input::{load_events_file, parse_event_arg},
    storage::{FileStorage, get_root_data_dir, get_storage_path},
};

mod host;
mod input;
mod storage;

#[derive(Parser)]
#[command(name = "figlytics")]
#[command(about = "Play a plugin session and send its events to the figlytics ingestion API")]
struct Cli {
    /// Events to record, as `name` or `name={"json":"data"}`
    events: Vec<String>,

    /// JSON-lines file with `{"name": ..., "data": ...}` per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Ingestion base URL (overrides FIGLYTICS_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Project public key (overrides FIGLYTICS_PROJECT_KEY)
    #[arg(short = 'k', long)]
    project_key: Option<String>,

    /// Use this customer id instead of the stored one
    #[arg(short, long)]
    customer_id: Option<String>,

    /// Log every recorded and sent event
    #[arg(short, long)]
    debug: bool,

    /// Do not emit plugin_started / plugin_closed
    #[arg(long)]
    no_lifecycle: bool,

    /// Where client storage lives. Defaults to the user data directory.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[arg(long)]
    plugin_id: Option<String>,

    #[arg(long)]
    document: Option<String>,

    #[arg(long, default_value = "")]
    page: String,

    #[arg(long, default_value = "figma")]
    editor_type: String,

    /// Payments status; payments are treated as disabled when omitted
    #[arg(long)]
    payments_status: Option<String>,

    #[arg(long, default_value_t = 0)]
    elements: usize,

    #[arg(long, default_value_t = 0)]
    selected: usize,
}

impl Cli {
    fn host(&self) -> CliHost {
        CliHost {
            plugin_id: self.plugin_id.clone(),
            document_name: self.document.clone(),
            page_name: self.page.clone(),
            editor_type: Some(self.editor_type.clone()),
            payments_status: self.payments_status.clone(),
            page_element_count: self.elements,
            selection_count: self.selected,
        }
    }

    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(key) = &self.project_key {
            config = config.with_project_public_key(key);
        }
        if let Some(id) = &self.customer_id {
            config = config.with_customer_id(id);
        }
        if self.debug {
            config = config.with_debug(true);
        }
        config
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut events = Vec::new();
    if let Some(path) = &cli.file {
        events.extend(load_events_file(path).await?);
    }
    for arg in &cli.events {
        events.push(parse_event_arg(arg)?);
    }

    println!(
        "\n{}  {}\n",
        style("figlytics").cyan().bold(),
        style("Plugin Telemetry").dim()
    );

    let data_dir = cli.storage_dir.clone().unwrap_or_else(get_root_data_dir);
    let storage = Arc::new(FileStorage::new(get_storage_path(&data_dir)));

    let config = cli.config().on_initialize(|| {
        println!("{} Client initialized", style("✓").green().bold());
    });
    println!(
        "{} Endpoint: {}",
        style("✓").green().bold(),
        style(config.events_url()).dim()
    );

    let client = Figlytics::new(Arc::new(cli.host()), storage, config)?;
    let started = Instant::now();

    if !cli.no_lifecycle {
        client.signal(HostSignal::Run);
    }
    for event in &events {
        client.record_event(event.name.as_str(), &event.data);
    }
    if !cli.no_lifecycle {
        client.signal(HostSignal::Close);
    }

    let pending = client.pending_events().await.unwrap_or(0);
    println!(
        "{} Recorded {} events {}",
        style("✓").green().bold(),
        events.len(),
        style(format!("({pending} still queued)")).dim()
    );

    let spinner = create_spinner("Sending events...");
    client.shutdown().await;
    spinner.finish_with_message(format!(
        "{} Done {}",
        style("✓").green().bold(),
        style(format!("[{}]", format_duration(started.elapsed()))).dim()
    ));

    println!(
        "\n{} {}\n",
        style("Storage:").dim(),
        style(data_dir.display()).cyan()
    );

    Ok(())
}
