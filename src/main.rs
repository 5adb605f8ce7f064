use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cgmband::{
    Broadcast, DexcomExtractor, FileSource, FilterChain, NotificationSource, Orchestrator,
    PreferenceStore, QuietWindow, RelativeDeltaProcessor, Session, Settings, StatusLineObserver,
    StdoutDisplay, StreamSource, TimeOfDayFilter,
};

#[derive(Parser, Debug)]
#[command(name = "cgmband")]
#[command(about = "Turns CGM app notifications into throttled alerts")]
struct Args {
    /// JSON file with the host's active notifications
    #[arg(short, long, default_value = "active.json", conflicts_with_all = ["connect", "stdin"])]
    file: PathBuf,

    /// Connect to a TCP endpoint streaming host events (host:port)
    #[arg(short, long, conflicts_with_all = ["file", "stdin"])]
    connect: Option<String>,

    /// Read newline-delimited host events from stdin
    #[arg(long, conflicts_with_all = ["file", "connect"])]
    stdin: bool,

    /// Settings file (TOML)
    #[arg(long, default_value = "cgmband.toml")]
    config: PathBuf,

    /// Preference store holding the alert window (overrides the settings file)
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Refresh interval in seconds (only used with --file)
    #[arg(short, long, default_value = "1")]
    refresh: u64,

    /// Process the current state once and exit (only used with --file)
    #[arg(long)]
    once: bool,

    /// Replay all active notifications after the first poll
    #[arg(long)]
    read_now: bool,

    /// Relative decrease that triggers an alert (0.1 = 10%)
    #[arg(long)]
    min_delta: Option<f64>,

    /// Relative increase that triggers an alert (0.1 = 10%)
    #[arg(long)]
    max_delta: Option<f64>,

    /// Force an alert after this many minutes
    #[arg(long)]
    max_time_diff: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Store the alert window (e.g. "08:00-20:00") and exit
    #[arg(long, value_name = "HH:MM-HH:MM", conflicts_with = "clear_quiet_window")]
    set_quiet_window: Option<String>,

    /// Disable the alert window and exit
    #[arg(long)]
    clear_quiet_window: bool,

    /// Print the stored alert window and exit
    #[arg(long)]
    show_quiet_window: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut settings = Settings::load(&args.config)
        .with_context(|| format!("Failed to load settings from {}", args.config.display()))?;
    if let Some(prefs) = &args.prefs {
        settings.preferences = prefs.clone();
    }
    if let Some(min_delta) = args.min_delta {
        settings.processor.min_delta = min_delta;
    }
    if let Some(max_delta) = args.max_delta {
        settings.processor.max_delta = max_delta;
    }
    if let Some(minutes) = args.max_time_diff {
        settings.processor.max_time_diff_minutes = minutes;
    }

    // Preference commands (non-interactive)
    if let Some(ref window) = args.set_quiet_window {
        let window = parse_window(window)?;
        let mut store = PreferenceStore::open(&settings.preferences)?;
        store.set_quiet_window(window)?;
        println!("Alert window set to {}", window);
        return Ok(());
    }
    if args.clear_quiet_window {
        let mut store = PreferenceStore::open(&settings.preferences)?;
        store.set_quiet_window(QuietWindow::default())?;
        println!("Alert window cleared");
        return Ok(());
    }
    if args.show_quiet_window {
        let store = PreferenceStore::open(&settings.preferences)?;
        let window = store.quiet_window();
        if window.is_disabled() {
            println!("No alert window set");
        } else {
            println!("{}", window);
        }
        return Ok(());
    }

    // Handle TCP connection mode
    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, &settings, &args);
    }

    if args.stdin {
        return run_with_stdin(&settings, &args);
    }

    // Default: file-based mode
    run_with_file(&args.file, &settings, &args)
}

/// Parse "HH:MM-HH:MM".
fn parse_window(s: &str) -> Result<QuietWindow> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| anyhow!("Expected HH:MM-HH:MM, got {:?}", s))?;
    let start = parse_time(start.trim())?;
    let end = parse_time(end.trim())?;
    let window = QuietWindow::new(start, end);
    if window.bounds().is_none() && !window.is_disabled() {
        bail!("Invalid alert window {:?}", s);
    }
    Ok(window)
}

fn parse_time(s: &str) -> Result<(u32, u32)> {
    let (hour, minute) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected HH:MM, got {:?}", s))?;
    Ok((hour.parse()?, minute.parse()?))
}

/// Build the filter chain from the current preferences.
fn build_filters(store: &PreferenceStore) -> FilterChain {
    let filter = TimeOfDayFilter::from_preferences(store);
    if filter.is_enabled() {
        info!("Alerts only between {}", store.quiet_window());
    }
    FilterChain::new().with(Box::new(filter))
}

fn build_session(
    source: Box<dyn NotificationSource>,
    settings: &Settings,
    store: &PreferenceStore,
) -> Session {
    let mut broadcast = Broadcast::new();
    broadcast.register(Box::new(StatusLineObserver));

    let orchestrator = Orchestrator::new(
        Box::new(DexcomExtractor::new(settings.extractor.packages.clone())),
        Box::new(RelativeDeltaProcessor::new(settings.processor.thresholds())),
        build_filters(store),
        broadcast,
        Box::new(StdoutDisplay::default()),
    )
    .with_style(settings.display.style());

    Session::new(source, orchestrator)
}

/// Run with a file-based notification source
fn run_with_file(path: &Path, settings: &Settings, args: &Args) -> Result<()> {
    let source = Box::new(FileSource::new(path));
    run_session(source, settings, args, Duration::from_secs(args.refresh), args.once)
}

/// Run with a TCP stream of host events
fn run_with_tcp(addr: &str, settings: &Settings, args: &Args) -> Result<()> {
    // Build a tokio runtime for the TCP connection
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        info!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("Connected");
                Ok(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn NotificationSource>)
            }
            Err(e) => Err(anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    // Events arrive as they are pushed, so poll quickly
    run_session(source, settings, args, Duration::from_millis(100), false)
}

/// Run with host events piped through stdin
fn run_with_stdin(settings: &Settings, args: &Args) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let source = rt.block_on(async {
        Box::new(StreamSource::spawn(tokio::io::stdin(), "stdin")) as Box<dyn NotificationSource>
    });

    run_session(source, settings, args, Duration::from_millis(100), false)
}

fn run_session(
    source: Box<dyn NotificationSource>,
    settings: &Settings,
    args: &Args,
    refresh_interval: Duration,
    once: bool,
) -> Result<()> {
    let mut store = PreferenceStore::open(&settings.preferences).with_context(|| {
        format!("Failed to open preferences {}", settings.preferences.display())
    })?;
    let mut session = build_session(source, settings, &store);
    info!("Listening on {}", session.source_description());

    session.pump();
    if args.read_now {
        session.read_now();
    }

    while !once && !session.is_finished() {
        thread::sleep(refresh_interval);

        match store.reload_if_changed() {
            Ok(true) => session.replace_filters(build_filters(&store)),
            Ok(false) => {}
            Err(e) => warn!("Keeping previous alert window: {}", e),
        }

        session.pump();
    }

    info!("Session finished: {:?}", session.stats);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window() {
        assert_eq!(
            parse_window("08:00-20:30").unwrap(),
            QuietWindow::new((8, 0), (20, 30))
        );
        assert_eq!(
            parse_window("22:00 - 7:00").unwrap(),
            QuietWindow::new((22, 0), (7, 0))
        );
        assert!(parse_window("00:00-00:00").unwrap().is_disabled());
    }

    #[test]
    fn test_parse_window_rejects_garbage() {
        assert!(parse_window("8-20").is_err());
        assert!(parse_window("08:00").is_err());
        assert!(parse_window("25:00-07:00").is_err());
    }
}
