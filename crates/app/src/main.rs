use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use services::{
    Clock, ConfigError, FeedConfig, LiveFeed, LiveFeedPoller, ModuleConfig, ModuleService,
    UsgsFeedSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod console;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownSubcommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    Config(ConfigError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownSubcommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ConfigError> for ArgsError {
    fn from(err: ConfigError) -> Self {
        ArgsError::Config(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- module [--name <learner>] [feed options]");
    eprintln!("  cargo run -p app -- feed   [--once] [feed options]");
    eprintln!();
    eprintln!("Feed options:");
    eprintln!("  --feed-url <url>          GeoJSON summary feed (default: USGS 2.5_day)");
    eprintln!("  --min-magnitude <mag>     Minimum magnitude to show (default: 2.5)");
    eprintln!("  --refresh-secs <secs>     Refresh interval (default: 300)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUAKE_FEED_URL, QUAKE_MIN_MAGNITUDE, QUAKE_REFRESH_SECS, QUAKE_LEARNER_NAME");
    eprintln!("  RUST_LOG controls log output (written to stderr)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Module,
    Feed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "module" => Some(Self::Module),
            "feed" => Some(Self::Feed),
            _ => None,
        }
    }

    fn default_log_filter(self) -> &'static str {
        match self {
            // Keep log lines out of the interactive quiz unless asked for.
            Command::Module => "warn",
            Command::Feed => "info",
        }
    }
}

struct Args {
    feed: FeedConfig,
    learner_name: Option<String>,
    once: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut feed = FeedConfig::default();
        if let Ok(url) = std::env::var("QUAKE_FEED_URL") {
            feed = feed.with_endpoint(&url)?;
        }
        if let Ok(raw) = std::env::var("QUAKE_MIN_MAGNITUDE") {
            feed = feed.with_min_magnitude(parse_number("QUAKE_MIN_MAGNITUDE", raw)?);
        }
        if let Ok(raw) = std::env::var("QUAKE_REFRESH_SECS") {
            let secs: u64 = parse_number("QUAKE_REFRESH_SECS", raw)?;
            feed = feed.with_refresh_interval(Duration::from_secs(secs));
        }
        let mut learner_name = std::env::var("QUAKE_LEARNER_NAME").ok();
        let mut once = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--feed-url" => {
                    let value = require_value(args, "--feed-url")?;
                    feed = feed.with_endpoint(&value)?;
                }
                "--min-magnitude" => {
                    let value = require_value(args, "--min-magnitude")?;
                    feed = feed.with_min_magnitude(parse_number("--min-magnitude", value)?);
                }
                "--refresh-secs" => {
                    let value = require_value(args, "--refresh-secs")?;
                    let secs: u64 = parse_number("--refresh-secs", value)?;
                    feed = feed.with_refresh_interval(Duration::from_secs(secs));
                }
                "--name" => learner_name = Some(require_value(args, "--name")?),
                "--once" => once = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        feed.validate()?;
        Ok(Self {
            feed,
            learner_name,
            once,
        })
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn start_feed(config: &FeedConfig, clock: Clock) -> Result<LiveFeedPoller, Box<dyn std::error::Error>> {
    let source = Arc::new(UsgsFeedSource::new(config)?);
    let feed = LiveFeed::new(source, config.query(), clock);
    Ok(LiveFeedPoller::start(feed, config.refresh_interval))
}

/// Split off the subcommand. `Ok(None)` means help was requested.
fn split_command(mut argv: Vec<String>) -> Result<Option<(Command, Vec<String>)>, ArgsError> {
    // Default behavior: the interactive module when no subcommand is provided.
    match argv.first().map(String::as_str) {
        Some("--help" | "-h") => Ok(None),
        Some(first) if !first.starts_with("--") => {
            let cmd = Command::from_arg(first)
                .ok_or_else(|| ArgsError::UnknownSubcommand(first.to_owned()))?;
            argv.remove(0);
            Ok(Some((cmd, argv)))
        }
        _ => Ok(Some((Command::Module, argv))),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    // Errors are reported once by `main`; here we only add the usage text.
    let parsed = split_command(argv).and_then(|split| {
        split
            .map(|(cmd, rest)| Args::parse(&mut rest.into_iter()).map(|args| (cmd, args)))
            .transpose()
    });
    let (cmd, parsed) = match parsed {
        Ok(Some(found)) => found,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            print_usage();
            return Err(err.into());
        }
    };

    init_tracing(cmd.default_log_filter());
    info!(
        command = ?cmd,
        endpoint = %parsed.feed.endpoint,
        refresh_secs = parsed.feed.refresh_interval.as_secs(),
        "starting"
    );
    let clock = Clock::default_clock();
    let poller = start_feed(&parsed.feed, clock)?;

    match cmd {
        Command::Module => {
            let config = ModuleConfig::earthquake().with_learner_name(parsed.learner_name);
            let mut module = ModuleService::start(config, clock);
            console::run_module(&mut module, poller.feed()).await?;
        }
        Command::Feed => {
            console::watch_feed(poller.feed(), parsed.once).await;
        }
    }

    drop(poller);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| (*a).to_owned()).collect()
    }

    #[test]
    fn missing_subcommand_defaults_to_module() {
        let (cmd, rest) = split_command(argv(&["--name", "Ana"])).unwrap().unwrap();
        assert_eq!(cmd, Command::Module);
        assert_eq!(rest, ["--name", "Ana"]);

        let (cmd, rest) = split_command(Vec::new()).unwrap().unwrap();
        assert_eq!(cmd, Command::Module);
        assert!(rest.is_empty());
    }

    #[test]
    fn subcommand_is_removed_from_the_flags() {
        let (cmd, rest) = split_command(argv(&["feed", "--once"])).unwrap().unwrap();
        assert_eq!(cmd, Command::Feed);
        assert_eq!(rest, ["--once"]);
    }

    #[test]
    fn help_and_unknown_subcommands() {
        assert!(split_command(argv(&["-h"])).unwrap().is_none());

        let err = split_command(argv(&["quiz"])).unwrap_err();
        assert!(matches!(err, ArgsError::UnknownSubcommand(ref cmd) if cmd == "quiz"));
        assert_eq!(err.to_string(), "unknown subcommand: quiz");
    }

    #[test]
    fn bad_flag_value_names_the_flag() {
        let err = Args::parse(&mut argv(&["--min-magnitude", "big"]).into_iter())
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "invalid --min-magnitude value: big");
    }
}
