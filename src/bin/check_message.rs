//! Check binary - classifies text against the profanity database without touching YouTube
//!
//! Usage:
//!   cargo run --bin check -- "some message" "another one"
//!   echo "a line per message" | cargo run --bin check
//!
//! Prints `FLAGGED` or `ok` for every message and exits with status 1 if
//! anything was flagged.
//!
//! Settings come from the config file (CONFIG_PATH, defaults to config.json)
//! when it exists. Optional overrides:
//! - PROFANITY_DATABASE (defaults to data/profanity.json)
//! - MIN_SEVERITY (defaults to mild)

use anyhow::{Context, Result};
use livechat_moderator::config::{self, Config};
use livechat_moderator::profanity::Filter;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

/// Database path and threshold, taken from env, then config file, then defaults
struct CheckConfig {
    profanity_database: String,
    min_severity: String,
}

impl CheckConfig {
    fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());

        let (file_database, file_severity) = if Path::new(&config_path).exists() {
            let config = Config::load(&config_path)?;
            (config.profanity_database, config.min_severity)
        } else {
            debug!("No config file at {}, using defaults", config_path);
            (
                config::DEFAULT_PROFANITY_DATABASE.to_string(),
                config::DEFAULT_MIN_SEVERITY.to_string(),
            )
        };

        Ok(Self {
            profanity_database: std::env::var("PROFANITY_DATABASE").unwrap_or(file_database),
            min_severity: std::env::var("MIN_SEVERITY").unwrap_or(file_severity),
        })
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Log to stderr so stdout stays one verdict per line
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("check=info".parse()?),
        )
        .init();

    let check_config = CheckConfig::load()?;
    let filter = Filter::from_file_with_severity_str(
        &check_config.profanity_database,
        &check_config.min_severity,
    )
    .with_context(|| format!("Failed to build filter from {}", check_config.profanity_database))?;

    info!(
        "Checking against {} words (min severity {})",
        filter.effective_word_count(),
        filter.min_severity()
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let messages: Vec<String> = if args.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<_, _>>()
            .context("Failed to read messages from stdin")?
    } else {
        args
    };

    let mut flagged = 0;
    for message in &messages {
        match filter.find_match(message) {
            Some(hit) => {
                flagged += 1;
                println!("FLAGGED\t{}\t[{}: {}]", message, hit.language, hit.word);
            }
            None => println!("ok\t{}", message),
        }
    }

    info!("{}/{} messages flagged", flagged, messages.len());

    if flagged > 0 {
        std::process::exit(1);
    }
    Ok(())
}
