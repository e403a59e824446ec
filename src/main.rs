//! clientkit CLI
//!
//! Entry point for the `clientkit` command-line tool.

use clap::{Parser, Subcommand};
use clientkit::config::{check_max_depth, resolve_config_path, EffectiveConfig};
use clientkit::{document, probe, ArrayMerge, ExplainOutput, Merger, StaticHost};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable supplying the platform string.
const PLATFORM_ENV_VAR: &str = "CLIENTKIT_PLATFORM";

/// Environment variable supplying the user-agent string.
const USER_AGENT_ENV_VAR: &str = "CLIENTKIT_USER_AGENT";

#[derive(Parser)]
#[command(name = "clientkit")]
#[command(about = "Record merging and client environment detection", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: $CLIENTKIT_CONFIG)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a platform and user-agent string
    Probe {
        /// Platform identifier (e.g. "Win32", "MacIntel", "X11", "iPhone")
        #[arg(long)]
        platform: Option<String>,

        /// User-agent string
        #[arg(long)]
        user_agent: Option<String>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// Merge JSON source files into a destination file and print the result
    Merge {
        /// Recurse into nested records
        #[arg(long)]
        deep: bool,

        /// Sequence strategy for deep merges (index, replace)
        #[arg(long)]
        arrays: Option<String>,

        /// Maximum nesting level for deep merges (1-4096)
        #[arg(long)]
        max_depth: Option<u64>,

        /// Emit canonical (RFC 8785) JSON
        #[arg(long)]
        canonical: bool,

        /// Also print the SHA-256 of the canonical result
        #[arg(long)]
        digest: bool,

        /// Destination JSON file
        destination: PathBuf,

        /// Source JSON files, applied left to right
        sources: Vec<PathBuf>,
    },

    /// Print the effective configuration with provenance
    Config,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config);

    match cli.command {
        Commands::Probe {
            platform,
            user_agent,
            human,
        } => {
            run_probe(&config, platform, user_agent, human);
        }
        Commands::Merge {
            deep,
            arrays,
            max_depth,
            canonical,
            digest,
            destination,
            sources,
        } => {
            run_merge(
                &config,
                MergeFlags {
                    deep,
                    arrays,
                    max_depth,
                },
                canonical,
                digest,
                &destination,
                &sources,
            );
        }
        Commands::Config => {
            run_config(&config);
        }
    }
}

/// Environment variable holding `EnvFilter` directives.
const LOG_ENV_VAR: &str = "RUST_LOG";

fn init_logging(verbose: bool) {
    let filter = log_filter(verbose, env::var(LOG_ENV_VAR).ok().as_deref());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

// Directives from RUST_LOG, else WARN. --verbose replaces the global level with DEBUG.
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let filter = directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}

fn load_config(explicit: Option<PathBuf>) -> EffectiveConfig {
    let path = resolve_config_path(explicit);
    match EffectiveConfig::build(path.as_deref(), None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}

fn run_probe(
    config: &EffectiveConfig,
    platform: Option<String>,
    user_agent: Option<String>,
    human: bool,
) {
    let defaults = config.probe_host();
    let host = StaticHost::new(
        platform
            .or_else(|| env::var(PLATFORM_ENV_VAR).ok())
            .unwrap_or(defaults.platform),
        user_agent
            .or_else(|| env::var(USER_AGENT_ENV_VAR).ok())
            .unwrap_or(defaults.user_agent),
    );
    debug!(platform = %host.platform, user_agent = %host.user_agent, "Probing host");

    let classification = probe(&host);
    let explanation =
        ExplainOutput::from_classification(&host.platform, &host.user_agent, classification);

    if human {
        println!("{}", explanation.to_human());
    } else {
        match explanation.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Merge flags that override the configured merge options.
struct MergeFlags {
    deep: bool,
    arrays: Option<String>,
    max_depth: Option<u64>,
}

fn run_merge(
    config: &EffectiveConfig,
    flags: MergeFlags,
    canonical: bool,
    digest: bool,
    destination: &Path,
    sources: &[PathBuf],
) {
    let mut options = config.merge_options();
    if flags.deep {
        options.deep = true;
    }
    if let Some(arrays) = flags.arrays {
        match arrays.parse::<ArrayMerge>() {
            Ok(a) => options.arrays = a,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }
    if let Some(max_depth) = flags.max_depth {
        match check_max_depth(max_depth) {
            Ok(d) => options.max_depth = d,
            Err(e) => {
                eprintln!("Error: --max-depth: {}", e);
                process::exit(1);
            }
        }
    }

    let merger = Merger::new(options);
    let merged = match document::merge_files(&merger, destination, sources) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error merging documents: {}", e);
            process::exit(1);
        }
    };

    match document::render(&merged, canonical) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }

    if digest {
        match document::digest(&merged) {
            Ok(hex) => println!("sha256:{}", hex),
            Err(e) => {
                eprintln!("Error computing digest: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run_config(config: &EffectiveConfig) {
    match config.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(false, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(false, Some("")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_filter_honors_env_level() {
        let filter = log_filter(false, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = log_filter(false, Some("trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_log_filter_verbose_raises_to_debug() {
        assert_eq!(log_filter(true, None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(true, Some("error")).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
