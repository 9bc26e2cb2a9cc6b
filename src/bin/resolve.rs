//! Command-line front end for redirect resolution and cache administration.
//!
//! Uses the same configuration as the server (environment variables and
//! `.env`), so it sees the same cache store and tracker rules.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a link
//! cargo run --bin resolve -- url https://bit.ly/abc
//!
//! # Resolve through the remote resolver, bypassing the cache
//! cargo run --bin resolve -- url https://t.co/xyz --remote --no-cache
//!
//! # Override RESOLVE_USE_REMOTE=true / RESOLVE_ONLY_KNOWN_TRACKERS=true
//! cargo run --bin resolve -- url https://example.com/page --local --all-urls
//!
//! # Is this URL covered by the tracker rules?
//! cargo run --bin resolve -- rules check https://lnkd.in/foo
//!
//! # Inspect and prune the cache
//! cargo run --bin resolve -- cache list --page 2
//! cargo run --bin resolve -- cache get https://bit.ly/abc
//! cargo run --bin resolve -- cache delete https://bit.ly/abc
//! cargo run --bin resolve -- cache clear -y
//! ```
//!
//! Without `DATABASE_URL` the cache lives in memory and `cache` commands only
//! see entries written by the same invocation.

use redirect_resolver::config;
use redirect_resolver::server;
use redirect_resolver::state::AppState;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Resolve shortened and tracker links to their destination.
#[derive(Parser)]
#[command(name = "resolve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Resolve a URL
    Url {
        url: String,

        #[command(flatten)]
        flags: ResolveFlags,

        /// Timeout in milliseconds (default: RESOLVE_TIMEOUT_MS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=120_000))]
        timeout_ms: Option<u64>,
    },

    /// Inspect the tracker rule set
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Manage the resolved redirect cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Overrides of the `RESOLVE_*` defaults; the later of a pair wins.
#[derive(Args, Debug, Default)]
struct ResolveFlags {
    /// Read from and write back to the cache
    #[arg(long, overrides_with = "no_cache")]
    cache: bool,

    /// Skip the cache for both lookup and write-back
    #[arg(long, overrides_with = "cache")]
    no_cache: bool,

    /// Leave URLs unresolved unless they match a tracker rule
    #[arg(long, overrides_with = "all_urls")]
    only_trackers: bool,

    /// Resolve every URL, tracker or not
    #[arg(long, overrides_with = "only_trackers")]
    all_urls: bool,

    /// Ask the remote resolver instead of following redirects locally
    #[arg(long, overrides_with = "local")]
    remote: bool,

    /// Follow redirects locally
    #[arg(long, overrides_with = "remote")]
    local: bool,
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl ResolveFlags {
    fn local_cache(&self) -> Option<bool> {
        toggle(self.cache, self.no_cache)
    }

    fn only_known_trackers(&self) -> Option<bool> {
        toggle(self.only_trackers, self.all_urls)
    }

    fn external_service(&self) -> Option<bool> {
        toggle(self.remote, self.local)
    }
}

#[derive(Subcommand)]
enum RulesAction {
    /// Report whether a URL matches the tracker rules
    Check { url: String },
}

/// Cache administration subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// List cached resolutions, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 25)]
        page_size: u32,
    },

    /// Show the cached resolution of a URL
    Get { url: String },

    /// Remove the cached resolution of a URL
    Delete { url: String },

    /// Remove all cached resolutions
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_from_env()?;

    match cli.command {
        Commands::Url {
            url,
            flags,
            timeout_ms,
        } => {
            let state = server::build_state(&config).await?;
            resolve_url(&state, url, &flags, timeout_ms).await?;
        }
        Commands::Rules {
            action: RulesAction::Check { url },
        } => {
            let rules = server::load_tracker_rules(&config)?;
            if rules.is_tracker(&url) {
                println!("{} {}", "TRACKER".green().bold(), url.cyan());
            } else {
                println!("{} {}", "NOT A TRACKER".yellow().bold(), url.cyan());
            }
        }
        Commands::Cache { action } => {
            if config.database_url.is_none() {
                println!(
                    "{}",
                    "No DATABASE_URL configured, the cache is empty in-memory storage".yellow()
                );
            }
            let state = server::build_state(&config).await?;
            handle_cache_action(&state, action).await?;
        }
    }

    Ok(())
}

async fn resolve_url(
    state: &AppState,
    url: String,
    flags: &ResolveFlags,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let request = state.defaults.request(
        url,
        flags.local_cache(),
        flags.only_known_trackers(),
        flags.external_service(),
        timeout_ms.map(Duration::from_millis),
    );

    if request.external_service && !state.remote_available {
        anyhow::bail!("Remote resolution requires REMOTE_RESOLVER_URL to be set");
    }

    let outcome = state
        .redirect_follower
        .follow_redirects(&request, &state.tracker_rules)
        .await
        .with_context(|| format!("Failed to resolve {}", request.url))?;

    let kind = outcome.kind().as_str();
    let label = if outcome.is_not_resolved() {
        kind.yellow()
    } else {
        kind.green()
    };

    println!("  {} {}", "URL:     ".bright_white().bold(), request.url.cyan());
    println!("  {} {}", "Resolved:".bright_white().bold(), outcome.resolved_url().bright_green());
    println!("  {} {}", "Source:  ".bright_white().bold(), label);

    Ok(())
}

/// Dispatches cache administration commands.
async fn handle_cache_action(state: &AppState, action: CacheAction) -> Result<()> {
    let service = &state.resolved_redirect_service;

    match action {
        CacheAction::List { page, page_size } => {
            let page = service.list(Some(page), Some(page_size)).await?;

            if page.items.is_empty() {
                println!("{}", "  No cached resolutions".yellow());
                return Ok(());
            }

            println!(
                "  {:<17} {:<45} {}",
                "Created".bright_white().bold(),
                "URL".bright_white().bold(),
                "Resolved".bright_white().bold()
            );
            println!("  {}", "-".repeat(100).bright_black());

            for entry in &page.items {
                println!(
                    "  {:<17} {:<45} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
                    entry.short_url.cyan(),
                    entry.resolved_url
                );
            }

            println!();
            println!(
                "  Page {} ({} per page), total: {}",
                page.page,
                page.page_size,
                page.total.to_string().bright_white().bold()
            );
        }
        CacheAction::Get { url } => {
            let entry = service.get(&url).await?;
            println!("  {} {}", "URL:     ".bright_white().bold(), entry.short_url.cyan());
            println!(
                "  {} {}",
                "Resolved:".bright_white().bold(),
                entry.resolved_url.bright_green()
            );
            println!(
                "  {} {}",
                "Cached:  ".bright_white().bold(),
                entry.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        CacheAction::Delete { url } => {
            service.delete(&url).await?;
            println!("{}", "Cache entry removed".green().bold());
        }
        CacheAction::Clear { yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Remove all cached resolutions?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "Cancelled".red());
                    return Ok(());
                }
            }

            let removed = service.clear().await?;
            println!(
                "{} {}",
                "Removed".green().bold(),
                format!("{} entries", removed).bright_white()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use redirect_resolver::domain::resolution::ResolveDefaults;

    fn url_flags(args: &[&str]) -> ResolveFlags {
        let mut argv = vec!["resolve", "url", "https://bit.ly/abc"];
        argv.extend_from_slice(args);

        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Url { flags, .. } => flags,
            _ => panic!("expected the url command"),
        }
    }

    #[test]
    fn test_no_flags_keep_configured_defaults() {
        let flags = url_flags(&[]);
        assert_eq!(flags.local_cache(), None);
        assert_eq!(flags.only_known_trackers(), None);
        assert_eq!(flags.external_service(), None);
    }

    #[test]
    fn test_flags_switch_options_off() {
        let flags = url_flags(&["--no-cache", "--all-urls", "--local"]);
        assert_eq!(flags.local_cache(), Some(false));
        assert_eq!(flags.only_known_trackers(), Some(false));
        assert_eq!(flags.external_service(), Some(false));

        let defaults = ResolveDefaults {
            only_known_trackers: true,
            external_service: true,
            ..ResolveDefaults::default()
        };
        let request = defaults.request(
            "https://bit.ly/abc",
            flags.local_cache(),
            flags.only_known_trackers(),
            flags.external_service(),
            None,
        );
        assert!(!request.local_cache);
        assert!(!request.only_known_trackers);
        assert!(!request.external_service);
    }

    #[test]
    fn test_flags_switch_options_on() {
        let flags = url_flags(&["--cache", "--only-trackers", "--remote"]);
        assert_eq!(flags.local_cache(), Some(true));
        assert_eq!(flags.only_known_trackers(), Some(true));
        assert_eq!(flags.external_service(), Some(true));
    }

    #[test]
    fn test_last_flag_of_a_pair_wins() {
        let flags = url_flags(&["--remote", "--local"]);
        assert_eq!(flags.external_service(), Some(false));

        let flags = url_flags(&["--no-cache", "--cache"]);
        assert_eq!(flags.local_cache(), Some(true));
    }
}
