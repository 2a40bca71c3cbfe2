//! fixturecache - next fixture countdown, F1 calendar and free games.
//!
//! A small terminal front end over `fixturecache-core`. Data is served from
//! the local cache when present and fetched from the fixtures service
//! otherwise.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fixturecache_core::config::TEAM_ENV;
use fixturecache_core::utils::{format_countdown, format_date, truncate_string};
use fixturecache_core::{
    ApiClient, Category, Config, CredentialStore, FileStore, Game, Repository, ResourceCache,
    SettingsProvider,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ============================================================================
// Constants
// ============================================================================

/// Overrides the keychain token when set
const TOKEN_ENV: &str = "FIXTURECACHE_TOKEN";

/// Also write logs to `<cache dir>/fixturecache.log` when set
const LOG_FILE_ENV: &str = "FIXTURECACHE_LOG_FILE";

const LOG_FILE_NAME: &str = "fixturecache.log";

/// Column width for titles in list output
const TITLE_WIDTH: usize = 40;

const USAGE: &str = "\
Usage: fixturecache [COMMAND]

Commands:
  next               Next fixture and countdown (default)
  fixtures           Upcoming fixtures for the selected team
  races [COUNTRY]    F1 calendar, optionally for one country
  free-games         Free Epic Games Store titles
  status             Selected team, token and cache ages
  clear              Delete all cached data
  team <NAME>        Select the team to follow
  login <TOKEN>      Store the API token in the OS keychain
  logout             Remove the stored API token

Environment:
  FIXTURECACHE_TEAM, FIXTURECACHE_API_URL, FIXTURECACHE_TOKEN,
  FIXTURECACHE_LOG_FILE, RUST_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Next,
    Fixtures,
    Races(Option<String>),
    FreeGames,
    Status,
    Clear,
    Team(String),
    Login(String),
    Logout,
    Help,
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let mut args = args.iter().map(String::as_str);
    let command = match args.next() {
        None | Some("next") => Command::Next,
        Some("fixtures") => Command::Fixtures,
        Some("races") => Command::Races(args.next().map(str::to_string)),
        Some("free-games") => Command::FreeGames,
        Some("status") => Command::Status,
        Some("clear") => Command::Clear,
        Some("team") => match args.next() {
            Some(name) if !name.trim().is_empty() => Command::Team(name.trim().to_string()),
            _ => return Err("team requires a name".to_string()),
        },
        Some("login") => match args.next() {
            Some(token) => Command::Login(token.to_string()),
            None => return Err("login requires a token".to_string()),
        },
        Some("logout") => Command::Logout,
        Some("help") | Some("-h") | Some("--help") => Command::Help,
        Some(other) => return Err(format!("Unknown command: {}", other)),
    };
    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument: {}", extra));
    }
    Ok(command)
}

/// Initialize the tracing subscriber for logging.
/// The returned guard must stay alive for file logs to be flushed.
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(io::stderr);

    if std::env::var_os(LOG_FILE_ENV).is_some() {
        let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(filter)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(filter)
            .init();
        None
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    let (mut config, config_error) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let cache_dir = config
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"));

    let _log_guard = init_tracing(&cache_dir);
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(?command, ?cache_dir, "fixturecache starting");

    match command {
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Command::Login(token) => {
            CredentialStore::store_token(&token)?;
            println!("API token saved to the system keychain.");
            return Ok(());
        }
        Command::Logout => {
            CredentialStore::delete()?;
            println!("API token removed.");
            return Ok(());
        }
        _ => {}
    }

    let cache = ResourceCache::new(FileStore::new(cache_dir)?);

    if let Command::Team(name) = &command {
        config.team = Some(name.clone());
    }
    // Resolved team, so an environment override counts as a switch too
    let team = config.team();
    let team_changed = config.record_cached_team(&team);
    if team_changed {
        info!(team = %team, "Team changed, dropping cached fixtures");
        cache.remove::<Game>()?;
    }

    if let Command::Team(name) = &command {
        config.save().context("Failed to save config")?;
        let saved = name.to_lowercase();
        if team == saved {
            println!("Now following {}.", team);
        } else {
            println!(
                "Saved {}, but {} is set; following {}.",
                saved, TEAM_ENV, team
            );
        }
        return Ok(());
    }
    if team_changed {
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to record cached team");
        }
    }

    let mut api = ApiClient::new().context("Failed to create API client")?;
    match std::env::var(TOKEN_ENV).ok().or_else(|| CredentialStore::token().ok()) {
        Some(token) => api.set_token(token),
        None => warn!("No API token configured; requests will be unauthenticated"),
    }

    let api_url = config.api_url();
    let repo = Repository::new(api, config, cache, api_url);

    run(&repo, command).await
}

async fn run(repo: &Repository<ApiClient, Config>, command: Command) -> Result<()> {
    match command {
        Command::Next => match repo.next_fixture().await? {
            Some(next) => {
                let game = &next.game;
                println!("{} vs {}", repo.team(), game.opponent_display());
                if let Some(competition) = &game.competition {
                    println!("{}", competition);
                }
                if let Some(stadium) = &game.stadium {
                    println!("{}", stadium);
                }
                println!("{} at {}", game.formatted_date(), game.formatted_time());
                if next.has_started() {
                    println!("Match in progress");
                } else {
                    println!("Kickoff in {}", format_countdown(next.until_kickoff));
                }
            }
            None => println!("No upcoming fixtures for {}", repo.team()),
        },
        Command::Fixtures => {
            let games = repo.load_football_games().await?;
            if games.is_empty() {
                println!("No upcoming fixtures for {}", repo.team());
            }
            for game in &games {
                println!(
                    "{:<16} {:>5}  {:<width$}  {}",
                    game.formatted_date(),
                    game.formatted_time(),
                    truncate_string(game.opponent_display(), TITLE_WIDTH),
                    game.competition.as_deref().unwrap_or(""),
                    width = TITLE_WIDTH
                );
            }
        }
        Command::Races(country) => {
            let races = match country.as_deref() {
                Some(country) => repo.load_races_in(country).await?,
                None => repo.load_races().await?,
            };
            if races.is_empty() {
                println!("No races found");
            }
            for race in &races {
                println!(
                    "{:<13} {:<width$}  {}",
                    race.date.as_deref().map(format_date).unwrap_or_else(|| "TBD".to_string()),
                    truncate_string(&race.name, TITLE_WIDTH),
                    race.location(),
                    width = TITLE_WIDTH
                );
            }
        }
        Command::FreeGames => {
            let games = repo.load_epic_games().await?;
            if games.is_empty() {
                println!("No free games listed");
            }
            for game in &games {
                println!(
                    "{:<width$}  {}",
                    truncate_string(&game.title, TITLE_WIDTH),
                    game.availability(),
                    width = TITLE_WIDTH
                );
            }
        }
        Command::Status => {
            let ages = repo.cache().ages();
            println!("Team: {}", repo.team());
            let token = if std::env::var_os(TOKEN_ENV).is_some() {
                "from environment"
            } else if CredentialStore::has_token() {
                "stored in keychain"
            } else {
                "none"
            };
            println!("Token: {}", token);
            for category in Category::ALL {
                println!("{:<11} {}", format!("{}:", category), ages.get(category));
            }
        }
        Command::Clear => {
            repo.cache().clear()?;
            println!("Cache cleared.");
        }
        Command::Help | Command::Team(_) | Command::Login(_) | Command::Logout => {}
    }
    Ok(())
}
