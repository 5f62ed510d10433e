use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use draft_stats::calculate::{
    aggregate, analyze_counters, analyze_pairings, analyze_timing, effect_rows, entity_rows,
    sort_effects, sort_entities, sort_timing, EffectSortKey, EntitySortKey, SortDirection, SortKey,
    TimingSortKey,
};
use draft_stats::config::AppConfig;
use draft_stats::models::{Catalog, EntityId, Side, StageFilter};
use draft_stats::storage::{load_catalog, load_store, StorageConfig};
use draft_stats::store::DraftStore;

#[derive(Parser)]
#[command(name = "draft-stats")]
#[command(about = "Pick/ban statistics for tournament drafts")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print overall, entity and effect statistics
    Report {
        /// Stages to include (comma-separated, default all)
        #[arg(long)]
        stages: Option<String>,

        /// Entity table sort key
        #[arg(long, default_value = "name")]
        sort: String,

        /// Sort direction (asc or desc, default depends on the key)
        #[arg(long)]
        dir: Option<String>,

        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },

    /// Show entities picked alongside a focus entity
    Pairings {
        /// Focus entity id
        id: String,

        #[arg(long)]
        stages: Option<String>,

        /// Number of partners to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show response picks and matchups against a focus entity
    Counters {
        /// Focus entity id
        id: String,

        #[arg(long)]
        stages: Option<String>,

        /// Number of rows per list
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show average pick/ban positions
    Timing {
        #[arg(long)]
        stages: Option<String>,

        #[arg(long, default_value = "name")]
        sort: String,

        #[arg(long)]
        dir: Option<String>,
    },

    /// List catalog entities and effects
    Catalog,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = PathBuf::from(&cli.config);
    let mut config = if path.exists() {
        AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        tracing::debug!("No config file at {}, using defaults", path.display());
        AppConfig::default()
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    Ok(config)
}

fn load_inputs(config: &AppConfig) -> Result<(DraftStore, Catalog)> {
    let storage = StorageConfig::new(config.data_dir.clone());
    let catalog = load_catalog(&storage, &config.catalog.groups)
        .context("Failed to load entity catalog")?;
    let store = load_store(&storage).context("Failed to load drafts")?;
    Ok((store, catalog))
}

fn direction_for<K: SortKey>(key: K, dir: Option<&str>) -> Result<SortDirection> {
    match dir {
        Some(d) => Ok(d.parse()?),
        None => Ok(key.default_direction()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn pct(rate: Option<f64>) -> String {
    rate.map_or_else(|| "N/A".to_string(), |r| format!("{:.1}%", r))
}

fn position(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}", v))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting draft-stats v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Serve { host, port } => {
            let (store, catalog) = load_inputs(&config)?;
            let state = draft_stats::api::state::AppState::new(
                store,
                catalog,
                config.analysis.clone(),
            )
            .with_cors_origin(config.server.cors_origin.clone());
            let app = draft_stats::api::build_router(state);

            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Report {
            stages,
            sort,
            dir,
            search,
        } => {
            let (store, catalog) = load_inputs(&config)?;
            let snapshot = store.snapshot(&StageFilter::parse(stages.as_deref())?);
            let agg = aggregate(&snapshot.entries, &catalog)?;

            let key: EntitySortKey = sort.parse()?;
            let mut rows = entity_rows(&agg, search.as_deref());
            sort_entities(&mut rows, key, direction_for(key, dir.as_deref())?);
            let mut effects = effect_rows(&agg, search.as_deref());
            sort_effects(
                &mut effects,
                EffectSortKey::Bans,
                EffectSortKey::Bans.default_direction(),
            );

            if cli.json {
                #[derive(Serialize)]
                struct Report<'a> {
                    overall: &'a draft_stats::models::OverallStats,
                    quality: &'a draft_stats::models::DataQuality,
                    entities: &'a [draft_stats::models::EntityRow],
                    effects: &'a [draft_stats::models::EffectRow],
                }
                return print_json(&Report {
                    overall: &agg.overall,
                    quality: &agg.quality,
                    entities: &rows,
                    effects: &effects,
                });
            }

            let overall = &agg.overall;
            println!(
                "=== Draft Report ({}) ===\n",
                snapshot.stages.display_names().join(", ")
            );
            println!("Total drafts:      {}", overall.total_drafts);
            println!(
                "Winner recorded:   {} ({}% coverage)",
                overall.drafts_with_winner, overall.win_data_coverage
            );
            for side in Side::ALL {
                println!(
                    "{} wins:   {} ({}%)",
                    side.label(),
                    overall.side_wins(side),
                    overall.side_win_rate(side)
                );
            }
            println!(
                "Picks / bans / effect bans: {} / {} / {}\n",
                overall.total_picks, overall.total_bans, overall.total_effect_bans
            );

            println!(
                "{:<32} {:>5} {:>5} {:>8} {:>8} {:>9} {:>8}",
                "Entity", "Picks", "Bans", "Pick %", "Ban %", "Presence", "Win %"
            );
            for row in &rows {
                println!(
                    "{:<32} {:>5} {:>5} {:>8} {:>8} {:>9} {:>8}",
                    row.name,
                    row.picks,
                    row.bans,
                    pct(row.pick_rate),
                    pct(row.ban_rate),
                    pct(row.presence),
                    pct(row.win_rate)
                );
            }

            if !effects.is_empty() {
                println!("\n{:<40} {:>5} {:>8}", "Effect", "Bans", "Ban %");
                for row in &effects {
                    println!("{:<40} {:>5} {:>8}", row.name, row.bans, pct(row.ban_rate));
                }
            }

            if !agg.quality.is_clean() {
                println!(
                    "\nData quality: {} malformed drafts, {} unknown entities, {} unknown effects",
                    agg.quality.malformed_records,
                    agg.quality.unknown_entities.len(),
                    agg.quality.unknown_effects.len()
                );
            }
        }
        Commands::Pairings { id, stages, limit } => {
            let (store, catalog) = load_inputs(&config)?;
            let snapshot = store.snapshot(&StageFilter::parse(stages.as_deref())?);
            let focus = EntityId::from(id.as_str());
            let mut report = analyze_pairings(&snapshot.entries, &focus, &catalog)?;
            report
                .partners
                .truncate(limit.unwrap_or(config.analysis.limits.pairings));

            if cli.json {
                return print_json(&report);
            }

            println!("=== Pairings: {} ===\n", catalog.display_name(&focus));
            println!(
                "Games: {}  Wins: {}  Win rate: {}\n",
                report.games_with_focus,
                report.wins_with_focus,
                pct(report.focus_win_rate)
            );
            for partner in &report.partners {
                println!(
                    "  {:<32} {:>4} games ({} of games)  win {}",
                    partner.name,
                    partner.count,
                    pct(partner.pairing_rate),
                    pct(partner.win_rate)
                );
            }
        }
        Commands::Counters { id, stages, limit } => {
            let (store, catalog) = load_inputs(&config)?;
            let snapshot = store.snapshot(&StageFilter::parse(stages.as_deref())?);
            let focus = EntityId::from(id.as_str());
            let mut report =
                analyze_counters(&snapshot.entries, &focus, &catalog, &config.analysis.matchup)?;
            let limits = &config.analysis.limits;
            report.responses.truncate(limit.unwrap_or(limits.responses));
            report.strong_against.truncate(limit.unwrap_or(limits.matchups));
            report.weak_against.truncate(limit.unwrap_or(limits.matchups));

            if cli.json {
                return print_json(&report);
            }

            println!("=== Counters: {} ===\n", catalog.display_name(&focus));
            println!("Response picks ({} total):", report.total_responses);
            for response in &report.responses {
                println!(
                    "  {:<32} {:>4} ({})  win {}",
                    response.name,
                    response.count,
                    pct(response.response_share),
                    pct(response.win_rate)
                );
            }
            for (title, list) in [
                ("Strong against", &report.strong_against),
                ("Weak against", &report.weak_against),
            ] {
                println!("\n{}:", title);
                if list.is_empty() {
                    println!("  (none)");
                }
                for m in list {
                    println!(
                        "  {:<32} {:>5.1}% over {} games  {} (+{:.1})",
                        m.name, m.win_rate, m.games, m.tier, m.advantage
                    );
                }
            }
        }
        Commands::Timing { stages, sort, dir } => {
            let (store, catalog) = load_inputs(&config)?;
            let snapshot = store.snapshot(&StageFilter::parse(stages.as_deref())?);
            let mut rows = analyze_timing(&snapshot.entries, &catalog, &config.analysis.timing)?;
            let key: TimingSortKey = sort.parse()?;
            sort_timing(&mut rows, key, direction_for(key, dir.as_deref())?);

            if cli.json {
                return print_json(&rows);
            }

            println!(
                "=== Timing (min {} occurrences) ===\n",
                config.analysis.timing.min_occurrences
            );
            println!(
                "{:<32} {:>8} {:>8} {:>8} {:>8}",
                "Entity", "Avg pick", "Tendency", "Avg ban", "Tendency"
            );
            for row in &rows {
                println!(
                    "{:<32} {:>8} {:>8} {:>8} {:>8}",
                    row.name,
                    position(row.avg_pick_position),
                    row.pick_tendency.to_string(),
                    position(row.avg_ban_position),
                    row.ban_tendency.to_string()
                );
            }
        }
        Commands::Catalog => {
            let storage = StorageConfig::new(config.data_dir.clone());
            let catalog = load_catalog(&storage, &config.catalog.groups)?;

            if cli.json {
                #[derive(Serialize)]
                struct Listing<'a> {
                    entities: &'a [draft_stats::models::Entity],
                    effects: &'a [draft_stats::models::Entity],
                }
                return print_json(&Listing {
                    entities: catalog.entities(),
                    effects: catalog.effects(),
                });
            }

            println!("=== Catalog ===\n");
            println!("Entities ({}):", catalog.entities().len());
            for entity in catalog.entities() {
                println!("  {:<40} {:<32} {}", entity.id.as_str(), entity.name, entity.group());
            }
            println!("\nEffects ({}):", catalog.effects().len());
            for effect in catalog.effects() {
                println!("  {:<40} {}", effect.id.as_str(), effect.name);
            }
        }
    }

    Ok(())
}
