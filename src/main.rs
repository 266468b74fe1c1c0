//! CLI entry point for the Lok Sabha analytics tool.
//!
//! Each subcommand renders one dashboard page from the election backend:
//! chart configurations as JSON and tables as CSV under the output directory.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use lok_sabha_analytics::{
    analytics::constituency_states,
    config::Settings,
    fetch::{BasicClient, Endpoint, fetch_json, latest_year},
    model::{
        ConstituencyHistory, ConstituencyTypeBreakdown, ElectionYearResult, NameList, PartyComparison,
        PartyProfile, PartyTrends, StatePartyTrends, TurnoutOverview, Year, YearComparison,
    },
    output::print_json,
    pages::{
        ConstituencyListPage, ConstituencyPage, ConstituencyTypePage, PartiesPage, PartyComparisonPage,
        PartyPage, StatePartyPage, SummaryPage, TurnoutPage, YearComparisonPage,
    },
    pipeline::{Panel, load},
    render::{ChartHandle, slug},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "lok_sabha_analytics")]
#[command(about = "Charts and tables from Lok Sabha election results", long_about = None)]
struct Cli {
    /// Base URL of the election results backend
    #[arg(long, env = "API_BASE_URL", global = true)]
    api_base_url: Option<String>,

    /// Directory to write charts and tables to
    #[arg(long, env = "OUTPUT_DIR", global = true)]
    out_dir: Option<String>,

    /// Re-render the page every SECS seconds (0 = run once)
    #[arg(short = 'r', long, value_name = "SECS", default_value_t = 0, global = true)]
    refresh: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quick stats, top parties and states, and victory margins for one election
    Summary {
        /// Election year (default: latest year the backend has)
        #[arg(short, long)]
        year: Option<Year>,
    },
    /// Compare party seats, swings and turnout across elections
    CompareYears {
        /// Years to compare; repeat the flag, at least two
        #[arg(short, long = "years", required = true, num_args = 1..)]
        years: Vec<Year>,
    },
    /// Compare selected parties' seats and growth over time
    CompareParties {
        /// Parties to compare; repeat the flag
        #[arg(short, long = "parties", required = true, num_args = 1..)]
        parties: Vec<String>,
    },
    /// National turnout trend and state-wise turnout
    Turnout,
    /// One party's seats and seat share across elections
    Party {
        /// Party name as the backend spells it
        #[arg(short, long)]
        name: String,
    },
    /// Top parties per constituency type (GEN/SC/ST)
    ConstituencyTypes {
        /// Only this type
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },
    /// All parties ranked by seats, with the trends of the major ones
    Parties,
    /// One constituency's election history, or every constituency of the latest election
    Constituency {
        /// Constituency name; lists all constituencies when omitted
        #[arg(short, long)]
        name: Option<String>,
        /// Only list constituencies in this state
        #[arg(short, long, conflicts_with = "name")]
        state: Option<String>,
    },
    /// Seats and vote share of parties within one state
    StateParty {
        #[arg(short, long)]
        state: String,
        /// Only this party
        #[arg(short, long)]
        party: Option<String>,
    },
}

impl Commands {
    fn page_name(&self) -> &'static str {
        match self {
            Commands::Summary { .. } => "summary",
            Commands::CompareYears { .. } => "compare-years",
            Commands::CompareParties { .. } => "compare-parties",
            Commands::Turnout => "turnout",
            Commands::Party { .. } => "party",
            Commands::ConstituencyTypes { .. } => "constituency-types",
            Commands::Parties => "parties",
            Commands::Constituency { .. } => "constituency",
            Commands::StateParty { .. } => "state-party",
        }
    }
}

/// The requested years sorted without repeats; at least two must remain.
fn distinct_years(years: &[Year]) -> Result<Vec<Year>> {
    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();
    if years.len() < 2 {
        bail!("compare-years needs at least two distinct --years");
    }
    Ok(years)
}

/// The latest election year: asks the backend, falls back to the configured default.
async fn resolve_latest_year(client: &BasicClient, base_url: &str, settings: &Settings) -> Result<Year> {
    Ok(latest_year(client, base_url).await?.unwrap_or_else(|| {
        warn!(
            default_year = settings.default_year,
            "Backend listed no years, using the default"
        );
        settings.default_year
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let mut cli = Cli::parse();
    let settings = Settings::from_env()?;

    let base_url = cli
        .api_base_url
        .as_deref()
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| settings.api_base_url.clone());
    let out_dir = PathBuf::from(cli.out_dir.as_deref().unwrap_or(&settings.output_dir));

    if let Commands::CompareYears { years } = &mut cli.command {
        *years = distinct_years(years)?;
    }

    let client = BasicClient::new(settings.request_timeout)?;
    let mut panel: Panel<ChartHandle> = Panel::new(cli.command.page_name());

    if cli.refresh == 0 {
        return render(&cli.command, &client, &base_url, &out_dir, &settings, &mut panel).await;
    }

    info!(refresh = cli.refresh, "Re-rendering on an interval. Press Ctrl+C to stop.");
    loop {
        if let Err(e) = render(&cli.command, &client, &base_url, &out_dir, &settings, &mut panel).await
        {
            error!(error = %e, "Render failed");
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_secs(cli.refresh)) => {}
        }
    }

    info!("Stopping, removing rendered files");
    panel.close()
}

/// Colored stderr plus a JSON daily rolling log file.
///
/// The returned guard must be held for the file writer to flush.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/lok_sabha_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lok_sabha_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Fetches, aggregates and renders the page for `command` into `panel`.
#[tracing::instrument(skip_all, fields(page = %panel.name()))]
async fn render(
    command: &Commands,
    client: &BasicClient,
    base_url: &str,
    out_dir: &Path,
    settings: &Settings,
    panel: &mut Panel<ChartHandle>,
) -> Result<()> {
    let page_dir = out_dir.join(command.page_name());

    let handle = match command {
        Commands::Summary { year } => {
            let year = match year {
                Some(year) => *year,
                None => resolve_latest_year(client, base_url, settings).await?,
            };
            let dir = out_dir.join(format!("summary-{year}"));
            let history = out_dir.join("summary_history.csv");
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::election(year),
                    SummaryPage::build,
                    |page: &SummaryPage| {
                        print_json(&page.summary)?;
                        page.render_recorded(&dir, &history)
                    },
                )
                .await?
        }
        Commands::CompareYears { years } => {
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::compare_years(years),
                    |cmp: &YearComparison| YearComparisonPage::build(cmp, years),
                    |page: &YearComparisonPage| page.render(&page_dir),
                )
                .await?
        }
        Commands::CompareParties { parties } => {
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::compare_parties(parties),
                    |cmp: &PartyComparison| PartyComparisonPage::build(cmp, parties),
                    |page: &PartyComparisonPage| page.render(&page_dir),
                )
                .await?
        }
        Commands::Turnout => {
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::turnout(),
                    |overview: &TurnoutOverview| TurnoutPage::build(overview),
                    |page: &TurnoutPage| page.render(&page_dir),
                )
                .await?
        }
        Commands::Party { name } => {
            let dir = out_dir.join(format!("party-{}", slug(name)));
            let profile: PartyProfile = fetch_json(client, base_url, &Endpoint::party(name)).await?;
            let states = latest_seat_states(client, base_url, &profile).await;
            let page = PartyPage::build(&profile, name, &states);
            info!(party = %page.name, years = page.shares.len(), won = page.won.len(), "Party profile loaded");
            panel.refresh(|| page.render(&dir))?
        }
        Commands::ConstituencyTypes { kind } => {
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::constituency_types(),
                    |breakdown: &ConstituencyTypeBreakdown| {
                        ConstituencyTypePage::build(breakdown, kind.as_deref())
                    },
                    |page: &ConstituencyTypePage| {
                        if page.sections.is_empty() {
                            warn!(kind = ?kind, "No constituency type matched");
                        }
                        page.render(&page_dir)
                    },
                )
                .await?
        }
        Commands::Parties => {
            let listed: NameList = fetch_json(client, base_url, &Endpoint::parties()).await?;
            let page = load(client, base_url, &Endpoint::party_trends(), |trends: &PartyTrends| {
                PartiesPage::build(trends, &listed.0)
            })
            .await?;
            panel.refresh(|| page.render(&page_dir))?
        }
        Commands::Constituency {
            name: Some(name), ..
        } => {
            let dir = out_dir.join(format!("constituency-{}", slug(name)));
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::constituency(name),
                    |history: &ConstituencyHistory| ConstituencyPage::build(history, name),
                    |page: &ConstituencyPage| {
                        if page.timeline.is_empty() {
                            warn!(constituency = %name, "No results for constituency");
                        }
                        page.render(&dir)
                    },
                )
                .await?
        }
        Commands::Constituency { name: None, state } => {
            let year = resolve_latest_year(client, base_url, settings).await?;
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::election(year),
                    |result: &ElectionYearResult| ConstituencyListPage::build(result, state.as_deref()),
                    |page: &ConstituencyListPage| page.render(&page_dir),
                )
                .await?
        }
        Commands::StateParty { state, party } => {
            let states: NameList = fetch_json(client, base_url, &Endpoint::states()).await?;
            let state = match states.find(state) {
                Some(listed) => listed.to_string(),
                None if states.0.is_empty() => state.clone(),
                None => bail!("Unknown state '{state}'; the backend lists {} states", states.0.len()),
            };
            let dir = out_dir.join(format!("state-party-{}", slug(&state)));
            panel
                .load_and_render(
                    client,
                    base_url,
                    &Endpoint::state_party_trends(&state, party.as_deref()),
                    |trends: &StatePartyTrends| StatePartyPage::build(trends, &state, party.as_deref()),
                    |page: &StatePartyPage| page.render(&dir),
                )
                .await?
        }
    };

    info!(files = handle.files().len(), "Page rendered");
    Ok(())
}

/// `constituency → state` for the party's latest election, when some won seat carries no state.
///
/// The state chart is optional, so a failed lookup is logged and yields an empty map.
async fn latest_seat_states(
    client: &BasicClient,
    base_url: &str,
    profile: &PartyProfile,
) -> IndexMap<String, String> {
    let Some(latest) = profile
        .performance
        .iter()
        .filter(|p| p.year.is_some())
        .max_by_key(|p| p.year)
    else {
        return IndexMap::new();
    };
    let Some(year) = latest.year else {
        return IndexMap::new();
    };
    if latest.constituencies.iter().all(|seat| seat.state.is_some()) {
        return IndexMap::new();
    }

    match fetch_json::<ElectionYearResult, _>(client, base_url, &Endpoint::election(year)).await {
        Ok(result) => constituency_states(&result),
        Err(e) => {
            warn!(error = %e, year, "Could not look up constituency states");
            IndexMap::new()
        }
    }
}
