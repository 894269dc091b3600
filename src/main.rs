use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;

mod auth;
mod charts;
mod metrics;
mod models;
mod report;
mod source;
mod table;

use models::DateRange;
use source::SheetData;

#[derive(Parser)]
#[command(name = "call-metrics")]
#[command(about = "Sales call metrics over the team tracking sheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the records come from and which window to look at. Shared by every
/// reporting command.
#[derive(Args)]
struct SourceArgs {
    /// Inclusive lower bound, RFC 3339 or YYYY-MM-DD
    #[arg(long)]
    from: Option<String>,
    /// Inclusive upper bound, RFC 3339 or YYYY-MM-DD
    #[arg(long)]
    to: Option<String>,
    /// Read call rows from a local CSV export instead of the API
    #[arg(long, conflicts_with = "demo")]
    csv: Option<PathBuf>,
    /// Use the bundled demo dataset instead of the API
    #[arg(long)]
    demo: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Team-level KPIs for the window
    Kpis {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Per-closer rollup with commissions
    Closers {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Per-setter rollup with commissions
    Sdrs {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Lead applications per day
    Leads {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Detailed call-by-call table
    Table {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// Generate a markdown report for the window
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Invite a new user to the dashboard (admin only)
    Invite {
        #[arg(long)]
        email: String,
    },
}

struct ApiConfig {
    base_url: String,
    token: String,
}

fn api_config() -> anyhow::Result<ApiConfig> {
    let base_url = std::env::var("SALES_API_URL")
        .context("SALES_API_URL must point at the sheet-backed API")?;
    let token = std::env::var("SALES_API_TOKEN")
        .context("SALES_API_TOKEN must hold a bearer token for the API")?;
    Ok(ApiConfig { base_url, token })
}

async fn load_sheet(args: &SourceArgs) -> anyhow::Result<SheetData> {
    if args.demo {
        info!("using bundled demo dataset");
        return Ok(source::demo_sheet());
    }
    if let Some(path) = &args.csv {
        info!("loading call rows from {}", path.display());
        let calls = source::load_csv(path)?;
        return Ok(SheetData {
            calls,
            leads: Vec::new(),
        });
    }

    let config = api_config()?;
    let client = reqwest::Client::new();
    let capabilities = auth::fetch_capabilities(&client, &config.base_url, &config.token).await?;
    capabilities.require_approved()?;
    let sheet = source::fetch_sheet(&client, &config.base_url, &config.token).await?;
    info!(
        "fetched {} call rows and {} lead rows",
        sheet.calls.len(),
        sheet.leads.len()
    );
    Ok(sheet)
}

fn window(args: &SourceArgs) -> anyhow::Result<DateRange> {
    DateRange::parse(args.from.as_deref(), args.to.as_deref())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Kpis { source } => {
            let range = window(&source)?;
            let sheet = load_sheet(&source).await?;
            let kpis = metrics::compute_kpis(&sheet.calls, &range);

            println!("Cash collected:    {}", table::format_currency(kpis.cash_collected));
            println!("Revenue generated: {}", table::format_currency(kpis.revenue_generated));
            println!("Calls due:         {}", kpis.calls_due);
            println!("Calls taken:       {}", kpis.calls_taken);
            println!("Calls closed:      {}", kpis.calls_closed);
            println!("Show rate:         {}", table::format_percent(kpis.show_rate));
            println!("Close rate:        {}", table::format_percent(kpis.close_rate));
        }
        Commands::Closers { source, limit } => {
            let range = window(&source)?;
            let sheet = load_sheet(&source).await?;
            let rollup = metrics::compute_closer_metrics(&sheet.calls, &range);

            if rollup.is_empty() {
                println!("No closer activity in this window.");
                return Ok(());
            }
            println!("Closer rollup:");
            for closer in rollup.iter().take(limit) {
                println!(
                    "- {}: {} taken, {} closed ({}), revenue {}, commission {}",
                    closer.name,
                    closer.calls,
                    closer.closes,
                    table::format_percent(closer.close_rate),
                    table::format_currency(closer.revenue),
                    table::format_currency(closer.commission)
                );
            }
        }
        Commands::Sdrs { source, limit } => {
            let range = window(&source)?;
            let sheet = load_sheet(&source).await?;
            let rollup = metrics::compute_sdr_metrics(&sheet.calls, &range);

            if rollup.is_empty() {
                println!("No setter activity in this window.");
                return Ok(());
            }
            println!("Setter rollup:");
            for sdr in rollup.iter().take(limit) {
                println!(
                    "- {}: {} due, {} shows ({}), commission {}",
                    sdr.name,
                    sdr.calls_due,
                    sdr.shows,
                    table::format_percent(sdr.show_rate),
                    table::format_currency(sdr.commission)
                );
            }
        }
        Commands::Leads { source } => {
            let range = window(&source)?;
            let sheet = load_sheet(&source).await?;
            let trend = charts::lead_applications_trend(&sheet.leads, &range);

            if trend.is_empty() {
                println!("No lead applications in this window.");
                return Ok(());
            }
            println!("Lead applications by day:");
            for point in &trend {
                println!("- {}: {}", point.date, point.count);
            }
        }
        Commands::Table { source, limit } => {
            let range = window(&source)?;
            let sheet = load_sheet(&source).await?;
            let rows = table::compute_table_rows(&sheet.calls, &range);

            if rows.is_empty() {
                println!("No calls in this window.");
                return Ok(());
            }
            for row in rows.iter().take(limit) {
                println!(
                    "{} | {} | {} | setter {} ({}) | closer {} ({}) | {} | cash {} | avg deal {}",
                    row.date_taken,
                    row.prospect,
                    row.source,
                    row.setter,
                    row.setter_show_rate,
                    row.closer,
                    row.closer_close_rate,
                    row.outcome,
                    row.cash_collected,
                    row.avg_deal_size
                );
            }
        }
        Commands::Report { source, out } => {
            let range = window(&source)?;
            let sheet = load_sheet(&source).await?;
            let report = report::build_report(&sheet, &range);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Invite { email } => {
            let config = api_config()?;
            let client = reqwest::Client::new();
            let capabilities =
                auth::fetch_capabilities(&client, &config.base_url, &config.token).await?;
            capabilities.require_admin()?;
            auth::invite_user(&client, &config.base_url, &config.token, &email).await?;
            println!("Invite sent to {email}.");
        }
    }

    Ok(())
}
