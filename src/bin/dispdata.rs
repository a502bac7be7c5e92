use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dispdata::{
    Countries, EventFilter, GiddClient, GiddQuery, HdiQuery, IndicatorMap, IndicatorSpec, Table,
    WorldBankClient, YearRange,
};
use dispdata::{gidd, hdi, idmc, storage, wb};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dispdata",
    version,
    about = "Fetch, filter & reshape HDI, IDMC, GIDD and World Bank data"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Human Development Index export, reshaped to one row per country, metric and year.
    Hdi(HdiArgs),
    /// IDMC internal displacement export.
    Idmc(IdmcArgs),
    /// World Bank indicators merged on country and year.
    Wb(WbArgs),
    /// GIDD disaster records from the IDMC API.
    Gidd(GiddArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct Output {
    /// Save results to file (format inferred by --format or extension). Prints CSV to stdout otherwise.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct Years {
    /// First year to keep (inclusive)
    #[arg(long)]
    start: Option<i32>,
    /// Last year to keep (inclusive)
    #[arg(long)]
    end: Option<i32>,
}

#[derive(Args, Debug)]
struct EventArgs {
    /// Hazard category, matched case-insensitively (e.g., "Weather related")
    #[arg(long)]
    hazard_category: Option<String>,
    /// Hazard type, matched case-insensitively (e.g., "Flood")
    #[arg(long)]
    hazard_type: Option<String>,
    /// ISO3 codes separated by comma or semicolon ("all" keeps every country)
    #[arg(long)]
    iso3: Option<String>,
}

#[derive(Args, Debug)]
struct HdiArgs {
    /// Path of the HDI composite indices CSV (ISO-8859-1)
    #[arg(short, long)]
    file: PathBuf,
    /// Indicator with display name, CODE=Name (e.g., hdi=Human Development Index). Repeat the flag or separate entries with ';'
    #[arg(short, long = "indicator", visible_alias = "indicators", required = true)]
    indicators: Vec<String>,
    /// Country names separated by comma or semicolon
    #[arg(short, long)]
    countries: Option<String>,
    #[command(flatten)]
    years: Years,
    #[command(flatten)]
    output: Output,
}

#[derive(Args, Debug)]
struct IdmcArgs {
    /// Path of the IDMC CSV export
    #[arg(short, long)]
    file: PathBuf,
    /// Indicator column to keep, CODE=Name; repeatable (all columns when omitted)
    #[arg(short, long = "indicator", visible_alias = "indicators")]
    indicators: Vec<String>,
    #[command(flatten)]
    events: EventArgs,
    #[command(flatten)]
    years: Years,
    #[command(flatten)]
    output: Output,
}

#[derive(Args, Debug)]
struct WbArgs {
    /// Indicator with display name, CODE=Name (e.g., SP.POP.TOTL=Population, total). Repeat the flag or separate entries with ';'
    #[arg(short, long = "indicator", visible_alias = "indicators", required = true)]
    indicators: Vec<String>,
    /// Country codes separated by comma or semicolon, or "all"
    #[arg(short, long, default_value = "all")]
    countries: String,
    #[command(flatten)]
    years: Years,
    #[command(flatten)]
    output: Output,
}

#[derive(Args, Debug)]
struct GiddArgs {
    /// IDMC API client id
    #[arg(long, env = "GIDD_CLIENT_ID")]
    client_id: String,
    /// Page size of the first request
    #[arg(long, default_value_t = gidd::DEFAULT_LIMIT)]
    limit: u32,
    /// Indicator column to keep, CODE=Name; repeatable (all columns when omitted)
    #[arg(short, long = "indicator", visible_alias = "indicators")]
    indicators: Vec<String>,
    #[command(flatten)]
    events: EventArgs,
    #[command(flatten)]
    years: Years,
    #[command(flatten)]
    output: Output,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// `CODE=Name` entries, one per flag or separated by ';'. Names may contain commas.
/// A bare `CODE` uses the code as its name.
fn parse_indicators(items: &[String]) -> IndicatorMap {
    items
        .iter()
        .flat_map(|s| s.split(';'))
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(|item| {
            let (code, name) = item
                .split_once('=')
                .map_or((item, item), |(c, n)| (c.trim(), n.trim()));
            (code.to_string(), name.to_string())
        })
        .collect()
}

fn indicator_spec(items: &[String]) -> IndicatorSpec {
    if items.is_empty() {
        IndicatorSpec::AllColumns
    } else {
        parse_indicators(items).into()
    }
}

fn event_filter(h: &EventArgs, y: &Years) -> EventFilter {
    EventFilter {
        iso3: h.iso3.as_deref().map(parse_list),
        years: YearRange::new(y.start, y.end),
        hazard_category_name: h.hazard_category.clone(),
        hazard_type_name: h.hazard_type.clone(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let (table, output) = match cli.cmd {
        Command::Hdi(args) => {
            let indicators = parse_indicators(&args.indicators);
            let years = YearRange::new(args.years.start, args.years.end);
            let mut query = HdiQuery::new().years(years);
            if let Some(c) = &args.countries {
                query = query.countries(parse_list(c));
            }
            let t = hdi::get_data_hdi(&args.file, &indicators, &query)
                .with_context(|| format!("reading {}", args.file.display()))?;
            (t, args.output)
        }
        Command::Idmc(args) => {
            let spec = indicator_spec(&args.indicators);
            let filter = event_filter(&args.events, &args.years);
            let t = idmc::get_data_idmc(&args.file, &spec, &filter)
                .with_context(|| format!("reading {}", args.file.display()))?;
            (t, args.output)
        }
        Command::Wb(args) => {
            let indicators = parse_indicators(&args.indicators);
            let countries = if args.countries.trim().eq_ignore_ascii_case("all") {
                Countries::All
            } else {
                Countries::Codes(parse_list(&args.countries))
            };
            let years = YearRange::new(args.years.start, args.years.end);
            let t = wb::get_data_wb(&WorldBankClient::default(), &indicators, &countries, years)
                .context("fetching World Bank indicators")?;
            (t, args.output)
        }
        Command::Gidd(args) => {
            let query = GiddQuery::new(args.client_id)
                .limit(args.limit)
                .filter(event_filter(&args.events, &args.years))
                .indicators(indicator_spec(&args.indicators));
            let t = gidd::get_data_gidd(&GiddClient::default(), &query)
                .context("fetching GIDD disasters")?;
            (t, args.output)
        }
    };
    emit(&table, &output)
}

fn emit(table: &Table, output: &Output) -> Result<()> {
    let Some(path) = output.out.as_ref() else {
        storage::write_csv(table, std::io::stdout().lock())?;
        eprintln!("{} rows", table.len());
        return Ok(());
    };
    let fmt = match output.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(table, path)?,
        "json" => storage::save_json(table, path)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", table.len(), path.display());
    Ok(())
}
