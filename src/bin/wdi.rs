use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use wdi_dash::align::{MissingPolicy, align};
use wdi_dash::catalog::{Gas, ScatterSection};
use wdi_dash::extract::extract;
use wdi_dash::models::Observation;
use wdi_dash::select::select_row;
use wdi_dash::{Catalog, Dashboard, FsSource, HttpSource, KeyColumn, Session, TableSource, storage};

#[derive(Parser, Debug)]
#[command(
    name = "wdi",
    version,
    about = "Chart-ready data from World Bank indicator CSV downloads"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Directory holding the indicator CSV files.
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,
    /// Fetch files from this base URL instead of the data directory.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// JSON file overriding the indicator file layout.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Identify countries by ISO3 code instead of name.
    #[arg(long, global = true, default_value_t = false)]
    by_code: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One indicator over time with an exponential trend.
    Trend {
        #[arg(short, long)]
        country: String,
        /// Indicator alias: gdp, gdp-growth, co2-intensity, crop, food, population
        #[arg(short, long, default_value = "gdp")]
        indicator: String,
        /// Treat the indicator as a rate: min..max axis, no trend line.
        #[arg(long, default_value_t = false)]
        rate: bool,
    },
    /// Sector emissions of one gas, aligned by year.
    Emissions {
        #[arg(short, long)]
        country: String,
        #[arg(short, long, value_enum, default_value_t = GasArg::Co2)]
        gas: GasArg,
    },
    /// Gas split per sector at one year.
    Pies {
        #[arg(short, long)]
        country: String,
        #[arg(short, long, default_value_t = 2020)]
        year: i32,
    },
    /// Male/female shares per age bracket at one year.
    Pyramid {
        #[arg(short, long)]
        country: String,
        #[arg(short, long, default_value_t = 2020)]
        year: i32,
    },
    /// Combined age-bracket shares over all years.
    Heatmap {
        #[arg(short, long)]
        country: String,
    },
    /// Two indicators across countries at one year.
    Scatter {
        #[arg(short, long, value_enum, default_value_t = SectionArg::Economy)]
        section: SectionArg,
        #[arg(short, long, default_value_t = 2020)]
        year: i32,
    },
    /// Countries with their total population at one year.
    Packing {
        #[arg(short, long, default_value_t = 2020)]
        year: i32,
    },
    /// Two countries on shared-scale axes.
    Radar {
        /// Two countries separated by comma or semicolon.
        #[arg(short, long)]
        countries: String,
        #[arg(short, long, default_value_t = 2020)]
        year: i32,
    },
    /// Every chart of one country, built off the main thread.
    Country {
        #[arg(short, long)]
        country: String,
        #[arg(short, long, value_enum, default_value_t = GasArg::Co2)]
        gas: GasArg,
        #[arg(short, long, default_value_t = 2020)]
        year: i32,
    },
    /// Save aligned indicators of one country as CSV or JSON.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(short, long)]
    country: String,
    /// Indicator aliases separated by comma or semicolon.
    #[arg(short, long, default_value = "gdp,population")]
    indicators: String,
    /// Output file.
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Fill years missing from some indicators with 0.
    #[arg(long, default_value_t = false, conflicts_with = "tidy")]
    zero_fill: bool,
    /// One row per (country, indicator, year) instead of one row per year.
    #[arg(long, default_value_t = false)]
    tidy: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GasArg {
    Co2,
    N2o,
    Ch4,
}

impl From<GasArg> for Gas {
    fn from(g: GasArg) -> Self {
        match g {
            GasArg::Co2 => Gas::CO2,
            GasArg::N2o => Gas::N2O,
            GasArg::Ch4 => Gas::CH4,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SectionArg {
    Economy,
    Agriculture,
}

impl From<SectionArg> for ScatterSection {
    fn from(s: SectionArg) -> Self {
        match s {
            SectionArg::Economy => ScatterSection::Economy,
            SectionArg::Agriculture => ScatterSection::Agriculture,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

type Dash = Dashboard<Box<dyn TableSource>>;

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_dashboard(args: &SourceArgs) -> Result<Dash> {
    let catalog = match &args.catalog {
        Some(p) => Catalog::from_json_file(p)?,
        None => Catalog::default(),
    };
    let source: Box<dyn TableSource> = match &args.base_url {
        Some(url) => Box::new(HttpSource::new(url.clone())?),
        None => Box::new(FsSource::new(args.data_dir.clone())),
    };
    let key = if args.by_code {
        KeyColumn::CountryCode
    } else {
        KeyColumn::CountryName
    };
    Ok(Dashboard::new(source, catalog).with_key_column(key))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let dash = build_dashboard(&cli.source)?;
    match cli.cmd {
        Command::Trend {
            country,
            indicator,
            rate,
        } => {
            let locator = dash
                .catalog()
                .indicator(&indicator)
                .with_context(|| format!("unknown indicator alias {indicator:?}"))?
                .to_string();
            if rate {
                print_json(&dash.rate(&locator, &indicator, &country))
            } else {
                print_json(&dash.trend(&locator, &indicator, &country))
            }
        }
        Command::Emissions { country, gas } => print_json(&dash.emissions(&country, gas.into())),
        Command::Pies { country, year } => print_json(&dash.emission_pies(&country, year)),
        Command::Pyramid { country, year } => print_json(&dash.pyramid(&country, year)),
        Command::Heatmap { country } => print_json(&dash.heatmap(&country)),
        Command::Scatter { section, year } => print_json(&dash.scatter(section.into(), year)),
        Command::Packing { year } => print_json(&dash.packing(year)),
        Command::Radar { countries, year } => {
            let names = parse_list(&countries);
            if names.len() != 2 {
                bail!("--countries expects exactly two countries, got {}", names.len());
            }
            let entities: Vec<&str> = names.iter().map(String::as_str).collect();
            let axes = dash.default_radar_axes();
            print_json(&dash.radar(&entities, &axes, year))
        }
        Command::Country { country, gas, year } => cmd_country(dash, &country, gas.into(), year),
        Command::Export(args) => cmd_export(&dash, args),
    }
}

fn cmd_country(dash: Dash, country: &str, gas: Gas, year: i32) -> Result<()> {
    let mut session = Session::new();
    let tickets = session.select_country(country);

    let (sender, receiver) = mpsc::channel();
    let name = country.to_string();
    let worker = thread::spawn(move || {
        let charts = dash.country_charts(&name, gas, year);
        let _ = sender.send(charts);
    });
    let charts = receiver
        .recv()
        .context("chart worker stopped before sending results")?;
    if worker.join().is_err() {
        bail!("chart worker panicked");
    }

    let stored = session.apply_country(tickets, charts);
    log::debug!("committed {stored} charts for {country}");
    print_json(&serde_json::json!({
        "country": session.country(),
        "gdp": session.gdp(),
        "gdp_growth": session.gdp_growth(),
        "co2_intensity": session.co2_intensity(),
        "emissions": session.emissions(),
        "pies": session.pies(),
        "pyramid": session.pyramid(),
        "heatmap": session.heatmap(),
    }))
}

fn cmd_export(dash: &Dash, args: ExportArgs) -> Result<()> {
    let aliases = parse_list(&args.indicators);
    if aliases.is_empty() {
        bail!("at least one indicator alias required");
    }
    let mut locators = Vec::new();
    for a in &aliases {
        let loc = dash
            .catalog()
            .indicator(a)
            .with_context(|| format!("unknown indicator alias {a:?}"))?;
        locators.push(loc.to_string());
    }
    let tables = dash.tables(&locators)?;
    let named: Vec<(&str, _)> = aliases.iter().map(String::as_str).zip(tables).collect();
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv".to_string(),
        Some(OutFormat::Json) => "json".to_string(),
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase(),
    };

    if args.tidy {
        let points: Vec<Observation> = named
            .iter()
            .filter_map(|(alias, table)| {
                let row = select_row(table, &args.country, dash.key_column())?;
                Some(Observation::from_series(&args.country, alias, &extract(row)))
            })
            .flatten()
            .collect();
        if points.is_empty() {
            bail!("no data for {} in {}", args.country, args.indicators);
        }
        match fmt.as_str() {
            "csv" => storage::save_series_csv(&points, &args.out)?,
            "json" => storage::save_series_json(&points, &args.out)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", points.len(), args.out.display());
        return Ok(());
    }

    let policy = if args.zero_fill {
        MissingPolicy::ZeroFill
    } else {
        MissingPolicy::Sparse
    };
    let records = align(&named, &args.country, dash.key_column(), policy);
    if records.is_empty() {
        bail!("no data for {} in {}", args.country, args.indicators);
    }

    let series: Vec<&str> = aliases.iter().map(String::as_str).collect();
    match fmt.as_str() {
        "csv" => storage::save_records_csv(&records, &series, &args.out)?,
        "json" => storage::save_records_json(&records, &args.out)?,
        other => bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", records.len(), args.out.display());
    Ok(())
}
