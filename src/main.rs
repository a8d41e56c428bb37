use clap::{Args, Parser, Subcommand};
use dashsvg::dashboard::{Control, TradeDashboard, WaterDashboard};
use dashsvg::loader;
use dashsvg::transition::DEFAULT_DURATION;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dashsvg")]
#[command(about = "Render the water access and trade dashboards from CSV files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Water access scatter, difference and year-trend charts
    Water {
        /// Water access CSV (Year, Country, Identifier, Value)
        #[arg(long)]
        water: PathBuf,
        /// GDP per capita CSV, same layout as the water file
        #[arg(long)]
        gdp: PathBuf,
        /// Country to continent CSV (Country, Continent)
        #[arg(long)]
        continents: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Trade flow bars, streams and import/export scatter
    Trade {
        /// Trade CSV (Year, Commodity, Country, Flow, Quantity)
        #[arg(long)]
        trade: PathBuf,
        #[arg(long)]
        continents: PathBuf,
        /// Commodity to show (default: Silicon, <99.99% pure, or the first one)
        #[arg(long)]
        commodity: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args)]
struct ViewArgs {
    /// Selected year (default: 2012, or the latest year)
    #[arg(long)]
    year: Option<i64>,
    /// Country name filter
    #[arg(long)]
    filter: Option<String>,
    /// Hide a continent; may be repeated
    #[arg(long = "hide-continent")]
    hide_continent: Vec<String>,
    /// Country to highlight
    #[arg(long)]
    hover: Option<String>,
    /// Render a single chart SVG (by class) instead of the whole page
    #[arg(long)]
    chart: Option<String>,
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ViewArgs {
    fn controls(&self) -> Vec<Control> {
        let mut controls = Vec::new();
        if let Some(year) = self.year {
            controls.push(Control::Year(year));
        }
        if let Some(text) = &self.filter {
            controls.push(Control::Text(text.clone()));
        }
        for continent in &self.hide_continent {
            controls.push(Control::ToggleContinent(continent.clone()));
        }
        if let Some(country) = &self.hover {
            controls.push(Control::Hover(country.clone()));
        }
        controls
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

/// One chart's SVG when `--chart` is given, else the whole page.
fn render(view: &ViewArgs, chart: impl Fn(&str) -> Option<String>, page: impl Fn() -> String) -> String {
    match view.chart.as_deref() {
        Some(name) => chart(name).unwrap_or_else(|| fail(format!("Unknown chart: {}", name))),
        None => page(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (output, view) = match cli.command {
        Command::Water {
            water,
            gdp,
            continents,
            view,
        } => {
            let (rows, continents) =
                loader::read_water(&water, &gdp, &continents).unwrap_or_else(|e| fail(e));
            let mut dash = WaterDashboard::new(&rows, &continents);
            for control in view.controls() {
                dash.dispatch(control);
            }
            dash.advance(DEFAULT_DURATION);
            let output = render(&view, |name| dash.chart_svg(name), || dash.render_page());
            (output, view)
        }
        Command::Trade {
            trade,
            continents,
            commodity,
            view,
        } => {
            let (rows, continents) =
                loader::read_trade(&trade, &continents).unwrap_or_else(|e| fail(e));
            let mut dash = TradeDashboard::new(&rows, &continents);
            if let Some(commodity) = commodity {
                dash.dispatch(Control::Commodity(commodity));
            }
            for control in view.controls() {
                dash.dispatch(control);
            }
            dash.advance(DEFAULT_DURATION);
            let output = render(&view, |name| dash.chart_svg(name), || dash.render_page());
            (output, view)
        }
    };

    match view.output {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                fail(format!("Failed to write {}: {}", path.display(), e));
            }
            tracing::info!(path = %path.display(), bytes = output.len(), "written");
        }
        None => print!("{}", output),
    }
}
