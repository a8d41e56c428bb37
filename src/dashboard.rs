//! Interaction controller: filter state, control events and the update pass
//! that runs the view pipeline and reconciles every chart.

use crate::chart::{
    Chart, DifferenceChart, Flow, FlowChart, Frame, ScatterPlot, StreamChart, TradeScatterPlot,
    YearChart, water_total,
};
use crate::continent::{ContinentLookup, Palette};
use crate::format;
use crate::loader::{self, LoadError};
use crate::nest::{Nest, nest_trade, nest_trade_timeline, nest_water};
use crate::record::{ContinentRow, Key, TradeRow, WaterRow};
use crate::transition::{DEFAULT_DURATION, HOVER_DURATION, Transition};
use crate::view::{
    ContinentFilter, EntityView, TRADE_REQUIRED, WATER_REQUIRED, filter_by_category,
    filter_by_text, select,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Year both dashboards open on when the data has it.
pub const INITIAL_YEAR: i64 = 2012;
pub const INITIAL_COMMODITY: &str = "Silicon, <99.99% pure";

/// Everything the user has selected. Passed by reference into every update.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub year: i64,
    pub text_filter: String,
    pub continent_filter: ContinentFilter,
    pub hovered: Option<String>,
    pub commodity: Option<String>,
}

impl FilterState {
    /// State for `year` with every listed continent shown.
    pub fn new<'a>(year: i64, continents: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            year,
            text_filter: String::new(),
            continent_filter: ContinentFilter::all_enabled(continents),
            hovered: None,
            commodity: None,
        }
    }

    /// Apply one control event. Each event touches exactly one field.
    pub fn apply(&mut self, control: Control) {
        match control {
            Control::Year(year) => self.year = year,
            Control::Text(text) => self.text_filter = text,
            Control::ToggleContinent(continent) => match self.continent_filter.toggle(&continent) {
                Some(enabled) => tracing::debug!(continent, enabled, "continent toggled"),
                None => tracing::debug!(continent, "toggle of unlisted continent ignored"),
            },
            Control::Commodity(commodity) => self.commodity = Some(commodity),
            Control::Hover(key) => self.hovered = Some(key),
            Control::Unhover => self.hovered = None,
        }
    }
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Year(i64),
    Text(String),
    ToggleContinent(String),
    Commodity(String),
    Hover(String),
    Unhover,
}

impl Control {
    /// Transition length for the update this event triggers, in milliseconds.
    pub fn duration(&self) -> f64 {
        match self {
            Control::Hover(_) | Control::Unhover => HOVER_DURATION,
            _ => DEFAULT_DURATION,
        }
    }
}

/// Contents of the details panel for the hovered country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Details {
    Empty,
    Water {
        country: String,
        year: i64,
        total: f64,
        urban: Option<f64>,
        rural: Option<f64>,
        gdp: Option<f64>,
    },
    /// Commodity and year are always shown; the country part only while a
    /// country with data for them is hovered.
    Trade {
        year: i64,
        commodity: String,
        country: Option<String>,
        import: Option<f64>,
        export: Option<f64>,
    },
}

impl Details {
    /// Display lines, as shown in the details panel.
    pub fn lines(&self) -> Vec<String> {
        let or_dash = |v: Option<f64>, unit: &str| match v {
            Some(v) => format!("{}{}", format::thousands(v), unit),
            None => "-".to_string(),
        };
        match self {
            Details::Empty => Vec::new(),
            Details::Water {
                country,
                total,
                urban,
                rural,
                gdp,
                ..
            } => vec![
                country.clone(),
                format!("Total: {}%", format::general(*total)),
                format!("Urban: {}", or_dash(*urban, "%")),
                format!("Rural: {}", or_dash(*rural, "%")),
                format!("GDP: {}", or_dash(*gdp, " US$")),
            ],
            Details::Trade {
                year,
                commodity,
                country,
                import,
                export,
            } => {
                let mut lines = Vec::new();
                if let Some(country) = country {
                    lines.push(country.clone());
                }
                lines.push(commodity.clone());
                lines.push(format!("Year: {}", year));
                if country.is_some() {
                    lines.push(format!("Import: {}", or_dash(*import, " kg")));
                    lines.push(format!("Export: {}", or_dash(*export, " kg")));
                }
                lines
            }
        }
    }
}

/// Filter state plus the render clock.
#[derive(Debug, Clone)]
struct Controller {
    state: FilterState,
    now: f64,
}

impl Controller {
    /// Apply `control` and return the transition the following update uses.
    fn apply(&mut self, control: Control) -> Transition {
        tracing::debug!(?control, now = self.now, "control");
        let transition = Transition::new(self.now, control.duration());
        self.state.apply(control);
        transition
    }

    fn advance(&mut self, dt: f64) -> f64 {
        self.now += dt.max(0.0);
        self.now
    }
}

/// select → text filter → continent filter.
pub fn pipeline(
    table: &Nest,
    path: &[Key],
    required: &[&str],
    state: &FilterState,
    lookup: &ContinentLookup,
) -> Vec<EntityView> {
    let view = select(table, path, required);
    let view = filter_by_text(view, &state.text_filter);
    filter_by_category(view, lookup, &state.continent_filter)
}

fn numeric_keys(table: &Nest) -> Vec<i64> {
    table.keys().filter_map(|k| k.as_num()).collect()
}

/// `INITIAL_YEAR` when present, else the latest year.
fn initial_year(years: &[i64]) -> i64 {
    if years.contains(&INITIAL_YEAR) {
        INITIAL_YEAR
    } else {
        years.last().copied().unwrap_or(INITIAL_YEAR)
    }
}

pub const WATER_CHARTS: &[&str] = &["scatterPlot", "differenceChart", "yearChart"];

pub struct WaterDashboard {
    table: Nest,
    lookup: ContinentLookup,
    palette: Palette,
    years: Vec<i64>,
    controller: Controller,
    scatter: ScatterPlot,
    difference: DifferenceChart,
    year_chart: YearChart,
}

impl WaterDashboard {
    pub fn new(rows: &[WaterRow], continents: &[ContinentRow]) -> Self {
        let table = nest_water(rows);
        let lookup = ContinentLookup::from_rows(continents);
        let palette = Palette::water();
        let years = numeric_keys(&table);
        let state = FilterState::new(initial_year(&years), palette.names());
        tracing::info!(years = years.len(), countries = lookup.len(), "water dashboard ready");

        let mut dashboard = Self {
            scatter: ScatterPlot::new(&table),
            difference: DifferenceChart::default(),
            year_chart: YearChart::new(&table, &lookup, &palette),
            table,
            lookup,
            palette,
            years,
            controller: Controller { state, now: 0.0 },
        };
        dashboard.update_all(Transition::immediate(0.0));
        dashboard
    }

    pub fn from_csv(water_csv: &str, gdp_csv: &str, continents_csv: &str) -> Result<Self, LoadError> {
        let rows = loader::load_water(water_csv, gdp_csv)?;
        let continents = loader::load_continents(continents_csv)?;
        Ok(Self::new(&rows, &continents))
    }

    pub fn dispatch(&mut self, control: Control) {
        let transition = self.controller.apply(control);
        self.update_all(transition);
    }

    /// Recompute the view and reconcile every chart against it.
    pub fn update_all(&mut self, transition: Transition) {
        let state = &self.controller.state;
        let view = pipeline(
            &self.table,
            &[Key::Num(state.year)],
            WATER_REQUIRED,
            state,
            &self.lookup,
        );
        tracing::debug!(year = state.year, entities = view.len(), "water update");

        let frame = Frame {
            view: &view,
            state,
            continents: &self.lookup,
            palette: &self.palette,
        };
        self.scatter.update(&frame, transition);
        self.difference.update(&frame, transition);
        self.year_chart.update(&frame, transition);
    }

    pub fn advance(&mut self, dt: f64) {
        let now = self.controller.advance(dt);
        self.scatter.tick(now);
        self.difference.tick(now);
        self.year_chart.tick(now);
    }

    pub fn now(&self) -> f64 {
        self.controller.now
    }

    pub fn state(&self) -> &FilterState {
        &self.controller.state
    }

    pub fn years(&self) -> &[i64] {
        &self.years
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn charts(&self) -> [&dyn Chart; 3] {
        [&self.scatter, &self.difference, &self.year_chart]
    }

    /// SVG of the chart with the given class, at the current clock.
    pub fn chart_svg(&self, name: &str) -> Option<String> {
        let chart = self.charts().into_iter().find(|c| c.class() == name)?;
        Some(chart.svg(self.now()))
    }

    pub fn details(&self) -> Details {
        let state = self.state();
        let Some(country) = state.hovered.as_deref() else {
            return Details::Empty;
        };
        let Some(values) = self
            .table
            .get_path(&[Key::Num(state.year), Key::from(country)])
        else {
            return Details::Empty;
        };
        let entity = EntityView {
            key: country.to_string(),
            value: values
                .entries()
                .filter_map(|(k, v)| v.value().map(|v| (k.to_string(), v)))
                .collect(),
        };
        Details::Water {
            country: country.to_string(),
            year: state.year,
            total: water_total(&entity),
            urban: entity.get("Urban"),
            rural: entity.get("Rural"),
            gdp: entity.get("GDP"),
        }
    }

    pub fn render_page(&self) -> String {
        crate::page::water_page(self)
    }
}

pub const TRADE_CHARTS: &[&str] = &[
    "flowchartImport",
    "flowchartExport",
    "streamchartImport",
    "streamchartExport",
    "scatterplot",
];

pub struct TradeDashboard {
    table: Nest,
    lookup: ContinentLookup,
    palette: Palette,
    years: Vec<i64>,
    commodities: Vec<String>,
    controller: Controller,
    import_flow: FlowChart,
    export_flow: FlowChart,
    import_stream: StreamChart,
    export_stream: StreamChart,
    scatter: TradeScatterPlot,
}

impl TradeDashboard {
    pub fn new(rows: &[TradeRow], continents: &[ContinentRow]) -> Self {
        let table = nest_trade(rows);
        let timeline = Rc::new(nest_trade_timeline(rows));
        let lookup = ContinentLookup::from_rows(continents);
        let palette = Palette::trade();
        let years = numeric_keys(&table);
        let commodities: Vec<String> = table
            .entries()
            .flat_map(|(_, per_year)| per_year.keys().map(|k| k.to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut state = FilterState::new(initial_year(&years), palette.names());
        state.commodity = if commodities.iter().any(|c| c == INITIAL_COMMODITY) {
            Some(INITIAL_COMMODITY.to_string())
        } else {
            commodities.first().cloned()
        };
        tracing::info!(
            years = years.len(),
            commodities = commodities.len(),
            "trade dashboard ready"
        );

        let mut dashboard = Self {
            import_flow: FlowChart::new(Flow::Import),
            export_flow: FlowChart::new(Flow::Export),
            import_stream: StreamChart::new(Flow::Import, Rc::clone(&timeline), years.clone()),
            export_stream: StreamChart::new(Flow::Export, timeline, years.clone()),
            scatter: TradeScatterPlot::default(),
            table,
            lookup,
            palette,
            years,
            commodities,
            controller: Controller { state, now: 0.0 },
        };
        dashboard.update_all(Transition::immediate(0.0));
        dashboard
    }

    pub fn from_csv(trade_csv: &str, continents_csv: &str) -> Result<Self, LoadError> {
        let rows = loader::load_trade(trade_csv)?;
        let continents = loader::load_continents(continents_csv)?;
        Ok(Self::new(&rows, &continents))
    }

    pub fn dispatch(&mut self, control: Control) {
        let transition = self.controller.apply(control);
        self.update_all(transition);
    }

    pub fn update_all(&mut self, transition: Transition) {
        let state = &self.controller.state;
        let commodity = state.commodity.as_deref().unwrap_or_default();
        let view = pipeline(
            &self.table,
            &[Key::Num(state.year), Key::from(commodity)],
            TRADE_REQUIRED,
            state,
            &self.lookup,
        );
        tracing::debug!(year = state.year, commodity, entities = view.len(), "trade update");

        let frame = Frame {
            view: &view,
            state,
            continents: &self.lookup,
            palette: &self.palette,
        };
        self.import_flow.update(&frame, transition);
        self.export_flow.update(&frame, transition);
        self.import_stream.update(&frame, transition);
        self.export_stream.update(&frame, transition);
        self.scatter.update(&frame, transition);
    }

    pub fn advance(&mut self, dt: f64) {
        let now = self.controller.advance(dt);
        self.import_flow.tick(now);
        self.export_flow.tick(now);
        self.import_stream.tick(now);
        self.export_stream.tick(now);
        self.scatter.tick(now);
    }

    pub fn now(&self) -> f64 {
        self.controller.now
    }

    pub fn state(&self) -> &FilterState {
        &self.controller.state
    }

    pub fn years(&self) -> &[i64] {
        &self.years
    }

    pub fn commodities(&self) -> &[String] {
        &self.commodities
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn charts(&self) -> [&dyn Chart; 5] {
        [
            &self.import_flow,
            &self.export_flow,
            &self.import_stream,
            &self.export_stream,
            &self.scatter,
        ]
    }

    /// SVG of the chart whose class list starts with `name`.
    pub fn chart_svg(&self, name: &str) -> Option<String> {
        let chart = self
            .charts()
            .into_iter()
            .find(|c| c.class().split_whitespace().next() == Some(name))?;
        Some(chart.svg(self.now()))
    }

    pub fn details(&self) -> Details {
        let state = self.state();
        let Some(commodity) = state.commodity.as_deref() else {
            return Details::Empty;
        };
        let hovered = state.hovered.as_deref().and_then(|country| {
            let path = [Key::Num(state.year), Key::from(commodity), Key::from(country)];
            self.table.get_path(&path).map(|flows| (country, flows))
        });
        let (country, import, export) = match hovered {
            Some((country, flows)) => (
                Some(country.to_string()),
                flows.leaf(Flow::Import.as_str()),
                flows.leaf(Flow::Export.as_str()),
            ),
            None => (None, None, None),
        };
        Details::Trade {
            year: state.year,
            commodity: commodity.to_string(),
            country,
            import,
            export,
        }
    }

    pub fn render_page(&self) -> String {
        crate::page::trade_page(self)
    }
}
