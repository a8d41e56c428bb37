//! Chart instances.
//!
//! Every chart owns its scales and keyed layers. `update` reconciles the
//! layers against the current frame; `write_svg` draws them at a clock time.

mod difference;
mod flow;
mod scatter;
mod stream;
mod trade_scatter;
mod year_trend;

pub use difference::DifferenceChart;
pub use flow::FlowChart;
pub use scatter::ScatterPlot;
pub use stream::StreamChart;
pub use trade_scatter::TradeScatterPlot;
pub use year_trend::YearChart;

use crate::color::Color;
use crate::continent::{ContinentLookup, Palette};
use crate::dashboard::FilterState;
use crate::path::num;
use crate::transition::Transition;
use crate::view::EntityView;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn uniform(m: f64) -> Self {
        Self {
            top: m,
            right: m,
            bottom: m,
            left: m,
        }
    }
}

/// Outer pixel size of a chart and the margins around its plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSize {
    pub total_width: f64,
    pub total_height: f64,
    pub margin: Margin,
}

impl ChartSize {
    pub const fn new(total_width: f64, total_height: f64, margin: Margin) -> Self {
        Self {
            total_width,
            total_height,
            margin,
        }
    }

    /// Width of the plot area.
    pub fn width(&self) -> f64 {
        self.total_width - self.margin.left - self.margin.right
    }

    pub fn height(&self) -> f64 {
        self.total_height - self.margin.top - self.margin.bottom
    }
}

/// Everything a chart reads during one update pass.
pub struct Frame<'a> {
    pub view: &'a [EntityView],
    pub state: &'a FilterState,
    pub continents: &'a ContinentLookup,
    pub palette: &'a Palette,
}

impl Frame<'_> {
    pub fn is_hovered(&self, key: &str) -> bool {
        self.state.hovered.as_deref() == Some(key)
    }

    /// Continent colour of an entity in the view.
    pub fn color(&self, key: &str) -> Option<Color> {
        self.palette.country_color(self.continents, key)
    }

    /// Continent colour, or `highlight` for the hovered entity.
    pub fn fill(&self, key: &str, highlight: Color) -> Option<Color> {
        if self.is_hovered(key) {
            Some(highlight)
        } else {
            self.color(key)
        }
    }
}

pub trait Chart {
    /// CSS class of the chart's `<svg>`.
    fn class(&self) -> &str;

    fn size(&self) -> ChartSize;

    fn update(&mut self, frame: &Frame<'_>, transition: Transition);

    /// Drop marks whose exit transition has finished.
    fn tick(&mut self, now: f64);

    /// Plot-area content, drawn inside the margin offset.
    fn write_content(&self, out: &mut String, now: f64);

    fn svg(&self, now: f64) -> String {
        let size = self.size();
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="{}" width="{}" height="{}">"#,
            self.class(),
            num(size.total_width),
            num(size.total_height)
        );
        let _ = write!(
            out,
            r#"<g transform="translate({},{})">"#,
            num(size.margin.left),
            num(size.margin.top)
        );
        self.write_content(&mut out, now);
        out.push_str("</g></svg>");
        out
    }
}

/// Total access of a water entity. Falls back to the mean of rural and urban
/// access when the dataset has no Total for the country.
pub fn water_total(entity: &EntityView) -> f64 {
    entity.get("Total").unwrap_or_else(|| {
        let rural = entity.get("Rural").unwrap_or(0.0);
        let urban = entity.get("Urban").unwrap_or(0.0);
        (rural + urban) / 2.0
    })
}

/// Trade flow direction shown by the flow and stream charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Import,
    Export,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Flow::Import => "Import",
            Flow::Export => "Export",
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::continent::ContinentLookup;
    use crate::record::{ContinentRow, TradeRow, WaterRow};
    use crate::view::EntityView;

    pub fn continents() -> ContinentLookup {
        ContinentLookup::from_rows(&[
            ContinentRow {
                country: "Germany".into(),
                continent: "Europe".into(),
            },
            ContinentRow {
                country: "France".into(),
                continent: "Europe".into(),
            },
            ContinentRow {
                country: "Niger".into(),
                continent: "Africa".into(),
            },
            ContinentRow {
                country: "China".into(),
                continent: "Asia".into(),
            },
        ])
    }

    pub fn water_rows() -> Vec<WaterRow> {
        let mut rows = Vec::new();
        let data = [
            (2000, "Germany", [30000.0, 99.0, 100.0, 99.5]),
            (2012, "Germany", [40000.0, 100.0, 100.0, 100.0]),
            (2000, "Niger", [300.0, 30.0, 70.0, 40.0]),
            (2012, "Niger", [400.0, 40.0, 90.0, 50.0]),
            (2012, "France", [38000.0, 100.0, 100.0, 100.0]),
        ];
        for (year, country, values) in data {
            for (identifier, value) in ["GDP", "Rural", "Urban", "Total"].iter().zip(values) {
                rows.push(WaterRow {
                    year: Some(year),
                    country: country.to_string(),
                    identifier: identifier.to_string(),
                    value,
                });
            }
        }
        rows
    }

    pub fn trade_rows() -> Vec<TradeRow> {
        let data = [
            (2011, "Tin", "Germany", "Import", 100.0),
            (2012, "Tin", "Germany", "Import", 300.0),
            (2012, "Tin", "Germany", "Export", 50.0),
            (2012, "Tin", "Niger", "Export", 150.0),
            (2012, "Tin", "China", "Import", 100.0),
            (2013, "Tin", "China", "Import", 200.0),
            (2012, "Silicon, <99.99% pure", "China", "Export", 10.0),
        ];
        data.iter()
            .map(|&(year, commodity, country, flow, quantity)| TradeRow {
                year: Some(year),
                commodity: commodity.to_string(),
                country: country.to_string(),
                flow: flow.to_string(),
                quantity,
            })
            .collect()
    }

    pub fn entity(key: &str, values: &[(&str, f64)]) -> EntityView {
        EntityView {
            key: key.to_string(),
            value: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}
