//! Average water access per continent over time.

use super::{Chart, ChartSize, Frame, Margin, water_total};
use crate::axis::{Axis, Orient};
use crate::continent::{ContinentLookup, Palette};
use crate::format;
use crate::nest::Nest;
use crate::path::Curve;
use crate::scale::LinearScale;
use crate::scene::{Layer, Shape};
use crate::transition::{AttrValue, Transition};
use crate::view::{WATER_REQUIRED, select};
use std::collections::BTreeMap;

/// Mean Total of one continent in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub year: i64,
    pub value: f64,
}

pub struct YearChart {
    size: ChartSize,
    x: LinearScale,
    y: LinearScale,
    trends: BTreeMap<&'static str, Vec<TrendPoint>>,
    /// Palette order, used as draw order.
    continents: Vec<&'static str>,
    lines: Layer,
    year_line: Shape,
    x_axis: Axis,
    y_axis: Axis,
}

/// Per-continent averages of Total for every year of the table.
///
/// Only countries carrying every required water category and a known
/// continent contribute. Years in which a continent has no such country are
/// left out of its trend.
pub fn continent_trends(
    table: &Nest,
    lookup: &ContinentLookup,
    palette: &Palette,
) -> BTreeMap<&'static str, Vec<TrendPoint>> {
    let mut trends: BTreeMap<&'static str, Vec<TrendPoint>> =
        palette.names().map(|name| (name, Vec::new())).collect();

    for key in table.keys() {
        let Some(year) = key.as_num() else {
            continue;
        };
        let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for entity in select(table, std::slice::from_ref(key), WATER_REQUIRED) {
            let Some(continent) = lookup.get(&entity.key) else {
                continue;
            };
            let slot = acc.entry(continent).or_insert((0.0, 0));
            slot.0 += water_total(&entity);
            slot.1 += 1;
        }
        for (name, points) in trends.iter_mut() {
            if let Some(&(sum, count)) = acc.get(name) {
                points.push(TrendPoint {
                    year,
                    value: sum / count as f64,
                });
            }
        }
    }
    trends
}

impl YearChart {
    pub fn new(table: &Nest, lookup: &ContinentLookup, palette: &Palette) -> Self {
        Self::with_size(
            table,
            lookup,
            palette,
            ChartSize::new(800.0, 400.0, Margin::uniform(50.0)),
        )
    }

    pub fn with_size(table: &Nest, lookup: &ContinentLookup, palette: &Palette, size: ChartSize) -> Self {
        let years: Vec<f64> = table.keys().filter_map(|k| k.as_num()).map(|y| y as f64).collect();
        let lo = years.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = years.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let domain = if years.is_empty() { (0.0, 1.0) } else { (lo, hi) };

        let x = LinearScale::new(domain, (0.0, size.width()));
        let y = LinearScale::new((1.0, 0.0), (0.0, size.height()));

        let x_axis = Axis::new(Orient::Bottom, (0.0, size.width()))
            .offset(0.0, size.height())
            .ticks(x.ticks(10).into_iter().map(|t| (x.apply(t), format::general(t))).collect())
            .title("Year");
        let y_axis = Axis::new(Orient::Left, (0.0, size.height()))
            .ticks(y.ticks(10).into_iter().map(|t| (y.apply(t), format::percent(t))).collect())
            .title("% of people with access to improved water sources, per continent, over time.");

        let year_line = Shape::line("yearline")
            .attr("x1", 0.0)
            .attr("y1", 0.0)
            .attr("x2", 0.0)
            .attr("y2", size.height());

        Self {
            size,
            x,
            y,
            trends: continent_trends(table, lookup, palette),
            continents: palette.names().collect(),
            lines: Layer::new("continentLines"),
            year_line,
            x_axis,
            y_axis,
        }
    }

    pub fn trend(&self, continent: &str) -> Option<&[TrendPoint]> {
        self.trends.get(continent).map(Vec::as_slice)
    }

    pub fn lines(&self) -> &Layer {
        &self.lines
    }

    pub fn year_line(&self) -> &Shape {
        &self.year_line
    }

    fn points(&self, continent: &str) -> Vec<(f64, f64)> {
        self.trend(continent)
            .unwrap_or_default()
            .iter()
            .map(|p| (self.x.apply(p.year as f64), self.y.apply(p.value / 100.0)))
            .collect()
    }
}

impl Chart for YearChart {
    fn class(&self) -> &str {
        "yearChart"
    }

    fn size(&self) -> ChartSize {
        self.size
    }

    fn update(&mut self, frame: &Frame<'_>, transition: Transition) {
        let filter = &frame.state.continent_filter;
        let enabled: Vec<&'static str> = self
            .continents
            .iter()
            .copied()
            .filter(|c| filter.is_enabled(c))
            .collect();

        let paths: Vec<(&str, Vec<(f64, f64)>)> =
            enabled.iter().map(|&c| (c, self.points(c))).collect();
        self.lines.join(enabled.iter().copied(), transition, |_| {
            Shape::path("continentLine", Curve::Linear)
                .attr("fill", "none")
                .attr("stroke-width", 1.5)
        });
        for (continent, points) in paths {
            let (Some(line), Some(stroke)) = (self.lines.get_mut(continent), frame.palette.color(continent))
            else {
                continue;
            };
            line.set("d", AttrValue::Points(points)).set("stroke", stroke);
        }

        let x = self.x.apply(frame.state.year as f64);
        self.year_line
            .animate("x1", x, transition)
            .animate("x2", x, transition);
    }

    fn tick(&mut self, now: f64) {
        self.lines.tick(now);
    }

    fn write_content(&self, out: &mut String, now: f64) {
        self.x_axis.write_svg(out);
        self.y_axis.write_svg(out);
        self.year_line.write_svg(out, now);
        self.lines.write_svg(out, now);
    }
}
