//! Water access against GDP per capita.

use super::{Chart, ChartSize, Frame, Margin, water_total};
use crate::axis::{Axis, Orient};
use crate::color::Color;
use crate::format;
use crate::measure::TextMetrics;
use crate::nest::Nest;
use crate::scale::{LinearScale, LogScale};
use crate::scene::{Layer, Shape};
use crate::transition::{AttrValue, Transition};

const HIGHLIGHT: Color = Color::rgb(33, 33, 33);
/// Subtracted from the lowest GDP so no point sits on the axis.
const GDP_PAD: f64 = 5.0;
const DOT_RADIUS: f64 = 4.0;

pub struct ScatterPlot {
    size: ChartSize,
    x: LogScale,
    y: LinearScale,
    lines: Layer,
    points: Layer,
    tooltip: Shape,
    metrics: TextMetrics,
    x_axis: Axis,
    y_axis: Axis,
}

impl ScatterPlot {
    pub fn new(table: &Nest) -> Self {
        Self::with_size(table, ChartSize::new(1000.0, 400.0, Margin::uniform(50.0)))
    }

    pub fn with_size(table: &Nest, size: ChartSize) -> Self {
        let (min, max) = gdp_extent(table).unwrap_or((1.0, 10.0));
        let x = LogScale::new((gdp_floor(min), max), (0.0, size.width()));
        let y = LinearScale::new((1.0, 0.0), (0.0, size.height()));

        let x_axis = Axis::new(Orient::Bottom, (0.0, size.width()))
            .offset(0.0, size.height())
            .ticks(x.ticks().into_iter().map(|t| (x.apply(t), format::general(t))).collect())
            .title("Country GDP per capita (US dollars)");
        let y_axis = Axis::new(Orient::Left, (0.0, size.height()))
            .ticks(y.ticks(10).into_iter().map(|t| (y.apply(t), format::percent(t))).collect())
            .title("% of people with access to improved water sources, plotted against country GDP.");

        let tooltip = Shape::group("tooltip")
            .attr("display", "none")
            .child(Shape::rect("background"))
            .child(Shape::text("name"))
            .child(Shape::text("total"))
            .child(Shape::text("urban"))
            .child(Shape::text("rural"));

        Self {
            size,
            x,
            y,
            lines: Layer::new("lines"),
            points: Layer::new("data"),
            tooltip,
            metrics: TextMetrics::default(),
            x_axis,
            y_axis,
        }
    }

    pub fn x_domain(&self) -> (f64, f64) {
        self.x.domain
    }

    pub fn points(&self) -> &Layer {
        &self.points
    }

    pub fn lines(&self) -> &Layer {
        &self.lines
    }

    pub fn tooltip(&self) -> &Shape {
        &self.tooltip
    }

    fn update_tooltip(&mut self, frame: &Frame<'_>, positions: &[(String, f64, f64)]) {
        let hovered = frame
            .state
            .hovered
            .as_deref()
            .and_then(|key| frame.view.iter().find(|e| e.key == key));
        let Some(entity) = hovered else {
            self.tooltip.set("display", "none");
            return;
        };
        let Some(&(_, cx, cy)) = positions.iter().find(|(k, _, _)| *k == entity.key) else {
            return;
        };

        let lines = [
            entity.key.clone(),
            format!("Total: {}%", format::general(water_total(entity))),
            format!("Urban: {}%", format::general(entity.get("Urban").unwrap_or(0.0))),
            format!("Rural: {}%", format::general(entity.get("Rural").unwrap_or(0.0))),
        ];
        let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let (width, height) = self.metrics.block_size(&line_refs);
        let line_height = self.metrics.line_height;
        let color = frame.color(&entity.key);

        self.tooltip
            .set("display", "block")
            .set("transform", AttrValue::Translate(cx + 10.0, cy));
        if let Some(bg) = self.tooltip.select_mut("background") {
            bg.set("width", width).set("height", height);
        }
        for (i, (class, text)) in ["name", "total", "urban", "rural"].iter().zip(&lines).enumerate() {
            if let Some(line) = self.tooltip.select_mut(class) {
                line.set("x", self.metrics.padding)
                    .set("y", self.metrics.padding + line_height * (i as f64 + 1.0))
                    .set_text(text.clone());
            }
        }
        if let (Some(name), Some(color)) = (self.tooltip.select_mut("name"), color) {
            name.set("fill", color);
        }
    }
}

impl Chart for ScatterPlot {
    fn class(&self) -> &str {
        "scatterPlot"
    }

    fn size(&self) -> ChartSize {
        self.size
    }

    fn update(&mut self, frame: &Frame<'_>, transition: Transition) {
        let height = self.size.height();
        let positions: Vec<(String, f64, f64)> = frame
            .view
            .iter()
            .map(|e| {
                let cx = self.x.apply(e.get("GDP").unwrap_or(0.0)).round();
                let cy = self.y.apply(water_total(e) / 100.0);
                (e.key.clone(), cx, cy)
            })
            .collect();
        let keys = positions.iter().map(|(k, _, _)| k.as_str());

        self.points.join(keys.clone(), transition, |_| {
            Shape::group("datapoint")
                .child(Shape::rect("hovercatcher"))
                .child(Shape::circle("total").attr("r", DOT_RADIUS))
        });
        self.lines.join(keys, transition, |_| {
            Shape::group("lineGroup")
                .child(Shape::line("x"))
                .child(Shape::line("y"))
        });

        let hide_lines = frame.state.text_filter.is_empty();
        for (key, cx, cy) in &positions {
            let (cx, cy) = (*cx, *cy);
            if let Some(point) = self.points.get_mut(key) {
                if let Some(catcher) = point.select_mut("hovercatcher") {
                    catcher
                        .animate("x", cx - DOT_RADIUS * 2.0, transition)
                        .animate("y", cy - DOT_RADIUS * 2.0, transition)
                        .set("width", DOT_RADIUS * 4.0)
                        .set("height", DOT_RADIUS * 4.0)
                        .set("fill", Color::TRANSPARENT);
                }
                if let (Some(circle), Some(fill)) = (point.select_mut("total"), frame.fill(key, HIGHLIGHT)) {
                    circle
                        .animate("fill", fill, transition)
                        .animate("cx", cx, transition)
                        .animate("cy", cy, transition);
                }
            }

            if let Some(group) = self.lines.get_mut(key) {
                group
                    .classed("hidden", hide_lines)
                    .classed("highlight", frame.is_hovered(key));
                if let Some(line) = group.select_mut("x") {
                    line.animate("x1", 0.0, transition)
                        .animate("y1", cy, transition)
                        .animate("x2", cx, transition)
                        .animate("y2", cy, transition);
                }
                if let Some(line) = group.select_mut("y") {
                    line.animate("x1", cx, transition)
                        .animate("y1", cy, transition)
                        .animate("x2", cx, transition)
                        .animate("y2", height, transition);
                }
            }
        }

        self.update_tooltip(frame, &positions);
    }

    fn tick(&mut self, now: f64) {
        self.points.tick(now);
        self.lines.tick(now);
    }

    fn write_content(&self, out: &mut String, now: f64) {
        self.lines.write_svg(out, now);
        self.points.write_svg(out, now);
        self.x_axis.write_svg(out);
        self.y_axis.write_svg(out);
        self.tooltip.write_svg(out, now);
    }
}

/// Lowest and highest GDP over every year of the table.
/// Lower end of the GDP axis. Padding a tiny minimum would push the log
/// domain toward zero, so those fall back to half the minimum.
fn gdp_floor(min: f64) -> f64 {
    if min > GDP_PAD * 2.0 { min - GDP_PAD } else { min / 2.0 }
}

fn gdp_extent(table: &Nest) -> Option<(f64, f64)> {
    table
        .entries()
        .flat_map(|(_, year)| year.entries())
        .filter_map(|(_, country)| country.leaf("GDP"))
        .fold(None, |acc, gdp| match acc {
            None => Some((gdp, gdp)),
            Some((lo, hi)) => Some((f64::min(lo, gdp), f64::max(hi, gdp))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures;
    use crate::continent::Palette;
    use crate::dashboard::FilterState;
    use crate::nest::nest_water;
    use crate::record::WaterRow;
    use crate::view::{WATER_REQUIRED, select_year};

    #[test]
    fn test_gdp_domain_spans_all_years() {
        let table = nest_water(&fixtures::water_rows());
        let chart = ScatterPlot::new(&table);
        assert_eq!(chart.x_domain(), (300.0 - GDP_PAD, 40000.0));
    }

    #[test]
    fn test_tiny_gdp_keeps_axis_narrow() {
        let mut rows = fixtures::water_rows();
        rows.push(WaterRow {
            year: Some(2012),
            country: "Tuvalu".into(),
            identifier: "GDP".into(),
            value: 4.0,
        });
        let chart = ScatterPlot::new(&nest_water(&rows));
        assert_eq!(chart.x_domain(), (2.0, 40000.0));
        let ticks: Vec<&str> = chart.x_axis.ticks.iter().map(|(_, label)| label.as_str()).collect();
        assert_eq!(ticks, ["10", "100", "1000", "10000"]);
    }

    #[test]
    fn test_update_binds_one_mark_per_key() {
        let table = nest_water(&fixtures::water_rows());
        let lookup = fixtures::continents();
        let palette = Palette::water();
        let mut state = FilterState::new(2012, palette.names());
        let view = select_year(&table, 2012, WATER_REQUIRED);
        let mut chart = ScatterPlot::new(&table);

        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        chart.update(&frame, Transition::new(0.0, 1000.0));
        assert_eq!(chart.points().len(), 3);
        assert_eq!(chart.lines().len(), 3);

        let svg = chart.svg(1000.0);
        assert_eq!(svg.matches(r#"class="datapoint""#).count(), 3);
        assert_eq!(svg.matches(r#"class="lineGroup hidden""#).count(), 3);

        state.hovered = Some("Niger".into());
        state.text_filter = "ni".into();
        let view: Vec<_> = view.into_iter().filter(|e| e.key == "Niger").collect();
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        chart.update(&frame, Transition::new(1000.0, 500.0));
        chart.tick(1500.0);
        assert_eq!(chart.points().live_keys().collect::<Vec<_>>(), vec!["Niger"]);
        assert_eq!(chart.points().len(), 1);

        let circle = chart.points().get("Niger").unwrap().select("total").unwrap();
        assert_eq!(circle.target("fill"), Some(&AttrValue::Color(HIGHLIGHT)));
        assert_eq!(
            chart.tooltip().target("display"),
            Some(&AttrValue::Text("block".into()))
        );
        let name = chart.tooltip().select("name").unwrap();
        assert_eq!(name.text_content(), Some("Niger"));
    }
}
