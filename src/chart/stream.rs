//! Stacked bar of the selected year next to a stream graph of every year.

use super::{Chart, ChartSize, Flow, Frame, Margin};
use crate::axis::{Axis, Orient};
use crate::color::Color;
use crate::format;
use crate::measure::TextMetrics;
use crate::nest::Nest;
use crate::path::{BandPoint, Curve, num};
use crate::record::Key;
use crate::scale::LinearScale;
use crate::scene::{Layer, Shape};
use crate::stack::{Series, StackedBar, fill_series, silhouette, stack_bars, year_totals};
use crate::transition::{AttrValue, Transition};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::rc::Rc;

const HOVER_FILL: Color = Color::rgba(255, 255, 255, 0.9);
const BAR_STROKE: Color = Color::rgb(33, 33, 33);
/// Gap between the bar and its labels.
const LABEL_MARGIN: f64 = 10.0;

pub struct StreamChart {
    flow: Flow,
    class: String,
    size: ChartSize,
    /// Commodity → flow → country → year.
    timeline: Rc<Nest>,
    years: Vec<i64>,
    bar_width: f64,
    bar_y: LinearScale,
    flow_x: LinearScale,
    flow_y: LinearScale,
    metrics: TextMetrics,
    streams: Layer,
    bars: Layer,
    labels: Layer,
    year_line: Shape,
    total_label: Shape,
    totals: BTreeMap<i64, f64>,
    x_axis: Axis,
}

impl StreamChart {
    pub fn new(flow: Flow, timeline: Rc<Nest>, years: Vec<i64>) -> Self {
        let margin = Margin {
            top: 30.0,
            right: 70.0,
            bottom: 40.0,
            left: 80.0,
        };
        Self::with_size(flow, timeline, years, ChartSize::new(940.0, 400.0, margin))
    }

    pub fn with_size(flow: Flow, timeline: Rc<Nest>, years: Vec<i64>, size: ChartSize) -> Self {
        let width = size.width();
        let height = size.height();
        let bar_width = width * 0.1;
        let inter_chart = width * 0.1;
        let stream_start = bar_width + inter_chart;

        let domain = match (years.first(), years.last()) {
            (Some(&first), Some(&last)) => (first as f64, last as f64),
            _ => (0.0, 1.0),
        };
        let flow_x = LinearScale::new(domain, (stream_start, width));
        let x_axis = Axis::new(Orient::Bottom, (stream_start, width))
            .offset(0.0, height)
            .ticks(
                flow_x
                    .ticks(10)
                    .into_iter()
                    .map(|t| (flow_x.apply(t), format::general(t)))
                    .collect(),
            );

        Self {
            flow,
            class: format!("streamchart{} streamchart", flow.as_str()),
            size,
            timeline,
            years,
            bar_width,
            bar_y: LinearScale::new((0.0, 1.0), (0.0, height)),
            flow_x,
            flow_y: LinearScale::new((0.0, 1.0), (0.0, height)),
            metrics: TextMetrics::default(),
            streams: Layer::new("streams"),
            bars: Layer::new("bars"),
            labels: Layer::new("labels"),
            year_line: Shape::line("year-line"),
            total_label: Shape::text("year-total-label"),
            totals: BTreeMap::new(),
            x_axis,
        }
    }

    pub fn streams(&self) -> &Layer {
        &self.streams
    }

    pub fn bars(&self) -> &Layer {
        &self.bars
    }

    pub fn labels(&self) -> &Layer {
        &self.labels
    }

    /// Summed flow per year for the last selected commodity.
    pub fn year_totals(&self) -> &BTreeMap<i64, f64> {
        &self.totals
    }

    pub fn total_label(&self) -> &Shape {
        &self.total_label
    }

    /// Bar slices of the selected year, ordered by continent.
    fn stack(&self, frame: &Frame<'_>) -> (Vec<StackedBar>, f64) {
        let flow = self.flow.as_str();
        let mut entities: Vec<_> = frame.view.iter().collect();
        entities.sort_by_key(|e| frame.palette.country_index(frame.continents, &e.key));
        stack_bars(entities.into_iter().map(|e| (e.key.clone(), e.get(flow))))
    }

    /// Silhouette-stacked layers of every year, for countries whose
    /// continent is shown.
    fn layers(&self, frame: &Frame<'_>) -> (Vec<Series>, f64) {
        let path = [
            Key::from(frame.state.commodity.as_deref().unwrap_or_default()),
            Key::from(self.flow.as_str()),
        ];
        let Some(per_country) = self.timeline.get_path(&path) else {
            return (Vec::new(), 0.0);
        };
        let filter = &frame.state.continent_filter;
        let mut series: Vec<Series> = fill_series(per_country, &self.years, |key| {
            frame.palette.country_index(frame.continents, key)
        })
        .into_iter()
        .filter(|s| frame.continents.get(&s.key).is_some_and(|c| filter.is_enabled(c)))
        .collect();
        let max = silhouette(&mut series);
        (series, max)
    }

    fn update_bars(&mut self, frame: &Frame<'_>, transition: Transition) {
        let (stacked, total) = self.stack(frame);
        self.bar_y.set_domain(0.0, total);

        let bar_width = self.bar_width;
        let keys = stacked.iter().map(|b| b.key.as_str());
        self.bars.join(keys.clone(), transition, |_| {
            Shape::group("datapoint").child(
                Shape::rect("bar")
                    .attr("height", 0.0)
                    .attr("stroke", BAR_STROKE),
            )
        });
        self.labels.join(keys, transition, |key| {
            Shape::group("label-group")
                .child(
                    Shape::text("label label-name")
                        .attr("x", bar_width + LABEL_MARGIN)
                        .content(key),
                )
                .child(Shape::text("label label-percentage").attr("x", -LABEL_MARGIN))
                .child(
                    Shape::line("label-separator")
                        .attr("x1", bar_width + 2.0)
                        .attr("y1", 0.0)
                        .attr("x2", bar_width + LABEL_MARGIN - 2.0)
                        .attr("y2", 0.0),
                )
                .child(
                    Shape::line("label-separator")
                        .attr("x1", -2.0)
                        .attr("y1", 0.0)
                        .attr("x2", -LABEL_MARGIN + 2.0)
                        .attr("y2", 0.0),
                )
        });

        for bar in &stacked {
            let top = self.bar_y.apply(bar.y0);
            let height = self.bar_y.apply(bar.y1 - bar.y0);
            let hovered = frame.is_hovered(&bar.key);

            if let Some(group) = self.bars.get_mut(&bar.key) {
                group.animate("transform", AttrValue::Translate(0.0, top), transition);
                if let (Some(rect), Some(fill)) = (group.select_mut("bar"), frame.fill(&bar.key, HOVER_FILL)) {
                    rect.animate("height", height, transition)
                        .animate("width", bar_width, transition)
                        .animate("fill", fill, transition);
                }
            }

            let shown = self.metrics.fits(height) || hovered;
            if let Some(label) = self.labels.get_mut(&bar.key) {
                label
                    .animate("transform", AttrValue::Translate(0.0, top + height / 2.0), transition)
                    .animate("opacity", if shown { 1.0 } else { 0.0 }, transition);
                if let Some(percentage) = label.select_mut("label-percentage") {
                    percentage.set_text(format::percent_one_decimal(bar.percentage));
                }
            }
        }
    }

    fn update_streams(&mut self, frame: &Frame<'_>, transition: Transition) {
        let (series, max) = self.layers(frame);
        self.flow_y.set_domain(0.0, max);
        self.totals = year_totals(&series, &self.years);

        self.streams.join(series.iter().map(|s| s.key.as_str()), transition, |_| {
            Shape::path("stream", Curve::Basis)
        });
        for s in &series {
            let band: Vec<BandPoint> = s
                .points
                .iter()
                .map(|p| BandPoint {
                    x: self.flow_x.apply(p.x as f64),
                    y0: self.flow_y.apply(p.y0),
                    y1: self.flow_y.apply(p.y0 + p.y),
                })
                .collect();
            let (Some(stroke), Some(fill)) = (frame.color(&s.key), frame.fill(&s.key, HOVER_FILL)) else {
                continue;
            };
            if let Some(stream) = self.streams.get_mut(&s.key) {
                stream
                    .animate("d", AttrValue::Band(band), transition)
                    .animate("fill", fill, transition)
                    .animate("stroke", stroke, transition);
            }
        }

        let year = frame.state.year;
        let x = self.flow_x.apply(year as f64);
        self.year_line
            .animate("x1", x, transition)
            .animate("y1", 0.0, transition)
            .animate("x2", x, transition)
            .animate("y2", self.size.height(), transition);
        let total = self.totals.get(&year).copied().unwrap_or(0.0);
        self.total_label
            .animate("x", x, transition)
            .animate("y", -5.0, transition)
            .set_text(format!("Total: {} kg", format::thousands(total)));
    }
}

impl Chart for StreamChart {
    fn class(&self) -> &str {
        &self.class
    }

    fn size(&self) -> ChartSize {
        self.size
    }

    fn update(&mut self, frame: &Frame<'_>, transition: Transition) {
        self.update_bars(frame, transition);
        self.update_streams(frame, transition);
    }

    fn tick(&mut self, now: f64) {
        self.streams.tick(now);
        self.bars.tick(now);
        self.labels.tick(now);
    }

    fn write_content(&self, out: &mut String, now: f64) {
        let margin = self.size.margin;
        let _ = write!(
            out,
            r#"<rect class="background" x="{}" y="{}" width="{}" height="{}"/>"#,
            num(-margin.left),
            num(-margin.top),
            num(self.size.total_width),
            num(self.size.total_height)
        );
        self.streams.write_svg(out, now);
        self.bars.write_svg(out, now);
        self.labels.write_svg(out, now);
        out.push_str(r#"<g class="reference-lines">"#);
        self.year_line.write_svg(out, now);
        self.total_label.write_svg(out, now);
        out.push_str("</g>");
        self.x_axis.write_svg(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures;
    use crate::continent::Palette;
    use crate::dashboard::FilterState;
    use crate::nest::{nest_trade, nest_trade_timeline};
    use crate::view::{TRADE_REQUIRED, select};

    fn setup() -> (StreamChart, Nest, FilterState, Palette) {
        let rows = fixtures::trade_rows();
        let timeline = Rc::new(nest_trade_timeline(&rows));
        let chart = StreamChart::new(Flow::Import, timeline, vec![2011, 2012, 2013]);
        let palette = Palette::trade();
        let mut state = FilterState::new(2012, palette.names());
        state.commodity = Some("Tin".into());
        (chart, nest_trade(&rows), state, palette)
    }

    #[test]
    fn test_bars_sorted_by_continent() {
        let (mut chart, table, state, palette) = setup();
        let lookup = fixtures::continents();
        let view = select(&table, &[Key::Num(2012), Key::from("Tin")], TRADE_REQUIRED);
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        chart.update(&frame, Transition::new(0.0, 1000.0));

        // Asia stacks before Europe in the trade palette
        let keys: Vec<&str> = chart.bars().live_keys().collect();
        assert_eq!(keys, vec!["China", "Germany"]);

        let germany = chart.labels().get("Germany").unwrap();
        let percentage = germany.select("label-percentage").unwrap();
        assert_eq!(percentage.text_content(), Some("75%"));
    }

    #[test]
    fn test_stream_layers_and_year_total() {
        let (mut chart, table, state, palette) = setup();
        let lookup = fixtures::continents();
        let view = select(&table, &[Key::Num(2012), Key::from("Tin")], TRADE_REQUIRED);
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        chart.update(&frame, Transition::new(0.0, 1000.0));

        assert_eq!(chart.streams().len(), 2);
        assert_eq!(chart.year_totals()[&2011], 100.0);
        assert_eq!(chart.year_totals()[&2012], 400.0);
        assert_eq!(chart.year_totals()[&2013], 200.0);
        assert_eq!(chart.total_label().text_content(), Some("Total: 400 kg"));

        let svg = chart.svg(1000.0);
        assert_eq!(svg.matches(r#"class="stream""#).count(), 2);
        assert!(svg.contains(r#"class="year-line""#));
        assert!(svg.contains(r#"class="streamchartImport streamchart""#));
    }

    #[test]
    fn test_hidden_continent_drops_its_stream() {
        let (mut chart, table, mut state, palette) = setup();
        let lookup = fixtures::continents();
        state.continent_filter.set("Asia", false);
        let view = select(&table, &[Key::Num(2012), Key::from("Tin")], TRADE_REQUIRED);
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        chart.update(&frame, Transition::immediate(0.0));
        assert_eq!(chart.streams().live_keys().collect::<Vec<_>>(), vec!["Germany"]);
        assert_eq!(chart.year_totals()[&2013], 0.0);
    }

    #[test]
    fn test_unknown_commodity_is_empty() {
        let (mut chart, _, mut state, palette) = setup();
        let lookup = fixtures::continents();
        state.commodity = Some("Gold".into());
        let frame = Frame {
            view: &[],
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        chart.update(&frame, Transition::immediate(0.0));
        assert!(chart.streams().is_empty());
        assert!(chart.bars().is_empty());
        assert_eq!(chart.total_label().text_content(), Some("Total: 0 kg"));
    }
}
