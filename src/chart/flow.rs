//! One stacked bar of trade volume per flow direction.

use super::{Chart, ChartSize, Flow, Frame, Margin};
use crate::color::Color;
use crate::measure::TextMetrics;
use crate::scale::LinearScale;
use crate::scene::{Layer, Shape};
use crate::stack::{StackedBar, stack_bars};
use crate::transition::{AttrValue, Transition};

const FILL: Color = Color::rgb(1, 87, 12);
const HOVER_FILL: Color = Color::rgb(0, 112, 14);

pub struct FlowChart {
    flow: Flow,
    class: String,
    size: ChartSize,
    y: LinearScale,
    metrics: TextMetrics,
    bars: Layer,
    labels: Layer,
}

impl FlowChart {
    pub fn new(flow: Flow) -> Self {
        let margin = Margin {
            top: 0.0,
            right: 50.0,
            bottom: 20.0,
            left: 50.0,
        };
        Self::with_size(flow, ChartSize::new(300.0, 700.0, margin))
    }

    pub fn with_size(flow: Flow, size: ChartSize) -> Self {
        Self {
            flow,
            class: format!("flowchart{} flowchart", flow.as_str()),
            size,
            y: LinearScale::new((0.0, 1.0), (0.0, size.height())),
            metrics: TextMetrics::default(),
            bars: Layer::new("bar-container"),
            labels: Layer::new("label-container"),
        }
    }

    pub fn bars(&self) -> &Layer {
        &self.bars
    }

    pub fn labels(&self) -> &Layer {
        &self.labels
    }

    /// Slices of the current frame, stacked in view order.
    pub fn stack(&self, frame: &Frame<'_>) -> (Vec<StackedBar>, f64) {
        let flow = self.flow.as_str();
        stack_bars(frame.view.iter().map(|e| (e.key.clone(), e.get(flow))))
    }
}

/// Short label for a country bar.
fn short_label(key: &str) -> String {
    key.chars().take(3).collect()
}

impl Chart for FlowChart {
    fn class(&self) -> &str {
        &self.class
    }

    fn size(&self) -> ChartSize {
        self.size
    }

    fn update(&mut self, frame: &Frame<'_>, transition: Transition) {
        let (stacked, total) = self.stack(frame);
        self.y.set_domain(0.0, total);

        let keys: Vec<&str> = stacked.iter().map(|b| b.key.as_str()).collect();
        let font_size = self.metrics.font_size;
        self.bars.join(keys.iter().copied(), transition, |_| {
            Shape::group("datapoint").child(Shape::rect("bar").attr("height", 0.0).attr("fill", FILL))
        });
        self.labels.join(keys.iter().copied(), transition, |key| {
            Shape::text("label")
                .attr("y", 0.0)
                .attr("font-size", font_size)
                .content(short_label(key))
        });

        let width = self.size.width();
        for bar in &stacked {
            let top = self.y.apply(bar.y0);
            let height = self.y.apply(bar.y1 - bar.y0);
            let hovered = frame.is_hovered(&bar.key);

            if let Some(group) = self.bars.get_mut(&bar.key) {
                group.animate("transform", AttrValue::Translate(0.0, top), transition);
                if let Some(rect) = group.select_mut("bar") {
                    rect.animate("width", width, transition)
                        .animate("height", height, transition)
                        .animate("fill", if hovered { HOVER_FILL } else { FILL }, transition);
                }
            }

            let shown = self.metrics.fits(height) || hovered;
            if let Some(label) = self.labels.get_mut(&bar.key) {
                label
                    .set("x", width / 2.0)
                    .animate("y", top + height / 2.0, transition)
                    .animate("opacity", if shown { 1.0 } else { 0.0 }, transition);
            }
        }
    }

    fn tick(&mut self, now: f64) {
        self.bars.tick(now);
        self.labels.tick(now);
    }

    fn write_content(&self, out: &mut String, now: f64) {
        self.bars.write_svg(out, now);
        self.labels.write_svg(out, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures;
    use crate::continent::Palette;
    use crate::dashboard::FilterState;
    use crate::nest::nest_trade;
    use crate::record::Key;
    use crate::view::{TRADE_REQUIRED, select};

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("Germany"), "Ger");
        assert_eq!(short_label("UK"), "UK");
    }

    #[test]
    fn test_stacks_only_the_chart_flow() {
        let table = nest_trade(&fixtures::trade_rows());
        let view = select(&table, &[Key::Num(2012), Key::from("Tin")], TRADE_REQUIRED);
        let lookup = fixtures::continents();
        let palette = Palette::trade();
        let mut state = FilterState::new(2012, palette.names());
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };

        let mut chart = FlowChart::new(Flow::Import);
        chart.update(&frame, Transition::new(0.0, 1000.0));
        let keys: Vec<&str> = chart.bars().live_keys().collect();
        // Niger only exports
        assert_eq!(keys, vec!["China", "Germany"]);

        let height = chart.size().height();
        let china = chart.bars().get("China").unwrap().select("bar").unwrap();
        assert_eq!(china.get("height", 1000.0), Some(AttrValue::Num(height * 0.25)));
        let germany = chart.bars().get("Germany").unwrap();
        assert_eq!(
            germany.get("transform", 1000.0),
            Some(AttrValue::Translate(0.0, height * 0.25))
        );

        state.hovered = Some("China".into());
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        chart.update(&frame, Transition::new(1000.0, 500.0));
        let china = chart.bars().get("China").unwrap().select("bar").unwrap();
        assert_eq!(china.target("fill"), Some(&AttrValue::Color(HOVER_FILL)));
        let label = chart.labels().get("China").unwrap();
        assert_eq!(label.text_content(), Some("Chi"));
        assert_eq!(label.target("opacity"), Some(&AttrValue::Num(1.0)));

        assert!(chart.svg(1500.0).contains(r#"class="flowchartImport flowchart""#));
    }

    #[test]
    fn test_small_bars_hide_their_label() {
        let view = vec![
            fixtures::entity("Germany", &[("Export", 1000.0)]),
            fixtures::entity("Niger", &[("Export", 1.0)]),
        ];
        let lookup = fixtures::continents();
        let palette = Palette::trade();
        let state = FilterState::new(2012, palette.names());
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        let mut chart = FlowChart::new(Flow::Export);
        chart.update(&frame, Transition::immediate(0.0));

        let opacity = |key| chart.labels().get(key).unwrap().get("opacity", 0.0);
        assert_eq!(opacity("Germany"), Some(AttrValue::Num(1.0)));
        assert_eq!(opacity("Niger"), Some(AttrValue::Num(0.0)));
    }
}
