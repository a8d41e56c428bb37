//! Export against import volume, one dot per country.

use super::{Chart, ChartSize, Flow, Frame, Margin};
use crate::axis::{Axis, Orient};
use crate::color::Color;
use crate::format;
use crate::scale::LinearScale;
use crate::scene::{Layer, Shape};
use crate::transition::Transition;

const HIGHLIGHT: Color = Color::rgb(125, 203, 121);
const DOT_RADIUS: f64 = 4.0;
/// Dots are nudged off the axes.
const OFFSET_X: f64 = 15.0;
const OFFSET_Y: f64 = -10.0;

pub struct TradeScatterPlot {
    size: ChartSize,
    x: LinearScale,
    y: LinearScale,
    dots: Layer,
    x_axis: Axis,
    y_axis: Axis,
}

impl Default for TradeScatterPlot {
    fn default() -> Self {
        let margin = Margin {
            top: 50.0,
            right: 20.0,
            bottom: 50.0,
            left: 20.0,
        };
        Self::new(ChartSize::new(400.0, 400.0, margin))
    }
}

impl TradeScatterPlot {
    pub fn new(size: ChartSize) -> Self {
        let (width, height) = (size.width(), size.height());
        Self {
            size,
            x: LinearScale::new((0.0, 1.0), (0.0, width)),
            y: LinearScale::new((0.0, 1.0), (height, 0.0)),
            dots: Layer::new("dots-container"),
            x_axis: Axis::new(Orient::Bottom, (0.0, width))
                .offset(0.0, height)
                .title("Export (kg)"),
            y_axis: Axis::new(Orient::Right, (height, 0.0)).title("Import (kg)"),
        }
    }

    pub fn dots(&self) -> &Layer {
        &self.dots
    }

    pub fn domains(&self) -> ((f64, f64), (f64, f64)) {
        (self.x.domain, self.y.domain)
    }
}

fn axis_ticks(scale: &LinearScale, count: usize) -> Vec<(f64, String)> {
    scale
        .ticks(count)
        .into_iter()
        .map(|t| (scale.apply(t), format::thousands(t)))
        .collect()
}

impl Chart for TradeScatterPlot {
    fn class(&self) -> &str {
        "scatterplot"
    }

    fn size(&self) -> ChartSize {
        self.size
    }

    fn update(&mut self, frame: &Frame<'_>, transition: Transition) {
        let max = |flow: Flow| {
            frame
                .view
                .iter()
                .filter_map(|e| e.get(flow.as_str()))
                .fold(0.0, f64::max)
        };
        self.x.set_domain(0.0, max(Flow::Export));
        self.y.set_domain(0.0, max(Flow::Import));
        self.x_axis.ticks = axis_ticks(&self.x, 3);
        self.y_axis.ticks = axis_ticks(&self.y, 4);

        self.dots.join(frame.view.iter().map(|e| e.key.as_str()), transition, |_| {
            Shape::group("datapoint dots").child(Shape::circle("dot").attr("r", DOT_RADIUS))
        });

        for entity in frame.view {
            let export = entity.get(Flow::Export.as_str()).unwrap_or(0.0);
            let import = entity.get(Flow::Import.as_str()).unwrap_or(0.0);
            let cx = OFFSET_X + self.x.apply(export);
            let cy = self.y.apply(import) + OFFSET_Y;
            let fill = if frame.is_hovered(&entity.key) {
                HIGHLIGHT
            } else {
                Color::TRANSPARENT
            };

            let Some(stroke) = frame.fill(&entity.key, HIGHLIGHT) else {
                continue;
            };
            let Some(dot) = self
                .dots
                .get_mut(&entity.key)
                .and_then(|group| group.select_mut("dot"))
            else {
                continue;
            };
            dot.animate("stroke", stroke, transition)
                .animate("fill", fill, transition)
                .animate("cx", cx, transition)
                .animate("cy", cy, transition);
        }
    }

    fn tick(&mut self, now: f64) {
        self.dots.tick(now);
    }

    fn write_content(&self, out: &mut String, now: f64) {
        self.x_axis.write_svg(out);
        self.y_axis.write_svg(out);
        self.dots.write_svg(out, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures::{self, entity};
    use crate::continent::Palette;
    use crate::dashboard::FilterState;
    use crate::transition::AttrValue;

    #[test]
    fn test_domains_follow_the_view() {
        let view = vec![
            entity("Germany", &[("Import", 300.0), ("Export", 50.0)]),
            entity("Niger", &[("Export", 150.0)]),
        ];
        let lookup = fixtures::continents();
        let palette = Palette::trade();
        let mut state = FilterState::new(2012, palette.names());
        state.hovered = Some("Niger".into());
        let frame = Frame {
            view: &view,
            state: &state,
            continents: &lookup,
            palette: &palette,
        };

        let mut chart = TradeScatterPlot::default();
        chart.update(&frame, Transition::new(0.0, 500.0));
        assert_eq!(chart.domains(), ((0.0, 150.0), (0.0, 300.0)));

        let height = chart.size().height();
        let niger = chart.dots().get("Niger").unwrap().select("dot").unwrap();
        // no import: sits on the x axis
        assert_eq!(niger.get("cy", 500.0), Some(AttrValue::Num(height + OFFSET_Y)));
        assert_eq!(niger.target("fill"), Some(&AttrValue::Color(HIGHLIGHT)));

        let germany = chart.dots().get("Germany").unwrap().select("dot").unwrap();
        assert_eq!(germany.target("fill"), Some(&AttrValue::Color(Color::TRANSPARENT)));

        let svg = chart.svg(500.0);
        assert_eq!(svg.matches(r#"class="datapoint dots""#).count(), 2);
        assert!(svg.contains("Export (kg)"));
    }

    #[test]
    fn test_empty_view_stays_finite() {
        let lookup = fixtures::continents();
        let palette = Palette::trade();
        let state = FilterState::new(2012, palette.names());
        let frame = Frame {
            view: &[],
            state: &state,
            continents: &lookup,
            palette: &palette,
        };
        let mut chart = TradeScatterPlot::default();
        chart.update(&frame, Transition::immediate(0.0));
        assert!(chart.dots().is_empty());
        assert!(!chart.svg(0.0).contains("NaN"));
    }
}
