//! Gap between urban and rural water access, one bar per country.

use super::{Chart, ChartSize, Frame, Margin, water_total};
use crate::axis::{Axis, Orient};
use crate::format;
use crate::scale::{BandScale, LinearScale};
use crate::scene::{Layer, Shape};
use crate::transition::Transition;
use crate::view::EntityView;
use std::cmp::Ordering;

pub struct DifferenceChart {
    size: ChartSize,
    x: BandScale,
    y: LinearScale,
    bars: Layer,
    x_axis: Axis,
    y_axis: Axis,
}

impl Default for DifferenceChart {
    fn default() -> Self {
        let margin = Margin {
            top: 50.0,
            right: 50.0,
            bottom: 120.0,
            left: 50.0,
        };
        Self::new(ChartSize::new(1800.0, 300.0, margin))
    }
}

impl DifferenceChart {
    pub fn new(size: ChartSize) -> Self {
        let x = BandScale::new((0.0, size.width()), 0.1, 0.2);
        let y = LinearScale::new((0.0, 1.0), (size.height(), 0.0));
        let y_axis = Axis::new(Orient::Left, (0.0, size.height()))
            .ticks(y.ticks(10).into_iter().map(|t| (y.apply(t), format::percent(t))).collect())
            .title("Difference in access between rural and urban areas.");
        let x_axis = Axis::new(Orient::Bottom, (0.0, size.width())).offset(0.0, size.height());

        Self {
            size,
            x,
            y,
            bars: Layer::new("bars"),
            x_axis,
            y_axis,
        }
    }

    /// Bar order of the last update.
    pub fn order(&self) -> &[String] {
        self.x.domain()
    }

    pub fn bars(&self) -> &Layer {
        &self.bars
    }
}

/// Absolute gap between urban and rural access, in percentage points.
pub fn access_gap(entity: &EntityView) -> f64 {
    let urban = entity.get("Urban").unwrap_or(0.0);
    let rural = entity.get("Rural").unwrap_or(0.0);
    (urban - rural).abs()
}

/// Largest gap first; equal gaps put the higher total first.
pub fn sort_by_gap(view: &mut [&EntityView]) {
    view.sort_by(|a, b| {
        access_gap(b)
            .partial_cmp(&access_gap(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                water_total(b)
                    .partial_cmp(&water_total(a))
                    .unwrap_or(Ordering::Equal)
            })
    });
}

impl Chart for DifferenceChart {
    fn class(&self) -> &str {
        "differenceChart"
    }

    fn size(&self) -> ChartSize {
        self.size
    }

    fn update(&mut self, frame: &Frame<'_>, transition: Transition) {
        let mut sorted: Vec<&EntityView> = frame.view.iter().collect();
        sort_by_gap(&mut sorted);
        self.x
            .set_domain(sorted.iter().map(|e| e.key.clone()).collect());

        let height = self.size.height();
        let bandwidth = self.x.bandwidth();
        let x = &self.x;
        self.bars.join(sorted.iter().map(|e| e.key.as_str()), transition, |key| {
            Shape::rect("bar")
                .attr("x", x.apply(key).unwrap_or(0.0))
                .attr("y", height)
                .attr("height", 0.0)
                .attr("width", bandwidth)
        });

        for entity in &sorted {
            let gap = self.y.apply(access_gap(entity) / 100.0);
            let left = self.x.apply(&entity.key).unwrap_or(0.0);
            let (Some(bar), Some(fill)) = (self.bars.get_mut(&entity.key), frame.color(&entity.key))
            else {
                continue;
            };
            bar.animate("fill", fill, transition)
                .animate("x", left, transition)
                .animate("y", gap, transition)
                .animate("height", height - gap, transition)
                .animate("width", bandwidth, transition);
        }

        let half = bandwidth / 2.0;
        self.x_axis.ticks = sorted
            .iter()
            .filter_map(|e| self.x.apply(&e.key).map(|p| (p + half, e.key.clone())))
            .collect();
        self.x_axis.rotate_labels = true;
    }

    fn tick(&mut self, now: f64) {
        self.bars.tick(now);
    }

    fn write_content(&self, out: &mut String, now: f64) {
        self.x_axis.write_svg(out);
        self.y_axis.write_svg(out);
        self.bars.write_svg(out, now);
    }
}
