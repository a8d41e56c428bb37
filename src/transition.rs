//! Animated attribute values.
//!
//! A transition is not a task: it is a start time and a duration. Every
//! animated attribute stores where it came from and where it is going, and
//! is evaluated against the render clock. Retargeting an attribute while it
//! is moving starts the new tween from the value it has at that moment.

use crate::color::Color;
use crate::path::BandPoint;

/// Default duration for filter changes, in milliseconds.
pub const DEFAULT_DURATION: f64 = 1000.0;
/// Duration used while hovering, in milliseconds.
pub const HOVER_DURATION: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub start: f64,
    pub duration: f64,
}

impl Transition {
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            duration: duration.max(0.0),
        }
    }

    /// A transition that has already finished at `now`.
    pub fn immediate(now: f64) -> Self {
        Self::new(now, 0.0)
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Eased progress in [0, 1].
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 || now >= self.end() {
            return 1.0;
        }
        if now <= self.start {
            return 0.0;
        }
        cubic_in_out((now - self.start) / self.duration)
    }
}

fn cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Num(f64),
    Color(Color),
    Translate(f64, f64),
    /// Polyline points, drawn through the shape's curve.
    Points(Vec<(f64, f64)>),
    /// Area outline, drawn through the shape's curve.
    Band(Vec<BandPoint>),
    Text(String),
}

impl AttrValue {
    /// Interpolate towards `to`. Values that cannot be blended (different
    /// kinds, point lists of different length, text) jump at the end.
    pub fn interpolate(&self, to: &AttrValue, t: f64) -> AttrValue {
        use AttrValue::*;
        let mix = |a: f64, b: f64| a + (b - a) * t;
        match (self, to) {
            (Num(a), Num(b)) => Num(mix(*a, *b)),
            (Color(a), Color(b)) => Color(a.lerp(*b, t)),
            (Translate(ax, ay), Translate(bx, by)) => Translate(mix(*ax, *bx), mix(*ay, *by)),
            (Points(a), Points(b)) if a.len() == b.len() => Points(
                a.iter()
                    .zip(b)
                    .map(|(p, q)| (mix(p.0, q.0), mix(p.1, q.1)))
                    .collect(),
            ),
            (Band(a), Band(b)) if a.len() == b.len() => Band(
                a.iter()
                    .zip(b)
                    .map(|(p, q)| BandPoint {
                        x: mix(p.x, q.x),
                        y0: mix(p.y0, q.y0),
                        y1: mix(p.y1, q.y1),
                    })
                    .collect(),
            ),
            _ if t >= 1.0 => to.clone(),
            _ => self.clone(),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Num(n)
    }
}

impl From<Color> for AttrValue {
    fn from(c: Color) -> Self {
        AttrValue::Color(c)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

/// One attribute moving from `from` to `to` over `transition`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: AttrValue,
    to: AttrValue,
    transition: Transition,
}

impl Tween {
    pub fn fixed(value: AttrValue) -> Self {
        Self {
            from: value.clone(),
            to: value,
            transition: Transition::immediate(0.0),
        }
    }

    pub fn at(&self, now: f64) -> AttrValue {
        let t = self.transition.progress(now);
        if t >= 1.0 {
            return self.to.clone();
        }
        self.from.interpolate(&self.to, t)
    }

    pub fn target(&self) -> &AttrValue {
        &self.to
    }

    pub fn retarget(&mut self, to: AttrValue, transition: Transition) {
        self.from = self.at(transition.start);
        self.to = to;
        self.transition = transition;
    }
}
