//! SVG path data for lines and stacked areas.

use std::fmt::Write;

/// One sample of a stacked area: `y0` is the baseline, `y1` the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub x: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Curve {
    #[default]
    Linear,
    /// Uniform cubic B-spline through the samples.
    Basis,
}

/// `d` attribute for a polyline.
pub fn line(points: &[(f64, f64)], curve: Curve) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::from("M");
    segments(&mut d, points, curve);
    d
}

/// `d` attribute for an area between the tops and the baselines of `points`.
pub fn area(points: &[BandPoint], curve: Curve) -> String {
    if points.is_empty() {
        return String::new();
    }
    let top: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y1)).collect();
    let bottom: Vec<(f64, f64)> = points.iter().rev().map(|p| (p.x, p.y0)).collect();

    let mut d = String::from("M");
    segments(&mut d, &top, curve);
    d.push('L');
    segments(&mut d, &bottom, curve);
    d.push('Z');
    d
}

fn segments(d: &mut String, points: &[(f64, f64)], curve: Curve) {
    match curve {
        Curve::Basis if points.len() >= 3 => basis(d, points),
        _ => linear(d, points),
    }
}

fn linear(d: &mut String, points: &[(f64, f64)]) {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            d.push('L');
        }
        let _ = write!(d, "{},{}", num(*x), num(*y));
    }
}

const BEZIER_1: [f64; 4] = [0.0, 2.0 / 3.0, 1.0 / 3.0, 0.0];
const BEZIER_2: [f64; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 0.0];
const BEZIER_3: [f64; 4] = [0.0, 1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0];

fn dot4(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// B-spline with the end points repeated so the curve starts and ends on
/// the first and last samples.
fn basis(d: &mut String, points: &[(f64, f64)]) {
    let (x0, y0) = points[0];
    let mut px = [x0, x0, x0, points[1].0];
    let mut py = [y0, y0, y0, points[1].1];
    let _ = write!(
        d,
        "{},{}L{},{}",
        num(x0),
        num(y0),
        num(dot4(&BEZIER_3, &px)),
        num(dot4(&BEZIER_3, &py))
    );

    let last = points[points.len() - 1];
    let tail = points[2..].iter().chain(std::iter::once(&last));
    for &(x, y) in tail {
        px.rotate_left(1);
        px[3] = x;
        py.rotate_left(1);
        py[3] = y;
        let _ = write!(
            d,
            "C{},{},{},{},{},{}",
            num(dot4(&BEZIER_1, &px)),
            num(dot4(&BEZIER_1, &py)),
            num(dot4(&BEZIER_2, &px)),
            num(dot4(&BEZIER_2, &py)),
            num(dot4(&BEZIER_3, &px)),
            num(dot4(&BEZIER_3, &py))
        );
    }
    let _ = write!(d, "L{},{}", num(last.0), num(last.1));
}

/// Compact number formatting for SVG output.
pub fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_line() {
        assert_eq!(line(&[(0.0, 0.0), (10.0, 5.5)], Curve::Linear), "M0,0L10,5.5");
        assert_eq!(line(&[], Curve::Basis), "");
    }

    #[test]
    fn test_basis_short_input_falls_back_to_linear() {
        assert_eq!(line(&[(0.0, 0.0), (6.0, 6.0)], Curve::Basis), "M0,0L6,6");
    }

    #[test]
    fn test_basis_starts_and_ends_on_samples() {
        let d = line(&[(0.0, 0.0), (6.0, 6.0), (12.0, 0.0)], Curve::Basis);
        assert!(d.starts_with("M0,0L1,1C"));
        assert!(d.ends_with("L12,0"));
        assert_eq!(d.matches('C').count(), 2);
    }

    #[test]
    fn test_area_closes() {
        let points = [
            BandPoint { x: 0.0, y0: 10.0, y1: 0.0 },
            BandPoint { x: 5.0, y0: 10.0, y1: 2.0 },
        ];
        assert_eq!(area(&points, Curve::Linear), "M0,0L5,2L5,10L0,10Z");
    }

    #[test]
    fn test_num_format() {
        assert_eq!(num(3.0), "3");
        assert_eq!(num(2.12345), "2.123");
        assert_eq!(num(f64::NAN), "0");
    }
}
