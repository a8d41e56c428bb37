//! Mappings from data domains to pixel ranges.

/// Continuous linear scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn set_domain(&mut self, d0: f64, d1: f64) {
        self.domain = (d0, d1);
    }

    /// A collapsed domain maps everything to the start of the range.
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        r0 + (v - d0) / span * (r1 - r0)
    }

    /// Tick values at a 1, 2 or 5 step, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let step = tick_step(lo, hi, count);
        if step == 0.0 || !step.is_finite() {
            return vec![lo];
        }
        let start = (lo / step).ceil() as i64;
        let stop = (hi / step + 1e-9).floor() as i64;
        (start..=stop).map(|i| i as f64 * step).collect()
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let span = hi - lo;
    if span <= 0.0 || count == 0 {
        return 0.0;
    }
    let raw = span / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Base-10 logarithmic scale. Non-positive domain values are clamped to a
/// tiny positive number so the mapping stays finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

const LOG_FLOOR: f64 = 1e-9;

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let log = |x: f64| x.max(LOG_FLOOR).log10();
        LinearScale::new((log(self.domain.0), log(self.domain.1)), self.range).apply(log(v))
    }

    /// Powers of ten inside the domain.
    pub fn ticks(&self) -> Vec<f64> {
        let lo = self.domain.0.min(self.domain.1).max(LOG_FLOOR);
        let hi = self.domain.0.max(self.domain.1).max(LOG_FLOOR);
        let first = (lo.log10() - 1e-9).ceil() as i32;
        let last = (hi.log10() + 1e-9).floor() as i32;
        (first..=last).map(|p| 10f64.powi(p)).collect()
    }
}

/// Ordinal scale dividing a range into equal bands, one per key.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    keys: Vec<String>,
    range: (f64, f64),
    padding: f64,
    outer_padding: f64,
}

impl BandScale {
    pub fn new(range: (f64, f64), padding: f64, outer_padding: f64) -> Self {
        Self {
            keys: Vec::new(),
            range,
            padding,
            outer_padding,
        }
    }

    pub fn set_domain(&mut self, keys: Vec<String>) {
        self.keys = keys;
    }

    pub fn domain(&self) -> &[String] {
        &self.keys
    }

    fn step(&self) -> f64 {
        let n = self.keys.len() as f64;
        let (r0, r1) = self.range;
        let slots = n - self.padding + 2.0 * self.outer_padding;
        if slots <= 0.0 {
            return 0.0;
        }
        (r1 - r0) / slots
    }

    /// Start of the band for `key`, if the key is in the domain.
    pub fn apply(&self, key: &str) -> Option<f64> {
        let index = self.keys.iter().position(|k| k == key)?;
        let step = self.step();
        Some(self.range.0 + step * self.outer_padding + step * index as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_inverted_range() {
        let y = LinearScale::new((0.0, 1.0), (300.0, 0.0));
        assert_eq!(y.apply(0.0), 300.0);
        assert_eq!(y.apply(1.0), 0.0);
        assert_eq!(y.apply(0.5), 150.0);
    }

    #[test]
    fn test_linear_collapsed_domain() {
        let y = LinearScale::new((0.0, 0.0), (0.0, 300.0));
        assert_eq!(y.apply(10.0), 0.0);
    }

    #[test]
    fn test_linear_ticks() {
        let x = LinearScale::new((0.0, 1.0), (0.0, 100.0));
        let ticks = x.ticks(10);
        assert_eq!(ticks.len(), 11);
        assert!((ticks[10] - 1.0).abs() < 1e-9);

        let years = LinearScale::new((1990.0, 2015.0), (0.0, 100.0));
        assert_eq!(years.ticks(5), vec![1990.0, 1995.0, 2000.0, 2005.0, 2010.0, 2015.0]);
    }

    #[test]
    fn test_log_scale() {
        let x = LogScale::new((10.0, 1000.0), (0.0, 200.0));
        assert!((x.apply(100.0) - 100.0).abs() < 1e-9);
        assert_eq!(x.ticks(), vec![10.0, 100.0, 1000.0]);
        assert!(x.apply(0.0).is_finite());
    }

    #[test]
    fn test_band_scale() {
        let mut x = BandScale::new((0.0, 100.0), 0.1, 0.2);
        x.set_domain(vec!["a".into(), "b".into()]);
        // step = 100 / (2 - 0.1 + 0.4)
        let step = 100.0 / 2.3;
        assert!((x.apply("a").unwrap() - step * 0.2).abs() < 1e-9);
        assert!((x.apply("b").unwrap() - step * 1.2).abs() < 1e-9);
        assert!((x.bandwidth() - step * 0.9).abs() < 1e-9);
        assert_eq!(x.apply("c"), None);
    }
}
