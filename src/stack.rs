//! Stacked layouts: per-year bars and silhouette-offset timelines.

use crate::nest::Nest;
use crate::record::Key;
use std::collections::BTreeMap;

/// One entity's slice of a stacked bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub key: String,
    pub value: f64,
    pub y0: f64,
    pub y1: f64,
    /// Share of the bar total, in percent.
    pub percentage: f64,
}

/// Stack values on top of each other in the given order.
///
/// Entries with a missing or zero value are left out. Returns the slices and
/// the total height.
pub fn stack_bars(entries: impl IntoIterator<Item = (String, Option<f64>)>) -> (Vec<StackedBar>, f64) {
    let mut bars = Vec::new();
    let mut y0 = 0.0;
    for (key, value) in entries {
        let Some(value) = value.filter(|v| *v != 0.0) else {
            continue;
        };
        bars.push(StackedBar {
            key,
            value,
            y0,
            y1: y0 + value,
            percentage: 0.0,
        });
        y0 += value;
    }
    for bar in &mut bars {
        bar.percentage = if y0 > 0.0 { bar.value / y0 * 100.0 } else { 0.0 };
    }
    (bars, y0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackPoint {
    pub x: i64,
    pub y: f64,
    /// Baseline, set by [`silhouette`].
    pub y0: f64,
}

/// One entity's values over every known year.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: String,
    pub points: Vec<StackPoint>,
}

/// Build one series per entity of `timeline` (entity → year → value), with a
/// point for every year in `years`. Years without data are zero.
///
/// Series are ordered by `rank`; entities of equal rank keep table order.
pub fn fill_series<K: Ord>(timeline: &Nest, years: &[i64], rank: impl Fn(&str) -> K) -> Vec<Series> {
    let mut series: Vec<Series> = timeline
        .entries()
        .map(|(key, per_year)| Series {
            key: key.to_string(),
            points: years
                .iter()
                .map(|&x| StackPoint {
                    x,
                    y: per_year
                        .get(&Key::Num(x))
                        .and_then(Nest::value)
                        .unwrap_or(0.0),
                    y0: 0.0,
                })
                .collect(),
        })
        .collect();
    series.sort_by_key(|s| rank(&s.key));
    series
}

/// Sum of every series per year.
pub fn year_totals(series: &[Series], years: &[i64]) -> BTreeMap<i64, f64> {
    let mut totals: BTreeMap<i64, f64> = years.iter().map(|&y| (y, 0.0)).collect();
    for s in series {
        for p in &s.points {
            *totals.entry(p.x).or_insert(0.0) += p.y;
        }
    }
    totals
}

/// Stack the series with a silhouette offset: at every x the stack is
/// centred on half of the tallest stack. Returns that tallest total.
///
/// All series must have the same length, which [`fill_series`] guarantees.
pub fn silhouette(series: &mut [Series]) -> f64 {
    let Some(len) = series.first().map(|s| s.points.len()) else {
        return 0.0;
    };
    let sums: Vec<f64> = (0..len)
        .map(|j| series.iter().map(|s| s.points.get(j).map_or(0.0, |p| p.y)).sum())
        .collect();
    let max = sums.iter().copied().fold(0.0, f64::max);

    for (j, sum) in sums.iter().enumerate() {
        let mut baseline = (max - sum) / 2.0;
        for s in series.iter_mut() {
            if let Some(p) = s.points.get_mut(j) {
                p.y0 = baseline;
                baseline += p.y;
            }
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nest::Nester;

    struct Flow {
        country: &'static str,
        year: i64,
        quantity: f64,
    }

    fn timeline(flows: &[Flow]) -> Nest {
        Nester::new(|f: &Flow| f.quantity)
            .key(|f| Key::from(f.country))
            .key(|f| Key::Num(f.year))
            .nest(flows)
    }

    #[test]
    fn test_gap_filling() {
        let table = timeline(&[
            Flow { country: "A", year: 2001, quantity: 5.0 },
            Flow { country: "A", year: 2004, quantity: 7.0 },
        ]);
        let years = [2000, 2001, 2002, 2003, 2004];
        let series = fill_series(&table, &years, |_| 0);

        assert_eq!(series.len(), 1);
        let ys: Vec<f64> = series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 5.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn test_rank_order_is_stable() {
        let table = timeline(&[
            Flow { country: "A", year: 2000, quantity: 1.0 },
            Flow { country: "B", year: 2000, quantity: 1.0 },
            Flow { country: "C", year: 2000, quantity: 1.0 },
        ]);
        let series = fill_series(&table, &[2000], |k| if k == "B" { 1 } else { 0 });
        let keys: Vec<&str> = series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_silhouette_centres_stack() {
        let table = timeline(&[
            Flow { country: "A", year: 2000, quantity: 2.0 },
            Flow { country: "B", year: 2000, quantity: 2.0 },
            Flow { country: "A", year: 2001, quantity: 1.0 },
            Flow { country: "B", year: 2001, quantity: 1.0 },
        ]);
        let mut series = fill_series(&table, &[2000, 2001], |_| 0);
        let max = silhouette(&mut series);

        assert_eq!(max, 4.0);
        // tallest year sits on zero, the shorter one is centred
        assert_eq!(series[0].points[0].y0, 0.0);
        assert_eq!(series[1].points[0].y0, 2.0);
        assert_eq!(series[0].points[1].y0, 1.0);
        assert_eq!(series[1].points[1].y0, 2.0);

        let totals = year_totals(&series, &[2000, 2001]);
        assert_eq!(totals[&2000], 4.0);
        assert_eq!(totals[&2001], 2.0);
    }

    #[test]
    fn test_stack_bars() {
        let (bars, total) = stack_bars(vec![
            ("A".to_string(), Some(30.0)),
            ("B".to_string(), None),
            ("C".to_string(), Some(10.0)),
        ]);
        assert_eq!(total, 40.0);
        assert_eq!(bars.len(), 2);
        assert_eq!((bars[1].y0, bars[1].y1), (30.0, 40.0));
        assert_eq!(bars[0].percentage, 75.0);
    }

    #[test]
    fn test_silhouette_empty() {
        assert_eq!(silhouette(&mut []), 0.0);
    }
}
