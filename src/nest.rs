//! Grouping of flat rows into multi-level ordered lookup tables.

use crate::record::{Key, TradeRow, WaterRow};
use std::collections::BTreeMap;

/// A nested table: ordered branches keyed by [`Key`], ending in summed leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum Nest {
    Branch(BTreeMap<Key, Nest>),
    Leaf(f64),
}

impl Default for Nest {
    fn default() -> Self {
        Nest::Branch(BTreeMap::new())
    }
}

impl Nest {
    /// Child by key; `None` on a leaf or a missing key.
    pub fn get(&self, key: &Key) -> Option<&Nest> {
        match self {
            Nest::Branch(children) => children.get(key),
            Nest::Leaf(_) => None,
        }
    }

    pub fn get_path(&self, path: &[Key]) -> Option<&Nest> {
        path.iter().try_fold(self, |nest, key| nest.get(key))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Nest::Leaf(v) => Some(*v),
            Nest::Branch(_) => None,
        }
    }

    /// Leaf value one level down, e.g. `country.leaf("GDP")`.
    pub fn leaf(&self, key: &str) -> Option<f64> {
        self.get(&Key::from(key)).and_then(Nest::value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(&Key::from(key)).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries().map(|(k, _)| k)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Key, &Nest)> {
        let children = match self {
            Nest::Branch(children) => Some(children.iter()),
            Nest::Leaf(_) => None,
        };
        children.into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        match self {
            Nest::Branch(children) => children.len(),
            Nest::Leaf(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct keys found `depth` levels below this node, in key order.
    pub fn keys_at(&self, depth: usize) -> Vec<Key> {
        let mut found = BTreeMap::new();
        self.collect_keys(depth, &mut found);
        found.into_keys().collect()
    }

    fn collect_keys(&self, depth: usize, found: &mut BTreeMap<Key, ()>) {
        for (key, child) in self.entries() {
            if depth == 0 {
                found.insert(key.clone(), ());
            } else {
                child.collect_keys(depth - 1, found);
            }
        }
    }

    fn add(&mut self, path: &[Key], value: f64) {
        let Nest::Branch(children) = self else {
            return;
        };
        match path {
            [] => {}
            [last] => {
                let leaf = children.entry(last.clone()).or_insert(Nest::Leaf(0.0));
                if let Nest::Leaf(sum) = leaf {
                    *sum += value;
                }
            }
            [first, rest @ ..] => children
                .entry(first.clone())
                .or_default()
                .add(rest, value),
        }
    }
}

/// Key and value extraction for [`Nester::nest`].
pub struct Nester<R> {
    keys: Vec<fn(&R) -> Key>,
    value: fn(&R) -> f64,
}

impl<R> Nester<R> {
    pub fn new(value: fn(&R) -> f64) -> Self {
        Self {
            keys: Vec::new(),
            value,
        }
    }

    /// Add the next nesting level.
    pub fn key(mut self, key: fn(&R) -> Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Group rows by the configured keys and sum values at each full key path.
    ///
    /// Rows whose value is not strictly positive (NaN included) are skipped.
    pub fn nest<'a>(&self, rows: impl IntoIterator<Item = &'a R>) -> Nest
    where
        R: 'a,
    {
        let mut root = Nest::default();
        let mut path = Vec::with_capacity(self.keys.len());
        for row in rows {
            let value = (self.value)(row);
            if !(value > 0.0) {
                continue;
            }
            path.clear();
            path.extend(self.keys.iter().map(|key| key(row)));
            root.add(&path, value);
        }
        root
    }
}

/// Year → country → identifier.
pub fn nest_water(rows: &[WaterRow]) -> Nest {
    Nester::new(|r: &WaterRow| r.value)
        .key(|r| Key::Num(r.year.unwrap_or_default()))
        .key(|r| Key::from(r.country.as_str()))
        .key(|r| Key::from(r.identifier.as_str()))
        .nest(rows)
}

/// Year → commodity → country → flow.
pub fn nest_trade(rows: &[TradeRow]) -> Nest {
    Nester::new(|r: &TradeRow| r.quantity)
        .key(|r| Key::Num(r.year.unwrap_or_default()))
        .key(|r| Key::from(r.commodity.as_str()))
        .key(|r| Key::from(r.country.as_str()))
        .key(|r| Key::from(r.flow.as_str()))
        .nest(rows)
}

/// Commodity → flow → country → year, for the stream timelines.
pub fn nest_trade_timeline(rows: &[TradeRow]) -> Nest {
    Nester::new(|r: &TradeRow| r.quantity)
        .key(|r| Key::from(r.commodity.as_str()))
        .key(|r| Key::from(r.flow.as_str()))
        .key(|r| Key::from(r.country.as_str()))
        .key(|r| Key::Num(r.year.unwrap_or_default()))
        .nest(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i64, country: &str, identifier: &str, value: f64) -> WaterRow {
        WaterRow {
            year: Some(year),
            country: country.to_string(),
            identifier: identifier.to_string(),
            value,
        }
    }

    #[test]
    fn test_duplicate_rows_are_summed() {
        let rows = vec![
            row(2012, "A", "GDP", 100.0),
            row(2012, "A", "GDP", 50.0),
            row(2012, "A", "Rural", 80.0),
            row(2012, "A", "Urban", 90.0),
        ];
        let table = nest_water(&rows);
        let a = table.get_path(&[Key::from(2012), Key::from("A")]).unwrap();
        assert_eq!(a.leaf("GDP"), Some(150.0));
        assert_eq!(a.leaf("Rural"), Some(80.0));
        assert_eq!(a.leaf("Urban"), Some(90.0));
    }

    #[test]
    fn test_non_positive_rows_dropped() {
        let rows = vec![
            row(2012, "A", "GDP", 0.0),
            row(2012, "A", "Rural", -3.0),
            row(2012, "A", "Urban", f64::NAN),
            row(2012, "B", "GDP", 1.0),
        ];
        let table = nest_water(&rows);
        let year = table.get(&Key::from(2012)).unwrap();
        assert!(year.get(&Key::from("A")).is_none());
        assert_eq!(year.len(), 1);
    }

    #[test]
    fn test_years_iterate_in_order() {
        let rows = vec![
            row(2015, "A", "GDP", 1.0),
            row(1990, "A", "GDP", 1.0),
            row(2000, "A", "GDP", 1.0),
        ];
        let years: Vec<i64> = nest_water(&rows).keys().filter_map(Key::as_num).collect();
        assert_eq!(years, vec![1990, 2000, 2015]);
    }

    #[test]
    fn test_keys_at_depth() {
        let rows = vec![
            TradeRow {
                year: Some(2012),
                commodity: "Tin".into(),
                country: "A".into(),
                flow: "Import".into(),
                quantity: 4.0,
            },
            TradeRow {
                year: Some(2013),
                commodity: "Silicon".into(),
                country: "B".into(),
                flow: "Export".into(),
                quantity: 2.0,
            },
        ];
        let table = nest_trade(&rows);
        assert_eq!(table.keys_at(1), vec![Key::from("Silicon"), Key::from("Tin")]);

        let timeline = nest_trade_timeline(&rows);
        let tin_a = timeline
            .get_path(&[Key::from("Tin"), Key::from("Import"), Key::from("A")])
            .unwrap();
        assert_eq!(tin_a.get(&Key::from(2012)).and_then(Nest::value), Some(4.0));
    }

    #[test]
    fn test_empty_input() {
        let table = nest_water(&[]);
        assert!(table.is_empty());
        assert!(table.get_path(&[Key::from(2012)]).is_none());
    }
}
