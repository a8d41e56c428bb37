//! Country to continent lookup and the per-dashboard continent palettes.

use crate::color::Color;
use crate::record::ContinentRow;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ContinentLookup {
    map: HashMap<String, String>,
}

impl ContinentLookup {
    pub fn from_rows(rows: &[ContinentRow]) -> Self {
        let map = rows
            .iter()
            .map(|r| (r.country.clone(), r.continent.clone()))
            .collect();
        Self { map }
    }

    /// Continent of a country. Misses are logged, never fatal.
    pub fn get(&self, country: &str) -> Option<&str> {
        let found = self.map.get(country).map(String::as_str);
        if found.is_none() {
            tracing::debug!(country, "no continent known");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinentStyle {
    pub name: &'static str,
    pub color: Color,
}

/// Ordered continent colours. The position in the list is the continent's
/// stacking index.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    styles: Vec<ContinentStyle>,
}

impl Palette {
    pub fn new(styles: Vec<ContinentStyle>) -> Self {
        Self { styles }
    }

    pub fn water() -> Self {
        Self::new(vec![
            style("Europe", Color::rgb(185, 20, 67)),
            style("Oceania", Color::rgb(14, 128, 116)),
            style("Africa", Color::rgb(206, 100, 22)),
            style("Asia", Color::rgb(90, 183, 19)),
            style("North America", Color::rgb(55, 30, 142)),
            style("Central America", Color::rgb(117, 17, 135)),
            style("South America", Color::rgb(206, 173, 22)),
        ])
    }

    pub fn trade() -> Self {
        Self::new(vec![
            style("Africa", Color::rgba(255, 241, 118, 0.5)),
            style("Asia", Color::rgba(0, 176, 255, 0.5)),
            style("Europe", Color::rgba(0, 230, 118, 0.5)),
            style("North America", Color::rgba(255, 82, 82, 0.5)),
            style("South America", Color::rgba(255, 87, 34, 0.5)),
            style("Oceania", Color::rgba(179, 136, 255, 0.5)),
        ])
    }

    pub fn styles(&self) -> &[ContinentStyle] {
        &self.styles
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.styles.iter().map(|s| s.name)
    }

    pub fn color(&self, continent: &str) -> Option<Color> {
        self.styles.iter().find(|s| s.name == continent).map(|s| s.color)
    }

    pub fn index(&self, continent: &str) -> Option<usize> {
        self.styles.iter().position(|s| s.name == continent)
    }

    /// Colour of the country's continent. `None` for countries the palette
    /// cannot place, which the continent filter never lets through.
    pub fn country_color(&self, lookup: &ContinentLookup, country: &str) -> Option<Color> {
        lookup.get(country).and_then(|c| self.color(c))
    }

    pub fn country_index(&self, lookup: &ContinentLookup, country: &str) -> Option<usize> {
        lookup.get(country).and_then(|c| self.index(c))
    }
}

fn style(name: &'static str, color: Color) -> ContinentStyle {
    ContinentStyle { name, color }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> ContinentLookup {
        ContinentLookup::from_rows(&[
            ContinentRow {
                country: "Germany".into(),
                continent: "Europe".into(),
            },
            ContinentRow {
                country: "Niger".into(),
                continent: "Africa".into(),
            },
        ])
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let lookup = lookup();
        assert_eq!(lookup.get("Germany"), Some("Europe"));
        assert_eq!(lookup.get("Atlantis"), None);
    }

    #[test]
    fn test_country_color() {
        let palette = Palette::water();
        let lookup = lookup();
        assert_eq!(palette.country_color(&lookup, "Germany"), Some(Color::rgb(185, 20, 67)));
        assert_eq!(palette.country_color(&lookup, "Atlantis"), None);
    }

    #[test]
    fn test_trade_stacking_index() {
        let palette = Palette::trade();
        let lookup = lookup();
        assert_eq!(palette.country_index(&lookup, "Niger"), Some(0));
        assert_eq!(palette.country_index(&lookup, "Germany"), Some(2));
        assert_eq!(palette.country_index(&lookup, "Atlantis"), None);
    }
}
