use unicode_width::UnicodeWidthStr;

/// Approximate text measurement for labels and tooltips.
pub struct TextMetrics {
    pub char_width: f64,
    pub font_size: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            font_size: 15.0,
            line_height: 19.2,
            padding: 5.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Bounding box of a block of lines, padding included.
    pub fn block_size(&self, lines: &[&str]) -> (f64, f64) {
        let width = lines
            .iter()
            .map(|line| self.text_width(line))
            .fold(0.0, f64::max);
        let height = lines.len() as f64 * self.line_height;
        (width + self.padding * 2.0, height + self.padding * 2.0)
    }

    /// Whether a label fits inside a bar of the given height.
    pub fn fits(&self, height: f64) -> bool {
        height > self.font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("Chad"), 4.0 * 8.0);
    }

    #[test]
    fn test_wide_width() {
        let m = TextMetrics::default();
        // full-width characters count double
        assert_eq!(m.text_width("日本"), 4.0 * 8.0);
    }

    #[test]
    fn test_block_size() {
        let m = TextMetrics::default();
        let (w, h) = m.block_size(&["Niger", "Total: 58%"]);
        assert_eq!(w, 10.0 * 8.0 + 10.0);
        assert_eq!(h, 2.0 * 19.2 + 10.0);
    }

    #[test]
    fn test_fits() {
        let m = TextMetrics::default();
        assert!(!m.fits(15.0));
        assert!(m.fits(15.5));
    }
}
