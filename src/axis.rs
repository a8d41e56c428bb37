use crate::path::num;
use crate::scene::escape_xml;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    Bottom,
    Left,
    Right,
}

/// A static axis: domain line, ticks and an optional title.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub orient: Orient,
    /// (pixel position, label)
    pub ticks: Vec<(f64, String)>,
    /// Extent of the domain line in pixels.
    pub extent: (f64, f64),
    /// Offset of the whole axis group.
    pub offset: (f64, f64),
    pub title: Option<String>,
    /// Rotate tick labels by -45 degrees, for long category names.
    pub rotate_labels: bool,
}

const TICK_SIZE: f64 = 6.0;

impl Axis {
    pub fn new(orient: Orient, extent: (f64, f64)) -> Self {
        Self {
            orient,
            ticks: Vec::new(),
            extent,
            offset: (0.0, 0.0),
            title: None,
            rotate_labels: false,
        }
    }

    pub fn offset(mut self, x: f64, y: f64) -> Self {
        self.offset = (x, y);
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn ticks(mut self, ticks: Vec<(f64, String)>) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn write_svg(&self, out: &mut String) {
        let class = match self.orient {
            Orient::Bottom => "x axis",
            Orient::Left | Orient::Right => "y axis",
        };
        let _ = write!(
            out,
            r#"<g class="{}" transform="translate({},{})">"#,
            class,
            num(self.offset.0),
            num(self.offset.1)
        );

        let (a, b) = self.extent;
        match self.orient {
            Orient::Bottom => {
                let _ = write!(out, r#"<path class="domain" d="M{},0H{}"/>"#, num(a), num(b));
            }
            Orient::Left | Orient::Right => {
                let _ = write!(out, r#"<path class="domain" d="M0,{}V{}"/>"#, num(a), num(b));
            }
        }

        for (pos, label) in &self.ticks {
            let label = escape_xml(label);
            match self.orient {
                Orient::Bottom => {
                    let text = if self.rotate_labels {
                        format!(
                            r#"<text y="9" dx="-0.5rem" dy="-0.1rem" transform="rotate(-45)" style="text-anchor: end">{}</text>"#,
                            label
                        )
                    } else {
                        format!(r#"<text y="9" dy=".71em" style="text-anchor: middle">{}</text>"#, label)
                    };
                    let _ = write!(
                        out,
                        r#"<g class="tick" transform="translate({},0)"><line y2="{}"/>{}</g>"#,
                        num(*pos),
                        num(TICK_SIZE),
                        text
                    );
                }
                Orient::Left => {
                    let _ = write!(
                        out,
                        r#"<g class="tick" transform="translate(0,{})"><line x2="{}"/><text x="-9" dy=".32em" style="text-anchor: end">{}</text></g>"#,
                        num(*pos),
                        num(-TICK_SIZE),
                        label
                    );
                }
                Orient::Right => {
                    let _ = write!(
                        out,
                        r#"<g class="tick" transform="translate(0,{})"><line x2="{}"/><text x="9" dy=".32em" style="text-anchor: start">{}</text></g>"#,
                        num(*pos),
                        num(TICK_SIZE),
                        label
                    );
                }
            }
        }

        if let Some(title) = &self.title {
            let _ = write!(out, r#"<text class="label">{}</text>"#, escape_xml(title));
        }
        out.push_str("</g>");
    }
}
