//! Keyed visual marks and their enter/update/exit reconciliation.
//!
//! A [`Layer`] owns one mark per entity key. Each update joins the new key
//! set against the marks already in the layer and splits it into three
//! disjoint sets: keys to create, keys to move, and keys to fade out.

use crate::path::{self, Curve};
use crate::transition::{AttrValue, Transition, Tween};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Group,
    Rect,
    Circle,
    Line,
    Path(Curve),
    Text,
}

impl Tag {
    fn name(self) -> &'static str {
        match self {
            Tag::Group => "g",
            Tag::Rect => "rect",
            Tag::Circle => "circle",
            Tag::Line => "line",
            Tag::Path(_) => "path",
            Tag::Text => "text",
        }
    }
}

/// An SVG element with animated attributes and unkeyed children.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    tag: Tag,
    classes: Vec<String>,
    attrs: BTreeMap<&'static str, Tween>,
    text: Option<String>,
    children: Vec<Shape>,
}

impl Shape {
    pub fn new(tag: Tag, class: &str) -> Self {
        Self {
            tag,
            classes: class.split_whitespace().map(str::to_string).collect(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn group(class: &str) -> Self {
        Self::new(Tag::Group, class)
    }

    pub fn rect(class: &str) -> Self {
        Self::new(Tag::Rect, class)
    }

    pub fn circle(class: &str) -> Self {
        Self::new(Tag::Circle, class)
    }

    pub fn line(class: &str) -> Self {
        Self::new(Tag::Line, class)
    }

    pub fn text(class: &str) -> Self {
        Self::new(Tag::Text, class)
    }

    pub fn path(class: &str, curve: Curve) -> Self {
        Self::new(Tag::Path(curve), class)
    }

    /// Builder form of [`Shape::set`].
    pub fn attr(mut self, name: &'static str, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn child(mut self, child: Shape) -> Self {
        self.children.push(child);
        self
    }

    pub fn content(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an attribute without animation.
    pub fn set(&mut self, name: &'static str, value: impl Into<AttrValue>) -> &mut Self {
        self.attrs.insert(name, Tween::fixed(value.into()));
        self
    }

    /// Animate an attribute from its current value. Attributes that were
    /// never set are created at the target value.
    pub fn animate(
        &mut self,
        name: &'static str,
        value: impl Into<AttrValue>,
        transition: Transition,
    ) -> &mut Self {
        let value = value.into();
        match self.attrs.get_mut(name) {
            Some(tween) => tween.retarget(value, transition),
            None => {
                self.attrs.insert(name, Tween::fixed(value));
            }
        }
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    pub fn classed(&mut self, class: &str, on: bool) -> &mut Self {
        let present = self.has_class(class);
        if on && !present {
            self.classes.push(class.to_string());
        } else if !on && present {
            self.classes.retain(|c| c != class);
        }
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn get(&self, name: &str, now: f64) -> Option<AttrValue> {
        self.attrs.get(name).map(|t| t.at(now))
    }

    /// The value an attribute is heading to.
    pub fn target(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name).map(Tween::target)
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First descendant carrying `class`.
    pub fn select(&self, class: &str) -> Option<&Shape> {
        self.children.iter().find_map(|c| {
            if c.has_class(class) {
                Some(c)
            } else {
                c.select(class)
            }
        })
    }

    pub fn select_mut(&mut self, class: &str) -> Option<&mut Shape> {
        for child in &mut self.children {
            if child.has_class(class) {
                return Some(child);
            }
            if let Some(found) = child.select_mut(class) {
                return Some(found);
            }
        }
        None
    }

    pub fn write_svg(&self, out: &mut String, now: f64) {
        let _ = write!(out, "<{}", self.tag.name());
        if !self.classes.is_empty() {
            let _ = write!(out, r#" class="{}""#, self.classes.join(" "));
        }
        for (name, tween) in &self.attrs {
            let value = tween.at(now);
            let _ = write!(out, r#" {}="{}""#, name, self.format_value(&value));
        }

        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_xml(text));
        }
        for child in &self.children {
            child.write_svg(out, now);
        }
        let _ = write!(out, "</{}>", self.tag.name());
    }

    fn format_value(&self, value: &AttrValue) -> String {
        let curve = match self.tag {
            Tag::Path(curve) => curve,
            _ => Curve::Linear,
        };
        match value {
            AttrValue::Num(n) => path::num(*n),
            AttrValue::Color(c) => c.to_string(),
            AttrValue::Translate(x, y) => format!("translate({},{})", path::num(*x), path::num(*y)),
            AttrValue::Points(points) => path::line(points, curve),
            AttrValue::Band(points) => path::area(points, curve),
            AttrValue::Text(s) => escape_xml(s),
        }
    }
}

/// Result of joining a new key set against the marks in a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Join {
    pub entering: Vec<String>,
    pub updating: Vec<String>,
    pub exiting: Vec<String>,
}

/// Split `next` against `current` into entering, updating and exiting keys.
/// Duplicate keys in `next` are bound once.
pub fn diff<'a>(current: impl IntoIterator<Item = &'a str>, next: &[&str]) -> Join {
    let current: Vec<&str> = current.into_iter().collect();
    let existing: HashSet<&str> = current.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut join = Join::default();

    for &key in next {
        if !seen.insert(key) {
            tracing::debug!(key, "duplicate key in join, ignored");
            continue;
        }
        if existing.contains(key) {
            join.updating.push(key.to_string());
        } else {
            join.entering.push(key.to_string());
        }
    }
    join.exiting = current
        .into_iter()
        .filter(|key| !seen.contains(key))
        .map(str::to_string)
        .collect();
    join
}

#[derive(Debug, Clone, PartialEq)]
struct Mark {
    shape: Shape,
    /// Clock time at which an exiting mark is detached.
    detach_at: Option<f64>,
}

/// An arena of marks keyed by entity, drawn inside one `<g>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    class: String,
    marks: BTreeMap<String, Mark>,
    /// Draw order; new marks go last.
    order: Vec<String>,
}

impl Layer {
    pub fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            marks: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Reconcile the layer against `keys`.
    ///
    /// Entering keys get a mark from `enter`, starting transparent and fading
    /// in. Updating keys keep their mark (an exiting mark is revived) and fade
    /// back to full opacity. Exiting keys fade out and are detached by
    /// [`Layer::tick`] once `transition` ends. Attribute updates for entering
    /// and updating keys are left to the caller, through [`Layer::get_mut`].
    pub fn join<'a>(
        &mut self,
        keys: impl IntoIterator<Item = &'a str>,
        transition: Transition,
        mut enter: impl FnMut(&str) -> Shape,
    ) -> Join {
        let keys: Vec<&str> = keys.into_iter().collect();
        let join = diff(self.order.iter().map(String::as_str), &keys);

        for key in &join.entering {
            let mut shape = enter(key);
            shape.set("opacity", 0.0);
            shape.animate("opacity", 1.0, transition);
            self.marks.insert(
                key.clone(),
                Mark {
                    shape,
                    detach_at: None,
                },
            );
            self.order.push(key.clone());
        }

        for key in &join.updating {
            if let Some(mark) = self.marks.get_mut(key) {
                mark.detach_at = None;
                mark.shape.animate("opacity", 1.0, transition);
            }
        }

        for key in &join.exiting {
            if let Some(mark) = self.marks.get_mut(key) {
                mark.shape.animate("opacity", 0.0, transition);
                mark.detach_at = Some(transition.end());
            }
        }

        join
    }

    pub fn get(&self, key: &str) -> Option<&Shape> {
        self.marks.get(key).map(|m| &m.shape)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Shape> {
        self.marks.get_mut(key).map(|m| &mut m.shape)
    }

    /// Detach exiting marks whose fade has finished.
    pub fn tick(&mut self, now: f64) {
        let done: Vec<String> = self
            .marks
            .iter()
            .filter(|(_, m)| m.detach_at.is_some_and(|t| t <= now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in done {
            self.marks.remove(&key);
            self.order.retain(|k| *k != key);
        }
    }

    /// Keys of marks that are not on their way out.
    pub fn live_keys(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(|k| self.marks.get(*k).is_some_and(|m| m.detach_at.is_none()))
            .map(String::as_str)
    }

    /// Number of attached marks, exiting ones included.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn write_svg(&self, out: &mut String, now: f64) {
        let _ = write!(out, r#"<g class="{}">"#, self.class);
        for key in &self.order {
            if let Some(mark) = self.marks.get(key) {
                mark.shape.write_svg(out, now);
            }
        }
        out.push_str("</g>");
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(_: &str) -> Shape {
        Shape::group("datapoint").child(Shape::circle("total").attr("r", 4.0))
    }

    #[test]
    fn test_diff_disjoint_sets() {
        let join = diff(["a", "b", "c"], &["b", "c", "d"]);
        assert_eq!(join.entering, vec!["d"]);
        assert_eq!(join.updating, vec!["b", "c"]);
        assert_eq!(join.exiting, vec!["a"]);
    }

    #[test]
    fn test_diff_ignores_duplicates() {
        let join = diff([], &["a", "a"]);
        assert_eq!(join.entering, vec!["a"]);
    }

    #[test]
    fn test_enter_fades_in() {
        let mut layer = Layer::new("data");
        let tr = Transition::new(0.0, 1000.0);
        layer.join(["a"], tr, dot);

        let mark = layer.get("a").unwrap();
        assert_eq!(mark.get("opacity", 0.0), Some(AttrValue::Num(0.0)));
        assert_eq!(mark.get("opacity", 1000.0), Some(AttrValue::Num(1.0)));
    }

    #[test]
    fn test_exit_fades_then_detaches() {
        let mut layer = Layer::new("data");
        layer.join(["a", "b"], Transition::immediate(0.0), dot);
        layer.join(["a"], Transition::new(100.0, 1000.0), dot);

        assert_eq!(layer.len(), 2);
        assert_eq!(layer.live_keys().collect::<Vec<_>>(), vec!["a"]);

        layer.tick(600.0);
        assert_eq!(layer.len(), 2);
        layer.tick(1100.0);
        assert_eq!(layer.len(), 1);
        assert!(layer.get("b").is_none());
    }

    #[test]
    fn test_exiting_mark_is_revived() {
        let mut layer = Layer::new("data");
        layer.join(["a"], Transition::immediate(0.0), dot);
        layer.join([], Transition::new(0.0, 1000.0), dot);
        let join = layer.join(["a"], Transition::new(500.0, 1000.0), dot);

        assert_eq!(join.updating, vec!["a"]);
        layer.tick(2000.0);
        assert_eq!(layer.len(), 1);
        assert_eq!(
            layer.get("a").unwrap().get("opacity", 2000.0),
            Some(AttrValue::Num(1.0))
        );
    }

    #[test]
    fn test_empty_join_is_noop() {
        let mut layer = Layer::new("data");
        let join = layer.join([], Transition::immediate(0.0), dot);
        assert_eq!(join, Join::default());
        assert!(layer.is_empty());
    }

    #[test]
    fn test_select_and_render() {
        let mut shape = dot("a");
        shape
            .select_mut("total")
            .unwrap()
            .set("cx", 10.0)
            .set_text("x<y");
        shape.classed("hidden", true);

        let mut out = String::new();
        shape.write_svg(&mut out, 0.0);
        assert_eq!(
            out,
            r#"<g class="datapoint hidden"><circle class="total" cx="10" r="4">x&lt;y</circle></g>"#
        );
    }
}
