//! Standalone HTML page: controls, legend, details panel and every chart.

use crate::chart::Chart;
use crate::continent::Palette;
use crate::dashboard::{Details, FilterState, TradeDashboard, WaterDashboard};
use crate::scene::escape_xml;
use std::fmt::Write;

const STYLE: &str = r#"<style>
  body { font-family: sans-serif; background: #fafafa; }
  .controls { margin: 1rem 0; }
  .year-button { margin-right: 2px; }
  .year-button.active { font-weight: bold; }
  .continent-checkbox { display: inline-block; margin-right: 1rem; cursor: pointer; }
  .continent-checkbox.inactive { opacity: 0.4; }
  .color-box { display: inline-block; width: 12px; height: 12px; margin-right: 4px; }
  .commodity-selector.selected { font-weight: bold; }
  .details-display { min-height: 4rem; white-space: pre-line; }
  .axis path, .axis line { fill: none; stroke: #000; shape-rendering: crispEdges; }
  .lineGroup line { stroke: #999; stroke-dasharray: 2,2; }
  .lineGroup.hidden { display: none; }
  .lineGroup.highlight line { stroke: #000; }
  .tooltip .background { fill: #fff; stroke: #333; }
  .yearline, .year-line { stroke: #333; stroke-width: 1; }
  .label-separator { stroke: #333; }
  .streamchart .background { fill: #212121; }
  .streamchart .label { fill: #fff; dominant-baseline: middle; }
  .label-percentage { text-anchor: end; }
  .year-total-label { fill: #fff; text-anchor: middle; }
</style>"#;

fn open(out: &mut String, title: &str) {
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, r#"<html><head><meta charset="utf-8"><title>{}</title>"#, escape_xml(title));
    let _ = writeln!(out, "{}", STYLE);
    let _ = writeln!(out, "</head><body>");
    let _ = writeln!(out, "<h1>{}</h1>", escape_xml(title));
}

fn close(out: &mut String) {
    let _ = writeln!(out, "</body></html>");
}

fn year_controls(out: &mut String, years: &[i64], state: &FilterState) {
    let _ = writeln!(out, r#"<div class="controls year-controls">"#);
    for year in years {
        let active = if *year == state.year { " active" } else { "" };
        let _ = writeln!(
            out,
            r#"<button class="year-button{}" data-year="{}">{}</button>"#,
            active, year, year
        );
    }
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        let _ = writeln!(
            out,
            r#"<input class="year-slider" type="range" min="{}" max="{}" step="1" value="{}">"#,
            first, last, state.year
        );
    }
    let _ = writeln!(out, r#"<span class="text-year">{}</span>"#, state.year);
    let _ = writeln!(out, "</div>");
}

fn continent_legend(out: &mut String, palette: &Palette, state: &FilterState) {
    let _ = writeln!(out, r#"<div class="controls continent-controls">"#);
    for style in palette.styles() {
        let class = if state.continent_filter.is_enabled(style.name) {
            "active"
        } else {
            "inactive"
        };
        let _ = writeln!(
            out,
            r#"<span class="continent-checkbox {}" data-continent="{}"><span class="color-box" style="background-color: {}"></span><span class="color-label">{}</span></span>"#,
            class,
            escape_xml(style.name),
            style.color,
            escape_xml(style.name)
        );
    }
    let _ = writeln!(out, "</div>");
}

fn details_panel(out: &mut String, details: &Details) {
    let lines: Vec<String> = details.lines().iter().map(|l| escape_xml(l)).collect();
    let _ = writeln!(out, r#"<div class="details-display">{}</div>"#, lines.join("\n"));
}

fn charts<'a>(out: &mut String, charts: impl IntoIterator<Item = &'a dyn Chart>, now: f64) {
    for chart in charts {
        let _ = writeln!(out, "{}", chart.svg(now));
    }
}

pub fn water_page(dash: &WaterDashboard) -> String {
    let state = dash.state();
    let mut out = String::new();
    open(&mut out, "Access to improved water sources");

    year_controls(&mut out, dash.years(), state);
    let _ = writeln!(
        out,
        r#"<div class="controls"><input class="text-filter" type="text" placeholder="Filter countries" value="{}"></div>"#,
        escape_xml(&state.text_filter)
    );
    continent_legend(&mut out, dash.palette(), state);
    details_panel(&mut out, &dash.details());
    charts(&mut out, dash.charts(), dash.now());

    close(&mut out);
    out
}

pub fn trade_page(dash: &TradeDashboard) -> String {
    let state = dash.state();
    let mut out = String::new();
    open(&mut out, "Commodity trade flows");

    year_controls(&mut out, dash.years(), state);
    let _ = writeln!(out, r#"<div class="controls commodity-controls">"#);
    for commodity in dash.commodities() {
        let selected = if state.commodity.as_deref() == Some(commodity.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            r#"<button class="commodity-selector{}" data-commodity="{}">{}</button>"#,
            selected,
            escape_xml(commodity),
            escape_xml(commodity)
        );
    }
    let _ = writeln!(out, "</div>");
    continent_legend(&mut out, dash.palette(), state);
    details_panel(&mut out, &dash.details());
    charts(&mut out, dash.charts(), dash.now());

    close(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures;
    use crate::dashboard::Control;
    use crate::record::ContinentRow;

    fn continent_rows() -> Vec<ContinentRow> {
        vec![
            ContinentRow {
                country: "Germany".into(),
                continent: "Europe".into(),
            },
            ContinentRow {
                country: "Niger".into(),
                continent: "Africa".into(),
            },
        ]
    }

    #[test]
    fn test_water_page_hooks() {
        let mut dash = WaterDashboard::new(&fixtures::water_rows(), &continent_rows());
        dash.dispatch(Control::ToggleContinent("Asia".into()));
        let html = dash.render_page();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<button class="year-button active" data-year="2012">"#));
        assert!(html.contains(r#"<button class="year-button" data-year="2000">"#));
        assert!(html.contains(r#"class="year-slider""#));
        assert!(html.contains(r#"<span class="text-year">2012</span>"#));
        assert!(html.contains(r#"class="continent-checkbox inactive" data-continent="Asia""#));
        assert!(html.contains(r#"class="continent-checkbox active" data-continent="Europe""#));
        assert_eq!(html.matches("<svg").count(), 3);
    }

    #[test]
    fn test_trade_page_escapes_commodity() {
        let dash = TradeDashboard::new(&fixtures::trade_rows(), &continent_rows());
        let html = dash.render_page();
        assert!(html.contains(
            r#"<button class="commodity-selector selected" data-commodity="Silicon, &lt;99.99% pure">"#
        ));
        assert!(html.contains(r#"class="details-display""#));
        assert_eq!(html.matches("<svg").count(), 5);
    }
}
