pub mod axis;
pub mod chart;
pub mod color;
pub mod continent;
pub mod dashboard;
pub mod format;
pub mod loader;
pub mod measure;
pub mod nest;
pub mod page;
pub mod path;
pub mod record;
pub mod scale;
pub mod scene;
pub mod stack;
pub mod transition;
pub mod view;

use wasm_bindgen::prelude::*;

use dashboard::{Control, TradeDashboard, WaterDashboard};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn year_array(years: &[i64]) -> js_sys::Array {
    years.iter().map(|y| JsValue::from_f64(*y as f64)).collect()
}

/// Water access dashboard: scatter, difference and year-trend charts.
#[wasm_bindgen(js_name = "WaterDashboard")]
pub struct WasmWaterDashboard {
    inner: WaterDashboard,
}

#[wasm_bindgen(js_class = "WaterDashboard")]
impl WasmWaterDashboard {
    #[wasm_bindgen(constructor)]
    pub fn new(water_csv: &str, gdp_csv: &str, continents_csv: &str) -> Result<WasmWaterDashboard, String> {
        let inner = WaterDashboard::from_csv(water_csv, gdp_csv, continents_csv).map_err(|e| e.to_string())?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = "setYear")]
    pub fn set_year(&mut self, year: i32) {
        self.inner.dispatch(Control::Year(year.into()));
    }

    #[wasm_bindgen(js_name = "setFilter")]
    pub fn set_filter(&mut self, text: String) {
        self.inner.dispatch(Control::Text(text));
    }

    #[wasm_bindgen(js_name = "toggleContinent")]
    pub fn toggle_continent(&mut self, continent: String) {
        self.inner.dispatch(Control::ToggleContinent(continent));
    }

    pub fn hover(&mut self, country: String) {
        self.inner.dispatch(Control::Hover(country));
    }

    pub fn unhover(&mut self) {
        self.inner.dispatch(Control::Unhover);
    }

    /// Move the render clock forward by `dt` milliseconds.
    pub fn advance(&mut self, dt: f64) {
        self.inner.advance(dt);
    }

    #[wasm_bindgen(js_name = "chartSvg")]
    pub fn chart_svg(&self, name: &str) -> Option<String> {
        self.inner.chart_svg(name)
    }

    #[wasm_bindgen(js_name = "renderPage")]
    pub fn render_page(&self) -> String {
        self.inner.render_page()
    }

    pub fn years(&self) -> js_sys::Array {
        year_array(self.inner.years())
    }

    /// Details of the hovered country, as JSON.
    pub fn details(&self) -> Result<String, String> {
        serde_json::to_string(&self.inner.details()).map_err(|e| e.to_string())
    }
}

/// Commodity trade dashboard: flow bars, streams and the import/export scatter.
#[wasm_bindgen(js_name = "TradeDashboard")]
pub struct WasmTradeDashboard {
    inner: TradeDashboard,
}

#[wasm_bindgen(js_class = "TradeDashboard")]
impl WasmTradeDashboard {
    #[wasm_bindgen(constructor)]
    pub fn new(trade_csv: &str, continents_csv: &str) -> Result<WasmTradeDashboard, String> {
        let inner = TradeDashboard::from_csv(trade_csv, continents_csv).map_err(|e| e.to_string())?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = "setYear")]
    pub fn set_year(&mut self, year: i32) {
        self.inner.dispatch(Control::Year(year.into()));
    }

    #[wasm_bindgen(js_name = "setCommodity")]
    pub fn set_commodity(&mut self, commodity: String) {
        self.inner.dispatch(Control::Commodity(commodity));
    }

    #[wasm_bindgen(js_name = "setFilter")]
    pub fn set_filter(&mut self, text: String) {
        self.inner.dispatch(Control::Text(text));
    }

    #[wasm_bindgen(js_name = "toggleContinent")]
    pub fn toggle_continent(&mut self, continent: String) {
        self.inner.dispatch(Control::ToggleContinent(continent));
    }

    pub fn hover(&mut self, country: String) {
        self.inner.dispatch(Control::Hover(country));
    }

    pub fn unhover(&mut self) {
        self.inner.dispatch(Control::Unhover);
    }

    pub fn advance(&mut self, dt: f64) {
        self.inner.advance(dt);
    }

    #[wasm_bindgen(js_name = "chartSvg")]
    pub fn chart_svg(&self, name: &str) -> Option<String> {
        self.inner.chart_svg(name)
    }

    #[wasm_bindgen(js_name = "renderPage")]
    pub fn render_page(&self) -> String {
        self.inner.render_page()
    }

    pub fn years(&self) -> js_sys::Array {
        year_array(self.inner.years())
    }

    pub fn commodities(&self) -> js_sys::Array {
        self.inner
            .commodities()
            .iter()
            .map(|c| JsValue::from_str(c))
            .collect()
    }

    pub fn details(&self) -> Result<String, String> {
        serde_json::to_string(&self.inner.details()).map_err(|e| e.to_string())
    }
}
