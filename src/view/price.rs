use super::{mismatch, theme, ViewCx};
use crate::error::RenderError;
use crate::payload::{Payload, PriceQuote, SourceKind};
use eframe::egui::{self, Color32, Pos2, Sense, Stroke};

/// Direction of the 24h change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn of(change: f64) -> Self {
        if change >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }

    pub fn color(self) -> Color32 {
        match self {
            Trend::Up => theme::GREEN,
            Trend::Down => theme::RED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceView {
    symbol: String,
    price_text: String,
    change_text: String,
    trend: Option<Trend>,
    history: Vec<f64>,
}

impl PriceView {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price_text: "...".into(),
            change_text: "--%".into(),
            trend: None,
            history: Vec::new(),
        }
    }

    pub fn price_text(&self) -> &str {
        &self.price_text
    }

    pub fn change_text(&self) -> &str {
        &self.change_text
    }

    pub fn trend(&self) -> Option<Trend> {
        self.trend
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        match payload {
            Payload::Price(quote) => self.apply_quote(quote),
            Payload::Unavailable(SourceKind::Http) => {
                self.price_text = "No Net".into();
                Ok(())
            }
            other => Err(mismatch("price", &other)),
        }
    }

    fn apply_quote(&mut self, quote: PriceQuote) -> Result<(), RenderError> {
        if !quote.price.is_finite() || !quote.change_24h.is_finite() {
            return Err(RenderError::Invalid(format!(
                "non-finite quote {} / {}",
                quote.price, quote.change_24h
            )));
        }
        if quote.history.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::Invalid("non-finite history point".into()));
        }
        // Everything is computed before any field changes so a rejected
        // quote cannot leave the view half updated.
        let price_text = format_price(&self.symbol, quote.price);
        let change_text = format_change(quote.change_24h);
        self.price_text = price_text;
        self.change_text = change_text;
        self.trend = Some(Trend::of(quote.change_24h));
        self.history = quote.history;
        Ok(())
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, _cx: &mut ViewCx<'_>) {
        let color = self.trend.map(Trend::color).unwrap_or(theme::MUTED);
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(&self.price_text)
                    .size(16.0)
                    .strong()
                    .color(Color32::WHITE),
            );
            ui.label(egui::RichText::new(&self.change_text).size(9.0).color(color));
        });
        let size = egui::vec2(ui.available_width(), ui.available_height().max(20.0));
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
        let points: Vec<Pos2> = graph_trace(&self.history, rect.width(), rect.height())
            .into_iter()
            .map(|p| rect.min + p.to_vec2())
            .collect();
        if let Some(last) = points.last().copied() {
            let painter = ui.painter_at(rect);
            painter.add(egui::Shape::line(points, Stroke::new(2.0, color)));
            painter.circle_filled(last, 2.0, Color32::WHITE);
        }
    }
}

/// `"$42,000"` above 100, `"$17.45"` at or below.
pub fn format_price(symbol: &str, price: f64) -> String {
    let decimals = if price > 100.0 { 0 } else { 2 };
    let fixed = format!("{:.*}", decimals, price.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let sign = if price < 0.0 { "-" } else { "" };
    let mut out = format!("{sign}{symbol}{}", group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"▲1.2%"` / `"▼2.5%"`.
pub fn format_change(change: f64) -> String {
    format!("{}{:.1}%", Trend::of(change).glyph(), change.abs())
}

/// Polyline for `data` inside a `width` x `height` canvas with 5px vertical
/// padding. A flat series is drawn along the bottom padding line.
pub fn graph_trace(data: &[f64], width: f32, height: f32) -> Vec<Pos2> {
    let Some(min) = data.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = data.iter().copied().fold(min, f64::max);
    let range = if max != min { max - min } else { 1.0 };
    let step = if data.len() > 1 {
        width / (data.len() - 1) as f32
    } else {
        0.0
    };
    data.iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f32 * step;
            let y = height - (((v - min) / range) as f32 * (height - 10.0)) - 5.0;
            Pos2::new(x, y)
        })
        .collect()
}
