//! Text rendering of the backtest page
//!
//! Pure functions of the session: nothing here mutates state. The last
//! error is never rendered.

use std::fmt::Write;

use backtest_client_core::models::chart::ChartPoint;
use backtest_client_core::BacktestSession;

pub const TITLE: &str = "Bem vindo ao BRBT";
pub const TAGLINE: &str = "Utilize nossa plataforma para testar diferentes estratégias de \
investimento, e obtenha insights valiosos sobre o desempenho histórico de suas carteiras.";
pub const TOTAL_HEADING: &str = "Montante total";
pub const PER_ASSET_HEADING: &str = "Retorno por ação";

/// Widest bar drawn for the largest magnitude in a chart.
pub const BAR_WIDTH: usize = 40;

const POSITIVE_BAR: char = '█';
const NEGATIVE_BAR: char = '░';

pub fn render_header() -> String {
    format!("{TITLE}\n{TAGLINE}\n")
}

/// Render the whole page: header, form, ticker list and, once a result
/// exists, the final amount and charts.
pub fn render_page(session: &BacktestSession) -> String {
    let mut out = render_header();
    out.push('\n');
    out.push_str(&render_form(session));

    if let Some(amount) = session.final_amount() {
        let _ = writeln!(out, "\n{TOTAL_HEADING} : {amount}");
        out.push_str(&render_chart(&session.line_chart(), BAR_WIDTH));

        if let Some(bars) = session.bar_chart() {
            let _ = writeln!(out, "\n{PER_ASSET_HEADING}");
            out.push_str(&render_chart(&bars, BAR_WIDTH));
        }
    }
    out
}

/// Form fields followed by the numbered ticker list.
pub fn render_form(session: &BacktestSession) -> String {
    let form = session.form();
    let mut out = String::new();
    let _ = writeln!(out, "Method:             {}", form.method);
    let _ = writeln!(out, "Years:              {}", form.years);
    let _ = writeln!(out, "Initial Investment: {}", form.initial_investment);
    let _ = writeln!(out, "Ticker:             {}", form.ticker_input);

    if form.tickers.is_empty() {
        return out;
    }
    out.push_str("Tickers:\n");
    for (index, ticker) in form.tickers.iter().enumerate() {
        let _ = writeln!(out, "  [{index}] {ticker}");
    }
    out
}

/// Horizontal bar chart, one row per point: `label | bars value`.
///
/// Bars are scaled against the largest absolute value. Negative values use
/// a lighter glyph.
pub fn render_chart(points: &[ChartPoint], width: usize) -> String {
    let labels: Vec<String> = points.iter().map(|p| p.label.to_string()).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max_abs = points
        .iter()
        .map(|p| p.value.abs())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, point) in labels.iter().zip(points) {
        let len = bar_len(point.value, max_abs, width);
        let glyph = if point.value < 0.0 { NEGATIVE_BAR } else { POSITIVE_BAR };
        let bar: String = std::iter::repeat(glyph).take(len).collect();
        let sep = if bar.is_empty() { "" } else { " " };
        let _ = writeln!(
            out,
            "{label:>label_width$} | {bar}{sep}{value}",
            value = point.value
        );
    }
    out
}

fn bar_len(value: f64, max_abs: f64, width: usize) -> usize {
    if max_abs <= 0.0 || !value.is_finite() {
        return 0;
    }
    ((value.abs() / max_abs) * width as f64).round() as usize
}
