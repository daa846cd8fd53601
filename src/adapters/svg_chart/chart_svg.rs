//! SVG markup for the price / moving-average overlay chart.

use crate::domain::regime::{Regime, RegimePoint};

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 600.0;
const PADDING: f64 = 70.0;

const CLOSE_COLOR: &str = "blue";
const SHORT_MA_COLOR: &str = "orange";
const LONG_MA_COLOR: &str = "green";
const ABOVE_COLOR: &str = "red";
const BELOW_COLOR: &str = "green";

struct Scale {
    min: f64,
    max: f64,
    step_x: f64,
}

impl Scale {
    fn fit(points: &[RegimePoint]) -> Self {
        let values = points
            .iter()
            .flat_map(|p| [Some(p.close), p.ma_short, p.ma_long])
            .flatten();
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let plot_width = WIDTH - 2.0 * PADDING;
        let step_x = if points.len() > 1 {
            plot_width / (points.len() - 1) as f64
        } else {
            0.0
        };
        Self { min, max, step_x }
    }

    fn x(&self, i: usize) -> f64 {
        PADDING + i as f64 * self.step_x
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - 2.0 * PADDING;
        let range = self.max - self.min;
        if range > 0.0 {
            HEIGHT - PADDING - (value - self.min) * plot_height / range
        } else {
            HEIGHT / 2.0
        }
    }
}

/// Full SVG document for `points` (oldest-first). Empty input yields an
/// empty-state chart rather than an error.
pub fn generate_regime_svg(points: &[RegimePoint], title: &str) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push_str(&format!(
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="30" text-anchor="middle" font-size="18">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    ));

    if points.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">No price data available.</text></svg>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        ));
        return svg;
    }

    let scale = Scale::fit(points);
    svg.push_str(&grid(&scale));
    svg.push_str(&axes(points, &scale));

    svg.push_str(&polyline(
        points.iter().map(|p| Some(p.close)),
        &scale,
        CLOSE_COLOR,
        "close",
    ));
    svg.push_str(&polyline(
        points.iter().map(|p| p.ma_short),
        &scale,
        SHORT_MA_COLOR,
        "ma-short",
    ));
    svg.push_str(&polyline(
        points.iter().map(|p| p.ma_long),
        &scale,
        LONG_MA_COLOR,
        "ma-long",
    ));

    for (i, p) in points.iter().enumerate() {
        let color = match p.regime {
            Regime::AboveBoth => ABOVE_COLOR,
            Regime::BelowBoth => BELOW_COLOR,
            Regime::Mixed => continue,
        };
        svg.push_str(&format!(
            r#"<circle class="regime-{}" cx="{:.1}" cy="{:.1}" r="2.5" fill="{}"/>"#,
            p.regime.to_string().to_lowercase(),
            scale.x(i),
            scale.y(p.close),
            color
        ));
    }

    svg.push_str(&legend());
    svg.push_str("</svg>");
    svg
}

/// One `<polyline>` per contiguous run of defined values, so undefined
/// averages leave a gap instead of dropping to zero.
fn polyline(
    values: impl Iterator<Item = Option<f64>>,
    scale: &Scale,
    color: &str,
    class: &str,
) -> String {
    let mut out = String::new();
    let mut run: Vec<String> = Vec::new();
    let flush = |run: &mut Vec<String>, out: &mut String| {
        if !run.is_empty() {
            out.push_str(&format!(
                r#"<polyline class="{}" fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                class,
                color,
                run.join(" ")
            ));
            run.clear();
        }
    };

    for (i, value) in values.enumerate() {
        match value {
            Some(v) => run.push(format!("{:.1},{:.1}", scale.x(i), scale.y(v))),
            None => flush(&mut run, &mut out),
        }
    }
    flush(&mut run, &mut out);
    out
}

fn grid(scale: &Scale) -> String {
    let mut out = String::new();
    for step in 0..=4 {
        let value = scale.min + (scale.max - scale.min) * step as f64 / 4.0;
        let y = scale.y(value);
        out.push_str(&format!(
            r##"<line x1="{PADDING}" y1="{y:.1}" x2="{}" y2="{y:.1}" stroke="#ddd"/>"##,
            WIDTH - PADDING
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="11">{:.2}</text>"#,
            PADDING - 6.0,
            y + 4.0,
            value
        ));
    }
    out
}

fn axes(points: &[RegimePoint], scale: &Scale) -> String {
    let bottom = HEIGHT - PADDING;
    let mut out = format!(
        r#"<line x1="{PADDING}" y1="{PADDING}" x2="{PADDING}" y2="{bottom}" stroke="black"/>"#
    );
    out.push_str(&format!(
        r#"<line x1="{PADDING}" y1="{bottom}" x2="{}" y2="{bottom}" stroke="black"/>"#,
        WIDTH - PADDING
    ));

    let last = points.len() - 1;
    let ticks = [0, last / 2, last];
    for &i in ticks.iter() {
        out.push_str(&format!(
            r#"<text x="{:.1}" y="{}" text-anchor="middle" font-size="11">{}</text>"#,
            scale.x(i),
            bottom + 18.0,
            points[i].date
        ));
    }

    out.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="13">Date</text>"#,
        WIDTH / 2.0,
        HEIGHT - 20.0
    ));
    out.push_str(&format!(
        r#"<text x="18" y="{}" text-anchor="middle" font-size="13" transform="rotate(-90 18 {})">Price (USD)</text>"#,
        HEIGHT / 2.0,
        HEIGHT / 2.0
    ));
    out
}

fn legend() -> String {
    let entries = [
        ("Close Price", CLOSE_COLOR),
        ("Short MA", SHORT_MA_COLOR),
        ("Long MA", LONG_MA_COLOR),
    ];
    let mut out = String::new();
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = PADDING + 10.0 + i as f64 * 18.0;
        out.push_str(&format!(
            r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{color}" stroke-width="2"/><text x="{tx}" y="{ty}" font-size="12">{label}</text>"#,
            x1 = PADDING + 10.0,
            x2 = PADDING + 35.0,
            tx = PADDING + 42.0,
            ty = y + 4.0,
        ));
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
