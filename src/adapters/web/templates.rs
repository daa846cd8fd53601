//! HTML templates using Askama.

use askama::Template;

use crate::domain::frame::{SplitFrame, VOLUME_COLUMN};
use crate::domain::price::{DerivedColumn, Series};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

#[derive(Template)]
#[template(path = "stock.html")]
pub struct StockTemplate<'a> {
    pub symbol: &'a str,
    pub plot_url: Option<&'a str>,
    pub latest: String,
    pub columns: &'a [String],
    pub rows: &'a [TableRow],
}

pub struct TableRow {
    pub date: String,
    pub cells: Vec<String>,
}

/// Table rows for a series, newest-first, prices to two decimals and
/// undefined averages left blank.
pub fn table_rows(frame: &SplitFrame) -> Vec<TableRow> {
    let volume_idx = frame.columns.iter().position(|c| c == VOLUME_COLUMN);
    frame
        .index
        .iter()
        .zip(&frame.data)
        .map(|(date, row)| TableRow {
            date: date.clone(),
            cells: row
                .iter()
                .enumerate()
                .map(|(i, value)| match value {
                    Some(v) if Some(i) == volume_idx => format!("{:.0}", v),
                    Some(v) => format!("{:.2}", v),
                    None => String::new(),
                })
                .collect(),
        })
        .collect()
}

/// One-line summary of the most recent close and regime inputs.
pub fn latest_summary(series: &Series) -> String {
    let Some(latest) = series.latest() else {
        return String::new();
    };
    let ma = |col: &Option<DerivedColumn>| {
        col.as_ref()
            .and_then(|c| c.get(0).map(|v| format!("{}: {:.2}", c.label(), v)))
    };
    let mut parts = vec![format!("Close on {}: {:.2}", latest.date, latest.close)];
    parts.extend(ma(&series.ma_short));
    parts.extend(ma(&series.ma_long));
    parts.join(" | ")
}

#[derive(Template)]
#[template(path = "stock_not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub symbol: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
