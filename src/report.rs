//! Rendering aggregated counts: CSV, grouped-bar chart figure, terminal table

use crate::aggregate::AggregateCount;
use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Chart title used when none is given
pub const DEFAULT_CHART_TITLE: &str = "Coverage by topic and source";

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    topic: &'a str,
    source: &'a str,
    count: u64,
}

/// Write `(topic, source, count)` rows with a header to any writer
pub fn write_csv_to<W: Write>(agg: &AggregateCount, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (topic, source, count) in agg.rows() {
        wtr.serialize(CsvRow {
            topic,
            source,
            count,
        })?;
    }
    // no rows means serde never wrote the header
    if agg.rows().is_empty() {
        wtr.write_record(["topic", "source", "count"])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(agg: &AggregateCount, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv_to(agg, file)?;
    info!("Wrote CSV report to {}", path.display());
    Ok(())
}

/// Plotly figure: topics on the x-axis, one bar series per source
pub fn chart_figure(agg: &AggregateCount, title: &str) -> Value {
    let topics: Vec<&str> = agg.topics().collect();

    let data: Vec<Value> = agg
        .sources()
        .map(|source| {
            let counts: Vec<u64> = topics
                .iter()
                .map(|topic| agg.get(topic, source).unwrap_or(0))
                .collect();
            json!({
                "type": "bar",
                "name": source,
                "x": topics,
                "y": counts,
            })
        })
        .collect();

    json!({
        "data": data,
        "layout": {
            "title": {"text": title},
            "barmode": "group",
            "xaxis": {"title": {"text": "Topic"}},
            "yaxis": {"title": {"text": "Records"}},
        }
    })
}

pub fn write_chart(agg: &AggregateCount, path: &Path, title: &str) -> Result<()> {
    let figure = chart_figure(agg, title);
    std::fs::write(path, serde_json::to_string_pretty(&figure)?)?;
    info!("Wrote chart figure to {}", path.display());
    Ok(())
}

/// Fixed-width table with one row per topic and one column per source
pub fn render_table(agg: &AggregateCount) -> String {
    let sources: Vec<&str> = agg.sources().collect();
    let topic_width = agg
        .topics()
        .map(|topic| topic.chars().count())
        .chain(std::iter::once("Topic".len()))
        .max()
        .unwrap_or(5);

    let mut out = format!("{:<width$}", "Topic", width = topic_width);
    for source in &sources {
        out.push_str(&format!("  {:>width$}", source, width = source.chars().count()));
    }
    out.push('\n');

    for topic in agg.topics() {
        out.push_str(&format!("{:<width$}", topic, width = topic_width));
        for source in &sources {
            let count = agg.get(topic, source).unwrap_or(0);
            out.push_str(&format!("  {:>width$}", count, width = source.chars().count()));
        }
        out.push('\n');
    }

    out
}
