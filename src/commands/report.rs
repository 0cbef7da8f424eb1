//! Report command implementation

use crate::aggregate::{aggregate, AggregateCount};
use crate::error::Result;
use crate::report::{render_table, write_chart, write_csv};
use crate::store::TopicStore;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub csv: Option<PathBuf>,
    pub chart: Option<PathBuf>,
    pub title: String,
}

/// Aggregate the store and write the requested outputs
pub async fn cmd_report(store: &TopicStore, options: &ReportOptions) -> Result<AggregateCount> {
    let counts = aggregate(store).await?;

    if let Some(path) = &options.csv {
        write_csv(&counts, path)?;
    }
    if let Some(path) = &options.chart {
        write_chart(&counts, path, &options.title)?;
    }

    Ok(counts)
}

pub fn print_report(counts: &AggregateCount, options: &ReportOptions) {
    if counts.is_empty() {
        println!("No topics stored yet.");
        return;
    }

    println!();
    print!("{}", render_table(counts));

    if let Some(path) = &options.csv {
        println!("\nCSV written to {}", path.display());
    }
    if let Some(path) = &options.chart {
        println!("Chart figure written to {}", path.display());
    }
}
