//! Writing the ranked table and printing the top-N report.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use hcare_ranker::{ScoredTable, WeightSource};

/// Write `table` as CSV: identifiers, labels, indicators, score, rank.
/// Missing values are written as empty cells.
pub fn write_scored<W: Write>(table: &ScoredTable, writer: W) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.column_names())?;

    for row in table.rows() {
        let mut cells = vec![row.location().to_string(), row.year().to_string()];
        cells.extend(
            table
                .label_columns()
                .iter()
                .map(|l| row.record.label(l).unwrap_or_default().to_string()),
        );
        cells.extend(
            table
                .columns()
                .iter()
                .map(|c| row.record.value(c).map(|v| v.to_string()).unwrap_or_default()),
        );
        cells.push(row.composite_score.to_string());
        cells.push(row.rank.to_string());
        out.write_record(&cells)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_scored_csv(table: &ScoredTable, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    write_scored(table, file)?;
    Ok(())
}

/// Plain-text top-N table for one year, followed by the weights used.
pub fn render_top_n(table: &ScoredTable, year: i32, n: usize) -> String {
    let rows = table.top_n(year, n);
    let mut s = String::new();
    if rows.is_empty() {
        let _ = writeln!(s, "No ranked rows for {year}.");
        return s;
    }

    let width = rows.iter().map(|r| r.location().chars().count()).max().unwrap_or(0).max(8);
    let _ = writeln!(s, "Top {} for {year}", rows.len());
    let _ = writeln!(s, "{:>4}  {:<width$}  {:>8}", "rank", "location", "score");
    for r in rows {
        let _ = writeln!(s, "{:>4}  {:<width$}  {:>8.4}", r.rank, r.location(), r.composite_score);
    }

    if let Some(w) = table.weights_for(year) {
        let source = match w.source {
            WeightSource::Pca => "pca".to_string(),
            WeightSource::Uniform(reason) => format!("uniform ({reason:?})"),
        };
        let _ = writeln!(s, "weights [{source}]:");
        for (name, weight) in w.indicators.iter().zip(&w.weights) {
            let _ = writeln!(s, "  {name:<28} {weight:.4}");
        }
    }
    s
}
