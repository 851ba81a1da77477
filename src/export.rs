//! Writing processed tables to disk as TXT, CSV, TSV or JSON.
//!
//! File names follow `<stem>_<YYYYMMDD>_<HHMMSS>_<table>.<ext>`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use csv::WriterBuilder;
use log::info;
use serde::Serialize;

use crate::batch::ProcessedReview;
use crate::csv_safe_cell;
use crate::error::{Result, ReviewError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

#[derive(Serialize)]
struct WordCount<'a> {
    item: &'a str,
    count: u32,
}

/// Where and under which prefix export files are written.
#[derive(Clone, Debug)]
pub struct ExportTarget {
    dir: PathBuf,
    prefix: String,
}

impl ExportTarget {
    /// Prefix is `<stem>_<YYYYMMDD>_<HHMMSS>` using the local time of the call.
    pub fn new(dir: &Path, stem: &str) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            ReviewError::Export(format!("cannot create {}: {e}", dir.display()))
        })?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: format!("{stem}_{stamp}"),
        })
    }

    pub fn path(&self, table: &str, format: ExportFormat) -> PathBuf {
        self.dir
            .join(format!("{}_{table}.{}", self.prefix, format.extension()))
    }
}

/// Write the row table; TXT is not a table format and writes nothing.
pub fn export_rows(
    rows: &[ProcessedReview],
    format: ExportFormat,
    target: &ExportTarget,
) -> Result<Option<PathBuf>> {
    let path = target.path("processed", format);
    match format {
        ExportFormat::Txt => return Ok(None),
        ExportFormat::Json => {
            let mut w = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut w, rows)?;
            w.flush()?;
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let mut wtr = WriterBuilder::new()
                .delimiter(format.delimiter())
                .from_path(&path)?;
            wtr.write_record([
                "row",
                "sentiment",
                "review",
                "stems",
                "lemmas",
                "review_length",
                "word_count",
            ])?;
            for r in rows {
                wtr.write_record([
                    r.row.to_string(),
                    r.sentiment.to_string(),
                    csv_safe_cell(r.text.clone()),
                    csv_safe_cell(r.stems.join(" ")),
                    csv_safe_cell(r.lemmas.join(" ")),
                    r.review_length.to_string(),
                    r.word_count.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
    }
    info!("Wrote {}", path.display());
    Ok(Some(path))
}

/// Write `(word, count)` pairs in the given order.
pub fn export_wordfreq(
    words: &[(String, u32)],
    format: ExportFormat,
    target: &ExportTarget,
) -> Result<Option<PathBuf>> {
    let path = target.path("wordfreq", format);
    match format {
        ExportFormat::Txt => return Ok(None),
        ExportFormat::Json => {
            let items: Vec<WordCount> = words
                .iter()
                .map(|(item, count)| WordCount {
                    item,
                    count: *count,
                })
                .collect();
            let mut w = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut w, &items)?;
            w.flush()?;
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let mut wtr = WriterBuilder::new()
                .delimiter(format.delimiter())
                .from_path(&path)?;
            wtr.write_record(["item", "count"])?;
            for (item, count) in words {
                wtr.write_record([csv_safe_cell(item.clone()), count.to_string()])?;
            }
            wtr.flush()?;
        }
    }
    info!("Wrote {}", path.display());
    Ok(Some(path))
}

/// Write the text summary; only used for TXT exports.
pub fn export_summary(summary: &str, target: &ExportTarget) -> Result<PathBuf> {
    let path = target.path("summary", ExportFormat::Txt);
    fs::write(&path, summary)?;
    info!("Wrote {}", path.display());
    Ok(path)
}
