use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use dispatch_model::market::{PricePoint, PriceSeries};
use indexmap::IndexMap;

/// Market node the reference dataset is filtered to
pub const DEFAULT_NODE: &str = "N.Y.C.";

const TIME_STAMP_COLUMN: &str = "Time Stamp";
const NAME_COLUMN: &str = "Name";
const LBMP_COLUMN: &str = "LBMP ($/MWHr)";
const TIME_STAMP_FORMAT: &str = "%m/%d/%Y %H:%M";

/// One row of a NYISO day-ahead LBMP file, renamed to snake case
#[derive(Debug, Clone, PartialEq)]
pub struct LbmpRow {
    pub time_stamp: NaiveDateTime,
    pub name: String,
    pub lbmp: f64,
}

/// Reads one LBMP csv file and keeps the rows for a single market node
///
/// Column positions are taken from the header, so extra columns and column
/// reordering are tolerated as long as the three required headers exist.
pub fn read_lbmp_file(path: &Path, node: &str) -> Result<Vec<LbmpRow>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .with_context(|| format!("Empty file: {}", path.display()))??;
    let columns: Vec<&str> = header.split(',').map(|col| col.trim_matches('"')).collect();

    let time_stamp_column = columns
        .iter()
        .position(|&col| col == TIME_STAMP_COLUMN)
        .with_context(|| format!("Column '{}' not found in {}", TIME_STAMP_COLUMN, path.display()))?;
    let name_column = columns
        .iter()
        .position(|&col| col == NAME_COLUMN)
        .with_context(|| format!("Column '{}' not found in {}", NAME_COLUMN, path.display()))?;
    let lbmp_column = columns
        .iter()
        .position(|&col| col == LBMP_COLUMN)
        .with_context(|| format!("Column '{}' not found in {}", LBMP_COLUMN, path.display()))?;

    let mut rows = Vec::new();

    for (line_num, line) in lines.enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 2))?;
        if line.trim().is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(',').map(|v| v.trim().trim_matches('"')).collect();
        let needed = time_stamp_column.max(name_column).max(lbmp_column);
        if values.len() <= needed {
            bail!(
                "Invalid csv format on line {} of {}: '{}'",
                line_num + 2,
                path.display(),
                line
            );
        }

        if values[name_column] != node {
            continue;
        }

        let time_stamp = NaiveDateTime::parse_from_str(values[time_stamp_column], TIME_STAMP_FORMAT)
            .with_context(|| {
                format!(
                    "Could not parse time stamp on line {}: '{}'",
                    line_num + 2,
                    values[time_stamp_column]
                )
            })?;
        let lbmp: f64 = values[lbmp_column].parse().with_context(|| {
            format!(
                "Could not parse LBMP value on line {}: '{}'",
                line_num + 2,
                values[lbmp_column]
            )
        })?;

        rows.push(LbmpRow {
            time_stamp,
            name: values[name_column].to_string(),
            lbmp,
        });
    }

    Ok(rows)
}

/// Lists the market nodes in one LBMP file with their row counts,
/// in first-seen order
pub fn available_nodes(path: &Path) -> Result<IndexMap<String, usize>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .with_context(|| format!("Empty file: {}", path.display()))??;
    let columns: Vec<&str> = header.split(',').map(|col| col.trim_matches('"')).collect();
    let name_column = columns
        .iter()
        .position(|&col| col == NAME_COLUMN)
        .with_context(|| format!("Column '{}' not found in {}", NAME_COLUMN, path.display()))?;

    let mut nodes: IndexMap<String, usize> = IndexMap::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let values: Vec<&str> = line.split(',').map(|v| v.trim().trim_matches('"')).collect();
        if let Some(&name) = values.get(name_column) {
            *nodes.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    Ok(nodes)
}

/// Loads a dense hourly price series for one node from a directory of
/// LBMP csv files
///
/// Rows from all files are concatenated, sorted by timestamp, and
/// reindexed to a 0-based hour counter. File names carry no meaning; the
/// timestamps decide the order.
pub fn load_price_series(dir: &Path, node: &str) -> Result<PriceSeries> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        bail!("No csv files found in {}", dir.display());
    }

    let mut rows = Vec::new();
    for path in &paths {
        rows.extend(read_lbmp_file(path, node)?);
    }
    if rows.is_empty() {
        bail!(
            "No rows for node '{}' in {} file(s) under {}",
            node,
            paths.len(),
            dir.display()
        );
    }

    rows.sort_by_key(|row| row.time_stamp);

    let points = rows
        .into_iter()
        .enumerate()
        .map(|(hour, row)| PricePoint::new(hour, row.lbmp, row.time_stamp))
        .collect();

    Ok(PriceSeries::new(points))
}
