// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Reads the Wisconsin Diagnostic Breast Cancer table from CSV.
//
// Two layouts are accepted:
//
//   1. The UCI archive file `wdbc.data` (no header):
//        id, diagnosis (M|B), 30 real-valued features
//
//   2. A headered CSV, e.g. a data frame export:
//        - a `target` column holding 0/1, or a `diagnosis`
//          column holding M/B
//        - an optional `id` column, ignored
//        - every other column is a numeric feature
//
// Labels follow the usual encoding for this table:
//   0 = malignant, 1 = benign
//
// Reference: csv crate documentation
//            UCI Machine Learning Repository, wdbc.names

use anyhow::{bail, ensure, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::Array2;
use std::{fs, path::PathBuf};

use crate::domain::dataset::TabularDataset;
use crate::domain::traits::DatasetSource;

/// Column names of the 30 features, in `wdbc.data` column order.
pub const FEATURE_NAMES: [&str; 30] = [
    "mean radius", "mean texture", "mean perimeter", "mean area",
    "mean smoothness", "mean compactness", "mean concavity",
    "mean concave points", "mean symmetry", "mean fractal dimension",
    "radius error", "texture error", "perimeter error", "area error",
    "smoothness error", "compactness error", "concavity error",
    "concave points error", "symmetry error", "fractal dimension error",
    "worst radius", "worst texture", "worst perimeter", "worst area",
    "worst smoothness", "worst compactness", "worst concavity",
    "worst concave points", "worst symmetry", "worst fractal dimension",
];

/// Class names indexed by label.
pub const TARGET_NAMES: [&str; 2] = ["malignant", "benign"];

/// id + diagnosis + 30 features
const UCI_COLUMNS: usize = FEATURE_NAMES.len() + 2;

/// Loads the table from a CSV file on disk.
/// Implements the DatasetSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for CsvLoader {
    fn load(&self) -> Result<TabularDataset> {
        if !self.path.exists() {
            bail!(
                "Dataset file '{}' not found. Pass --download to fetch it from the UCI archive.",
                self.path.display()
            );
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read '{}'", self.path.display()))?;

        let dataset = parse_table(&text)
            .with_context(|| format!("Cannot parse '{}'", self.path.display()))?;

        tracing::info!(
            "Loaded {} samples with {} features from '{}'",
            dataset.n_samples(),
            dataset.n_features(),
            self.path.display()
        );
        Ok(dataset)
    }
}

/// Parse CSV text in either supported layout.
pub fn parse_table(text: &str) -> Result<TabularDataset> {
    // Headers are detected by hand, and ragged rows get a
    // row-numbered error instead of the reader's generic one.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV at line {}", i + 1))?;
        // Skip blank lines
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        records.push(record);
    }

    let Some(first) = records.first() else {
        bail!("Dataset is empty");
    };

    if is_uci_record(first) {
        tracing::debug!("Detected UCI wdbc.data layout");
        parse_uci(&records)
    } else {
        tracing::debug!("Detected headered CSV layout");
        parse_headered(&records)
    }
}

/// A UCI row has 32 fields with the diagnosis letter second.
fn is_uci_record(record: &StringRecord) -> bool {
    record.len() == UCI_COLUMNS && matches!(record.get(1), Some("M") | Some("B"))
}

fn parse_uci(records: &[StringRecord]) -> Result<TabularDataset> {
    let mut flat   = Vec::with_capacity(records.len() * FEATURE_NAMES.len());
    let mut labels = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let line = i + 1;
        ensure!(
            record.len() == UCI_COLUMNS,
            "Line {}: expected {} columns, found {}",
            line,
            UCI_COLUMNS,
            record.len()
        );

        labels.push(parse_diagnosis(&record[1], line)?);
        for (j, value) in record.iter().skip(2).enumerate() {
            flat.push(parse_feature(value, FEATURE_NAMES[j], line)?);
        }
    }

    let features = Array2::from_shape_vec((labels.len(), FEATURE_NAMES.len()), flat)?;
    TabularDataset::new(
        features,
        labels,
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        target_names(),
    )
}

/// Where the label lives in a headered file and how to read it.
enum LabelColumn {
    /// 0 = malignant, 1 = benign
    Target(usize),
    /// M = malignant, B = benign
    Diagnosis(usize),
}

fn parse_headered(records: &[StringRecord]) -> Result<TabularDataset> {
    let header = &records[0];
    let rows   = &records[1..];
    ensure!(!rows.is_empty(), "Dataset has a header but no rows");

    let find = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));

    let target_idx    = find("target");
    let diagnosis_idx = find("diagnosis");
    let label_column = match (target_idx, diagnosis_idx) {
        (Some(idx), _)    => LabelColumn::Target(idx),
        (None, Some(idx)) => LabelColumn::Diagnosis(idx),
        (None, None)      => bail!("Header must contain a 'target' or 'diagnosis' column"),
    };
    let skipped = [target_idx, diagnosis_idx, find("id")];

    // Every remaining column is a feature, in header order.
    // `target` wins as the label; an extra `diagnosis` is never a feature.
    let feature_cols: Vec<usize> = (0..header.len())
        .filter(|&c| !skipped.contains(&Some(c)))
        .collect();
    ensure!(!feature_cols.is_empty(), "Header has no feature columns");
    let feature_names: Vec<String> = feature_cols
        .iter()
        .map(|&c| header[c].to_string())
        .collect();

    let mut flat   = Vec::with_capacity(rows.len() * feature_cols.len());
    let mut labels = Vec::with_capacity(rows.len());

    for (i, record) in rows.iter().enumerate() {
        // Line numbers count the header as line 1
        let line = i + 2;
        ensure!(
            record.len() == header.len(),
            "Line {}: expected {} columns, found {}",
            line,
            header.len(),
            record.len()
        );

        let label = match label_column {
            LabelColumn::Target(idx)    => parse_target(&record[idx], line)?,
            LabelColumn::Diagnosis(idx) => parse_diagnosis(&record[idx], line)?,
        };
        labels.push(label);

        for (&c, name) in feature_cols.iter().zip(&feature_names) {
            flat.push(parse_feature(&record[c], name, line)?);
        }
    }

    let features = Array2::from_shape_vec((labels.len(), feature_cols.len()), flat)?;
    TabularDataset::new(features, labels, feature_names, target_names())
}

fn parse_diagnosis(value: &str, line: usize) -> Result<usize> {
    match value {
        "M" | "m" => Ok(0),
        "B" | "b" => Ok(1),
        other     => bail!("Line {}: unknown diagnosis '{}' (expected M or B)", line, other),
    }
}

fn parse_target(value: &str, line: usize) -> Result<usize> {
    // Accept both `1` and `1.0` since data frame exports vary
    let parsed: f64 = value
        .parse()
        .with_context(|| format!("Line {}: target '{}' is not a number", line, value))?;
    if parsed == 0.0 {
        Ok(0)
    } else if parsed == 1.0 {
        Ok(1)
    } else {
        bail!("Line {}: target must be 0 or 1, found '{}'", line, value)
    }
}

fn parse_feature(value: &str, name: &str, line: usize) -> Result<f32> {
    let parsed = value
        .parse::<f32>()
        .with_context(|| format!("Line {}: column '{}' is not numeric: '{}'", line, name, value))?;
    // `f32::from_str` accepts "NaN" and "inf"; neither is a measurement
    ensure!(
        parsed.is_finite(),
        "Line {}: column '{}' is not numeric: '{}'",
        line,
        name,
        value
    );
    Ok(parsed)
}

fn target_names() -> Vec<String> {
    TARGET_NAMES.iter().map(|s| s.to_string()).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn uci_row(id: u32, diagnosis: &str, base: f32) -> String {
        let features: Vec<String> = (0..30).map(|j| format!("{}", base + j as f32)).collect();
        format!("{},{},{}", id, diagnosis, features.join(","))
    }

    #[test]
    fn test_parses_uci_layout() {
        let text = format!("{}\n{}\n", uci_row(842302, "M", 1.0), uci_row(8510426, "B", 2.5));
        let ds   = parse_table(&text).unwrap();

        assert_eq!(ds.shape(), (2, 30));
        assert_eq!(ds.labels, vec![0, 1]);
        assert_eq!(ds.feature_names[0], "mean radius");
        assert_eq!(ds.feature_names[29], "worst fractal dimension");
        assert_eq!(ds.target_names, vec!["malignant", "benign"]);
        assert_eq!(ds.features[[1, 0]], 2.5);
        assert_eq!(ds.features[[0, 29]], 30.0);
    }

    #[test]
    fn test_parses_headered_target_layout() {
        let text = "mean radius,mean texture,target\n17.99,10.38,0\n13.54,14.36,1.0\n";
        let ds   = parse_table(text).unwrap();

        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.feature_names, vec!["mean radius", "mean texture"]);
        assert_eq!(ds.labels, vec![0, 1]);
    }

    #[test]
    fn test_parses_headered_diagnosis_layout_and_ignores_id() {
        let text = "id,diagnosis,radius,texture\n1,B,1.0,2.0\n2,M,3.0,4.0\n\n";
        let ds   = parse_table(text).unwrap();

        assert_eq!(ds.feature_names, vec!["radius", "texture"]);
        assert_eq!(ds.labels, vec![1, 0]);
        assert_eq!(ds.features[[1, 1]], 4.0);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(parse_table("").is_err());
        assert!(parse_table("\n\n").is_err());
    }

    #[test]
    fn test_header_without_rows_is_error() {
        assert!(parse_table("a,b,target\n").is_err());
    }

    #[test]
    fn test_missing_label_column_is_error() {
        let err = parse_table("a,b\n1,2\n").unwrap_err();
        assert!(format!("{err:#}").contains("target"));
    }

    #[test]
    fn test_non_numeric_feature_is_error() {
        let err = parse_table("a,target\nabc,1\n").unwrap_err();
        assert!(format!("{err:#}").contains("not numeric"));
    }

    #[test]
    fn test_non_finite_feature_is_error() {
        for bad in ["NaN", "inf", "-infinity"] {
            let text = format!("a,target\n1.5,0\n{},1\n", bad);
            let err  = parse_table(&text).unwrap_err();
            let msg  = format!("{err:#}");
            assert!(msg.contains("not numeric"), "{} accepted: {}", bad, msg);
            assert!(msg.contains("Line 3"));
        }
    }

    #[test]
    fn test_target_and_diagnosis_both_excluded_from_features() {
        let text = "id,radius,diagnosis,texture,target\n1,1.0,B,2.0,1\n2,3.0,M,4.0,0\n";
        let ds   = parse_table(text).unwrap();

        assert_eq!(ds.feature_names, vec!["radius", "texture"]);
        assert_eq!(ds.labels, vec![1, 0]);
        assert_eq!(ds.features[[1, 1]], 4.0);
    }

    #[test]
    fn test_ragged_row_is_error() {
        let err = parse_table("a,b,target\n1,2,0\n1,0\n").unwrap_err();
        assert!(format!("{err:#}").contains("Line 3"));
    }

    #[test]
    fn test_bad_target_value_is_error() {
        assert!(parse_table("a,target\n1.0,2\n").is_err());
        assert!(parse_table("a,diagnosis\n1.0,X\n").is_err());
    }

    #[test]
    fn test_missing_file_mentions_download() {
        let loader = CsvLoader::new("/definitely/not/here/wdbc.data");
        let err    = loader.load().unwrap_err();
        assert!(err.to_string().contains("--download"));
    }

    #[test]
    fn test_loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", uci_row(1, "B", 0.5)).unwrap();
        writeln!(file, "{}", uci_row(2, "M", 0.7)).unwrap();

        let ds = CsvLoader::new(file.path()).load().unwrap();
        assert_eq!(ds.n_samples(), 2);
        assert_eq!(ds.class_counts(), vec![1, 1]);
    }
}
