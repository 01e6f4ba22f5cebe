//! Training-set preparation: cleanup, seeded train/test split, CSV output.

use crate::hub_client::CommitFile;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Identifier columns removed before training.
pub const ID_COLUMNS: [&str; 2] = ["Unnamed: 0", "CustomerID"];
pub const TARGET_COLUMN: &str = "ProdTaken";
pub const GENDER_COLUMN: &str = "Gender";

pub const TEST_SIZE: f64 = 0.2;
pub const RANDOM_SEED: u64 = 42;

/// In-memory table of raw CSV cells.
///
/// Cells stay as text so missing values and number formatting pass through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Reads a CSV with a header row.
    ///
    /// An empty header (the index column written by dataframe tools) at
    /// position `i` is named `Unnamed: i`.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if h.trim().is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    h.to_string()
                }
            })
            .collect::<Vec<_>>();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Malformed CSV row {}", line + 2))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_csv(std::io::BufReader::new(file))
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
    }

    /// Removes the named columns; every name must exist.
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        let mut indices = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();
        indices.dedup();

        for &index in indices.iter().rev() {
            self.headers.remove(index);
            for row in &mut self.rows {
                row.remove(index);
            }
        }
        Ok(())
    }

    /// Rewrites every cell of one column.
    pub fn map_column<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn(&str) -> String,
    {
        let index = self.column_index(name)?;
        for row in &mut self.rows {
            row[index] = f(&row[index]);
        }
        Ok(())
    }

    /// Non-empty values and their counts, most frequent first.
    pub fn value_counts(&self, name: &str) -> Result<Vec<(String, usize)>> {
        let index = self.column_index(name)?;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &self.rows {
            let value = row[index].as_str();
            if !value.is_empty() {
                *counts.entry(value).or_default() += 1;
            }
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(counts)
    }

    /// Splits into (features, target) tables.
    pub fn split_column(&self, name: &str) -> Result<(Table, Table)> {
        let index = self.column_index(name)?;

        let mut features = self.clone();
        features.headers.remove(index);
        for row in &mut features.rows {
            row.remove(index);
        }

        let target = Table {
            headers: vec![name.to_string()],
            rows: self.rows.iter().map(|row| vec![row[index].clone()]).collect(),
        };

        Ok((features, target))
    }

    /// New table holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }
}

/// Title-cases like Python's `str.title`: the first letter of every run of
/// letters is upper-cased, the rest lower-cased.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_is_letter = false;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Trims and title-cases a gender value, folding the "Fe Male" typo into
/// "Female". Empty cells stay empty.
pub fn normalize_gender(raw: &str) -> String {
    let cleaned = title_case(raw.trim());
    if cleaned == "Fe Male" {
        "Female".to_string()
    } else {
        cleaned
    }
}

/// Seeded split parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: TEST_SIZE,
            seed: RANDOM_SEED,
        }
    }
}

/// Returns (train, test) row indices.
///
/// `round(test_size * n)` rows go to test. Both partitions follow the order
/// of one seeded permutation, so identical input always splits identically.
pub fn train_test_indices(n: usize, config: SplitConfig) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(config.test_size > 0.0 && config.test_size < 1.0) {
        anyhow::bail!("test_size must be in (0, 1), got {}", config.test_size);
    }

    let n_test = (config.test_size * n as f64).round() as usize;
    if n > 0 && (n_test == 0 || n_test == n) {
        anyhow::bail!(
            "test_size {} on {} rows leaves an empty partition",
            config.test_size,
            n
        );
    }

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    permutation.shuffle(&mut rng);

    let train = permutation.split_off(n_test);
    Ok((train, permutation))
}

/// The four partition tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDataset {
    pub x_train: Table,
    pub x_test: Table,
    pub y_train: Table,
    pub y_test: Table,
}

impl PreparedDataset {
    /// Output file names paired with their tables.
    pub fn files(&self) -> [(&'static str, &Table); 4] {
        [
            ("X_train.csv", &self.x_train),
            ("X_test.csv", &self.x_test),
            ("y_train.csv", &self.y_train),
            ("y_test.csv", &self.y_test),
        ]
    }

    /// Writes the four CSVs into `dir` and returns their paths.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let mut written = Vec::with_capacity(4);
        for (name, table) in self.files() {
            let path = dir.join(name);
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            table
                .write_csv(std::io::BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} ({} rows)", path.display(), table.rows.len());
            written.push(path);
        }
        Ok(written)
    }

    /// The four CSVs as hub commit entries, named by file only.
    pub fn commit_files(&self) -> Result<Vec<CommitFile>> {
        self.files()
            .into_iter()
            .map(|(name, table)| {
                Ok(CommitFile {
                    path_in_repo: name.to_string(),
                    content: table.to_csv_bytes()?,
                })
            })
            .collect()
    }
}

fn log_value_counts(table: &Table, column: &str, stage: &str) -> Result<()> {
    tracing::info!("{} value counts {}:", column, stage);
    for (value, count) in table.value_counts(column)? {
        tracing::info!("  {:<10} {}", value, count);
    }
    Ok(())
}

/// Cleans the raw dataset and splits it into train/test partitions.
///
/// Steps: drop identifier columns, normalize `Gender`, separate the
/// `ProdTaken` target, seeded split.
pub fn prepare(mut table: Table, split: SplitConfig) -> Result<PreparedDataset> {
    let (rows, cols) = table.shape();
    tracing::info!("Dataset loaded: {} rows x {} columns", rows, cols);

    table
        .drop_columns(&ID_COLUMNS)
        .context("Dropping identifier columns")?;

    log_value_counts(&table, GENDER_COLUMN, "before correction")?;
    table.map_column(GENDER_COLUMN, normalize_gender)?;
    log_value_counts(&table, GENDER_COLUMN, "after correction")?;

    let (features, target) = table.split_column(TARGET_COLUMN)?;
    let (train, test) = train_test_indices(table.rows.len(), split)?;

    let prepared = PreparedDataset {
        x_train: features.select_rows(&train),
        x_test: features.select_rows(&test),
        y_train: target.select_rows(&train),
        y_test: target.select_rows(&test),
    };

    tracing::info!(
        "Split {} rows: {} train / {} test (test_size={}, seed={})",
        rows,
        train.len(),
        test.len(),
        split.test_size,
        split.seed
    );
    Ok(prepared)
}
