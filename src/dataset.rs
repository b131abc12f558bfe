//! Dataset loader: the five tournament CSVs, their schemas and a
//! process-lifetime cache keyed by resolved path.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use polars::prelude::*;

use crate::coerce::{ColumnSpec, DatasetSchema};
use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Batting,
    Bowling,
    Fielding,
    Partnerships,
    FinalMatch,
}

const BATTING_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("player"),
    ColumnSpec::numeric("runs"),
    ColumnSpec::numeric("batting_average"),
    ColumnSpec::numeric("strike_rate"),
    ColumnSpec::numeric("fifties_scored"),
    ColumnSpec::numeric("hundreds_scored"),
    ColumnSpec::numeric("boundary_fours"),
    ColumnSpec::numeric("boundary_sixes"),
];

const BOWLING_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("player"),
    ColumnSpec::numeric("wicket"),
    ColumnSpec::numeric("economy_rate"),
    ColumnSpec::numeric("bowling_average"),
    ColumnSpec::numeric("overs"),
];

const FIELDING_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("player"),
    ColumnSpec::numeric("catches"),
];

const PARTNERSHIP_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("partners"),
    ColumnSpec::numeric("runs"),
    ColumnSpec::numeric("wickets"),
    ColumnSpec::text("team").optional(),
];

const FINAL_MATCH_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("inning"),
    ColumnSpec::numeric("ball_over"),
    ColumnSpec::numeric("total_runs"),
    ColumnSpec::text("batsman").optional(),
    ColumnSpec::numeric("batsman_runs").optional(),
    ColumnSpec::text("player_dismissed").optional(),
    ColumnSpec::text("dismissal_kind").optional(),
    ColumnSpec::text("bowler").optional(),
    ColumnSpec::text("fielder").optional(),
];

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Batting,
        Dataset::Bowling,
        Dataset::Fielding,
        Dataset::Partnerships,
        Dataset::FinalMatch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Batting => "batting",
            Dataset::Bowling => "bowling",
            Dataset::Fielding => "fielding",
            Dataset::Partnerships => "partnership",
            Dataset::FinalMatch => "final match",
        }
    }

    /// Location relative to the data directory.
    pub fn default_path(self) -> PathBuf {
        let (dir, file) = match self {
            Dataset::Batting => ("Batting Records", "most_runs.csv"),
            Dataset::Bowling => ("Bowling Records", "most_wickets.csv"),
            Dataset::Fielding => ("Fielding Records", "most_catches.csv"),
            Dataset::Partnerships => ("Partnership Records", "highest_partnerships_by_runs.csv"),
            Dataset::FinalMatch => ("Final Tables", "npl_final.csv"),
        };
        Path::new(dir).join(file)
    }

    pub fn schema(self) -> DatasetSchema {
        let columns = match self {
            Dataset::Batting => BATTING_COLUMNS,
            Dataset::Bowling => BOWLING_COLUMNS,
            Dataset::Fielding => FIELDING_COLUMNS,
            Dataset::Partnerships => PARTNERSHIP_COLUMNS,
            Dataset::FinalMatch => FINAL_MATCH_COLUMNS,
        };
        DatasetSchema { columns }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves each dataset to a file under a base directory.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    base: PathBuf,
    relative: HashMap<Dataset, PathBuf>,
}

impl DatasetPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            relative: Dataset::ALL
                .iter()
                .map(|d| (*d, d.default_path()))
                .collect(),
        }
    }

    pub fn with(mut self, dataset: Dataset, relative: impl Into<PathBuf>) -> Self {
        self.relative.insert(dataset, relative.into());
        self
    }

    pub fn resolve(&self, dataset: Dataset) -> PathBuf {
        let relative = self
            .relative
            .get(&dataset)
            .cloned()
            .unwrap_or_else(|| dataset.default_path());
        self.base.join(relative)
    }
}

/// Read a CSV with every column as text, check required columns, then coerce.
pub fn read_dataset(dataset: Dataset, path: &Path) -> Result<DataFrame, LoadError> {
    if let Err(source) = std::fs::File::open(path) {
        return Err(match source.kind() {
            std::io::ErrorKind::NotFound => LoadError::Missing {
                dataset,
                path: path.to_path_buf(),
            },
            _ => LoadError::Read {
                dataset,
                path: path.to_path_buf(),
                source,
            },
        });
    }

    let parse_err = |source: PolarsError| LoadError::Parse {
        dataset,
        path: path.to_path_buf(),
        source,
    };

    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.into()))
        .and_then(|reader| reader.finish())
        .map_err(parse_err)?;

    let schema = dataset.schema();
    let missing = schema.missing_required(&raw);
    if !missing.is_empty() {
        return Err(LoadError::MissingColumn {
            dataset,
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    schema.apply(&raw).map_err(parse_err)
}

/// Memoizes successful loads by resolved path for the life of the process.
/// Failed loads are not cached, so a fixed file is picked up on the next render.
#[derive(Default)]
pub struct DatasetCache {
    tables: HashMap<PathBuf, Arc<DataFrame>>,
    disk_reads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, dataset: Dataset, path: &Path) -> Result<Arc<DataFrame>, LoadError> {
        if let Some(df) = self.tables.get(path) {
            debug!("{} table served from cache ({})", dataset, path.display());
            return Ok(Arc::clone(df));
        }

        self.disk_reads += 1;
        match read_dataset(dataset, path) {
            Ok(df) => {
                info!(
                    "loaded {} table from {}: {} rows x {} columns",
                    dataset,
                    path.display(),
                    df.height(),
                    df.width()
                );
                let df = Arc::new(df);
                self.tables.insert(path.to_path_buf(), Arc::clone(&df));
                Ok(df)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Number of times a file was actually read (cache misses).
    pub fn disk_reads(&self) -> usize {
        self.disk_reads
    }
}

/// Paths plus cache: the loader the views pull tables from.
pub struct Datasets {
    paths: DatasetPaths,
    cache: DatasetCache,
}

impl Datasets {
    pub fn new(paths: DatasetPaths) -> Self {
        Self {
            paths,
            cache: DatasetCache::new(),
        }
    }

    pub fn get(&mut self, dataset: Dataset) -> Result<Arc<DataFrame>, LoadError> {
        let path = self.paths.resolve(dataset);
        self.cache.load(dataset, &path)
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }
}

/// Distinct player labels from the batting table, sorted.
pub fn player_names(batting: &DataFrame) -> PolarsResult<Vec<String>> {
    let players = batting.column("player")?.str()?;
    let mut names: Vec<String> = players.into_iter().flatten().map(str::to_string).collect();
    names.sort();
    names.dedup();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_match_layout() {
        assert_eq!(
            Dataset::FinalMatch.default_path(),
            PathBuf::from("Final Tables/npl_final.csv")
        );
        let paths = DatasetPaths::new("/data");
        assert_eq!(
            paths.resolve(Dataset::Fielding),
            PathBuf::from("/data/Fielding Records/most_catches.csv")
        );
    }

    #[test]
    fn overridden_relative_path() {
        let paths = DatasetPaths::new("/data").with(Dataset::Batting, "bat.csv");
        assert_eq!(paths.resolve(Dataset::Batting), PathBuf::from("/data/bat.csv"));
    }

    #[test]
    fn player_names_sorted_and_distinct() {
        let df = df!("player" => &[Some("Rohit"), Some("Aasif"), None, Some("Rohit")]).unwrap();
        assert_eq!(player_names(&df).unwrap(), vec!["Aasif", "Rohit"]);
    }

    #[test]
    fn missing_file_is_load_error() {
        let mut cache = DatasetCache::new();
        let err = cache
            .load(Dataset::Bowling, Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Missing { .. }));
        assert!(cache.is_empty());
    }
}
