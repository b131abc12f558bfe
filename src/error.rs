use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::dataset::Dataset;

/// A dataset could not be turned into a table. Fatal for that dataset's tab only.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{dataset} data not found at {}", path.display())]
    Missing { dataset: Dataset, path: PathBuf },

    #[error("could not read {dataset} data at {}: {source}", path.display())]
    Read {
        dataset: Dataset,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {dataset} data at {}: {source}", path.display())]
    Parse {
        dataset: Dataset,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("{dataset} data at {} is missing required column(s): {}", path.display(), columns.join(", "))]
    MissingColumn {
        dataset: Dataset,
        path: PathBuf,
        columns: Vec<&'static str>,
    },
}

impl LoadError {
    pub fn dataset(&self) -> Dataset {
        match self {
            LoadError::Missing { dataset, .. }
            | LoadError::Read { dataset, .. }
            | LoadError::Parse { dataset, .. }
            | LoadError::MissingColumn { dataset, .. } => *dataset,
        }
    }
}

/// Why a tab could not produce its view.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to compute view: {0}")]
    Compute(#[from] PolarsError),
}
