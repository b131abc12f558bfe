#![allow(dead_code)]

use npl_dash::{AppConfig, Dataset, DatasetPaths};
use polars::prelude::*;
use std::fs;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

pub const BATTING_CSV: &str = "\
player,runs,batting_average,strike_rate,fifties_scored,hundreds_scored,boundary_fours,boundary_sixes
Kushal Bhurtel,312,39.0,145.8,3,0,30,14
Aasif Sheikh,290,36.25,130.2,2,0,28,9
Dipendra Singh Airee,265,-,151.4,2,0,18,15
Rohit Paudel,240,30.0,120.0,1,0,20,6
Sompal Kami, 45 ,9.0,110.5,0,0,3,2
Gulsan Jha,,N/A,98.0,0,0,,1
";

pub const BOWLING_CSV: &str = "\
player,wicket,economy_rate,bowling_average,overs
Sandeep Lamichhane,18,6.1,12.5,36
Karan KC,14,7.4,16.2,30
Abinash Bohara,9,6.8,21.0,24
Lalit Rajbanshi,6,5.9,25.3,18
Sompal Kami,3,8.2,40.0,12
";

pub const FIELDING_CSV: &str = "\
player,catches
Aasif Sheikh,9
Kushal Malla,7
Rohit Paudel,7
Dipendra Singh Airee,5
Bhim Sharki,n/a
";

pub const PARTNERSHIPS_CSV: &str = "\
partners,runs,wickets,team
Kushal Bhurtel & Aasif Sheikh,145,1,Janakpur Bolts
Rohit Paudel & Dipendra Singh Airee,112,4,Biratnagar Kings
Kushal Malla & Gulsan Jha,98,3,Lumbini Lions
Aarif Sheikh & Sompal Kami,61,6,Janakpur Bolts
";

pub const FINAL_MATCH_CSV: &str = "\
inning,ball_over,total_runs,batsman,batsman_runs,player_dismissed,dismissal_kind,bowler,fielder
1,0.1,4,Kushal Bhurtel,4,,,Lalit Rajbanshi,
1,0.2,1,Kushal Bhurtel,1,,,Lalit Rajbanshi,
1,1.1,6,Aasif Sheikh,6,,,Sompal Kami,
1,1.2,0,Aasif Sheikh,0,Aasif Sheikh,caught,Sompal Kami,Kushal Malla
2,0.1,1,Rohit Paudel,1,,,Sandeep Lamichhane,
2,0.2,4,Rohit Paudel,4,,,Sandeep Lamichhane,
2,1.1,0,Gulsan Jha,0,Gulsan Jha,bowled,Karan KC,
";

/// Write `contents` to the dataset's default location under `base`.
pub fn write_dataset(base: &Path, dataset: Dataset, contents: &str) {
    let path = base.join(dataset.default_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Write a frame as CSV to the dataset's default location under `base`.
pub fn write_frame(base: &Path, dataset: Dataset, df: &mut DataFrame) {
    let path = base.join(dataset.default_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
}

/// A data directory holding all five datasets in their usual layout.
pub fn create_data_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_dataset(dir.path(), Dataset::Batting, BATTING_CSV);
    write_dataset(dir.path(), Dataset::Bowling, BOWLING_CSV);
    write_dataset(dir.path(), Dataset::Fielding, FIELDING_CSV);
    write_dataset(dir.path(), Dataset::Partnerships, PARTNERSHIPS_CSV);
    write_dataset(dir.path(), Dataset::FinalMatch, FINAL_MATCH_CSV);
    dir
}

pub fn dataset_paths(dir: &TempDir) -> DatasetPaths {
    DatasetPaths::new(dir.path())
}

/// Default config pointed at `dir`.
pub fn config_for(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.data.data_dir = Some(dir.path().to_path_buf());
    config
}
