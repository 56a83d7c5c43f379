pub mod station_file;

pub use station_file::{ParsedStationFile, StationFileReader};
