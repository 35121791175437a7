pub mod ghcn_reader;

pub use ghcn_reader::{
    discover_station_files, prune_irrelevant, station_name_from_path, GhcnReader, StationData,
};
