use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Generate default Parquet filename with format: climate-trends-{YYMMDD}.parquet
pub fn generate_default_parquet_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("climate-trends-{:02}{:02}{:02}.parquet", year, month, day);
    PathBuf::from("output").join(filename)
}

/// Path of the JSON skip report written next to a results file
pub fn skip_report_path(results_path: &Path) -> PathBuf {
    results_path.with_extension("skipped.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_parquet_filename() {
        let filename = generate_default_parquet_filename();
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "output");

        let file_part = parts[1];
        assert!(file_part.starts_with("climate-trends-"));
        assert!(file_part.ends_with(".parquet"));
        // climate-trends- + YYMMDD + .parquet
        assert_eq!(file_part.len(), "climate-trends-".len() + 6 + ".parquet".len());
    }

    #[test]
    fn test_skip_report_path() {
        let path = skip_report_path(Path::new("output/climate-trends-261018.parquet"));
        assert_eq!(
            path,
            PathBuf::from("output/climate-trends-261018.skipped.json")
        );
    }
}
