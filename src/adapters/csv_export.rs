//! CSV export of the joined price/yield table.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::domain::analysis::{AnalysisResult, TableRow, TABLE_COLUMNS};
use crate::domain::error::DivyieldError;
use crate::ports::report_port::ReportPort;

fn csv_error(e: csv::Error) -> DivyieldError {
    DivyieldError::Io(std::io::Error::other(e))
}

/// The export as a string, date as the first (index) column. Values are
/// written unrounded; the rounded view is [`AnalysisResult::table_rows`].
pub fn to_csv_string(result: &AnalysisResult) -> Result<String, DivyieldError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(TABLE_COLUMNS).map_err(csv_error)?;
    for row in result.raw_rows() {
        wtr.serialize(row).map_err(csv_error)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| DivyieldError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| DivyieldError::Io(std::io::Error::other(e)))
}

/// Parse a file produced by [`to_csv_string`] back into rows.
pub fn read_analysis_csv<R: Read>(reader: R) -> Result<Vec<TableRow>, DivyieldError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?;
    if headers.iter().ne(TABLE_COLUMNS.iter().copied()) {
        return Err(DivyieldError::Io(std::io::Error::other(format!(
            "unexpected CSV header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        ))));
    }

    rdr.deserialize()
        .collect::<Result<Vec<TableRow>, _>>()
        .map_err(csv_error)
}

pub struct CsvExportAdapter;

impl ReportPort for CsvExportAdapter {
    fn file_name(&self, result: &AnalysisResult) -> String {
        format!(
            "{}_stock_data_{}_{}.csv",
            result.ticker, result.range.start, result.range.end
        )
    }

    fn write(&self, result: &AnalysisResult, output_dir: &Path) -> Result<PathBuf, DivyieldError> {
        let content = to_csv_string(result)?;
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(self.file_name(result));
        fs::write(&path, content)?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::axis::compute_axis_range;
    use crate::domain::analysis::Summary;
    use crate::domain::date_range::DateRange;
    use crate::domain::dividend::AnnualDividendSelection;
    use crate::domain::price_bar::PriceBar;
    use crate::domain::yield_series::{build_yield_series, YieldPolicy};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_result() -> AnalysisResult {
        let bars: Vec<PriceBar> = [(2, 59.4), (3, 60.012345), (4, 59.6)]
            .iter()
            .map(|&(day, close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: close - 0.2,
                high: close + 0.4,
                low: close - 0.5,
                close,
                volume: 1_000_000 + day as i64,
            })
            .collect();
        let series = build_yield_series(&bars, 1.94).unwrap();
        let axis = compute_axis_range(&series).unwrap();
        AnalysisResult {
            ticker: "KO".into(),
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            },
            policy: YieldPolicy::Static,
            selection: AnnualDividendSelection { year: 2023, total: 1.94 },
            summary: Summary {
                latest_close: 59.6,
                highest_close: 60.012345,
                lowest_close: 59.4,
                average_yield: series.mean().unwrap(),
            },
            bars,
            series,
            axis,
        }
    }

    #[test]
    fn header_and_row_layout() {
        let csv = to_csv_string(&sample_result()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Open,High,Low,Close,Volume,DIVIDEND YIELD")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("2024-01-02,"));
        assert!(first.contains(",1000002,"));
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn round_trip_within_four_places() {
        let result = sample_result();
        let csv = to_csv_string(&result).unwrap();
        let rows = read_analysis_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), result.bars.len());
        for ((row, bar), point) in rows.iter().zip(&result.bars).zip(result.series.points()) {
            assert_eq!(row.date, bar.date);
            assert_abs_diff_eq!(row.close, bar.close, epsilon = 1e-4);
            assert_abs_diff_eq!(row.dividend_yield, point.yield_percent, epsilon = 1e-4);
        }
    }

    #[test]
    fn bad_value_is_an_error() {
        let csv = "Date,Open,High,Low,Close,Volume,DIVIDEND YIELD\n2024-01-02,1,1,1,abc,5,0.1\n";
        assert!(read_analysis_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn zero_yield_is_written_unsigned() {
        let mut result = sample_result();
        result.series = build_yield_series(&result.bars, 0.0).unwrap();
        let csv = to_csv_string(&result).unwrap();
        assert!(!csv.contains(",-0"));
        let rows = read_analysis_csv(csv.as_bytes()).unwrap();
        assert!(rows.iter().all(|r| r.dividend_yield == 0.0 && r.dividend_yield.is_sign_positive()));
    }

    #[test]
    fn rejects_foreign_header() {
        let err = read_analysis_csv("date,close\n2024-01-02,1.0\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unexpected CSV header"));
    }

    #[test]
    fn writes_named_file() {
        let dir = tempdir().unwrap();
        let result = sample_result();
        let path = CsvExportAdapter.write(&result, dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "KO_stock_data_2024-01-01_2024-01-05.csv"
        );
        let rows = read_analysis_csv(fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(rows.len(), 3);
    }
}
