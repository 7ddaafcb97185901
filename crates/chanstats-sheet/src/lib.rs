use std::path::PathBuf;

use calamine::{Data, Reader as _, Xlsx, open_workbook};
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Column headers, in sheet order. "Ejecucion" records the wall-clock time
/// each row was produced.
pub const COLUMNS: [&str; 8] = [
    "Date",
    "Rank",
    "Minutes Streamed",
    "Average Viewers",
    "Peak Viewers",
    "Followers",
    "Total Followers",
    "Ejecucion",
];

const SHEET_NAME: &str = "Sheet1";
const WIDTH_MARGIN: f64 = 2.0;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read back the existing workbook")]
    Read(#[from] calamine::XlsxError),
    #[error("failed to write the workbook")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

/// One row of extracted statistics for a single calendar date. Statistics
/// missing from the API response stay `None` and land in the sheet as blank
/// cells.
#[derive(Debug, Clone)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub rank: Option<i64>,
    pub minutes_streamed: Option<i64>,
    pub average_viewers: Option<i64>,
    pub peak_viewers: Option<i64>,
    pub followers: Option<i64>,
    pub total_followers: Option<i64>,
    pub executed_at: NaiveTime,
}
impl DailyRecord {
    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.date.to_string()),
            Cell::from_stat(self.rank),
            Cell::from_stat(self.minutes_streamed),
            Cell::from_stat(self.average_viewers),
            Cell::from_stat(self.peak_viewers),
            Cell::from_stat(self.followers),
            Cell::from_stat(self.total_followers),
            Cell::Text(self.executed_at.format("%H:%M:%S").to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Empty,
}
impl Cell {
    fn from_stat(value: Option<i64>) -> Self {
        value.map_or(Self::Empty, Self::Int)
    }

    /// Stringified length used for column sizing. Blanks have none.
    fn display_len(&self) -> Option<usize> {
        match self {
            Self::Text(text) => Some(text.chars().count()),
            Self::Int(n) => Some(n.to_string().len()),
            Self::Float(n) => Some(n.to_string().len()),
            Self::Empty => None,
        }
    }
}
impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            Data::String(text) => Self::Text(text.clone()),
            Data::Int(n) => Self::Int(*n),
            Data::Float(n) => Self::Float(*n),
            other => Self::Text(other.to_string()),
        }
    }
}

pub struct SheetWriter {
    path: PathBuf,
}
impl SheetWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Appends the records to the workbook, creating it with a header row if
    /// it does not exist yet. Existing rows keep their place ahead of the new
    /// ones, and every column is resized to fit its longest value.
    pub fn append(&self, records: &[DailyRecord]) -> Result<(), SheetError> {
        let mut rows = self.existing_rows()?;
        if rows.is_empty() {
            rows.push(
                COLUMNS
                    .iter()
                    .map(|name| Cell::Text((*name).to_string()))
                    .collect(),
            );
        }
        rows.extend(records.iter().map(DailyRecord::cells));

        self.write_rows(&rows)
    }

    // The xlsx writer cannot edit a file in place, so appending means loading
    // whatever is already there and rewriting the whole sheet.
    fn existing_rows(&self) -> Result<Vec<Vec<Cell>>, SheetError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = workbook.worksheet_range(SHEET_NAME)?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect())
    }

    fn write_rows(&self, rows: &[Vec<Cell>]) -> Result<(), SheetError> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => {
                        sheet.write_string(row_idx as u32, col_idx as u16, text)?;
                    }
                    Cell::Int(n) => {
                        sheet.write_number(row_idx as u32, col_idx as u16, *n as f64)?;
                    }
                    Cell::Float(n) => {
                        sheet.write_number(row_idx as u32, col_idx as u16, *n)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        for (col_idx, width) in column_widths(rows).iter().enumerate() {
            sheet.set_column_width(col_idx as u16, *width)?;
        }

        workbook.save(&self.path)?;

        Ok(())
    }
}

/// Display width of each column: the longest stringified cell plus a small
/// margin. Blank cells don't count.
fn column_widths(rows: &[Vec<Cell>]) -> Vec<f64> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);

    (0..columns)
        .map(|col| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(col).and_then(Cell::display_len))
                .max()
                .unwrap_or(0);

            longest as f64 + WIDTH_MARGIN
        })
        .collect()
}
