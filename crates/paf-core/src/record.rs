use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};

use crate::error::{FillError, Result};

/// Participant identifier (`Center_ID` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CenterId(pub i64);

impl fmt::Display for CenterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CenterId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(CenterId)
    }
}

/// Columns a participant sheet must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    CenterId,
    FirstName,
    LastName,
    ChineseName,
    Dob,
    Address,
    Language,
    Medicaid,
    Gender,
    Pcp,
    Emergency,
    MemberId,
    HealthPlan,
    HomeTel,
    Cell,
    Medicare,
}

impl Column {
    pub const ALL: [Column; 16] = [
        Column::CenterId,
        Column::FirstName,
        Column::LastName,
        Column::ChineseName,
        Column::Dob,
        Column::Address,
        Column::Language,
        Column::Medicaid,
        Column::Gender,
        Column::Pcp,
        Column::Emergency,
        Column::MemberId,
        Column::HealthPlan,
        Column::HomeTel,
        Column::Cell,
        Column::Medicare,
    ];

    /// Header text as it appears in the sheet.
    pub fn header(self) -> &'static str {
        match self {
            Column::CenterId => "Center_ID",
            Column::FirstName => "First_Name",
            Column::LastName => "Last_Name",
            Column::ChineseName => "Chinese_Name",
            Column::Dob => "DOB",
            Column::Address => "Address",
            Column::Language => "Language",
            Column::Medicaid => "Medicaid",
            Column::Gender => "Gender",
            Column::Pcp => "PCP",
            Column::Emergency => "Emergency",
            Column::MemberId => "Member_ID",
            Column::HealthPlan => "Health_Plan",
            Column::HomeTel => "Home_Tel",
            Column::Cell => "Cell",
            Column::Medicare => "Medicare",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Position of every required column in a header row.
///
/// Built once per dataset so a missing column fails the load instead of the
/// first lookup that touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [usize; 16],
}

impl ColumnMap {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let mut positions = [0usize; 16];
        for column in Column::ALL {
            let position = headers
                .iter()
                .position(|h| h.as_ref().trim() == column.header())
                .ok_or_else(|| FillError::MissingField(column.header().to_string()))?;
            positions[column.slot()] = position;
        }
        Ok(Self { positions })
    }

    pub fn position(&self, column: Column) -> usize {
        self.positions[column.slot()]
    }
}

/// A raw spreadsheet cell, as handed over by the tabular loader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    /// Display form of the cell, or `None` for missing values (empty cells,
    /// NaN, spreadsheet errors).
    ///
    /// Dates at midnight render as `YYYY-MM-DD` with no time part, so a date
    /// of birth fills `{DOB}` as `1948-03-09` rather than the
    /// `1948-03-09 00:00:00` a timestamp's string form would give. Dates
    /// with a time of day keep it as `YYYY-MM-DD HH:MM:SS`.
    pub fn render(&self) -> Option<String> {
        match self {
            CellValue::Empty | CellValue::Error(_) => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(n) => Some(n.to_string()),
            CellValue::Float(n) if n.is_nan() => None,
            CellValue::Float(n) => {
                // Integral floats (phone numbers, ids) print without ".0"
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            CellValue::DateTime(dt) => {
                if dt.time().num_seconds_from_midnight() == 0 && dt.time().nanosecond() == 0 {
                    Some(dt.format("%Y-%m-%d").to_string())
                } else {
                    Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
                }
            }
        }
    }

    /// Interpret the cell as a `Center_ID`.
    pub fn as_center_id(&self) -> Option<CenterId> {
        match self {
            CellValue::Int(n) => Some(CenterId(*n)),
            CellValue::Float(n) if n.fract() == 0.0 && n.is_finite() => Some(CenterId(*n as i64)),
            CellValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// One participant row. Every field except the key is optional: `None` means
/// the cell was empty or otherwise missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub center_id: Option<CenterId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub chinese_name: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub language: Option<String>,
    pub medicaid: Option<String>,
    pub gender: Option<String>,
    pub pcp: Option<String>,
    pub emergency: Option<String>,
    pub member_id: Option<String>,
    pub health_plan: Option<String>,
    pub home_tel: Option<String>,
    pub cell: Option<String>,
    pub medicare: Option<String>,
}

impl Record {
    /// Build a record from one data row using a validated column map.
    /// Cells past the end of a short row count as empty.
    pub fn from_row(columns: &ColumnMap, row: &[CellValue]) -> Self {
        let cell = |column: Column| row.get(columns.position(column)).unwrap_or(&CellValue::Empty);
        let text = |column: Column| cell(column).render();

        Self {
            center_id: cell(Column::CenterId).as_center_id(),
            first_name: text(Column::FirstName),
            last_name: text(Column::LastName),
            chinese_name: text(Column::ChineseName),
            dob: text(Column::Dob),
            address: text(Column::Address),
            language: text(Column::Language),
            medicaid: text(Column::Medicaid),
            gender: text(Column::Gender),
            pcp: text(Column::Pcp),
            emergency: text(Column::Emergency),
            member_id: text(Column::MemberId),
            health_plan: text(Column::HealthPlan),
            home_tel: text(Column::HomeTel),
            cell: text(Column::Cell),
            medicare: text(Column::Medicare),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn headers() -> Vec<String> {
        Column::ALL.iter().map(|c| c.header().to_string()).collect()
    }

    #[test]
    fn test_column_map_missing_column() {
        let mut headers = headers();
        headers.retain(|h| h != "Home_Tel");
        let err = ColumnMap::from_headers(&headers).unwrap_err();
        assert!(matches!(err, FillError::MissingField(ref c) if c == "Home_Tel"));
    }

    #[test]
    fn test_column_map_any_order() {
        let mut headers = headers();
        headers.reverse();
        headers.insert(0, "Notes".to_string());
        let map = ColumnMap::from_headers(&headers).unwrap();
        assert_eq!(map.position(Column::Medicare), 1);
        assert_eq!(map.position(Column::CenterId), 16);
    }

    #[test]
    fn test_render_values() {
        assert_eq!(CellValue::Empty.render(), None);
        assert_eq!(CellValue::Float(f64::NAN).render(), None);
        assert_eq!(CellValue::Float(9175139188.0).render().as_deref(), Some("9175139188"));
        assert_eq!(CellValue::Float(1.5).render().as_deref(), Some("1.5"));
        assert_eq!(CellValue::Text(String::new()).render().as_deref(), Some(""));

        let dob = NaiveDate::from_ymd_opt(1948, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(CellValue::DateTime(dob).render().as_deref(), Some("1948-03-09"));
        let visit = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap().and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(CellValue::DateTime(visit).render().as_deref(), Some("2025-01-02 09:30:00"));
    }

    #[test]
    fn test_center_id_from_cells() {
        assert_eq!(CellValue::Float(100.0).as_center_id(), Some(CenterId(100)));
        assert_eq!(CellValue::Text(" 42 ".into()).as_center_id(), Some(CenterId(42)));
        assert_eq!(CellValue::Float(1.5).as_center_id(), None);
        assert_eq!(CellValue::Empty.as_center_id(), None);
    }

    #[test]
    fn test_record_from_short_row() {
        let map = ColumnMap::from_headers(&headers()).unwrap();
        let row = vec![CellValue::Int(7), CellValue::Text("Mei".into())];
        let record = Record::from_row(&map, &row);
        assert_eq!(record.center_id, Some(CenterId(7)));
        assert_eq!(record.first_name.as_deref(), Some("Mei"));
        assert_eq!(record.medicare, None);
    }
}
