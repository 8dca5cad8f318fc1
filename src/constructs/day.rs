use chrono::{Datelike, NaiveDate};

use crate::{Coordinates, Header, OneddError};

/// Number of latitude rows in a day record (one per degree, north to south).
pub const NUM_ROWS: usize = 180;
/// Number of longitude columns in a day record (one per degree, eastwards).
pub const NUM_COLS: usize = 360;
/// Number of cells in a day record.
pub const CELLS_PER_DAY: usize = NUM_ROWS * NUM_COLS;
/// Size of one encoded value (big-endian IEEE-754 f32).
pub const VALUE_SIZE: usize = 4;
/// Size of one day record in bytes.
pub const RECORD_SIZE: usize = CELLS_PER_DAY * VALUE_SIZE;

/// One cell of a day: `Some(mm/day)` or `None` where the file holds the
/// missing-value sentinel.
pub type Reading = Option<f32>;

/// Decodes one raw day record, replacing the sentinel with `None`.
///
/// The comparison against the sentinel is exact; no tolerance is applied.
/// A trailing partial value is ignored.
pub fn decode_record(bytes: &[u8], missing_value: f64) -> Vec<Reading> {
    let whole = bytes.len() - bytes.len() % VALUE_SIZE;
    let values: &[[u8; VALUE_SIZE]] = bytemuck::cast_slice(&bytes[..whole]);
    values
        .iter()
        .map(|raw| {
            let value = f32::from_be_bytes(*raw);
            if f64::from(value) == missing_value {
                None
            } else {
                Some(value)
            }
        })
        .collect()
}

/// Header fields needed to turn a record into a [`DayGrid`], parsed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DayDecoder {
    year: i32,
    month: u32,
    missing_value: f64,
}
impl DayDecoder {
    pub(crate) fn from_header(header: &Header) -> crate::Result<Self> {
        Ok(Self {
            year: header.year()?,
            month: header.month()?,
            missing_value: header.missing_value()?,
        })
    }

    /// Calendar date of the day at 0-based `index`.
    pub(crate) fn date(&self, index: usize) -> crate::Result<NaiveDate> {
        let day = u32::try_from(index + 1).unwrap_or(u32::MAX);
        NaiveDate::from_ymd_opt(self.year, self.month, day).ok_or(OneddError::InvalidDate {
            year: self.year,
            month: self.month,
            day,
        })
    }

    pub(crate) fn decode(&self, date: NaiveDate, bytes: &[u8]) -> DayGrid {
        DayGrid::new(date, decode_record(bytes, self.missing_value))
    }
}

/// One day of decoded precipitation readings in scan order.
///
/// # Examples
///
/// ```rust
/// use onedd::{DayGrid, CELLS_PER_DAY};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(1997, 1, 1).unwrap();
/// let mut readings = vec![Some(0.0); CELLS_PER_DAY];
/// readings[16] = None;
///
/// let day = DayGrid::new(date, readings);
/// assert_eq!(day.day(), 1);
/// assert_eq!(day.missing_count(), 1);
/// assert_eq!(day.reading(0, 16), Some(None));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayGrid {
    date: NaiveDate,
    readings: Vec<Reading>,
}
impl DayGrid {
    pub fn new(date: NaiveDate, readings: Vec<Reading>) -> Self {
        Self { date, readings }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 1-based day of month.
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn into_readings(self) -> Vec<Reading> {
        self.readings
    }

    /// Reading at `row` (from the north) and `col` (from 0E), or `None` if the
    /// position is outside the grid.
    pub fn reading(&self, row: usize, col: usize) -> Option<Reading> {
        if row >= NUM_ROWS || col >= NUM_COLS {
            return None;
        }
        self.readings.get(row * NUM_COLS + col).copied()
    }

    pub fn missing_count(&self) -> usize {
        self.readings.iter().filter(|r| r.is_none()).count()
    }

    /// Pairs each reading with the coordinate at the same scan position.
    pub fn measurements(&self, coordinates: Coordinates) -> impl Iterator<Item = Measurement> + '_ {
        let date = self.date;
        coordinates
            .zip(self.readings.iter())
            .map(move |(c, r)| Measurement::new(date, c.latitude, c.longitude, *r))
    }
}

/// A single reading with its date and location.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub precipitation: Reading,
}
impl Measurement {
    pub fn new(date: NaiveDate, latitude: f64, longitude: f64, precipitation: Reading) -> Self {
        Self {
            date,
            latitude,
            longitude,
            precipitation,
        }
    }
}
