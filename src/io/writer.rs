//! Writer for 1DD files.
//!
//! Mostly useful for producing test fixtures and subsets of existing archives:
//! the header block is written on construction, then one record per day.

use std::{fs::File, io::BufWriter, io::Write, path::Path};

use tracing::trace;

use crate::{DayGrid, Header, OneddError, Reading, CELLS_PER_DAY, RECORD_SIZE, VALUE_SIZE};

/// Writer for 1DD files.
///
/// Readings of `None` are written back as the header's missing-value sentinel.
///
/// # Examples
///
/// ```rust
/// use onedd::{Header, Writer, CELLS_PER_DAY, HEADER_SIZE, RECORD_SIZE};
///
/// # fn main() -> onedd::Result<()> {
/// let header = Header::new(1997, 1, 1, -99999.0);
/// let mut writer = Writer::new(Vec::new(), &header)?;
/// writer.write_day(&vec![Some(0.25); CELLS_PER_DAY])?;
/// writer.finish()?;
///
/// assert_eq!(writer.days_written(), 1);
/// assert_eq!(writer.into_inner().len(), HEADER_SIZE + RECORD_SIZE);
/// # Ok(())
/// # }
/// ```
pub struct Writer<W: Write> {
    /// Inner writer providing the data sink
    inner: W,

    /// Buffer holding one encoded record
    buffer: Vec<u8>,

    /// Sentinel written for missing readings
    missing_value: f32,

    /// Number of days written so far
    days_written: usize,
}

impl<W: Write> Writer<W> {
    /// Creates a writer and writes the header block immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the header has no usable `missing_value`, does not
    /// fit in the header block, or cannot be written.
    pub fn new(mut inner: W, header: &Header) -> crate::Result<Self> {
        let missing_value = header.missing_value()? as f32;
        let block = header.to_block()?;
        inner.write_all(&block)?;

        Ok(Self {
            inner,
            buffer: vec![0u8; RECORD_SIZE],
            missing_value,
            days_written: 0,
        })
    }

    pub fn days_written(&self) -> usize {
        self.days_written
    }

    /// Encodes and writes one day of readings in scan order.
    pub fn write_day(&mut self, readings: &[Reading]) -> crate::Result<()> {
        if readings.len() != CELLS_PER_DAY {
            return Err(OneddError::InvalidDayLength(readings.len()));
        }
        let values: &mut [[u8; VALUE_SIZE]] = bytemuck::cast_slice_mut(&mut self.buffer);
        for (raw, reading) in values.iter_mut().zip(readings) {
            *raw = reading.unwrap_or(self.missing_value).to_be_bytes();
        }
        self.inner.write_all(&self.buffer)?;
        self.days_written += 1;
        trace!(day = self.days_written, "wrote day record");
        Ok(())
    }

    pub fn write_grid(&mut self, day: &DayGrid) -> crate::Result<()> {
        self.write_day(day.readings())
    }

    pub fn write_iter<'a, I>(&mut self, days: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = &'a DayGrid>,
    {
        for day in days {
            self.write_grid(day)?;
        }
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn finish(&mut self) -> crate::Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl Writer<BufWriter<File>> {
    /// Creates a buffered writer to a new file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P, header: &Header) -> crate::Result<Self> {
        let file = File::create(path).map(BufWriter::new)?;
        Self::new(file, header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{sample_day, sample_header},
        GridReader, HEADER_SIZE,
    };
    use chrono::NaiveDate;
    use std::io::Cursor;

    #[test]
    fn test_layout() {
        let header = sample_header(2);
        let mut writer = Writer::new(Vec::new(), &header).unwrap();
        let mut first = vec![Some(1.0); CELLS_PER_DAY];
        first[16] = None;
        writer.write_day(&first).unwrap();
        writer.write_day(&vec![Some(-2.0); CELLS_PER_DAY]).unwrap();
        writer.finish().unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes.len(), HEADER_SIZE + 2 * RECORD_SIZE);
        assert_eq!(&bytes[..HEADER_SIZE], &header.to_block().unwrap()[..]);
        assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 4], &[0x3f, 0x80, 0x00, 0x00]);
        let sentinel = HEADER_SIZE + 16 * VALUE_SIZE;
        assert_eq!(
            &bytes[sentinel..sentinel + 4],
            &(-99999.0f32).to_be_bytes()
        );
        let second = HEADER_SIZE + RECORD_SIZE;
        assert_eq!(&bytes[second..second + 4], &[0xc0, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_invalid_day_length() {
        let mut writer = Writer::new(Vec::new(), &sample_header(1)).unwrap();
        let result = writer.write_day(&[Some(1.0); 10]);
        assert!(matches!(result, Err(OneddError::InvalidDayLength(10))));
        assert_eq!(writer.days_written(), 0);
        assert_eq!(writer.into_inner().len(), HEADER_SIZE);
    }

    #[test]
    fn test_header_without_missing_value() {
        let header = Header::from_fields(vec![
            ("year".into(), "1997".into()),
            ("month".into(), "01".into()),
            ("days".into(), "1-31".into()),
        ])
        .unwrap();
        assert!(matches!(
            Writer::new(Vec::new(), &header),
            Err(OneddError::MissingField(_))
        ));
    }

    #[test]
    fn test_rewrite_grids() {
        let date = NaiveDate::from_ymd_opt(1997, 1, 1).unwrap();
        let days = vec![
            DayGrid::new(date, sample_day(0)),
            DayGrid::new(date.succ_opt().unwrap(), sample_day(1)),
        ];
        let mut writer = Writer::new(Vec::new(), &sample_header(2)).unwrap();
        writer.write_iter(&days).unwrap();
        writer.finish().unwrap();

        let mut reader = GridReader::open(Cursor::new(writer.into_inner())).unwrap();
        let read: Vec<_> = reader.iter().unwrap().map(|d| d.unwrap()).collect();
        assert_eq!(read, days);
    }
}
