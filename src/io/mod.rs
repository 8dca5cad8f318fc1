mod mmap;
mod reader;
mod writer;

pub use mmap::{MmapDays, MmapReader};
pub use reader::{BoxedSource, DayIter, GridReader, ReadSeek};
pub use writer::Writer;

use std::io::{ErrorKind, Read};

use crate::{constructs::DayGrid, Coordinates, Measurement, OneddError, HEADER_SIZE, RECORD_SIZE};

/// Absolute byte offset of the day record at 0-based `index`.
pub fn day_offset(index: usize) -> u64 {
    HEADER_SIZE as u64 + index as u64 * RECORD_SIZE as u64
}

/// Fills `buf` from `inner`, stopping early only at end of stream.
///
/// Returns the number of bytes read.
pub(crate) fn read_full<R: Read + ?Sized>(inner: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match inner.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}

/// Reads one whole record that starts at `pos`; a short read is a format error.
pub(crate) fn read_record<R: Read + ?Sized>(
    inner: &mut R,
    pos: u64,
    buf: &mut [u8],
) -> crate::Result<()> {
    let read = read_full(inner, buf)?;
    if read < buf.len() {
        return Err(OneddError::TruncatedRecord {
            pos,
            expected: buf.len(),
            actual: read,
        });
    }
    Ok(())
}

/// Flattens a sequence of days into one [`Measurement`] per cell per day.
///
/// The first error from the day sequence is yielded once and ends the stream.
pub struct Measurements<I> {
    days: I,
    coordinates: Coordinates,
    current: Option<CurrentDay>,
    failed: bool,
}

struct CurrentDay {
    date: chrono::NaiveDate,
    readings: std::vec::IntoIter<crate::Reading>,
    coordinates: Coordinates,
}

impl<I> Measurements<I>
where
    I: Iterator<Item = crate::Result<DayGrid>>,
{
    pub fn new(days: I, coordinates: Coordinates) -> Self {
        Self {
            days,
            coordinates,
            current: None,
            failed: false,
        }
    }
}

impl<I> Iterator for Measurements<I>
where
    I: Iterator<Item = crate::Result<DayGrid>>,
{
    type Item = crate::Result<Measurement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(day) = self.current.as_mut() {
                if let (Some(reading), Some(c)) = (day.readings.next(), day.coordinates.next()) {
                    return Some(Ok(Measurement::new(
                        day.date,
                        c.latitude,
                        c.longitude,
                        reading,
                    )));
                }
            }
            match self.days.next()? {
                Ok(day) => {
                    self.current = Some(CurrentDay {
                        date: day.date(),
                        readings: day.into_readings().into_iter(),
                        coordinates: self.coordinates.clone(),
                    });
                }
                Err(e) => {
                    self.failed = true;
                    self.current = None;
                    return Some(Err(e));
                }
            }
        }
    }
}
