//! Fixtures shared by the unit tests.

use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::{Header, Reading, Writer, CELLS_PER_DAY};

pub(crate) const MISSING: f64 = -99999.0;

pub(crate) fn sample_header(days: usize) -> Header {
    Header::new(1997, 1, days, MISSING)
}

/// Deterministic readings for the day at `index`; every 1000th cell is missing.
pub(crate) fn sample_day(index: usize) -> Vec<Reading> {
    (0..CELLS_PER_DAY)
        .map(|cell| {
            if cell % 1000 == 999 {
                None
            } else {
                Some((index * 10 + cell % 50) as f32 * 0.5)
            }
        })
        .collect()
}

/// Encodes a full file holding `num_days` sample days.
pub(crate) fn build_file(header: &Header, num_days: usize) -> Vec<u8> {
    let mut writer = Writer::new(Vec::new(), header).unwrap();
    for index in 0..num_days {
        writer.write_day(&sample_day(index)).unwrap();
    }
    writer.finish().unwrap();
    writer.into_inner()
}

/// In-memory stream that records every absolute position it seeks to.
pub(crate) struct SeekRecorder {
    inner: Cursor<Vec<u8>>,
    pub(crate) seeks: Vec<u64>,
}
impl SeekRecorder {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(bytes),
            seeks: Vec::new(),
        }
    }
}

impl Read for SeekRecorder {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for SeekRecorder {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let pos = self.inner.seek(pos)?;
        self.seeks.push(pos);
        Ok(pos)
    }
}
