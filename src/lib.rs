//! # onedd - Decoder for GPCP One-Degree Daily Precipitation Files
//!
//! `onedd` reads the binary archives of the GPCP One-Degree Daily (1DD)
//! precipitation data set: one file per month, holding a global 1°×1° grid of
//! daily precipitation estimates for every day of that month.
//!
//! ## Format Specification
//!
//! A 1DD file consists of a 1440-byte text header followed by one 259200-byte
//! record per day:
//!
//! ### Header (1440 bytes)
//! - ASCII `key=value` fields, padded with spaces; there is no pair delimiter
//!   and values may contain spaces
//! - Required: `year`, `month`, `days` (a `start-end` range such as `1-31`)
//! - `missing_value`: sentinel marking cells without an observation
//! - `1st_box_center`, `2nd_box_center`, `last_box_center`: declared scan order
//!
//! ### Day record (259200 bytes)
//! - 180 × 360 big-endian IEEE-754 `f32` values
//! - Row-major: row 0 is 89.5N and rows step south; column 0 is 0.5E and
//!   columns step east
//! - Day `d` (0-based) starts at byte `1440 + d * 259200`
//!
//! ## Basic Usage
//!
//! ```rust
//! use onedd::{GridReader, Header, Writer, CELLS_PER_DAY};
//! use std::io::Cursor;
//!
//! # fn main() -> onedd::Result<()> {
//! // Encode a two-day file in memory
//! let header = Header::new(1997, 1, 2, -99999.0);
//! let mut writer = Writer::new(Vec::new(), &header)?;
//! let mut readings = vec![Some(2.5); CELLS_PER_DAY];
//! readings[0] = None;
//! writer.write_day(&readings)?;
//! writer.write_day(&readings)?;
//! writer.finish()?;
//!
//! // Read it back
//! let mut reader = GridReader::open(Cursor::new(writer.into_inner()))?;
//! assert_eq!(reader.day_count()?, 2);
//!
//! let day = reader.get(1)?;
//! assert_eq!(day.day(), 2);
//! assert_eq!(day.readings()[0], None);
//! assert_eq!(day.readings()[1], Some(2.5));
//!
//! // Flatten to (date, latitude, longitude, precipitation)
//! let first = reader.measurements()?.next().unwrap()?;
//! assert_eq!((first.latitude, first.longitude), (89.5, 0.5));
//! assert_eq!(first.precipitation, None);
//! # Ok(())
//! # }
//! ```
//!
//! ### File I/O with Compression
//!
//! ```rust,no_run
//! use onedd::GridReader;
//!
//! # fn main() -> onedd::Result<()> {
//! // Read from file (automatically decompresses)
//! let mut reader = GridReader::from_path("gpcp_1dd_v1.2_p1d.199701.gz")?;
//! for measurement in reader.measurements()? {
//!     let m = measurement?;
//!     if let Some(mm) = m.precipitation {
//!         println!("{}\t{}\t{}\t{}", m.date, m.latitude, m.longitude, mm);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Memory-Mapped Reading with Parallel Processing
//!
//! ```rust,no_run
//! use onedd::{DayGrid, MmapReader, ParallelProcessor, ParallelReader};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone, Default)]
//! struct MissingCounter {
//!     local_count: usize,
//!     global_count: Arc<Mutex<usize>>,
//! }
//!
//! impl ParallelProcessor for MissingCounter {
//!     fn process_day(&mut self, day: DayGrid) -> onedd::Result<()> {
//!         self.local_count += day.missing_count();
//!         Ok(())
//!     }
//!
//!     fn on_batch_complete(&mut self) -> onedd::Result<()> {
//!         let mut guard = self.global_count.lock().unwrap();
//!         *guard += self.local_count;
//!         self.local_count = 0;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> onedd::Result<()> {
//! let reader = MmapReader::new("gpcp_1dd_v1.2_p1d.199701")?;
//! reader.process_parallel(MissingCounter::default(), 0)?; // 0 = use all available cores
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! A [`GridReader`] shares one stream position between random access and
//! iteration and is meant for a single caller. Use one reader per thread, or an
//! [`MmapReader`], which needs no stream position and can be cloned freely.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, OneddError>`; [`OneddError::kind`] sorts
//! errors into format, range, closed-reader and I/O failures:
//!
//! ```rust
//! use onedd::{ErrorKind, GridReader, OneddError};
//! use std::io::Cursor;
//!
//! # fn main() {
//! // Not a 1DD file: the header has no key=value fields
//! let cursor = Cursor::new(vec![0u8; 1440]);
//!
//! match GridReader::open(cursor) {
//!     Err(e) => assert_eq!(e.kind(), ErrorKind::Format),
//!     Ok(_) => unreachable!(),
//! }
//! # }
//! ```

mod constructs;
mod error;
mod io;
mod parallel;

#[cfg(test)]
mod testing;

pub use constructs::{
    decode_record, parse_fields, read_header_fields, resolve_scheme, Coordinate, CoordinateScheme,
    Coordinates, DayGrid, Header, Measurement, NorthWestScan, Reading, CELLS_PER_DAY,
    FIRST_BOX_CENTER, HEADER_SIZE, LAST_BOX_CENTER, NUM_COLS, NUM_ROWS, RECORD_SIZE,
    SECOND_BOX_CENTER, VALUE_SIZE,
};
pub use error::{ErrorKind, IntoOneddError, OneddError, Result};
pub use io::{
    day_offset, BoxedSource, DayIter, GridReader, Measurements, MmapDays, MmapReader, ReadSeek,
    Writer,
};
pub use parallel::{ParallelProcessor, ParallelReader};
