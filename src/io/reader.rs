//! Seekable-stream reader for 1DD files.
//!
//! This module provides random access to day records and sequential iteration
//! over all days of a file, on top of any `Read + Seek` stream.

use std::{
    cell::OnceCell,
    fs::File,
    io::{BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use tracing::{debug, trace};

use crate::{
    constructs::{resolve_scheme, DayDecoder},
    io::{day_offset, read_record, Measurements},
    Coordinates, DayGrid, Header, OneddError, HEADER_SIZE, RECORD_SIZE,
};

/// A stream that can be both read and repositioned.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

pub type BoxedSource = Box<dyn ReadSeek + Send>;

/// Reader for 1DD files over a seekable stream.
///
/// The header is read and validated once on [`open`](GridReader::open). Every
/// access to a day record is a seek followed by a read of exactly one record,
/// performed under `&mut self`; an in-flight [`DayIter`] holds the reader
/// mutably, so random access and iteration can never interleave on the shared
/// stream position.
///
/// # Examples
///
/// ```rust
/// use onedd::{GridReader, Header, Writer, CELLS_PER_DAY};
/// use std::io::Cursor;
///
/// # fn main() -> onedd::Result<()> {
/// let header = Header::new(1997, 1, 2, -99999.0);
/// let mut writer = Writer::new(Vec::new(), &header)?;
/// writer.write_day(&vec![Some(1.0); CELLS_PER_DAY])?;
/// writer.write_day(&vec![None; CELLS_PER_DAY])?;
/// writer.finish()?;
///
/// let mut reader = GridReader::open(Cursor::new(writer.into_inner()))?;
/// assert_eq!(reader.day_count()?, 2);
///
/// let day = reader.get(1)?;
/// assert_eq!(day.date().to_string(), "1997-01-02");
/// assert_eq!(day.missing_count(), CELLS_PER_DAY);
///
/// for day in reader.iter()? {
///     let day = day?;
///     println!("{}: {} missing", day.date(), day.missing_count());
/// }
/// # Ok(())
/// # }
/// ```
pub struct GridReader<S: Read + Seek> {
    /// Underlying stream, `None` once closed
    inner: Option<S>,

    /// Header parsed on open
    header: Header,

    /// Day count, derived from the header on first use
    days: OnceCell<usize>,
}
impl<S: Read + Seek> GridReader<S> {
    /// Opens a reader, parsing and validating the header block.
    ///
    /// # Errors
    ///
    /// Returns an error if the header block cannot be read, contains no
    /// `key=value` pairs, or lacks `year`, `month` or `days`.
    pub fn open(mut inner: S) -> crate::Result<Self> {
        let header = Header::parse(&mut inner)?;
        Ok(Self {
            inner: Some(inner),
            header,
            days: OnceCell::new(),
        })
    }

    pub fn header(&self) -> crate::Result<&Header> {
        self.ensure_open()?;
        Ok(&self.header)
    }

    /// Number of day records declared by the header.
    pub fn day_count(&self) -> crate::Result<usize> {
        self.ensure_open()?;
        if let Some(days) = self.days.get() {
            return Ok(*days);
        }
        let days = self.header.days()?;
        Ok(*self.days.get_or_init(|| days))
    }

    /// Decodes the day at 0-based `index`.
    ///
    /// The index and the resulting calendar date are checked before the stream
    /// is touched.
    ///
    /// # Errors
    ///
    /// - [`OneddError::InvalidIndex`] if `index >= day_count()`
    /// - [`OneddError::InvalidDate`] if the header month has no such day
    /// - [`OneddError::TruncatedRecord`] if the stream ends inside the record
    pub fn get(&mut self, index: usize) -> crate::Result<DayGrid> {
        let max = self.day_count()?;
        if index >= max {
            return Err(OneddError::InvalidIndex { idx: index, max });
        }
        let decoder = DayDecoder::from_header(&self.header)?;
        let date = decoder.date(index)?;

        let mut buffer = vec![0u8; RECORD_SIZE];
        self.read_at(day_offset(index), &mut buffer)?;
        trace!(index, "decoded day record");
        Ok(decoder.decode(date, &buffer))
    }

    /// Iterates over every day in file order.
    ///
    /// The stream is repositioned to the first record on every call, so a new
    /// iteration always starts from day 0 regardless of earlier access.
    pub fn iter(&mut self) -> crate::Result<DayIter<'_, S>> {
        let count = self.day_count()?;
        let decoder = DayDecoder::from_header(&self.header)?;
        let inner = self.inner.as_mut().ok_or(OneddError::Closed)?;
        inner.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        debug!(days = count, "starting day iteration");
        Ok(DayIter {
            inner,
            decoder,
            index: 0,
            count,
            buffer: vec![0u8; RECORD_SIZE],
            failed: false,
        })
    }

    /// Cell centers in scan order, after checking the header's declared order.
    pub fn coordinates(&self) -> crate::Result<Coordinates> {
        self.ensure_open()?;
        resolve_scheme(&self.header).map(Coordinates::new)
    }

    /// Every reading of every day, paired with its date and location.
    pub fn measurements(&mut self) -> crate::Result<Measurements<DayIter<'_, S>>> {
        let coordinates = self.coordinates()?;
        let days = self.iter()?;
        Ok(Measurements::new(days, coordinates))
    }

    /// Releases the underlying stream. Every later call fails with
    /// [`OneddError::Closed`].
    pub fn close(&mut self) -> crate::Result<()> {
        match self.inner.take() {
            Some(_) => {
                debug!("closed 1DD reader");
                Ok(())
            }
            None => Err(OneddError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    pub fn get_ref(&self) -> crate::Result<&S> {
        self.inner.as_ref().ok_or(OneddError::Closed)
    }

    pub fn into_inner(self) -> crate::Result<S> {
        self.inner.ok_or(OneddError::Closed)
    }

    fn ensure_open(&self) -> crate::Result<()> {
        if self.inner.is_none() {
            return Err(OneddError::Closed);
        }
        Ok(())
    }

    /// Positioned read: seek and read one record as a single step.
    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> crate::Result<()> {
        let inner = self.inner.as_mut().ok_or(OneddError::Closed)?;
        inner.seek(SeekFrom::Start(pos))?;
        read_record(inner, pos, buf)
    }
}

impl GridReader<BoxedSource> {
    /// Opens a file by path.
    ///
    /// With the `niffler` feature, compressed files (gzip, bzip2, zstd, ...) are
    /// detected and decompressed into memory so the data stays seekable.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        #[cfg(feature = "niffler")]
        {
            let rdr = File::open(path).map(BufReader::new)?;
            match niffler::send::get_reader(Box::new(rdr)) {
                Ok((_, niffler::send::compression::Format::No)) => {}
                Ok((mut decoded, format)) => {
                    debug!(?format, path = %path.display(), "decompressing 1DD file into memory");
                    let mut bytes = Vec::new();
                    decoded.read_to_end(&mut bytes)?;
                    return Self::open(Box::new(Cursor::new(bytes)));
                }
                // Too short to sniff; the header read reports the truncation.
                Err(niffler::Error::FileTooShort) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let rdr = File::open(path).map(BufReader::new)?;
        Self::open(Box::new(rdr))
    }

    /// Reads standard input into memory and opens it.
    pub fn from_stdin() -> crate::Result<Self> {
        let mut bytes = Vec::new();
        std::io::stdin().lock().read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Opens an in-memory file, decompressing it first if needed.
    pub fn from_bytes(bytes: Vec<u8>) -> crate::Result<Self> {
        #[cfg(feature = "niffler")]
        let bytes = decompress(bytes)?;
        Self::open(Box::new(Cursor::new(bytes)))
    }

    /// Opens `path` if given, standard input otherwise.
    pub fn from_optional_path<P: AsRef<Path>>(path: Option<P>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::from_stdin(),
        }
    }
}

/// Decompresses `bytes` if they start with a known compression signature.
#[cfg(feature = "niffler")]
fn decompress(bytes: Vec<u8>) -> crate::Result<Vec<u8>> {
    match niffler::send::get_reader(Box::new(bytes.as_slice())) {
        Ok((_, niffler::send::compression::Format::No)) | Err(niffler::Error::FileTooShort) => {}
        Ok((mut decoded, format)) => {
            debug!(?format, "decompressing 1DD input into memory");
            let mut out = Vec::new();
            decoded.read_to_end(&mut out)?;
            return Ok(out);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(bytes)
}

/// Forward iterator over the days of a [`GridReader`].
///
/// Records are read back to back without re-seeking. The first error ends the
/// iteration. Dropping the iterator early leaves the reader usable.
pub struct DayIter<'a, S: Read + Seek> {
    inner: &'a mut S,
    decoder: DayDecoder,
    index: usize,
    count: usize,
    buffer: Vec<u8>,
    failed: bool,
}

impl<S: Read + Seek> Iterator for DayIter<'_, S> {
    type Item = crate::Result<DayGrid>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.count {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let date = match self.decoder.date(index) {
            Ok(date) => date,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        if let Err(e) = read_record(&mut *self.inner, day_offset(index), &mut self.buffer) {
            self.failed = true;
            return Some(Err(e));
        }
        trace!(index, "decoded day record");
        Some(Ok(self.decoder.decode(date, &self.buffer)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.count - self.index;
        (0, Some(remaining))
    }
}
