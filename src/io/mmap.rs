use std::{fs::File, ops::Range, path::Path, sync::Arc, thread};

use memmap2::Mmap;
use tracing::debug;

use crate::{
    constructs::{resolve_scheme, DayDecoder},
    io::{day_offset, Measurements},
    parallel::{ParallelProcessor, ParallelReader},
    Coordinates, DayGrid, Header, OneddError, HEADER_SIZE, RECORD_SIZE,
};

/// Memory-mapped 1DD reader.
///
/// Day records are sliced straight out of the mapping, so access needs no
/// stream position and works through `&self`. Cloning is cheap and every clone
/// can be used from its own thread.
#[derive(Clone)]
pub struct MmapReader {
    map: Arc<Mmap>,
    /// Header
    header: Header,
    /// Fields used to decode each record
    decoder: DayDecoder,
    /// Number of days declared by the header
    len: usize,
}
#[allow(clippy::len_without_is_empty)]
impl MmapReader {
    /// Maps a file and validates its header and size.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is invalid or the file is too short to
    /// hold every day the header declares.
    pub fn new<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = File::open(path)?;
        let map = unsafe { Arc::new(Mmap::map(&file)?) };

        if map.len() < HEADER_SIZE {
            return Err(OneddError::TruncatedRecord {
                pos: 0,
                expected: HEADER_SIZE,
                actual: map.len(),
            });
        }
        let header = Header::from_block(&map[..HEADER_SIZE])?;
        let decoder = DayDecoder::from_header(&header)?;
        let len = header.days()?;

        let data_size = map.len() - HEADER_SIZE;
        let complete = data_size / RECORD_SIZE;
        if complete < len {
            return Err(OneddError::TruncatedRecord {
                pos: day_offset(complete),
                expected: RECORD_SIZE,
                actual: data_size % RECORD_SIZE,
            });
        }
        debug!(days = len, bytes = map.len(), "mapped 1DD file");

        Ok(Self {
            map,
            header,
            decoder,
            len,
        })
    }

    /// Number of days in the file.
    pub fn day_count(&self) -> usize {
        self.len
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Raw bytes of the day record at `index`.
    pub fn record(&self, index: usize) -> crate::Result<&[u8]> {
        if index >= self.len {
            return Err(OneddError::InvalidIndex {
                idx: index,
                max: self.len,
            });
        }
        let start = HEADER_SIZE + index * RECORD_SIZE;
        Ok(&self.map[start..start + RECORD_SIZE])
    }

    pub fn get(&self, index: usize) -> crate::Result<DayGrid> {
        let bytes = self.record(index)?;
        let date = self.decoder.date(index)?;
        Ok(self.decoder.decode(date, bytes))
    }

    pub fn days(&self) -> MmapDays<'_> {
        self.days_in(0..self.len)
    }

    fn days_in(&self, range: Range<usize>) -> MmapDays<'_> {
        MmapDays {
            reader: self,
            range,
        }
    }

    pub fn coordinates(&self) -> crate::Result<Coordinates> {
        resolve_scheme(&self.header).map(Coordinates::new)
    }

    pub fn measurements(&self) -> crate::Result<Measurements<MmapDays<'_>>> {
        let coordinates = self.coordinates()?;
        Ok(Measurements::new(self.days(), coordinates))
    }
}

/// Iterator over a range of days of an [`MmapReader`].
pub struct MmapDays<'a> {
    reader: &'a MmapReader,
    range: Range<usize>,
}

impl Iterator for MmapDays<'_> {
    type Item = crate::Result<DayGrid>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|index| self.reader.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for MmapDays<'_> {}

/// Number of days a worker decodes between `on_batch_complete` calls.
pub const BATCH_SIZE: usize = 8;

impl ParallelReader for MmapReader {
    fn process_parallel<P: ParallelProcessor + 'static>(
        &self,
        processor: P,
        num_threads: usize,
    ) -> crate::Result<()> {
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads.min(num_cpus::get())
        };
        let num_threads = num_threads.min(self.len).max(1);
        let days_per_thread = self.len / num_threads;
        let remainder = self.len % num_threads; // for last thread
        debug!(days = self.len, threads = num_threads, "processing days in parallel");

        let mut handles = Vec::with_capacity(num_threads);
        for i in 0..num_threads {
            let start = i * days_per_thread;
            let end = if i == num_threads - 1 {
                start + days_per_thread + remainder
            } else {
                start + days_per_thread
            };
            let thread_reader = self.clone();
            let mut thread_processor = processor.clone();
            thread_processor.set_tid(i);
            let thread_handle = thread::spawn(move || -> crate::Result<()> {
                let mut batch_start = start;
                while batch_start < end {
                    let batch_end = (batch_start + BATCH_SIZE).min(end);
                    for day in thread_reader.days_in(batch_start..batch_end) {
                        thread_processor.process_day(day?)?;
                    }
                    thread_processor.on_batch_complete()?;
                    batch_start = batch_end;
                }
                Ok(())
            });
            handles.push(thread_handle);
        }

        for handle in handles {
            handle
                .join()
                .map_err(|_| OneddError::Process("worker thread panicked".into()))??;
        }

        Ok(())
    }
}
