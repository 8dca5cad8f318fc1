use crate::{DayGrid, Result};

/// Trait for types that can process days in parallel.
///
/// This is implemented by the **processor** not by the **reader**.
/// For the **reader**, see the [`ParallelReader`] trait.
///
/// Each worker thread gets its own clone of the processor; shared results are
/// typically gathered behind an `Arc<Mutex<_>>` in `on_batch_complete`.
pub trait ParallelProcessor: Send + Clone {
    /// Process a single day
    fn process_day(&mut self, day: DayGrid) -> Result<()>;

    /// Called when a thread finishes processing its batch
    /// Default implementation does nothing
    fn on_batch_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Set the thread ID for this processor
    ///
    /// The reader calls this once on each worker's clone before it starts.
    fn set_tid(&mut self, _tid: usize) {
        // Default implementation does nothing
    }

    /// Get the thread ID for this processor
    fn get_tid(&self) -> Option<usize> {
        None
    }
}

/// Trait for 1DD readers that can process days in parallel
///
/// This is implemented by the **reader** not by the **processor**.
/// For the **processor**, see the [`ParallelProcessor`] trait.
pub trait ParallelReader {
    /// Splits the days across `num_threads` workers (`0` uses every core)
    /// and feeds each decoded day to a clone of `processor`.
    fn process_parallel<P: ParallelProcessor + 'static>(
        &self,
        processor: P,
        num_threads: usize,
    ) -> Result<()>;
}
