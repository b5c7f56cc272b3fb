use std::io;

/// Positioned writes into the shared output resource.
///
/// Implementations must accept concurrent calls from multiple tasks; the
/// planner guarantees callers never write overlapping ranges, so no
/// locking happens here.
pub trait RangeSink: Send + Sync {
    fn write_all_at(&self, buf: &[u8], offset: u64) -> io::Result<()>;
}

#[cfg(unix)]
impl RangeSink for std::fs::File {
    fn write_all_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        std::os::unix::fs::FileExt::write_all_at(self, buf, offset)
    }
}

#[cfg(windows)]
impl RangeSink for std::fs::File {
    fn write_all_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        use std::os::windows::fs::FileExt;

        let mut written = 0usize;
        while written < buf.len() {
            let n = self.seek_write(&buf[written..], offset + written as u64)?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole chunk",
                ));
            }
            written += n;
        }
        Ok(())
    }
}

/// Write cursor for a single chunk.
///
/// A response body usually arrives in several pieces; each piece lands at
/// `start + written`, so the pieces of one chunk stay in order while the
/// chunk itself remains independent of every other chunk's progress.
pub struct ChunkWriter<'a, S: RangeSink + ?Sized> {
    sink: &'a S,
    start: u64,
    written: u64,
}

impl<'a, S: RangeSink + ?Sized> ChunkWriter<'a, S> {
    pub fn new(sink: &'a S, start: u64) -> Self {
        Self {
            sink,
            start,
            written: 0,
        }
    }

    pub fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.sink.write_all_at(buf, self.start + self.written)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}
