/// One contiguous byte range of the remote file. Offsets are absolute and
/// inclusive, matching the `Range: bytes=start-end` wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// Lazy sequence of ranges covering `[0, total_length)` in ascending order.
///
/// The plan is pure state over two integers, so it can be cloned and
/// re-iterated freely; nothing is consumed from the outside world.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    total_length: u64,
    chunk_size: u64,
    next_start: u64,
    next_index: usize,
}

/// Partitions `total_length` bytes into ranges of at most `chunk_size`
/// bytes. The final range is truncated to the remaining bytes.
///
/// `chunk_size` must be non-zero; callers validate it before planning.
pub fn plan_chunks(total_length: u64, chunk_size: u64) -> ChunkPlan {
    debug_assert!(chunk_size > 0, "chunk_size must be non-zero");
    ChunkPlan {
        total_length,
        chunk_size,
        next_start: 0,
        next_index: 0,
    }
}

impl ChunkPlan {
    pub fn chunk_count(&self) -> usize {
        self.total_length.div_ceil(self.chunk_size) as usize
    }
}

impl Iterator for ChunkPlan {
    type Item = ChunkRange;

    fn next(&mut self) -> Option<ChunkRange> {
        if self.next_start >= self.total_length {
            return None;
        }
        let start = self.next_start;
        let end = (start + self.chunk_size - 1).min(self.total_length - 1);
        let range = ChunkRange {
            index: self.next_index,
            start,
            end,
        };
        self.next_start = end + 1;
        self.next_index += 1;
        Some(range)
    }
}
