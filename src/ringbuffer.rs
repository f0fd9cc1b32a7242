//! Output ring buffer: `windowSize + 37` bytes so a maximum-length copy
//! never wraps twice, with periodic flush to the caller's output sink.

pub struct RingBuffer {
    buf: Vec<u8>,
    mask: usize,
    /// Total bytes ever written, used to derive wrap-relative positions and
    /// back-reference distances.
    total_written: u64,
}

impl RingBuffer {
    /// `capacity` should already include the `+37` slack; it is rounded up
    /// to the next power of two so wrap arithmetic can use a mask.
    pub fn new(capacity: usize) -> Self {
        let size = capacity.next_power_of_two();
        RingBuffer {
            buf: vec![0u8; size],
            mask: size - 1,
            total_written: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    #[inline]
    fn pos(&self) -> usize {
        (self.total_written as usize) & self.mask
    }

    pub fn push_literal(&mut self, byte: u8) {
        let p = self.pos();
        self.buf[p] = byte;
        self.total_written += 1;
    }

    pub fn push_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push_literal(b);
        }
    }

    /// Copies `length` bytes from `distance` bytes back in the output
    /// stream, appending them to the ring (and thus to itself — an
    /// overlapping copy must read bytes it just wrote, which this loop does
    /// one byte at a time to get that right).
    pub fn copy_backward(&mut self, distance: usize, length: usize) {
        for _ in 0..length {
            let src = (self.total_written as usize).wrapping_sub(distance) & self.mask;
            let byte = self.buf[src];
            self.push_literal(byte);
        }
    }

    /// Returns the two most recent output bytes (0 if not yet available),
    /// used to derive the literal context.
    pub fn last_two_bytes(&self) -> (u8, u8) {
        let p1 = if self.total_written >= 1 {
            self.buf[(self.total_written as usize - 1) & self.mask]
        } else {
            0
        };
        let p2 = if self.total_written >= 2 {
            self.buf[(self.total_written as usize - 2) & self.mask]
        } else {
            0
        };
        (p1, p2)
    }

    /// Copies out the last `n` bytes written (n <= buffer length), oldest
    /// first, for flushing to an output sink.
    pub fn tail(&self, n: usize) -> Vec<u8> {
        let n = n.min(self.buf.len()).min(self.total_written as usize);
        let mut out = Vec::with_capacity(n);
        let start = (self.total_written as usize).wrapping_sub(n);
        for i in 0..n {
            out.push(self.buf[(start + i) & self.mask]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_tail_round_trip() {
        let mut rb = RingBuffer::new(64);
        rb.push_slice(b"hello world");
        assert_eq!(rb.tail(5), b"world");
    }

    #[test]
    fn copy_backward_handles_overlap() {
        let mut rb = RingBuffer::new(64);
        rb.push_slice(b"ab");
        rb.copy_backward(2, 6); // "ababab"
        assert_eq!(rb.tail(8), b"abababab");
    }

    #[test]
    fn wraps_at_capacity() {
        let mut rb = RingBuffer::new(8);
        rb.push_slice(b"0123456789ab"); // 12 bytes into an 8-byte ring
        assert_eq!(rb.tail(4), b"89ab");
    }

    #[test]
    fn last_two_bytes_before_any_write() {
        let rb = RingBuffer::new(16);
        assert_eq!(rb.last_two_bytes(), (0, 0));
    }
}
