//! Auto-growing binary buffer writer.

/// A binary buffer writer that grows automatically as needed.
///
/// The buffer is preallocated and written through a cursor; `flush()` copies
/// out everything written since the previous flush, so one writer can be
/// reused across many encode calls without reallocating.
///
/// # Example
///
/// ```
/// use tether_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u32(0x02030405);
/// let data = writer.flush();
/// assert_eq!(data, [0x01, 0x02, 0x03, 0x04, 0x05]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub bytes: Vec<u8>,
    /// Position where the last flush happened.
    pub x0: usize,
    /// Current cursor position.
    pub x: usize,
    /// Allocation size when the buffer needs to grow.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with the default allocation size (16KB).
    pub fn new() -> Self {
        Self::with_alloc_size(16 * 1024)
    }

    /// Creates a new writer with a custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            bytes: vec![0u8; alloc_size],
            x0: 0,
            x: 0,
            alloc_size,
        }
    }

    /// Ensures at least `capacity` bytes are writable at the cursor.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.bytes.len() - self.x;
        if remaining < capacity {
            let pending = self.x - self.x0;
            let required = pending + capacity;
            let new_size = if required <= self.alloc_size {
                self.alloc_size
            } else {
                required * 2
            };
            self.grow(new_size);
        }
    }

    fn grow(&mut self, new_size: usize) {
        let x0 = self.x0;
        let x = self.x;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..x - x0].copy_from_slice(&self.bytes[x0..x]);
        self.bytes = new_buf;
        self.x = x - x0;
        self.x0 = 0;
    }

    /// Starts a fresh region at the cursor, discarding any unflushed bytes.
    pub fn reset(&mut self) {
        self.x0 = self.x;
    }

    /// Returns the bytes written since the last flush and advances the flush
    /// position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.bytes[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.bytes[self.x] = val;
        self.x += 1;
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.ensure_capacity(4);
        self.bytes[self.x..self.x + 4].copy_from_slice(&val.to_be_bytes());
        self.x += 4;
    }

    /// Writes a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.ensure_capacity(8);
        self.bytes[self.x..self.x + 8].copy_from_slice(&val.to_be_bytes());
        self.x += 8;
    }

    /// Writes a u8 followed by a big-endian f64 in one capacity check.
    pub fn u8f64(&mut self, u8_val: u8, f64_val: f64) {
        self.ensure_capacity(9);
        self.bytes[self.x] = u8_val;
        self.bytes[self.x + 1..self.x + 9].copy_from_slice(&f64_val.to_be_bytes());
        self.x += 9;
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, data: &[u8]) {
        let length = data.len();
        self.ensure_capacity(length);
        self.bytes[self.x..self.x + length].copy_from_slice(data);
        self.x += length;
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        let data = s.as_bytes();
        self.buf(data);
        data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_flushes_bytes() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        writer.u8(0x02);
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn u32_is_big_endian() {
        let mut writer = Writer::new();
        writer.u32(0x01020304);
        assert_eq!(writer.flush(), [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn f64_is_big_endian() {
        let mut writer = Writer::new();
        writer.f64(1.0);
        assert_eq!(writer.flush(), 1.0f64.to_be_bytes());
    }

    #[test]
    fn u8f64_writes_prefix_then_payload() {
        let mut writer = Writer::new();
        writer.u8f64(0x05, -2.5);
        let data = writer.flush();
        assert_eq!(data[0], 0x05);
        assert_eq!(&data[1..], (-2.5f64).to_be_bytes());
    }

    #[test]
    fn utf8_copies_raw_bytes() {
        let mut writer = Writer::new();
        let n = writer.utf8("café");
        let data = writer.flush();
        assert_eq!(n, data.len());
        assert_eq!(std::str::from_utf8(&data).unwrap(), "café");
    }

    #[test]
    fn flush_tracks_separate_regions() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        assert_eq!(writer.flush(), [0x01]);
        writer.u8(0x02);
        assert_eq!(writer.flush(), [0x02]);
    }

    #[test]
    fn reset_discards_unflushed_bytes() {
        let mut writer = Writer::new();
        writer.u8(0xaa);
        writer.reset();
        writer.u8(0xbb);
        assert_eq!(writer.flush(), [0xbb]);
    }

    #[test]
    fn grows_past_the_initial_allocation() {
        let mut writer = Writer::with_alloc_size(4);
        let payload = vec![0x5au8; 64];
        writer.buf(&payload);
        writer.u8(0x01);
        let data = writer.flush();
        assert_eq!(data.len(), 65);
        assert_eq!(&data[..64], payload.as_slice());
        assert_eq!(data[64], 0x01);
    }

    #[test]
    fn grow_preserves_pending_bytes_only() {
        let mut writer = Writer::with_alloc_size(8);
        writer.u8(0x01);
        writer.flush();
        // Growth must carry over the pending region, not already-flushed bytes.
        writer.buf(&[0x02; 16]);
        assert_eq!(writer.flush(), vec![0x02; 16]);
    }
}
