/// Bytes held by a [`RingBuffer`]; one more than the cursors can tell apart.
pub const CAPACITY: usize = 256;

/// Fixed size byte FIFO with 8-bit cursors.
///
/// The cursors wrap by construction, so `occupied()` is always
/// `write_pos - read_pos (mod 256)`. Writing 256 bytes without reading
/// makes the buffer look empty again; callers check `free()` first.
pub struct RingBuffer {
    data: [u8; CAPACITY],
    read_pos: u8,
    write_pos: u8,
}

impl RingBuffer {
    pub const fn new() -> Self {
        Self {
            data: [0; CAPACITY],
            read_pos: 0,
            write_pos: 0,
        }
    }

    pub const fn occupied(&self) -> usize {
        self.write_pos.wrapping_sub(self.read_pos) as usize
    }

    pub const fn free(&self) -> usize {
        CAPACITY - self.occupied()
    }

    pub const fn is_empty(&self) -> bool {
        self.read_pos == self.write_pos
    }

    /// Store `byte` at the write cursor. Never fails, the caller has checked `free()`.
    pub fn push(&mut self, byte: u8) {
        self.data[usize::from(self.write_pos)] = byte;
        self.write_pos = self.write_pos.wrapping_add(1);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.push(*byte);
        }
    }

    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.data[usize::from(self.read_pos)];
        self.read_pos = self.read_pos.wrapping_add(1);
        Some(byte)
    }

    /// Look at the byte `offset` positions past the read cursor without consuming it.
    pub fn peek(&self, offset: usize) -> Option<u8> {
        if offset >= self.occupied() {
            return None;
        }
        Some(self.data[usize::from(self.read_pos.wrapping_add(offset as u8))])
    }

    /// Drop everything buffered and reset both cursors.
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("read_pos", &self.read_pos)
            .field("write_pos", &self.write_pos)
            .field("occupied", &self.occupied())
            .finish()
    }
}
