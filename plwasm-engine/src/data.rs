use bytes::Bytes;

/// A read-only, randomly addressable view of the bytes the host handed over.
///
/// The engine addresses data relative to [`DataSource::base`], which is always 0 here.
/// Bounds are the engine's responsibility: it was told the length at bind time, so a read
/// outside `[base, base + len)` is a broken precondition and panics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSource {
    bytes: Bytes,
}

impl DataSource {
    pub const BASE: u64 = 0x00;

    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into() }
    }

    #[inline]
    pub fn base(&self) -> u64 {
        Self::BASE
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// One past the last valid address.
    #[inline]
    pub fn end(&self) -> u64 {
        self.base() + self.len()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy `buf.len()` bytes starting at `address` into `buf`.
    ///
    /// # Panics
    /// If `[address, address + buf.len())` is not inside the bound buffer.
    pub fn read(&self, address: u64, buf: &mut [u8]) {
        let range = self.range(address, buf.len()).unwrap_or_else(|| {
            panic!(
                "read out of bounds: address=0x{address:X} size=0x{:X} data_len=0x{:X}",
                buf.len(),
                self.len()
            )
        });
        buf.copy_from_slice(&self.bytes[range]);
    }

    /// Checked variant of [`DataSource::read`] for engines that validate lazily.
    pub fn try_read(&self, address: u64, buf: &mut [u8]) -> Option<()> {
        let range = self.range(address, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Some(())
    }

    fn range(&self, address: u64, size: usize) -> Option<std::ops::Range<usize>> {
        let start = address.checked_sub(self.base())?;
        let end = start.checked_add(size as u64)?;
        if end > self.len() {
            return None;
        }
        Some(start as usize..end as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_copies_requested_window() {
        let src = DataSource::new(vec![0x10u8, 0x20, 0x30, 0x40]);
        let mut buf = [0u8; 2];
        src.read(1, &mut buf);
        assert_eq!(buf, [0x20, 0x30]);
        assert_eq!(src.end(), 4);
    }

    #[test]
    fn read_up_to_the_last_byte() {
        let src = DataSource::new(&b"abc"[..]);
        let mut buf = [0u8; 3];
        src.read(0, &mut buf);
        assert_eq!(&buf, b"abc");

        let mut empty = [0u8; 0];
        src.read(3, &mut empty);
    }

    #[test]
    #[should_panic(expected = "read out of bounds")]
    fn read_past_end_panics() {
        let src = DataSource::new(vec![0u8; 4]);
        let mut buf = [0u8; 2];
        src.read(3, &mut buf);
    }

    #[test]
    fn try_read_rejects_overflowing_address() {
        let src = DataSource::new(vec![0u8; 4]);
        let mut buf = [0u8; 2];
        assert!(src.try_read(u64::MAX, &mut buf).is_none());
        assert!(src.try_read(2, &mut buf).is_some());
    }
}
