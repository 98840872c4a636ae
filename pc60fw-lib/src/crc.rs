use crc::{CRC_8_MAXIM_DOW, Crc};

/// CRC-8/MAXIM (Dallas 1-Wire): poly 0x31, init 0x00, reflected in and out,
/// no final XOR. Check value for `"123456789"` is 0xA1.
const CRC8_MAXIM: Crc<u8> = Crc::<u8>::new(&CRC_8_MAXIM_DOW);

/// Checksum over everything from the marker up to, not including, the
/// trailing checksum byte.
#[inline]
pub fn crc8_maxim(data: &[u8]) -> u8 {
    CRC8_MAXIM.checksum(data)
}
