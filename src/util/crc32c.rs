const MASK_DELTA: u32 = 0xa282ead8;

pub fn value(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Checksums stored next to the data they cover are masked, so that the CRC
/// of a buffer holding embedded CRCs stays well distributed.
pub fn mask(crc: u32) -> u32 {
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

pub fn unmask(masked_crc: u32) -> u32 {
    let rot = masked_crc.wrapping_sub(MASK_DELTA);
    (rot >> 17) | (rot << 15)
}
