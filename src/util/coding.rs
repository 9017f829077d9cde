//! Little-endian fixed-width integer coding. Callers guarantee the slices are
//! at least as long as the encoded width.

pub fn encode_fixed16(dst: &mut [u8], value: u16) {
    dst[..2].copy_from_slice(&value.to_le_bytes());
}

pub fn encode_fixed32(dst: &mut [u8], value: u32) {
    dst[..4].copy_from_slice(&value.to_le_bytes());
}

pub fn encode_fixed64(dst: &mut [u8], value: u64) {
    dst[..8].copy_from_slice(&value.to_le_bytes());
}

pub fn decode_fixed16(input: &[u8]) -> u16 {
    u16::from_le_bytes([input[0], input[1]])
}

pub fn decode_fixed32(input: &[u8]) -> u32 {
    u32::from_le_bytes([input[0], input[1], input[2], input[3]])
}

pub fn decode_fixed64(input: &[u8]) -> u64 {
    let mut bytes = [0; 8];
    bytes.copy_from_slice(&input[..8]);
    u64::from_le_bytes(bytes)
}
