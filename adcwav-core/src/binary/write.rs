use byteorder::{ByteOrder, LittleEndian};

use crate::HEADER_SIZE;

pub fn write_u32_le(
    buf: &mut [u8; HEADER_SIZE],
    off: &mut usize,
    val: u32,
) {
    LittleEndian::write_u32(&mut buf[*off..*off + 4], val);
    *off += 4;
}

/// Дописывает выборки в `out` как little-endian u16.
pub fn extend_u16_le(
    samples: &[u16],
    out: &mut Vec<u8>,
) {
    let start = out.len();
    out.resize(start + samples.len() * 2, 0);
    LittleEndian::write_u16_into(samples, &mut out[start..]);
}
