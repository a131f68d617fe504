use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian};

use crate::HEADER_SIZE;

pub fn read_u32_le(
    buf: &[u8; HEADER_SIZE],
    off: &mut usize,
) -> u32 {
    let v = LittleEndian::read_u32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

/// Декодирует `payload` как последовательность little-endian u16 и
/// дописывает их в `out`. Нечётный хвостовой байт игнорируется.
pub fn extend_u16_le(
    payload: &[u8],
    out: &mut Vec<u16>,
) {
    let n = payload.len() / 2;
    let start = out.len();
    out.resize(start + n, 0);
    LittleEndian::read_u16_into(&payload[..n * 2], &mut out[start..]);
}

/// Читает до заполнения `buf` или до EOF. Возвращает число прочитанных байт.
///
/// В отличие от `read_exact`, короткое чтение не считается ошибкой: по нему
/// декодер блоков отличает конец потока от оборванного блока.
pub fn read_full<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}
