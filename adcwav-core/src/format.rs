//! Бинарный формат лога АЦП-логгера
//!
//! Файл состоит из 512-байтных записей: одна запись заголовка сессии, затем
//! блоки данных. Все многобайтовые числа хранятся в порядке little-endian
//! (младший байт первым), независимо от платформы декодера.
//!
//! ```text
//! Заголовок (512 байт):
//! [0..4]    adcClockHz            u32
//! [4..8]    cpuClockHz            u32
//! [8..12]   sampleIntervalCycles  u32
//! [12..16]  recordEightBits       u32  (0 — 16-битные выборки)
//! [16..20]  pinCount              u32
//! [20..512] pinNumber[123]        u32  (значимы первые pinCount)
//!
//! Блок данных:
//! [0..2]    sampleCount           u16  (обычно 254)
//! [2..4]    overrunCount          u16
//! [4..]     samples               sampleCount × (u16 | u8)
//! ```

use std::io::Read;

use adcwav_types::{AdcError, AdcResult, DataBlock, SampleWidth, SessionHeader};

use crate::binary::{
    read::{read_full, read_u32_le},
    write::{extend_u16_le, write_u32_le},
};

/// Размер заголовка сессии
pub const HEADER_SIZE: usize = 512;

/// Номинальный размер блока данных
pub const BLOCK_SIZE: usize = 512;

/// Размер служебной части блока: `sampleCount` + `overrunCount`
pub const BLOCK_HEADER_SIZE: usize = 4;

/// Штатное количество 16-битных выборок в блоке
pub const NOMINAL_SAMPLES_PER_BLOCK: u16 = 254;

/// Ёмкость таблицы номеров входов в заголовке
pub const PIN_TABLE_CAPACITY: usize = 123;

/// Смещение таблицы номеров входов
const PIN_TABLE_OFFSET: usize = 20;

/// Максимум выборок, помещающихся в один блок при данной разрядности.
pub fn block_capacity(width: SampleWidth) -> usize {
    (BLOCK_SIZE - BLOCK_HEADER_SIZE) / width.bytes()
}

/// Сериализация/десериализация заголовка сессии.
pub trait SessionHeaderExt: Sized {
    /// Сериализация заголовка в 512 байт
    fn serialize(&self) -> AdcResult<[u8; HEADER_SIZE]>;

    /// Десериализация заголовка из 512 байт
    fn deserialize(buf: &[u8; HEADER_SIZE]) -> Self;

    /// Читает ровно 512 байт из потока и декодирует заголовок.
    fn read_from<R: Read>(reader: &mut R) -> AdcResult<Self>;
}

/// Сериализация блока данных.
pub trait DataBlockExt {
    /// Сериализует блок: `count`, `overrun`, полезная нагрузка.
    ///
    /// Блок, у которого `sample_count` расходится с длиной `samples`,
    /// отвергается: иначе все следующие блоки файла читались бы со сдвигом.
    fn serialize(
        &self,
        width: SampleWidth,
    ) -> AdcResult<Vec<u8>>;

    /// Проверяет соответствие `sample_count == samples.len()`.
    fn validate_sample_count(&self) -> AdcResult<()>;
}

impl SessionHeaderExt for SessionHeader {
    fn serialize(&self) -> AdcResult<[u8; HEADER_SIZE]> {
        if self.pin_numbers.len() > PIN_TABLE_CAPACITY {
            return Err(AdcError::invalid_parameter(format!(
                "pin table holds at most {PIN_TABLE_CAPACITY} entries, got {}",
                self.pin_numbers.len()
            )));
        }

        let mut buf = [0u8; HEADER_SIZE];
        let mut off = 0;

        write_u32_le(&mut buf, &mut off, self.adc_clock_hz);
        write_u32_le(&mut buf, &mut off, self.cpu_clock_hz);
        write_u32_le(&mut buf, &mut off, self.sample_interval_cycles);
        write_u32_le(&mut buf, &mut off, self.record_eight_bits);
        write_u32_le(&mut buf, &mut off, self.pin_count);

        for &pin in &self.pin_numbers {
            write_u32_le(&mut buf, &mut off, pin);
        }

        // остаток таблицы — нули
        Ok(buf)
    }

    fn deserialize(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut off = 0;

        let adc_clock_hz = read_u32_le(buf, &mut off);
        let cpu_clock_hz = read_u32_le(buf, &mut off);
        let sample_interval_cycles = read_u32_le(buf, &mut off);
        let record_eight_bits = read_u32_le(buf, &mut off);
        let pin_count = read_u32_le(buf, &mut off);

        debug_assert_eq!(off, PIN_TABLE_OFFSET);

        // первый вход логгер пишет всегда, даже при pinCount == 0
        let meaningful = (pin_count as usize).clamp(1, PIN_TABLE_CAPACITY);
        let pin_numbers = (0..meaningful)
            .map(|_| read_u32_le(buf, &mut off))
            .collect();

        // [off..512] — зарезервировано, не интерпретируется
        SessionHeader {
            adc_clock_hz,
            cpu_clock_hz,
            sample_interval_cycles,
            record_eight_bits,
            pin_count,
            pin_numbers,
        }
    }

    fn read_from<R: Read>(reader: &mut R) -> AdcResult<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        let found = read_full(reader, &mut buf)?;

        if found < HEADER_SIZE {
            return Err(AdcError::TruncatedHeader {
                expected: HEADER_SIZE,
                found,
            });
        }

        Ok(Self::deserialize(&buf))
    }
}

impl DataBlockExt for DataBlock {
    fn serialize(
        &self,
        width: SampleWidth,
    ) -> AdcResult<Vec<u8>> {
        self.validate_sample_count()?;
        let capacity = block_capacity(width);

        if self.samples.len() > capacity {
            return Err(AdcError::OversizedBlock {
                offset: 0,
                sample_count: self.sample_count,
                capacity,
            });
        }

        let mut buf = Vec::with_capacity(BLOCK_HEADER_SIZE + self.samples.len() * width.bytes());

        buf.extend_from_slice(&self.sample_count.to_le_bytes());
        buf.extend_from_slice(&self.overrun_count.to_le_bytes());

        match width {
            SampleWidth::Bits16 => extend_u16_le(&self.samples, &mut buf),
            SampleWidth::Bits8 => {
                for &s in &self.samples {
                    let byte = u8::try_from(s).map_err(|_| {
                        AdcError::invalid_parameter(format!(
                            "sample {s} does not fit an 8-bit block"
                        ))
                    })?;
                    buf.push(byte);
                }
            }
        }

        Ok(buf)
    }

    fn validate_sample_count(&self) -> AdcResult<()> {
        if self.sample_count as usize != self.samples.len() {
            return Err(AdcError::invalid_parameter(format!(
                "sample_count={} ≠ samples.len()={}",
                self.sample_count,
                self.samples.len(),
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn logger_header() -> SessionHeader {
        SessionHeader {
            adc_clock_hz: 1_000_000,
            cpu_clock_hz: 16_000_000,
            sample_interval_cycles: 500,
            record_eight_bits: 0,
            pin_count: 1,
            pin_numbers: vec![7],
        }
    }

    #[test]
    fn test_header_round_trip() {
        let header = logger_header();

        let serialized = header.serialize().unwrap();
        assert_eq!(serialized.len(), HEADER_SIZE);

        let deserialized = SessionHeader::deserialize(&serialized);
        assert_eq!(deserialized, header);
    }

    #[test]
    fn test_header_byte_layout() {
        let mut header = logger_header();
        header.adc_clock_hz = 16_000_000;

        let bytes = header.serialize().unwrap();

        // 16_000_000 = 0x00F42400, младший байт первым
        assert_eq!(&bytes[0..4], &[0x00, 0x24, 0xF4, 0x00], "adcClockHz LE");
        assert_eq!(&bytes[8..12], &500u32.to_le_bytes(), "sampleInterval");
        assert_eq!(&bytes[16..20], &[1, 0, 0, 0], "pinCount");
        assert_eq!(&bytes[20..24], &[7, 0, 0, 0], "first pin");
        assert!(bytes[24..].iter().all(|&b| b == 0), "reserved zeros");
    }

    #[test]
    fn test_header_reserved_bytes_ignored() {
        let mut bytes = logger_header().serialize().unwrap();
        for b in bytes[24..].iter_mut() {
            *b = 0xAB;
        }

        let h = SessionHeader::deserialize(&bytes);
        assert_eq!(h.pin_numbers, vec![7]);
        assert_eq!(h.adc_clock_hz, 1_000_000);
    }

    #[test]
    fn test_header_pin_count_clamped_to_table() {
        let mut bytes = logger_header().serialize().unwrap();
        bytes[16..20].copy_from_slice(&10_000u32.to_le_bytes());

        let h = SessionHeader::deserialize(&bytes);
        assert_eq!(h.pin_count, 10_000);
        assert_eq!(h.pin_numbers.len(), PIN_TABLE_CAPACITY);
    }

    #[test]
    fn test_header_first_pin_read_without_pin_count() {
        let mut bytes = logger_header().serialize().unwrap();
        bytes[16..20].copy_from_slice(&0u32.to_le_bytes());

        let h = SessionHeader::deserialize(&bytes);
        assert_eq!(h.pin_count, 0);
        assert_eq!(h.pin_numbers, vec![7]);
        assert_eq!(h.first_pin(), Some(7));
    }

    #[test]
    fn test_header_too_many_pins_rejected() {
        let mut header = logger_header();
        header.pin_numbers = vec![0; PIN_TABLE_CAPACITY + 1];
        assert!(header.serialize().is_err());
    }

    #[test]
    fn test_truncated_header() {
        let mut src = Cursor::new(vec![0u8; 300]);
        let err = SessionHeader::read_from(&mut src).unwrap_err();

        assert!(matches!(
            err,
            AdcError::TruncatedHeader {
                expected: HEADER_SIZE,
                found: 300
            }
        ));
    }

    #[test]
    fn test_read_from_advances_exactly_512() {
        let mut raw = logger_header().serialize().unwrap().to_vec();
        raw.extend_from_slice(&[0xAA, 0xBB]);

        let mut src = Cursor::new(raw);
        SessionHeader::read_from(&mut src).unwrap();
        assert_eq!(src.position(), HEADER_SIZE as u64);
    }

    #[test]
    fn test_nominal_block_is_512_bytes() {
        let block = DataBlock::new(vec![0x1FF; NOMINAL_SAMPLES_PER_BLOCK as usize]);
        let bytes = block.serialize(SampleWidth::Bits16).unwrap();

        assert_eq!(bytes.len(), BLOCK_SIZE);
        assert_eq!(&bytes[0..2], &[254, 0]);
        assert_eq!(&bytes[4..6], &[0xFF, 0x01]);
    }

    #[test]
    fn test_block_capacity() {
        assert_eq!(block_capacity(SampleWidth::Bits16), 254);
        assert_eq!(block_capacity(SampleWidth::Bits8), 508);

        let too_big = DataBlock::new(vec![0; 255]);
        assert!(matches!(
            too_big.serialize(SampleWidth::Bits16),
            Err(AdcError::OversizedBlock { capacity: 254, .. })
        ));
    }

    #[test]
    fn test_eight_bit_block_layout() {
        let block = DataBlock::with_overruns(vec![1, 2, 255], 3);
        let bytes = block.serialize(SampleWidth::Bits8).unwrap();
        assert_eq!(bytes, vec![3, 0, 3, 0, 1, 2, 255]);

        let wide = DataBlock::new(vec![256]);
        assert!(wide.serialize(SampleWidth::Bits8).is_err());
    }

    #[test]
    fn test_validate_sample_count() {
        let ok = DataBlock::new(vec![1, 2, 3]);
        ok.validate_sample_count().unwrap();

        let bad = DataBlock {
            sample_count: 5,
            ..DataBlock::new(vec![1, 2, 3])
        };
        assert!(bad.validate_sample_count().is_err());
    }

    #[test]
    fn test_mismatched_count_not_serialized() {
        let bad = DataBlock {
            sample_count: 5,
            ..DataBlock::new(vec![1, 2, 3])
        };

        assert!(matches!(
            bad.serialize(SampleWidth::Bits16),
            Err(AdcError::InvalidParameter(_))
        ));
        assert!(bad.serialize(SampleWidth::Bits8).is_err());
    }
}
