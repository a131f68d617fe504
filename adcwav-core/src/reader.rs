use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use adcwav_types::{AdcError, AdcResult, BlockRead, DataBlock, SessionHeader, TruncatedBlock};
use log::{debug, info, warn};

use crate::{
    decoder::BlockDecoder,
    format::{SessionHeaderExt, HEADER_SIZE},
};

/// Потоковый читатель лога АЦП: заголовок один раз, затем блоки по порядку.
pub struct SampleStreamReader<R: Read> {
    decoder: BlockDecoder<BufReader<R>>,
    header: SessionHeader,
    stats: ReadStats,
    termination: Option<Termination>,
    failed: bool,
}

/// Статистика, накопленная [`SampleStreamReader`] в процессе чтения.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadStats {
    /// Полностью прочитанных блоков.
    pub blocks_ok: u64,
    /// Сумма выборок по всем полным блокам.
    pub samples_recovered: u64,
    /// Всего прочитано байт, включая заголовок и оборванный хвост.
    pub bytes_consumed: u64,
    /// Сумма счётчиков переполнения логгера.
    pub overruns_total: u64,
    /// Блоков с ненулевым счётчиком переполнения.
    pub blocks_with_overruns: u64,
}

/// Почему чтение потока остановилось. Все варианты — штатные.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Файл закончился на границе блока
    EndOfStream,
    /// Последний блок оборван; его выборки отброшены
    Truncated(TruncatedBlock),
    /// Заявленный размер блока не помещается в 512 байт; блок и всё
    /// после него отброшены
    Oversized {
        offset: u64,
        sample_count: u16,
        capacity: usize,
    },
    /// Достигнут лимит `max_blocks`
    BlockLimit,
}

impl Termination {
    /// `true`, если поток оборвался на повреждённом блоке.
    pub fn is_damaged(&self) -> bool {
        matches!(
            self,
            Termination::Truncated(_) | Termination::Oversized { .. }
        )
    }
}

/// Результат чтения: плоская последовательность выборок всех полных блоков.
#[derive(Debug, Clone)]
pub struct SampleStream {
    pub header: SessionHeader,
    pub samples: Vec<u16>,
    pub stats: ReadStats,
    pub termination: Termination,
}

impl<R: Read> SampleStreamReader<R> {
    /// Создаёт читатель, читая заголовок из `inner`.
    pub fn new(inner: R) -> AdcResult<Self> {
        let mut reader = BufReader::new(inner);
        let header = SessionHeader::read_from(&mut reader)?;

        info!(
            "Header: adc={} Hz, cpu={} Hz, interval={} cycles, pins={}, first pin={:?}, width={:?}",
            header.adc_clock_hz,
            header.cpu_clock_hz,
            header.sample_interval_cycles,
            header.pin_count,
            header.first_pin(),
            header.sample_width(),
        );

        let decoder = BlockDecoder::new(reader, header.sample_width(), HEADER_SIZE as u64);

        Ok(Self {
            decoder,
            header,
            stats: ReadStats {
                bytes_consumed: HEADER_SIZE as u64,
                ..ReadStats::default()
            },
            termination: None,
            failed: false,
        })
    }

    /// Возвращает следующий полный блок или `None`, когда поток закончился
    /// (конец файла, оборванный или переполненный блок, предыдущая ошибка).
    pub fn next_block(&mut self) -> Option<AdcResult<DataBlock>> {
        if self.termination.is_some() || self.failed {
            return None;
        }

        let result = self.decoder.next_block();
        self.stats.bytes_consumed = self.decoder.offset();

        match result {
            Ok(BlockRead::Decoded(block)) => {
                self.stats.blocks_ok += 1;
                self.stats.samples_recovered += block.samples.len() as u64;

                if block.overrun_count > 0 {
                    self.stats.overruns_total += block.overrun_count as u64;
                    self.stats.blocks_with_overruns += 1;
                    debug!(
                        "Block #{}: {} overruns",
                        self.stats.blocks_ok, block.overrun_count
                    );
                }

                Some(Ok(block))
            }
            Ok(BlockRead::EndOfStream) => {
                info!(
                    "End of stream: {} blocks, {} samples",
                    self.stats.blocks_ok, self.stats.samples_recovered
                );
                self.termination = Some(Termination::EndOfStream);
                None
            }
            Ok(BlockRead::Truncated(t)) => {
                warn!(
                    "Truncated block at offset {}: {} of {} bytes present, {:?} samples declared",
                    t.offset, t.available_bytes, t.expected_bytes, t.declared_samples
                );
                self.termination = Some(Termination::Truncated(t));
                None
            }
            Err(AdcError::OversizedBlock {
                offset,
                sample_count,
                capacity,
            }) => {
                warn!(
                    "Oversized block at offset {offset}: {sample_count} samples declared, \
                     capacity {capacity}; {} complete blocks kept",
                    self.stats.blocks_ok
                );
                self.termination = Some(Termination::Oversized {
                    offset,
                    sample_count,
                    capacity,
                });
                None
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    /// Читает не более `max_blocks` блоков и склеивает их выборки по порядку.
    pub fn read_samples(
        mut self,
        max_blocks: u64,
    ) -> AdcResult<SampleStream> {
        let mut samples = Vec::new();

        loop {
            if self.stats.blocks_ok >= max_blocks {
                info!("Block limit reached ({max_blocks})");
                self.termination = Some(Termination::BlockLimit);
                break;
            }

            match self.next_block() {
                Some(Ok(block)) => samples.extend_from_slice(&block.samples),
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }

        if self.stats.overruns_total > 0 {
            warn!(
                "{} logger overruns across {} blocks",
                self.stats.overruns_total, self.stats.blocks_with_overruns
            );
        }

        // next_block выставляет termination всегда, кроме ошибки
        let termination = self.termination.unwrap_or(Termination::EndOfStream);

        Ok(SampleStream {
            header: self.header,
            samples,
            stats: self.stats,
            termination,
        })
    }

    /// Прочитанный заголовок файла.
    pub fn header(&self) -> &SessionHeader {
        &self.header
    }

    /// Накопленная статистика чтения.
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }
}

impl<R: Read> Iterator for SampleStreamReader<R> {
    type Item = AdcResult<DataBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block()
    }
}

impl SampleStream {
    pub fn blocks_read(&self) -> u64 {
        self.stats.blocks_ok
    }

    pub fn samples_read(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.termination, Termination::Truncated(_))
    }

    /// Выборки одного входа при `pin_count > 1` (выборки чередуются в
    /// порядке таблицы входов). `None`, если индекс вне таблицы.
    pub fn channel(
        &self,
        pin_index: usize,
    ) -> Option<Vec<u16>> {
        let pins = self.header.pin_count.max(1) as usize;

        if pin_index >= pins {
            return None;
        }

        Some(
            self.samples
                .iter()
                .skip(pin_index)
                .step_by(pins)
                .copied()
                .collect(),
        )
    }

    /// Длительность записи в секундах при частоте `sample_rate_hz`.
    pub fn duration_secs(
        &self,
        sample_rate_hz: u32,
    ) -> f64 {
        if sample_rate_hz == 0 {
            return 0.0;
        }

        self.samples.len() as f64 / sample_rate_hz as f64
    }
}

/// Открывает файл и читает его целиком (с учётом `max_blocks`).
///
/// Файл закрывается при любом исходе, включая ошибку декодирования.
pub fn read_stream<P: AsRef<Path>>(
    path: P,
    max_blocks: u64,
) -> AdcResult<SampleStream> {
    let file = File::open(path.as_ref())?;
    SampleStreamReader::new(file)?.read_samples(max_blocks)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use adcwav_types::SampleWidth;

    use super::*;
    use crate::format::DataBlockExt;

    fn make_file(blocks: &[Vec<u16>]) -> Vec<u8> {
        let mut raw = SessionHeader::new(1_000_000, 16_000_000, 500)
            .serialize()
            .unwrap()
            .to_vec();

        for samples in blocks {
            let block = DataBlock::new(samples.clone());
            raw.extend_from_slice(&block.serialize(SampleWidth::Bits16).unwrap());
        }
        raw
    }

    #[test]
    fn test_concatenation_order() {
        let raw = make_file(&[vec![1, 2, 3], vec![4, 5], vec![6, 7, 8, 9]]);

        let stream = SampleStreamReader::new(Cursor::new(raw))
            .unwrap()
            .read_samples(u64::MAX)
            .unwrap();

        assert_eq!(stream.samples, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(stream.blocks_read(), 3);
        assert_eq!(stream.samples_read(), 9);
        assert_eq!(stream.termination, Termination::EndOfStream);
    }

    #[test]
    fn test_block_limit() {
        let raw = make_file(&[vec![1], vec![2], vec![3]]);

        let stream = SampleStreamReader::new(Cursor::new(raw))
            .unwrap()
            .read_samples(2)
            .unwrap();

        assert_eq!(stream.samples, vec![1, 2]);
        assert_eq!(stream.termination, Termination::BlockLimit);
    }

    #[test]
    fn test_zero_block_limit_reads_nothing() {
        let raw = make_file(&[vec![1]]);

        let stream = SampleStreamReader::new(Cursor::new(raw))
            .unwrap()
            .read_samples(0)
            .unwrap();

        assert!(stream.samples.is_empty());
        assert_eq!(stream.stats.bytes_consumed, HEADER_SIZE as u64);
    }

    #[test]
    fn test_header_only_file() {
        let raw = make_file(&[]);

        let mut reader = SampleStreamReader::new(Cursor::new(raw)).unwrap();
        assert!(reader.next_block().is_none());
        assert_eq!(reader.termination(), Some(Termination::EndOfStream));
        assert_eq!(reader.stats().blocks_ok, 0);
    }

    #[test]
    fn test_truncated_header_is_error() {
        let result = SampleStreamReader::new(Cursor::new(vec![0u8; 511]));
        assert!(matches!(result, Err(AdcError::TruncatedHeader { .. })));
    }

    #[test]
    fn test_overruns_counted() {
        let mut raw = make_file(&[vec![1]]);
        raw.extend_from_slice(
            &DataBlock::with_overruns(vec![2], 5)
                .serialize(SampleWidth::Bits16)
                .unwrap(),
        );

        let stream = SampleStreamReader::new(Cursor::new(raw))
            .unwrap()
            .read_samples(u64::MAX)
            .unwrap();

        assert_eq!(stream.stats.overruns_total, 5);
        assert_eq!(stream.stats.blocks_with_overruns, 1);
    }

    #[test]
    fn test_oversized_block_ends_stream() {
        let mut raw = make_file(&[vec![1], vec![2, 3]]);
        raw.extend_from_slice(&[0xFF, 0xFF, 0, 0]);
        raw.extend(make_file(&[vec![4]])[HEADER_SIZE..].iter().copied());

        let mut reader = SampleStreamReader::new(Cursor::new(raw)).unwrap();
        assert!(reader.next_block().unwrap().is_ok());
        assert!(reader.next_block().unwrap().is_ok());
        assert!(reader.next_block().is_none());
        assert!(reader.next_block().is_none());

        let termination = reader.termination().unwrap();
        assert!(termination.is_damaged());
        assert_eq!(
            termination,
            Termination::Oversized {
                offset: (HEADER_SIZE + 6 + 8) as u64,
                sample_count: 0xFFFF,
                capacity: 254,
            }
        );
    }

    #[test]
    fn test_oversized_block_keeps_earlier_samples() {
        let mut raw = make_file(&[vec![1, 2], vec![3]]);
        raw.extend_from_slice(&[0x00, 0x01, 0, 0]);

        let stream = SampleStreamReader::new(Cursor::new(raw))
            .unwrap()
            .read_samples(u64::MAX)
            .unwrap();

        assert_eq!(stream.samples, vec![1, 2, 3]);
        assert_eq!(stream.blocks_read(), 2);
        assert!(matches!(
            stream.termination,
            Termination::Oversized {
                sample_count: 256,
                ..
            }
        ));
        assert!(!stream.is_truncated());
    }

    #[test]
    fn test_iterator_impl() {
        let raw = make_file(&[vec![1, 2], vec![3]]);
        let reader = SampleStreamReader::new(Cursor::new(raw)).unwrap();

        let blocks: Vec<_> = reader.filter_map(|r| r.ok()).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].samples, vec![3]);
    }

    #[test]
    fn test_channel_deinterleave() {
        let mut header = SessionHeader::new(1_000_000, 16_000_000, 500);
        header.pin_count = 2;
        header.pin_numbers = vec![0, 1];

        let stream = SampleStream {
            header,
            samples: vec![10, 20, 11, 21, 12, 22],
            stats: ReadStats::default(),
            termination: Termination::EndOfStream,
        };

        assert_eq!(stream.channel(0), Some(vec![10, 11, 12]));
        assert_eq!(stream.channel(1), Some(vec![20, 21, 22]));
        assert_eq!(stream.channel(2), None);
        assert!((stream.duration_secs(2) - 3.0).abs() < 1e-9);
    }
}
