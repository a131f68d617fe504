use std::io::Read;

use adcwav_types::{AdcError, AdcResult, BlockRead, DataBlock, SampleWidth, TruncatedBlock};

use crate::{
    binary::read::{extend_u16_le, read_full},
    format::{block_capacity, BLOCK_HEADER_SIZE},
};

/// Декодер блоков данных, следующих за заголовком.
///
/// Каждый вызов [`BlockDecoder::next_block`] читает ровно один блок и
/// сдвигает курсор на фактически прочитанное число байт.
pub struct BlockDecoder<R: Read> {
    reader: R,
    width: SampleWidth,
    offset: u64,
    payload: Vec<u8>,
}

impl<R: Read> BlockDecoder<R> {
    /// `offset` — позиция `reader` относительно начала файла (для
    /// диагностики усечённых блоков).
    pub fn new(
        reader: R,
        width: SampleWidth,
        offset: u64,
    ) -> Self {
        Self {
            reader,
            width,
            offset,
            payload: Vec::with_capacity(block_capacity(width) * width.bytes()),
        }
    }

    /// Читает следующий блок.
    ///
    /// Конец файла на границе блока даёт [`BlockRead::EndOfStream`], обрыв
    /// внутри блока — [`BlockRead::Truncated`]. Ошибкой считаются только
    /// сбои ввода/вывода и блок, не помещающийся в 512 байт.
    pub fn next_block(&mut self) -> AdcResult<BlockRead> {
        let block_offset = self.offset;

        let mut count_buf = [0u8; 2];
        let n = self.fill(&mut count_buf)?;

        match n {
            0 => return Ok(BlockRead::EndOfStream),
            1 => {
                return Ok(BlockRead::Truncated(TruncatedBlock {
                    offset: block_offset,
                    declared_samples: None,
                    expected_bytes: BLOCK_HEADER_SIZE,
                    available_bytes: 1,
                }))
            }
            _ => {}
        }

        let sample_count = u16::from_le_bytes(count_buf);
        let capacity = block_capacity(self.width);

        if sample_count as usize > capacity {
            return Err(AdcError::OversizedBlock {
                offset: block_offset,
                sample_count,
                capacity,
            });
        }

        let payload_len = sample_count as usize * self.width.bytes();
        let expected_bytes = BLOCK_HEADER_SIZE + payload_len;

        let mut overrun_buf = [0u8; 2];
        let n = self.fill(&mut overrun_buf)?;

        if n < overrun_buf.len() {
            return Ok(BlockRead::Truncated(TruncatedBlock {
                offset: block_offset,
                declared_samples: Some(sample_count),
                expected_bytes,
                available_bytes: 2 + n,
            }));
        }

        let overrun_count = u16::from_le_bytes(overrun_buf);

        let mut payload = std::mem::take(&mut self.payload);
        payload.resize(payload_len, 0);
        let n = self.fill(&mut payload);
        self.payload = payload;
        let n = n?;

        if n < payload_len {
            return Ok(BlockRead::Truncated(TruncatedBlock {
                offset: block_offset,
                declared_samples: Some(sample_count),
                expected_bytes,
                available_bytes: BLOCK_HEADER_SIZE + n,
            }));
        }

        let mut samples = Vec::with_capacity(sample_count as usize);

        match self.width {
            SampleWidth::Bits16 => extend_u16_le(&self.payload, &mut samples),
            SampleWidth::Bits8 => samples.extend(self.payload.iter().map(|&b| b as u16)),
        }

        Ok(BlockRead::Decoded(DataBlock {
            sample_count,
            overrun_count,
            samples,
        }))
    }

    /// Позиция курсора от начала файла.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn fill(
        &mut self,
        buf: &mut [u8],
    ) -> AdcResult<usize> {
        let n = read_full(&mut self.reader, buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}
