//! PCM16 → WAV (RIFF/WAVE, моно, без сжатия) через `hound`.

use std::{
    io::{BufWriter, Seek, Write},
    path::Path,
};

use adcwav_types::{AdcError, AdcResult};
use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use tempfile::NamedTempFile;

/// Частота дискретизации WAV по умолчанию (Гц)
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 32_000;

pub const WAV_CHANNELS: u16 = 1;
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Кодер моно PCM16 в WAV контейнер с заданной частотой.
#[derive(Debug, Clone, Copy)]
pub struct PcmEncoder {
    sample_rate_hz: u32,
}

impl PcmEncoder {
    pub fn new(sample_rate_hz: u32) -> AdcResult<Self> {
        if sample_rate_hz == 0 {
            return Err(AdcError::invalid_parameter("sample rate must be > 0"));
        }

        Ok(Self { sample_rate_hz })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn spec(&self) -> WavSpec {
        WavSpec {
            channels: WAV_CHANNELS,
            sample_rate: self.sample_rate_hz,
            bits_per_sample: WAV_BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        }
    }

    /// Пишет WAV контейнер в `sink`. Число кадров равно `samples.len()`.
    pub fn encode<W: Write + Seek>(
        &self,
        sink: W,
        samples: &[i16],
    ) -> AdcResult<()> {
        let mut writer = WavWriter::new(sink, self.spec()).map_err(encode_error)?;

        for &s in samples {
            writer.write_sample(s).map_err(encode_error)?;
        }

        // finalize перезаписывает размеры RIFF/data в заголовке
        writer.finalize().map_err(encode_error)
    }

    /// Пишет WAV файл через временный файл в том же каталоге.
    ///
    /// Файл появляется по пути `path` только после успешной записи и
    /// сброса на диск; при ошибке временный файл удаляется.
    pub fn write_file<P: AsRef<Path>>(
        &self,
        path: P,
        samples: &[i16],
    ) -> AdcResult<()> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let tmp = NamedTempFile::new_in(dir).map_err(|e| write_error(path, e))?;

        {
            let mut sink = BufWriter::new(tmp.as_file());
            self.encode(&mut sink, samples)?;
            sink.flush().map_err(|e| write_error(path, e))?;
        }

        tmp.as_file().sync_all().map_err(|e| write_error(path, e))?;
        tmp.persist(path).map_err(|e| write_error(path, e.error))?;

        info!(
            "WAV written: {:?} ({} frames @ {} Hz)",
            path,
            samples.len(),
            self.sample_rate_hz
        );

        Ok(())
    }
}

impl Default for PcmEncoder {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

fn encode_error(e: hound::Error) -> AdcError {
    AdcError::encode_write_failure(e.to_string())
}

fn write_error(
    path: &Path,
    e: std::io::Error,
) -> AdcError {
    AdcError::encode_write_failure(format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use hound::WavReader;

    use super::*;

    #[test]
    fn test_encode_declares_frames_and_format() {
        let samples: Vec<i16> = vec![-32_768, -1, 0, 1, 32_767];
        let mut cursor = Cursor::new(Vec::new());

        PcmEncoder::new(32_000)
            .unwrap()
            .encode(&mut cursor, &samples)
            .unwrap();

        let bytes = cursor.into_inner();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 32_000);
        assert_eq!(spec.sample_format, SampleFormat::Int);
        assert_eq!(reader.duration(), 5);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_sample_rate_is_a_parameter() {
        let mut cursor = Cursor::new(Vec::new());
        PcmEncoder::new(44_100)
            .unwrap()
            .encode(&mut cursor, &[0; 3])
            .unwrap();

        let reader = WavReader::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(reader.spec().sample_rate, 44_100);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(PcmEncoder::new(0).is_err());
        assert_eq!(PcmEncoder::default().sample_rate_hz(), DEFAULT_SAMPLE_RATE_HZ);
    }

    #[test]
    fn test_write_file_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        PcmEncoder::default()
            .write_file(&path, &[1, 2, 3, 4])
            .unwrap();

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.duration(), 4);

        // в каталоге только итоговый файл, без временных
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_file_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");

        let err = PcmEncoder::default().write_file(&path, &[0]).unwrap_err();
        assert!(matches!(err, AdcError::EncodeWriteFailure(_)));
        assert!(!path.exists());
    }
}
