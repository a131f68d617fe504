use std::path::PathBuf;

use crate::{AnalyzerError, AnalyzerResult, PlotMode};

/// Выборок на файл по умолчанию (~131 с при 32 кГц)
pub const DEFAULT_MAX_SAMPLES: usize = 1 << 22;

/// Конфигурация построения графиков.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Каталог с WAV файлами
    pub input_dir: PathBuf,
    /// Корневой каталог графиков; внутри создаётся подкаталог режима
    pub output_dir: PathBuf,
    pub mode: PlotMode,
    /// Удалить старые графики режима перед запуском
    pub clear_output: bool,
    /// Размер PNG в пикселях
    pub width: u32,
    pub height: u32,
    /// Сколько выборок каждого файла анализировать
    pub max_samples: usize,
}

impl AnalyzerConfig {
    /// Каталог графиков текущего режима.
    pub fn plot_dir(&self) -> PathBuf {
        self.output_dir.join(self.mode.subdir())
    }

    pub fn validate(&self) -> AnalyzerResult<()> {
        if self.max_samples == 0 {
            return Err(AnalyzerError::Config("max samples must be >= 1".into()));
        }

        Ok(())
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("WAVs"),
            output_dir: PathBuf::from("Fourier_Plots"),
            mode: PlotMode::Frequency,
            clear_output: true,
            width: 1200,
            height: 600,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_dir_per_mode() {
        let mut cfg = AnalyzerConfig::default();
        assert_eq!(cfg.plot_dir(), PathBuf::from("Fourier_Plots/Frequency"));

        cfg.mode = PlotMode::Amplitude;
        assert_eq!(cfg.plot_dir(), PathBuf::from("Fourier_Plots/Amplitude"));
        cfg.validate().unwrap();
    }
}
