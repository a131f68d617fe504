use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use crate::{load_wav, unique_path, AnalyzerConfig, AnalyzerError, AnalyzerResult, LinePlot};

/// Итог обработки каталога.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    /// `(вход, сохранённый PNG)`
    pub plotted: Vec<(PathBuf, PathBuf)>,
    /// `(вход, текст ошибки)`
    pub failed: Vec<(PathBuf, String)>,
}

impl AnalysisReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Строит график одного WAV файла в `plot_dir`. Возвращает путь PNG.
pub fn plot_file(
    input: &Path,
    plot_dir: &Path,
    plot: &LinePlot,
    config: &AnalyzerConfig,
) -> AnalyzerResult<PathBuf> {
    let signal = load_wav(input, config.max_samples)?;
    let series = config.mode.series(&signal);

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plot".into());

    let output = unique_path(plot_dir, &stem, "png");
    plot.save(&series, &output)?;

    Ok(output)
}

/// Строит графики для всех WAV файлов `config.input_dir`.
///
/// Ошибка одного файла не прерывает обработку остальных.
pub fn run(config: &AnalyzerConfig) -> AnalyzerResult<AnalysisReport> {
    config.validate()?;
    let plot = LinePlot::new(config.width, config.height)?;
    let plot_dir = config.plot_dir();

    prepare_plot_dir(&plot_dir, config.clear_output)?;
    let inputs = discover_wavs(&config.input_dir)?;

    if inputs.is_empty() {
        warn!("No .wav files found in {:?}", config.input_dir);
    }

    info!(
        "Plotting {} files ({} mode) into {:?}",
        inputs.len(),
        config.mode,
        plot_dir
    );

    let mut report = AnalysisReport::default();

    for input in inputs {
        match plot_file(&input, &plot_dir, &plot, config) {
            Ok(png) => report.plotted.push((input, png)),
            Err(e) => {
                error!("✗ {:?}: {e}", input);
                report.failed.push((input, e.to_string()));
            }
        }
    }

    Ok(report)
}

fn prepare_plot_dir(
    dir: &Path,
    clear: bool,
) -> AnalyzerResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }

    if clear {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;

            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
    }

    Ok(())
}

fn discover_wavs(dir: &Path) -> AnalyzerResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AnalyzerError::Config(format!(
            "input directory {dir:?} does not exist"
        )));
    }

    let mut inputs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_wav = path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case("wav"))
            .unwrap_or(false);

        if is_wav && entry.file_type()?.is_file() {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}
