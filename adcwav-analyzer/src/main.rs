use std::path::PathBuf;

use adcwav_analyzer::{run, AnalyzerConfig, PlotMode, DEFAULT_MAX_SAMPLES};
use clap::Parser;
use log::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "adcwav-analyzer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Plot spectra or waveforms of WAV recordings to PNG",
    long_about = None,
)]
struct Cli {
    /// Режим: f (frequency) или a (amplitude)
    #[arg(short, long, default_value = "f")]
    mode: String,
    /// Каталог с WAV файлами
    #[arg(short, long, default_value = "WAVs")]
    input: PathBuf,
    /// Корневой каталог графиков
    #[arg(short, long, default_value = "Fourier_Plots")]
    output: PathBuf,
    /// Не удалять старые графики
    #[arg(long)]
    keep_output: bool,
    /// Ширина PNG, пикселей
    #[arg(long, default_value = "1200")]
    width: u32,
    /// Высота PNG, пикселей
    #[arg(long, default_value = "600")]
    height: u32,
    /// Выборок на файл
    #[arg(long, default_value_t = DEFAULT_MAX_SAMPLES)]
    max_samples: usize,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let mode: PlotMode = match cli.mode.parse() {
        Ok(m) => m,
        Err(e) => {
            error!("--mode: {e}");
            std::process::exit(1);
        }
    };

    let config = AnalyzerConfig {
        input_dir: cli.input,
        output_dir: cli.output,
        mode,
        clear_output: !cli.keep_output,
        width: cli.width,
        height: cli.height,
        max_samples: cli.max_samples,
    };

    let report = match run(&config) {
        Ok(r) => r,
        Err(e) => {
            error!("Analysis failed: {e}");
            std::process::exit(1);
        }
    };

    if report.has_failures() {
        warn!(
            "⚠ {} of {} files failed",
            report.failed.len(),
            report.failed.len() + report.plotted.len()
        );
        std::process::exit(1);
    }

    info!(
        "✓ {} plots written to {:?}",
        report.plotted.len(),
        config.plot_dir()
    );
}
