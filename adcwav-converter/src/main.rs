use std::{path::PathBuf, sync::atomic::Ordering, time::Instant};

use adcwav_converter::{parse_rate_hz, BatchRunner, ConverterConfig};
use adcwav_core::{ConversionOptions, DEFAULT_MAX_BLOCKS, DEFAULT_TARGET_PEAK};
use clap::Parser;
use log::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "adcwav-converter",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert ADC logger .bin files to 16-bit mono WAV",
    long_about = None,
)]
struct Cli {
    /// Каталог с .bin файлами
    #[arg(short, long, default_value = "bins")]
    input: PathBuf,
    /// Каталог для WAV файлов
    #[arg(short, long, default_value = "WAVs")]
    output: PathBuf,
    /// Частота дискретизации WAV (32kHz, 32000Hz, 32000)
    #[arg(short = 'r', long, default_value = "32kHz")]
    rate: String,
    /// Целевая пиковая амплитуда PCM16
    #[arg(long, default_value_t = DEFAULT_TARGET_PEAK)]
    peak: i32,
    /// Максимум читаемых блоков на файл
    #[arg(long, default_value_t = DEFAULT_MAX_BLOCKS)]
    max_blocks: u64,
    /// Конвертировать только один вход многоканальной записи
    #[arg(long)]
    pin_index: Option<usize>,
    /// Расширение входных файлов
    #[arg(long, default_value = "bin")]
    extension: String,
    /// Число рабочих потоков (по умолчанию: число ядер)
    #[arg(short, long)]
    workers: Option<usize>,
    /// Не очищать выходной каталог перед запуском
    #[arg(long)]
    keep_output: bool,
    /// Сохранять выборки в <stem>_adc.csv
    #[arg(long)]
    csv: bool,
    /// Сохранять статистику в <stem>_rms.txt
    #[arg(long)]
    rms: bool,
    /// JSON отчёт по запуску
    #[arg(long)]
    report: Option<PathBuf>,
    /// Подробный вывод (debug)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let sample_rate_hz = match parse_rate_hz(&cli.rate) {
        Ok(r) => r,
        Err(e) => {
            error!("--rate: {e}");
            std::process::exit(1);
        }
    };

    let defaults = ConverterConfig::default();
    let config = ConverterConfig {
        input_dir: cli.input.clone(),
        output_dir: cli.output.clone(),
        clear_output: !cli.keep_output,
        input_extension: cli.extension.clone(),
        workers: cli.workers.unwrap_or(defaults.workers),
        options: ConversionOptions {
            max_blocks: cli.max_blocks,
            target_peak: cli.peak,
            sample_rate_hz,
            pin_index: cli.pin_index,
        },
        export_csv: cli.csv,
        export_rms: cli.rms,
        report_path: cli.report.clone(),
    };

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Input         : {:?} (*.{})", config.input_dir, config.input_extension);
    info!("  Output        : {:?}", config.output_dir);
    info!("  Sample rate   : {} Hz", sample_rate_hz);
    info!("  Target peak   : {}", config.options.target_peak);
    info!("  Workers       : {}", config.workers);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let (runner, metrics) = BatchRunner::new(config);
    let stop_ctrlc = runner.stop_flag();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // повторный Ctrl+C: выход без ожидания воркеров
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received, finishing files in progress...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    let started = Instant::now();

    let report = match runner.run() {
        Ok(r) => r,
        Err(e) => {
            error!("Conversion failed: {e}");
            std::process::exit(1);
        }
    };

    // --- Итоговая статистика ---
    info!("\n{}", metrics.summary(&started));

    if metrics.has_failures() {
        warn!(
            "⚠ {} of {} files failed",
            report.summary.files_failed,
            report.files.len()
        );
        std::process::exit(1);
    }

    info!("✓ Conversion complete: {:?}", cli.output);
}
