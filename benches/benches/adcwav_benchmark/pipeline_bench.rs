//! Бенчмарки декодирования и нормировки
//!
//! Запуск: cargo bench -p adcwav-benchmark

use std::{hint::black_box, io::Cursor};

use adcwav_core::{
    convert, AmplitudeNormalizer, ConversionOptions, DataBlockExt, SampleStreamReader,
    SessionHeaderExt, SignalStatistics, NOMINAL_SAMPLES_PER_BLOCK,
};
use adcwav_types::{DataBlock, SampleWidth, SessionHeader};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Синтетический лог: `blocks` полных блоков синусоиды вокруг 512.
fn synth_log(blocks: usize) -> Vec<u8> {
    let header = SessionHeader::new(16_000_000, 16_000_000, 500);
    let mut raw = header.serialize().unwrap().to_vec();
    let per_block = NOMINAL_SAMPLES_PER_BLOCK as usize;

    for b in 0..blocks {
        let samples: Vec<u16> = (0..per_block)
            .map(|i| {
                let t = (b * per_block + i) as f64 / 32_000.0;
                (512.0 + 300.0 * (2.0 * std::f64::consts::PI * 1_000.0 * t).sin()) as u16
            })
            .collect();

        raw.extend(
            DataBlock::new(samples)
                .serialize(SampleWidth::Bits16)
                .unwrap(),
        );
    }
    raw
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for blocks in [100usize, 1_000, 10_000] {
        let raw = synth_log(blocks);
        group.throughput(Throughput::Bytes(raw.len() as u64));

        group.bench_with_input(BenchmarkId::new("read_samples", blocks), &raw, |b, raw| {
            b.iter(|| {
                let stream = SampleStreamReader::new(Cursor::new(black_box(raw.as_slice())))
                    .unwrap()
                    .read_samples(u64::MAX)
                    .unwrap();
                black_box(stream.samples.len())
            });
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let raw = synth_log(10_000);
    let samples = SampleStreamReader::new(Cursor::new(raw.as_slice()))
        .unwrap()
        .read_samples(u64::MAX)
        .unwrap()
        .samples;

    group.throughput(Throughput::Elements(samples.len() as u64));

    group.bench_function("statistics", |b| {
        b.iter(|| black_box(SignalStatistics::compute(black_box(&samples)).unwrap()));
    });

    let stats = SignalStatistics::compute(&samples).unwrap();
    let normalizer = AmplitudeNormalizer::default();

    group.bench_function("center_and_scale", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&samples), &stats).unwrap()));
    });

    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let raw = synth_log(2_000);
    let options = ConversionOptions::default();

    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("bin_to_wav_in_memory", |b| {
        b.iter(|| {
            let mut wav = Cursor::new(Vec::with_capacity(raw.len()));
            let report = convert(Cursor::new(raw.as_slice()), &mut wav, &options).unwrap();
            black_box(report.frames_written)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_normalize, bench_convert);
criterion_main!(benches);
