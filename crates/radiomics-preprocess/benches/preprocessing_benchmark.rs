// Preprocessing benchmark - resize + crop + normalize, then melt for both layouts
//
// Run with: cargo bench -p radiomics-preprocess --bench preprocessing_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{ImageBuffer, Luma};
use ndarray::Array2;
use radiomics_preprocess::resize::resize;
use radiomics_preprocess::{
    array_from_luma, melt, preprocess, preprocess_batch, ConvolutionMode, ImageSettings,
    IndexDim, Normalization, ResizeFilter,
};

/// Synthetic 16-bit CT-like slice (Hounsfield ramp stored with a +1024 offset)
fn test_buffer(size: u32) -> ImageBuffer<Luma<u16>, Vec<u16>> {
    ImageBuffer::from_fn(size, size, |x, y| Luma([((x + y) % 1400 + 24) as u16]))
}

fn test_slice(size: u32) -> Array2<f32> {
    array_from_luma(&test_buffer(size)).mapv(|v| v - 1024.0)
}

fn settings(target: usize) -> ImageSettings {
    ImageSettings::builder()
        .width(target)
        .height(target)
        .normalization(Normalization::MinMax)
        .min_limit(-1000.0)
        .max_limit(400.0)
        .index_dim(IndexDim::First)
        .build()
        .expect("benchmark settings are valid")
}

/// Benchmark single-image preprocessing at different target resolutions
fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");

    // 512x512 source (typical CT slice) to common autoencoder inputs
    let slice = test_slice(512);
    let targets = vec![(64, "64x64"), (128, "128x128"), (256, "256x256")];

    for (target, name) in targets {
        let settings = settings(target);
        group.bench_with_input(BenchmarkId::new("single", name), &slice, |b, img| {
            b.iter(|| {
                let result = preprocess(black_box(img), &settings).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark copying 16-bit buffers into arrays
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    let buffer = test_buffer(512);

    group.bench_function("luma16_512", |b| {
        b.iter(|| {
            let array = array_from_luma(black_box(&buffer));
            black_box(array);
        });
    });

    group.finish();
}

/// Benchmark resize filters
fn bench_resize_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_filters");
    let slice = test_slice(512);

    for (filter, name) in [
        (ResizeFilter::Nearest, "nearest_512to128"),
        (ResizeFilter::Bilinear, "bilinear_512to128"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let resized = resize(black_box(slice.view()), 128, 128, filter);
                black_box(resized);
            });
        });
    }

    group.finish();
}

/// Benchmark batch preprocessing followed by melting
fn bench_batch_melt(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_melt");
    let settings = settings(64);
    let slices: Vec<Array2<f32>> = (0..32).map(|_| test_slice(256)).collect();

    group.bench_function("preprocess_batch_32", |b| {
        b.iter(|| {
            let processed = preprocess_batch(black_box(&slices), &settings).unwrap();
            black_box(processed);
        });
    });

    let processed = preprocess_batch(&slices, &settings).unwrap();
    for mode in [ConvolutionMode::Flat, ConvolutionMode::Convolutional] {
        group.bench_with_input(
            BenchmarkId::new("melt_32", mode.to_string()),
            &processed,
            |b, images| {
                b.iter(|| {
                    let tensor = melt(black_box(images), &settings, mode).unwrap();
                    black_box(tensor);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_preprocessing,
    bench_conversion,
    bench_resize_filters,
    bench_batch_melt
);
criterion_main!(benches);
