use capcode::preprocess::{PreprocessConfig, preprocess};
use capcode::utils::geometry::rotate_expand;
use capcode::utils::grayscale::{rgb_to_grayscale, rgb_to_grayscale_parallel};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

fn synthetic_cap(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        // Gold background with dark dotted rows
        if y % 24 < 3 && x % 6 < 3 {
            Rgb([35, 30, 20])
        } else {
            Rgb([200, 170, 90])
        }
    });
    DynamicImage::ImageRgb8(img)
}

fn bench_grayscale(c: &mut Criterion) {
    let image = vec![128u8; 1920 * 1080 * 3];
    c.bench_function("rgb_to_grayscale_1920x1080", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&image), black_box(1920), black_box(1080)))
    });
    c.bench_function("rgb_to_grayscale_parallel_1920x1080", |b| {
        b.iter(|| rgb_to_grayscale_parallel(black_box(&image), black_box(1920), black_box(1080)))
    });
}

fn bench_presets(c: &mut Criterion) {
    let image = synthetic_cap(640, 480);
    for (name, cfg) in [
        ("standard", PreprocessConfig::standard()),
        ("dot_matrix", PreprocessConfig::dot_matrix()),
        ("glare", PreprocessConfig::glare()),
        ("binarized", PreprocessConfig::binarized()),
    ] {
        c.bench_function(&format!("preprocess_{name}_640x480"), |b| {
            b.iter(|| preprocess(black_box(&image), black_box(&cfg)))
        });
    }
}

fn bench_rotation(c: &mut Criterion) {
    let image = synthetic_cap(640, 480);
    c.bench_function("rotate_90_640x480", |b| {
        b.iter(|| rotate_expand(black_box(&image), 90.0, [255, 255, 255]))
    });
    c.bench_function("rotate_30_640x480", |b| {
        b.iter(|| rotate_expand(black_box(&image), 30.0, [255, 255, 255]))
    });
}

criterion_group!(benches, bench_grayscale, bench_presets, bench_rotation);
criterion_main!(benches);
