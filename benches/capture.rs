//! Benchmarks for frame rasterization and GIF encoding.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use orbit_capture::{
    animation::{EncoderSettings, FrameOptions, GifRecorder},
    compute::SoftwareRasterizer,
    schema::{ExportConfig, SceneKind},
};

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");

    for size in [100, 200, 400] {
        let config = ExportConfig {
            width: size,
            height: size,
            ..ExportConfig::default()
        };
        let options = config.snapshot_options();
        let scene = SceneKind::FingerScene.spec();
        let mut rasterizer = SoftwareRasterizer::new();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                let mut position = 0.0;
                b.iter(|| {
                    position = (position + 5.0) % 360.0;
                    let frame = rasterizer
                        .render(black_box(&scene), position, &options)
                        .unwrap();
                    black_box(frame.len());
                });
            },
        );
    }

    group.finish();
}

fn bench_encode_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_cycle");
    group.sample_size(10);

    for workers in [1, 2, 4] {
        let mut config = ExportConfig {
            width: 100,
            height: 100,
            steps: 24,
            ..ExportConfig::default()
        };
        config.encoder.workers = workers;

        let scene = SceneKind::SpinningEmojis.spec();
        let options = config.snapshot_options();
        let mut rasterizer = SoftwareRasterizer::new();
        let frames: Vec<_> = (0..config.frame_count())
            .map(|step| {
                rasterizer
                    .render(&scene, config.position_for_step(step), &options)
                    .unwrap()
                    .clone()
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_workers", workers)),
            &workers,
            |b, _| {
                b.iter(|| {
                    let mut recorder =
                        GifRecorder::new(EncoderSettings::from_export(&config)).unwrap();
                    for frame in &frames {
                        recorder
                            .add_frame(frame, FrameOptions { delay_ms: config.frame_delay_ms })
                            .unwrap();
                    }
                    let gif = recorder.render().unwrap().wait(|_| {}).unwrap();
                    black_box(gif.bytes.len());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rasterize, bench_encode_cycle);
criterion_main!(benches);
