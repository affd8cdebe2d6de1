//! Layer scan benchmarks
//!
//! Run with: cargo bench

use colorswap::{resolve, LayerModel, LineSequence, SwapMode, TargetSpec};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A print of `layers` layers with `moves` extrusion moves each.
fn synthetic_gcode(layers: usize, moves: usize) -> LineSequence {
    let mut text = String::from("; estimated printing time (normal mode) = 3h 12m 5s\nG28\nG90\n");
    for layer in 1..=layers {
        text.push_str(&format!(";LAYER:{}\n", layer - 1));
        text.push_str(&format!("G1 Z{:.2} F3000\n", layer as f64 * 0.2));
        for i in 0..moves {
            text.push_str(&format!("G1 X{} Y{} E{:.4}\n", i % 200, (i * 7) % 200, i as f64 * 0.01));
        }
    }
    LineSequence::from_text(&text)
}

fn layer_scan_benchmark(c: &mut Criterion) {
    let lines = synthetic_gcode(500, 200);
    c.bench_function("layer_model_build_100k_lines", |b| {
        b.iter(|| LayerModel::build(black_box(&lines)))
    });
}

fn resolve_and_splice_benchmark(c: &mut Criterion) {
    let lines = synthetic_gcode(500, 200);
    let model = LayerModel::build(&lines);
    let target = TargetSpec::height(75.0).unwrap();
    c.bench_function("resolve_and_splice", |b| {
        b.iter(|| {
            let offset = resolve(model.markers(), black_box(&target)).offset().unwrap();
            lines.spliced(offset, SwapMode::Manual.lines()).unwrap()
        })
    });
}

criterion_group!(benches, layer_scan_benchmark, resolve_and_splice_benchmark);
criterion_main!(benches);
