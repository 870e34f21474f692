//! Performance benchmarks for the view core
//!
//! These benchmarks cover the per-frame hot paths: routing damage to outputs,
//! draining it for a repaint and hit testing the stack.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use wayview::headless::{HeadlessSeat, HeadlessXdgToplevel, RecordingPolicy};
use wayview::{Compositor, CoreConfig, Rectangle, Region, Size, SurfaceId, ViewSurface, WindowId};

/// Compositor with a 2x2 output grid and `count` views spread across it
fn populated(count: u64) -> (Compositor, Vec<WindowId>) {
    let mut compositor = Compositor::new(
        CoreConfig::default(),
        Box::new(HeadlessSeat::new()),
        Box::new(RecordingPolicy::new()),
    )
    .unwrap();

    for (name, x, y) in [("TL", 0, 0), ("TR", 1920, 0), ("BL", 0, 1080), ("BR", 1920, 1080)] {
        compositor.add_output(name, Rectangle::new(x, y, 1920, 1080));
    }

    let mut ids = Vec::new();
    for i in 0..count {
        let xdg = HeadlessXdgToplevel::new(SurfaceId(i + 1), Size::new(400, 300));
        let id = compositor.new_toplevel(ViewSurface::xdg(xdg.clone())).unwrap();
        compositor.map(id).unwrap();

        let geo = Rectangle::new((i as i32 * 97) % 3500, (i as i32 * 61) % 1900, 400, 300);
        let token = compositor.request_geometry(id, geo).unwrap();
        xdg.ack_configure(token.0);
        xdg.commit(geo.size(), None);
        compositor.commit(id).unwrap();
        ids.push(id);
    }

    (compositor, ids)
}

fn drain_all(compositor: &mut Compositor) {
    let outputs: Vec<_> = compositor.outputs().outputs().map(|o| o.id()).collect();
    for output in outputs {
        black_box(compositor.drain_damage(output).unwrap());
    }
}

/// Benchmark damage propagation from views to outputs
fn bench_damage_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("damage_propagation");

    let region: Region = (0..8)
        .map(|i| Rectangle::new(i * 40, i * 30, 32, 24))
        .collect();

    for view_count in [10, 50, 100].iter() {
        group.bench_with_input(
            format!("region_damage_{}_views", view_count),
            view_count,
            |b, &view_count| {
                b.iter_batched(
                    || populated(view_count),
                    |(mut compositor, ids)| {
                        for id in ids {
                            compositor.damage(id, Some(black_box(&region))).unwrap();
                        }
                        drain_all(&mut compositor);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.bench_function("whole_damage_straddling_view", |b| {
        let (mut compositor, _) = populated(0);
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), Size::new(400, 300));
        let id = compositor.new_toplevel(ViewSurface::xdg(xdg.clone())).unwrap();
        compositor.map(id).unwrap();
        let token = compositor
            .request_geometry(id, Rectangle::new(1800, 1000, 400, 300))
            .unwrap();
        xdg.ack_configure(token.0);
        xdg.commit(Size::new(400, 300), None);
        compositor.commit(id).unwrap();

        b.iter(|| {
            compositor.damage(black_box(id), None).unwrap();
            drain_all(&mut compositor);
        });
    });

    group.finish();
}

/// Benchmark region merging on drain
fn bench_region_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_merge");

    for rect_count in [4, 16, 64].iter() {
        group.bench_with_input(
            format!("merge_{}_rects", rect_count),
            rect_count,
            |b, &rect_count| {
                b.iter_batched(
                    || {
                        (0..rect_count)
                            .map(|i| Rectangle::new((i * 37) % 1800, (i * 23) % 1000, 64, 48))
                            .collect::<Region>()
                    },
                    |mut region| {
                        region.merge(10);
                        black_box(region);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark stacking-order hit testing
fn bench_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_test");

    for view_count in [10, 100].iter() {
        let (compositor, _) = populated(*view_count);
        group.bench_function(format!("hit_test_{}_views", view_count), |b| {
            b.iter(|| {
                black_box(compositor.hit_test(black_box(2000), black_box(1000)));
                black_box(compositor.hit_test(black_box(3800), black_box(2150)));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_damage_propagation,
    bench_region_merge,
    bench_hit_test
);

criterion_main!(benches);
