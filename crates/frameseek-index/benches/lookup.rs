//! Benchmark frame-number and timestamp lookups with varying segment counts.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frameseek_common::FormatKind;
use frameseek_index::{FrameDecoder, IndexConfig, SegmentedFrameIndex};
use frameseek_media::{AviFormat, FrameTable, Segment};

/// `segments` one-minute segments at 25 fps.
fn make_index(segments: usize) -> SegmentedFrameIndex<AviFormat> {
    let timestamps: Vec<i64> = (0..1500).map(|i| i * 40).collect();
    let segments = (0..segments)
        .map(|i| {
            Segment::new(
                format!("seg_{i:05}.avi"),
                FormatKind::Avi,
                25,
                FrameTable::from_timestamps(&timestamps),
            )
        })
        .collect();
    SegmentedFrameIndex::from_segments(AviFormat::default(), IndexConfig::default(), segments)
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    // 1 hour: 60 segments, 90k frames.
    let hour = make_index(60);
    let last = hour.frame_count() - 1;
    group.bench_function("1h_seek_frame", |b| {
        let mut index = hour.clone();
        b.iter(|| index.seek_to_frame(black_box(last / 3)));
    });
    group.bench_function("1h_frame_for_time", |b| {
        b.iter(|| hour.frame_number_for_time(black_box(1_234_567)));
    });

    // 1 day: 1440 segments, ~2.2M frames.
    let day = make_index(1440);
    group.bench_function("24h_frame_for_time", |b| {
        b.iter(|| day.frame_number_for_time(black_box(43_210_987)));
    });

    group.bench_function("1h_iterate_all", |b| {
        b.iter(|| hour.frames().count());
    });

    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
