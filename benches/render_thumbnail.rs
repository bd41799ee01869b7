//! Local thumbnail render benchmarks.
//! Run: cargo bench

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use simg_thumbs::event::{EventDescriptor, RawEventFields};
use simg_thumbs::theme::Theme;
use simg_thumbs::thumbnail::render_local_svg;

fn descriptor(title: &str, tags: &[&str]) -> EventDescriptor {
    EventDescriptor::from_raw(
        RawEventFields {
            title: title.to_owned(),
            date: Some("2026-03-06".to_owned()),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            ..RawEventFields::default()
        },
        NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"),
    )
}

fn bench_local_render(c: &mut Criterion) {
    let events = [
        descriptor("Lecture 5 - Intro to CUDA Programming", &["cuda", "gpu"]),
        descriptor("Python for Scientists", &["python"]),
        descriptor("Diffusion Models for Medical Imaging", &["neural", "diffusion"]),
        descriptor("Memory Coalescing Patterns", &[]),
        descriptor("Research Group Meeting", &[]),
    ];

    let mut group = c.benchmark_group("render_thumbnail");
    group.sample_size(50);

    for (event, theme) in events.iter().zip(Theme::ALL) {
        group.bench_function(format!("local_svg_{}", theme.keyword()), |b| {
            b.iter(|| black_box(render_local_svg(black_box(event))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_local_render);
criterion_main!(benches);
