use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use glowstat::{
    animation::{allocate, AnimationTiming, CircularField},
    dispatcher::{Dispatcher, LedSink},
    models::default_channels,
    readings::{ReadingSnapshot, Readings},
};

struct NullSink;

impl LedSink for NullSink {
    fn write(&mut self, _index: usize, _brightness: u8) {}

    fn flush(&mut self) {}
}

fn snapshot(previous: f64, current: f64) -> ReadingSnapshot {
    let readings = |value: f64| -> Readings {
        default_channels()
            .into_iter()
            .map(|channel| (channel.name, value))
            .collect()
    };

    ReadingSnapshot::default()
        .advance(readings(previous))
        .advance(readings(current))
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("allocate 360 slots", |b| {
        b.iter(|| allocate(360, black_box(0.37)))
    });

    c.bench_function("generate and rotate field", |b| {
        b.iter(|| {
            let mut field = CircularField::generate(black_box(0.37), 42).unwrap();
            field.rotate(7);
            field.sample(3)
        })
    });

    let timing = AnimationTiming::default();
    let steady = snapshot(0.4, 0.4);
    let changing = snapshot(0.4, 0.6);

    c.bench_function(&format!("{} channels, steady frame", default_channels().len()), |b| {
        let mut dispatcher = Dispatcher::new(&default_channels(), &timing);
        b.iter(|| dispatcher.render_frame(&steady, &mut NullSink))
    });

    c.bench_function(&format!("{} channels, changing frame", default_channels().len()), |b| {
        let mut dispatcher = Dispatcher::new(&default_channels(), &timing);
        b.iter(|| dispatcher.render_frame(&changing, &mut NullSink))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
