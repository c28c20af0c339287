//! Criterion benchmarks for the block-processing hot path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cadenza_effects::{Chorus, Distortion, EffectKind, EffectSlot, Reverb};
use cadenza_engine::pattern::{Pattern, PatternNote};
use cadenza_engine::{Engine, EngineConfig};

fn build_session(tracks: usize, effects_per_track: usize) -> Engine {
    let (mut engine, _controller) = Engine::new(EngineConfig {
        sample_rate: 48000.0,
        max_block: 512,
    });

    for i in 0..tracks {
        let t = engine.add_track(&format!("track {i}")).unwrap();

        let mut pattern = Pattern::new(4.0);
        for step in 0..8 {
            pattern
                .add(PatternNote::new(
                    48 + (i as u8 * 5 + step as u8 * 3) % 24,
                    0.8,
                    step as f32 * 0.5,
                    0.4,
                ))
                .unwrap();
        }
        engine.set_pattern(t, Some(pattern)).unwrap();

        for e in 0..effects_per_track {
            let slot = match e % 3 {
                0 => EffectSlot::new(EffectKind::Distortion(Distortion::new(48000.0))),
                1 => EffectSlot::new(EffectKind::Chorus(Chorus::new(48000.0, 4))),
                _ => EffectSlot::new(EffectKind::Reverb(Reverb::new(48000.0))),
            };
            engine.push_effect(Some(t), slot).unwrap();
        }
    }

    engine
        .push_effect(None, EffectSlot::new(EffectKind::Reverb(Reverb::new(48000.0))))
        .unwrap();
    engine.play();
    engine
}

fn bench_process_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_block");

    for (tracks, effects) in [(4usize, 1usize), (16, 2), (32, 3)] {
        let mut engine = build_session(tracks, effects);
        let mut left = [0.0f32; 512];
        let mut right = [0.0f32; 512];

        group.bench_function(format!("{tracks}tr_{effects}fx"), |b| {
            b.iter(|| {
                engine.process_block(black_box(&mut left), black_box(&mut right));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process_block);
criterion_main!(benches);
