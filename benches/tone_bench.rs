//! Benchmarks for the tone synthesizer render path.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use piano_kit::dsp::{DecayEnvelope, SineOscillator};
use piano_kit::tone::{ToneBank, ToneMessage};

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

const SAMPLE_RATE: f32 = 48_000.0;

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut osc = SineOscillator::new(440.0);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer), black_box(SAMPLE_RATE)))
        });

        // Very long decay so it stays active for the whole run
        let mut env = DecayEnvelope::new(0.3, 0.01, 3600.0);
        env.trigger(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("decay", size), &size, |b, _| {
            b.iter(|| {
                for s in buffer.iter_mut() {
                    *s = env.next_sample();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}

fn bench_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("tone_bank");

    for voices in [1usize, 8, 16] {
        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        // Fresh chord each iteration so voices are sounding
                        let mut queue = VecDeque::new();
                        for v in 0..voices {
                            queue.push_back(ToneMessage::Trigger {
                                frequency: 261.63 * (1.0 + v as f32 * 0.1),
                            });
                        }
                        let mut bank = ToneBank::new(SAMPLE_RATE, voices, queue);
                        bank.render_block(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_primitives, bench_bank);
criterion_main!(benches);
