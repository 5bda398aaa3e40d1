use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dynmix::*;

fn bench_mix_sources(c: &mut Criterion) {
    let len = 40000;
    let a: Vec<f32> = (0..len).map(|i| (i as f32 * 0.013).sin() * 0.4).collect();
    let b: Vec<f32> = (0..len).map(|i| (i as f32 * 0.029).cos() * 0.6).collect();
    let gains = [0.8, -0.8];

    c.bench_function("mix_sources_two_speakers", |bench| {
        bench.iter(|| {
            let out = mix_sources(black_box(vec![a.clone(), b.clone()]), &gains, 0.9).unwrap();
            black_box(out);
        });
    });
}

fn bench_speaker_draw(c: &mut Criterion) {
    let weights: Vec<f64> = (1..=101).map(|n| n as f64).collect();
    let mut rng = fastrand::Rng::with_seed(0);

    c.bench_function("weighted_choice_101_speakers", |bench| {
        bench.iter(|| {
            let picked = weighted_choice_without_replacement(&mut rng, black_box(&weights), 2).unwrap();
            black_box(picked);
        });
    });
}

criterion_group!(benches, bench_mix_sources, bench_speaker_draw);
criterion_main!(benches);
