use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use gridiron::elo::{EloConfig, EloTracker};
use gridiron::features::matchup_features;
use gridiron::model::{LogisticModel, TrainConfig};
use gridiron::predict;
use gridiron::synthetic::SyntheticLeague;

fn bench_elo_season_replay(c: &mut Criterion) {
    let mut league = SyntheticLeague::new(1);
    let games = league.generate_season(2024);

    c.bench_function("elo_season_replay", |b| {
        b.iter(|| {
            let mut elo = EloTracker::new(EloConfig::default());
            elo.process_games(black_box(&games));
            black_box(elo.rating("KC"));
        })
    });
}

fn bench_training_set_build(c: &mut Criterion) {
    let mut league = SyntheticLeague::new(2);
    let mut games = Vec::new();
    for season in 2020..2023 {
        games.extend(league.generate_season(season));
    }

    c.bench_function("training_set_build", |b| {
        b.iter(|| {
            let set = predict::build_training_set(black_box(&games), EloConfig::default());
            black_box(set.rows.len());
        })
    });
}

fn bench_model_inference(c: &mut Criterion) {
    let mut league = SyntheticLeague::new(3);
    let games = league.generate_season(2024);
    let set = predict::build_training_set(&games, EloConfig::default());
    let model = LogisticModel::fit(&set.rows, &set.labels, TrainConfig::default()).unwrap();
    let (elo, forms) = predict::trackers_from_history(&games, EloConfig::default());

    c.bench_function("model_inference", |b| {
        b.iter(|| {
            let row = matchup_features(&elo, &forms, black_box("KC"), black_box("BUF"));
            black_box(model.predict_proba(&row));
        })
    });
}

criterion_group!(
    benches,
    bench_elo_season_replay,
    bench_training_set_build,
    bench_model_inference
);
criterion_main!(benches);
