use anyhow::{Context, Result};
use rayon::prelude::*;

use gridiron::calibration::{self, Metrics};
use gridiron::elo::{EloConfig, EloTracker};
use gridiron::features::{FormTracker, matchup_features};
use gridiron::games::GameRecord;
use gridiron::model::{LogisticModel, TrainConfig};
use gridiron::predict;
use gridiron::synthetic::SyntheticLeague;

const DEFAULT_RUNS: u64 = 20;
const DEFAULT_TRAIN_SEASONS: u16 = 2;
const RELIABILITY_BINS: usize = 10;

#[derive(Debug)]
struct RunReport {
    seed: u64,
    model: Metrics,
    baseline: Metrics,
    probs: Vec<f64>,
    outcomes: Vec<bool>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let runs = parse_u64_arg("--runs").unwrap_or(DEFAULT_RUNS).clamp(1, 500);
    let train_seasons = parse_u64_arg("--train-seasons")
        .map(|n| n.clamp(1, 20) as u16)
        .unwrap_or(DEFAULT_TRAIN_SEASONS);
    let base_seed = parse_u64_arg("--seed").unwrap_or(1);
    let cfg = EloConfig::from_env();

    let reports: Vec<RunReport> = (0..runs)
        .into_par_iter()
        .map(|i| run_one(base_seed + i, train_seasons, cfg))
        .collect::<Result<Vec<_>>>()?;

    println!(
        "Walk-forward backtest: {runs} leagues, {train_seasons} training season(s) each, k={} home_adv={}",
        cfg.k_factor, cfg.home_adv_pts
    );
    println!();
    println!("{:>6} {:>7} {:>8} {:>8} {:>8} | {:>8} {:>8} {:>8}",
        "seed", "games", "brier", "logloss", "acc", "e_brier", "e_lloss", "e_acc");
    for r in &reports {
        println!(
            "{:>6} {:>7} {:>8.4} {:>8.4} {:>8.3} | {:>8.4} {:>8.4} {:>8.3}",
            r.seed,
            r.model.samples,
            r.model.brier,
            r.model.log_loss,
            r.model.accuracy,
            r.baseline.brier,
            r.baseline.log_loss,
            r.baseline.accuracy,
        );
    }

    let mut all_probs = Vec::new();
    let mut all_outcomes = Vec::new();
    for r in &reports {
        all_probs.extend_from_slice(&r.probs);
        all_outcomes.extend_from_slice(&r.outcomes);
    }
    let total = calibration::evaluate_probs(&all_probs, &all_outcomes);
    let bins = calibration::calibration_bins(&all_probs, &all_outcomes, RELIABILITY_BINS);
    let ece = calibration::expected_calibration_error(&bins);

    println!();
    println!(
        "TOTAL  {} games  brier={:.4} log_loss={:.4} accuracy={:.3} ece={:.4}",
        total.samples, total.brier, total.log_loss, total.accuracy, ece
    );
    println!();
    println!("Reliability ({} buckets):", RELIABILITY_BINS);
    for b in &bins {
        if b.count == 0 {
            continue;
        }
        println!(
            "  [{:.1}-{:.1}) n={:<5} pred={:.3} actual={:.3}",
            b.bucket_start, b.bucket_end, b.count, b.avg_pred, b.actual_rate
        );
    }
    Ok(())
}

/// Trains on full seasons, then walks the evaluation season week by week:
/// predictions for week N use only weeks < N, and the trackers absorb each
/// week's real results before the next one.
fn run_one(seed: u64, train_seasons: u16, cfg: EloConfig) -> Result<RunReport> {
    let mut league = SyntheticLeague::new(seed);

    let mut train_games: Vec<GameRecord> = Vec::new();
    for offset in 0..train_seasons {
        train_games.extend(league.generate_season(2020 + offset));
    }
    let eval_games = league.generate_season(2020 + train_seasons);

    let set = predict::build_training_set(&train_games, cfg);
    let model = LogisticModel::fit(&set.rows, &set.labels, TrainConfig::default())
        .with_context(|| format!("fit model for seed {seed}"))?;

    let mut elo = EloTracker::new(cfg);
    let mut forms = FormTracker::new();
    for game in &train_games {
        elo.record_game(game);
        forms.record_game(game);
    }

    let mut probs = Vec::new();
    let mut baseline_probs = Vec::new();
    let mut outcomes = Vec::new();

    let max_week = eval_games.iter().map(|g| g.week).max().unwrap_or(0);
    for week in 1..=max_week {
        let week_games: Vec<&GameRecord> =
            eval_games.iter().filter(|g| g.week == week).collect();
        for game in &week_games {
            let Some(home_win) = game.home_win() else {
                continue;
            };
            let row = matchup_features(&elo, &forms, &game.home_team, &game.away_team);
            probs.push(model.predict_proba(&row));
            baseline_probs.push(elo.expected_home_score(&game.home_team, &game.away_team));
            outcomes.push(home_win);
        }
        for game in week_games {
            elo.record_game(game);
            forms.record_game(game);
        }
    }

    Ok(RunReport {
        seed,
        model: calibration::evaluate_probs(&probs, &outcomes),
        baseline: calibration::evaluate_probs(&baseline_probs, &outcomes),
        probs,
        outcomes,
    })
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.trim().parse::<u64>().ok())
}
