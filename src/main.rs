use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use gridiron::calibration;
use gridiron::elo::EloConfig;
use gridiron::games::GameRecord;
use gridiron::model::{LogisticModel, TrainConfig};
use gridiron::predict::{self, Matchup};
use gridiron::store;
use gridiron::synthetic::SyntheticLeague;
use gridiron::teams;

const DEFAULT_SEED: u64 = 2024;
const DEFAULT_TRAIN_SEASONS: u16 = 3;
const MODEL_FILE: &str = "win_model.json";

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    match std::env::args().nth(1).as_deref() {
        Some("simulate") => cmd_simulate(),
        Some("predict") => cmd_predict(),
        Some("update-scores") => cmd_update_scores(),
        Some("stats") => cmd_stats(),
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            Err(anyhow!("unknown command: {other}"))
        }
    }
}

fn print_usage() {
    println!("gridiron - NFL Elo + win-probability toolkit");
    println!();
    println!("USAGE:");
    println!("  gridiron simulate [--seed N] [--seasons N]");
    println!("  gridiron predict --season S --week W --file matchups.json");
    println!("  gridiron update-scores --season S --week W --file games.json");
    println!("  gridiron stats --season S");
    println!();
    println!("ENV: NFL_DB_PATH, NFL_HOME_ADV, GRIDIRON_SEED, GRIDIRON_MODEL_PATH");
}

/// Generates synthetic seasons, trains the model, prints ratings and
/// in-sample metrics, and saves the model for `predict`.
fn cmd_simulate() -> Result<()> {
    let seed = parse_arg::<u64>("--seed")
        .or_else(|| env_u64("GRIDIRON_SEED"))
        .unwrap_or(DEFAULT_SEED);
    let seasons = parse_arg::<u16>("--seasons")
        .map(|n| n.clamp(1, 50))
        .unwrap_or(DEFAULT_TRAIN_SEASONS);

    let cfg = EloConfig::from_env();
    let mut league = SyntheticLeague::new(seed);
    let mut games: Vec<GameRecord> = Vec::new();
    for offset in 0..seasons {
        games.extend(league.generate_season(2020 + offset));
    }

    let set = predict::build_training_set(&games, cfg);
    let model = LogisticModel::fit(&set.rows, &set.labels, TrainConfig::default())?;

    let probs: Vec<f64> = set.rows.iter().map(|r| model.predict_proba(r)).collect();
    let metrics = calibration::evaluate_probs(&probs, &set.labels);
    let baseline = calibration::evaluate_probs(&set.baseline, &set.labels);

    let (elo, _) = predict::trackers_from_history(&games, cfg);

    println!(
        "Trained on {} games across {} synthetic seasons (seed {seed})",
        games.len(),
        seasons
    );
    println!(
        "Model    brier={:.4} log_loss={:.4} accuracy={:.3}",
        metrics.brier, metrics.log_loss, metrics.accuracy
    );
    println!(
        "Elo-only brier={:.4} log_loss={:.4} accuracy={:.3}",
        baseline.brier, baseline.log_loss, baseline.accuracy
    );
    println!();
    println!("Top teams by rating:");
    for (team, rating) in elo.ratings().into_iter().take(10) {
        let name = teams::team_name(&team).unwrap_or("?");
        println!("  {team:<4} {rating:7.1}  {name}");
    }

    let path = model_path()?;
    model.save(&path)?;
    println!();
    println!("Model saved to {}", path.display());
    Ok(())
}

/// Predicts one week of matchups from stored results + the saved model,
/// upserts the prediction rows, and prints them.
fn cmd_predict() -> Result<()> {
    let season: u16 = parse_arg("--season").context("--season is required (0-65535)")?;
    let week: u8 = parse_arg("--week").context("--week is required (0-255)")?;
    let file = parse_string_arg("--file").context("--file matchups.json is required")?;

    let raw = fs::read_to_string(&file).with_context(|| format!("read matchups file {file}"))?;
    let mut matchups: Vec<Matchup> = serde_json::from_str(&raw).context("invalid matchups json")?;
    if matchups.is_empty() {
        return Err(anyhow!("matchups file contains no games"));
    }
    for m in &mut matchups {
        if !teams::is_known_team(&m.home_team) || !teams::is_known_team(&m.away_team) {
            return Err(anyhow!("unknown team in matchup {} @ {}", m.away_team, m.home_team));
        }
        // Canonical ids, so feature lookups hit the same keys as stored results.
        m.home_team = teams::normalize_abbr(&m.home_team);
        m.away_team = teams::normalize_abbr(&m.away_team);
    }

    let cfg = EloConfig::from_env();
    let model = load_or_train_model(cfg)?;

    let db_path = store::default_db_path().context("unable to resolve sqlite path")?;
    let mut conn = store::open_db(&db_path)?;

    // Ratings come from every stored result of the season before this week;
    // the classifier itself is trained on synthetic data only.
    let history: Vec<GameRecord> = store::load_results(&conn, season, None)?
        .into_iter()
        .filter(|g| g.week < week)
        .collect();
    let (elo, forms) = predict::trackers_from_history(&history, cfg);

    let predictions = predict::predict_week(&elo, &forms, &model, season, week, &matchups);
    let written = store::upsert_predictions(&mut conn, &predictions)?;

    println!("Week {week}, {season} ({written} picks stored in {})", db_path.display());
    for p in &predictions {
        println!(
            "  {:<4} @ {:<4} -> {:<4} ({:.1}%)",
            p.away_team,
            p.home_team,
            p.predicted_winner,
            p.confidence * 100.0
        );
    }
    Ok(())
}

fn cmd_update_scores() -> Result<()> {
    let season: u16 = parse_arg("--season").context("--season is required (0-65535)")?;
    let week: u8 = parse_arg("--week").context("--week is required (0-255)")?;
    let file = parse_string_arg("--file").context("--file games.json is required")?;

    let raw = fs::read_to_string(&file).with_context(|| format!("read games file {file}"))?;
    let mut games: Vec<GameRecord> = serde_json::from_str(&raw).context("invalid games json")?;
    for g in &mut games {
        if !teams::is_known_team(&g.home_team) || !teams::is_known_team(&g.away_team) {
            return Err(anyhow!("unknown team in game {} @ {}", g.away_team, g.home_team));
        }
        g.home_team = teams::normalize_abbr(&g.home_team);
        g.away_team = teams::normalize_abbr(&g.away_team);
    }

    let db_path = store::default_db_path().context("unable to resolve sqlite path")?;
    let mut conn = store::open_db(&db_path)?;
    let written = store::update_scores(&mut conn, season, week, &games)?;
    if written < games.len() {
        println!(
            "Skipped {} games outside season {season} week {week}",
            games.len() - written
        );
    }
    println!("Recorded {written} final scores for week {week}, {season}");
    Ok(())
}

fn cmd_stats() -> Result<()> {
    let season: u16 = parse_arg("--season").context("--season is required (0-65535)")?;

    let db_path = store::default_db_path().context("unable to resolve sqlite path")?;
    let conn = store::open_db(&db_path)?;
    let summary = store::accuracy_summary(&conn, season)?;

    if summary.graded == 0 {
        println!("No graded predictions for {season} yet");
        return Ok(());
    }
    println!("Season {season}: {}/{} correct ({:.1}%)",
        summary.correct,
        summary.graded,
        summary.accuracy() * 100.0
    );
    println!(
        "Avg confidence when correct {:.1}%, when wrong {:.1}%",
        summary.avg_conf_correct * 100.0,
        summary.avg_conf_incorrect * 100.0
    );
    Ok(())
}

fn load_or_train_model(cfg: EloConfig) -> Result<LogisticModel> {
    let path = model_path()?;
    if path.exists() {
        return LogisticModel::load(&path);
    }

    let seed = env_u64("GRIDIRON_SEED").unwrap_or(DEFAULT_SEED);
    let mut league = SyntheticLeague::new(seed);
    let mut games = Vec::new();
    for offset in 0..DEFAULT_TRAIN_SEASONS {
        games.extend(league.generate_season(2020 + offset));
    }
    let set = predict::build_training_set(&games, cfg);
    let model = LogisticModel::fit(&set.rows, &set.labels, TrainConfig::default())?;
    model.save(&path)?;
    Ok(model)
}

fn model_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("GRIDIRON_MODEL_PATH")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    store::app_cache_dir()
        .map(|dir| dir.join(MODEL_FILE))
        .context("unable to resolve model path")
}

fn parse_string_arg(name: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    parse_string_arg_from(&args, name)
}

fn parse_string_arg_from(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Parses into the target integer type directly, so out-of-range values
/// (`--week 300`) are rejected instead of wrapping.
fn parse_arg<T: std::str::FromStr>(name: &str) -> Option<T> {
    let args: Vec<String> = std::env::args().collect();
    parse_arg_from(&args, name)
}

fn parse_arg_from<T: std::str::FromStr>(args: &[String], name: &str) -> Option<T> {
    parse_string_arg_from(args, name).and_then(|v| v.trim().parse::<T>().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<u64>().ok())
}
