use serde::{Deserialize, Serialize};

use crate::elo::{EloConfig, EloTracker};
use crate::features::{FeatureRow, FormTracker, matchup_features};
use crate::games::{GameRecord, PredictionRecord};
use crate::model::LogisticModel;

/// One scheduled matchup to predict. The optional injury note is free text
/// carried straight through to the stored prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub injury_note: Option<String>,
}

/// Leak-free training rows built by replaying games in order: each row is
/// snapshotted before its game updates the trackers.
#[derive(Debug, Default)]
pub struct TrainingSet {
    pub rows: Vec<FeatureRow>,
    pub labels: Vec<bool>,
    /// Elo-only expected home score per row, for baseline comparison.
    pub baseline: Vec<f64>,
}

pub fn build_training_set(games: &[GameRecord], cfg: EloConfig) -> TrainingSet {
    let mut elo = EloTracker::new(cfg);
    let mut forms = FormTracker::new();
    let mut set = TrainingSet::default();

    for game in games {
        // Ties carry no binary label; they still update the trackers below.
        if let Some(home_win) = game.home_win() {
            set.rows
                .push(matchup_features(&elo, &forms, &game.home_team, &game.away_team));
            set.labels.push(home_win);
            set.baseline
                .push(elo.expected_home_score(&game.home_team, &game.away_team));
        }
        elo.record_game(game);
        forms.record_game(game);
    }
    set
}

/// Replays `history` into fresh trackers and returns them ready for
/// prediction of the next unseen week.
pub fn trackers_from_history(games: &[GameRecord], cfg: EloConfig) -> (EloTracker, FormTracker) {
    let mut elo = EloTracker::new(cfg);
    let mut forms = FormTracker::new();
    for game in games {
        elo.record_game(game);
        forms.record_game(game);
    }
    (elo, forms)
}

pub fn predict_week(
    elo: &EloTracker,
    forms: &FormTracker,
    model: &LogisticModel,
    season: u16,
    week: u8,
    matchups: &[Matchup],
) -> Vec<PredictionRecord> {
    matchups
        .iter()
        .map(|m| {
            let row = matchup_features(elo, forms, &m.home_team, &m.away_team);
            let p_home = model.predict_proba(&row);
            let (winner, confidence) = if p_home >= 0.5 {
                (m.home_team.clone(), p_home)
            } else {
                (m.away_team.clone(), 1.0 - p_home)
            };
            PredictionRecord::new(
                season,
                week,
                m.home_team.clone(),
                m.away_team.clone(),
                winner,
                confidence,
                m.injury_note.clone(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrainConfig;
    use crate::synthetic::SyntheticLeague;

    #[test]
    fn training_set_skips_ties_but_counts_wins() {
        let games = vec![
            GameRecord {
                season: 2024,
                week: 1,
                home_team: "KC".to_string(),
                away_team: "BUF".to_string(),
                home_score: 20,
                away_score: 20,
            },
            GameRecord {
                season: 2024,
                week: 2,
                home_team: "KC".to_string(),
                away_team: "DEN".to_string(),
                home_score: 28,
                away_score: 10,
            },
        ];
        let set = build_training_set(&games, EloConfig::default());
        assert_eq!(set.rows.len(), 1);
        assert_eq!(set.labels, vec![true]);
        assert_eq!(set.baseline.len(), 1);
    }

    #[test]
    fn first_row_sees_no_history() {
        let mut league = SyntheticLeague::new(5);
        let games = league.generate_season(2024);
        let set = build_training_set(&games, EloConfig::default());

        let first = set.rows.first().unwrap();
        // Only the home-advantage term is non-zero before any game is played.
        assert!((first.elo_diff - 48.0 / 400.0).abs() < 1e-9);
        assert_eq!(first.win_pct_diff, 0.0);
        assert_eq!(first.point_margin_diff, 0.0);
    }

    #[test]
    fn predicted_winner_matches_probability_side() {
        let mut league = SyntheticLeague::new(9);
        let games = league.generate_season(2024);
        let set = build_training_set(&games, EloConfig::default());
        let model = LogisticModel::fit(&set.rows, &set.labels, TrainConfig::default()).unwrap();
        let (elo, forms) = trackers_from_history(&games, EloConfig::default());

        let matchups = vec![Matchup {
            home_team: "KC".to_string(),
            away_team: "BUF".to_string(),
            injury_note: Some("QB questionable".to_string()),
        }];
        let preds = predict_week(&elo, &forms, &model, 2025, 1, &matchups);
        assert_eq!(preds.len(), 1);
        let p = &preds[0];
        assert!(p.predicted_winner == "KC" || p.predicted_winner == "BUF");
        assert!(p.confidence >= 0.5 && p.confidence <= 1.0);
        assert_eq!(p.injury_note.as_deref(), Some("QB questionable"));
    }
}
