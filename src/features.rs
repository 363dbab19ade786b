use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::elo::EloTracker;
use crate::games::GameRecord;

pub const FEATURE_COUNT: usize = 3;

/// Model inputs for one matchup, all from the home side's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// (home elo + home advantage - away elo) / 400.
    pub elo_diff: f64,
    pub win_pct_diff: f64,
    /// Average point-margin differential in touchdown units.
    pub point_margin_diff: f64,
}

impl FeatureRow {
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [self.elo_diff, self.win_pct_diff, self.point_margin_diff]
    }
}

/// Rolling aggregates for one team, built only from games already played.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamForm {
    pub games: u32,
    pub wins: f64,
    pub points_for: f64,
    pub points_against: f64,
}

impl TeamForm {
    /// 0.5 for a team with no history, so unseen teams look neutral.
    pub fn win_pct(&self) -> f64 {
        if self.games == 0 {
            0.5
        } else {
            self.wins / self.games as f64
        }
    }

    pub fn avg_margin(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            (self.points_for - self.points_against) / self.games as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormTracker {
    forms: HashMap<String, TeamForm>,
}

impl FormTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self, team: &str) -> TeamForm {
        self.forms.get(team).copied().unwrap_or_default()
    }

    pub fn record_game(&mut self, game: &GameRecord) {
        let (home_win, away_win) = match game.home_win() {
            Some(true) => (1.0, 0.0),
            Some(false) => (0.0, 1.0),
            None => (0.5, 0.5),
        };

        let home = self.forms.entry(game.home_team.clone()).or_default();
        home.games += 1;
        home.wins += home_win;
        home.points_for += game.home_score as f64;
        home.points_against += game.away_score as f64;

        let away = self.forms.entry(game.away_team.clone()).or_default();
        away.games += 1;
        away.wins += away_win;
        away.points_for += game.away_score as f64;
        away.points_against += game.home_score as f64;
    }

    pub fn reset(&mut self) {
        self.forms.clear();
    }
}

pub fn matchup_features(
    elo: &EloTracker,
    forms: &FormTracker,
    home: &str,
    away: &str,
) -> FeatureRow {
    let home_form = forms.form(home);
    let away_form = forms.form(away);
    FeatureRow {
        elo_diff: (elo.rating(home) + elo.config().home_adv_pts - elo.rating(away)) / 400.0,
        win_pct_diff: home_form.win_pct() - away_form.win_pct(),
        point_margin_diff: (home_form.avg_margin() - away_form.avg_margin()) / 7.0,
    }
}

/// Per-feature mean/std fitted on training rows, applied to everything the
/// model sees afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: [f64; FEATURE_COUNT],
    pub std: [f64; FEATURE_COUNT],
}

impl Standardizer {
    pub fn identity() -> Self {
        Self {
            mean: [0.0; FEATURE_COUNT],
            std: [1.0; FEATURE_COUNT],
        }
    }

    pub fn fit(rows: &[FeatureRow]) -> Self {
        if rows.is_empty() {
            return Self::identity();
        }
        let n = rows.len() as f64;
        let mut mean = [0.0; FEATURE_COUNT];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row.as_array()) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = [0.0; FEATURE_COUNT];
        for row in rows {
            for ((v, m), x) in var.iter_mut().zip(mean).zip(row.as_array()) {
                *v += (x - m).powi(2);
            }
        }
        let mut std = [1.0; FEATURE_COUNT];
        for (s, v) in std.iter_mut().zip(var) {
            // Constant features pass through unscaled.
            *s = (v / n).sqrt().max(1e-9);
        }

        Self { mean, std }
    }

    pub fn apply(&self, row: &FeatureRow) -> [f64; FEATURE_COUNT] {
        let mut out = row.as_array();
        for ((x, m), s) in out.iter_mut().zip(self.mean).zip(self.std) {
            *x = (*x - m) / s;
        }
        out
    }
}
