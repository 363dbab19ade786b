use serde::{Deserialize, Serialize};

/// One finished (or scheduled) game. Scores are final when the record is fed
/// to the rating tracker or the results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub season: u16,
    pub week: u8,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u16,
    pub away_score: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Tie,
}

pub fn classify_outcome(home_score: u16, away_score: u16) -> Outcome {
    if home_score > away_score {
        Outcome::HomeWin
    } else if home_score < away_score {
        Outcome::AwayWin
    } else {
        Outcome::Tie
    }
}

impl GameRecord {
    pub fn outcome(&self) -> Outcome {
        classify_outcome(self.home_score, self.away_score)
    }

    /// `Some(true)` for a home win, `Some(false)` for an away win, `None` for
    /// a tie (ties are legal NFL results and are skipped by the classifier).
    pub fn home_win(&self) -> Option<bool> {
        match self.outcome() {
            Outcome::HomeWin => Some(true),
            Outcome::AwayWin => Some(false),
            Outcome::Tie => None,
        }
    }

    pub fn margin(&self) -> u16 {
        self.home_score.abs_diff(self.away_score)
    }

    /// Winning team abbreviation, or `None` on a tie.
    pub fn winner(&self) -> Option<&str> {
        match self.outcome() {
            Outcome::HomeWin => Some(self.home_team.as_str()),
            Outcome::AwayWin => Some(self.away_team.as_str()),
            Outcome::Tie => None,
        }
    }
}

/// A stored pick for one matchup. `confidence` is the probability assigned to
/// the predicted winner and is kept inside [0, 1] by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub season: u16,
    pub week: u8,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: String,
    pub confidence: f64,
    #[serde(default)]
    pub injury_note: Option<String>,
}

impl PredictionRecord {
    pub fn new(
        season: u16,
        week: u8,
        home_team: String,
        away_team: String,
        predicted_winner: String,
        confidence: f64,
        injury_note: Option<String>,
    ) -> Self {
        Self {
            season,
            week,
            home_team,
            away_team,
            predicted_winner,
            confidence: confidence.clamp(0.0, 1.0),
            injury_note,
        }
    }
}
