use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::games::GameRecord;
use crate::teams;

pub const WEEKS_PER_SEASON: u8 = 18;

const BASE_POINTS: f64 = 21.0;
const HOME_EDGE_POINTS: f64 = 2.5;
const STRENGTH_POINTS: f64 = 7.0;

/// Generates fake seasons: latent strengths per team, random weekly pairings,
/// scores whose margin tracks the strength gap plus home edge and noise.
/// Deterministic for a fixed seed.
#[derive(Debug)]
pub struct SyntheticLeague {
    strengths: HashMap<String, f64>,
    rng: StdRng,
}

impl SyntheticLeague {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut strengths = HashMap::new();
        for abbr in teams::all_abbrs() {
            strengths.insert(abbr.to_string(), rng.gen_range(-1.0..1.0));
        }
        Self { strengths, rng }
    }

    pub fn strengths(&self) -> &HashMap<String, f64> {
        &self.strengths
    }

    /// One full 18-week season, every team playing once per week.
    pub fn generate_season(&mut self, season: u16) -> Vec<GameRecord> {
        let mut order = teams::all_abbrs();
        let mut games = Vec::with_capacity(WEEKS_PER_SEASON as usize * order.len() / 2);

        for week in 1..=WEEKS_PER_SEASON {
            order.shuffle(&mut self.rng);
            for pair in order.chunks(2) {
                let &[home, away] = pair else { continue };
                games.push(self.play_game(season, week, home, away));
            }
        }
        games
    }

    fn play_game(&mut self, season: u16, week: u8, home: &str, away: &str) -> GameRecord {
        let s_home = self.strengths.get(home).copied().unwrap_or(0.0);
        let s_away = self.strengths.get(away).copied().unwrap_or(0.0);

        // Rough normal noise: sum of three uniforms.
        let noise: f64 = (0..3).map(|_| self.rng.gen_range(-4.5..4.5)).sum();
        let diff = HOME_EDGE_POINTS + STRENGTH_POINTS * (s_home - s_away) + noise;

        let total_jitter = self.rng.gen_range(-6.0..6.0);
        let home_score = (BASE_POINTS + total_jitter + diff / 2.0).round().max(0.0) as u16;
        let away_score = (BASE_POINTS + total_jitter - diff / 2.0).round().max(0.0) as u16;

        GameRecord {
            season,
            week,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score,
            away_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_has_sixteen_games_per_week() {
        let mut league = SyntheticLeague::new(7);
        let games = league.generate_season(2024);
        assert_eq!(games.len(), WEEKS_PER_SEASON as usize * 16);
        for week in 1..=WEEKS_PER_SEASON {
            assert_eq!(games.iter().filter(|g| g.week == week).count(), 16);
        }
    }

    #[test]
    fn every_team_plays_once_per_week() {
        let mut league = SyntheticLeague::new(11);
        let games = league.generate_season(2024);
        let week_one: Vec<&GameRecord> = games.iter().filter(|g| g.week == 1).collect();
        let mut seen = std::collections::HashSet::new();
        for g in week_one {
            assert!(seen.insert(g.home_team.clone()));
            assert!(seen.insert(g.away_team.clone()));
        }
        assert_eq!(seen.len(), 32);
    }

    #[test]
    fn same_seed_same_season() {
        let a = SyntheticLeague::new(42).generate_season(2024);
        let b = SyntheticLeague::new(42).generate_season(2024);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.home_team, y.home_team);
            assert_eq!(x.home_score, y.home_score);
            assert_eq!(x.away_score, y.away_score);
        }
    }

    #[test]
    fn stronger_teams_win_more() {
        let mut league = SyntheticLeague::new(3);
        let games: Vec<GameRecord> = (0..6)
            .flat_map(|i| league.generate_season(2020 + i))
            .collect();

        let (best, _) = league
            .strengths()
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(team, s)| (team.clone(), *s))
            .unwrap();
        let (worst, _) = league
            .strengths()
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(team, s)| (team.clone(), *s))
            .unwrap();

        let wins = |team: &str| {
            games
                .iter()
                .filter(|g| g.winner() == Some(team))
                .count() as f64
        };
        assert!(wins(&best) > wins(&worst));
    }
}
