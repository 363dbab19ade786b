use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::games::{GameRecord, PredictionRecord};
use crate::teams;

pub const DB_FILE: &str = "nfl_predictions.db";
const APP_DIR: &str = "gridiron";

/// Ties are stored as a literal marker in `actual_winner` so the column is
/// never NULL for a graded game.
pub const TIE_MARKER: &str = "TIE";

#[derive(Debug, Clone, Copy, Default)]
pub struct AccuracySummary {
    pub graded: usize,
    pub correct: usize,
    pub avg_conf_correct: f64,
    pub avg_conf_incorrect: f64,
}

impl AccuracySummary {
    pub fn accuracy(&self) -> f64 {
        if self.graded == 0 {
            0.0
        } else {
            self.correct as f64 / self.graded as f64
        }
    }
}

/// `NFL_DB_PATH` wins; otherwise the platform cache dir.
pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("NFL_DB_PATH")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS predictions (
            season INTEGER NOT NULL,
            week INTEGER NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            predicted_winner TEXT NOT NULL,
            confidence REAL NOT NULL,
            injury_report TEXT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (season, week, home_team, away_team)
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_week ON predictions(season, week);

        CREATE TABLE IF NOT EXISTS results (
            season INTEGER NOT NULL,
            week INTEGER NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_score INTEGER NOT NULL,
            away_score INTEGER NOT NULL,
            actual_winner TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (season, week, home_team, away_team)
        );
        CREATE INDEX IF NOT EXISTS idx_results_week ON results(season, week);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Team ids are canonicalized on write so the predictions/results join
/// cannot miss on case or stray whitespace.
pub fn upsert_predictions(conn: &mut Connection, rows: &[PredictionRecord]) -> Result<usize> {
    let tx = conn.transaction().context("begin predictions transaction")?;
    let now = Utc::now().to_rfc3339();
    let mut written = 0usize;
    for row in rows {
        tx.execute(
            r#"
            INSERT INTO predictions (
                season, week, home_team, away_team,
                predicted_winner, confidence, injury_report, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(season, week, home_team, away_team) DO UPDATE SET
                predicted_winner = excluded.predicted_winner,
                confidence = excluded.confidence,
                injury_report = excluded.injury_report,
                updated_at = excluded.updated_at
            "#,
            params![
                row.season as i64,
                row.week as i64,
                teams::normalize_abbr(&row.home_team),
                teams::normalize_abbr(&row.away_team),
                teams::normalize_abbr(&row.predicted_winner),
                row.confidence.clamp(0.0, 1.0),
                row.injury_note,
                now,
            ],
        )
        .context("upsert prediction")?;
        written += 1;
    }
    tx.commit().context("commit predictions transaction")?;
    Ok(written)
}

pub fn load_predictions(
    conn: &Connection,
    season: u16,
    week: u8,
) -> Result<Vec<PredictionRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT season, week, home_team, away_team,
                   predicted_winner, confidence, injury_report
            FROM predictions
            WHERE season = ?1 AND week = ?2
            ORDER BY home_team ASC
            "#,
        )
        .context("prepare load predictions query")?;

    let rows = stmt
        .query_map(params![season as i64, week as i64], |row| {
            Ok(PredictionRecord {
                season: row.get::<_, i64>(0)? as u16,
                week: row.get::<_, i64>(1)? as u8,
                home_team: row.get(2)?,
                away_team: row.get(3)?,
                predicted_winner: row.get(4)?,
                confidence: row.get(5)?,
                injury_note: row.get(6)?,
            })
        })
        .context("query load predictions")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode prediction row")?);
    }
    Ok(out)
}

pub fn upsert_results(conn: &mut Connection, games: &[GameRecord]) -> Result<usize> {
    let tx = conn.transaction().context("begin results transaction")?;
    let now = Utc::now().to_rfc3339();
    let mut written = 0usize;
    for game in games {
        let actual_winner = game
            .winner()
            .map(teams::normalize_abbr)
            .unwrap_or_else(|| TIE_MARKER.to_string());
        tx.execute(
            r#"
            INSERT INTO results (
                season, week, home_team, away_team,
                home_score, away_score, actual_winner, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(season, week, home_team, away_team) DO UPDATE SET
                home_score = excluded.home_score,
                away_score = excluded.away_score,
                actual_winner = excluded.actual_winner,
                updated_at = excluded.updated_at
            "#,
            params![
                game.season as i64,
                game.week as i64,
                teams::normalize_abbr(&game.home_team),
                teams::normalize_abbr(&game.away_team),
                game.home_score as i64,
                game.away_score as i64,
                actual_winner,
                now,
            ],
        )
        .context("upsert result")?;
        written += 1;
    }
    tx.commit().context("commit results transaction")?;
    Ok(written)
}

/// Final scores for one week. Games outside the given season/week are
/// ignored rather than silently stored under the wrong key.
pub fn update_scores(
    conn: &mut Connection,
    season: u16,
    week: u8,
    games: &[GameRecord],
) -> Result<usize> {
    let filtered: Vec<GameRecord> = games
        .iter()
        .filter(|g| g.season == season && g.week == week)
        .cloned()
        .collect();
    upsert_results(conn, &filtered)
}

/// All stored results for a season (or one week of it), in replay order.
pub fn load_results(conn: &Connection, season: u16, week: Option<u8>) -> Result<Vec<GameRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT season, week, home_team, away_team, home_score, away_score
            FROM results
            WHERE season = ?1 AND (?2 IS NULL OR week = ?2)
            ORDER BY week ASC, home_team ASC
            "#,
        )
        .context("prepare load results query")?;

    let rows = stmt
        .query_map(params![season as i64, week.map(|w| w as i64)], |row| {
            Ok(GameRecord {
                season: row.get::<_, i64>(0)? as u16,
                week: row.get::<_, i64>(1)? as u8,
                home_team: row.get(2)?,
                away_team: row.get(3)?,
                home_score: row.get::<_, i64>(4)? as u16,
                away_score: row.get::<_, i64>(5)? as u16,
            })
        })
        .context("query load results")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode result row")?);
    }
    Ok(out)
}

/// Joins predictions against graded results for one season.
pub fn accuracy_summary(conn: &Connection, season: u16) -> Result<AccuracySummary> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT p.predicted_winner, p.confidence, r.actual_winner
            FROM predictions p
            JOIN results r
              ON p.season = r.season
             AND p.week = r.week
             AND p.home_team = r.home_team
             AND p.away_team = r.away_team
            WHERE p.season = ?1
            "#,
        )
        .context("prepare accuracy query")?;

    let rows = stmt
        .query_map(params![season as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .context("query accuracy summary")?;

    let mut summary = AccuracySummary::default();
    let mut conf_correct = 0.0_f64;
    let mut conf_incorrect = 0.0_f64;

    for row in rows {
        let (predicted, confidence, actual) = row.context("decode accuracy row")?;
        summary.graded += 1;
        if predicted == actual {
            summary.correct += 1;
            conf_correct += confidence;
        } else {
            conf_incorrect += confidence;
        }
    }

    let incorrect = summary.graded - summary.correct;
    if summary.correct > 0 {
        summary.avg_conf_correct = conf_correct / summary.correct as f64;
    }
    if incorrect > 0 {
        summary.avg_conf_incorrect = conf_incorrect / incorrect as f64;
    }
    Ok(summary)
}
