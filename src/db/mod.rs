//! Database module - SQLite storage for logged sets, profiles and analyses

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::analysis::PerformanceAnalysis;
use crate::profile::TrainingProfile;

/// One logged exercise entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Training {
    pub id: Option<i64>,
    pub user_id: String,
    pub date: DateTime<Utc>,
    /// Catalog exercise id
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    pub rpe: Option<f32>,
    pub notes: Option<String>,
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trainings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                exercise TEXT NOT NULL,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight_kg REAL NOT NULL,
                rpe REAL,
                notes TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_trainings_user_date ON trainings (user_id, date);
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                data TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Add new training record
    pub fn add_training(&self, training: &Training) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO trainings (user_id, date, exercise, sets, reps, weight_kg, rpe, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                training.user_id,
                training.date.to_rfc3339(),
                training.exercise,
                training.sets,
                training.reps,
                training.weight_kg,
                training.rpe.map(f64::from),
                training.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Trainings for one user, oldest first
    pub fn get_trainings(&self, user_id: &str) -> Result<Vec<Training>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, exercise, sets, reps, weight_kg, rpe, notes FROM trainings WHERE user_id = ?1 ORDER BY date ASC, id ASC"
        )?;

        let trainings = stmt.query_map([user_id], |row| {
            let date_str: String = row.get(2)?;
            let rpe: Option<f64> = row.get(7)?;
            Ok(Training {
                id: Some(row.get(0)?),
                user_id: row.get(1)?,
                date: DateTime::parse_from_rfc3339(&date_str)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e)))?,
                exercise: row.get(3)?,
                sets: row.get(4)?,
                reps: row.get(5)?,
                weight_kg: row.get(6)?,
                rpe: rpe.map(|v| v as f32),
                notes: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

        Ok(trainings)
    }

    /// Insert or replace the profile stored under its user id
    pub fn upsert_profile(&self, profile: &TrainingProfile) -> Result<()> {
        let data = serde_json::to_string(profile)?;
        self.conn.execute(
            "INSERT INTO profiles (user_id, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![profile.user_id, data, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<TrainingProfile>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM profiles WHERE user_id = ?1", [user_id], |row| row.get(0))
            .optional()?;
        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Analyses are history: appended, never updated
    pub fn append_analysis(&self, analysis: &PerformanceAnalysis) -> Result<i64> {
        let data = serde_json::to_string(analysis)?;
        self.conn.execute(
            "INSERT INTO analyses (user_id, date, data) VALUES (?1, ?2, ?3)",
            params![analysis.user_id, analysis.date.to_rfc3339(), data],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Analyses for one user, oldest first
    pub fn get_analyses(&self, user_id: &str) -> Result<Vec<PerformanceAnalysis>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM analyses WHERE user_id = ?1 ORDER BY date ASC, id ASC")?;
        let rows = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut analyses = Vec::with_capacity(rows.len());
        for json in rows {
            analyses.push(serde_json::from_str(&json)?);
        }
        Ok(analyses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    use crate::analysis::PerformanceReporter;
    use crate::config::EngineConfig;
    use crate::profile::ExperienceLevel;

    fn create_training(user: &str, day: u32, exercise: &str, weight: f64) -> Training {
        Training {
            id: None,
            user_id: user.to_string(),
            date: Utc.with_ymd_and_hms(2026, 3, day, 18, 0, 0).unwrap(),
            exercise: exercise.to_string(),
            sets: 3,
            reps: 8,
            weight_kg: weight,
            rpe: Some(8.5),
            notes: None,
        }
    }

    #[test]
    fn test_trainings_filtered_and_ordered() {
        let db = Database::open_in_memory().unwrap();
        db.add_training(&create_training("alice", 10, "back_squat", 120.0)).unwrap();
        db.add_training(&create_training("bob", 5, "back_squat", 80.0)).unwrap();
        db.add_training(&create_training("alice", 3, "barbell_bench_press", 90.0)).unwrap();

        let trainings = db.get_trainings("alice").unwrap();
        assert_eq!(trainings.len(), 2);
        assert_eq!(trainings[0].exercise, "barbell_bench_press");
        assert_eq!(trainings[1].weight_kg, 120.0);
        assert_eq!(trainings[1].rpe, Some(8.5));
        assert!(trainings.iter().all(|t| t.id.is_some()));
    }

    #[test]
    fn test_profile_upsert() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_profile("alice").unwrap().is_none());

        let mut profile = TrainingProfile::new("alice", ExperienceLevel::Intermediate, 2.0);
        db.upsert_profile(&profile).unwrap();
        profile.strength.insert("back_squat".to_string(), 150.0);
        db.upsert_profile(&profile).unwrap();

        assert_eq!(db.get_profile("alice").unwrap(), Some(profile));
    }

    #[test]
    fn test_analyses_append_only() {
        let db = Database::open_in_memory().unwrap();
        let profile = TrainingProfile::new("alice", ExperienceLevel::Intermediate, 2.0);
        let trainings = vec![create_training("alice", 10, "back_squat", 120.0)];
        let reporter = PerformanceReporter::new(&EngineConfig::default());
        let end = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let first = reporter.analyze(&profile, &trainings, end, None);
        let second = reporter.analyze(&profile, &trainings, end + chrono::Duration::days(7), None);
        db.append_analysis(&first).unwrap();
        db.append_analysis(&second).unwrap();

        let stored = db.get_analyses("alice").unwrap();
        assert_eq!(stored, vec![first, second]);
        assert!(db.get_analyses("bob").unwrap().is_empty());
    }
}
