//! Persistence of the collections in the local key-value store, and the
//! JSON backup format used by `db export` / `db import`.
//!
//! Each collection lives under its own key and is rewritten whole whenever
//! it changes. Collections are independent: a missing or unreadable one
//! falls back to its built-in default without affecting the others.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::db::DB;
use crate::error::StoreError;
use crate::models::{
    AppState, DailyGoal, ExerciseCatalogEntry, UserProfile, WeightEntry, WorkoutSession, WorkoutTypePreset,
};
use crate::session::{ActiveWorkout, SessionManager};

pub const BACKUP_VERSION: &str = "1.0";

const ACTIVE_KEY: &str = "gymtracker_active";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Workouts,
    Types,
    Exercises,
    Goals,
    Profile,
    WeightLog,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Self::Workouts,
        Self::Types,
        Self::Exercises,
        Self::Goals,
        Self::Profile,
        Self::WeightLog,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Workouts => "gymtracker_workouts",
            Self::Types => "gymtracker_types",
            Self::Exercises => "gymtracker_exercises",
            Self::Goals => "gymtracker_goals",
            Self::Profile => "gymtracker_profile",
            Self::WeightLog => "gymtracker_weight_log",
        }
    }

    /// Field name in backup documents.
    pub fn backup_field(self) -> &'static str {
        match self {
            Self::Workouts => "workouts",
            Self::Types => "availableTypes",
            Self::Exercises => "suggestedExercises",
            Self::Goals => "dailyGoals",
            Self::Profile => "userProfile",
            Self::WeightLog => "weightLog",
        }
    }
}

fn encode<T: Serialize + ?Sized>(key: &'static str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })
}

fn encode_collection(state: &AppState, collection: Collection) -> Result<String, StoreError> {
    let key = collection.key();
    match collection {
        Collection::Workouts => encode(key, &state.workouts),
        Collection::Types => encode(key, &state.available_types),
        Collection::Exercises => encode(key, &state.suggested_exercises),
        Collection::Goals => encode(key, &state.daily_goals),
        Collection::Profile => encode(key, &state.user_profile),
        Collection::WeightLog => encode(key, &state.weight_log),
    }
}

fn encode_rows(state: &AppState, collections: &[Collection]) -> Result<Vec<(&'static str, String)>, StoreError> {
    collections
        .iter()
        .map(|c| encode_collection(state, *c).map(|value| (c.key(), value)))
        .collect()
}

fn encode_active(manager: &SessionManager) -> Result<Option<String>, StoreError> {
    manager.active().map(|active| encode(ACTIVE_KEY, active)).transpose()
}

const UPSERT: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
"#;

pub struct Store {
    pool: DB,
}

impl Store {
    pub fn new(pool: DB) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DB {
        &self.pool
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
    }

    async fn load_or<T, F>(&self, key: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.read_raw(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, error = %e, "stored collection is unreadable, using defaults");
                    default()
                }
            },
            Ok(None) => default(),
            Err(e) => {
                warn!(key, error = %e, "failed to read collection, using defaults");
                default()
            }
        }
    }

    /// Loads every collection. Never fails: problems degrade to defaults.
    pub async fn load_state(&self) -> AppState {
        let defaults = AppState::default();

        AppState {
            workouts: self.load_or(Collection::Workouts.key(), || defaults.workouts.clone()).await,
            available_types: self
                .load_or(Collection::Types.key(), || defaults.available_types.clone())
                .await,
            suggested_exercises: self
                .load_or(Collection::Exercises.key(), || defaults.suggested_exercises.clone())
                .await,
            daily_goals: self.load_or(Collection::Goals.key(), || defaults.daily_goals.clone()).await,
            user_profile: self
                .load_or(Collection::Profile.key(), || defaults.user_profile.clone())
                .await,
            weight_log: self.load_or(Collection::WeightLog.key(), || defaults.weight_log.clone()).await,
        }
    }

    pub async fn load_active(&self) -> SessionManager {
        let active: Option<ActiveWorkout> = self.load_or(ACTIVE_KEY, || None).await;
        SessionManager::new(active)
    }

    pub async fn save(&self, state: &AppState, collection: Collection) -> Result<(), StoreError> {
        let value = encode_collection(state, collection)?;
        sqlx::query(UPSERT)
            .bind(collection.key())
            .bind(value)
            .execute(&self.pool)
            .await?;
        debug!(key = collection.key(), "collection saved");
        Ok(())
    }

    /// Rewrites several collections in one transaction.
    pub async fn save_many(&self, state: &AppState, collections: &[Collection]) -> Result<(), StoreError> {
        self.commit(encode_rows(state, collections)?, None).await
    }

    /// Persists the active slot; an empty slot removes the row.
    pub async fn save_active(&self, manager: &SessionManager) -> Result<(), StoreError> {
        self.commit(Vec::new(), Some(encode_active(manager)?)).await
    }

    /// Writes `collections` and the active slot in one transaction, so a
    /// finished session never lands in history while still being active.
    pub async fn save_with_active(
        &self,
        state: &AppState,
        collections: &[Collection],
        manager: &SessionManager,
    ) -> Result<(), StoreError> {
        self.commit(encode_rows(state, collections)?, Some(encode_active(manager)?))
            .await
    }

    /// `active` is `None` to leave the slot alone, `Some(None)` to clear it.
    async fn commit(&self, rows: Vec<(&'static str, String)>, active: Option<Option<String>>) -> Result<(), StoreError> {
        let count = rows.len();
        let mut tx = self.pool.begin().await?;
        for (key, value) in rows {
            sqlx::query(UPSERT).bind(key).bind(value).execute(&mut *tx).await?;
        }
        match active {
            Some(Some(value)) => {
                sqlx::query(UPSERT).bind(ACTIVE_KEY).bind(value).execute(&mut *tx).await?;
            }
            Some(None) => {
                sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                    .bind(ACTIVE_KEY)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {}
        }
        tx.commit().await?;
        debug!(count, "collections saved");
        Ok(())
    }

    /// Replaces the collections present in `raw` and persists them together.
    /// Nothing changes, in memory or on disk, unless the whole document
    /// decodes and the write commits.
    pub async fn import(&self, state: &mut AppState, raw: &str) -> Result<Vec<Collection>, StoreError> {
        let doc = parse_backup(raw)?;
        let mut next = state.clone();
        let replaced = doc.apply(&mut next);

        if !replaced.is_empty() {
            self.save_many(&next, &replaced).await?;
        }
        *state = next;
        Ok(replaced)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument<'a> {
    pub workouts: &'a [WorkoutSession],
    pub available_types: &'a [WorkoutTypePreset],
    pub suggested_exercises: &'a [ExerciseCatalogEntry],
    pub daily_goals: &'a [DailyGoal],
    pub user_profile: &'a UserProfile,
    pub weight_log: &'a [WeightEntry],
    pub version: &'static str,
    pub export_date: DateTime<Utc>,
}

pub fn export_document(state: &AppState, now: DateTime<Utc>) -> BackupDocument<'_> {
    BackupDocument {
        workouts: &state.workouts,
        available_types: &state.available_types,
        suggested_exercises: &state.suggested_exercises,
        daily_goals: &state.daily_goals,
        user_profile: &state.user_profile,
        weight_log: &state.weight_log,
        version: BACKUP_VERSION,
        export_date: now,
    }
}

pub fn render_backup(state: &AppState, now: DateTime<Utc>) -> Result<String, StoreError> {
    serde_json::to_string_pretty(&export_document(state, now))
        .map_err(|source| StoreError::Encode { key: "backup", source })
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("gymtracker_backup_{}.json", date.format("%Y-%m-%d"))
}

/// A decoded backup. Absent (or null) fields leave the matching collection
/// untouched; unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    pub workouts: Option<Vec<WorkoutSession>>,
    pub available_types: Option<Vec<WorkoutTypePreset>>,
    pub suggested_exercises: Option<Vec<ExerciseCatalogEntry>>,
    pub daily_goals: Option<Vec<DailyGoal>>,
    pub user_profile: Option<UserProfile>,
    pub weight_log: Option<Vec<WeightEntry>>,
    pub version: Option<String>,
}

pub fn parse_backup(raw: &str) -> Result<ImportDocument, StoreError> {
    let doc: ImportDocument = serde_json::from_str(raw).map_err(StoreError::MalformedImport)?;

    if let Some(version) = doc.version.as_deref().filter(|v| *v != BACKUP_VERSION) {
        warn!(version, expected = BACKUP_VERSION, "importing backup with unknown version");
    }
    Ok(doc)
}

impl ImportDocument {
    /// Moves every present collection into `state`; returns what was replaced.
    pub fn apply(self, state: &mut AppState) -> Vec<Collection> {
        let mut replaced = Vec::new();

        if let Some(workouts) = self.workouts {
            state.workouts = workouts;
            replaced.push(Collection::Workouts);
        }
        if let Some(types) = self.available_types {
            state.available_types = types;
            replaced.push(Collection::Types);
        }
        if let Some(exercises) = self.suggested_exercises {
            state.suggested_exercises = exercises;
            replaced.push(Collection::Exercises);
        }
        if let Some(goals) = self.daily_goals {
            state.daily_goals = goals;
            replaced.push(Collection::Goals);
        }
        if let Some(profile) = self.user_profile {
            state.user_profile = profile;
            replaced.push(Collection::Profile);
        }
        if let Some(log) = self.weight_log {
            state.weight_log = log;
            replaced.push(Collection::WeightLog);
        }

        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;

    #[test]
    fn backup_uses_camel_case_field_names() {
        let state = AppState::default();
        let now = DateTime::parse_from_rfc3339("2024-06-09T10:00:00Z").unwrap().with_timezone(&Utc);
        let value: serde_json::Value = serde_json::from_str(&render_backup(&state, now).unwrap()).unwrap();

        for c in Collection::ALL {
            assert!(value.get(c.backup_field()).is_some(), "missing {}", c.backup_field());
        }
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["exportDate"], "2024-06-09T10:00:00Z");
        assert_eq!(value["userProfile"]["gender"], "Homme");
        assert_eq!(value["availableTypes"][0]["type"], "Push");
    }

    #[test]
    fn file_name_carries_the_date() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(backup_file_name(d), "gymtracker_backup_2024-06-09.json");
    }

    #[test]
    fn profile_only_document_replaces_profile_only() {
        let mut state = AppState::default();
        let before = state.clone();
        let doc = parse_backup(
            r#"{ "userProfile": { "gender": "Femme", "age": 28, "weight": 60, "height": 165 }, "extra": 1 }"#,
        )
        .unwrap();

        assert_eq!(doc.apply(&mut state), vec![Collection::Profile]);
        assert_eq!(state.user_profile.gender, Gender::Female);
        assert_eq!(state.workouts, before.workouts);
        assert_eq!(state.available_types, before.available_types);
        assert_eq!(state.suggested_exercises, before.suggested_exercises);
        assert_eq!(state.daily_goals, before.daily_goals);
    }

    #[test]
    fn null_fields_are_ignored() {
        let mut state = AppState::default();
        let doc = parse_backup(r#"{ "workouts": null, "dailyGoals": [] }"#).unwrap();
        assert_eq!(doc.apply(&mut state), vec![Collection::Goals]);
        assert!(state.daily_goals.is_empty());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(parse_backup("{ not json"), Err(StoreError::MalformedImport(_))));
        assert!(matches!(parse_backup("[]"), Err(StoreError::MalformedImport(_))));
        assert!(matches!(
            parse_backup(r#"{ "userProfile": { "gender": "Homme" }, "workouts": [] }"#),
            Err(StoreError::MalformedImport(_))
        ));
    }
}
