use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::types::{
    DEFAULT_EXERCISES, DEFAULT_GOALS, DEFAULT_TYPES, ExerciseCategory, Gender,
};

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Labels are joined by value, never by reference: an exercise name or a
/// workout type matches when the two strings are equal ignoring case.
pub fn same_label(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// One training session, either finished (in history) or held in the
/// active slot while in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub workout_type: String,
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl WorkoutSession {
    pub fn new(workout_type: &str, now: DateTime<Local>) -> Self {
        Self {
            id: new_id(),
            date: now.date_naive(),
            workout_type: workout_type.to_string(),
            exercises: Vec::new(),
            duration: None,
            timestamp: Some(now.timestamp_millis()),
        }
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<&ExerciseEntry> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn exercise_mut(&mut self, exercise_id: &str) -> Option<&mut ExerciseEntry> {
        self.exercises.iter_mut().find(|e| e.id == exercise_id)
    }

    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// One exercise inside a session. Always carries at least one set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: String,
    pub name: String,
    pub sets: Vec<SetEntry>,
}

impl ExerciseEntry {
    pub fn new(name: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            sets: vec![SetEntry::default_set()],
        }
    }

    pub fn set_mut(&mut self, set_id: &str) -> Option<&mut SetEntry> {
        self.sets.iter_mut().find(|s| s.id == set_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
    pub id: String,
    #[serde(deserialize_with = "lenient_reps")]
    pub reps: u32,
    pub weight: f64,
    #[serde(default)]
    pub is_bodyweight: bool,
    pub completed: bool,
}

impl SetEntry {
    pub fn default_set() -> Self {
        Self {
            id: new_id(),
            reps: 0,
            weight: 0.0,
            is_bodyweight: false,
            completed: false,
        }
    }

    /// Bodyweight sets never count their stored weight.
    pub fn effective_weight(&self) -> f64 {
        if self.is_bodyweight { 0.0 } else { self.weight }
    }

    pub fn volume(&self) -> f64 {
        self.effective_weight() * self.reps as f64
    }

    /// Flips the bodyweight flag and clears the weight in the same update.
    pub fn toggle_bodyweight(&mut self) {
        self.is_bodyweight = !self.is_bodyweight;
        self.weight = 0.0;
    }
}

/// Older backups may carry fractional or negative rep counts. Fractions are
/// truncated and anything below zero reads as zero.
fn lenient_reps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let reps = f64::deserialize(deserializer)?;
    Ok(reps.trunc() as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub id: String,
    pub label: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Gender,
    pub age: u32,
    /// Kilograms.
    pub weight: f64,
    /// Centimetres.
    pub height: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: 20,
            weight: 75.0,
            height: 176.0,
        }
    }
}

/// A dated snapshot of the profile weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTypePreset {
    #[serde(rename = "type")]
    pub label: String,
    pub color: String,
    #[serde(default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseCatalogEntry {
    pub name: String,
    pub category: ExerciseCategory,
}

/// Every persisted collection, as loaded at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Newest first: finishing a session prepends it.
    pub workouts: Vec<WorkoutSession>,
    pub available_types: Vec<WorkoutTypePreset>,
    pub suggested_exercises: Vec<ExerciseCatalogEntry>,
    pub daily_goals: Vec<DailyGoal>,
    pub user_profile: UserProfile,
    pub weight_log: Vec<WeightEntry>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            workouts: Vec::new(),
            available_types: DEFAULT_TYPES.clone(),
            suggested_exercises: DEFAULT_EXERCISES.clone(),
            daily_goals: DEFAULT_GOALS.clone(),
            user_profile: UserProfile::default(),
            weight_log: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_bodyweight_clears_weight() {
        let mut set = SetEntry {
            weight: 40.0,
            reps: 10,
            ..SetEntry::default_set()
        };
        set.toggle_bodyweight();
        assert!(set.is_bodyweight);
        assert_eq!(set.weight, 0.0);

        set.weight = 10.0;
        set.toggle_bodyweight();
        assert!(!set.is_bodyweight);
        assert_eq!(set.weight, 0.0);
    }

    #[test]
    fn bodyweight_sets_have_no_volume() {
        let set = SetEntry {
            weight: 80.0,
            reps: 5,
            is_bodyweight: true,
            ..SetEntry::default_set()
        };
        assert_eq!(set.effective_weight(), 0.0);
        assert_eq!(set.volume(), 0.0);
    }

    #[test]
    fn labels_match_ignoring_case() {
        assert!(same_label("Bench Press", "bench press"));
        assert!(same_label("Développé Couché", "DÉVELOPPÉ COUCHÉ"));
        assert!(!same_label("Squat", "Front Squat"));
    }

    #[test]
    fn reads_legacy_backup_shapes() {
        let json = r#"{
            "id": "1700000000000",
            "date": "2024-03-04",
            "type": "Push",
            "exercises": [{
                "id": "e1",
                "name": "Dips",
                "sets": [{ "id": "s1", "reps": 12, "weight": 0, "completed": true }]
            }],
            "timestamp": 1700000000000
        }"#;
        let session: WorkoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.workout_type, "Push");
        assert_eq!(session.duration, None);
        assert!(!session.exercises[0].sets[0].is_bodyweight);
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn odd_rep_counts_are_coerced() {
        let reps = |raw: &str| {
            let json = format!(r#"{{ "id": "s1", "reps": {raw}, "weight": 20, "completed": false }}"#);
            serde_json::from_str::<SetEntry>(&json).unwrap().reps
        };
        assert_eq!(reps("8"), 8);
        assert_eq!(reps("8.5"), 8);
        assert_eq!(reps("0.9"), 0);
        assert_eq!(reps("-3"), 0);
        assert_eq!(reps("1e12"), u32::MAX);
    }
}
