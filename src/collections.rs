//! Edits to stored collections that happen outside the active session.
//!
//! Catalog entries and type presets are referenced from history by label
//! only, so removing them never rewrites past sessions.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{AppState, DailyGoal, WeightEntry, WorkoutSession, WorkoutTypePreset, new_id, same_label};
use crate::types::{CUSTOM_TYPE_COLOR, Gender};
use crate::utils::is_valid_measure;

/// Outcome of deleting a workout type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRemoval {
    Removed,
    BuiltIn,
    NotFound,
}

/// Partial profile edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.gender.is_none() && self.age.is_none() && self.weight.is_none() && self.height.is_none()
    }

    /// Weight and height, when given, must be finite and non-negative.
    pub fn has_valid_measures(&self) -> bool {
        [self.weight, self.height].into_iter().flatten().all(is_valid_measure)
    }
}

impl AppState {
    pub fn delete_workout(&mut self, id: &str) -> Option<WorkoutSession> {
        let idx = self.workouts.iter().position(|w| w.id == id)?;
        Some(self.workouts.remove(idx))
    }

    /// Returns `None` for blank or already-known labels.
    pub fn add_custom_type(&mut self, label: &str) -> Option<&WorkoutTypePreset> {
        let label = label.trim();
        if label.is_empty() || self.available_types.iter().any(|t| same_label(&t.label, label)) {
            return None;
        }

        self.available_types.push(WorkoutTypePreset {
            label: label.to_string(),
            color: CUSTOM_TYPE_COLOR.to_string(),
            is_custom: true,
        });
        self.available_types.last()
    }

    pub fn delete_type(&mut self, label: &str) -> TypeRemoval {
        let Some(idx) = self.available_types.iter().position(|t| same_label(&t.label, label)) else {
            return TypeRemoval::NotFound;
        };
        if !self.available_types[idx].is_custom {
            return TypeRemoval::BuiltIn;
        }

        self.available_types.remove(idx);
        TypeRemoval::Removed
    }

    pub fn delete_catalog_entry(&mut self, name: &str) -> bool {
        let before = self.suggested_exercises.len();
        self.suggested_exercises.retain(|e| e.name != name);
        before != self.suggested_exercises.len()
    }

    pub fn add_goal(&mut self, label: &str) -> Option<&DailyGoal> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        self.daily_goals.push(DailyGoal {
            id: new_id(),
            label: label.to_string(),
            completed: false,
        });
        self.daily_goals.last()
    }

    pub fn toggle_goal(&mut self, id: &str) -> Option<bool> {
        let goal = self.daily_goals.iter_mut().find(|g| g.id == id)?;
        goal.completed = !goal.completed;
        Some(goal.completed)
    }

    pub fn delete_goal(&mut self, id: &str) -> Option<DailyGoal> {
        let idx = self.daily_goals.iter().position(|g| g.id == id)?;
        Some(self.daily_goals.remove(idx))
    }

    /// Merges the given fields into the profile. A changed weight is also
    /// logged for `today`, replacing an earlier entry of the same day.
    /// Returns whether the weight log changed.
    pub fn update_profile(&mut self, update: ProfileUpdate, today: NaiveDate) -> bool {
        let profile = &mut self.user_profile;
        if let Some(gender) = update.gender {
            profile.gender = gender;
        }
        if let Some(age) = update.age {
            profile.age = age;
        }
        if let Some(height) = update.height {
            profile.height = height;
        }

        let Some(weight) = update.weight else {
            return false;
        };
        if weight == profile.weight && self.weight_log.iter().any(|e| e.date == today) {
            return false;
        }
        profile.weight = weight;

        match self.weight_log.iter_mut().find(|e| e.date == today) {
            Some(entry) => entry.weight = weight,
            None => self.weight_log.push(WeightEntry { date: today, weight }),
        }
        debug!(%today, weight, "weight logged");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseEntry;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn session_of(kind: &str, exercise: &str) -> WorkoutSession {
        WorkoutSession {
            id: new_id(),
            date: day(1),
            workout_type: kind.to_string(),
            exercises: vec![ExerciseEntry::new(exercise)],
            duration: Some(30),
            timestamp: None,
        }
    }

    #[test]
    fn custom_types_come_and_go() {
        let mut state = AppState::default();
        state.workouts.push(session_of("Cardio", "Burpees"));

        let created = state.add_custom_type("  Cardio ").cloned().unwrap();
        assert_eq!(created.label, "Cardio");
        assert!(created.is_custom);
        assert_eq!(created.color, CUSTOM_TYPE_COLOR);

        assert!(state.add_custom_type("cardio").is_none());
        assert!(state.add_custom_type("   ").is_none());

        assert_eq!(state.delete_type("Push"), TypeRemoval::BuiltIn);
        assert_eq!(state.delete_type("Cardio"), TypeRemoval::Removed);
        assert_eq!(state.delete_type("Cardio"), TypeRemoval::NotFound);
        assert_eq!(state.workouts[0].workout_type, "Cardio");
        assert_eq!(state.available_types.len(), 4);
    }

    #[test]
    fn catalog_deletion_keeps_history() {
        let mut state = AppState::default();
        state.workouts.push(session_of("Legs", "Squat"));

        assert!(state.delete_catalog_entry("Squat"));
        assert!(!state.delete_catalog_entry("Squat"));
        assert_eq!(state.workouts[0].exercises[0].name, "Squat");
    }

    #[test]
    fn goals_lifecycle() {
        let mut state = AppState::default();
        assert!(state.add_goal(" ").is_none());

        let id = state.add_goal(" Zinc ").unwrap().id.clone();
        assert_eq!(state.daily_goals.last().unwrap().label, "Zinc");
        assert_eq!(state.toggle_goal(&id), Some(true));
        assert_eq!(state.toggle_goal(&id), Some(false));
        assert_eq!(state.toggle_goal("missing"), None);
        assert_eq!(state.delete_goal(&id).unwrap().label, "Zinc");
        assert_eq!(state.daily_goals.len(), 4);
    }

    #[test]
    fn delete_workout_by_id() {
        let mut state = AppState::default();
        let s = session_of("Push", "Dips");
        let id = s.id.clone();
        state.workouts.push(s);

        assert!(state.delete_workout("other").is_none());
        assert_eq!(state.delete_workout(&id).unwrap().id, id);
        assert!(state.workouts.is_empty());
    }

    #[test]
    fn profile_measures_must_be_finite() {
        let ok = ProfileUpdate { weight: Some(80.0), height: Some(0.0), ..Default::default() };
        assert!(ok.has_valid_measures());
        assert!(ProfileUpdate::default().has_valid_measures());

        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            assert!(!ProfileUpdate { weight: Some(bad), ..Default::default() }.has_valid_measures());
            assert!(!ProfileUpdate { height: Some(bad), ..Default::default() }.has_valid_measures());
        }
    }

    #[test]
    fn profile_merge_and_weight_log() {
        let mut state = AppState::default();

        let logged = state.update_profile(
            ProfileUpdate {
                age: Some(31),
                ..Default::default()
            },
            day(1),
        );
        assert!(!logged);
        assert_eq!(state.user_profile.age, 31);
        assert_eq!(state.user_profile.weight, 75.0);

        assert!(state.update_profile(ProfileUpdate { weight: Some(76.0), ..Default::default() }, day(1)));
        assert!(state.update_profile(ProfileUpdate { weight: Some(75.5), ..Default::default() }, day(1)));
        assert!(state.update_profile(ProfileUpdate { weight: Some(75.0), ..Default::default() }, day(2)));

        assert_eq!(
            state.weight_log,
            vec![
                WeightEntry { date: day(1), weight: 75.5 },
                WeightEntry { date: day(2), weight: 75.0 },
            ]
        );
        assert_eq!(state.user_profile.weight, 75.0);
        assert_eq!(state.user_profile.age, 31);
    }
}
