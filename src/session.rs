//! The in-progress workout.
//!
//! At most one session is in progress at a time, held in a single optional
//! slot: `None` is the absent state, `Some` is in progress. Finishing moves
//! the session into history, cancelling drops it.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;
use crate::models::{ExerciseCatalogEntry, ExerciseEntry, SetEntry, WorkoutSession, same_label};
use crate::types::ExerciseCategory;
use crate::utils::is_valid_measure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveWorkout {
    pub session: WorkoutSession,
    /// Timer origin; elapsed time is measured from here.
    pub started_at: DateTime<Local>,
}

impl ActiveWorkout {
    pub fn elapsed_seconds(&self, now: DateTime<Local>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetField {
    Reps(u32),
    Weight(f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedExercise {
    pub exercise_id: String,
    pub set_id: String,
    /// Set when the name was new and got added to the catalog.
    pub catalogued: Option<ExerciseCategory>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionManager {
    active: Option<ActiveWorkout>,
}

impl SessionManager {
    pub fn new(active: Option<ActiveWorkout>) -> Self {
        Self { active }
    }

    pub fn active(&self) -> Option<&ActiveWorkout> {
        self.active.as_ref()
    }

    pub fn into_active(self) -> Option<ActiveWorkout> {
        self.active
    }

    pub fn is_in_progress(&self) -> bool {
        self.active.is_some()
    }

    fn session_mut(&mut self) -> Result<&mut WorkoutSession, SessionError> {
        self.active
            .as_mut()
            .map(|a| &mut a.session)
            .ok_or(SessionError::NoActiveSession)
    }

    fn set_mut(&mut self, exercise_id: &str, set_id: &str) -> Result<&mut SetEntry, SessionError> {
        self.session_mut()?
            .exercise_mut(exercise_id)
            .ok_or_else(|| SessionError::ExerciseNotFound(exercise_id.to_string()))?
            .set_mut(set_id)
            .ok_or_else(|| SessionError::SetNotFound(set_id.to_string()))
    }

    pub fn start(&mut self, workout_type: &str, now: DateTime<Local>) -> Result<&WorkoutSession, SessionError> {
        if let Some(active) = &self.active {
            return Err(SessionError::AlreadyInProgress(active.session.id.clone()));
        }
        let workout_type = workout_type.trim();
        if workout_type.is_empty() {
            return Err(SessionError::BlankName);
        }

        let active = self.active.insert(ActiveWorkout {
            session: WorkoutSession::new(workout_type, now),
            started_at: now,
        });
        debug!(id = %active.session.id, workout_type, "session started");
        Ok(&active.session)
    }

    /// Appends an exercise seeded with one empty set. A name missing from
    /// the catalog is inserted at its front; without an explicit category
    /// (or with `Other`) it is inferred from the session type.
    pub fn add_exercise(
        &mut self,
        name: &str,
        category: Option<ExerciseCategory>,
        catalog: &mut Vec<ExerciseCatalogEntry>,
    ) -> Result<AddedExercise, SessionError> {
        let session = self.session_mut()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::BlankName);
        }

        let entry = ExerciseEntry::new(name);
        let added = AddedExercise {
            exercise_id: entry.id.clone(),
            set_id: entry.sets[0].id.clone(),
            catalogued: None,
        };
        session.exercises.push(entry);

        if catalog.iter().any(|c| same_label(&c.name, name)) {
            return Ok(added);
        }

        let category = match category {
            Some(ExerciseCategory::Other) | None => ExerciseCategory::inferred_from(&session.workout_type),
            Some(explicit) => explicit,
        };
        catalog.insert(
            0,
            ExerciseCatalogEntry {
                name: name.to_string(),
                category,
            },
        );
        debug!(name, %category, "exercise added to catalog");

        Ok(AddedExercise {
            catalogued: Some(category),
            ..added
        })
    }

    /// Appends a set copying reps, weight and bodyweight flag from the last
    /// one. Returns the new set id.
    pub fn add_set(&mut self, exercise_id: &str) -> Result<String, SessionError> {
        let exercise = self
            .session_mut()?
            .exercise_mut(exercise_id)
            .ok_or_else(|| SessionError::ExerciseNotFound(exercise_id.to_string()))?;

        let mut set = SetEntry::default_set();
        if let Some(last) = exercise.sets.last() {
            set.reps = last.reps;
            set.weight = last.weight;
            set.is_bodyweight = last.is_bodyweight;
        }
        let id = set.id.clone();
        exercise.sets.push(set);
        Ok(id)
    }

    pub fn update_set(&mut self, exercise_id: &str, set_id: &str, field: SetField) -> Result<(), SessionError> {
        if let SetField::Weight(w) = field {
            if !is_valid_measure(w) {
                return Err(SessionError::InvalidWeight(w));
            }
        }

        let set = self.set_mut(exercise_id, set_id)?;
        match field {
            SetField::Reps(reps) => set.reps = reps,
            SetField::Weight(weight) => set.weight = weight,
        }
        Ok(())
    }

    /// Returns the new flag. The weight is cleared either way.
    pub fn toggle_bodyweight(&mut self, exercise_id: &str, set_id: &str) -> Result<bool, SessionError> {
        let set = self.set_mut(exercise_id, set_id)?;
        set.toggle_bodyweight();
        Ok(set.is_bodyweight)
    }

    pub fn toggle_set_complete(&mut self, exercise_id: &str, set_id: &str) -> Result<bool, SessionError> {
        let set = self.set_mut(exercise_id, set_id)?;
        set.completed = !set.completed;
        Ok(set.completed)
    }

    pub fn remove_exercise(&mut self, exercise_id: &str) -> Result<ExerciseEntry, SessionError> {
        let session = self.session_mut()?;
        let idx = session
            .exercises
            .iter()
            .position(|e| e.id == exercise_id)
            .ok_or_else(|| SessionError::ExerciseNotFound(exercise_id.to_string()))?;
        Ok(session.exercises.remove(idx))
    }

    /// Stamps duration (whole minutes) and finish time, prepends the session
    /// to `history` and empties the slot.
    pub fn finish<'h>(
        &mut self,
        history: &'h mut Vec<WorkoutSession>,
        now: DateTime<Local>,
    ) -> Result<&'h WorkoutSession, SessionError> {
        let ActiveWorkout { mut session, started_at } = self.active.take().ok_or(SessionError::NoActiveSession)?;

        let elapsed = (now - started_at).num_seconds().max(0);
        session.duration = Some(u32::try_from(elapsed / 60).unwrap_or(u32::MAX));
        session.timestamp = Some(now.timestamp_millis());
        debug!(id = %session.id, minutes = elapsed / 60, "session finished");

        history.insert(0, session);
        Ok(&history[0])
    }

    /// Drops the in-progress session, if any, without recording it.
    pub fn cancel(&mut self) -> Option<WorkoutSession> {
        self.active.take().map(|a| a.session)
    }
}
