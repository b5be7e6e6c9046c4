//! Derived statistics over the stored collections.
//!
//! Everything here is a pure function of its inputs: nothing is cached and
//! every call recomputes from the sessions and profile it is handed.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use itertools::Itertools;
use serde::Serialize;

use crate::models::{ExerciseCatalogEntry, ExerciseEntry, UserProfile, WeightEntry, WorkoutSession, same_label};
use crate::types::{CategoryFilter, Gender, Period, WeightRange};
use crate::utils::estimated_1rm;

/// Best set and volume of one exercise in one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub best_weight: f64,
    pub best_reps: u32,
    pub estimated_one_rm: f64,
    pub total_volume: f64,
    pub is_bodyweight: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecords {
    pub best_weight: f64,
    pub best_one_rm: f64,
}

/// Inclusive range of whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub count: usize,
    /// Minutes; sessions without a duration count as zero.
    pub duration: u32,
    pub volume: f64,
    pub distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyMetrics {
    pub bmi: f64,
    pub bmr: f64,
}

fn summarize_entry(date: NaiveDate, entry: &ExerciseEntry) -> SeriesPoint {
    let mut best = SeriesPoint {
        date,
        best_weight: 0.0,
        best_reps: 0,
        estimated_one_rm: 0.0,
        total_volume: 0.0,
        is_bodyweight: false,
    };
    let mut total_volume = 0.0;

    for set in &entry.sets {
        let weight = set.effective_weight();
        let one_rm = estimated_1rm(weight, set.reps);
        total_volume += weight * set.reps as f64;

        // A bodyweight set also wins on reps alone.
        if one_rm > best.estimated_one_rm || (set.is_bodyweight && set.reps > best.best_reps) {
            best.best_weight = weight;
            best.best_reps = set.reps;
            best.estimated_one_rm = one_rm;
            best.is_bodyweight = set.is_bodyweight;
        }
    }

    best.total_volume = total_volume;
    best
}

/// Progress series of one exercise, oldest session first.
///
/// Stored history is newest first (finished sessions are prepended) and an
/// import may bring any order, so points are sorted by date and then by
/// timestamp. Sessions without the exercise are left out.
pub fn series_for(sessions: &[WorkoutSession], exercise_name: &str) -> Vec<SeriesPoint> {
    sessions
        .iter()
        .filter_map(|session| {
            session
                .exercises
                .iter()
                .find(|e| same_label(&e.name, exercise_name))
                .map(|entry| (session.date, session.timestamp, summarize_entry(session.date, entry)))
        })
        .sorted_by_key(|(date, timestamp, _)| (*date, timestamp.unwrap_or(0)))
        .map(|(_, _, point)| point)
        .collect()
}

pub fn personal_records(series: &[SeriesPoint]) -> PersonalRecords {
    series.iter().fold(PersonalRecords::default(), |acc, p| PersonalRecords {
        best_weight: acc.best_weight.max(p.best_weight),
        best_one_rm: acc.best_one_rm.max(p.estimated_one_rm),
    })
}

/// `None` when the window reaches past the representable calendar.
pub fn period_window(period: Period, reference: NaiveDate) -> Option<DateWindow> {
    let (start, months) = match period {
        Period::Week => {
            let start = reference.checked_sub_days(Days::new(reference.weekday().num_days_from_monday() as u64))?;
            return Some(DateWindow { start, end: start.checked_add_days(Days::new(6))? });
        }
        Period::Month => (reference.checked_sub_days(Days::new(reference.day0() as u64))?, 1),
        Period::Year => (reference.checked_sub_days(Days::new(reference.ordinal0() as u64))?, 12),
    };
    let end = start.checked_add_months(Months::new(months))?.pred_opt()?;
    Some(DateWindow { start, end })
}

/// Moves `reference` by `steps` periods (negative goes back). Month steps
/// clamp to the last day of shorter months. `None` once the result leaves
/// the representable calendar.
pub fn shift_reference(period: Period, reference: NaiveDate, steps: i32) -> Option<NaiveDate> {
    let magnitude = steps.unsigned_abs();
    match period {
        Period::Week => {
            let days = Days::new(7 * magnitude as u64);
            if steps < 0 {
                reference.checked_sub_days(days)
            } else {
                reference.checked_add_days(days)
            }
        }
        Period::Month | Period::Year => {
            let months = if period == Period::Year { magnitude.checked_mul(12)? } else { magnitude };
            if steps < 0 {
                reference.checked_sub_months(Months::new(months))
            } else {
                reference.checked_add_months(Months::new(months))
            }
        }
    }
}

pub fn session_volume(session: &WorkoutSession) -> f64 {
    session
        .exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .map(|s| s.volume())
        .sum()
}

pub fn summarize(sessions: &[WorkoutSession], window: DateWindow) -> PeriodSummary {
    let in_window: Vec<&WorkoutSession> = sessions.iter().filter(|s| window.contains(s.date)).collect();

    PeriodSummary {
        count: in_window.len(),
        duration: in_window.iter().map(|s| s.duration.unwrap_or(0)).sum(),
        volume: in_window.iter().map(|s| session_volume(s)).sum(),
        distribution: in_window
            .iter()
            .map(|s| s.workout_type.clone())
            .counts()
            .into_iter()
            .collect(),
    }
}

pub fn bmi(profile: &UserProfile) -> f64 {
    let height_m = profile.height / 100.0;
    if height_m > 0.0 {
        profile.weight / (height_m * height_m)
    } else {
        0.0
    }
}

/// Mifflin-St Jeor resting energy expenditure, kcal/day.
pub fn bmr(profile: &UserProfile) -> f64 {
    let base = 10.0 * profile.weight + 6.25 * profile.height - 5.0 * profile.age as f64;
    match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

pub fn body_metrics(profile: &UserProfile) -> BodyMetrics {
    BodyMetrics {
        bmi: bmi(profile),
        bmr: bmr(profile),
    }
}

/// Distinct exercise names in stored order; the first spelling seen wins.
pub fn exercise_names(sessions: &[WorkoutSession]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for entry in sessions.iter().flat_map(|s| s.exercises.iter()) {
        if !names.iter().any(|n| same_label(n, &entry.name)) {
            names.push(entry.name.clone());
        }
    }
    names
}

/// Seven days ending today, each flagged when a session was logged on it.
pub fn last_seven_days(sessions: &[WorkoutSession], today: NaiveDate) -> Vec<(NaiveDate, bool)> {
    (0..7u64)
        .rev()
        .map(|back| {
            let day = today - Days::new(back);
            (day, sessions.iter().any(|s| s.date == day))
        })
        .collect()
}

/// Logged weights inside the range, oldest first. Falls back to the current
/// profile weight when nothing was logged in the range.
pub fn weight_history(
    log: &[WeightEntry],
    range: WeightRange,
    today: NaiveDate,
    current_weight: f64,
) -> Vec<(NaiveDate, f64)> {
    let window = DateWindow {
        start: today - Days::new(range.days()),
        end: today,
    };

    let points: Vec<(NaiveDate, f64)> = log
        .iter()
        .filter(|e| window.contains(e.date))
        .map(|e| (e.date, e.weight))
        .sorted_by_key(|(date, _)| *date)
        .collect();

    if points.is_empty() {
        vec![(today, current_weight)]
    } else {
        points
    }
}

/// Entries passing `filter`, each with its position in the full catalog.
pub fn filter_catalog(catalog: &[ExerciseCatalogEntry], filter: CategoryFilter) -> Vec<(usize, &ExerciseCatalogEntry)> {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, e)| filter.accepts(e.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SetEntry;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn set(weight: f64, reps: u32, bodyweight: bool) -> SetEntry {
        SetEntry {
            weight,
            reps,
            is_bodyweight: bodyweight,
            ..SetEntry::default_set()
        }
    }

    fn session(on: NaiveDate, kind: &str, exercises: Vec<(&str, Vec<SetEntry>)>) -> WorkoutSession {
        WorkoutSession {
            id: crate::models::new_id(),
            date: on,
            workout_type: kind.to_string(),
            exercises: exercises
                .into_iter()
                .map(|(name, sets)| ExerciseEntry {
                    id: crate::models::new_id(),
                    name: name.to_string(),
                    sets,
                })
                .collect(),
            duration: None,
            timestamp: None,
        }
    }

    #[test]
    fn best_set_is_highest_estimate() {
        let s = session(
            date(2024, 5, 1),
            "Push",
            vec![("Bench Press", vec![set(100.0, 1, false), set(80.0, 10, false), set(90.0, 3, false)])],
        );
        let series = series_for(&[s], "bench press");

        assert_eq!(series.len(), 1);
        let p = &series[0];
        assert_eq!(p.best_weight, 80.0);
        assert_eq!(p.best_reps, 10);
        assert_eq!(p.estimated_one_rm, 107.0);
        assert_eq!(p.total_volume, 100.0 + 800.0 + 270.0);
        assert!(!p.is_bodyweight);
    }

    #[test]
    fn bodyweight_set_wins_on_reps() {
        let s = session(
            date(2024, 5, 1),
            "Pull",
            vec![("Tractions", vec![set(0.0, 8, true), set(50.0, 12, true), set(0.0, 5, true)])],
        );
        let p = &series_for(&[s], "Tractions")[0];

        assert!(p.is_bodyweight);
        assert_eq!(p.best_reps, 12);
        assert_eq!(p.best_weight, 0.0);
        assert_eq!(p.estimated_one_rm, 0.0);
        assert_eq!(p.total_volume, 0.0);
    }

    #[test]
    fn weighted_set_after_bodyweight_needs_higher_estimate() {
        let s = session(
            date(2024, 5, 1),
            "Push",
            vec![("Dips", vec![set(0.0, 15, true), set(10.0, 6, false)])],
        );
        let p = &series_for(&[s], "Dips")[0];
        // 10kg x 6 estimates 12 > 0, so the weighted set replaces the bodyweight one.
        assert!(!p.is_bodyweight);
        assert_eq!(p.estimated_one_rm, 12.0);
        assert_eq!(p.best_reps, 6);
    }

    #[test]
    fn only_first_matching_entry_counts() {
        let s = session(
            date(2024, 5, 1),
            "Legs",
            vec![("Squat", vec![set(100.0, 5, false)]), ("squat", vec![set(140.0, 5, false)])],
        );
        let series = series_for(&[s], "SQUAT");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].best_weight, 100.0);
    }

    #[test]
    fn series_is_oldest_first_and_skips_other_sessions() {
        let newest = session(date(2024, 5, 10), "Push", vec![("Bench", vec![set(90.0, 5, false)])]);
        let unrelated = session(date(2024, 5, 5), "Legs", vec![("Squat", vec![set(120.0, 5, false)])]);
        let oldest = session(date(2024, 5, 1), "Push", vec![("Bench", vec![set(80.0, 5, false)])]);

        let series = series_for(&[newest, unrelated, oldest], "Bench");
        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 5, 10)]);
    }

    #[test]
    fn records_over_series() {
        assert_eq!(personal_records(&[]), PersonalRecords::default());

        let sessions = vec![
            session(date(2024, 5, 1), "Push", vec![("Bench", vec![set(100.0, 1, false)])]),
            session(date(2024, 5, 8), "Push", vec![("Bench", vec![set(90.0, 8, false)])]),
        ];
        let pr = personal_records(&series_for(&sessions, "Bench"));
        assert_eq!(pr.best_weight, 100.0);
        assert_eq!(pr.best_one_rm, 114.0);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-06-09 is a Sunday: it belongs to the week starting Monday 06-03.
        let w = period_window(Period::Week, date(2024, 6, 9)).unwrap();
        assert_eq!(w.start, date(2024, 6, 3));
        assert_eq!(w.end, date(2024, 6, 9));

        let w = period_window(Period::Week, date(2024, 6, 3)).unwrap();
        assert_eq!(w.start, date(2024, 6, 3));
    }

    #[test]
    fn month_and_year_windows() {
        let m = period_window(Period::Month, date(2024, 2, 17)).unwrap();
        assert_eq!((m.start, m.end), (date(2024, 2, 1), date(2024, 2, 29)));

        let y = period_window(Period::Year, date(2023, 7, 4)).unwrap();
        assert_eq!((y.start, y.end), (date(2023, 1, 1), date(2023, 12, 31)));
    }

    #[test]
    fn shifting_reference_dates() {
        let shift = |period, d, steps| shift_reference(period, d, steps).unwrap();
        assert_eq!(shift(Period::Week, date(2024, 6, 9), -1), date(2024, 6, 2));
        assert_eq!(shift(Period::Month, date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(shift(Period::Year, date(2024, 2, 29), -1), date(2023, 2, 28));
        assert_eq!(shift(Period::Month, date(2024, 3, 15), 0), date(2024, 3, 15));
    }

    #[test]
    fn huge_shifts_leave_the_calendar() {
        let d = date(2024, 6, 9);
        assert_eq!(shift_reference(Period::Year, d, 1_000_000), None);
        assert_eq!(shift_reference(Period::Year, d, i32::MAX), None);
        assert_eq!(shift_reference(Period::Week, d, 100_000_000), None);
        assert_eq!(shift_reference(Period::Month, d, i32::MIN), None);
        assert_eq!(period_window(Period::Year, NaiveDate::MAX), None);
    }

    #[test]
    fn summary_over_window() {
        let mut a = session(date(2024, 6, 3), "Push", vec![("Bench", vec![set(80.0, 10, false), set(0.0, 12, true)])]);
        a.duration = Some(50);
        let b = session(date(2024, 6, 9), "Push", vec![("Dips", vec![set(20.0, 10, true)])]);
        let mut c = session(date(2024, 6, 5), "Legs", vec![("Squat", vec![set(100.0, 5, false)])]);
        c.duration = Some(40);
        let outside = session(date(2024, 6, 10), "Pull", vec![("Row", vec![set(60.0, 10, false)])]);

        let summary = summarize(&[a, b, c, outside], period_window(Period::Week, date(2024, 6, 6)).unwrap());
        assert_eq!(summary.count, 3);
        assert_eq!(summary.duration, 90);
        assert_eq!(summary.volume, 800.0 + 500.0);
        assert_eq!(summary.distribution.get("Push"), Some(&2));
        assert_eq!(summary.distribution.get("Legs"), Some(&1));
        assert_eq!(summary.distribution.get("Pull"), None);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = summarize(&[], period_window(Period::Year, date(2024, 1, 1)).unwrap());
        assert_eq!(summary, PeriodSummary::default());
    }

    #[test]
    fn body_metrics_from_profile() {
        let male = UserProfile {
            gender: Gender::Male,
            age: 30,
            weight: 80.0,
            height: 180.0,
        };
        assert!((bmi(&male) - 24.691).abs() < 0.001);
        assert_eq!(bmr(&male), 800.0 + 1125.0 - 150.0 + 5.0);

        let female = UserProfile { gender: Gender::Female, ..male.clone() };
        assert_eq!(bmr(&male) - bmr(&female), 166.0);

        let flat = UserProfile { height: 0.0, ..male };
        assert_eq!(bmi(&flat), 0.0);
    }

    #[test]
    fn distinct_names_keep_first_spelling() {
        let sessions = vec![
            session(date(2024, 5, 2), "Push", vec![("Bench", vec![]), ("Dips", vec![])]),
            session(date(2024, 5, 1), "Push", vec![("bench", vec![]), ("Fly", vec![])]),
        ];
        assert_eq!(exercise_names(&sessions), vec!["Bench", "Dips", "Fly"]);
    }

    #[test]
    fn activity_strip_covers_a_week() {
        let sessions = vec![
            session(date(2024, 6, 9), "Push", vec![]),
            session(date(2024, 6, 1), "Legs", vec![]),
        ];
        let days = last_seven_days(&sessions, date(2024, 6, 9));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], (date(2024, 6, 3), false));
        assert_eq!(days[6], (date(2024, 6, 9), true));
        assert_eq!(days.iter().filter(|(_, trained)| *trained).count(), 1);
    }

    #[test]
    fn weight_history_uses_log_or_current() {
        let today = date(2024, 6, 30);
        assert_eq!(weight_history(&[], WeightRange::OneMonth, today, 75.0), vec![(today, 75.0)]);

        let log = vec![
            WeightEntry { date: date(2024, 6, 20), weight: 76.0 },
            WeightEntry { date: date(2024, 1, 1), weight: 80.0 },
            WeightEntry { date: date(2024, 6, 10), weight: 77.0 },
        ];
        let month = weight_history(&log, WeightRange::OneMonth, today, 76.0);
        assert_eq!(month, vec![(date(2024, 6, 10), 77.0), (date(2024, 6, 20), 76.0)]);
        assert_eq!(weight_history(&log, WeightRange::OneYear, today, 76.0).len(), 3);
    }

    #[test]
    fn catalog_filter_keeps_positions() {
        let catalog = crate::types::DEFAULT_EXERCISES.clone();
        let legs = filter_catalog(&catalog, CategoryFilter::Legs);
        assert_eq!(legs[0].0, 1);
        assert_eq!(legs[0].1.name, "Squat");
        assert!(legs.iter().all(|(_, e)| e.category == crate::types::ExerciseCategory::Legs));

        use crate::types::ExerciseCategory::{Pull, Push};
        let upper = filter_catalog(&catalog, CategoryFilter::Upper);
        assert_eq!(upper.len(), 11);
        assert!(upper.iter().all(|(_, e)| matches!(e.category, Push | Pull)));
        assert_eq!(filter_catalog(&catalog, CategoryFilter::All).len(), catalog.len());
    }

    proptest! {
        #[test]
        fn estimate_is_monotonic(weight in 0.0f64..500.0, extra in 0.0f64..50.0, reps in 0u32..50, more in 0u32..10) {
            prop_assert!(estimated_1rm(weight + extra, reps) >= estimated_1rm(weight, reps));
            prop_assert!(estimated_1rm(weight, reps + more) >= estimated_1rm(weight, reps));
        }

        #[test]
        fn bodyweight_never_adds_volume(weight in 0.0f64..300.0, reps in 0u32..100) {
            let s = session(date(2024, 1, 1), "Push", vec![("Dips", vec![set(weight, reps, true)])]);
            let p = &series_for(std::slice::from_ref(&s), "Dips")[0];
            prop_assert_eq!(p.total_volume, 0.0);
            prop_assert_eq!(p.estimated_one_rm, 0.0);
            prop_assert_eq!(session_volume(&s), 0.0);
        }
    }
}
