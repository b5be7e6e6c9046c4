use once_cell::sync::Lazy;
use std::fmt::Display;
use strsim::jaro_winkler;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::{DailyGoal, ExerciseCatalogEntry, WorkoutTypePreset, same_label};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum ExerciseCategory {
    Push,
    Pull,
    Legs,
    Core,
    Other,
}

impl ExerciseCategory {
    /// Category for a new catalog entry when the caller gave none,
    /// derived from the type of the session it was logged in.
    pub fn inferred_from(workout_type: &str) -> Self {
        if same_label(workout_type, "Push") || same_label(workout_type, "Upper") {
            Self::Push
        } else if same_label(workout_type, "Pull") {
            Self::Pull
        } else if same_label(workout_type, "Legs") {
            Self::Legs
        } else {
            Self::Other
        }
    }
}

impl Display for ExerciseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Legs => "legs",
            Self::Core => "core",
            Self::Other => "other",
        };

        write!(f, "{}", s)
    }
}

/// Catalog filter; `Upper` keeps both push and pull movements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CategoryFilter {
    All,
    Push,
    Pull,
    Legs,
    Core,
    Other,
    Upper,
}

impl CategoryFilter {
    pub fn accepts(self, category: ExerciseCategory) -> bool {
        match self {
            Self::All => true,
            Self::Upper => matches!(category, ExerciseCategory::Push | ExerciseCategory::Pull),
            Self::Push => category == ExerciseCategory::Push,
            Self::Pull => category == ExerciseCategory::Pull,
            Self::Legs => category == ExerciseCategory::Legs,
            Self::Core => category == ExerciseCategory::Core,
            Self::Other => category == ExerciseCategory::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Homme", alias = "male")]
    Male,
    #[serde(rename = "Femme", alias = "female")]
    Female,
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Summary window granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Year,
}

/// Look-back range of the weight chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WeightRange {
    #[value(name = "1m")]
    OneMonth,
    #[value(name = "3m")]
    ThreeMonths,
    #[value(name = "1y")]
    OneYear,
}

impl WeightRange {
    pub fn days(self) -> u64 {
        match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::OneYear => 365,
        }
    }
}

/// Which series value a chart plots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatsMode {
    Weight,
    #[value(name = "1rm")]
    OneRm,
    Volume,
}

pub const CUSTOM_TYPE_COLOR: &str = "bg-zinc-600";

pub static DEFAULT_TYPES: Lazy<Vec<WorkoutTypePreset>> = Lazy::new(|| {
    [
        ("Push", "bg-orange-500"),
        ("Pull", "bg-blue-500"),
        ("Legs", "bg-purple-500"),
        ("Upper", "bg-emerald-500"),
    ]
    .into_iter()
    .map(|(label, color)| WorkoutTypePreset {
        label: label.to_string(),
        color: color.to_string(),
        is_custom: false,
    })
    .collect()
});

pub static DEFAULT_EXERCISES: Lazy<Vec<ExerciseCatalogEntry>> = Lazy::new(|| {
    use ExerciseCategory::*;

    [
        ("Développé Couché", Push),
        ("Squat", Legs),
        ("Tractions", Pull),
        ("Soulevé de Terre", Pull),
        ("Rowing", Pull),
        ("Curl Biceps", Pull),
        ("Dips", Push),
        ("Presse à cuisses", Legs),
        ("Élévations Latérales", Push),
        ("Extension Triceps", Push),
        ("Fentes", Legs),
        ("Leg Extension", Legs),
        ("Face Pull", Pull),
        ("Crunch", Core),
        ("Military Press", Push),
        ("Hammer Curl", Pull),
        ("Romanian Deadlift", Legs),
    ]
    .into_iter()
    .map(|(name, category)| ExerciseCatalogEntry {
        name: name.to_string(),
        category,
    })
    .collect()
});

pub static DEFAULT_GOALS: Lazy<Vec<DailyGoal>> = Lazy::new(|| {
    [
        ("g1", "Créatine"),
        ("g2", "Magnésium"),
        ("g3", "Multivitamine"),
        ("g4", "Oméga 3"),
    ]
    .into_iter()
    .map(|(id, label)| DailyGoal {
        id: id.to_string(),
        label: label.to_string(),
        completed: false,
    })
    .collect()
});

/// Return the closest candidate for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
pub fn closest_label<'a>(input: &str, candidates: &'a [String]) -> Option<&'a str> {
    let inp = input.to_lowercase();
    if inp.trim().is_empty() {
        return None;
    }

    let mut scores: Vec<(&'a str, f64)> = candidates
        .iter()
        .map(|c| (c.as_str(), jaro_winkler(&inp, &c.to_lowercase())))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best, best_score) = *scores.first()?;
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Pretty,
    Json,
}

/// Print `value` as JSON in machine mode, otherwise run the pretty printer.
pub fn emit<T, F>(fmt: OutputFmt, value: &T, pretty: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(),
{
    match fmt {
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFmt::Pretty => pretty(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_category_from_session_type() {
        assert_eq!(ExerciseCategory::inferred_from("Push"), ExerciseCategory::Push);
        assert_eq!(ExerciseCategory::inferred_from("Pull"), ExerciseCategory::Pull);
        assert_eq!(ExerciseCategory::inferred_from("Legs"), ExerciseCategory::Legs);
        assert_eq!(ExerciseCategory::inferred_from("Upper"), ExerciseCategory::Push);
        assert_eq!(ExerciseCategory::inferred_from("Cardio"), ExerciseCategory::Other);
    }

    #[test]
    fn upper_filter_keeps_push_and_pull() {
        assert!(CategoryFilter::Upper.accepts(ExerciseCategory::Push));
        assert!(CategoryFilter::Upper.accepts(ExerciseCategory::Pull));
        assert!(!CategoryFilter::Upper.accepts(ExerciseCategory::Legs));
        assert!(CategoryFilter::All.accepts(ExerciseCategory::Core));
    }

    #[test]
    fn suggests_close_names_only() {
        let names = vec!["Bench Press".to_string(), "Squat".to_string(), "Rowing".to_string()];
        assert_eq!(closest_label("bench pres", &names), Some("Bench Press"));
        assert_eq!(closest_label("zzz", &names), None);
        assert_eq!(closest_label("", &names), None);
        assert_eq!(closest_label("squat", &[]), None);
    }

    #[test]
    fn gender_keeps_french_labels() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"Femme\"");
        let g: Gender = serde_json::from_str("\"Homme\"").unwrap();
        assert_eq!(g, Gender::Male);
    }

    #[test]
    fn builtin_defaults() {
        assert_eq!(DEFAULT_EXERCISES.len(), 17);
        assert!(DEFAULT_TYPES.iter().all(|t| !t.is_custom));
    }
}
