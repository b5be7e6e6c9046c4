use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use gymtracker::types::{CategoryFilter, ExerciseCategory, Gender, Period, StatsMode, WeightRange};

#[derive(Parser)]
#[command(name = "gymtracker", version, about = "Workout tracker: sessions, progress stats and body metrics")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Database file (overrides the `db_path` config key)
    #[arg(global = true, long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(global = true, short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record the workout in progress
    #[command(subcommand, visible_alias = "s")]
    Session(SessionCmd),

    /// Finished sessions
    #[command(subcommand, visible_alias = "h")]
    History(HistoryCmd),

    /// Per-exercise progression
    #[command(subcommand, visible_alias = "st")]
    Stats(StatsCmd),

    /// Totals for a week, month or year
    #[command(visible_alias = "sum")]
    Summary {
        #[arg(short, long, value_enum, default_value_t = Period::Week)]
        period: Period,

        /// Any day inside the period (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Move by this many periods (negative goes back)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        shift: i32,
    },

    /// Last seven days, daily goals and body metrics at a glance
    Status {
        /// Look-back range of the weight history
        #[arg(short, long, value_enum, default_value_t = WeightRange::OneMonth)]
        range: WeightRange,

        /// Show the weight history as a graph
        #[arg(short, long)]
        graph: bool,
    },

    /// Show training sessions in a calendar view
    #[command(visible_alias = "cal")]
    Calendar {
        /// Year to show (defaults to current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show (1-12, defaults to current month)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Exercise catalog
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),

    /// Workout types
    #[command(subcommand, visible_alias = "t")]
    Type(TypeCmd),

    /// Daily goals checklist
    #[command(subcommand, visible_alias = "g")]
    Goal(GoalCmd),

    /// Body profile
    #[command(subcommand, visible_alias = "p")]
    Profile(ProfileCmd),

    /// Backup export and import
    #[command(subcommand)]
    Db(DbCmd),

    /// View or edit gymtracker config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Start a session of the given type
    #[command(visible_alias = "s")]
    Start {
        #[arg(value_name = "TYPE")]
        workout_type: String,
    },

    /// Add an exercise to the current session
    #[command(visible_alias = "a", trailing_var_arg = true)]
    AddEx {
        /// Category recorded when the name is new to the catalog
        #[arg(short, long, value_enum)]
        category: Option<ExerciseCategory>,

        /// Exercise name
        name: Vec<String>,
    },

    /// Add a set copying the last one - Usage: session add-set EXERCISE
    #[command(visible_alias = "as")]
    AddSet {
        /// Exercise index (same order shown in `session show`)
        #[arg(value_name = "EXERCISE")]
        exercise: usize,
    },

    /// Edit a set in the current session - Usage: session edit EXERCISE SET [--reps N] [--weight KG]
    #[command(visible_alias = "e")]
    Edit {
        /// Exercise index
        #[arg(value_name = "EXERCISE")]
        exercise: usize,

        /// Set index
        #[arg(value_name = "SET")]
        set: usize,

        /// Number of reps
        #[arg(short, long)]
        reps: Option<u32>,

        /// Weight in kg
        #[arg(short, long, allow_negative_numbers = true)]
        weight: Option<f64>,
    },

    /// Toggle bodyweight on a set (clears its weight)
    Bw {
        #[arg(value_name = "EXERCISE")]
        exercise: usize,
        #[arg(value_name = "SET")]
        set: usize,
    },

    /// Toggle a set as completed
    #[command(visible_alias = "d")]
    Done {
        #[arg(value_name = "EXERCISE")]
        exercise: usize,
        #[arg(value_name = "SET")]
        set: usize,
    },

    /// Remove an exercise from the current session
    #[command(visible_alias = "rm")]
    RmEx {
        #[arg(value_name = "EXERCISE")]
        exercise: usize,
    },

    /// Show current session details
    #[command(visible_alias = "i")]
    Show,

    /// Live session timer (Ctrl-C to stop watching)
    #[command(visible_alias = "w")]
    Watch,

    /// Finish the current session and save it to history
    #[command(visible_alias = "f")]
    Finish,

    /// Discard the current session
    #[command(visible_alias = "c")]
    Cancel,
}

#[derive(Subcommand)]
pub enum HistoryCmd {
    /// List finished sessions, newest first
    #[command(visible_alias = "l")]
    List {
        /// Only show the N most recent sessions
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show one finished session
    #[command(visible_alias = "s")]
    Show {
        /// Session index (from `history list`)
        session: usize,
    },

    /// Delete a finished session
    #[command(visible_alias = "d")]
    Delete {
        /// Session index (from `history list`)
        session: usize,
    },
}

#[derive(Subcommand)]
pub enum StatsCmd {
    /// Exercises present in history
    #[command(visible_alias = "l")]
    List,

    /// Progression of one exercise
    #[command(visible_alias = "e", trailing_var_arg = true)]
    Exercise {
        /// Value plotted with --graph
        #[arg(short, long, value_enum, default_value_t = StatsMode::Weight)]
        mode: StatsMode,

        /// Show progression graph
        #[arg(short, long)]
        graph: bool,

        /// Exercise index (from `stats list`) or name
        exercise: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ExerciseCmd {
    /// List the exercise catalog
    #[command(visible_alias = "l")]
    List {
        #[arg(short, long, value_enum, default_value_t = CategoryFilter::All)]
        category: CategoryFilter,
    },

    /// Delete a catalog entry (history is kept)
    #[command(visible_alias = "d", trailing_var_arg = true)]
    Delete {
        /// Exercise index or name
        exercise: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TypeCmd {
    /// List workout types
    #[command(visible_alias = "l")]
    List,

    /// Add a custom workout type
    #[command(visible_alias = "a")]
    Add { label: String },

    /// Delete a custom workout type
    #[command(visible_alias = "d")]
    Delete {
        /// Type index or label
        workout_type: String,
    },
}

#[derive(Subcommand)]
pub enum GoalCmd {
    /// Show today's checklist
    #[command(visible_alias = "l")]
    List,

    /// Add a goal
    #[command(visible_alias = "a", trailing_var_arg = true)]
    Add { label: Vec<String> },

    /// Check or uncheck a goal
    #[command(visible_alias = "t")]
    Toggle {
        /// Goal index
        goal: usize,
    },

    /// Delete a goal
    #[command(visible_alias = "d")]
    Delete {
        /// Goal index
        goal: usize,
    },
}

#[derive(Subcommand)]
pub enum ProfileCmd {
    /// Show profile with BMI and BMR
    #[command(visible_alias = "s")]
    Show,

    /// Update one or more profile fields
    Set {
        #[arg(short, long, value_enum)]
        gender: Option<Gender>,

        #[arg(short, long)]
        age: Option<u32>,

        /// Kilograms; also logged in the weight history
        #[arg(short, long)]
        weight: Option<f64>,

        /// Centimetres
        #[arg(long)]
        height: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum DbCmd {
    /// Export everything to a JSON backup
    Export {
        /// Output file path (defaults to gymtracker_backup_<date>.json in `export_dir`)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Import a JSON backup; collections it contains replace the stored ones
    Import {
        /// Input JSON file path
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
