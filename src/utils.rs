use chrono::NaiveDate;
use colored::Colorize;

/// Epley estimate, rounded to the nearest kilogram. Sets without reps
/// estimate nothing.
pub fn estimated_1rm(weight: f64, reps: u32) -> f64 {
    if reps == 0 {
        0.0
    } else {
        (weight * (1.0 + reps as f64 / 30.0)).round()
    }
}

/// Weights and heights are stored as JSON numbers, which cannot hold NaN or
/// infinity.
pub fn is_valid_measure(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// `m:ss`, as shown by the running session timer.
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let minutes = minutes % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Weight without a trailing `.0` for whole kilograms.
pub fn format_kg(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}kg", weight)
    } else {
        format!("{:.1}kg", weight)
    }
}

/// Chart size derived from the terminal, capped so it stays readable.
pub fn graph_dimensions() -> (usize, usize) {
    let (term_width, term_height) = term_size::dimensions().unwrap_or((80, 24));
    ((term_width / 2).clamp(10, 60), (term_height / 2).clamp(4, 15))
}

pub fn create_ascii_graph(data: &[(NaiveDate, f64)], width: usize, height: usize, title: &str) -> Vec<String> {
    if data.is_empty() {
        return vec!["No data available".to_string()];
    }

    let min_value = data.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max_value = data.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let range = max_value - min_value;

    if range == 0.0 || data.len() < 2 {
        return vec![format!("{} {}", title.bold(), "(no variation in data)".dimmed())];
    }

    let width = width.max(2);
    let height = height.max(2);
    let mut grid = vec![vec![' '; width]; height];

    let to_cell = |i: usize, value: f64| {
        let x = (i as f64 / (data.len() - 1) as f64 * (width - 1) as f64) as usize;
        let y = ((value - min_value) / range * (height - 1) as f64) as usize;
        (x.min(width - 1), height - 1 - y.min(height - 1))
    };

    for (i, (_, value)) in data.iter().enumerate() {
        let (x, y) = to_cell(i, *value);
        grid[y][x] = '●';

        // Connect to the previous point.
        if i > 0 {
            let (prev_x, prev_y) = to_cell(i - 1, data[i - 1].1);
            let dx = x as isize - prev_x as isize;
            let dy = y as isize - prev_y as isize;
            let steps = dx.abs().max(dy.abs());

            for step in 1..steps {
                let px = (prev_x as isize + dx * step / steps) as usize;
                let py = (prev_y as isize + dy * step / steps) as usize;
                if grid[py][px] == ' ' {
                    grid[py][px] = '·';
                }
            }
        }
    }

    let mut result = Vec::new();
    let step = range / (height - 1) as f64;

    result.push(format!("\n{}", title.bold()));
    result.push("─".repeat(width + 7));

    for (i, row) in grid.iter().enumerate() {
        let value = min_value + step * (height - 1 - i) as f64;
        result.push(format!("{:5.0} │{}", value, row.iter().collect::<String>()));
    }

    result.push(format!("      └{}", "─".repeat(width)));

    if let (Some(first), Some(last)) = (data.first(), data.last()) {
        result.push(format!("       {}  {}", first.0.format("%Y-%m-%d"), last.0.format("%Y-%m-%d")));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epley_rounds_and_ignores_zero_reps() {
        assert_eq!(estimated_1rm(100.0, 0), 0.0);
        assert_eq!(estimated_1rm(100.0, 1), 103.0);
        assert_eq!(estimated_1rm(80.0, 8), 101.0);
        assert_eq!(estimated_1rm(0.0, 20), 0.0);
    }

    #[test]
    fn formats_timer_and_minutes() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(65), "1:05");
        assert_eq!(format_elapsed(3600), "60:00");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(95), "1h 35m");
        assert_eq!(format_kg(80.0), "80kg");
        assert_eq!(format_kg(82.5), "82.5kg");
    }

    #[test]
    fn graph_plots_every_point() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let data = vec![(d(1), 60.0), (d(8), 70.0), (d(15), 80.0)];
        let lines = create_ascii_graph(&data, 20, 5, "Bench");
        let points: usize = lines.iter().map(|l| l.matches('●').count()).sum();
        assert_eq!(points, 3);
        assert!(lines.last().unwrap().contains("2024-01-15"));
    }

    #[test]
    fn graph_handles_flat_or_empty_data() {
        assert_eq!(create_ascii_graph(&[], 20, 5, "x"), vec!["No data available"]);
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(create_ascii_graph(&[(d, 1.0), (d, 1.0)], 20, 5, "x").len(), 1);
    }
}
