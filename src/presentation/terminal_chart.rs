// Text rendering of the stacked line chart for terminals
use crate::domain::chart::ChartSeries;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

/// One row per object type. Each series column holds the running (stacked)
/// total up to and including that series; `-` marks a missing point.
pub fn render_chart(title: &str, series: &[ChartSeries]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    if series.is_empty() {
        out.push_str("No data yet\n");
        return out;
    }

    let mut categories: Vec<&str> = Vec::new();
    for s in series {
        for point in &s.data {
            if !categories.contains(&point.x.as_str()) {
                categories.push(&point.x);
            }
        }
    }

    let mut rows: Vec<(Vec<Option<i64>>, i64)> = Vec::with_capacity(categories.len());
    for category in &categories {
        let mut stack = 0;
        let cells = series
            .iter()
            .map(|s| {
                let y = s.data.iter().find(|p| p.x == *category).map(|p| p.y);
                if let Some(y) = y {
                    stack += y;
                }
                y.map(|_| stack)
            })
            .collect();
        rows.push((cells, stack));
    }

    let label_width = categories
        .iter()
        .map(|c| c.len())
        .chain(std::iter::once("transportation".len()))
        .max()
        .unwrap_or(0);
    let column_width = series.iter().map(|s| s.id.len()).max().unwrap_or(0).max(6);
    let max_total = rows.iter().map(|(_, total)| *total).max().unwrap_or(0);

    let _ = write!(out, "{:<label_width$}", "transportation");
    for s in series {
        let _ = write!(out, "  {:>column_width$}", s.id);
    }
    out.push('\n');

    for (category, (cells, total)) in categories.iter().zip(&rows) {
        let _ = write!(out, "{:<label_width$}", category);
        for cell in cells {
            match cell {
                Some(value) => {
                    let _ = write!(out, "  {:>column_width$}", value);
                }
                None => {
                    let _ = write!(out, "  {:>column_width$}", "-");
                }
            }
        }
        let bar = if max_total > 0 {
            ((*total).max(0) as usize * BAR_WIDTH) / max_total as usize
        } else {
            0
        };
        let _ = writeln!(out, "  {}", "#".repeat(bar));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::{fold_into_series, DEFAULT_SERIES_COLOR};
    use crate::domain::traffic::TrafficCount;

    #[test]
    fn test_render_empty_chart() {
        let text = render_chart("Traffic", &[]);
        assert_eq!(text, "Traffic\nNo data yet\n");
    }

    #[test]
    fn test_render_stacks_series_per_category() {
        let series = fold_into_series(
            vec![
                TrafficCount::new("A", "car", 5),
                TrafficCount::new("A", "truck", 2),
                TrafficCount::new("B", "car", 7),
            ],
            DEFAULT_SERIES_COLOR,
        );

        let text = render_chart("Traffic", &series);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), vec!["transportation", "A", "B"]);

        let car: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(&car[..3], &["car", "5", "12"]);
        assert_eq!(car[3].len(), BAR_WIDTH);

        let truck: Vec<&str> = lines[3].split_whitespace().collect();
        assert_eq!(&truck[..3], &["truck", "2", "-"]);
        assert_eq!(truck[3].len(), 2 * BAR_WIDTH / 12);
    }
}
