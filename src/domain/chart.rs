// Chart domain models and the row-to-series reshape
use super::traffic::TrafficCount;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Placeholder line color handed to every series
pub const DEFAULT_SERIES_COLOR: &str = "hsl(65, 70%, 50%)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: i64,
}

impl ChartPoint {
    pub fn new(x: String, y: i64) -> Self {
        Self { x, y }
    }
}

/// One line on the chart, identified by location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub id: String,
    pub color: String,
    pub data: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(id: String, color: String) -> Self {
        Self {
            id,
            color,
            data: Vec::new(),
        }
    }
}

/// Pivot flat rows into one series per location.
///
/// Series appear in the order their location is first seen and points keep
/// row order. Rows are neither sorted nor deduplicated.
pub fn fold_into_series<I>(rows: I, color: &str) -> Vec<ChartSeries>
where
    I: IntoIterator<Item = TrafficCount>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<ChartSeries> = Vec::new();

    for row in rows {
        let slot = match index.get(&row.location) {
            Some(&slot) => slot,
            None => {
                series.push(ChartSeries::new(row.location.clone(), color.to_string()));
                index.insert(row.location, series.len() - 1);
                series.len() - 1
            }
        };
        series[slot]
            .data
            .push(ChartPoint::new(row.object_type, row.count));
    }

    series
}

/// `(location, object_type)` pairs that occur more than once.
///
/// The grouping query never produces these; a non-empty result means the
/// store broke that contract.
pub fn duplicate_pairs(rows: &[TrafficCount]) -> Vec<(String, String)> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut reported: HashSet<(&str, &str)> = HashSet::new();
    let mut duplicates = Vec::new();

    for row in rows {
        let key = (row.location.as_str(), row.object_type.as_str());
        if !seen.insert(key) && reported.insert(key) {
            duplicates.push((row.location.clone(), row.object_type.clone()));
        }
    }

    duplicates
}
