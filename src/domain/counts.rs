// Crossing tallies kept by the counter recorder
use serde::Deserialize;
use std::collections::BTreeMap;

/// Object classes the detector reports
pub const TRACKED_CLASSES: [&str; 5] = ["bus", "car", "motorcycle", "person", "truck"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub in_count: i64,
    pub out_count: i64,
}

/// Objects that crossed the counting line in one detector frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrossingEvent {
    #[serde(default, rename = "in")]
    pub entered: Vec<String>,
    #[serde(default, rename = "out")]
    pub exited: Vec<String>,
}

/// Per-class in/out tallies for a single location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossingCounts {
    counts: BTreeMap<String, ClassCounts>,
}

impl Default for CrossingCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossingCounts {
    pub fn new() -> Self {
        let counts = TRACKED_CLASSES
            .iter()
            .map(|c| (c.to_string(), ClassCounts::default()))
            .collect();
        Self { counts }
    }

    /// Overwrite the tallies of a tracked class. Untracked classes are ignored.
    pub fn set(&mut self, object_type: &str, counts: ClassCounts) {
        if let Some(slot) = self.counts.get_mut(object_type) {
            *slot = counts;
        }
    }

    /// Count one event. Returns how many class names were tracked.
    pub fn apply(&mut self, event: &CrossingEvent) -> usize {
        let mut applied = 0;
        for class in &event.entered {
            if let Some(slot) = self.counts.get_mut(class.as_str()) {
                slot.in_count += 1;
                applied += 1;
            }
        }
        for class in &event.exited {
            if let Some(slot) = self.counts.get_mut(class.as_str()) {
                slot.out_count += 1;
                applied += 1;
            }
        }
        applied
    }

    pub fn get(&self, object_type: &str) -> Option<ClassCounts> {
        self.counts.get(object_type).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ClassCounts)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
