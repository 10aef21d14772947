// Traffic measurement domain model
use sqlx::FromRow;

/// One row of the grouping query: summed crossings for a location and object type
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TrafficCount {
    pub location: String,
    pub object_type: String,
    pub count: i64,
}

impl TrafficCount {
    #[cfg(test)]
    pub fn new(location: impl Into<String>, object_type: impl Into<String>, count: i64) -> Self {
        Self {
            location: location.into(),
            object_type: object_type.into(),
            count,
        }
    }
}
