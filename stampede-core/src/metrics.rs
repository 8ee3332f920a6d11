/// Metric names recorded for a single load test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunLabels {
    pub users: String,
    pub units: String,
    pub requests: String,
    pub errors: String,
    pub active_users: String,
}

impl RunLabels {
    pub fn new(name: &str) -> Self {
        let base = format!("stampede_{name}");
        Self {
            users: format!("{base}_users"),
            units: format!("{base}_units"),
            requests: format!("{base}_requests"),
            errors: format!("{base}_errors"),
            active_users: format!("{base}_active_users"),
        }
    }
}
