use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a tracer. Survives serialization and hand-off between
/// domains, so a tracer keeps its id for its whole trajectory.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct TracerId(String);

impl From<&str> for TracerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Default for TracerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TracerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TracerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = TracerId::new();
        let b = TracerId::new();
        assert_ne!(a, b);
        assert_eq!(TracerId::from(a.as_str()), a);
        assert_eq!(a.to_string(), a.as_str());
    }
}
