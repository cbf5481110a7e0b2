//! Upload storage keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique key for one stored upload.
///
/// Generated per request so concurrent uploads sharing a client-supplied
/// filename never collide on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadId(pub String);

impl UploadId {
    /// Generate a new random upload ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_id_generation() {
        let id1 = UploadId::new();
        let id2 = UploadId::new();
        assert_ne!(id1, id2);
    }
}
