//! Widget identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one widget in the catalogue.
///
/// Serializes as the bare UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(Uuid);

impl WidgetId {
    /// Allocates an id for a new widget.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
