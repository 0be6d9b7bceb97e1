use serde::{Deserialize, Serialize};

/// The canonical "no value" response.
///
/// Every `Unit` equals every other `Unit`. Requests that produce nothing are
/// normalised to `Unit`-returning requests so that pipeline behaviors can be
/// written once for both kinds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Unit;

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("()")
    }
}

impl From<()> for Unit {
    fn from(_: ()) -> Self {
        Unit
    }
}

impl From<Unit> for () {
    fn from(_: Unit) -> Self {}
}
