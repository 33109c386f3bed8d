use serde::{Deserialize, Serialize};

/// Canonical per-cell state derived by the gameplay engine.
///
/// A selected cell stays `Selected` even when it has also been blacked out,
/// so a frozen pick is still visible after a forced reveal.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Blank,
    Selected,
    Greyed,
    Confirmed,
    ForcedReveal,
}
