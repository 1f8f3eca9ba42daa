use thiserror::Error;

use skyhop_core::GameState;

/// Failures surfaced by the simulation's non-steady-state entry points
/// (snapshot restore and config parsing). Tick and input handling never fail.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("snapshot could not be encoded: {0}")]
    SnapshotEncode(#[from] rmp_serde::encode::Error),

    #[error("snapshot could not be decoded: {0}")]
    SnapshotDecode(#[from] rmp_serde::decode::Error),

    #[error("snapshot has {found} platforms, simulation is configured for {expected}")]
    PlatformCountMismatch { expected: usize, found: usize },

    #[error("snapshot {body} is {found_width}x{found_height}, simulation is configured for {expected_width}x{expected_height}")]
    SizeMismatch {
        body: String,
        expected_width: f64,
        expected_height: f64,
        found_width: f64,
        found_height: f64,
    },

    #[error("snapshot is {state:?} but the arena was never initialized")]
    Uninitialized { state: GameState },

    #[error("config could not be parsed: {0}")]
    Config(#[from] toml::de::Error),
}
