//! Permutation algebra, place notation and music scoring for Change Ringing.

#![deny(clippy::all)]

mod bell;
mod change;
pub mod method;
pub mod music;
mod parity;
pub mod place_not;
pub mod row;
mod stage;
mod stroke;
mod utils;

// Re-export useful data types into the top level of the crate
pub use bell::{Bell, InvalidBell, MAX_BELLS};
pub use change::{Change, InvalidChangeError};
pub use method::{Method, MethodError};
pub use music::{MusicAnalysis, MusicCollection, MusicPattern, RegisterError};
pub use parity::Parity;
pub use place_not::{interpret_pn, parse_pn, InvalidPlaceNotation, PnError, PnIter};
pub use row::{InvalidPermutation, InvalidRowError, Row, RowAccumulator, RowBuf};
pub use stage::{IncompatibleStages, InvalidStageError, Stage};
pub use stroke::{Stroke, StrokeSet};
pub use utils::run_len;
