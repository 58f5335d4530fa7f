mod accumulator;
mod borrowed; // Contains `Row`
mod errors;
mod owned; // Contains `RowBuf`

pub use accumulator::RowAccumulator;
pub use borrowed::{BellIter, Row};
pub use errors::{InvalidPermutation, InvalidRowError};
pub use owned::RowBuf;
