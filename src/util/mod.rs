mod coding;
pub mod crc32c;
#[cfg(test)]
mod random;
mod result;

pub use coding::*;
#[cfg(test)]
pub use random::Random;
pub use result::{Code, Error, Result};
