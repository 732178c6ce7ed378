mod draft;
mod record;
mod stats;

pub use draft::*;
pub use record::*;
pub use stats::*;

pub(crate) use stats::round2;
