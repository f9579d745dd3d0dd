pub mod scenario;
mod util;

pub use util::*;
