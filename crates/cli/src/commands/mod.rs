pub mod check;
pub mod inspect;
pub mod util;
pub mod visualize;

pub use check::*;
pub use inspect::*;
pub use util::*;
pub use visualize::*;
