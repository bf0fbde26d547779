mod count;
mod errors;
mod time;

pub use count::Count;
pub use errors::*;
pub use time::Milliseconds;
