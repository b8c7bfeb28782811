pub mod content;
pub mod record;
pub mod turn;
pub mod usage;
mod util;

pub use content::*;
pub use record::*;
pub use turn::*;
pub use usage::*;
pub use util::*;
