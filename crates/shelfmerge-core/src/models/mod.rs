pub mod merged;
pub mod ordered_set;
pub mod record;
pub mod value;

pub use merged::*;
pub use ordered_set::*;
pub use record::*;
pub use value::*;
