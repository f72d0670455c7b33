mod container;
mod cursor;
mod parse;
mod stage_kind;
mod stage_record;

pub use container::*;
pub use stage_kind::*;
pub use stage_record::*;
