//! SeaORM entity definitions for the almanac database schema.

pub mod item_name;
pub mod market_group;
pub mod prelude;
pub mod sync_marker;
