//! Sample → filter → pool → statistics → mode → role assignment.

pub mod assign;
pub mod cluster;
pub mod detect;
pub mod hue;
pub mod pool;
pub mod sample;
pub mod stats;
pub mod weighted;
