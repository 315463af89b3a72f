//! CLI library components for Gridport.

pub mod logging;
