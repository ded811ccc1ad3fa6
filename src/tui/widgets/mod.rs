//! TUI widgets

pub mod breakdown;
pub mod daily;
pub mod help;
pub mod spinner;
pub mod tabs;
pub mod users;
