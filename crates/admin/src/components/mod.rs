//! Reusable view-model pieces for admin list pages.

pub mod status_tabs;

pub use status_tabs::{SelectOption, StatusTab, TabStatus, status_tabs};
