//! HTML presentation: template types and rendering helpers.

pub mod views;
