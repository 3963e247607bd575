//! Core library for Atelier: weekly meal-plan synthesis with a
//! deterministic offline fallback, calendar export and session state.

pub mod calendar;
pub mod model;
pub mod session;
pub mod synthesis;
