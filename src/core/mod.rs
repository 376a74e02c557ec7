//! Core domain logic: models, quota accounting, and the per-request pipeline

pub mod models;
pub mod pipeline;
pub mod quota;
