// src/core/mod.rs

pub mod html;
pub mod numbers;
pub mod patterns;
pub mod sanitize;
pub mod vischars;

pub use vischars::VisChars;
