//! Sufdiff: suffix-array binary delta (bsdiff-style) diff/patch in Rust.
//!
//! The crate provides:
//! - A suffix-array match engine and three-stream patch encoder (`matcher`, `encode`)
//! - A bounds-checked patch container codec (`format`, `control`)
//! - A deterministic patch applier (`apply`)
//! - Pluggable stream compression (`compress`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! let source = b"hello old world";
//! let target = b"hello new world";
//!
//! let delta = sufdiff::diff(source, target).unwrap();
//! let rebuilt = sufdiff::patch(source, &delta).unwrap();
//! assert_eq!(rebuilt, target);
//! ```

pub mod apply;
pub mod compress;
pub mod control;
pub mod encode;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod matcher;
pub mod suffix;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{DiffOptions, diff, diff_with, patch};
pub use error::{DiffError, PatchError};
