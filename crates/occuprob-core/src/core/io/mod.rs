//! Provides the input/output boundary of the library.
//!
//! The traits in [`traits`] decouple the thermodynamic engine from where minima
//! come from and where results go. [`isomers`] reads minima from TOML or
//! extended XYZ ([`extxyz`]) isomer files and [`dat`] writes results as
//! whitespace-separated tables.

pub mod dat;
pub mod extxyz;
pub mod isomers;
pub mod traits;
