//! Residential electrical panel estimation and upgrade applicability.
//!
//! For one community of simulated buildings, estimates each building's
//! installed panel amperage, then measures for every upgrade package how
//! much the electric peak rises and how often the upgraded load likely
//! requires a panel replacement under NEC 220.83 and NEC 220.87.

pub mod building;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod nec;
pub mod panel;
pub mod report;
pub mod runner;
pub mod upgrade;

pub use error::{PanelError, Result};
