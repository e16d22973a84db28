//! Crew scheduling backend: which staff are aboard which ships, how many
//! days they worked in a payroll window, and the ordered rows the calendar
//! and print views render.

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod logging;
pub mod parser;
pub mod schedule;
pub mod store;
pub mod web;
