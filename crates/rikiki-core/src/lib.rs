#![deny(warnings)]
//! Card model and round rules for Rikiki.

pub mod game;
pub mod model;
