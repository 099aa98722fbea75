//! Reorganise a flat photo export into one folder per catalog album.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod naming;
pub mod organise;
pub mod relocate;
pub mod tree;
