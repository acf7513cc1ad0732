//! Swatchmix - Library for picking, mixing and collecting things
//!
//! This library provides functionality to:
//! - Pick items from a category palette and blend or generate a mix
//! - Name mixes and keep them in per-category galleries
//! - Recombine saved entries from every gallery into creations

pub mod catalog;
pub mod cli;
pub mod color;
pub mod composite;
pub mod config;
pub mod emoji;
pub mod engine;
pub mod gallery;
pub mod generator;
pub mod logging;
pub mod models;
pub mod output;
pub mod renderer;
pub mod selection;
pub mod storage;
pub mod studio;
