//! Kitsune engine crate.
//!
//! This crate owns the lifecycle and coordination core of the 3D experience:
//! capability contracts, time/size event sources, the asset pipeline, the scene
//! holders, the world and its animated character. Platform and GPU pieces live in
//! the host (`kitsune-viewer`) and plug in through the `backend` contracts.

pub mod core;
pub mod event;
pub mod time;
pub mod size;
pub mod input;

pub mod logging;
pub mod config;
pub mod error;

pub mod scene;
pub mod camera;
pub mod backend;
pub mod assets;
pub mod animation;
pub mod debug;
pub mod holder;
pub mod world;

mod engine;

pub use engine::{Engine, EngineOptions};
pub use error::{EngineError, Result};
