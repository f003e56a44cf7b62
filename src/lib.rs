pub mod app;
pub mod camera;
pub mod cli;
pub mod controls;
pub mod core;
pub mod error;
pub mod geometry;
pub mod gui;
pub mod math;
pub mod params;
pub mod renderer;
pub mod scene;
pub mod scenes;
pub mod textures;
pub mod types;
pub mod viewport;
pub mod window;

pub use error::{Result, SceneLabError};
pub use scenes::{create_cube_scene, create_materials_scene, create_scene};
