pub mod colors;
pub mod scene;
pub mod screens;
pub mod status;
