//! TileVision - room tile visualization driven by natural language

pub mod admin;
pub mod catalog;
pub mod command;
pub mod core;
pub mod llm;
pub mod render;
pub mod ui;
