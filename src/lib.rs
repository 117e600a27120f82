pub mod analysis;
pub mod args;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod landmarks;
pub mod output;
pub mod report;
pub mod scanner;
pub mod types;
pub mod view;
