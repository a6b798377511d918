pub mod calibration;
pub mod chart;
pub mod config;
pub mod data;
pub mod display;
pub mod editor;
pub mod leaderboard;
pub mod monitoring;
pub mod pricing;
