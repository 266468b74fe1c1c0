pub mod analytics;
pub mod config;
pub mod fetch;
pub mod model;
pub mod output;
pub mod pages;
pub mod parser;
pub mod pipeline;
pub mod render;
