// Domain module - Core types shared across layers
pub mod action;
pub mod config;
pub mod error;
