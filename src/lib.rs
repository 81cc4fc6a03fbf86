//! LifeOps: health, finance and study tracking with model-generated
//! recommendations.

pub mod analysis;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod finance;
pub mod health;
pub mod llm;
pub mod notes;
pub mod store;
pub mod study;
pub mod todos;
pub mod web;
