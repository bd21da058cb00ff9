//! Human capital management backend with a rule-routed HR assistant.
//!
//! Employee, attendance, leave, salary and settings records sit behind an
//! [`store::EntityStore`]. The [`chat`] module answers natural-language
//! questions about them locally and only hands general questions to a
//! language model. [`api`] exposes both over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod chat;
pub mod clock;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod store;
