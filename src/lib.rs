//! Smiles Intake - incident registration for airline customer-service agents.
//!
//! # Overview
//!
//! Agents fill in an entry form (flight date, affected services,
//! ticket/locator numbers, narrative). On submit the record is sent to a
//! generative-text service, which returns a structured case summary. The
//! record is stored; the summary is shown once and discarded. Stored records
//! are listed in an admin view behind a shared password.
//!
//! # Modules
//!
//! - [`model`]: Records, form values, analyses, phases and views
//! - [`widgets`]: Field widgets, the date mask and multi-select toggling
//! - [`enrichment`]: Generative-text adapter with its fallback
//! - [`storage`]: Durable key-value slot for the record list
//! - [`gate`]: Shared-secret admin gate
//! - [`shell`]: The application controller and its state machine
//! - [`view`]: Pure rendering of the state into screens
//! - [`api`]: HTTP API handlers
//! - [`config`]: Environment configuration

pub mod api;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod gate;
pub mod model;
pub mod shell;
pub mod storage;
pub mod view;
pub mod widgets;
