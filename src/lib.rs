//! passkc: a Unix-style password manager over the platform secret store
//!
//! Layers, innermost first: `domain` (entities, validation), `application`
//! (credential service), `infrastructure` (store backends, prompts, DI) and
//! `cli` (arguments, dispatch, rendering).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod util;
