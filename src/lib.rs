//! codema - target-oriented code generation from declarative API definitions.
//!
//! A [`core::Config`] declares APIs, their microservices and models, and the targets
//! to render them with. [`generation::Generator`] walks the selected targets, expands
//! template macros and snippets, renders through Tera or Handlebars, pipes the result
//! through the target's plugins and writes it with a read-only-by-default mode.
#![deny(unsafe_code)]

pub mod core;
pub mod generation;
pub mod infrastructure;
