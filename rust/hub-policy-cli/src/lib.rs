//! # Hub Policy CLI
//!
//! Command line front end for [`hub_policy`]. Sessions and entities are
//! read from JSON files in the same shape the library serializes, and every
//! result is written to stdout as JSON.
//!
//! ```bash
//! hub-policy check hub:project:edit --context session.json --entity project.json
//! hub-policy capabilities --context session.json --entity project.json
//! hub-policy --rules extra.json rules --entity-type "Hub Project"
//! ```
//!
//! `check` exits with a failure status when the permission is denied, so it
//! can gate shell scripts directly.

mod cli;
pub use cli::*;

mod commands;
pub use commands::*;
