//! Unit test suite for wfimport's public parsing helpers.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod directives;
mod import_specs;
