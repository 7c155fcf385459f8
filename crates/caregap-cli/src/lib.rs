//! Library surface for the caregap CLI.
//!
//! Only logging lives here; everything else is private to the binary.

pub mod logging;
