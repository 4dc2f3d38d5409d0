//! Exit codes for the CLI.
//!
//! Scripts typically only care about "on Lustre or not", so that outcome
//! gets its own code distinct from genuine failures.

/// Successful execution
pub const SUCCESS: u8 = 0;

/// General/unspecified error
pub const GENERAL_ERROR: u8 = 1;

/// The path exists but is not on a Lustre filesystem
pub const NOT_LUSTRE: u8 = 2;

/// The path (or an ancestor) does not exist
pub const NOT_FOUND: u8 = 3;

/// Permission denied while inspecting the path
pub const PERMISSION_DENIED: u8 = 4;

/// Command-line usage error (bad arguments), as in sysexits.h
pub const USAGE_ERROR: u8 = 64;
