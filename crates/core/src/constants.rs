//! Constants used throughout the Infoctor core crate.
//!
//! Environment variable names are collected here so the binary and the config
//! resolver agree on them.

/// Environment variable overriding `MSH-3`.
pub const SENDING_APPLICATION_ENV: &str = "INTEROP_SENDING_APPLICATION";

/// Environment variable overriding `MSH-4`.
pub const SENDING_FACILITY_ENV: &str = "INTEROP_SENDING_FACILITY";

/// Environment variable overriding `MSH-5`.
pub const RECEIVING_APPLICATION_ENV: &str = "INTEROP_RECEIVING_APPLICATION";

/// Environment variable overriding `MSH-6`.
pub const RECEIVING_FACILITY_ENV: &str = "INTEROP_RECEIVING_FACILITY";

/// Environment variable naming the default MLLP receiver host.
pub const MLLP_HOST_ENV: &str = "MLLP_HOST";

/// Environment variable naming the default MLLP receiver port.
pub const MLLP_PORT_ENV: &str = "MLLP_PORT";

/// Port conventionally used by MLLP listeners.
pub const DEFAULT_MLLP_PORT: u16 = 2575;
