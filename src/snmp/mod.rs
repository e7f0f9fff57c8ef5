pub mod auth;
pub mod client;
pub mod error;
pub mod oid;
pub mod session;
pub mod table;

#[cfg(test)]
pub mod mock;

pub use auth::{AuthConfig, Credential, SecurityLevel, SnmpVersion, Target, build};
pub use client::{DEFAULT_MAX_REPETITIONS, SnmpClient};
pub use error::{SessionFailure, SnmpError};
pub use oid::Oid;
pub use session::{Exchange, UdpExchange};
pub use table::Table;
