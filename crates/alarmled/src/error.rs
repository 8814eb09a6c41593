//! Subsystem bootstrap errors.
//!
//! Start-up is the only place where errors propagate: a primitive that
//! cannot be created means its dependent units are never spawned. Once
//! the units run, every failure mode is expected exhaustion, logged and
//! absorbed in the loop that detected it.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Kex(#[from] kex::KexError),
}
