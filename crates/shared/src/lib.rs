//! Wire types shared between the therapy desk frontends and the backend API.

pub mod domain;
pub mod error;
pub mod protocol;
