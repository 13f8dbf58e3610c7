//! A Wi-Fi network lifecycle service built on NetworkManager.
//!
//! This crate tracks the full life of a machine's Wi-Fi view:
//!
//! - Discovering visible networks and deduplicating multi-radio broadcasts
//!   down to one record per network name
//! - Tracking which networks have trustworthy saved credentials
//! - Driving connection attempts through staged verification, so that a
//!   wrong password surfaces as a failure instead of an endless spinner
//! - Surfacing everything as an atomically published state snapshot plus
//!   an event stream
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wifistate::{NetworkService, NmBackend};
//!
//! # async fn example() -> wifistate::Result<()> {
//! let backend = Arc::new(NmBackend::connect().await?);
//! let service = NetworkService::start(backend).await?;
//!
//! service.rescan()?;
//! service.connect_network("MyNetwork", "password123")?;
//!
//! let mut events = service.events();
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! One background task owns all mutable state. Commands, backend signals,
//! activation results, and verification timers all arrive through a single
//! channel, so state handling is serialized without locks. The backend is
//! abstracted behind the [`WifiBackend`] trait; production uses
//! [`NmBackend`] (NetworkManager over D-Bus), tests use an in-memory one.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade. Add a logging
//! implementation like `env_logger` to see output.

mod access_point;
mod attempt;
mod backend;
mod constants;
mod known;
mod ledger;
mod models;
mod nm;
mod profile_builder;
mod proxies;
mod service;
mod table;
mod utils;

pub use access_point::AccessPointRecord;
pub use backend::{
    ActivationHandle, ApObservation, BackendSignal, DeviceStatus, ProfileInfo, ProfileSpec,
    SecurityFlags, WifiBackend,
};
pub use models::{
    ActiveConnectionState, DeviceState, NetworkEvent, NetworkState, SecurityShape, ServiceError,
    StateReason,
};
pub use nm::NmBackend;
pub use service::NetworkService;

/// Convenience result type for this crate.
pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
