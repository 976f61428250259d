//! Kite - Broker Layer
//!
//! Everything between an assembled batch and the broker cluster: finding
//! out which brokers exist ([`BrokerResolver`]) and pushing messages at
//! them ([`Transport`] / [`DeliveryClient`]).
//!
//! # Design
//!
//! - Broker discovery is a strategy fixed at configuration time: a
//!   [`StaticResolver`] splits a configured endpoint list once, a
//!   [`RegistryResolver`] re-queries a coordination registry on every
//!   refresh so membership changes are picked up.
//! - The registry connection itself is behind the [`RegistryClient`]
//!   trait; wiring up a concrete coordination service is the host's job.
//! - The delivery client is built from a [`BrokerSet`] plus fixed
//!   [`ClientSettings`], and is discarded wholesale when the engine
//!   rebuilds after a failure. The rdkafka-backed [`KafkaTransport`] is
//!   the production implementation; tests substitute their own.

mod client;
mod error;
mod kafka;
mod registry;
mod resolver;

pub use client::{ClientSettings, Compression, DeliveryClient, Transport};
pub use error::{ClientBuildError, DeliveryError, RegistryError, ResolveError};
pub use kafka::{KafkaClient, KafkaTransport};
pub use registry::RegistryClient;
pub use resolver::{BrokerResolver, BrokerSet, RegistryResolver, StaticResolver};
