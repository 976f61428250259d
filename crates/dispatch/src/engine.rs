//! Dispatch Engine - orchestration and failure recovery
//!
//! Consumes one record group at a time, strictly in input order: map,
//! route, encode, batch, send. All work happens synchronously inside the
//! dispatching call; there are no background tasks or internal locks.
//!
//! # Recovery
//!
//! A failed send flips the engine into recovery: the broker set is
//! re-resolved, the delivery client rebuilt against whatever came back,
//! and the *original* failure is raised to the caller. The failed group
//! is never retried internally; upstream re-delivers it, which is what
//! makes the pipeline at-least-once.

use kite_broker::{
    BrokerResolver, BrokerSet, ClientSettings, Compression, DeliveryClient, DeliveryError,
    RegistryClient, RegistryResolver, StaticResolver, Transport,
};
use kite_config::{
    parse_field_mapping, parse_value_conversions, CompressionCodec, Config, FieldSeparator,
};
use kite_record::{
    value_text, EncodedMessage, Encoder, Envelope, EnvelopeReader, FieldMapper, FormatterRegistry,
    Record, Separator,
};

use crate::batch::{Batch, BatchAssembler, DEFAULT_MAX_BATCH_BYTES};
use crate::error::{BuildError, DispatchError, Result};
use crate::metrics::DispatchMetrics;

/// Routing and batching options for one engine instance
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Topic for records that carry none; the tag is used when this is
    /// unset too
    pub default_topic: Option<String>,

    /// Partition key for records that carry none
    pub partition_key: Option<String>,

    /// Aggregate batch byte budget
    pub max_batch_bytes: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_topic: None,
            partition_key: None,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
        }
    }
}

/// The record dispatch engine
///
/// Owns the current broker set and delivery client exclusively; both are
/// replaced wholesale during recovery. One instance per destination
/// configuration, invoked by one caller at a time.
pub struct DispatchEngine<T: Transport> {
    config: DispatchConfig,
    encoder: Encoder,
    mapper: Option<FieldMapper>,
    resolver: Box<dyn BrokerResolver>,
    transport: T,
    settings: ClientSettings,
    brokers: BrokerSet,
    client: Option<T::Client>,
    assembler: BatchAssembler,
    metrics: DispatchMetrics,
}

impl<T: Transport> DispatchEngine<T> {
    /// Create an engine from already-built parts
    ///
    /// Resolves the initial broker set and builds the first client;
    /// failures there are logged and leave the engine without a client
    /// until a later refresh succeeds.
    pub fn new(
        config: DispatchConfig,
        encoder: Encoder,
        mapper: Option<FieldMapper>,
        resolver: Box<dyn BrokerResolver>,
        transport: T,
        settings: ClientSettings,
    ) -> Self {
        let assembler = BatchAssembler::new(config.max_batch_bytes);
        let mut engine = Self {
            config,
            encoder,
            mapper,
            resolver,
            transport,
            settings,
            brokers: BrokerSet::default(),
            client: None,
            assembler,
            metrics: DispatchMetrics::new(),
        };
        engine.refresh();
        engine
    }

    /// Create an engine from a loaded configuration
    ///
    /// `registry` supplies the coordination-registry connection when the
    /// configuration selects dynamic broker resolution; `formatters`
    /// backs any delegated encoding selector.
    pub fn from_config(
        config: &Config,
        transport: T,
        registry: Option<Box<dyn RegistryClient>>,
        mut formatters: FormatterRegistry,
    ) -> std::result::Result<Self, BuildError> {
        config.validate()?;

        let resolver: Box<dyn BrokerResolver> = if config.brokers.is_dynamic() {
            let client = registry.ok_or(BuildError::MissingRegistryClient)?;
            Box::new(RegistryResolver::new(
                client,
                config.brokers.registry_path.clone(),
            ))
        } else {
            Box::new(StaticResolver::new(
                config.brokers.endpoints.as_deref().unwrap_or_default(),
            ))
        };

        let mapping = parse_field_mapping(&config.fields.mapping)?;
        let conversions = parse_value_conversions(&config.fields.conversions)?;
        let mapper = if mapping.is_empty() {
            None
        } else {
            Some(FieldMapper::new(mapping, conversions))
        };

        let encoder = Encoder::from_selector(
            &config.format.encoding,
            separator(config.format.separator),
            config.format.include_tag,
            config.format.include_time,
            &mut formatters,
        )?;

        let settings = ClientSettings::default()
            .with_client_id(config.delivery.client_id.clone())
            .with_compression(compression(config.delivery.compression))
            .with_required_acks(config.delivery.required_acks)
            .with_ack_timeout(config.delivery.ack_timeout)
            .with_max_retries(config.delivery.max_retries);

        let dispatch = DispatchConfig {
            default_topic: config.route.default_topic.clone(),
            partition_key: config.route.partition_key.clone(),
            max_batch_bytes: config.batch.max_bytes,
        };

        Ok(Self::new(
            dispatch, encoder, mapper, resolver, transport, settings,
        ))
    }

    /// The broker set the current client was built from
    pub fn brokers(&self) -> &BrokerSet {
        &self.brokers
    }

    /// Whether a delivery client is currently available
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Engine counters
    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Dispatch one record group
    ///
    /// Returns `Ok` only when every record was encoded and every batch
    /// delivered. On failure the caller owns re-delivery of the whole
    /// group.
    pub fn dispatch<I>(&mut self, group: I) -> Result<()>
    where
        I: IntoIterator<Item = Envelope>,
    {
        self.metrics.group_received();
        let outcome = self.run_group(group.into_iter().map(Ok));
        self.finish_group(outcome)
    }

    /// Dispatch a MessagePack-framed chunk of envelopes
    pub fn dispatch_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.metrics.group_received();
        let frames = EnvelopeReader::new(chunk).map(|frame| frame.map_err(DispatchError::from));
        let outcome = self.run_group(frames);
        self.finish_group(outcome)
    }

    /// Dispatch a single record in non-batched mode
    ///
    /// The continuation signal is invoked before processing starts, so
    /// upstream has already passed the record on when a later failure
    /// asks it to re-deliver.
    pub fn dispatch_event<F>(&mut self, envelope: Envelope, notify: F) -> Result<()>
    where
        F: FnOnce(),
    {
        notify();
        self.dispatch(std::iter::once(envelope))
    }

    fn run_group<I>(&mut self, frames: I) -> Result<()>
    where
        I: Iterator<Item = Result<Envelope>>,
    {
        for frame in frames {
            self.process(frame?)?;
        }

        if let Some(remainder) = self.assembler.finish() {
            self.send(remainder)?;
        }

        Ok(())
    }

    /// A failed group leaves nothing half-assembled behind; upstream
    /// re-delivers the group in full.
    fn finish_group(&mut self, outcome: Result<()>) -> Result<()> {
        if outcome.is_err() {
            if let Some(dropped) = self.assembler.finish() {
                tracing::debug!(
                    messages = dropped.len(),
                    "discarded partial batch after group failure"
                );
            }
        }
        outcome
    }

    fn process(&mut self, envelope: Envelope) -> Result<()> {
        let Envelope { tag, time, record } = envelope;

        let record = match &self.mapper {
            Some(mapper) => mapper.map(&record),
            None => record,
        };

        let topic = field_text(&record, "topic")
            .or_else(|| self.config.default_topic.clone())
            .unwrap_or_else(|| tag.clone());
        let key =
            field_text(&record, "partition_key").or_else(|| self.config.partition_key.clone());

        let payload = self.encoder.encode(&tag, time, &record)?;
        self.metrics.record_processed();

        if let Some(full) = self.assembler.push(EncodedMessage::new(topic, payload, key)) {
            self.send(full)?;
        }

        Ok(())
    }

    fn send(&mut self, batch: Batch) -> Result<()> {
        let messages = batch.len();
        let bytes = batch.total_bytes();

        let outcome = match self.client.as_mut() {
            Some(client) => client.deliver(batch.messages()),
            None => Err(DeliveryError::NoClient),
        };

        match outcome {
            Ok(()) => {
                self.metrics.batch_sent(messages as u64, bytes as u64);
                tracing::debug!(messages, bytes, "batch delivered");
                Ok(())
            }
            Err(err) => {
                self.metrics.batch_failed();
                tracing::warn!(
                    error = %err,
                    messages,
                    "batch delivery failed, refreshing broker set"
                );
                self.refresh();
                Err(DispatchError::Delivery(err))
            }
        }
    }

    /// Re-resolve the broker set and rebuild the client against it
    ///
    /// Both steps are best-effort: a failure leaves the engine without a
    /// client, to be retried on the next refresh.
    fn refresh(&mut self) {
        self.brokers = match self.resolver.resolve() {
            Ok(brokers) => brokers,
            Err(err) => {
                tracing::warn!(error = %err, "broker resolution failed");
                BrokerSet::default()
            }
        };

        self.client = self.connect();
        self.metrics.client_rebuilt();
    }

    fn connect(&mut self) -> Option<T::Client> {
        if self.brokers.is_empty() {
            tracing::warn!("broker set is empty, delivery disabled until the next refresh");
            return None;
        }

        match self.transport.connect(&self.brokers, &self.settings) {
            Ok(client) => {
                tracing::info!(brokers = %self.brokers, "delivery client ready");
                Some(client)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    brokers = %self.brokers,
                    "delivery client build failed"
                );
                None
            }
        }
    }
}

/// Text of a record field, for routing lookups
fn field_text(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .map(value_text)
        .filter(|text| !text.is_empty())
}

fn separator(token: FieldSeparator) -> Separator {
    match token {
        FieldSeparator::Space => Separator::Space,
        FieldSeparator::Comma => Separator::Comma,
        FieldSeparator::Soh => Separator::Soh,
        FieldSeparator::Tab => Separator::Tab,
    }
}

fn compression(codec: CompressionCodec) -> Compression {
    match codec {
        CompressionCodec::None => Compression::None,
        CompressionCodec::Gzip => Compression::Gzip,
        CompressionCodec::Snappy => Compression::Snappy,
        CompressionCodec::Lz4 => Compression::Lz4,
        CompressionCodec::Zstd => Compression::Zstd,
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
