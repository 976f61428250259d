//! Kafka delivery client over rdkafka
//!
//! Synchronous producer usage: enqueue every message of the batch, poll
//! the queue, then flush bounded by the acknowledgement timeout. Delivery
//! reports are collected by the producer context, so a message that
//! failed after the client library's own retries turns the whole batch
//! into a delivery failure instead of vanishing into a callback.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};
use rdkafka::{ClientContext, Message};

use kite_record::EncodedMessage;

use crate::client::{ClientSettings, DeliveryClient, Transport};
use crate::error::{ClientBuildError, DeliveryError};
use crate::resolver::BrokerSet;

/// Producer context that keeps failed delivery reports
#[derive(Default)]
struct ReportCollector {
    failures: Mutex<Vec<(String, KafkaError)>>,
}

impl ReportCollector {
    fn drain(&self) -> Vec<(String, KafkaError)> {
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *failures)
    }
}

impl ClientContext for ReportCollector {}

impl ProducerContext for ReportCollector {
    type DeliveryOpaque = ();

    fn delivery(&self, report: &DeliveryResult<'_>, _opaque: ()) {
        if let Err((err, message)) = report {
            let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
            failures.push((message.topic().to_string(), err.clone()));
        }
    }
}

/// rdkafka-backed transport
#[derive(Debug, Clone, Copy, Default)]
pub struct KafkaTransport;

impl KafkaTransport {
    /// Create the transport
    pub fn new() -> Self {
        Self
    }
}

impl Transport for KafkaTransport {
    type Client = KafkaClient;

    fn connect(
        &self,
        brokers: &BrokerSet,
        settings: &ClientSettings,
    ) -> Result<KafkaClient, ClientBuildError> {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", brokers.to_string())
            .set("client.id", settings.client_id.as_str())
            .set("compression.codec", settings.compression.as_str())
            .set(
                "request.required.acks",
                settings.required_acks.to_string(),
            )
            .set(
                "request.timeout.ms",
                settings.ack_timeout.as_millis().to_string(),
            )
            .set(
                "message.send.max.retries",
                settings.max_retries.to_string(),
            );

        let producer: BaseProducer<ReportCollector> =
            config.create_with_context(ReportCollector::default())?;

        // the flush wait must cover the acknowledgement timeout across
        // every client-level retry
        let flush_timeout = settings.ack_timeout.saturating_mul(settings.max_retries + 1)
            + Duration::from_secs(1);

        tracing::debug!(
            brokers = %brokers,
            client_id = %settings.client_id,
            compression = settings.compression.as_str(),
            "kafka producer created"
        );

        Ok(KafkaClient {
            producer,
            flush_timeout,
        })
    }
}

/// A live producer bound to one broker set
///
/// Discarded and rebuilt wholesale when the engine recovers from a
/// delivery failure; never reused across a rebuild.
pub struct KafkaClient {
    producer: BaseProducer<ReportCollector>,
    flush_timeout: Duration,
}

impl DeliveryClient for KafkaClient {
    fn deliver(&mut self, messages: &[EncodedMessage]) -> Result<(), DeliveryError> {
        // reports left over from an earlier failed call are stale
        self.producer.context().drain();

        for message in messages {
            let mut record: BaseRecord<'_, str, [u8]> =
                BaseRecord::to(message.topic()).payload(message.payload());
            if let Some(key) = message.key() {
                record = record.key(key);
            }

            self.producer
                .send(record)
                .map_err(|(source, _)| DeliveryError::Enqueue {
                    topic: message.topic().to_string(),
                    source,
                })?;
            self.producer.poll(Duration::ZERO);
        }

        self.producer
            .flush(self.flush_timeout)
            .map_err(DeliveryError::Flush)?;

        let failures = self.producer.context().drain();
        if let Some((topic, err)) = failures.last() {
            return Err(DeliveryError::Undelivered {
                failed: failures.len(),
                total: messages.len(),
                last: format!("{topic}: {err}"),
            });
        }

        Ok(())
    }
}
