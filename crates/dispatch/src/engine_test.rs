use super::*;
use kite_broker::{ClientBuildError, RegistryError, ResolveError};
use serde_json::json;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn envelope(tag: &str, time: i64, value: serde_json::Value) -> Envelope {
    Envelope::new(tag, time, record(value))
}

fn json_encoder() -> Encoder {
    let mut registry = FormatterRegistry::new();
    Encoder::from_selector("json", Separator::Tab, false, false, &mut registry)
        .expect("resolve selector")
}

fn attr_encoder(names: &str) -> Encoder {
    let mut registry = FormatterRegistry::new();
    Encoder::from_selector(
        &format!("attr:{names}"),
        Separator::Comma,
        false,
        false,
        &mut registry,
    )
    .expect("resolve selector")
}

// =============================================================================
// Scripted transport
// =============================================================================

#[derive(Default)]
struct TransportState {
    connects: AtomicUsize,
    deliver_calls: AtomicUsize,
    fail_deliveries: AtomicUsize,
    refuse_connect: AtomicBool,
    last_brokers: Mutex<String>,
    deliveries: Mutex<Vec<Vec<EncodedMessage>>>,
    events: Mutex<Vec<String>>,
}

#[derive(Clone, Default)]
struct ScriptedTransport {
    state: Arc<TransportState>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self::default()
    }

    fn deliveries(&self) -> Vec<Vec<EncodedMessage>> {
        self.state.deliveries.lock().unwrap().clone()
    }

    fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    fn deliver_calls(&self) -> usize {
        self.state.deliver_calls.load(Ordering::SeqCst)
    }

    fn fail_next_deliveries(&self, count: usize) {
        self.state.fail_deliveries.store(count, Ordering::SeqCst);
    }

    fn refuse_connects(&self) {
        self.state.refuse_connect.store(true, Ordering::SeqCst);
    }

    fn last_brokers(&self) -> String {
        self.state.last_brokers.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<String> {
        self.state.events.lock().unwrap().clone()
    }

    fn push_event(&self, event: &str) {
        self.state.events.lock().unwrap().push(event.to_string());
    }
}

struct ScriptedClient {
    state: Arc<TransportState>,
}

impl Transport for ScriptedTransport {
    type Client = ScriptedClient;

    fn connect(
        &self,
        brokers: &BrokerSet,
        _settings: &ClientSettings,
    ) -> std::result::Result<ScriptedClient, ClientBuildError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        *self.state.last_brokers.lock().unwrap() = brokers.to_string();

        if self.state.refuse_connect.load(Ordering::SeqCst) {
            return Err(ClientBuildError::Unavailable("scripted refusal".into()));
        }

        Ok(ScriptedClient {
            state: Arc::clone(&self.state),
        })
    }
}

impl DeliveryClient for ScriptedClient {
    fn deliver(
        &mut self,
        messages: &[EncodedMessage],
    ) -> std::result::Result<(), DeliveryError> {
        self.state.deliver_calls.fetch_add(1, Ordering::SeqCst);

        if self.state.fail_deliveries.load(Ordering::SeqCst) > 0 {
            self.state.fail_deliveries.fetch_sub(1, Ordering::SeqCst);
            return Err(DeliveryError::Undelivered {
                failed: messages.len(),
                total: messages.len(),
                last: "scripted failure".into(),
            });
        }

        self.state.events.lock().unwrap().push("deliver".to_string());
        self.state.deliveries.lock().unwrap().push(messages.to_vec());
        Ok(())
    }
}

/// Resolver that always fails, counting attempts
struct FailingResolver {
    attempts: Arc<AtomicUsize>,
}

impl BrokerResolver for FailingResolver {
    fn resolve(&mut self) -> std::result::Result<BrokerSet, ResolveError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::Registry(RegistryError::Unreachable(
            "scripted outage".into(),
        )))
    }
}

fn static_engine(
    transport: &ScriptedTransport,
    config: DispatchConfig,
    encoder: Encoder,
    mapper: Option<FieldMapper>,
) -> DispatchEngine<ScriptedTransport> {
    DispatchEngine::new(
        config,
        encoder,
        mapper,
        Box::new(StaticResolver::new("k1:9092")),
        transport.clone(),
        ClientSettings::default(),
    )
}

fn default_config() -> DispatchConfig {
    DispatchConfig {
        default_topic: Some("default".to_string()),
        partition_key: None,
        max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
    }
}

// =============================================================================
// Routing and batching
// =============================================================================

#[test]
fn test_single_batch_routes_topics_in_order() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    engine
        .dispatch(vec![
            envelope("app", 1, json!({"topic": "t1", "v": 1})),
            envelope("app", 2, json!({"v": 2})),
        ])
        .expect("dispatch");

    let deliveries = transport.deliveries();
    assert_eq!(deliveries.len(), 1);

    let topics: Vec<_> = deliveries[0].iter().map(|m| m.topic().to_string()).collect();
    assert_eq!(topics, ["t1", "default"]);
}

#[test]
fn test_tag_used_when_no_default_topic() {
    let transport = ScriptedTransport::new();
    let config = DispatchConfig {
        default_topic: None,
        ..default_config()
    };
    let mut engine = static_engine(&transport, config, json_encoder(), None);

    engine
        .dispatch(vec![envelope("syslog.auth", 1, json!({"v": 1}))])
        .expect("dispatch");

    assert_eq!(transport.deliveries()[0][0].topic(), "syslog.auth");
}

#[test]
fn test_record_partition_key_overrides_default() {
    let transport = ScriptedTransport::new();
    let config = DispatchConfig {
        partition_key: Some("house-key".to_string()),
        ..default_config()
    };
    let mut engine = static_engine(&transport, config, json_encoder(), None);

    engine
        .dispatch(vec![
            envelope("app", 1, json!({"partition_key": "own-key", "v": 1})),
            envelope("app", 2, json!({"v": 2})),
        ])
        .expect("dispatch");

    let batch = &transport.deliveries()[0];
    assert_eq!(batch[0].key(), Some("own-key"));
    assert_eq!(batch[1].key(), Some("house-key"));
}

#[test]
fn test_budget_ten_three_six_byte_payloads_sent_separately() {
    let transport = ScriptedTransport::new();
    let config = DispatchConfig {
        max_batch_bytes: 10,
        ..default_config()
    };
    let mut engine = static_engine(&transport, config, attr_encoder("v"), None);

    engine
        .dispatch(vec![
            envelope("app", 1, json!({"v": "aaaaaa"})),
            envelope("app", 2, json!({"v": "bbbbbb"})),
            envelope("app", 3, json!({"v": "cccccc"})),
        ])
        .expect("dispatch");

    let deliveries = transport.deliveries();
    assert_eq!(deliveries.len(), 3);
    assert!(deliveries.iter().all(|batch| batch.len() == 1));
    assert_eq!(deliveries[0][0].payload(), b"aaaaaa");
    assert_eq!(deliveries[2][0].payload(), b"cccccc");
}

#[test]
fn test_input_order_preserved_across_flushes() {
    let transport = ScriptedTransport::new();
    let config = DispatchConfig {
        max_batch_bytes: 8,
        ..default_config()
    };
    let mut engine = static_engine(&transport, config, attr_encoder("seq"), None);

    let group: Vec<_> = (0..10)
        .map(|i| envelope("app", i, json!({"seq": format!("{i:04}")})))
        .collect();
    engine.dispatch(group).expect("dispatch");

    let sequence: Vec<String> = transport
        .deliveries()
        .iter()
        .flatten()
        .map(|m| String::from_utf8(m.payload().to_vec()).unwrap())
        .collect();
    let expected: Vec<String> = (0..10).map(|i| format!("{i:04}")).collect();
    assert_eq!(sequence, expected);
}

#[test]
fn test_empty_group_sends_nothing() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    engine.dispatch(Vec::new()).expect("dispatch");

    assert!(transport.deliveries().is_empty());
    assert_eq!(engine.metrics().snapshot().groups_received, 1);
}

// =============================================================================
// Field mapping integration
// =============================================================================

#[test]
fn test_mapper_applied_before_encoding() {
    let transport = ScriptedTransport::new();
    let mapper = FieldMapper::new(
        vec![("status".to_string(), "unknown".to_string())],
        Vec::new(),
    );
    let mut engine = static_engine(&transport, default_config(), json_encoder(), Some(mapper));

    engine
        .dispatch(vec![envelope("app", 1, json!({"v": 1}))])
        .expect("dispatch");

    let payload = transport.deliveries()[0][0].payload().to_vec();
    let decoded: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(decoded["status"], json!("unknown"));
}

#[test]
fn test_mapped_topic_field_routes() {
    // mapping can inject the routing topic itself
    let transport = ScriptedTransport::new();
    let mapper = FieldMapper::new(
        vec![("topic".to_string(), "mapped-topic".to_string())],
        Vec::new(),
    );
    let mut engine = static_engine(&transport, default_config(), json_encoder(), Some(mapper));

    engine
        .dispatch(vec![envelope("app", 1, json!({"v": 1}))])
        .expect("dispatch");

    assert_eq!(transport.deliveries()[0][0].topic(), "mapped-topic");
}

// =============================================================================
// Failure recovery
// =============================================================================

#[test]
fn test_delivery_failure_refreshes_once_and_reraises() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);
    assert_eq!(transport.connects(), 1);

    transport.fail_next_deliveries(1);
    let result = engine.dispatch(vec![envelope("app", 1, json!({"v": 1}))]);

    assert!(matches!(result, Err(DispatchError::Delivery(_))));
    // exactly one rebuild, no internal re-send of the failed batch
    assert_eq!(transport.connects(), 2);
    assert_eq!(transport.deliver_calls(), 1);
    assert!(transport.deliveries().is_empty());
}

#[test]
fn test_next_group_succeeds_after_recovery() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    transport.fail_next_deliveries(1);
    assert!(engine
        .dispatch(vec![envelope("app", 1, json!({"v": 1}))])
        .is_err());

    engine
        .dispatch(vec![envelope("app", 1, json!({"v": 1}))])
        .expect("redelivery succeeds");

    assert_eq!(transport.deliveries().len(), 1);
    assert_eq!(transport.deliveries()[0].len(), 1);
}

#[test]
fn test_mid_group_failure_discards_partial_batch() {
    let transport = ScriptedTransport::new();
    let config = DispatchConfig {
        max_batch_bytes: 10,
        ..default_config()
    };
    let mut engine = static_engine(&transport, config, attr_encoder("v"), None);

    // first flush fails; the second record is already sitting in the
    // assembler and must not leak into the next group
    transport.fail_next_deliveries(1);
    let result = engine.dispatch(vec![
        envelope("app", 1, json!({"v": "aaaaaa"})),
        envelope("app", 2, json!({"v": "bbbbbb"})),
    ]);
    assert!(result.is_err());

    engine
        .dispatch(vec![envelope("app", 3, json!({"v": "cccccc"}))])
        .expect("next group");

    let deliveries = transport.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0][0].payload(), b"cccccc");
}

#[test]
fn test_resolution_failure_leaves_engine_without_client() {
    let transport = ScriptedTransport::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let mut engine = DispatchEngine::new(
        default_config(),
        json_encoder(),
        None,
        Box::new(FailingResolver {
            attempts: Arc::clone(&attempts),
        }),
        transport.clone(),
        ClientSettings::default(),
    );

    assert!(!engine.has_client());
    assert!(engine.brokers().is_empty());
    assert_eq!(transport.connects(), 0);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    let result = engine.dispatch(vec![envelope("app", 1, json!({"v": 1}))]);
    assert!(matches!(
        result,
        Err(DispatchError::Delivery(DeliveryError::NoClient))
    ));
    // the failed send triggered another resolution attempt
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_empty_endpoint_list_means_no_client() {
    let transport = ScriptedTransport::new();
    let mut engine = DispatchEngine::new(
        default_config(),
        json_encoder(),
        None,
        Box::new(StaticResolver::new("")),
        transport.clone(),
        ClientSettings::default(),
    );

    assert!(!engine.has_client());
    assert_eq!(transport.connects(), 0);

    let result = engine.dispatch(vec![envelope("app", 1, json!({"v": 1}))]);
    assert!(matches!(
        result,
        Err(DispatchError::Delivery(DeliveryError::NoClient))
    ));
}

#[test]
fn test_client_build_failure_is_not_fatal() {
    let transport = ScriptedTransport::new();
    transport.refuse_connects();

    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    assert!(!engine.has_client());
    assert_eq!(transport.connects(), 1);

    let result = engine.dispatch(vec![envelope("app", 1, json!({"v": 1}))]);
    assert!(matches!(
        result,
        Err(DispatchError::Delivery(DeliveryError::NoClient))
    ));
}

#[test]
fn test_encode_failure_propagates_without_refresh() {
    struct Rejecting;
    impl kite_record::RecordFormatter for Rejecting {
        fn name(&self) -> &str {
            "rejecting"
        }
        fn format(
            &self,
            _tag: &str,
            _time: i64,
            _record: &Record,
        ) -> std::result::Result<Vec<u8>, kite_record::EncodeError> {
            Err(kite_record::EncodeError::formatter("rejecting", "nope"))
        }
    }

    let transport = ScriptedTransport::new();
    let mut registry = FormatterRegistry::new();
    registry.register("rejecting", Box::new(Rejecting));
    let encoder =
        Encoder::from_selector("rejecting", Separator::Tab, false, false, &mut registry)
            .expect("resolve selector");
    let mut engine = static_engine(&transport, default_config(), encoder, None);

    let result = engine.dispatch(vec![envelope("app", 1, json!({"v": 1}))]);

    assert!(matches!(result, Err(DispatchError::Encode(_))));
    // encoding failures do not touch the client
    assert_eq!(transport.connects(), 1);
    assert_eq!(transport.deliver_calls(), 0);
}

// =============================================================================
// Chunk and single-event entry points
// =============================================================================

#[test]
fn test_dispatch_chunk_decodes_and_delivers() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    let mut chunk = Vec::new();
    chunk.extend(rmp_serde::to_vec(&("app", 1i64, record(json!({"v": 1})))).unwrap());
    chunk.extend(rmp_serde::to_vec(&("app", 2i64, record(json!({"v": 2})))).unwrap());

    engine.dispatch_chunk(&chunk).expect("dispatch chunk");

    let deliveries = transport.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].len(), 2);
    assert_eq!(deliveries[0][0].payload(), br#"{"v":1}"#);
    assert_eq!(deliveries[0][1].payload(), br#"{"v":2}"#);
}

#[test]
fn test_dispatch_chunk_malformed_frame_fails_group() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    let result = engine.dispatch_chunk(b"\xc1\xc1\xc1");
    assert!(matches!(result, Err(DispatchError::Envelope(_))));
    assert!(transport.deliveries().is_empty());
}

#[test]
fn test_dispatch_event_notifies_before_processing() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    let notifier = transport.clone();
    engine
        .dispatch_event(envelope("app", 1, json!({"v": 1})), move || {
            notifier.push_event("notify");
        })
        .expect("dispatch event");

    assert_eq!(transport.events(), ["notify", "deliver"]);
}

// =============================================================================
// Metrics
// =============================================================================

#[test]
fn test_metrics_track_groups_batches_and_rebuilds() {
    let transport = ScriptedTransport::new();
    let mut engine = static_engine(&transport, default_config(), json_encoder(), None);

    engine
        .dispatch(vec![
            envelope("app", 1, json!({"v": 1})),
            envelope("app", 2, json!({"v": 2})),
        ])
        .expect("dispatch");

    let snapshot = engine.metrics().snapshot();
    assert_eq!(snapshot.groups_received, 1);
    assert_eq!(snapshot.records_processed, 2);
    assert_eq!(snapshot.batches_sent, 1);
    assert_eq!(snapshot.messages_sent, 2);
    assert_eq!(snapshot.client_rebuilds, 1);
    assert!(snapshot.bytes_sent > 0);

    transport.fail_next_deliveries(1);
    assert!(engine
        .dispatch(vec![envelope("app", 3, json!({"v": 3}))])
        .is_err());

    let snapshot = engine.metrics().snapshot();
    assert_eq!(snapshot.batches_failed, 1);
    assert_eq!(snapshot.client_rebuilds, 2);
}

// =============================================================================
// Configuration wiring
// =============================================================================

#[test]
fn test_from_config_builds_working_engine() {
    let config = Config::from_str(
        r#"
[route]
default_topic = "events"

[brokers]
endpoints = "k1:9092,k2:9092"

[format]
encoding = "attr:v"
include_tag = true
include_time = true
separator = "comma"

[batch]
max_bytes = 64
"#,
    )
    .expect("parse config");

    let transport = ScriptedTransport::new();
    let mut engine = DispatchEngine::from_config(
        &config,
        transport.clone(),
        None,
        FormatterRegistry::new(),
    )
    .expect("build engine");

    assert_eq!(transport.last_brokers(), "k1:9092,k2:9092");

    engine
        .dispatch(vec![envelope("app.log", 1000, json!({"v": 5}))])
        .expect("dispatch");

    let deliveries = transport.deliveries();
    assert_eq!(deliveries[0][0].topic(), "events");
    assert_eq!(deliveries[0][0].payload(), b"app.log,1000,5");
}

#[test]
fn test_from_config_with_field_mapping() {
    let config = Config::from_str(
        r#"
[route]
default_topic = "events"

[brokers]
endpoints = "k1:9092"

[fields]
mapping = "status:unknown"
conversions = "1:active,0:inactive"
"#,
    )
    .expect("parse config");

    let transport = ScriptedTransport::new();
    let mut engine = DispatchEngine::from_config(
        &config,
        transport.clone(),
        None,
        FormatterRegistry::new(),
    )
    .expect("build engine");

    engine
        .dispatch(vec![envelope("app", 1, json!({"status": "1"}))])
        .expect("dispatch");

    let decoded: serde_json::Value =
        serde_json::from_slice(transport.deliveries()[0][0].payload()).unwrap();
    assert_eq!(decoded["status"], json!("active"));
}

#[test]
fn test_from_config_dynamic_requires_registry_client() {
    let config = Config::from_str(
        r#"
[route]
default_topic = "events"

[brokers]
registry = "zk1:2181"
"#,
    )
    .expect("parse config");

    let result = DispatchEngine::from_config(
        &config,
        ScriptedTransport::new(),
        None,
        FormatterRegistry::new(),
    );

    assert!(matches!(result, Err(BuildError::MissingRegistryClient)));
}
