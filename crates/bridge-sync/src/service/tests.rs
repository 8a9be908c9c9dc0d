//! # Bridge Service Tests

use super::*;
use crate::adapters::{FixedTimeSource, InMemoryCache, InMemoryDocumentStore, RecordingSink};
use crate::domain::CodecFailurePolicy;
use serde_json::{json, Value};
use std::time::Duration;

const QUEUE: &str = "dcA";
const TEST_KEY: &str = "KioqKioqKioqKioqKioqKioqKioqKioqKioqKioqKio=";

struct Harness {
    cache: Arc<InMemoryCache>,
    store: Arc<InMemoryDocumentStore>,
    sink: Arc<RecordingSink>,
    codec: Arc<PayloadCodec>,
    bridge: Bridge<InMemoryCache, InMemoryDocumentStore, RecordingSink, FixedTimeSource>,
}

fn harness(policy: CodecFailurePolicy) -> Harness {
    let cache = Arc::new(InMemoryCache::new());
    let store = Arc::new(InMemoryDocumentStore::new());
    let sink = Arc::new(RecordingSink::new());
    let codec = Arc::new(PayloadCodec::new(TEST_KEY).unwrap());
    let settings = BridgeSettings {
        queue_table: QUEUE.to_string(),
        datacenter: QUEUE.to_string(),
        poll_interval: Duration::from_millis(10),
        env_name: "test".to_string(),
        metrics_key: "ez".to_string(),
        codec_failure_policy: policy,
    };
    let deps = BridgeDependencies {
        cache: Arc::clone(&cache),
        store: Arc::clone(&store),
        sink: Arc::clone(&sink),
        time_source: FixedTimeSource(1_700_000_000.0),
        codec: Arc::clone(&codec),
    };
    Harness {
        cache,
        store,
        sink,
        codec,
        bridge: Bridge::new(deps, settings),
    }
}

impl Harness {
    fn enqueue(&self, id: &str, kind: &str, action: &str, item: Value) {
        self.store.put(
            QUEUE,
            id,
            json!({"type": kind, "action": action, "item": item}),
        );
    }

    fn cached(&self, key: &str) -> Option<Value> {
        self.cache
            .get(key)
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    fn queue_deletions(&self, id: &str) -> usize {
        self.store
            .deletions()
            .iter()
            .filter(|(table, row)| table == QUEUE && row == id)
            .count()
    }
}

#[tokio::test]
async fn test_monitor_create_without_datacenter() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.store.put("monitors", "m1", json!({"status": "new"}));
    h.enqueue("q1", "monitor", "create", json!({"cid": "m1", "data": {"timer": "30s"}, "encrypted": false}));

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.retired, 1);
    assert!(h.cached("monitor:m1").is_some());
    assert_eq!(h.cache.set_len("30s"), 0);
    assert!(h.store.is_empty(QUEUE));
    assert_eq!(h.store.get("monitors", "m1").unwrap()["status"], json!("monitored"));
}

#[tokio::test]
async fn test_monitor_create_local_joins_schedule() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": {"timer": "5mincheck", "datacenter": ["dcB", "dcA"]}}),
    );

    h.bridge.run_cycle().await.unwrap();

    assert!(h.cache.is_member("5mincheck", "m1"));
    assert!(h.cached("monitor:m1").is_some());
}

#[tokio::test]
async fn test_monitor_create_remote_not_scheduled() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": {"timer": "5mincheck", "datacenter": ["dcB"]}}),
    );

    h.bridge.run_cycle().await.unwrap();

    assert!(!h.cache.is_member("5mincheck", "m1"));
    assert!(h.cached("monitor:m1").is_some());
    assert!(h.store.is_empty(QUEUE));
}

#[tokio::test]
async fn test_monitor_edit_replaces_record_and_retires_once() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": {"timer": "5mincheck", "datacenter": ["dcA"], "url": "old"}}),
    );
    h.bridge.run_cycle().await.unwrap();
    assert!(h.cache.is_member("5mincheck", "m1"));

    h.enqueue(
        "q2",
        "monitor",
        "edit",
        json!({"cid": "m1", "data": {"timer": "5mincheck", "datacenter": ["dcB"], "url": "new"}}),
    );
    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.retired, 1);
    assert!(!h.cache.is_member("5mincheck", "m1"));
    assert_eq!(h.cached("monitor:m1").unwrap()["data"]["url"], json!("new"));
    assert_eq!(h.queue_deletions("q2"), 1);
}

#[tokio::test]
async fn test_monitor_edit_to_local_joins_schedule() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": {"timer": "5mincheck", "datacenter": ["dcB"]}}),
    );
    h.bridge.run_cycle().await.unwrap();
    assert!(!h.cache.is_member("5mincheck", "m1"));

    h.enqueue(
        "q2",
        "monitor",
        "edit",
        json!({"cid": "m1", "data": {"timer": "5mincheck", "datacenter": ["dcB", "dcA"]}}),
    );
    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.retired, 1);
    assert!(h.cache.is_member("5mincheck", "m1"));
    assert_eq!(h.cache.set_len("5mincheck"), 1);
    assert_eq!(
        h.cached("monitor:m1").unwrap()["data"]["datacenter"],
        json!(["dcB", "dcA"])
    );
    assert_eq!(h.queue_deletions("q2"), 1);
}

#[tokio::test]
async fn test_edit_removal_step_does_not_retire() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue("q1", "monitor", "create", json!({"cid": "m1", "data": {}}));
    h.bridge.run_cycle().await.unwrap();

    h.cache.fail_writes(true);
    h.enqueue("q2", "monitor", "edit", json!({"cid": "m1", "data": {"url": "new"}}));
    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.deferred, 1);
    assert!(h.cached("monitor:m1").is_none());
    assert_eq!(h.store.len(QUEUE), 1);
    assert_eq!(h.queue_deletions("q2"), 0);

    h.cache.fail_writes(false);
    h.bridge.run_cycle().await.unwrap();
    assert_eq!(h.cached("monitor:m1").unwrap()["data"]["url"], json!("new"));
    assert_eq!(h.queue_deletions("q2"), 1);
}

#[tokio::test]
async fn test_monitor_delete() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": {"timer": "30s", "datacenter": ["dcA"]}}),
    );
    h.bridge.run_cycle().await.unwrap();

    h.enqueue("q2", "monitor", "delete", json!({"cid": "m1", "data": {"timer": "30s"}}));
    h.bridge.run_cycle().await.unwrap();

    assert!(h.cached("monitor:m1").is_none());
    assert!(!h.cache.is_member("30s", "m1"));
    assert_eq!(h.queue_deletions("q2"), 1);
}

#[tokio::test]
async fn test_delete_retires_even_when_cache_delete_fails() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.cache.fail_deletes(true);
    h.enqueue("q1", "reaction", "delete", json!({"rid": "r1", "data": {}}));

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.retired, 1);
    assert!(h.store.is_empty(QUEUE));
}

#[tokio::test]
async fn test_cache_write_failure_defers_without_status_update() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.store.put("monitors", "m1", json!({"status": "new"}));
    h.cache.fail_writes(true);
    h.enqueue("q1", "monitor", "create", json!({"cid": "m1", "data": {}}));

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.deferred, 1);
    assert_eq!(h.store.len(QUEUE), 1);
    assert_eq!(h.store.get("monitors", "m1").unwrap()["status"], json!("new"));
}

#[tokio::test]
async fn test_monitor_sink_publishes_and_retires() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue("q1", "monitor", "sink", json!({"cid": "m1", "data": {"url": "https://x"}}));

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.retired, 1);
    let sent: Value = serde_json::from_str(&h.sink.messages()[0]).unwrap();
    assert_eq!(sent["zone"], json!("Web API"));
    assert!(sent["time_tracking"]["control"].as_f64().unwrap() > 0.0);
    assert!(h.cached("monitor:m1").is_none());
    assert!(h.store.is_empty(QUEUE));
}

#[tokio::test]
async fn test_sink_failure_defers() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.sink.fail_sends(true);
    h.enqueue("q1", "monitor", "sink", json!({"cid": "m1", "data": {}}));

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.deferred, 1);
    assert_eq!(h.store.len(QUEUE), 1);
}

#[tokio::test]
async fn test_reaction_lifecycle() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue(
        "q1",
        "reaction",
        "create",
        json!({"rid": "r1", "data": {"timer": "30s", "datacenter": ["dcA"], "call_on": "false"}}),
    );
    h.bridge.run_cycle().await.unwrap();
    assert_eq!(h.cached("reaction:r1").unwrap()["data"]["call_on"], json!("false"));
    assert!(!h.cache.is_member("30s", "r1"));

    h.enqueue("q2", "reaction", "edit", json!({"rid": "r1", "data": {"call_on": "true"}}));
    h.bridge.run_cycle().await.unwrap();
    assert_eq!(h.cached("reaction:r1").unwrap()["data"]["call_on"], json!("true"));
    assert_eq!(h.queue_deletions("q2"), 1);

    h.enqueue("q3", "reaction", "delete", json!({"rid": "r1", "data": {}}));
    h.bridge.run_cycle().await.unwrap();
    assert!(h.cached("reaction:r1").is_none());
    assert!(h.store.is_empty(QUEUE));
}

#[tokio::test]
async fn test_unsupported_and_malformed_records_stay_queued() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue("q1", "reaction", "sink", json!({"rid": "r1", "data": {}}));
    h.enqueue("q2", "bogus", "create", json!({"cid": "m1"}));
    h.enqueue("q3", "monitor", "create", json!({"cid": "m3", "data": {}}));

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.fetched, 3);
    assert_eq!(report.unsupported, 1);
    assert_eq!(report.malformed, 1);
    assert_eq!(report.retired, 1);
    assert_eq!(h.store.len(QUEUE), 2);
}

#[tokio::test]
async fn test_missing_identifier_fails_record() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.enqueue("q1", "monitor", "create", json!({"rid": "wrong-field", "data": {}}));

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(h.store.len(QUEUE), 1);
}

#[tokio::test]
async fn test_encrypted_monitor_branches_on_plaintext() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    let sealed = h
        .codec
        .encrypt_payload(&json!({"timer": "5mincheck", "datacenter": ["dcA"], "apikey": "k"}))
        .unwrap();
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": sealed, "encrypted": true}),
    );

    h.bridge.run_cycle().await.unwrap();

    assert!(h.cache.is_member("5mincheck", "m1"));
    let record = h.cached("monitor:m1").unwrap();
    assert!(record["data"].is_string());
    assert_eq!(
        h.codec.decrypt_payload(&record["data"]).unwrap()["apikey"],
        json!("k")
    );
}

#[tokio::test]
async fn test_control_plane_token_is_opened() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    // Fernet token written by the web tier for
    // {"timer":"5mincheck","datacenter":["dcA"],"apikey":"k"}.
    let token = "gAAAAABlU_EAAQEBAQEBAQEBAQEBAQEBAYreaxYnAujo_N2a6JtdG6XFBl6n1m9fRTNPrZlNZ8MkDKnsmgThjsiCPlPt6NKp0G1upLnUd0ZrDVBYh2L7jSUc27ZeoHiZARwbj3bCtUqqP0m50tTxVe4_nTDuDRPdIQ==";
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": token, "encrypted": true}),
    );

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.failed, 0);
    assert_eq!(report.retired, 1);
    assert!(h.cache.is_member("5mincheck", "m1"));
    assert!(h.store.is_empty(QUEUE));
    let record = h.cached("monitor:m1").unwrap();
    assert_eq!(
        h.codec.decrypt_payload(&record["data"]).unwrap()["apikey"],
        json!("k")
    );
}

fn enqueue_poisoned_then_valid(h: &Harness) {
    h.enqueue(
        "q1",
        "monitor",
        "create",
        json!({"cid": "m1", "data": "not-a-token", "encrypted": true}),
    );
    h.enqueue("q2", "monitor", "create", json!({"cid": "m2", "data": {}}));
}

#[tokio::test]
async fn test_codec_failure_skip_record() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    enqueue_poisoned_then_valid(&h);

    let report = h.bridge.run_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.retired, 1);
    assert!(!report.aborted);
    assert!(h.store.get(QUEUE, "q1").is_some());
    assert!(h.cached("monitor:m2").is_some());
}

#[tokio::test]
async fn test_codec_failure_abort_cycle() {
    let h = harness(CodecFailurePolicy::AbortCycle);
    enqueue_poisoned_then_valid(&h);

    let report = h.bridge.run_cycle().await.unwrap();

    assert!(report.aborted);
    assert_eq!(report.retired, 0);
    assert_eq!(h.store.len(QUEUE), 2);
}

#[tokio::test]
async fn test_codec_failure_exit() {
    let h = harness(CodecFailurePolicy::Exit);
    enqueue_poisoned_then_valid(&h);

    let result = h.bridge.run_cycle().await;

    assert!(matches!(result, Err(PollError::Fatal { ref queue_id, .. }) if queue_id == "q1"));
    assert!(h.bridge.run_forever().await.is_err());
}

#[tokio::test]
async fn test_store_offline_fails_fetch() {
    let h = harness(CodecFailurePolicy::SkipRecord);
    h.store.set_available(false);

    assert!(matches!(h.bridge.run_cycle().await, Err(PollError::Fetch(_))));
}
