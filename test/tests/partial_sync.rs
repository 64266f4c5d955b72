use std::collections::BTreeMap;

use proptest::prelude::*;

use uplink_server::{
    Envelope, KeyedSource, ListDelta, OrderedDeltaQueue, PartialKeyQueue, Value,
};
use uplink_test::{assert_kinds, assert_single_credit, TestMapSource, UplinkHarness};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `(tag, key, body)` of each map event
fn map_events(envelopes: &[Envelope]) -> Vec<(String, String, Value)> {
    envelopes
        .iter()
        .filter_map(|envelope| match envelope {
            Envelope::Event(event) => Some(&event.body),
            _ => None,
        })
        .map(|body| {
            (
                body.tag().unwrap_or_default().to_string(),
                body.header("key")
                    .and_then(Value::as_text)
                    .unwrap_or_default()
                    .to_string(),
                body.body().clone(),
            )
        })
        .collect()
}

fn update(key: &str, value: i64) -> (String, String, Value) {
    ("update".to_string(), key.to_string(), Value::Int(value))
}

#[test]
fn sync_delivers_every_key_then_the_cued_update() {
    init_logger();
    let source = TestMapSource::new(&[("a", 1), ("b", 2), ("c", 3)]);
    let harness = UplinkHarness::new(PartialKeyQueue::new(source.clone()));

    harness.sync();
    assert!(harness.pull_once());
    assert!(harness.pull_once());

    source.put("b", 20);
    harness.session.cue_key("b".into()).unwrap();
    assert_single_credit!(harness);

    let delivered = harness.pump();
    assert_kinds!(delivered, [Linked, Event, Event, Event, Event, Synced]);
    assert_eq!(
        map_events(&delivered),
        vec![
            update("a", 1),
            update("b", 2),
            update("c", 3),
            update("b", 20),
        ]
    );
}

#[test]
fn repeated_sync_does_not_restart_the_snapshot() {
    init_logger();
    let source = TestMapSource::new(&[("a", 1), ("b", 2), ("c", 3)]);
    let harness = UplinkHarness::new(PartialKeyQueue::new(source.clone()));

    harness.sync();
    assert!(harness.pull_once());
    assert!(harness.pull_once());
    harness.sync();

    let delivered = harness.pump();
    assert_kinds!(delivered, [Linked, Event, Event, Event, Synced]);
    assert_eq!(
        map_events(&delivered),
        vec![update("a", 1), update("b", 2), update("c", 3)]
    );
}

#[test]
fn sync_while_unlinking_keeps_dirty_keys() {
    init_logger();
    let source = TestMapSource::new(&[("a", 1)]);
    let harness = UplinkHarness::new(PartialKeyQueue::new(source.clone()));
    harness.link();
    harness.pump();

    harness.session.cue_key("a".into()).unwrap();
    harness.session.unlink();
    harness.sync();

    assert!(!harness.session.queue().is_syncing());
    assert_eq!(harness.session.queue().dirty_len(), 1);
    assert_kinds!(harness.pump(), [Unlinked]);
}

#[test]
fn removed_keys_are_delivered_as_removals() {
    init_logger();
    let source = TestMapSource::new(&[("a", 1)]);
    let harness = UplinkHarness::new(PartialKeyQueue::new(source.clone()));
    harness.link();
    harness.pump();

    source.remove("a");
    harness.session.cue_key("a".into()).unwrap();

    let delivered = harness.pump();
    assert_eq!(
        map_events(&delivered),
        vec![("remove".to_string(), "a".to_string(), Value::Absent)]
    );
}

#[test]
fn repeated_cues_collapse_to_the_latest_value() {
    init_logger();
    let source = TestMapSource::new(&[]);
    let harness = UplinkHarness::new(PartialKeyQueue::new(source.clone()));
    harness.link();
    harness.pump();

    for value in 0..5 {
        source.put("k", value);
        harness.session.cue_key("k".into()).unwrap();
    }
    assert_eq!(harness.transport.feed_count(), 2);

    assert_eq!(map_events(&harness.pump()), vec![update("k", 4)]);
}

#[test]
fn begin_sync_streams_a_snapshot_without_an_acknowledgement() {
    init_logger();
    let source = TestMapSource::new(&[("a", 1), ("b", 2)]);
    let harness = UplinkHarness::new(PartialKeyQueue::new(source.clone()));
    harness.link();
    harness.pump();

    harness.session.begin_sync(source.snapshot()).unwrap();

    let delivered = harness.pump();
    assert_kinds!(delivered, [Event, Event]);
    assert_eq!(map_events(&delivered), vec![update("a", 1), update("b", 2)]);
}

#[test]
fn list_sync_replays_items_before_synced() {
    init_logger();
    let harness = UplinkHarness::new(OrderedDeltaQueue::synced(|| {
        vec![Value::from("x"), Value::from("y")]
    }));

    harness.sync();
    let delivered = harness.pump();
    assert_kinds!(delivered, [Linked, Event, Event, Synced]);

    harness
        .session
        .send_delta(ListDelta::Insert {
            index: 2,
            value: Value::from("z"),
        })
        .unwrap();
    let delivered = harness.pump();
    let Some(Envelope::Event(event)) = delivered.first() else {
        panic!("expected an event, got {:?}", delivered);
    };
    assert_eq!(event.body.tag(), Some("insert"));
    assert_eq!(event.body.header("index"), Some(&Value::Int(2)));
    assert_eq!(event.body.body(), &Value::from("z"));
}

#[test]
fn producers_are_refused_once_unlinking() {
    init_logger();
    let harness = UplinkHarness::new(PartialKeyQueue::new(TestMapSource::new(&[])));
    harness.link();
    harness.session.unlink();

    assert!(harness.session.cue_key("a".into()).is_err());
    assert!(harness.session.begin_sync(Vec::new()).is_err());
}

proptest! {
    #[test]
    fn every_cued_key_ends_at_its_latest_value(
        writes in prop::collection::vec((0u8..6, any::<i64>(), any::<bool>()), 1..40)
    ) {
        let source = TestMapSource::new(&[]);
        let harness = UplinkHarness::new(PartialKeyQueue::new(source.clone()));
        harness.link();
        harness.pump();

        for (key, value, pull) in writes {
            let key = format!("k{}", key);
            source.put(&key, value);
            harness.session.cue_key(Value::from(key)).unwrap();
            if pull {
                harness.pull_once();
            }
            prop_assert!(harness.outstanding() <= 1);
        }

        let mut latest = BTreeMap::new();
        for envelope in harness.pump() {
            if let Envelope::Event(event) = envelope {
                let key = event.body.header("key").cloned();
                latest.insert(key, event.body.body().clone());
            }
        }
        for (key, value) in source.snapshot() {
            prop_assert_eq!(latest.get(&Some(key)), Some(&value));
        }
        prop_assert_eq!(harness.session.queue().dirty_len(), 0);
    }
}
