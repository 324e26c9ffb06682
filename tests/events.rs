//! Reconcile events and log output.
//!
//! The callbacks are process-wide, so this binary holds a single test.

use std::sync::{Arc, Mutex};
use text_overlay::{
    LogLevel, OverlayTree, RECONCILE_EVENT, RopeStore, TagStyle, clear_event_callback,
    clear_log_callback, set_event_callback, set_log_callback,
};

#[test]
fn reconcile_events_and_logs() {
    let events: Arc<Mutex<Vec<String>>> = Arc::default();
    let logs: Arc<Mutex<Vec<(LogLevel, String)>>> = Arc::default();
    {
        let events = Arc::clone(&events);
        set_event_callback(move |name, data| {
            if name == RECONCILE_EVENT {
                events.lock().unwrap().push(data.to_string());
            }
        });
        let logs = Arc::clone(&logs);
        set_log_callback(move |level, message| {
            logs.lock().unwrap().push((level, message.to_string()));
        });
    }

    let mut tree = OverlayTree::new();
    tree.attach_store(RopeStore::new()).unwrap();
    let root = tree.root();
    let tag = tree.create_tag(TagStyle::new("t"));
    let text = tree.create_content("abc");
    tree.append_child(tag, text).unwrap();
    tree.append_child(root, tag).unwrap();
    tree.reapply_tag(text).unwrap_err();
    tree.dispose(tag).unwrap();
    tree.dispose(tag).unwrap();

    clear_event_callback();
    clear_log_callback();

    let events = events.lock().unwrap();
    assert!(events.len() >= 4, "one event per pass: {events:?}");
    assert!(
        events
            .iter()
            .any(|data| data.contains("applied=1") && data.contains("length=3"))
    );
    assert!(events.last().unwrap().contains("length=0"));

    let logs = logs.lock().unwrap();
    let has = |level: LogLevel, needle: &str| {
        logs.iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    };
    assert!(has(LogLevel::Info, "store attached"));
    assert!(has(LogLevel::Debug, "bound"));
    assert!(has(LogLevel::Debug, "operation rejected"));
    assert!(has(LogLevel::Debug, "disposed"));
    assert!(has(LogLevel::Debug, "stale"));
}
