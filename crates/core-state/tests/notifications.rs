mod common;

use common::multiline;
use core_events::wait_for_dispatch;
use core_state::Buffer;
use core_text::Document;
use crossbeam_channel::{Receiver, unbounded};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn watch(channel: &core_events::EventChannel<Document>) -> Receiver<Document> {
    let (tx, rx) = unbounded();
    channel.subscribe(move |doc: &Document| {
        tx.send(doc.clone())?;
        Ok(())
    });
    rx
}

#[test]
fn insert_publishes_text_cursor_and_insert_events() {
    let b = multiline("", 0);
    let text = watch(b.on_text_changed());
    let cursor = watch(b.on_cursor_position_changed());
    let insert = watch(b.on_text_insert());

    b.insert_text("hi", false, true, true).unwrap();

    assert_eq!(text.recv_timeout(WAIT).unwrap().text(), "hi");
    assert_eq!(cursor.recv_timeout(WAIT).unwrap().cursor_position(), 2);
    assert_eq!(insert.recv_timeout(WAIT).unwrap().text(), "hi");
}

#[test]
fn quiet_insert_skips_insert_event() {
    let b = multiline("", 0);
    let text = watch(b.on_text_changed());
    let insert = watch(b.on_text_insert());

    b.insert_text("x", false, true, false).unwrap();

    assert_eq!(text.recv_timeout(WAIT).unwrap().text(), "x");
    assert!(wait_for_dispatch(WAIT));
    assert!(insert.try_recv().is_err());
}

#[test]
fn cursor_move_does_not_publish_text_change() {
    let b = multiline("abc", 0);
    let text = watch(b.on_text_changed());
    let cursor = watch(b.on_cursor_position_changed());

    b.set_cursor_position(2);
    b.set_cursor_position(2);

    assert_eq!(cursor.recv_timeout(WAIT).unwrap().cursor_position(), 2);
    assert!(wait_for_dispatch(WAIT));
    assert!(cursor.try_recv().is_err());
    assert!(text.try_recv().is_err());
}

#[test]
fn handlers_may_read_the_buffer() {
    let b = Arc::new(multiline("", 0));
    let (tx, rx) = unbounded();
    let reader = Arc::clone(&b);
    b.on_text_changed().subscribe(move |_: &Document| {
        // The state lock is released before dispatch.
        tx.send(reader.text())?;
        Ok(())
    });
    b.set_text("seen").unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "seen");
}

#[test]
fn subscribers_run_in_registration_order() {
    let b = Buffer::default();
    let (tx, rx) = unbounded();
    for id in 0..3 {
        let tx = tx.clone();
        b.on_text_changed().subscribe(move |_: &Document| {
            tx.send(id)?;
            Ok(())
        });
    }
    b.set_text("go").unwrap();
    let order: Vec<i32> = (0..3).map(|_| rx.recv_timeout(WAIT).unwrap()).collect();
    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn failing_subscriber_aborts_only_its_dispatch() {
    let b = Buffer::default();
    let (tx, rx) = unbounded();
    b.on_text_changed().subscribe(|doc: &Document| {
        if doc.text() == "bad" {
            anyhow::bail!("rejected");
        }
        Ok(())
    });
    b.on_text_changed().subscribe(move |doc: &Document| {
        tx.send(doc.text().to_string())?;
        Ok(())
    });
    b.set_text("bad").unwrap();
    b.set_text("good").unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "good");
    assert!(wait_for_dispatch(WAIT));
    assert!(rx.try_recv().is_err());
}
