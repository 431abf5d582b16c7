//! Dispatches run off the firing thread, in order, and survive failing subscribers.

use core_events::{EventChannel, wait_for_dispatch};
use crossbeam_channel::unbounded;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn dispatch_happens_on_another_thread() {
    let ch = EventChannel::<u8>::new("thread");
    let (tx, rx) = unbounded();
    ch.subscribe(move |_| {
        tx.send(thread::current().id()).ok();
        Ok(())
    });
    ch.fire(1);
    let worker = rx.recv_timeout(WAIT).expect("notification not delivered");
    assert_ne!(worker, thread::current().id());
}

#[test]
fn payloads_arrive_in_fire_order() {
    let ch = EventChannel::<u32>::new("order");
    let (tx, rx) = unbounded();
    ch.subscribe(move |v| {
        tx.send(*v).ok();
        Ok(())
    });
    for i in 0..100 {
        ch.fire(i);
    }
    assert!(wait_for_dispatch(WAIT));
    let got: Vec<u32> = rx.try_iter().collect();
    assert_eq!(got, (0..100).collect::<Vec<_>>());
}

#[test]
fn panicking_subscriber_only_aborts_its_own_dispatch() {
    let ch = Arc::new(EventChannel::<u32>::new("panic"));
    let (tx, rx) = unbounded();
    ch.subscribe(|v| {
        if *v == 1 {
            panic!("subscriber failure");
        }
        Ok(())
    });
    ch.subscribe(move |v| {
        tx.send(*v).ok();
        Ok(())
    });
    ch.fire(1);
    ch.fire(2);
    assert!(wait_for_dispatch(WAIT));
    let got: Vec<u32> = rx.try_iter().collect();
    assert_eq!(got, vec![2]);
}

#[test]
fn fire_without_subscribers_is_a_no_op() {
    let ch = EventChannel::<String>::new("empty");
    ch.fire("ignored".into());
    assert!(wait_for_dispatch(WAIT));
}

#[test]
fn concurrent_fires_deliver_everything() {
    let ch = Arc::new(EventChannel::<usize>::new("concurrent"));
    let (tx, rx) = unbounded();
    ch.subscribe(move |v| {
        tx.send(*v).ok();
        Ok(())
    });
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let ch = ch.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    ch.fire(t * 1000 + i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("firing thread panicked");
    }
    assert!(wait_for_dispatch(WAIT));
    assert_eq!(rx.try_iter().count(), 1000);
}
