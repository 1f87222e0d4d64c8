//! DeploymentData driven from outside the crate: loading an SDL file through
//! a chain backend, concurrent updates, and the event-tracking task.

use akash_deployer::{
    ChainBackend, DeployError, DeploymentData, DeploymentId, GroupId, LeaseId, MarketEvent,
    OrderId, TxEvent, TxMsg, TxResult,
};
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc;

const OWNER: &str = "akash1qyqszqgpqyqszqgpqyqszqgpqyqszqgpjnp7du";
const SDL_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/testdata/deploy.yaml");

/// Chain stub: fixed height, answers every broadcast with the given events.
struct StubChain {
    height: u64,
    events: Vec<TxEvent>,
    broadcasts: Mutex<usize>,
}

impl StubChain {
    fn new(height: u64) -> Self {
        Self {
            height,
            events: Vec::new(),
            broadcasts: Mutex::new(0),
        }
    }
}

impl ChainBackend for StubChain {
    fn address(&self) -> String {
        OWNER.to_string()
    }

    async fn block_height(&self) -> Result<u64, DeployError> {
        Ok(self.height)
    }

    async fn send_msgs(&self, _msgs: Vec<TxMsg>) -> Result<TxResult, DeployError> {
        *self.broadcasts.lock().unwrap() += 1;
        Ok(TxResult {
            hash: "00FF".to_string(),
            code: 0,
            raw_log: String::new(),
            height: self.height + 1,
            gas_used: 120_000,
            events: self.events.clone(),
        })
    }
}

fn order_event(dseq: u64, gseq: u32) -> TxEvent {
    TxEvent::new("akash.market.v1.EventOrderCreated").with_attr(
        "id",
        format!(
            r#"{{"owner":"{}","dseq":"{}","gseq":{},"oseq":1}}"#,
            OWNER, dseq, gseq
        ),
    )
}

fn load(dseq: u64) -> DeploymentData {
    let content = std::fs::read(SDL_PATH).unwrap();
    DeploymentData::from_sdl(content, DeploymentId::new(OWNER, dseq)).unwrap()
}

#[tokio::test]
async fn test_dseq_defaults_to_block_height() {
    let chain = StubChain::new(1_234_567);

    let d = DeploymentData::from_sdl_file(SDL_PATH, chain.address(), None, &chain)
        .await
        .unwrap();
    assert_eq!(d.id().dseq, 1_234_567);
    assert_eq!(d.groups().len(), 2);

    let zero = DeploymentData::from_sdl_file(SDL_PATH, chain.address(), Some(0), &chain)
        .await
        .unwrap();
    assert_eq!(zero.id().dseq, 1_234_567);

    let explicit = DeploymentData::from_sdl_file(SDL_PATH, chain.address(), Some(42), &chain)
        .await
        .unwrap();
    assert_eq!(explicit.id().dseq, 42);
}

#[tokio::test]
async fn test_missing_sdl_file() {
    let chain = StubChain::new(1);
    let err = DeploymentData::from_sdl_file("does/not/exist.yaml", OWNER, Some(1), &chain)
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Sdl(_)));
}

#[tokio::test]
async fn test_create_then_apply_tx_events() {
    let mut chain = StubChain::new(500);
    chain.events = vec![order_event(500, 1), order_event(500, 2), order_event(999, 1)];

    let d = DeploymentData::from_sdl_file(SDL_PATH, OWNER, None, &chain)
        .await
        .unwrap();
    let result = chain.send(&d.msg_create()).await.unwrap();
    assert_eq!(*chain.broadcasts.lock().unwrap(), 1);

    for event in MarketEvent::collect(&result.events) {
        d.apply(&event);
    }
    // the dseq 999 order belongs to someone else's deployment
    assert_eq!(d.orders().len(), 2);
    assert!(d.expected_orders());
    assert!(!d.expected_leases());
}

#[test]
fn test_groups_follow_placements() {
    let d = load(10);
    let names: Vec<&str> = d.groups().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["akash", "community"]);

    let manifest = d.manifest().unwrap();
    assert_eq!(manifest.groups.len(), 2);
    assert_eq!(manifest.service_count(), 2);
}

#[test]
fn test_concurrent_lease_updates_lose_nothing() {
    let d = Arc::new(load(10));
    let dep = d.id().clone();

    const THREADS: u32 = 8;
    const PER_THREAD: u32 = 200;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let d = Arc::clone(&d);
            let dep = dep.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let order = OrderId::new(&GroupId::new(&dep, t + 1), i + 1);
                    let lease = LeaseId::new(&order, format!("akash1provider{}", t));
                    assert!(d.add_lease(lease.clone()));
                    // every thread removes its odd leases again
                    if i % 2 == 1 {
                        assert!(d.remove_lease(&lease));
                    }
                    let _ = d.leases();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let leases = d.leases();
    assert_eq!(leases.len() as u32, THREADS * PER_THREAD / 2);
    assert!(leases.iter().all(|l| l.oseq % 2 == 1));
}

#[test]
fn test_apply_close_reports_removal_under_contention() {
    let d = Arc::new(load(10));
    let dep = d.id().clone();
    let target = OrderId::new(&GroupId::new(&dep, 1), 1);

    let churn = {
        let d = Arc::clone(&d);
        let dep = dep.clone();
        thread::spawn(move || {
            for i in 0..20_000u32 {
                let other = OrderId::new(&GroupId::new(&dep, 2), i + 1);
                d.add_order(other.clone());
                d.remove_order(&other);
            }
        })
    };

    let mut missed = 0;
    for _ in 0..20_000 {
        assert!(d.add_order(target.clone()));
        if !d.apply(&MarketEvent::OrderClosed(target.clone())) {
            missed += 1;
        }
    }
    churn.join().unwrap();

    assert_eq!(missed, 0);
    assert!(d.orders().is_empty());
}

#[test]
fn test_concurrent_orders_with_duplicates() {
    let d = Arc::new(load(10));
    let dep = d.id().clone();

    // every thread adds the same two orders
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let d = Arc::clone(&d);
            let dep = dep.clone();
            thread::spawn(move || {
                for gseq in 1..=2 {
                    d.add_order(OrderId::new(&GroupId::new(&dep, gseq), 1));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(d.orders().len(), 2);
    assert!(d.expected_orders());
}

#[tokio::test]
async fn test_tracker_task_with_concurrent_producers() {
    let d = Arc::new(load(77));
    let dep = d.id().clone();
    let (tx, rx) = mpsc::channel(8);
    let tracker = tokio::spawn(Arc::clone(&d).track(rx));

    let mut producers = Vec::new();
    for gseq in 1..=2u32 {
        let tx = tx.clone();
        let dep = dep.clone();
        producers.push(tokio::spawn(async move {
            let order = OrderId::new(&GroupId::new(&dep, gseq), 1);
            tx.send(MarketEvent::OrderCreated(order.clone())).await.unwrap();
            tx.send(MarketEvent::LeaseCreated(LeaseId::new(&order, "akash1prov")))
                .await
                .unwrap();
        }));
    }
    drop(tx);
    for p in producers {
        p.await.unwrap();
    }

    assert!(tracker.await.unwrap());
    assert!(d.expected_leases());
    assert_eq!(d.leases().len(), 2);
}
