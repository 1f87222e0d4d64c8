//! Client-side view of one deployment: its groups, the orders placed for
//! them and the leases won.
//!
//! `DeploymentData` is shared between the command that submits the
//! deployment and the task that watches market events. Groups, id, version
//! and manifest are fixed at construction; orders and leases sit behind one
//! `RwLock` and are only ever copied out.

pub mod events;

use crate::backend::ChainBackend;
use crate::error::DeployError;
use crate::gen::akash::base::deposit::v1::{Deposit, Source};
use crate::gen::akash::deployment::v1beta4::{GroupSpec, MsgCloseDeployment, MsgCreateDeployment};
use crate::gen::cosmos::base::v1beta1::Coin;
use crate::manifest::{manifest_version, Manifest};
use crate::sdl::Sdl;
use crate::types::{DeploymentId, LeaseId, OrderId};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;

pub use events::MarketEvent;

/// Escrow deposit used when none is configured.
pub const DEFAULT_DEPOSIT_UAKT: u64 = 5_000_000;

#[derive(Debug, Default)]
struct Tracked {
    orders: Vec<OrderId>,
    leases: Vec<LeaseId>,
}

#[derive(Debug)]
pub struct DeploymentData {
    sdl_file: Vec<u8>,
    sdl: Option<Sdl>,
    manifest: Option<Manifest>,
    groups: Vec<GroupSpec>,
    id: DeploymentId,
    version: Vec<u8>,
    deposit: Coin,
    tracked: RwLock<Tracked>,
}

impl DeploymentData {
    /// Read and parse an SDL file. A `dseq` of `None` or `0` is replaced by
    /// the current block height.
    pub async fn from_sdl_file<B: ChainBackend>(
        path: impl AsRef<Path>,
        owner: impl Into<String>,
        dseq: Option<u64>,
        backend: &B,
    ) -> Result<Self, DeployError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|e| {
            DeployError::Sdl(format!("failed to read {}: {}", path.display(), e))
        })?;

        let dseq = match dseq {
            Some(d) if d > 0 => d,
            _ => {
                let height = backend.block_height().await?;
                tracing::debug!(height, "using block height as dseq");
                height
            }
        };

        Self::from_sdl(content, DeploymentId::new(owner, dseq))
    }

    /// Build from SDL bytes for a known deployment id.
    pub fn from_sdl(content: impl Into<Vec<u8>>, id: DeploymentId) -> Result<Self, DeployError> {
        let sdl_file = content.into();
        let sdl = Sdl::read(&sdl_file)?;
        let groups = sdl.deployment_groups()?;
        let manifest = Manifest::from_sdl(&sdl)?;
        let version = manifest_version(&manifest)?;

        tracing::info!(
            deployment = %id,
            groups = groups.len(),
            version = %hex::encode(&version),
            "loaded deployment"
        );

        Ok(Self {
            sdl_file,
            sdl: Some(sdl),
            manifest: Some(manifest),
            groups,
            id,
            version,
            deposit: default_deposit(),
            tracked: RwLock::new(Tracked::default()),
        })
    }

    /// An empty tracker that only knows its owner, for commands that act
    /// on an existing deployment (closing it, for one).
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            sdl_file: Vec::new(),
            sdl: None,
            manifest: None,
            groups: Vec::new(),
            id: DeploymentId::new(owner, 0),
            version: Vec::new(),
            deposit: default_deposit(),
            tracked: RwLock::new(Tracked::default()),
        }
    }

    pub fn with_dseq(mut self, dseq: u64) -> Self {
        self.id.dseq = dseq;
        self
    }

    pub fn with_deposit(mut self, deposit: Coin) -> Self {
        self.deposit = deposit;
        self
    }

    pub fn id(&self) -> &DeploymentId {
        &self.id
    }

    pub fn groups(&self) -> &[GroupSpec] {
        &self.groups
    }

    pub fn version(&self) -> &[u8] {
        &self.version
    }

    pub fn sdl_file(&self) -> &[u8] {
        &self.sdl_file
    }

    pub fn sdl(&self) -> Option<&Sdl> {
        self.sdl.as_ref()
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn deposit(&self) -> &Coin {
        &self.deposit
    }

    // The guarded data is two plain vectors, valid after any panic.
    fn read(&self) -> RwLockReadGuard<'_, Tracked> {
        self.tracked.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tracked> {
        self.tracked.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track an order. Returns `false` if it was already tracked.
    pub fn add_order(&self, order: OrderId) -> bool {
        let mut tracked = self.write();
        if tracked.orders.contains(&order) {
            return false;
        }
        tracing::debug!(order = %order, "tracking order");
        tracked.orders.push(order);
        true
    }

    /// Stop tracking an order. Returns `false` if it was not tracked.
    pub fn remove_order(&self, order: &OrderId) -> bool {
        let mut tracked = self.write();
        let before = tracked.orders.len();
        tracked.orders.retain(|o| o != order);
        tracked.orders.len() != before
    }

    /// Track a lease. Returns `false` if it was already tracked.
    pub fn add_lease(&self, lease: LeaseId) -> bool {
        let mut tracked = self.write();
        if tracked.leases.contains(&lease) {
            return false;
        }
        tracing::debug!(lease = %lease, "tracking lease");
        tracked.leases.push(lease);
        true
    }

    pub fn remove_lease(&self, lease: &LeaseId) -> bool {
        let mut tracked = self.write();
        let before = tracked.leases.len();
        tracked.leases.retain(|l| l != lease);
        tracked.leases.len() != before
    }

    /// Snapshot of the tracked leases.
    pub fn leases(&self) -> Vec<LeaseId> {
        self.read().leases.clone()
    }

    /// Snapshot of the tracked orders.
    pub fn orders(&self) -> Vec<OrderId> {
        self.read().orders.clone()
    }

    /// Whether every group has an order. May be stale by the time the
    /// caller acts on it.
    pub fn expected_orders(&self) -> bool {
        self.read().orders.len() == self.groups.len()
    }

    /// Whether every group has a lease.
    pub fn expected_leases(&self) -> bool {
        self.read().leases.len() == self.groups.len()
    }

    pub fn msg_create(&self) -> MsgCreateDeployment {
        MsgCreateDeployment {
            id: Some(self.id.to_proto()),
            groups: self.groups.clone(),
            hash: self.version.clone(),
            deposit: Some(Deposit {
                amount: Some(self.deposit.clone()),
                sources: vec![Source::Balance as i32],
            }),
        }
    }

    pub fn msg_close(&self) -> MsgCloseDeployment {
        MsgCloseDeployment {
            id: Some(self.id.to_proto()),
        }
    }

    /// Apply a market event. Events for other deployments are ignored.
    /// Returns whether the tracked state changed.
    pub fn apply(&self, event: &MarketEvent) -> bool {
        match event {
            MarketEvent::OrderCreated(order) if order.belongs_to(&self.id) => {
                self.add_order(order.clone())
            }
            MarketEvent::OrderClosed(order) if order.belongs_to(&self.id) => {
                self.remove_order(order)
            }
            MarketEvent::LeaseCreated(lease) if lease.belongs_to(&self.id) => {
                self.add_lease(lease.clone())
            }
            MarketEvent::LeaseClosed(lease) if lease.belongs_to(&self.id) => {
                self.remove_lease(lease)
            }
            _ => false,
        }
    }

    /// Consume market events until every group has a lease or the sender
    /// goes away. Returns whether all leases were won.
    pub async fn track(self: Arc<Self>, mut rx: mpsc::Receiver<MarketEvent>) -> bool {
        if self.expected_leases() {
            return true;
        }
        while let Some(event) = rx.recv().await {
            if self.apply(&event) {
                tracing::info!(
                    deployment = %self.id,
                    orders = self.orders().len(),
                    leases = self.leases().len(),
                    groups = self.groups.len(),
                    "deployment updated"
                );
            }
            if self.expected_leases() {
                return true;
            }
        }
        tracing::warn!(deployment = %self.id, "event stream closed before all leases were won");
        false
    }
}

fn default_deposit() -> Coin {
    Coin {
        denom: "uakt".to_string(),
        amount: DEFAULT_DEPOSIT_UAKT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::ValidateBasic;
    use crate::sdl::tests::VALID_SDL;
    use crate::types::GroupId;

    const OWNER: &str = "akash1qyqszqgpqyqszqgpqyqszqgpqyqszqgpjnp7du";

    // One placement per service, so three groups.
    fn three_group_sdl() -> String {
        VALID_SDL
            .replace(
                "  db:\n    dcloud:\n      profile: db",
                "  db:\n    akamai:\n      profile: db",
            )
            .replace(
                "  placement:\n",
                "  placement:\n    akamai:\n      pricing:\n        db:\n          amount: 10\n    equinix:\n      pricing:\n        web:\n          amount: 20\n",
            )
            .replace(
                "deployment:\n",
                "deployment:\n  cache:\n    equinix:\n      profile: web\n",
            )
            .replace(
                "services:\n",
                "services:\n  cache:\n    image: redis:7\n",
            )
    }

    fn tracker() -> DeploymentData {
        DeploymentData::from_sdl(three_group_sdl(), DeploymentId::new(OWNER, 100)).unwrap()
    }

    fn order(d: &DeploymentData, gseq: u32) -> OrderId {
        OrderId::new(&GroupId::new(d.id(), gseq), 1)
    }

    fn lease(d: &DeploymentData, gseq: u32) -> LeaseId {
        LeaseId::new(&order(d, gseq), "akash1provider")
    }

    #[test]
    fn test_from_sdl_builds_groups_and_version() {
        let d = tracker();
        assert_eq!(d.groups().len(), 3);
        assert_eq!(d.version().len(), 32);
        assert_eq!(d.id().dseq, 100);
        assert!(d.manifest().is_some());
        assert!(d.orders().is_empty());
        assert!(d.leases().is_empty());
    }

    #[test]
    fn test_from_sdl_rejects_bad_sdl() {
        let err = DeploymentData::from_sdl("version: \"2.0\"\n", DeploymentId::new(OWNER, 1))
            .unwrap_err();
        assert!(matches!(err, DeployError::Sdl(_)));
    }

    #[test]
    fn test_expected_orders() {
        let d = tracker();
        assert!(!d.expected_orders());
        assert!(d.add_order(order(&d, 1)));
        assert!(d.add_order(order(&d, 2)));
        assert!(!d.expected_orders());
        assert!(d.add_order(order(&d, 3)));
        assert!(d.expected_orders());
    }

    #[test]
    fn test_add_order_ignores_duplicates() {
        let d = tracker();
        assert!(d.add_order(order(&d, 1)));
        assert!(!d.add_order(order(&d, 1)));
        assert_eq!(d.orders().len(), 1);
    }

    #[test]
    fn test_remove_absent_order_is_noop() {
        let d = tracker();
        d.add_order(order(&d, 1));
        d.add_order(order(&d, 2));
        let before = d.orders();
        assert!(!d.remove_order(&order(&d, 3)));
        assert_eq!(d.orders(), before);
        assert!(d.remove_order(&order(&d, 2)));
    }

    #[test]
    fn test_add_remove_sequence() {
        let d = tracker();
        d.add_order(order(&d, 1));
        d.add_order(order(&d, 2));
        d.remove_order(&order(&d, 1));
        d.add_order(order(&d, 3));
        d.remove_order(&order(&d, 3));
        assert_eq!(d.orders(), vec![order(&d, 2)]);
    }

    #[test]
    fn test_leases_snapshot_is_a_copy() {
        let d = tracker();
        d.add_lease(lease(&d, 1));
        let snapshot = d.leases();
        d.add_lease(lease(&d, 2));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(d.leases().len(), 2);
    }

    #[test]
    fn test_expected_leases_after_remove() {
        let d = tracker();
        for g in 1..=3 {
            d.add_lease(lease(&d, g));
        }
        assert!(d.expected_leases());
        d.remove_lease(&lease(&d, 2));
        assert!(!d.expected_leases());
    }

    #[test]
    fn test_msg_create_is_pure() {
        let d = tracker();
        let a = d.msg_create();
        let b = d.msg_create();
        assert_eq!(a, b);
        assert_eq!(a.hash, d.version());
        assert_eq!(a.groups.len(), 3);
        assert!(a.validate_basic().is_ok());
    }

    #[test]
    fn test_msg_create_uses_deposit() {
        let d = tracker().with_deposit(Coin {
            denom: "uakt".into(),
            amount: "750000".into(),
        });
        let msg = d.msg_create();
        let amount = msg.deposit.unwrap().amount.unwrap();
        assert_eq!(amount.amount, "750000");
    }

    #[test]
    fn test_for_owner_close() {
        let d = DeploymentData::for_owner(OWNER).with_dseq(55);
        let msg = d.msg_close();
        assert_eq!(msg.id.as_ref().unwrap().dseq, 55);
        assert!(msg.validate_basic().is_ok());
        assert!(d.msg_create().validate_basic().is_err());
    }

    #[test]
    fn test_apply_routes_by_deployment() {
        let d = tracker();
        assert!(d.apply(&MarketEvent::OrderCreated(order(&d, 1))));

        let other = DeploymentId::new(OWNER, 101);
        let foreign = OrderId::new(&GroupId::new(&other, 1), 1);
        assert!(!d.apply(&MarketEvent::OrderCreated(foreign)));
        assert_eq!(d.orders().len(), 1);

        assert!(d.apply(&MarketEvent::LeaseCreated(lease(&d, 1))));
        assert!(d.apply(&MarketEvent::OrderClosed(order(&d, 1))));
        assert!(!d.apply(&MarketEvent::OrderClosed(order(&d, 1))));
        assert!(d.orders().is_empty());
        assert_eq!(d.leases().len(), 1);
    }

    #[tokio::test]
    async fn test_track_returns_when_all_leases_won() {
        let d = Arc::new(tracker());
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(d.clone().track(rx));

        for g in 1..=3 {
            tx.send(MarketEvent::OrderCreated(order(&d, g))).await.unwrap();
            tx.send(MarketEvent::LeaseCreated(lease(&d, g))).await.unwrap();
        }

        assert!(handle.await.unwrap());
        assert!(d.expected_leases());
        assert!(d.expected_orders());
    }

    #[tokio::test]
    async fn test_track_returns_false_when_channel_closes() {
        let d = Arc::new(tracker());
        let (tx, rx) = mpsc::channel(4);
        tx.send(MarketEvent::LeaseCreated(lease(&d, 1))).await.unwrap();
        drop(tx);

        assert!(!d.clone().track(rx).await);
        assert_eq!(d.leases().len(), 1);
    }
}
