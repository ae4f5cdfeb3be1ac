//! The sandbox registry itself.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tokio::time::Duration;
use uuid::Uuid;

use crate::error::SandboxError;
use crate::mode::Mode;

/// The opaque task identity used to key registry entries.
pub type TaskId = tokio::task::Id;

/// A stable, encodable owner identity, independent of any task's runtime
/// identity. This is the value carried across the `x-ps3-sandbox-owner`
/// header and returned by [`Registry::start_owner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Mint a fresh, random owner identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The identity's raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Reconstruct an owner identity from previously encoded bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 16] = bytes.try_into().ok()?;
        Some(Self(Uuid::from_bytes(arr)))
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

/// The pair of storage containers a sandbox owner gets allocated.
///
/// Generic over the two concrete container types so this crate carries no
/// dependency on any particular storage data model.
pub struct OwnerContainers<B, O> {
    /// The owner's private bucket-metadata container.
    pub buckets: Arc<B>,
    /// The owner's private object-record container.
    pub objects: Arc<O>,
}

impl<B, O> Clone for OwnerContainers<B, O> {
    fn clone(&self) -> Self {
        Self {
            buckets: Arc::clone(&self.buckets),
            objects: Arc::clone(&self.objects),
        }
    }
}

struct OwnerRecord<B, O> {
    owner_id: OwnerId,
    containers: OwnerContainers<B, O>,
}

enum Entry<B, O> {
    Owner(OwnerRecord<B, O>),
    Allowed(TaskId),
}

/// The outcome of a successful [`Registry::checkout`].
pub enum CheckoutResult<B, O> {
    /// A fresh owner record was created for this task.
    Created(OwnerId, OwnerContainers<B, O>),
    /// The task already owned a record; its existing containers are
    /// returned unchanged.
    AlreadyOwner(OwnerId, OwnerContainers<B, O>),
}

impl<B, O> CheckoutResult<B, O> {
    /// The owner identity, regardless of which variant this is.
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        match self {
            Self::Created(id, _) | Self::AlreadyOwner(id, _) => *id,
        }
    }

    /// The owner's containers, regardless of which variant this is.
    #[must_use]
    pub fn containers(&self) -> OwnerContainers<B, O> {
        match self {
            Self::Created(_, c) | Self::AlreadyOwner(_, c) => c.clone(),
        }
    }
}

/// Options controlling [`Registry::start_owner`].
#[derive(Debug, Clone)]
pub struct StartOwnerOptions {
    /// If set, the registry's mode is switched to `Shared(owner)` once the
    /// new owner finishes checkout.
    pub shared: bool,
    /// Maximum time to wait for the spawned helper task to complete
    /// checkout before giving up.
    pub timeout: Duration,
}

impl Default for StartOwnerOptions {
    fn default() -> Self {
        Self {
            shared: false,
            timeout: Duration::from_secs(5),
        }
    }
}

struct CleanupGuard<B: 'static, O: 'static> {
    registry: Arc<Registry<B, O>>,
    task_id: TaskId,
}

impl<B, O> Drop for CleanupGuard<B, O> {
    fn drop(&mut self) {
        self.registry.checkin(self.task_id);
    }
}

/// The sandbox registry: a process-wide, long-lived service mapping task
/// identities to owner or allowance records.
///
/// All operations are safe to call concurrently from any number of tasks.
pub struct Registry<B, O> {
    by_task: DashMap<TaskId, Entry<B, O>>,
    by_owner_id: DashMap<OwnerId, TaskId>,
    owner_stops: DashMap<OwnerId, oneshot::Sender<()>>,
    mode: RwLock<Mode>,
}

impl<B, O> Default for Registry<B, O>
where
    B: Default + Send + Sync + 'static,
    O: Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B, O> Registry<B, O>
where
    B: Default + Send + Sync + 'static,
    O: Default + Send + Sync + 'static,
{
    /// Create a new, empty registry in `Mode::Off`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_task: DashMap::new(),
            by_owner_id: DashMap::new(),
            owner_stops: DashMap::new(),
            mode: RwLock::new(Mode::default()),
        }
    }

    /// Create a new, empty registry already in `mode`.
    ///
    /// Bypasses the ownership check [`Registry::set_mode`] enforces for
    /// `Mode::Shared` -- there is no owner yet to check at construction
    /// time, since this is meant for loading a mode from process
    /// configuration at startup, not for a runtime caller to flip modes
    /// mid-flight (use [`Registry::set_mode`] for that).
    #[must_use]
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            by_task: DashMap::new(),
            by_owner_id: DashMap::new(),
            owner_stops: DashMap::new(),
            mode: RwLock::new(mode),
        }
    }

    /// Check out fresh containers for `task`, making it a sandbox owner.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::AlreadyAllowed`] if `task` is currently
    /// allowed under a different owner; a task cannot be both at once.
    pub fn checkout(&self, task: TaskId) -> Result<CheckoutResult<B, O>, SandboxError> {
        if let Some(entry) = self.by_task.get(&task) {
            match &*entry {
                Entry::Owner(rec) => {
                    return Ok(CheckoutResult::AlreadyOwner(
                        rec.owner_id,
                        rec.containers.clone(),
                    ));
                }
                Entry::Allowed(_) => return Err(SandboxError::AlreadyAllowed),
            }
        }

        let owner_id = OwnerId::new();
        let containers = OwnerContainers {
            buckets: Arc::new(B::default()),
            objects: Arc::new(O::default()),
        };
        self.by_task.insert(
            task,
            Entry::Owner(OwnerRecord {
                owner_id,
                containers: containers.clone(),
            }),
        );
        self.by_owner_id.insert(owner_id, task);

        Ok(CheckoutResult::Created(owner_id, containers))
    }

    /// Tear down `task`'s owner record, if any, destroying its containers
    /// and removing every allowance that pointed to it.
    ///
    /// Idempotent: calling this for a task with no owner record is a no-op.
    pub fn checkin(&self, task: TaskId) {
        let Some((_, entry)) = self.by_task.remove(&task) else {
            return;
        };
        let Entry::Owner(rec) = entry else {
            // Re-insert: checkin is defined on owners, not allowed tasks.
            self.by_task.insert(task, entry);
            return;
        };
        self.by_owner_id.remove(&rec.owner_id);
        self.owner_stops.remove(&rec.owner_id);
        self.by_task
            .retain(|_, v| !matches!(v, Entry::Allowed(owner) if *owner == task));
        tracing::debug!(owner = ?rec.owner_id, "sandbox owner checked in");
    }

    /// Grant `child` access to `owner`'s containers.
    ///
    /// # Errors
    ///
    /// - [`SandboxError::NotFound`] if `owner` is not a registered owner.
    /// - [`SandboxError::AlreadyOwner`] if `child` already owns a record.
    /// - [`SandboxError::AlreadyAllowed`] if `child` is already allowed
    ///   under some owner (use [`Registry::force_allow`] to rebind).
    pub fn allow(&self, owner: OwnerId, child: TaskId) -> Result<(), SandboxError> {
        let owner_task = self
            .by_owner_id
            .get(&owner)
            .map(|r| *r)
            .ok_or(SandboxError::NotFound)?;
        if let Some(entry) = self.by_task.get(&child) {
            match &*entry {
                Entry::Owner(_) => return Err(SandboxError::AlreadyOwner),
                Entry::Allowed(_) => return Err(SandboxError::AlreadyAllowed),
            }
        }
        self.by_task.insert(child, Entry::Allowed(owner_task));
        Ok(())
    }

    /// Unconditionally (re)bind `child` to `owner`, overwriting any
    /// existing owner or allowance record `child` held.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::NotFound`] if `owner` is not a registered
    /// owner.
    pub fn force_allow(&self, owner: OwnerId, child: TaskId) -> Result<(), SandboxError> {
        let owner_task = self
            .by_owner_id
            .get(&owner)
            .map(|r| *r)
            .ok_or(SandboxError::NotFound)?;
        // If child was itself an owner, tear that record down first.
        if matches!(self.by_task.get(&child).as_deref(), Some(Entry::Owner(_))) {
            self.checkin(child);
        }
        self.by_task.insert(child, Entry::Allowed(owner_task));
        Ok(())
    }

    /// The registry's current fallback mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        *self.mode.read()
    }

    /// Whether sandboxing is active (mode is not `Off`).
    #[must_use]
    pub fn enabled(&self) -> bool {
        !matches!(self.mode(), Mode::Off)
    }

    /// Reset the mode back to its default (`Off`).
    pub fn reset_mode(&self) {
        *self.mode.write() = Mode::Off;
    }

    /// Change the registry's mode.
    ///
    /// # Errors
    ///
    /// - [`SandboxError::NotOwner`] if setting `Mode::Shared(owner)` and the
    ///   calling `requester` task is not `owner` itself.
    /// - [`SandboxError::NotFound`] if `requester` is not a registered
    ///   owner at all.
    /// - [`SandboxError::AlreadyShared`] if the mode is already
    ///   `Shared(owner)` for this exact owner.
    pub fn set_mode(&self, requester: TaskId, new_mode: Mode) -> Result<(), SandboxError> {
        if let Mode::Shared(target) = new_mode {
            let requester_owner = match self.by_task.get(&requester).as_deref() {
                Some(Entry::Owner(rec)) => rec.owner_id,
                Some(Entry::Allowed(_)) => return Err(SandboxError::NotOwner),
                None => return Err(SandboxError::NotFound),
            };
            if requester_owner != target {
                return Err(SandboxError::NotOwner);
            }
            let mut mode = self.mode.write();
            if *mode == Mode::Shared(target) {
                return Err(SandboxError::AlreadyShared);
            }
            *mode = new_mode;
            return Ok(());
        }
        *self.mode.write() = new_mode;
        Ok(())
    }

    /// Resolve `owner`'s identity to whichever `OwnerId` owns it, if
    /// `task` is either an owner itself or allowed under one.
    #[must_use]
    pub fn lookup_owner(&self, task: TaskId) -> Option<OwnerId> {
        match self.by_task.get(&task).as_deref() {
            Some(Entry::Owner(rec)) => Some(rec.owner_id),
            Some(Entry::Allowed(owner_task)) => match self.by_task.get(owner_task).as_deref() {
                Some(Entry::Owner(rec)) => Some(rec.owner_id),
                _ => None,
            },
            None => None,
        }
    }

    /// Resolve the containers `task` should use right now.
    ///
    /// Resolution order: the task's own owner record; its allowance target
    /// (failing loudly if that owner has since been removed); then the
    /// registry's mode fallback for unregistered tasks.
    ///
    /// # Errors
    ///
    /// Returns a [`SandboxError`] if no containers can be resolved: the
    /// task is allowed under an owner that no longer exists, mode is
    /// `Manual`/`Off` and the task has no record of its own, or the shared
    /// owner named by `Mode::Shared` is gone.
    pub fn resolve_containers(&self, task: TaskId) -> Result<OwnerContainers<B, O>, SandboxError> {
        if let Some(entry) = self.by_task.get(&task) {
            return match &*entry {
                Entry::Owner(rec) => Ok(rec.containers.clone()),
                Entry::Allowed(owner_task) => match self.by_task.get(owner_task).as_deref() {
                    Some(Entry::Owner(rec)) => Ok(rec.containers.clone()),
                    _ => Err(SandboxError::OwnerGone(
                        "allowed task's owner no longer exists".to_owned(),
                    )),
                },
            };
        }

        match self.mode() {
            Mode::Auto => Ok(self.checkout(task)?.containers()),
            Mode::Manual | Mode::Off => Err(SandboxError::NotFound),
            Mode::Shared(owner_id) => {
                let owner_task = self
                    .by_owner_id
                    .get(&owner_id)
                    .map(|r| *r)
                    .ok_or_else(|| SandboxError::OwnerGone("shared owner is gone".to_owned()))?;
                match self.by_task.get(&owner_task).as_deref() {
                    Some(Entry::Owner(rec)) => Ok(rec.containers.clone()),
                    _ => Err(SandboxError::OwnerGone("shared owner is gone".to_owned())),
                }
            }
        }
    }

    /// Spawn a dedicated helper task that becomes a sandbox owner, blocking
    /// until checkout completes or `opts.timeout` elapses.
    ///
    /// The helper task stays alive (holding the owner record and its
    /// containers) until [`Registry::stop_owner`] is called for the
    /// returned identity. If the helper task terminates for any other
    /// reason -- including a panic -- its owner record and containers are
    /// torn down automatically.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Timeout`] if checkout does not complete
    /// within `opts.timeout`, or whatever error [`Registry::checkout`]
    /// itself would have raised.
    pub async fn start_owner(self: &Arc<Self>, opts: StartOwnerOptions) -> Result<OwnerId, SandboxError> {
        let (ready_tx, ready_rx) = oneshot::channel::<Result<OwnerId, SandboxError>>();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let registry = Arc::clone(self);
        let shared = opts.shared;

        tokio::spawn(async move {
            let Some(task_id) = tokio::task::try_id() else {
                let _ = ready_tx.send(Err(SandboxError::OwnerGone(
                    "helper task has no tokio task id".to_owned(),
                )));
                return;
            };
            match registry.checkout(task_id) {
                Ok(outcome) => {
                    let owner_id = outcome.owner_id();
                    let _guard = CleanupGuard {
                        registry: Arc::clone(&registry),
                        task_id,
                    };
                    if shared {
                        if let Err(e) = registry.set_mode(task_id, Mode::Shared(owner_id)) {
                            tracing::warn!(error = %e, "could not enter shared mode for new owner");
                        }
                    }
                    let _ = ready_tx.send(Ok(owner_id));
                    let _ = stop_rx.await;
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });

        match tokio::time::timeout(opts.timeout, ready_rx).await {
            Ok(Ok(Ok(owner_id))) => {
                self.owner_stops.insert(owner_id, stop_tx);
                Ok(owner_id)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_recv_error)) => Err(SandboxError::OwnerGone(
                "owner helper task dropped before reporting".to_owned(),
            )),
            Err(_elapsed) => Err(SandboxError::Timeout),
        }
    }

    /// Stop the owner helper task started by [`Registry::start_owner`] (or
    /// simply tear down a manually-checked-out owner), removing its record,
    /// allowances, and containers. Reverts `Mode::Shared(owner)` back to
    /// `Mode::Auto` if this owner was the shared target.
    ///
    /// Idempotent: calling this for an owner that is already gone is a
    /// no-op.
    pub fn stop_owner(&self, owner: OwnerId) {
        if let Some((_, stop_tx)) = self.owner_stops.remove(&owner) {
            let _ = stop_tx.send(());
        }
        {
            let mut mode = self.mode.write();
            if *mode == Mode::Shared(owner) {
                *mode = Mode::Auto;
            }
        }
        if let Some(entry) = self.by_owner_id.get(&owner) {
            let task_id = *entry;
            drop(entry);
            self.checkin(task_id);
        }
    }
}
