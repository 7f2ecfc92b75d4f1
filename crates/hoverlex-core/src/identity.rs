use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::LookupError;

const NO_LOOKUP: u64 = 0;

/// Token minted for every dispatched lookup. Later identities supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LookupIdentity(u64);

impl LookupIdentity {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LookupIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns the active lookup identity.
///
/// Only the coordinator mints and retires identities; pipelines hold a
/// [`LookupGuard`] and can only read.
#[derive(Debug)]
pub struct IdentityGate {
    active: Arc<AtomicU64>,
    next: u64,
}

impl Default for IdentityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGate {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicU64::new(NO_LOOKUP)),
            next: NO_LOOKUP,
        }
    }

    /// New identity, which becomes the active one immediately
    pub fn mint(&mut self) -> LookupIdentity {
        self.next += 1;
        self.active.store(self.next, Ordering::Release);
        LookupIdentity(self.next)
    }

    /// No lookup is active afterwards
    pub fn retire(&self) {
        self.active.store(NO_LOOKUP, Ordering::Release);
    }

    pub fn active(&self) -> Option<LookupIdentity> {
        match self.active.load(Ordering::Acquire) {
            NO_LOOKUP => None,
            id => Some(LookupIdentity(id)),
        }
    }

    pub fn is_active(&self, identity: LookupIdentity) -> bool {
        self.active.load(Ordering::Acquire) == identity.0
    }

    pub fn guard(&self, identity: LookupIdentity, cancel: CancellationToken) -> LookupGuard {
        LookupGuard {
            identity,
            active: self.active.clone(),
            cancel,
        }
    }
}

/// Read side of the gate carried by one pipeline run
#[derive(Debug, Clone)]
pub struct LookupGuard {
    identity: LookupIdentity,
    active: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl LookupGuard {
    pub fn identity(&self) -> LookupIdentity {
        self.identity
    }

    pub fn is_current(&self) -> bool {
        !self.cancel.is_cancelled() && self.active.load(Ordering::Acquire) == self.identity.0
    }

    pub fn check(&self) -> Result<(), LookupError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(LookupError::Cancelled)
        }
    }

    /// Drive `fut` until it finishes or the lookup is cancelled. The identity
    /// is checked again once `fut` completes.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, LookupError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LookupError::Cancelled),
            output = fut => {
                self.check()?;
                Ok(output)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_minting_supersedes_previous_identity() {
        let mut gate = IdentityGate::new();
        let first = gate.mint();
        let guard = gate.guard(first, CancellationToken::new());
        assert!(guard.check().is_ok());

        let second = gate.mint();
        assert!(second > first);
        assert!(guard.check().is_err());
        assert!(gate.is_active(second));
        assert_eq!(gate.active(), Some(second));
    }

    #[test]
    fn test_retire_leaves_nothing_active() {
        let mut gate = IdentityGate::new();
        let id = gate.mint();
        gate.retire();
        assert_eq!(gate.active(), None);
        assert!(!gate.is_active(id));
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let mut gate = IdentityGate::new();
        let cancel = CancellationToken::new();
        let id = gate.mint();
        let guard = gate.guard(id, cancel.clone());

        let pending = tokio::spawn({
            let guard = guard.clone();
            async move {
                guard
                    .run(tokio::time::sleep(Duration::from_secs(30)))
                    .await
            }
        });
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), pending)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(LookupError::Cancelled)));
    }

    #[tokio::test]
    async fn test_run_rejects_output_of_superseded_lookup() {
        let mut gate = IdentityGate::new();
        let id = gate.mint();
        let guard = gate.guard(id, CancellationToken::new());
        gate.mint();

        let result = guard.run(async { 42 }).await;
        assert!(matches!(result, Err(LookupError::Cancelled)));
    }
}
