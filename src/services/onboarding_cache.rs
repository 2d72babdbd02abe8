use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::gates::OnboardingState;
use crate::models::UserProfile;
use crate::supabase::{SupabaseClient, SupabaseError};

struct Reconcile {
    id: u64,
    handle: JoinHandle<()>,
}

/// Process-wide cache of each user's onboarded flag.
///
/// A cached answer is served immediately and then checked against the remote
/// profile by a delayed one-shot task. Logging out drops the entry and
/// aborts that task.
///
/// Lock order is `reconcilers` then `flags`. A reconcile task only writes
/// its result while its id is still the one registered for the user, so a
/// task that was replaced or invalidated cannot resurrect a flag.
#[derive(Clone, Default)]
pub struct OnboardingCache {
    flags: Arc<RwLock<HashMap<String, bool>>>,
    reconcilers: Arc<Mutex<HashMap<String, Reconcile>>>,
    next_id: Arc<AtomicU64>,
}

impl OnboardingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<bool> {
        self.flags.read().await.get(user_id).copied()
    }

    pub async fn set(&self, user_id: &str, onboarded: bool) {
        self.flags
            .write()
            .await
            .insert(user_id.to_string(), onboarded);
    }

    /// Cancel any reconciliation for the user, then forget their flag.
    pub async fn invalidate(&self, user_id: &str) {
        let mut reconcilers = self.reconcilers.lock().await;
        if let Some(reconcile) = reconcilers.remove(user_id) {
            reconcile.handle.abort();
            tracing::debug!(user_id, "Onboarding reconcile cancelled");
        }
        self.flags.write().await.remove(user_id);
    }

    /// Whether a reconciliation task is still scheduled or running.
    pub async fn reconcile_pending(&self, user_id: &str) -> bool {
        self.reconcilers
            .lock()
            .await
            .get(user_id)
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Number of users with a reconcile task on record.
    pub async fn tracked_reconciles(&self) -> usize {
        self.reconcilers.lock().await.len()
    }

    /// Schedule a remote check of the user's flag after `delay`, replacing
    /// any check already scheduled for that user. Failures keep the cached
    /// value and are only logged.
    pub async fn schedule_reconcile(&self, client: SupabaseClient, user_id: &str, delay: Duration) {
        let mut reconcilers = self.reconcilers.lock().await;
        self.spawn_reconcile(&mut reconcilers, client, user_id, delay);
    }

    /// Like [`schedule_reconcile`](Self::schedule_reconcile), but leaves an
    /// unfinished check in place so frequent hits cannot postpone it forever.
    async fn ensure_reconcile(&self, client: &SupabaseClient, user_id: &str, delay: Duration) {
        let mut reconcilers = self.reconcilers.lock().await;
        if reconcilers
            .get(user_id)
            .is_some_and(|r| !r.handle.is_finished())
        {
            return;
        }
        self.spawn_reconcile(&mut reconcilers, client.clone(), user_id, delay);
    }

    fn spawn_reconcile(
        &self,
        reconcilers: &mut HashMap<String, Reconcile>,
        client: SupabaseClient,
        user_id: &str,
        delay: Duration,
    ) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cache = self.clone();
        let user = user_id.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = client.get_profile(&user).await;
            cache.finish_reconcile(&user, id, result).await;
        });

        if let Some(previous) = reconcilers.insert(user_id.to_string(), Reconcile { id, handle }) {
            previous.handle.abort();
        }
    }

    async fn finish_reconcile(
        &self,
        user_id: &str,
        id: u64,
        result: Result<Option<UserProfile>, SupabaseError>,
    ) {
        let mut reconcilers = self.reconcilers.lock().await;
        if reconcilers.get(user_id).map(|r| r.id) != Some(id) {
            tracing::debug!(user_id, "Stale onboarding reconcile discarded");
            return;
        }
        reconcilers.remove(user_id);

        match result {
            Ok(Some(profile)) => {
                let onboarded = profile.onboarding_completed;
                let previous = self
                    .flags
                    .write()
                    .await
                    .insert(user_id.to_string(), onboarded);
                if previous != Some(onboarded) {
                    tracing::info!(
                        user_id,
                        onboarded,
                        "Onboarding flag reconciled with remote profile"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(user_id, "Onboarding reconcile: no profile row");
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Onboarding reconcile failed");
            }
        }
    }

    /// Onboarding state for the gates.
    ///
    /// Cache hit: answer from the cache and make sure a reconciliation is
    /// scheduled. Cache miss: ask the remote profile; if that fails the
    /// state stays `Checking` so no gate redirects on a guess.
    pub async fn resolve(
        &self,
        client: &SupabaseClient,
        user_id: &str,
        reconcile_delay: Duration,
    ) -> OnboardingState {
        if let Some(onboarded) = self.get(user_id).await {
            self.ensure_reconcile(client, user_id, reconcile_delay).await;
            return OnboardingState::from(onboarded);
        }

        match client.get_profile(user_id).await {
            Ok(Some(profile)) => {
                self.set(user_id, profile.onboarding_completed).await;
                OnboardingState::from(profile.onboarding_completed)
            }
            Ok(None) => OnboardingState::NotOnboarded,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Onboarding lookup failed");
                OnboardingState::Checking
            }
        }
    }
}
