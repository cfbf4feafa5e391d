//! Account state machine and the sync engine.

use crate::applier::{apply_delta, DeltaSummary};
use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use crate::http::{HttpClient, HttpRequest, HttpResponse, UreqClient};
use crate::locks::{AccountLocks, InFlight};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use readsync_protocol::{
    convert_account_key, generate_device_serial, parse_registration_response,
    parse_sync_response, sign_header, sync_request_path, Credentials,
};
use readsync_store::{Account, AccountId, CatalogStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

const AUTH_TOKEN_HEADER: &str = "x-adp-authentication-token";
const DIGEST_HEADER: &str = "x-adp-request-digest";

/// Where an account is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    /// No successful registration yet.
    Unregistered,
    /// Registered; the device key has not been converted yet.
    Registered,
    /// Registered with a signing-ready key.
    Ready,
    /// A sync is in flight.
    Syncing,
}

impl AccountState {
    /// Derives the resting state from a stored account.
    pub fn of(account: &Account) -> Self {
        if !account.is_active() || !account.is_registered() {
            AccountState::Unregistered
        } else if account.signing_key_pem().is_none() {
            AccountState::Registered
        } else {
            AccountState::Ready
        }
    }

    /// Returns true if a sync may start from this state.
    ///
    /// `Registered` qualifies because key conversion runs lazily.
    pub fn can_start_sync(&self) -> bool {
        matches!(self, AccountState::Registered | AccountState::Ready)
    }

    /// Returns true while a sync is running.
    pub fn is_active(&self) -> bool {
        matches!(self, AccountState::Syncing)
    }
}

/// Cumulative statistics across all accounts.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Successful registrations.
    pub registrations: u64,
    /// Sync cycles that applied a delta.
    pub cycles_completed: u64,
    /// Sync cycles that failed.
    pub cycles_failed: u64,
    /// Catalog items created.
    pub items_created: u64,
    /// Ownership links created.
    pub links_created: u64,
    /// Ownership links removed.
    pub links_removed: u64,
    /// Completion time of the last successful sync.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Result of one successful sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The synced account.
    pub account_id: AccountId,
    /// Whether a full snapshot was requested.
    pub requested_full: bool,
    /// The `syncType` reported by the service.
    pub sync_type: String,
    /// The checkpoint now stored on the account.
    pub checkpoint: String,
    /// What the delta changed.
    pub delta: DeltaSummary,
    /// Duration of the sync.
    pub duration: Duration,
}

/// Drives registration and sync for accounts kept in a [`CatalogStore`].
///
/// The engine is shared across threads by reference. Operations on the
/// same account are serialized; different accounts proceed in parallel.
pub struct SyncEngine<C: HttpClient, S: CatalogStore> {
    config: ClientConfig,
    client: C,
    store: Arc<S>,
    locks: AccountLocks,
    in_flight: InFlight,
    stats: RwLock<SyncStats>,
}

impl<C: HttpClient, S: CatalogStore> SyncEngine<C, S> {
    /// Creates a new engine.
    pub fn new(config: ClientConfig, client: C, store: Arc<S>) -> Self {
        Self {
            config,
            client,
            store,
            locks: AccountLocks::default(),
            in_flight: InFlight::default(),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Returns the account, creating it with a fresh device serial if it
    /// does not exist yet. An existing account keeps its serial.
    pub fn create_account(&self, id: AccountId) -> SyncResult<Account> {
        let account = self
            .store
            .create_account(Account::new(id, generate_device_serial()))?;
        Ok(account)
    }

    /// Reports where an account is in its lifecycle.
    pub fn account_state(&self, id: AccountId) -> SyncResult<AccountState> {
        if self.in_flight.contains(id) {
            return Ok(AccountState::Syncing);
        }
        let account = self.load(id)?;
        Ok(AccountState::of(&account))
    }

    /// Registers the account's device with the service.
    ///
    /// On success the token and delivered key are stored and the account
    /// becomes active. On failure the stored account is left untouched.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Authentication`] for unknown credentials
    /// - [`SyncError::Protocol`] for a non-200 status or an error document
    /// - [`SyncError::Transport`] if no response arrived
    pub fn register(&self, id: AccountId, credentials: &Credentials) -> SyncResult<()> {
        let lock = self.locks.get(id);
        let _guard = lock.lock();

        let mut account = self.load(id)?;
        let query = self
            .config
            .device_profile
            .registration_query(account.device_serial())?;
        let body = credentials.form_body()?;

        let request = HttpRequest::post(self.config.registration_url(&query), body.as_bytes().to_vec())
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Host", self.config.registration_host.as_str())
            .with_header("User-Agent", self.config.user_agent.as_str())
            .with_header("Connection", "Keep-Alive");

        let result = self
            .send(&request)
            .and_then(|response| expect_ok(response, "Registration Error"))
            .and_then(|response| {
                parse_registration_response(&response.body).map_err(SyncError::from)
            });

        let registration = match result {
            Ok(registration) => registration,
            Err(err) => {
                tracing::warn!(account = %id, error = %err, "registration failed");
                self.stats.write().last_error = Some(err.to_string());
                return Err(err);
            }
        };

        account.complete_registration(registration.adp_token, registration.device_private_key);
        self.store.save_account(&account)?;

        self.stats.write().registrations += 1;
        tracing::info!(
            account = %id,
            serial = %account.device_serial(),
            "device registered"
        );
        Ok(())
    }

    /// Converts and persists the signing key if it is not cached yet.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotRegistered`] if the account has no delivered key
    /// - [`SyncError::KeyFormat`] if the delivered key cannot be decoded
    pub fn ensure_signing_key(&self, id: AccountId) -> SyncResult<()> {
        let lock = self.locks.get(id);
        let _guard = lock.lock();

        let mut account = self.load(id)?;
        self.prepare_signing_key(&mut account)
    }

    /// Fetches and applies the catalog delta for one account.
    ///
    /// An incremental delta is requested when a checkpoint exists and
    /// `force_full_sync` is false; otherwise a full snapshot. The delta and
    /// the new checkpoint are committed in one store transaction, so on
    /// any error the catalog and checkpoint are unchanged.
    pub fn sync(&self, id: AccountId, force_full_sync: bool) -> SyncResult<SyncOutcome> {
        let lock = self.locks.get(id);
        let _guard = lock.lock();
        let _in_flight = self.in_flight.enter(id);

        match self.sync_locked(id, force_full_sync) {
            Ok(outcome) => {
                let mut stats = self.stats.write();
                stats.cycles_completed += 1;
                stats.items_created += outcome.delta.items_created as u64;
                stats.links_created += outcome.delta.links_created as u64;
                stats.links_removed += outcome.delta.links_removed as u64;
                stats.last_sync_time = Some(Utc::now());
                stats.last_error = None;
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(account = %id, error = %err, "sync failed");
                let mut stats = self.stats.write();
                stats.cycles_failed += 1;
                stats.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Syncs every active account in turn.
    ///
    /// A failing account does not stop the others; each result is
    /// returned next to its account ID.
    pub fn sync_all(
        &self,
        force_full_sync: bool,
    ) -> SyncResult<Vec<(AccountId, SyncResult<SyncOutcome>)>> {
        let accounts = self.store.active_accounts()?;
        tracing::info!(accounts = accounts.len(), "syncing all active accounts");

        Ok(accounts
            .into_iter()
            .map(|id| (id, self.sync(id, force_full_sync)))
            .collect())
    }

    fn sync_locked(&self, id: AccountId, force_full_sync: bool) -> SyncResult<SyncOutcome> {
        let start = Instant::now();
        let mut account = self.load(id)?;

        if !AccountState::of(&account).can_start_sync() {
            return Err(SyncError::NotRegistered(id));
        }
        self.prepare_signing_key(&mut account)?;

        let adp_token = account
            .adp_token()
            .ok_or(SyncError::NotRegistered(id))?
            .to_string();
        let requested_full = force_full_sync || account.last_sync().is_none();
        let path = sync_request_path(&self.config.sync_path, account.last_sync(), force_full_sync);

        let timestamp = Utc::now();
        let digest = sign_header(&account, "GET", &path, "", &timestamp)?;

        let request = HttpRequest::get(self.config.sync_url(&path))
            .with_header("Host", self.config.sync_host.as_str())
            .with_header("User-Agent", self.config.user_agent.as_str())
            .with_header(AUTH_TOKEN_HEADER, adp_token)
            .with_header(DIGEST_HEADER, digest);

        tracing::debug!(account = %id, full = requested_full, "requesting catalog delta");
        let response = expect_ok(self.send(&request)?, "Sync Error")?;
        let delta = parse_sync_response(&response.body)?;

        let summary = self.store.transaction(|txn| {
            let summary = apply_delta(txn, id, &delta)?;
            account.advance_checkpoint(delta.checkpoint.as_str());
            txn.save_account(&account)?;
            Ok::<_, SyncError>(summary)
        })?;

        tracing::info!(
            account = %id,
            sync_type = %delta.sync_type,
            added = summary.additions,
            removed = summary.removals,
            checkpoint = %delta.checkpoint,
            "sync applied"
        );

        Ok(SyncOutcome {
            account_id: id,
            requested_full,
            sync_type: delta.sync_type,
            checkpoint: delta.checkpoint,
            delta: summary,
            duration: start.elapsed(),
        })
    }

    fn prepare_signing_key(&self, account: &mut Account) -> SyncResult<()> {
        if account.delivered_key().is_none() {
            return Err(SyncError::NotRegistered(account.id()));
        }
        if convert_account_key(account)? {
            self.store.save_account(account)?;
            tracing::info!(account = %account.id(), "device key converted");
        }
        Ok(())
    }

    fn load(&self, id: AccountId) -> SyncResult<Account> {
        self.store
            .load_account(id)?
            .ok_or(SyncError::AccountNotFound(id))
    }

    fn send(&self, request: &HttpRequest) -> SyncResult<HttpResponse> {
        self.client
            .send(request)
            .map_err(|e| SyncError::transport_retryable(e))
    }
}

impl<S: CatalogStore> SyncEngine<UreqClient, S> {
    /// Creates an engine that talks to the configured service over HTTPS,
    /// using the configured request timeout.
    pub fn connect(config: ClientConfig, store: Arc<S>) -> Self {
        let client = UreqClient::new(config.timeout);
        Self::new(config, client, store)
    }
}

fn expect_ok(response: HttpResponse, context: &str) -> SyncResult<HttpResponse> {
    if response.status == 200 {
        Ok(response)
    } else {
        Err(SyncError::unexpected_status(response.status, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHttpClient;
    use readsync_store::MemoryStore;

    fn engine() -> SyncEngine<MockHttpClient, MemoryStore> {
        SyncEngine::new(
            ClientConfig::default(),
            MockHttpClient::new(),
            Arc::new(MemoryStore::new()),
        )
    }

    #[test]
    fn connect_uses_configured_timeout() {
        let config = ClientConfig::new().with_timeout(Duration::from_secs(3));
        let engine = SyncEngine::connect(config, Arc::new(MemoryStore::new()));
        assert_eq!(engine.config().timeout, Duration::from_secs(3));
    }

    #[test]
    fn account_state_checks() {
        assert!(AccountState::Registered.can_start_sync());
        assert!(AccountState::Ready.can_start_sync());
        assert!(!AccountState::Unregistered.can_start_sync());
        assert!(!AccountState::Syncing.can_start_sync());
        assert!(AccountState::Syncing.is_active());
        assert!(!AccountState::Ready.is_active());
    }

    #[test]
    fn state_follows_account_fields() {
        let mut account = Account::new(AccountId::new(1), "a".repeat(40));
        assert_eq!(AccountState::of(&account), AccountState::Unregistered);

        account.complete_registration("token", "a2V5");
        assert_eq!(AccountState::of(&account), AccountState::Registered);

        account.set_signing_key("pem");
        assert_eq!(AccountState::of(&account), AccountState::Ready);
    }

    #[test]
    fn create_account_keeps_serial() {
        let engine = engine();
        let first = engine.create_account(AccountId::new(1)).unwrap();
        let second = engine.create_account(AccountId::new(1)).unwrap();

        assert_eq!(first.device_serial().len(), 40);
        assert_eq!(first.device_serial(), second.device_serial());
    }

    #[test]
    fn unknown_account_is_reported() {
        let engine = engine();
        let result = engine.sync(AccountId::new(7), false);
        assert!(matches!(result, Err(SyncError::AccountNotFound(_))));
        assert_eq!(engine.stats().cycles_failed, 1);
        assert!(engine.client().requests().is_empty());
    }

    #[test]
    fn unregistered_account_cannot_sync() {
        let engine = engine();
        engine.create_account(AccountId::new(1)).unwrap();

        let result = engine.sync(AccountId::new(1), false);
        assert!(matches!(result, Err(SyncError::NotRegistered(_))));
        assert!(engine.client().requests().is_empty());
        assert_eq!(
            engine.account_state(AccountId::new(1)).unwrap(),
            AccountState::Unregistered
        );
    }

    #[test]
    fn registration_transport_failure_leaves_account_untouched() {
        let engine = engine();
        let id = AccountId::new(1);
        let before = engine.create_account(id).unwrap();
        engine.client().push_failure("connection refused");

        let result = engine.register(id, &Credentials::new("a@example.com", "pw"));
        assert!(matches!(result, Err(SyncError::Transport { retryable: true, .. })));
        assert_eq!(engine.store().load_account(id).unwrap().unwrap(), before);
    }
}
