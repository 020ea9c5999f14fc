//! Per-target deployment lock.
//!
//! The lock is the single row of the ledger lock table. Acquisition is a
//! conditional update, so two sessions racing for the row cannot both win.
//! A held [`Lock`] is the proof token ledger mutations ask for.
//!
//! Re-entrant acquisitions by one service share their token state: the
//! first release of any of them frees the row and invalidates them all.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use oxide_change::Dialect;
use tracing::{debug, info, warn};

use crate::context::DeployContext;
use crate::error::{DeployError, Result};
use crate::cleanup::is_already_absent;
use crate::ledger::Ledger;
use crate::target::Target;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies the process and session holding a lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from a fixed value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an id unique to this process and call.
    #[must_use]
    pub fn generate() -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let counter = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("pid{}-{nanos:x}-{counter}", std::process::id()))
    }

    /// Returns the id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A held lock on one target.
#[derive(Debug)]
pub struct Lock {
    target: String,
    session: SessionId,
    granted_at: DateTime<Utc>,
    released: Arc<AtomicBool>,
}

impl Lock {
    /// Returns the target name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the holding session.
    #[must_use]
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Returns when the lock was granted.
    #[must_use]
    pub fn granted_at(&self) -> DateTime<Utc> {
        self.granted_at
    }

    /// Returns false once the lock was released.
    #[must_use]
    pub fn is_held(&self) -> bool {
        !self.released.load(Ordering::Acquire)
    }
}

/// The lock row as currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    /// Whether the row is held.
    pub locked: bool,
    /// When it was granted, as stored.
    pub granted_at: Option<String>,
    /// Session holding it.
    pub locked_by: Option<String>,
}

impl LockStatus {
    /// Returns the holder for messages, `unknown` when not recorded.
    #[must_use]
    pub fn holder(&self) -> &str {
        self.locked_by.as_deref().unwrap_or("unknown")
    }
}

/// Acquires and releases the lock of one target.
#[derive(Debug, Clone)]
pub struct LockService {
    target: Target,
    ledger: Ledger,
    session: SessionId,
    timeout: Duration,
    poll_interval: Duration,
    current: Arc<Mutex<Option<Arc<AtomicBool>>>>,
}

impl LockService {
    /// Creates a service with a fresh session id.
    #[must_use]
    pub fn new(ctx: &DeployContext, target: &Target) -> Self {
        Self::with_session(ctx, target, SessionId::generate())
    }

    /// Creates a service acting as the given session.
    #[must_use]
    pub fn with_session(ctx: &DeployContext, target: &Target, session: SessionId) -> Self {
        Self {
            target: target.clone(),
            ledger: Ledger::for_target(ctx, target),
            session,
            timeout: ctx.config.lock_timeout(),
            poll_interval: ctx.config.lock_poll(),
            current: Arc::default(),
        }
    }

    /// Overrides the acquisition timeout and poll interval.
    #[must_use]
    pub fn with_timing(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Returns this service's session.
    #[must_use]
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    fn dialect(&self) -> &Dialect {
        self.target.dialect()
    }

    /// Returns the state shared with this service's live token, or a fresh
    /// one if none is live.
    fn token_state(&self) -> Arc<AtomicBool> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some(released) if !released.load(Ordering::Acquire) => Arc::clone(released),
            _ => {
                let released = Arc::new(AtomicBool::new(false));
                *current = Some(Arc::clone(&released));
                released
            }
        }
    }

    fn table(&self) -> String {
        self.ledger.lock_table().escaped(self.dialect())
    }

    /// Creates the lock table and row if needed.
    ///
    /// # Errors
    ///
    /// Returns a database error if creation fails.
    pub async fn init(&self) -> Result<()> {
        let mut conn = self.target.pool().acquire().await?;
        self.ledger.init_lock(&mut conn).await
    }

    /// Makes one attempt at the lock.
    ///
    /// Succeeds without blocking if this session already holds it.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails.
    pub async fn try_acquire(&self) -> Result<Option<Lock>> {
        let granted_at = Utc::now();
        let sql = format!(
            "UPDATE {} SET locked = {}, lock_granted = ?, locked_by = ? \
             WHERE id = 1 AND (locked = {} OR locked_by = ?)",
            self.table(),
            self.dialect().boolean_literal(true),
            self.dialect().boolean_literal(false),
        );
        let result = sqlx::query(&sql)
            .bind(granted_at.to_rfc3339())
            .bind(self.session.as_str())
            .bind(self.session.as_str())
            .execute(self.target.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(Lock {
            target: self.target.name().to_string(),
            session: self.session.clone(),
            granted_at,
            released: self.token_state(),
        }))
    }

    /// Waits for the lock, polling until the timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::LockTimeout`] naming the holder if the lock is
    /// still held when the timeout elapses.
    pub async fn acquire(&self) -> Result<Lock> {
        let started = Instant::now();
        loop {
            if let Some(lock) = self.try_acquire().await? {
                info!(target_name = %self.target.name(), session = %self.session, "Lock acquired");
                return Ok(lock);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                let status = self.status().await?;
                return Err(DeployError::LockTimeout {
                    target: self.target.name().to_string(),
                    waited_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    holder: status.holder().to_string(),
                });
            }

            debug!(target_name = %self.target.name(), "Waiting for lock");
            tokio::time::sleep(self.poll_interval.min(self.timeout - elapsed)).await;
        }
    }

    /// Releases a lock. Releasing twice is a no-op, and so is releasing
    /// after the lock table was dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::LockNotHeld`] for a lock of another target, or
    /// a database error if the update fails.
    pub async fn release(&self, lock: &Lock) -> Result<()> {
        if lock.target != self.target.name() {
            return Err(DeployError::LockNotHeld {
                target: lock.target.clone(),
            });
        }
        if lock.released.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let sql = format!(
            "UPDATE {} SET locked = {}, lock_granted = NULL, locked_by = NULL \
             WHERE id = 1 AND locked_by = ?",
            self.table(),
            self.dialect().boolean_literal(false),
        );
        let result = match sqlx::query(&sql)
            .bind(lock.session.as_str())
            .execute(self.target.pool())
            .await
        {
            Ok(result) => result,
            Err(e) if is_already_absent(&e) => {
                debug!(target_name = %self.target.name(), "Lock table gone, nothing to release");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        if result.rows_affected() == 0 {
            warn!(target_name = %self.target.name(), session = %lock.session, "Lock was no longer held");
        } else {
            info!(target_name = %self.target.name(), "Lock released");
        }
        Ok(())
    }

    /// Clears the lock whoever holds it.
    ///
    /// # Errors
    ///
    /// Returns a database error if the update fails.
    pub async fn force_release(&self) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET locked = {}, lock_granted = NULL, locked_by = NULL WHERE id = 1",
            self.table(),
            self.dialect().boolean_literal(false),
        );
        sqlx::query(&sql).execute(self.target.pool()).await?;
        warn!(target_name = %self.target.name(), "Lock forcibly released");
        Ok(())
    }

    /// Reads the lock row without taking the lock.
    ///
    /// # Errors
    ///
    /// Returns a database error if the lock table cannot be read.
    pub async fn status(&self) -> Result<LockStatus> {
        let sql = format!(
            "SELECT locked, lock_granted, locked_by FROM {} WHERE id = 1",
            self.table()
        );
        let row: Option<(bool, Option<String>, Option<String>)> = sqlx::query_as(&sql)
            .fetch_optional(self.target.pool())
            .await?;
        Ok(row.map_or(
            LockStatus {
                locked: false,
                granted_at: None,
                locked_by: None,
            },
            |(locked, granted_at, locked_by)| LockStatus {
                locked,
                granted_at,
                locked_by,
            },
        ))
    }
}
