use std::sync::Arc;

use async_trait::async_trait;

use kiku::data::{CreatedSession, Question, Session, SessionSummary};
use kiku::errors::{SessionError, StoreError};
use kiku::id::{CallerId, QuestionId, SessionId};
use kiku::log;

use super::SessionLocks;
use crate::store::SessionStore;

/// How many fresh ids `create` tries before giving up on a collision.
const CREATE_ATTEMPTS: usize = 5;

/// The operations of a question voting session.
///
/// Every method is one read-modify-write cycle on a single session. Callers
/// are identified by an opaque [`CallerId`]; the only things ever done with
/// it are equality checks for admin rights and for the one-vote rule.
#[async_trait]
pub trait SessionService {
    /// The error type returned by operations on this service.
    type Error;

    /// Creates a new, active session administered by `caller`.
    async fn create(&self, caller: &CallerId) -> Result<CreatedSession, Self::Error>;

    /// Returns the public summary of a session.
    ///
    /// # Errors
    ///
    /// Returns an error if no session exists with the given ID.
    async fn get(&self, session_id: &SessionId) -> Result<SessionSummary, Self::Error>;

    /// Returns the questions of a session, most votes first.
    ///
    /// Questions with the same number of votes stay in submission order.
    ///
    /// # Errors
    ///
    /// Returns an error if no session exists with the given ID.
    async fn list_questions(&self, session_id: &SessionId) -> Result<Vec<Question>, Self::Error>;

    /// Adds a question with no votes to an active session.
    ///
    /// The caller is not recorded as the author.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty or only whitespace, if the
    /// session doesn't exist, or if it is closed. Accepted text is stored
    /// exactly as given.
    async fn submit_question(
        &self,
        session_id: &SessionId,
        caller: &CallerId,
        text: &str,
    ) -> Result<Question, Self::Error>;

    /// Records `caller`'s vote on a question and returns the updated question.
    ///
    /// A second vote from the same caller on the same question is an error,
    /// not a no-op, and leaves the question unchanged.
    async fn vote(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        caller: &CallerId,
    ) -> Result<Question, Self::Error>;

    /// Stops a session from taking new questions and votes while keeping
    /// its questions readable. Only the admin may do this; closing a closed
    /// session succeeds.
    async fn close(
        &self,
        session_id: &SessionId,
        caller: &CallerId,
    ) -> Result<SessionSummary, Self::Error>;

    /// Ends a session and removes it completely.
    ///
    /// Only the admin may do this. Ending a session that doesn't exist
    /// succeeds, so clients can safely retry.
    async fn end(&self, session_id: &SessionId, caller: &CallerId) -> Result<(), Self::Error>;

    /// Whether `caller` administers the session. A session that doesn't
    /// exist has no admin, so this is `false` rather than an error.
    async fn is_admin(&self, session_id: &SessionId, caller: &CallerId)
    -> Result<bool, Self::Error>;
}

/// A `SessionService` on top of any [`SessionStore`].
///
/// Each operation takes the session's lock from [`SessionLocks`] before
/// loading and keeps it until the changed document is saved, so two votes
/// arriving at once can't both read the same count and write back the same
/// result. Nothing is retried: a failed load or save ends the operation
/// and nothing partial is written.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use kiku::id::CallerId;
/// use kiku_backend::services::{SessionService, StoredSessionService};
/// use kiku_backend::store::InMemorySessionStore;
///
/// #[tokio::main]
/// async fn main() {
///     let service = StoredSessionService::new(Arc::new(InMemorySessionStore::new()));
///     let admin = CallerId::new();
///
///     let created = service.create(&admin).await.unwrap();
///     let question = service
///         .submit_question(&created.session_id, &CallerId::new(), "What time?")
///         .await
///         .unwrap();
///     let voted = service
///         .vote(&created.session_id, question.id(), &CallerId::new())
///         .await
///         .unwrap();
///     assert_eq!(voted.vote_count(), 1);
///
///     service.end(&created.session_id, &admin).await.unwrap();
///     assert!(service.list_questions(&created.session_id).await.is_err());
/// }
/// ```
#[derive(Clone)]
pub struct StoredSessionService {
    store: Arc<dyn SessionStore>,
    locks: Arc<SessionLocks>,
}

impl StoredSessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            locks: Arc::new(SessionLocks::new()),
        }
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn locks(&self) -> &SessionLocks {
        &self.locks
    }

    /// Loads a session, treating a missing document as `None`.
    async fn load_optional(&self, session_id: &SessionId) -> Result<Option<Session>, SessionError> {
        match self.store.load(session_id).await {
            Ok(session) => Ok(Some(session)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(self.storage_failure(session_id, e)),
        }
    }

    async fn load(&self, session_id: &SessionId) -> Result<Session, SessionError> {
        self.store
            .load(session_id)
            .await
            .map_err(|e| self.storage_failure(session_id, e))
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        self.store
            .save(session)
            .await
            .map_err(|e| self.storage_failure(&session.session_id, e))
    }

    fn storage_failure(&self, session_id: &SessionId, err: StoreError) -> SessionError {
        if !matches!(err, StoreError::NotFound(_)) {
            log::error!(
                "{} store failed for session {}: {}",
                self.store.backend(),
                session_id,
                err
            );
        }
        err.into()
    }
}

fn validate_question_text(text: &str) -> Result<(), SessionError> {
    if text.trim().is_empty() {
        return Err(SessionError::Validation(
            "question text must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ensure_active(session: &Session) -> Result<(), SessionError> {
    if session.is_active {
        Ok(())
    } else {
        Err(SessionError::SessionClosed)
    }
}

#[async_trait]
impl SessionService for StoredSessionService {
    type Error = SessionError;

    async fn create(&self, caller: &CallerId) -> Result<CreatedSession, Self::Error> {
        let mut last_id = None;
        for _ in 0..CREATE_ATTEMPTS {
            let session = Session::new(caller.clone());
            let _guard = self.locks.lock(&session.session_id).await;

            // Ids are random, a restart could hand out one that is already on disk.
            if self.load_optional(&session.session_id).await?.is_some() {
                log::warn!("Generated session id {} is taken", session.session_id);
                last_id = Some(session.session_id);
                continue;
            }

            self.save(&session).await?;
            log::info!("Session {} created", session.session_id);
            return Ok(CreatedSession {
                session_id: session.session_id,
                admin_id: session.admin_id,
            });
        }

        Err(SessionError::Storage(StoreError::Conflict(
            last_id.unwrap_or_default(),
        )))
    }

    async fn get(&self, session_id: &SessionId) -> Result<SessionSummary, Self::Error> {
        let _guard = self.locks.lock(session_id).await;
        Ok(self.load(session_id).await?.summary())
    }

    async fn list_questions(&self, session_id: &SessionId) -> Result<Vec<Question>, Self::Error> {
        let _guard = self.locks.lock(session_id).await;
        Ok(self.load(session_id).await?.ranked_questions())
    }

    async fn submit_question(
        &self,
        session_id: &SessionId,
        _caller: &CallerId,
        text: &str,
    ) -> Result<Question, Self::Error> {
        validate_question_text(text)?;

        let _guard = self.locks.lock(session_id).await;
        let mut session = self.load(session_id).await?;
        ensure_active(&session)?;

        let question = Question::new(text);
        session.questions.push(question.clone());
        self.save(&session).await?;

        log::debug!("Question {} submitted to session {}", question.id(), session_id);
        Ok(question)
    }

    async fn vote(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        caller: &CallerId,
    ) -> Result<Question, Self::Error> {
        let _guard = self.locks.lock(session_id).await;
        let mut session = self.load(session_id).await?;
        ensure_active(&session)?;

        let question = session
            .question_mut(question_id)
            .ok_or_else(|| SessionError::QuestionNotFound(question_id.clone()))?;
        if !question.record_vote(caller.clone()) {
            log::debug!(
                "Rejected repeat vote on question {} in session {}",
                question_id,
                session_id
            );
            return Err(SessionError::AlreadyVoted);
        }
        let question = question.clone();

        self.save(&session).await?;
        log::debug!(
            "Vote on question {} in session {}, now {}",
            question_id,
            session_id,
            question.vote_count()
        );
        Ok(question)
    }

    async fn close(
        &self,
        session_id: &SessionId,
        caller: &CallerId,
    ) -> Result<SessionSummary, Self::Error> {
        let _guard = self.locks.lock(session_id).await;
        let mut session = self.load(session_id).await?;
        if !session.is_admin(caller) {
            log::warn!("Non-admin tried to close session {}", session_id);
            return Err(SessionError::Unauthorized);
        }

        if session.is_active {
            session.is_active = false;
            self.save(&session).await?;
            log::info!("Session {} closed", session_id);
        }
        Ok(session.summary())
    }

    async fn end(&self, session_id: &SessionId, caller: &CallerId) -> Result<(), Self::Error> {
        let _guard = self.locks.lock(session_id).await;
        let Some(session) = self.load_optional(session_id).await? else {
            log::debug!("Session {} already ended", session_id);
            return Ok(());
        };
        if !session.is_admin(caller) {
            log::warn!("Non-admin tried to end session {}", session_id);
            return Err(SessionError::Unauthorized);
        }

        self.store
            .delete(session_id)
            .await
            .map_err(|e| self.storage_failure(session_id, e))?;
        log::info!("Session {} ended", session_id);
        Ok(())
    }

    async fn is_admin(
        &self,
        session_id: &SessionId,
        caller: &CallerId,
    ) -> Result<bool, Self::Error> {
        let _guard = self.locks.lock(session_id).await;
        Ok(self
            .load_optional(session_id)
            .await?
            .is_some_and(|session| session.is_admin(caller)))
    }
}
