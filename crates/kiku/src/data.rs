//! Data structures shared between the backend and its clients.
//!
//! [`Session`] and [`Question`] are the persisted documents. Their serde
//! shape is the on-disk format, so field names here are stable. The rest of
//! the module holds the request and response payloads of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::id::{CallerId, QuestionId, SessionId};

/// One voting event: an admin, an open/closed flag and the submitted questions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: SessionId,
    #[serde(rename = "adminUserId")]
    pub admin_id: CallerId,
    pub is_active: bool,
    /// Questions in submission order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Session {
    /// A fresh, active session with no questions.
    pub fn new(admin_id: CallerId) -> Self {
        Self {
            session_id: SessionId::new(),
            admin_id,
            is_active: true,
            questions: Vec::new(),
        }
    }

    pub fn is_admin(&self, caller: &CallerId) -> bool {
        &self.admin_id == caller
    }

    pub fn question_mut(&mut self, question_id: &QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| &q.id == question_id)
    }

    /// Questions ordered by vote count, highest first.
    ///
    /// The sort is stable, so questions with equal votes keep their
    /// submission order.
    pub fn ranked_questions(&self) -> Vec<Question> {
        let mut ranked = self.questions.clone();
        ranked.sort_by(|a, b| b.vote_count().cmp(&a.vote_count()));
        ranked
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            is_active: self.is_active,
            question_count: self.questions.len(),
        }
    }
}

/// A submitted question and the callers who voted for it.
///
/// The vote count is not stored separately in memory, it is the number of
/// voters. It is still written to disk as `votes` so documents stay easy to
/// read, and a document whose `votes` disagrees with its `voters` is refused.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "QuestionDocument", into = "QuestionDocument")]
pub struct Question {
    id: QuestionId,
    text: String,
    voters: Vec<CallerId>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: QuestionId::new(),
            text: text.into(),
            voters: Vec::new(),
        }
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn vote_count(&self) -> u64 {
        self.voters.len() as u64
    }

    /// Voters in the order their votes were cast.
    pub fn voters(&self) -> &[CallerId] {
        &self.voters
    }

    pub fn has_voted(&self, caller: &CallerId) -> bool {
        self.voters.contains(caller)
    }

    /// Records a vote from `caller`. Returns `false` and changes nothing if
    /// the caller already voted on this question.
    pub fn record_vote(&mut self, caller: CallerId) -> bool {
        if self.has_voted(&caller) {
            return false;
        }
        self.voters.push(caller);
        true
    }
}

/// On-disk shape of a [`Question`].
#[derive(Serialize, Deserialize)]
pub struct QuestionDocument {
    id: QuestionId,
    text: String,
    votes: u64,
    #[serde(default)]
    voters: Vec<CallerId>,
}

impl TryFrom<QuestionDocument> for Question {
    type Error = String;

    fn try_from(doc: QuestionDocument) -> Result<Self, Self::Error> {
        if doc.votes != doc.voters.len() as u64 {
            return Err(format!(
                "question {} has {} votes but {} voters",
                doc.id,
                doc.votes,
                doc.voters.len()
            ));
        }
        for (i, voter) in doc.voters.iter().enumerate() {
            if doc.voters[..i].contains(voter) {
                return Err(format!("question {} lists a voter twice", doc.id));
            }
        }
        Ok(Self {
            id: doc.id,
            text: doc.text,
            voters: doc.voters,
        })
    }
}

impl From<Question> for QuestionDocument {
    fn from(question: Question) -> Self {
        Self {
            votes: question.vote_count(),
            id: question.id,
            text: question.text,
            voters: question.voters,
        }
    }
}

/// Response to session creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: SessionId,
    pub admin_id: CallerId,
}

/// Public view of a session, without voters or the admin identity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub is_active: bool,
    pub question_count: usize,
}

/// Request body for submitting a question.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmitQuestion {
    pub text: String,
}

/// A question as sent to clients. Voter identities are other callers'
/// tokens and never leave the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub votes: u64,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            text: question.text.clone(),
            votes: question.vote_count(),
        }
    }
}

/// Response to the admin check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheck {
    pub is_admin: bool,
}

/// Body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UptimeInfo {
    pub seconds: i64,
    pub human: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServiceInfo {
    /// `"up"` or `"down"`, from the store's own health check.
    pub storage: String,
    /// Sessions with an operation in flight right now.
    pub busy_sessions: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub started_at: String,
    pub uptime: UptimeInfo,
    pub services: ServiceInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question_with_votes(text: &str, votes: usize) -> Question {
        let mut question = Question::new(text);
        for _ in 0..votes {
            assert!(question.record_vote(CallerId::new()));
        }
        question
    }

    #[test]
    fn record_vote_rejects_repeat_voter() {
        let mut question = Question::new("What time?");
        let caller = CallerId::from("u1");

        assert!(question.record_vote(caller.clone()));
        assert!(!question.record_vote(caller.clone()));
        assert_eq!(question.vote_count(), 1);
        assert_eq!(question.voters(), &[caller]);
    }

    #[test]
    fn ranked_questions_is_stable_on_ties() {
        let mut session = Session::new("admin".into());
        session.questions.push(question_with_votes("A", 1));
        session.questions.push(question_with_votes("B", 2));
        session.questions.push(question_with_votes("C", 2));

        let ranked = session.ranked_questions();
        let order: Vec<&str> = ranked.iter().map(Question::text).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        // Stored order is untouched.
        assert_eq!(session.questions[0].text(), "A");
    }

    #[test]
    fn session_document_uses_stable_field_names() {
        let mut session = Session::new("admin-1".into());
        let mut question = Question::new("Why?");
        question.record_vote("u1".into());
        session.questions.push(question.clone());

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(
            value,
            json!({
                "sessionId": session.session_id.as_str(),
                "adminUserId": "admin-1",
                "isActive": true,
                "questions": [{
                    "id": question.id().as_str(),
                    "text": "Why?",
                    "votes": 1,
                    "voters": ["u1"],
                }],
            })
        );

        let back: Session = serde_json::from_value(value).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn mismatched_vote_count_is_rejected() {
        let doc = json!({ "id": "q1", "text": "Why?", "votes": 3, "voters": ["u1"] });
        let err = serde_json::from_value::<Question>(doc).unwrap_err();
        assert!(err.to_string().contains("3 votes but 1 voters"));
    }

    #[test]
    fn duplicate_voters_are_rejected() {
        let doc = json!({ "id": "q1", "text": "Why?", "votes": 2, "voters": ["u1", "u1"] });
        let err = serde_json::from_value::<Question>(doc).unwrap_err();
        assert!(err.to_string().contains("lists a voter twice"));
        assert!(!err.to_string().contains("u1"));
    }

    #[test]
    fn question_view_hides_voters() {
        let question = question_with_votes("Hidden?", 2);
        let value = serde_json::to_value(QuestionView::from(&question)).unwrap();
        assert_eq!(value["votes"], 2);
        assert!(value.get("voters").is_none());
    }

    #[test]
    fn payloads_use_camel_case() {
        let created = CreatedSession {
            session_id: "s1".into(),
            admin_id: "a1".into(),
        };
        assert_eq!(
            serde_json::to_value(created).unwrap(),
            json!({ "sessionId": "s1", "adminId": "a1" })
        );
        assert_eq!(
            serde_json::to_value(AdminCheck { is_admin: true }).unwrap(),
            json!({ "isAdmin": true })
        );
    }
}
