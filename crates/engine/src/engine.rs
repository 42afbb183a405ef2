//! The matching engine: orchestrates the three stores and enforces every
//! state transition.
//!
//! All operations are synchronous and mutate at most one logical step of
//! state; callers serialize them behind a single lock (see the transport).
//! Rejections come back as [`Reject`] values, successes as the list of
//! notifications to deliver.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use liaison_common::{AdminId, UserId};

use crate::{
    directory::SessionDirectory,
    effect::{Effect, Recipient},
    error::Reject,
    pool::AdminAvailabilityPool,
    queue::{PendingQuestion, QuestionQueue},
};

/// Display cap for the question fragment echoed back in an answer. Applied
/// only to the echo, never to text relayed to the original asker.
const ANSWER_ECHO_MAX_CHARS: usize = 50;

const USER_STARTED_CHAT: &str =
    "You started a chat with an administrator. Please ask your question and wait for the reply.";
const USER_CONNECTED: &str =
    "You are connected to a chat with an administrator. What would you like to ask?";
const USER_CHAT_ENDED: &str = "The chat with the administrator has ended.";
const ASK_PROMPT: &str = "Ask your question:";
const QUESTION_SAVED: &str = "Your question has been saved, expect an answer.";
const UNKNOWN_COMMAND: &str = "Unknown command.";
const ADMIN_WAITING: &str =
    "Waiting for questions from users. Send '/leave' if you want to stop.";
const ADMIN_LEFT_POOL: &str = "You left chat waiting mode.";
const NEXT_QUESTION_HINT: &str = "Send '/done' when you are ready for the next question.";

/// Commands a user can issue (parsed by the transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    StartChat,
    AskQuestion,
    Info,
    Library,
}

/// Commands an admin can issue (parsed by the transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    RequestChat,
    CheckQuestions,
}

/// Conceptual state of a user, derived from the stores on demand. Never
/// duplicated in separate flags, so it cannot drift out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    Idle,
    WaitingForAdmin,
    InChatWithAdmin(AdminId),
    SubmittingQuestion,
    QuestionQueued,
}

/// Conceptual state of an admin, derived from the stores on demand.
///
/// `ReadingQuestion` shadows `InChatWithUser` in text dispatch: an admin
/// with a checked-out question is answering it, even mid-chat.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminState {
    Idle,
    AvailableForChat,
    InChatWithUser(UserId),
    ReadingQuestion(PendingQuestion),
}

/// Tunable engine behavior, supplied by the configuration layer.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Present the next queued question immediately after every answer,
    /// instead of waiting for an explicit `/done`.
    pub auto_advance_on_answer: bool,
    /// Static reply to the Info command.
    pub info_text: String,
    /// Static reply to the Library command.
    pub library_text: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_advance_on_answer: false,
            info_text: "We are the reading-room support team.".into(),
            library_text: "Our library: midashall.notion.site".into(),
        }
    }
}

/// The session-matching and question-queue state machine.
///
/// Owns the three stores plus the two transient per-participant markers
/// (question submitters, checked-out questions). All state lives here;
/// nothing is persisted.
#[derive(Debug, Default)]
pub struct MatchingEngine {
    config: EngineConfig,
    questions: QuestionQueue,
    pool: AdminAvailabilityPool,
    directory: SessionDirectory,
    /// At most one checked-out question per admin. The question stays in the
    /// queue until answered or discarded; checkout is advisory.
    reading: HashMap<AdminId, PendingQuestion>,
    /// Users whose next free-text message becomes a queued question.
    submitting: HashSet<UserId>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // ── Derived states ───────────────────────────────────────────────────

    pub fn user_state(&self, user: UserId) -> UserState {
        if let Some(admin) = self.directory.admin_for(user) {
            return UserState::InChatWithAdmin(admin);
        }
        if self.directory.is_waiting(user) {
            return UserState::WaitingForAdmin;
        }
        if self.submitting.contains(&user) {
            return UserState::SubmittingQuestion;
        }
        if self.questions.has_question_from(user) {
            return UserState::QuestionQueued;
        }
        UserState::Idle
    }

    pub fn admin_state(&self, admin: AdminId) -> AdminState {
        if let Some(q) = self.reading.get(&admin) {
            return AdminState::ReadingQuestion(q.clone());
        }
        if let Some(user) = self.directory.user_for(admin) {
            return AdminState::InChatWithUser(user);
        }
        if self.pool.contains(admin) {
            return AdminState::AvailableForChat;
        }
        AdminState::Idle
    }

    // ── Core operations ──────────────────────────────────────────────────

    /// A user asks to be paired with an admin for a live chat.
    pub fn user_requests_chat(&mut self, user: UserId) -> Result<Vec<Effect>, Reject> {
        if self.directory.has_entry(user) {
            return Err(Reject::AlreadyConnected);
        }
        match self.pool.peek_next() {
            Some(admin) => {
                self.directory.pair_user_with_admin(user, admin)?;
                self.pool.mark_unavailable(admin);
                debug!(%user, %admin, "paired user with pooled admin");
                Ok(vec![
                    Effect::to_admin(admin, admin_connected_text(user)),
                    Effect::to_user(user, USER_STARTED_CHAT),
                ])
            },
            None => {
                self.directory.queue_user(user)?;
                let position = self
                    .directory
                    .waiting_position(user)
                    .unwrap_or_else(|| self.directory.waiting_count());
                debug!(%user, position, "no admin available, user queued");
                Ok(vec![Effect::to_user(user, queue_position_text(position))])
            },
        }
    }

    /// A user starts submitting an asynchronous question; their next
    /// free-text message is captured as its text.
    pub fn user_begins_question(&mut self, user: UserId) -> Result<Vec<Effect>, Reject> {
        if self.directory.has_entry(user) {
            return Err(Reject::AlreadyConnected);
        }
        self.submitting.insert(user);
        Ok(vec![Effect::to_user(user, ASK_PROMPT)])
    }

    /// An admin opts in for live chats: take the earliest waiting user, or
    /// join the availability pool.
    pub fn admin_requests_chat(&mut self, admin: AdminId) -> Result<Vec<Effect>, Reject> {
        if self.directory.user_for(admin).is_some() {
            return Err(Reject::AdminBusy);
        }
        match self.directory.first_waiting() {
            Some(user) => {
                self.directory.assign_waiting_user_to_admin(user, admin)?;
                self.pool.mark_unavailable(admin);
                debug!(%admin, %user, "admin picked up waiting user");
                Ok(vec![
                    Effect::to_admin(admin, admin_connected_text(user)),
                    Effect::to_user(user, USER_CONNECTED),
                ])
            },
            None => {
                self.pool.mark_available(admin);
                debug!(%admin, "admin added to availability pool");
                Ok(vec![Effect::to_admin(admin, ADMIN_WAITING)])
            },
        }
    }

    /// An admin closes their active chat. The admin is immediately re-offered
    /// the next waiting user, or put back in the pool — never left idle.
    pub fn admin_ends_chat(&mut self, admin: AdminId) -> Result<Vec<Effect>, Reject> {
        let Some(user) = self.directory.user_for(admin) else {
            return Err(Reject::NotInChat);
        };
        self.directory.end_session(user)?;
        debug!(%admin, %user, "chat session ended by admin");
        let mut effects = vec![
            Effect::to_admin(admin, chat_finished_text(user)),
            Effect::to_user(user, USER_CHAT_ENDED),
        ];
        effects.extend(self.admin_requests_chat(admin)?);
        Ok(effects)
    }

    /// An admin leaves the availability pool.
    pub fn admin_leaves_pool(&mut self, admin: AdminId) -> Result<Vec<Effect>, Reject> {
        if !self.pool.contains(admin) {
            return Err(Reject::NotInPool);
        }
        self.pool.mark_unavailable(admin);
        Ok(vec![Effect::to_admin(admin, ADMIN_LEFT_POOL)])
    }

    /// An admin asks for the oldest pending question.
    ///
    /// Re-entry with a question already checked out presents the same
    /// snapshot again — it never advances past an unanswered question.
    pub fn admin_checks_questions(&mut self, admin: AdminId) -> Result<Vec<Effect>, Reject> {
        if let Some(q) = self.reading.get(&admin) {
            return Ok(present_question(admin, q));
        }
        match self.questions.peek_first().cloned() {
            Some(q) => {
                debug!(%admin, question = %q.id, "question checked out");
                let effects = present_question(admin, &q);
                self.reading.insert(admin, q);
                Ok(effects)
            },
            None => Err(Reject::NothingQueued),
        }
    }

    /// `/done`: discard the checked-out question without answering it, then
    /// advance to the next one.
    pub fn admin_finishes_question(&mut self, admin: AdminId) -> Result<Vec<Effect>, Reject> {
        let Some(q) = self.reading.remove(&admin) else {
            return self.admin_checks_questions(admin);
        };
        self.questions.remove(q.id);
        debug!(%admin, question = %q.id, "question discarded without answer");
        match self.admin_checks_questions(admin) {
            Ok(effects) => Ok(effects),
            Err(reject) => Ok(vec![Effect::to_admin(admin, reject.to_string())]),
        }
    }

    /// Free text from a user: relay to their admin, capture as a question,
    /// or drop with an "unknown command" notice. Never rejects.
    pub fn user_sends_text(&mut self, user: UserId, username: &str, text: &str) -> Vec<Effect> {
        match self.user_state(user) {
            UserState::InChatWithAdmin(admin) => {
                vec![Effect::to_admin(admin, relayed_from_user(username, text))]
            },
            UserState::SubmittingQuestion => {
                let id = self.questions.enqueue(user, username, text);
                self.submitting.remove(&user);
                debug!(%user, question = %id, "question enqueued");
                vec![Effect::to_user(user, QUESTION_SAVED)]
            },
            // Deliberately dropped: arbitrary chatter is neither queued nor
            // relayed, and waiting users hear the same thing as idle ones.
            _ => vec![Effect::to_user(user, UNKNOWN_COMMAND)],
        }
    }

    /// Free text from an admin, after command words were ruled out: answer
    /// the checked-out question, or relay verbatim into the active chat.
    pub fn admin_sends_text(&mut self, admin: AdminId, text: &str) -> Result<Vec<Effect>, Reject> {
        if let Some(q) = self.reading.remove(&admin) {
            // Speculative removal — the contract tolerates an id that is
            // already gone.
            self.questions.remove(q.id);
            debug!(%admin, question = %q.id, asker = %q.user_id, "question answered");
            let mut effects = vec![
                Effect::to_user(q.user_id, answer_text(&q.text, text)),
                Effect::to_admin(admin, answer_sent_text(&q.username)),
            ];
            if self.config.auto_advance_on_answer {
                match self.admin_checks_questions(admin) {
                    Ok(more) => effects.extend(more),
                    Err(reject) => effects.push(Effect::to_admin(admin, reject.to_string())),
                }
            }
            return Ok(effects);
        }
        if let Some(user) = self.directory.user_for(admin) {
            return Ok(vec![Effect::to_user(user, text.to_string())]);
        }
        Err(Reject::NotInChat)
    }

    // ── Total dispatch surface for the transport ─────────────────────────

    /// Dispatch a parsed user command. Rejections become a notification to
    /// the sender, so the result is always deliverable.
    pub fn on_user_command(&mut self, user: UserId, command: UserCommand) -> Vec<Effect> {
        match command {
            UserCommand::StartChat => {
                into_effects(Recipient::User(user), self.user_requests_chat(user))
            },
            UserCommand::AskQuestion => {
                into_effects(Recipient::User(user), self.user_begins_question(user))
            },
            UserCommand::Info => vec![Effect::to_user(user, self.config.info_text.clone())],
            UserCommand::Library => vec![Effect::to_user(user, self.config.library_text.clone())],
        }
    }

    /// Dispatch free text from a user.
    pub fn on_user_text(&mut self, user: UserId, username: &str, text: &str) -> Vec<Effect> {
        self.user_sends_text(user, username, text)
    }

    /// Dispatch a parsed admin command.
    pub fn on_admin_command(&mut self, admin: AdminId, command: AdminCommand) -> Vec<Effect> {
        let outcome = match command {
            AdminCommand::RequestChat => self.admin_requests_chat(admin),
            AdminCommand::CheckQuestions => self.admin_checks_questions(admin),
        };
        into_effects(Recipient::Admin(admin), outcome)
    }

    /// Dispatch admin text. Command words are matched by exact literal
    /// before any state dispatch, so an answer merely *containing* "/end"
    /// is still just an answer.
    pub fn on_admin_text(&mut self, admin: AdminId, text: &str) -> Vec<Effect> {
        let outcome = match text {
            "/end" => self.admin_ends_chat(admin),
            "/leave" => self.admin_leaves_pool(admin),
            "/done" => self.admin_finishes_question(admin),
            _ => self.admin_sends_text(admin, text),
        };
        into_effects(Recipient::Admin(admin), outcome)
    }
}

fn into_effects(sender: Recipient, outcome: Result<Vec<Effect>, Reject>) -> Vec<Effect> {
    match outcome {
        Ok(effects) => effects,
        Err(reject) => vec![Effect {
            recipient: sender,
            text: reject.to_string(),
        }],
    }
}

fn present_question(admin: AdminId, q: &PendingQuestion) -> Vec<Effect> {
    vec![
        Effect::to_admin(admin, NEXT_QUESTION_HINT),
        Effect::to_admin(admin, format!("Question from {}:\n{}", q.username, q.text)),
    ]
}

fn admin_connected_text(user: UserId) -> String {
    format!("You are connected to a chat with user {user}. Send '/end' to finish.")
}

fn chat_finished_text(user: UserId) -> String {
    format!("Chat with {user} finished.")
}

fn queue_position_text(position: usize) -> String {
    format!("Please wait, you are number {position} in the queue.")
}

fn relayed_from_user(username: &str, text: &str) -> String {
    format!("Message from {username}:\n{text}")
}

fn answer_text(question: &str, answer: &str) -> String {
    format!("Answer to your question '{}':\n{answer}", shorten(question))
}

fn answer_sent_text(username: &str) -> String {
    format!("Your answer has been sent to {username}.")
}

/// Cap a question fragment for display, ellipsis included in the budget.
fn shorten(text: &str) -> String {
    if text.chars().count() <= ANSWER_ECHO_MAX_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(ANSWER_ECHO_MAX_CHARS - 3).collect();
    format!("{cut}...")
}
