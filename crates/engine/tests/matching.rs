//! End-to-end scenarios driven through the engine's dispatch surface.

use {
    liaison_common::{AdminId, UserId},
    liaison_engine::{
        AdminCommand, AdminState, EngineConfig, MatchingEngine, Recipient, UserCommand, UserState,
    },
    rstest::rstest,
};

const ADMIN: AdminId = AdminId(938510955);

fn engine(auto_advance: bool) -> MatchingEngine {
    MatchingEngine::new(EngineConfig {
        auto_advance_on_answer: auto_advance,
        ..EngineConfig::default()
    })
}

/// Three users queue in order; one admin request pairs with the first.
#[test]
fn waiting_users_are_matched_fifo() {
    let mut eng = engine(false);
    for id in [1, 2, 3] {
        let effects = eng.on_user_command(UserId(id), UserCommand::StartChat);
        assert!(
            effects[0].text.contains(&format!("number {id} in the queue")),
            "user {id} should learn their queue position: {}",
            effects[0].text
        );
    }

    eng.on_admin_command(ADMIN, AdminCommand::RequestChat);
    assert_eq!(eng.admin_state(ADMIN), AdminState::InChatWithUser(UserId(1)));
    assert_eq!(eng.user_state(UserId(2)), UserState::WaitingForAdmin);
    assert_eq!(eng.user_state(UserId(3)), UserState::WaitingForAdmin);
}

/// No two active sessions ever share a user or an admin, whatever the order
/// of chat requests.
#[test]
fn sessions_stay_bijective() {
    let mut eng = engine(false);
    let admins = [AdminId(10), AdminId(11), AdminId(12)];
    let users = [UserId(1), UserId(2), UserId(3), UserId(4), UserId(5)];

    eng.on_admin_command(admins[0], AdminCommand::RequestChat);
    eng.on_user_command(users[0], UserCommand::StartChat);
    eng.on_user_command(users[1], UserCommand::StartChat);
    eng.on_admin_command(admins[1], AdminCommand::RequestChat);
    eng.on_admin_command(admins[2], AdminCommand::RequestChat);
    eng.on_user_command(users[2], UserCommand::StartChat);
    eng.on_user_command(users[3], UserCommand::StartChat);
    eng.on_user_command(users[4], UserCommand::StartChat);

    let mut seen_admins = Vec::new();
    let mut paired_users = 0;
    for user in users {
        if let UserState::InChatWithAdmin(admin) = eng.user_state(user) {
            assert!(
                !seen_admins.contains(&admin),
                "admin {admin} serves two users at once"
            );
            seen_admins.push(admin);
            paired_users += 1;
        }
    }
    // Three admins, five users: exactly three pairs, two users waiting.
    assert_eq!(paired_users, 3);
    assert_eq!(
        users
            .iter()
            .filter(|u| eng.user_state(**u) == UserState::WaitingForAdmin)
            .count(),
        2
    );
}

/// Two chat requests racing for one available admin: exactly one pairs, the
/// other waits. Engine operations are serialized by contract, so the race
/// is two back-to-back calls.
#[test]
fn single_admin_is_never_double_booked() {
    let mut eng = engine(false);
    eng.on_admin_command(ADMIN, AdminCommand::RequestChat);

    eng.on_user_command(UserId(1), UserCommand::StartChat);
    eng.on_user_command(UserId(2), UserCommand::StartChat);

    assert_eq!(
        eng.user_state(UserId(1)),
        UserState::InChatWithAdmin(ADMIN)
    );
    assert_eq!(eng.user_state(UserId(2)), UserState::WaitingForAdmin);
    assert_eq!(eng.admin_state(ADMIN), AdminState::InChatWithUser(UserId(1)));
}

/// Admin waits, user pairs, admin ends: session closed, both notified, and
/// the admin lands back in the pool — never idle-and-forgotten.
#[test]
fn ended_chat_returns_admin_to_pool() {
    let mut eng = engine(false);

    let effects = eng.on_admin_command(ADMIN, AdminCommand::RequestChat);
    assert!(effects[0].text.contains("/leave"));
    assert_eq!(eng.admin_state(ADMIN), AdminState::AvailableForChat);

    let effects = eng.on_user_command(UserId(7), UserCommand::StartChat);
    assert_eq!(effects.len(), 2, "both sides notified of the pairing");
    assert_eq!(eng.user_state(UserId(7)), UserState::InChatWithAdmin(ADMIN));

    let effects = eng.on_admin_text(ADMIN, "/end");
    assert!(
        effects
            .iter()
            .any(|e| e.recipient == Recipient::User(UserId(7)))
    );
    assert!(
        effects
            .iter()
            .any(|e| e.recipient == Recipient::Admin(ADMIN))
    );
    assert_eq!(eng.user_state(UserId(7)), UserState::Idle);
    assert_eq!(eng.admin_state(ADMIN), AdminState::AvailableForChat);
}

/// After ending a chat the admin is re-offered the next waiting user
/// immediately, without issuing another request.
#[test]
fn ended_chat_chains_to_next_waiting_user() {
    let mut eng = engine(false);
    eng.on_user_command(UserId(1), UserCommand::StartChat);
    eng.on_user_command(UserId(2), UserCommand::StartChat);
    eng.on_admin_command(ADMIN, AdminCommand::RequestChat);

    eng.on_admin_text(ADMIN, "/end");
    assert_eq!(eng.admin_state(ADMIN), AdminState::InChatWithUser(UserId(2)));
    assert_eq!(eng.user_state(UserId(1)), UserState::Idle);
}

/// Full ask → check → answer round trip, in both flow variants.
#[rstest]
#[case::explicit_done(false)]
#[case::auto_advance(true)]
fn question_round_trip(#[case] auto_advance: bool) {
    let mut eng = engine(auto_advance);
    let asker = UserId(100);

    eng.on_user_command(asker, UserCommand::AskQuestion);
    assert_eq!(eng.user_state(asker), UserState::SubmittingQuestion);

    let effects = eng.on_user_text(asker, "alice", "When is the next event?");
    assert!(effects[0].text.contains("saved"));
    assert_eq!(eng.user_state(asker), UserState::QuestionQueued);

    let effects = eng.on_admin_command(ADMIN, AdminCommand::CheckQuestions);
    assert!(effects[1].text.contains("When is the next event?"));

    let effects = eng.on_admin_text(ADMIN, "Next Friday");
    let to_asker = effects
        .iter()
        .find(|e| e.recipient == Recipient::User(asker))
        .expect("answer delivered to the asker");
    assert_eq!(
        to_asker.text,
        "Answer to your question 'When is the next event?':\nNext Friday"
    );
    assert_eq!(eng.user_state(asker), UserState::Idle);

    // Queue is drained either way; a re-check reports it empty.
    let effects = eng.on_admin_command(ADMIN, AdminCommand::CheckQuestions);
    assert!(effects[0].text.contains("no pending questions"));
}

/// A long question is echoed shortened in the answer, while the relayed
/// answer itself is untouched.
#[test]
fn long_question_echo_is_truncated() {
    let mut eng = engine(false);
    let asker = UserId(100);
    let long_question = "a".repeat(120);

    eng.on_user_command(asker, UserCommand::AskQuestion);
    eng.on_user_text(asker, "alice", &long_question);
    eng.on_admin_command(ADMIN, AdminCommand::CheckQuestions);

    let effects = eng.on_admin_text(ADMIN, "short answer");
    let to_asker = effects
        .iter()
        .find(|e| e.recipient == Recipient::User(asker))
        .expect("answer delivered");
    assert!(to_asker.text.contains("..."));
    assert!(to_asker.text.ends_with("short answer"));
    assert!(!to_asker.text.contains(&long_question));
}

/// Questions are answered strictly oldest-first across several admins'
/// check/answer cycles.
#[test]
fn questions_are_served_fifo() {
    let mut eng = engine(false);
    for (id, (name, text)) in [("ann", "q-one"), ("ben", "q-two"), ("cleo", "q-three")]
        .into_iter()
        .enumerate()
    {
        let user = UserId(200 + id as i64);
        eng.on_user_command(user, UserCommand::AskQuestion);
        eng.on_user_text(user, name, text);
    }

    let effects = eng.on_admin_command(ADMIN, AdminCommand::CheckQuestions);
    assert!(effects[1].text.contains("q-one"));

    eng.on_admin_text(ADMIN, "first answer");
    let effects = eng.on_admin_command(ADMIN, AdminCommand::CheckQuestions);
    assert!(effects[1].text.contains("q-two"));

    // /done discards q-two and moves on to q-three.
    let effects = eng.on_admin_text(ADMIN, "/done");
    assert!(effects[1].text.contains("q-three"));
}
