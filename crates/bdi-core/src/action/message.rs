//! Communication actions: `send` and `sendonce`.
//!
//! A sent message is handed to the environment for delivery and recorded in
//! the sender's mailbox as one `sent(Receiver, Content)` fact per receiver.
//! Imperatives and interrogatives are recorded wrapped as `imp(..)` and
//! `int(..)`.

use super::write_call;
use crate::context::ExecutionContext;
use crate::kr::{Substitution, Term, Var, write_list};
use crate::primitives::{IMPERATIVE_WRAPPER, INTERROGATIVE_WRAPPER, SENT};
use crate::query::{Literal, Query, Update};
use crate::selector::Selector;
use crate::state::MentalState;
use crate::{ActionError, AgentId, BaseKind};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// MESSAGE
// =============================================================================

/// The speech act of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mood {
    /// `:content`, an informative statement.
    Indicative,
    /// `!content`, a request to adopt a goal.
    Imperative,
    /// `?content`, a question.
    Interrogative,
}

impl Mood {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Indicative => ':',
            Self::Imperative => '!',
            Self::Interrogative => '?',
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            ':' => Some(Self::Indicative),
            '!' => Some(Self::Imperative),
            '?' => Some(Self::Interrogative),
            _ => None,
        }
    }

    /// Content as stored in the mailbox.
    #[must_use]
    pub fn wrap(self, content: &Term) -> Term {
        match self {
            Self::Indicative => content.clone(),
            Self::Imperative => Term::compound(IMPERATIVE_WRAPPER, vec![content.clone()]),
            Self::Interrogative => Term::compound(INTERROGATIVE_WRAPPER, vec![content.clone()]),
        }
    }
}

/// A message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    pub sender: AgentId,
    pub receivers: BTreeSet<AgentId>,
    pub mood: Mood,
    pub content: Term,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let receivers: Vec<&AgentId> = self.receivers.iter().collect();
        write!(f, "{} -> [", self.sender)?;
        write_list(f, &receivers)?;
        write!(f, "] {}{}", self.mood.symbol(), self.content)
    }
}

fn sent_record(receiver: &AgentId, wrapped: &Term) -> Term {
    Term::compound(SENT, vec![receiver.to_term(), wrapped.clone()])
}

// =============================================================================
// SEND
// =============================================================================

/// Sends a message to the agents its selector denotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SendAction {
    selector: Selector,
    mood: Mood,
    content: Term,
}

impl SendAction {
    #[must_use]
    pub fn new(selector: Selector, mood: Mood, content: Term) -> Self {
        Self {
            selector,
            mood,
            content,
        }
    }

    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    #[must_use]
    pub fn mood(&self) -> Mood {
        self.mood
    }

    #[must_use]
    pub fn content(&self) -> &Term {
        &self.content
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = self.content.free_vars();
        self.selector.collect_vars(&mut vars);
        vars
    }

    /// Questions may keep variables; the answer binds them.
    pub(super) fn is_closed(&self) -> bool {
        self.selector.is_closed()
            && (self.mood == Mood::Interrogative || self.content.is_closed())
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            selector: self.selector.apply_subst(subst),
            mood: self.mood,
            content: self.content.apply_subst(subst),
        }
    }

    pub(super) fn execute(
        &self,
        state: &mut dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Message, ActionError> {
        let receivers = self.selector.resolve(&*state, &mut *ctx.choices)?;
        self.deliver(receivers, state, ctx, self)
    }

    /// Post `receivers` a message and record it as sent.
    fn deliver(
        &self,
        receivers: BTreeSet<AgentId>,
        state: &mut dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
        subject: &dyn fmt::Display,
    ) -> Result<Message, ActionError> {
        let message = Message {
            sender: state.agent_id().clone(),
            receivers,
            mood: self.mood,
            content: self.content.clone(),
        };
        if message.receivers.is_empty() {
            tracing::debug!(action = %subject, "no receivers left, message not posted");
            return Ok(message);
        }
        ctx.environment.post_message(&message)?;

        let wrapped = self.mood.wrap(&self.content);
        let records = Update::adding(message.receivers.iter().map(|r| sent_record(r, &wrapped)));
        state
            .insert(&records, BaseKind::Mailbox)
            .and_then(|()| state.update_goal_state())
            .map_err(|e| ActionError::update(subject, e))?;
        Ok(message)
    }
}

impl fmt::Display for SendAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = format!("{}{}", self.mood.symbol(), self.content);
        write_call(f, &self.selector, "send", &content)
    }
}

// =============================================================================
// SENDONCE
// =============================================================================

/// Like `send`, but skips receivers that were already sent this message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SendOnceAction {
    send: SendAction,
}

impl SendOnceAction {
    #[must_use]
    pub fn new(selector: Selector, mood: Mood, content: Term) -> Self {
        Self {
            send: SendAction::new(selector, mood, content),
        }
    }

    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.send.selector
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        self.send.free_vars()
    }

    pub(super) fn is_closed(&self) -> bool {
        self.send.is_closed()
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            send: self.send.apply_subst(subst),
        }
    }

    /// Resolved receivers without a matching `sent` record.
    pub fn pending_receivers(
        &self,
        state: &dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BTreeSet<AgentId>, ActionError> {
        let resolved = self.send.selector.resolve(state, &mut *ctx.choices)?;
        let wrapped = self.send.mood.wrap(&self.send.content);
        let mut pending = BTreeSet::new();
        for receiver in resolved {
            let query = Query::new(vec![Literal::pos(sent_record(&receiver, &wrapped))]);
            let answers = state
                .query(&query, BaseKind::Mailbox)
                .map_err(|e| ActionError::query(self, e))?;
            if answers.is_empty() {
                pending.insert(receiver);
            }
        }
        Ok(pending)
    }

    pub(super) fn execute(
        &self,
        state: &mut dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Message, ActionError> {
        let receivers = self.pending_receivers(&*state, ctx)?;
        self.send.deliver(receivers, state, ctx, self)
    }
}

impl fmt::Display for SendOnceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = format!("{}{}", self.send.mood.symbol(), self.send.content);
        write_call(f, &self.send.selector, "sendonce", &content)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::context::RecordingCollaborators;
    use crate::kr::parse_term;
    use crate::selector::SelectorKind;
    use crate::state::MemoryState;

    fn term(text: &str) -> Term {
        parse_term(text).expect("term")
    }

    fn state() -> MemoryState {
        MemoryState::new("alice").with_agents(["bob", "carol"])
    }

    fn to(name: &str) -> Selector {
        Selector::agents(vec![Term::atom(name)])
    }

    #[test]
    fn send_posts_and_records_per_receiver() {
        let mut state = state();
        let mut collab = RecordingCollaborators::new();
        let action = Action::Send(SendAction::new(
            Selector::of_kind(SelectorKind::AllOther),
            Mood::Indicative,
            term("on(a, b)"),
        ));
        let result = action
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("send");

        assert!(result.just_performed());
        assert_eq!(collab.environment.messages.len(), 1);
        let message = &collab.environment.messages[0];
        assert_eq!(message.sender, AgentId::new("alice"));
        assert_eq!(message.receivers.len(), 2);
        let mailbox: Vec<String> = state.mailbox().map(ToString::to_string).collect();
        assert_eq!(mailbox, vec!["sent(bob, on(a, b))", "sent(carol, on(a, b))"]);
    }

    #[test]
    fn moods_wrap_recorded_content() {
        let mut state = state();
        let mut collab = RecordingCollaborators::new();
        let action = Action::Send(SendAction::new(to("bob"), Mood::Imperative, term("done")));
        action
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("send");
        assert!(state.mailbox().any(|t| t.to_string() == "sent(bob, imp(done))"));
    }

    #[test]
    fn questions_may_keep_variables() {
        let question = SendAction::new(to("bob"), Mood::Interrogative, term("on(X, b)"));
        assert!(question.is_closed());
        let statement = SendAction::new(to("bob"), Mood::Indicative, term("on(X, b)"));
        assert!(!statement.is_closed());
        let open_receiver =
            SendAction::new(Selector::agents(vec![Term::var("A")]), Mood::Interrogative, term("p"));
        assert!(!open_receiver.is_closed());
    }

    #[test]
    fn unknown_receiver_fails() {
        let mut state = state();
        let mut collab = RecordingCollaborators::new();
        let action = Action::Send(SendAction::new(to("mallory"), Mood::Indicative, term("hi")));
        let result = action.run(&mut state, &Substitution::empty(), &mut collab.context(), false);
        assert!(matches!(result, Err(ActionError::UnknownReceiver(_))));
        assert!(collab.environment.messages.is_empty());
    }

    #[test]
    fn sendonce_skips_receivers_already_sent_to() {
        let mut state = state();
        let mut collab = RecordingCollaborators::new();
        let once = SendOnceAction::new(to("bob"), Mood::Indicative, term("hello"));
        let action = Action::SendOnce(once.clone());

        action
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("first");
        let pending = once
            .pending_receivers(&state, &mut collab.context())
            .expect("pending");
        assert!(pending.is_empty());

        let second = action
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("second");
        assert!(second.just_performed());
        assert_eq!(collab.environment.messages.len(), 1);
        assert_eq!(state.mailbox().count(), 1);
    }

    #[test]
    fn sendonce_still_reaches_new_receivers() {
        let mut state = state();
        let mut collab = RecordingCollaborators::new();
        let first = Action::SendOnce(SendOnceAction::new(to("bob"), Mood::Indicative, term("hi")));
        first
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("first");

        let everyone = Action::SendOnce(SendOnceAction::new(
            Selector::of_kind(SelectorKind::AllOther),
            Mood::Indicative,
            term("hi"),
        ));
        everyone
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("second");

        let last = &collab.environment.messages[1];
        assert_eq!(last.receivers, BTreeSet::from([AgentId::new("carol")]));
        assert_eq!(state.mailbox().count(), 2);
    }

    #[test]
    fn display_shows_mood() {
        let action = SendAction::new(to("bob"), Mood::Interrogative, term("on(X, b)"));
        assert_eq!(action.to_string(), "bob.send(?on(X, b))");
        assert_eq!(Mood::from_symbol('!'), Some(Mood::Imperative));
    }
}
