//! # Innate Primitives
//!
//! Fixed vocabulary the action core relies on. These names are part of the
//! agent language and are compiled in; a program cannot redefine them.

/// Functor marking a negative literal in queries and updates: `not(p)`.
pub const NEGATION: &str = "not";

/// Functor of the mailbox record written for every delivered message:
/// `sent(Receiver, Content)`.
pub const SENT: &str = "sent";

/// Functor of the mailbox record for an incoming message:
/// `received(Sender, Content)`.
pub const RECEIVED: &str = "received";

/// Binary functors whose literals live in the mailbox rather than the
/// belief base.
pub const MAILBOX_FUNCTORS: [&str; 2] = [SENT, RECEIVED];

/// Wrapper used in mailbox records for imperative content: `imp(Content)`.
pub const IMPERATIVE_WRAPPER: &str = "imp";

/// Wrapper used in mailbox records for interrogative content: `int(Content)`.
pub const INTERROGATIVE_WRAPPER: &str = "int";

/// Trivially true atom. Queries containing only `true` always succeed.
pub const TRUE_ATOM: &str = "true";
