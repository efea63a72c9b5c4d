use crate::document::{Document, Node};

/// The phase of a change notification.
///
/// Notifications come in pre/post pairs: `Inserting`/`Inserted`,
/// `Removing`/`Removed`, `Changing`/`Changed`. While a document is loading
/// in bulk, only the post events are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Inserting,
    Inserted,
    Removing,
    Removed,
    Changing,
    Changed,
}

/// Payload of a change notification.
///
/// The payload is only constructed when at least one subscriber is
/// registered.
#[derive(Debug, Clone)]
pub struct MutationEvent {
    pub action: MutationAction,
    pub node: Node,
    pub old_parent: Option<Node>,
    pub new_parent: Option<Node>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

pub(crate) type Handler = Box<dyn FnMut(&MutationEvent)>;

pub(crate) struct Subscribers {
    handlers: Vec<Handler>,
}

impl Subscribers {
    pub(crate) fn new() -> Self {
        Subscribers {
            handlers: Vec::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn notify(&mut self, event: &MutationEvent) {
        for handler in &mut self.handlers {
            handler(event);
        }
    }
}

/// ## Change notifications
impl Document {
    /// Subscribe to change notifications.
    ///
    /// The handler receives pre and post events for every insert, remove and
    /// value change. During a mutation the tree is mid-splice, so the
    /// payload carries node handles and string values rather than borrowed
    /// structure.
    pub fn on_mutation(&mut self, handler: impl FnMut(&MutationEvent) + 'static) {
        self.subscribers.handlers.push(Box::new(handler));
    }

    /// True when a pre-mutation event should be raised.
    pub(crate) fn wants_pre_events(&self) -> bool {
        !self.subscribers.is_empty() && !self.loading
    }

    /// True when a post-mutation event should be raised.
    pub(crate) fn wants_post_events(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub(crate) fn emit(&mut self, event: MutationEvent) {
        // handlers are taken out for the duration of the call so they can
        // be FnMut without aliasing the document
        let mut subscribers = std::mem::replace(&mut self.subscribers, Subscribers::new());
        subscribers.notify(&event);
        // a handler may have subscribed mid-notification; keep those too
        subscribers.handlers.append(&mut self.subscribers.handlers);
        self.subscribers = subscribers;
    }
}
