//! Urgency escalation on internal discussion messages.
//!
//! Selecting the active level clears it back to normal; selecting another
//! elevated level replaces it. Escalating from the message menu opens an
//! assignment prompt, and nothing changes until that prompt is resolved.

use std::collections::HashMap;

use uuid::Uuid;

use folio_types::models::{ChannelKind, Message, Urgency};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEscalation {
    pub message_id: Uuid,
    pub requested: Urgency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrgencyOutcome {
    /// The change is final; persist this message
    Committed(Message),
    /// An assignee must be chosen (or the prompt cancelled) first
    PromptOpened(PendingEscalation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResolution {
    Assign(String),
    Cancel,
}

pub fn urgency_supported(kind: ChannelKind) -> bool {
    kind == ChannelKind::InternalDiscussion
}

/// Level that results from selecting `selected` while `current` is active.
pub fn toggle(current: Urgency, selected: Urgency) -> Urgency {
    if current == selected {
        Urgency::Normal
    } else {
        selected
    }
}

/// Quick-action toggle for a message still being composed. No prompt.
pub fn toggle_compose(current: Urgency, selected: Urgency) -> Urgency {
    toggle(current, selected)
}

/// Tracks open assignment prompts, one per message.
#[derive(Debug, Default)]
pub struct UrgencyWorkflow {
    pending: HashMap<Uuid, PendingEscalation>,
}

impl UrgencyWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a selection from the message menu. A newer request for the
    /// same message replaces an open prompt.
    pub fn request(
        &mut self,
        channel: ChannelKind,
        message: &Message,
        selected: Urgency,
    ) -> Result<UrgencyOutcome, EngineError> {
        if !urgency_supported(channel) {
            return Err(EngineError::UrgencyUnsupported(channel.as_str()));
        }
        let target = toggle(message.urgency, selected);
        if !target.is_elevated() {
            self.pending.remove(&message.id);
            let mut next = message.clone();
            next.urgency = Urgency::Normal;
            return Ok(UrgencyOutcome::Committed(next));
        }
        let pending = PendingEscalation {
            message_id: message.id,
            requested: target,
        };
        self.pending.insert(message.id, pending.clone());
        Ok(UrgencyOutcome::PromptOpened(pending))
    }

    /// Closes the prompt for `message`. Cancelling returns it unchanged.
    pub fn resolve(
        &mut self,
        message: &Message,
        resolution: PromptResolution,
    ) -> Result<Message, EngineError> {
        let pending = self
            .pending
            .remove(&message.id)
            .ok_or(EngineError::NoPendingEscalation(message.id))?;
        match resolution {
            PromptResolution::Cancel => Ok(message.clone()),
            PromptResolution::Assign(assignee) => {
                let assignee = assignee.trim();
                if assignee.is_empty() {
                    self.pending.insert(message.id, pending);
                    return Err(EngineError::EmptyField("assignee"));
                }
                let mut next = message.clone();
                next.urgency = pending.requested;
                next.assigned_to = Some(assignee.to_string());
                Ok(next)
            }
        }
    }

    pub fn pending(&self, message_id: Uuid) -> Option<&PendingEscalation> {
        self.pending.get(&message_id)
    }
}

/// One-shot form of the workflow: the prompt's answer arrives with the
/// request. `None` on an escalation means the prompt was cancelled.
pub fn set_urgency(
    channel: ChannelKind,
    message: &Message,
    level: Urgency,
    assignee: Option<&str>,
) -> Result<Message, EngineError> {
    let mut workflow = UrgencyWorkflow::new();
    match workflow.request(channel, message, level)? {
        UrgencyOutcome::Committed(next) => Ok(next),
        UrgencyOutcome::PromptOpened(_) => {
            let resolution = match assignee {
                Some(name) => PromptResolution::Assign(name.to_string()),
                None => PromptResolution::Cancel,
            };
            workflow.resolve(message, resolution)
        }
    }
}

/// "Mark as resolved": back to normal. The assignee stays on record.
pub fn mark_resolved(channel: ChannelKind, message: &Message) -> Result<Message, EngineError> {
    if !urgency_supported(channel) {
        return Err(EngineError::UrgencyUnsupported(channel.as_str()));
    }
    let mut next = message.clone();
    next.urgency = Urgency::Normal;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::models::EventTime;

    fn message(urgency: Urgency) -> Message {
        Message {
            id: Uuid::new_v4(),
            channel_id: Uuid::new_v4(),
            sender: "Mike Chen".into(),
            sender_initials: "MC".into(),
            content: "Client called about the IRS notice".into(),
            timestamp: "10:30 AM".into(),
            sent_at: EventTime::parse("2025-10-14T10:30:00Z"),
            urgency,
            assigned_to: None,
            is_pinned: false,
            attachments: vec![],
            read_by: vec![],
        }
    }

    const INTERNAL: ChannelKind = ChannelKind::InternalDiscussion;

    #[test]
    fn escalation_waits_for_assignee() {
        let msg = message(Urgency::Normal);
        let mut wf = UrgencyWorkflow::new();
        let outcome = wf.request(INTERNAL, &msg, Urgency::Critical).unwrap();
        assert!(matches!(outcome, UrgencyOutcome::PromptOpened(ref p) if p.requested == Urgency::Critical));
        assert!(wf.pending(msg.id).is_some());

        let next = wf.resolve(&msg, PromptResolution::Assign("Sarah Johnson".into())).unwrap();
        assert_eq!(next.urgency, Urgency::Critical);
        assert_eq!(next.assigned_to.as_deref(), Some("Sarah Johnson"));
        assert!(wf.pending(msg.id).is_none());
    }

    #[test]
    fn cancel_leaves_message_untouched() {
        let msg = message(Urgency::Normal);
        let mut wf = UrgencyWorkflow::new();
        wf.request(INTERNAL, &msg, Urgency::TimeSensitive).unwrap();
        let next = wf.resolve(&msg, PromptResolution::Cancel).unwrap();
        assert_eq!(next, msg);
    }

    #[test]
    fn selecting_active_level_clears_it() {
        let msg = message(Urgency::NextBlock);
        let mut wf = UrgencyWorkflow::new();
        let outcome = wf.request(INTERNAL, &msg, Urgency::NextBlock).unwrap();
        let UrgencyOutcome::Committed(next) = outcome else {
            panic!("expected commit");
        };
        assert_eq!(next.urgency, Urgency::Normal);
    }

    #[test]
    fn switching_levels_goes_through_the_prompt() {
        let msg = message(Urgency::NextBlock);
        let next = set_urgency(INTERNAL, &msg, Urgency::Critical, Some("Dana")).unwrap();
        assert_eq!(next.urgency, Urgency::Critical);
    }

    #[test]
    fn only_internal_discussion_supports_urgency() {
        let msg = message(Urgency::Normal);
        let err = set_urgency(ChannelKind::Sms, &msg, Urgency::Critical, Some("Dana")).unwrap_err();
        assert_eq!(err, EngineError::UrgencyUnsupported("sms"));
    }

    #[test]
    fn resolve_without_prompt_is_rejected() {
        let msg = message(Urgency::Normal);
        let mut wf = UrgencyWorkflow::new();
        assert_eq!(
            wf.resolve(&msg, PromptResolution::Cancel),
            Err(EngineError::NoPendingEscalation(msg.id))
        );
    }

    #[test]
    fn blank_assignee_keeps_prompt_open() {
        let msg = message(Urgency::Normal);
        let mut wf = UrgencyWorkflow::new();
        wf.request(INTERNAL, &msg, Urgency::Critical).unwrap();
        assert!(wf.resolve(&msg, PromptResolution::Assign("  ".into())).is_err());
        assert!(wf.pending(msg.id).is_some());
    }

    #[test]
    fn mark_resolved_keeps_assignee() {
        let mut msg = message(Urgency::Critical);
        msg.assigned_to = Some("Sarah Johnson".into());
        let next = mark_resolved(INTERNAL, &msg).unwrap();
        assert_eq!(next.urgency, Urgency::Normal);
        assert_eq!(next.assigned_to.as_deref(), Some("Sarah Johnson"));
    }

    #[test]
    fn compose_toggle() {
        assert_eq!(toggle_compose(Urgency::Normal, Urgency::Critical), Urgency::Critical);
        assert_eq!(toggle_compose(Urgency::Critical, Urgency::Critical), Urgency::Normal);
        assert_eq!(toggle_compose(Urgency::Critical, Urgency::NextBlock), Urgency::NextBlock);
    }
}
