//! Per-client communication channels and which records belong to each.

use std::collections::BTreeMap;

use uuid::Uuid;

use folio_types::models::{ActivityEvent, ActivityKind, Channel, ChannelKind, Message};

use crate::diagnostics::{Diagnostic, DiagnosticsSink};

/// One channel per kind for a client. Iteration follows [`ChannelKind::ALL`].
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    client_id: Uuid,
    channels: BTreeMap<ChannelKind, Channel>,
}

impl ChannelRegistry {
    pub fn new(client_id: Uuid) -> Self {
        Self {
            client_id,
            channels: BTreeMap::new(),
        }
    }

    pub fn from_channels(client_id: Uuid, channels: Vec<Channel>, sink: &dyn DiagnosticsSink) -> Self {
        let mut registry = Self::new(client_id);
        for channel in channels {
            registry.insert(channel, sink);
        }
        registry
    }

    /// Last writer wins; a replaced channel is reported.
    pub fn insert(&mut self, channel: Channel, sink: &dyn DiagnosticsSink) -> Option<Channel> {
        let kept = channel.id;
        let kind = channel.kind;
        let replaced = self.channels.insert(kind, channel);
        if let Some(old) = &replaced {
            sink.report(Diagnostic::DuplicateChannel {
                client_id: self.client_id,
                kind,
                replaced: old.id,
                kept,
            });
        }
        replaced
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    pub fn get(&self, kind: ChannelKind) -> Option<&Channel> {
        self.channels.get(&kind)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// First channel in display order.
    pub fn default_channel(&self) -> Option<&Channel> {
        self.channels.values().next()
    }

    pub fn kind_of(&self, channel_id: Uuid) -> Option<ChannelKind> {
        self.channels
            .values()
            .find(|c| c.id == channel_id)
            .map(|c| c.kind)
    }

    /// Messages posted to the channel of `kind`, in input order.
    pub fn messages_for<'a>(&self, kind: ChannelKind, messages: &'a [Message]) -> Vec<&'a Message> {
        let Some(channel) = self.get(kind) else {
            return Vec::new();
        };
        messages
            .iter()
            .filter(|m| m.channel_id == channel.id)
            .collect()
    }

    pub fn total_unread(&self) -> u32 {
        self.channels.values().map(|c| c.unread_count).sum()
    }
}

/// Channel kind an activity kind surfaces in, if any.
pub fn route_activity(kind: &ActivityKind) -> Option<ChannelKind> {
    use ActivityKind::*;
    match kind {
        EmailSent | EmailReceived => Some(ChannelKind::Email),
        SmsSent | SmsReceived => Some(ChannelKind::Sms),
        PhoneCallOutbound | PhoneCallInbound | PhoneCallMissed => Some(ChannelKind::CallbackLog),
        MessageSent => Some(ChannelKind::ClientDirect),
        CommentAdded => Some(ChannelKind::InternalDiscussion),
        _ => None,
    }
}

/// Activity events that belong to the channel of `kind`.
pub fn activity_for(kind: ChannelKind, events: &[ActivityEvent]) -> Vec<&ActivityEvent> {
    events
        .iter()
        .filter(|e| route_activity(&e.kind) == Some(kind))
        .collect()
}
