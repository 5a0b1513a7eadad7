//! Per-viewer engine configuration: filter, sort, channel selection.
//!
//! The hosting layer drives this through explicit methods and publishes the
//! returned events; nothing reaches in through a shared handle.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use folio_types::events::EngineEvent;
use folio_types::models::{ChannelKind, EmailThread};

use crate::channel::ChannelRegistry;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::filter::FilterQuery;
use crate::organizer::OrganizerField;
use crate::sort::{SortDirection, SortState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub client_id: Uuid,
    pub filter: FilterQuery,
    pub sort: SortState<OrganizerField>,
    pub channel_mode: ChannelKind,
    pub selected_channel: Option<Uuid>,
    pub selected_thread: Option<Uuid>,
    pub settings_open: bool,
    /// Bumped on every selection change; fetch tickets from older
    /// generations are discarded.
    pub generation: u64,
}

/// Handed out when a fetch for a channel starts; presented again when its
/// result arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub channel_id: Uuid,
    pub seq: u64,
    generation: u64,
}

pub struct Session {
    state: SessionState,
    next_seq: u64,
    latest: HashMap<Uuid, u64>,
}

impl Session {
    /// Starts on the first channel in display order.
    pub fn new(client_id: Uuid, registry: &ChannelRegistry) -> Self {
        let default = registry.default_channel();
        Self {
            state: SessionState {
                client_id,
                filter: FilterQuery::default(),
                sort: SortState::default(),
                channel_mode: default.map_or(ChannelKind::InternalDiscussion, |c| c.kind),
                selected_channel: default.map(|c| c.id),
                selected_thread: None,
                settings_open: false,
                generation: 0,
            },
            next_seq: 0,
            latest: HashMap::new(),
        }
    }

    pub fn get_state(&self) -> &SessionState {
        &self.state
    }

    pub fn set_filter(&mut self, query: FilterQuery) -> EngineEvent {
        self.state.filter = query;
        EngineEvent::FilterChanged {
            client_id: Some(self.state.client_id),
        }
    }

    pub fn set_sort(&mut self, field: OrganizerField, direction: SortDirection) {
        self.state.sort.set(field, direction);
    }

    /// Column header click; see [`SortState::select`].
    pub fn select_sort(&mut self, field: OrganizerField) -> SortState<OrganizerField> {
        self.state.sort.select(field);
        self.state.sort
    }

    /// Switches the communication surface. The previous channel and thread
    /// selection is dropped and the first channel (and, for email, the
    /// first thread) is selected before anything else runs.
    pub fn set_channel_mode(
        &mut self,
        kind: ChannelKind,
        registry: &ChannelRegistry,
        threads: &[EmailThread],
    ) -> EngineEvent {
        self.state.channel_mode = kind;
        self.state.selected_channel = registry.get(kind).map(|c| c.id);
        self.state.selected_thread = match kind {
            ChannelKind::Email => threads.first().map(|t| t.id),
            _ => None,
        };
        self.state.generation += 1;
        tracing::debug!(
            client_id = %self.state.client_id,
            kind = kind.as_str(),
            generation = self.state.generation,
            "channel mode changed"
        );
        EngineEvent::ChannelModeChanged {
            client_id: self.state.client_id,
            kind,
            selected_channel: self.state.selected_channel,
        }
    }

    pub fn select_thread(&mut self, thread_id: Uuid) {
        self.state.selected_thread = Some(thread_id);
        self.state.generation += 1;
    }

    pub fn toggle_settings(&mut self) -> EngineEvent {
        self.state.settings_open = !self.state.settings_open;
        EngineEvent::SettingsToggled {
            open: self.state.settings_open,
        }
    }

    /// Issues a ticket for the selected channel, or `None` with no selection.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let channel_id = self.state.selected_channel?;
        self.next_seq += 1;
        self.latest.insert(channel_id, self.next_seq);
        Some(FetchTicket {
            channel_id,
            seq: self.next_seq,
            generation: self.state.generation,
        })
    }

    /// Whether a fetch result may be applied. Only the newest ticket for the
    /// still-selected channel, issued since the last selection change, wins.
    pub fn accept_fetch(&self, ticket: &FetchTicket, sink: &dyn DiagnosticsSink) -> bool {
        let current = ticket.generation == self.state.generation
            && self.state.selected_channel == Some(ticket.channel_id)
            && self.latest.get(&ticket.channel_id) == Some(&ticket.seq);
        if !current {
            sink.report(Diagnostic::StaleFetchDiscarded {
                channel_id: ticket.channel_id,
                ticket: ticket.seq,
            });
        }
        current
    }
}
