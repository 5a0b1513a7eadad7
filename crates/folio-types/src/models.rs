use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Timestamps --

/// A record timestamp as supplied by the event store.
///
/// Values that fail to parse are kept verbatim so the timeline can report
/// them instead of silently dropping the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventTime {
    Parsed(DateTime<Utc>),
    Malformed(String),
}

impl EventTime {
    /// Accepts RFC 3339 and the SQLite `YYYY-MM-DD HH:MM:SS` form (naive, UTC).
    pub fn parse(raw: &str) -> Self {
        raw.parse::<DateTime<Utc>>()
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
            })
            .map(Self::Parsed)
            .unwrap_or_else(|_| Self::Malformed(raw.to_string()))
    }

    pub fn get(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Parsed(at) => Some(*at),
            Self::Malformed(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Parsed(at)
    }
}

impl From<String> for EventTime {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<EventTime> for String {
    fn from(time: EventTime) -> Self {
        match time {
            EventTime::Parsed(at) => at.to_rfc3339(),
            EventTime::Malformed(raw) => raw,
        }
    }
}

// -- Activity --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub initials: String,
}

impl Actor {
    pub fn new(name: impl Into<String>, initials: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initials: initials.into(),
        }
    }

    /// Actor used for records produced by automation (billing runs, reminders).
    pub fn system() -> Self {
        Self::new("System", "SY")
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}

/// Closed enumeration of everything that can appear on a client or billing timeline.
///
/// Spellings are normalised on the way in: `email_sent` and `email-sent` are the
/// same kind. Anything unrecognised is preserved as `Other` so category keyword
/// matching still sees the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    // Authentication & access
    Login,
    Logout,
    PasswordReset,
    PortalAccessGranted,
    // Documents
    DocumentUpload,
    DocumentDownload,
    DocumentShared,
    DocumentDeleted,
    // Communication
    EmailSent,
    EmailReceived,
    SmsSent,
    SmsReceived,
    PhoneCallOutbound,
    PhoneCallInbound,
    PhoneCallMissed,
    VideoMeeting,
    MessageSent,
    CommentAdded,
    // Meetings
    MeetingScheduled,
    MeetingCompleted,
    MeetingCancelled,
    MeetingRescheduled,
    // Invoices & payments
    InvoiceCreated,
    InvoiceSent,
    InvoiceViewed,
    InvoicePaid,
    PaymentReceived,
    // Signatures
    SignatureRequestSent,
    DocumentSigned,
    SignatureDeclined,
    // Tasks & notes
    TaskCreated,
    TaskCompleted,
    TaskAssigned,
    NoteAdded,
    NoteUpdated,
    // Client & team management
    ClientCreated,
    ClientUpdated,
    TeamMemberAdded,
    TeamMemberRemoved,
    // File management
    FolderCreated,
    FileMoved,
    FileRenamed,
    // Status changes
    StatusChanged,
    PriorityChanged,
    // Billing lifecycle
    PaymentAttempt,
    PaymentSuccess,
    PaymentFailed,
    StatusChange,
    RetryScheduled,
    SubscriptionCreated,
    PaymentMethodUpdated,
    Other(String),
}

impl ActivityKind {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "login" => Self::Login,
            "logout" => Self::Logout,
            "password-reset" => Self::PasswordReset,
            "portal-access-granted" => Self::PortalAccessGranted,
            "document-upload" => Self::DocumentUpload,
            "document-download" => Self::DocumentDownload,
            "document-shared" => Self::DocumentShared,
            "document-deleted" => Self::DocumentDeleted,
            "email-sent" => Self::EmailSent,
            "email-received" => Self::EmailReceived,
            "sms-sent" => Self::SmsSent,
            "sms-received" => Self::SmsReceived,
            "phone-call-outbound" => Self::PhoneCallOutbound,
            "phone-call-inbound" => Self::PhoneCallInbound,
            "phone-call-missed" => Self::PhoneCallMissed,
            "video-meeting" => Self::VideoMeeting,
            "message-sent" => Self::MessageSent,
            "comment-added" => Self::CommentAdded,
            "meeting-scheduled" => Self::MeetingScheduled,
            "meeting-completed" => Self::MeetingCompleted,
            "meeting-cancelled" => Self::MeetingCancelled,
            "meeting-rescheduled" => Self::MeetingRescheduled,
            "invoice-created" => Self::InvoiceCreated,
            "invoice-sent" => Self::InvoiceSent,
            "invoice-viewed" => Self::InvoiceViewed,
            "invoice-paid" => Self::InvoicePaid,
            "payment-received" => Self::PaymentReceived,
            "signature-request-sent" => Self::SignatureRequestSent,
            "document-signed" => Self::DocumentSigned,
            "signature-declined" => Self::SignatureDeclined,
            "task-created" => Self::TaskCreated,
            "task-completed" => Self::TaskCompleted,
            "task-assigned" => Self::TaskAssigned,
            "note-added" => Self::NoteAdded,
            "note-updated" => Self::NoteUpdated,
            "client-created" => Self::ClientCreated,
            "client-updated" => Self::ClientUpdated,
            "team-member-added" => Self::TeamMemberAdded,
            "team-member-removed" => Self::TeamMemberRemoved,
            "folder-created" => Self::FolderCreated,
            "file-moved" => Self::FileMoved,
            "file-renamed" => Self::FileRenamed,
            "status-changed" => Self::StatusChanged,
            "priority-changed" => Self::PriorityChanged,
            "payment-attempt" => Self::PaymentAttempt,
            "payment-success" => Self::PaymentSuccess,
            "payment-failed" => Self::PaymentFailed,
            "status-change" => Self::StatusChange,
            "retry-scheduled" => Self::RetryScheduled,
            "subscription-created" => Self::SubscriptionCreated,
            "payment-method-updated" => Self::PaymentMethodUpdated,
            _ => Self::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::PasswordReset => "password-reset",
            Self::PortalAccessGranted => "portal-access-granted",
            Self::DocumentUpload => "document-upload",
            Self::DocumentDownload => "document-download",
            Self::DocumentShared => "document-shared",
            Self::DocumentDeleted => "document-deleted",
            Self::EmailSent => "email-sent",
            Self::EmailReceived => "email-received",
            Self::SmsSent => "sms-sent",
            Self::SmsReceived => "sms-received",
            Self::PhoneCallOutbound => "phone-call-outbound",
            Self::PhoneCallInbound => "phone-call-inbound",
            Self::PhoneCallMissed => "phone-call-missed",
            Self::VideoMeeting => "video-meeting",
            Self::MessageSent => "message-sent",
            Self::CommentAdded => "comment-added",
            Self::MeetingScheduled => "meeting-scheduled",
            Self::MeetingCompleted => "meeting-completed",
            Self::MeetingCancelled => "meeting-cancelled",
            Self::MeetingRescheduled => "meeting-rescheduled",
            Self::InvoiceCreated => "invoice-created",
            Self::InvoiceSent => "invoice-sent",
            Self::InvoiceViewed => "invoice-viewed",
            Self::InvoicePaid => "invoice-paid",
            Self::PaymentReceived => "payment-received",
            Self::SignatureRequestSent => "signature-request-sent",
            Self::DocumentSigned => "document-signed",
            Self::SignatureDeclined => "signature-declined",
            Self::TaskCreated => "task-created",
            Self::TaskCompleted => "task-completed",
            Self::TaskAssigned => "task-assigned",
            Self::NoteAdded => "note-added",
            Self::NoteUpdated => "note-updated",
            Self::ClientCreated => "client-created",
            Self::ClientUpdated => "client-updated",
            Self::TeamMemberAdded => "team-member-added",
            Self::TeamMemberRemoved => "team-member-removed",
            Self::FolderCreated => "folder-created",
            Self::FileMoved => "file-moved",
            Self::FileRenamed => "file-renamed",
            Self::StatusChanged => "status-changed",
            Self::PriorityChanged => "priority-changed",
            Self::PaymentAttempt => "payment-attempt",
            Self::PaymentSuccess => "payment-success",
            Self::PaymentFailed => "payment-failed",
            Self::StatusChange => "status-change",
            Self::RetryScheduled => "retry-scheduled",
            Self::SubscriptionCreated => "subscription-created",
            Self::PaymentMethodUpdated => "payment-method-updated",
            Self::Other(raw) => raw,
        }
    }

    /// Kinds that carry delivery/view receipts.
    pub fn is_trackable(&self) -> bool {
        matches!(self, Self::InvoiceCreated | Self::InvoiceSent | Self::EmailSent)
    }
}

impl From<String> for ActivityKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Coarse grouping of activity. Unknown values land in `System`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityCategory {
    Authentication,
    Documents,
    Communication,
    Meetings,
    Financial,
    Signatures,
    Tasks,
    Team,
    #[default]
    #[serde(other)]
    System,
}

/// Free-form drill-down payload shown when an activity row is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Display amount, e.g. `$2,500.00`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// One receipt facet (view, download or open).
///
/// `Pending` means the facet applies to the record but has not happened yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum Facet {
    Pending,
    Seen {
        first_at: DateTime<Utc>,
        last_at: DateTime<Utc>,
        count: u32,
    },
}

impl Facet {
    pub fn is_seen(&self) -> bool {
        matches!(self, Self::Seen { .. })
    }

    pub fn first_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Seen { first_at, .. } => Some(*first_at),
            Self::Pending => None,
        }
    }

    pub fn last_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Seen { last_at, .. } => Some(*last_at),
            Self::Pending => None,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            Self::Seen { count, .. } => *count,
            Self::Pending => 0,
        }
    }
}

/// Delivery receipts attached to invoice and email events.
///
/// A `None` facet is not applicable to the record; `Some(Facet::Pending)` is
/// applicable but has not happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Facet>,
    #[serde(default)]
    pub bounced: bool,
    #[serde(default)]
    pub failed: bool,
}

impl TrackingState {
    pub fn for_invoice() -> Self {
        Self {
            view: Some(Facet::Pending),
            download: Some(Facet::Pending),
            ..Self::default()
        }
    }

    pub fn for_email() -> Self {
        Self {
            open: Some(Facet::Pending),
            ..Self::default()
        }
    }

    pub fn viewed(&self) -> bool {
        self.view.is_some_and(|f| f.is_seen())
    }

    pub fn viewed_at(&self) -> Option<DateTime<Utc>> {
        self.view.and_then(|f| f.first_at())
    }

    pub fn last_viewed_at(&self) -> Option<DateTime<Utc>> {
        self.view.and_then(|f| f.last_at())
    }

    pub fn view_count(&self) -> u32 {
        self.view.map_or(0, |f| f.count())
    }

    pub fn downloaded(&self) -> bool {
        self.download.is_some_and(|f| f.is_seen())
    }

    pub fn downloaded_at(&self) -> Option<DateTime<Utc>> {
        self.download.and_then(|f| f.first_at())
    }

    pub fn opened(&self) -> bool {
        self.open.is_some_and(|f| f.is_seen())
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.open.and_then(|f| f.first_at())
    }

    pub fn open_count(&self) -> u32 {
        self.open.map_or(0, |f| f.count())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingCategory {
    Invoice,
    Subscription,
}

impl BillingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Subscription => "subscription",
        }
    }
}

/// Outcome flag on billing lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    Success,
    Failed,
    Pending,
    Warning,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Warning => "warning",
        }
    }
}

/// An immutable fact about a client (or, for billing, about the firm).
/// Only `tracking` is ever replaced after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(default)]
    pub actor: Actor,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub timestamp: EventTime,
    #[serde(default)]
    pub category: ActivityCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_details: Option<ExtendedDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_category: Option<BillingCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_events: Vec<Uuid>,
}

impl ActivityEvent {
    /// Minimal event; the optional fields start empty.
    pub fn new(
        kind: ActivityKind,
        actor: Actor,
        action: impl Into<String>,
        timestamp: impl Into<EventTime>,
        category: ActivityCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id: None,
            kind,
            actor,
            action: action.into(),
            detail: None,
            metadata: None,
            timestamp: timestamp.into(),
            category,
            extended_details: None,
            tracking: None,
            client_name: None,
            billing_category: None,
            status: None,
            related_events: Vec::new(),
        }
    }
}

// -- Channels & messages --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    InternalDiscussion,
    ClientDirect,
    Sms,
    Email,
    CallbackLog,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 5] = [
        Self::InternalDiscussion,
        Self::ClientDirect,
        Self::Sms,
        Self::Email,
        Self::CallbackLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalDiscussion => "internal-discussion",
            Self::ClientDirect => "client-direct",
            Self::Sms => "sms",
            Self::Email => "email",
            Self::CallbackLog => "callback-log",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub client_id: Uuid,
    pub kind: ChannelKind,
    pub name: String,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    #[default]
    Normal,
    NextBlock,
    TimeSensitive,
    Critical,
}

impl Urgency {
    pub fn is_elevated(&self) -> bool {
        !matches!(self, Self::Normal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::NextBlock => "Next Block",
            Self::TimeSensitive => "Time Sensitive",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub size: String,
}

/// Append-only "seen by" entry on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub reader: String,
    pub reader_initials: String,
    pub seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub sender: String,
    pub sender_initials: String,
    pub content: String,
    /// Display string as shown in the conversation (e.g. `10:30 AM`).
    pub timestamp: String,
    pub sent_at: EventTime,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub read_by: Vec<ReadReceipt>,
}

// -- Email --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub from: String,
    pub from_initials: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    pub subject: String,
    pub content: String,
    pub sent_at: EventTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub is_from_firm: bool,
}

/// Aggregate over the emails of one conversation. Derived, never authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailThread {
    pub id: Uuid,
    pub client_id: Uuid,
    pub subject: String,
    pub participants: Vec<String>,
    pub last_sender: String,
    pub last_sender_initials: String,
    pub preview: String,
    pub timestamp: EventTime,
    pub unread: bool,
    pub has_attachment: bool,
    pub is_starred: bool,
    pub email_count: u32,
}

// -- Callbacks --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallbackStatus {
    Open,
    NotReached,
    Completed,
}

impl CallbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::NotReached => "not-reached",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallbackPriority {
    Low,
    Medium,
    High,
}

impl CallbackPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackMessage {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub scheduled_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,
    pub assigned_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub status: CallbackStatus,
    pub priority: CallbackPriority,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub created_at: EventTime,
}

// -- Organizers --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizerKind {
    Tax,
    Business,
    Checklist,
    Custom,
}

impl OrganizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tax => "tax",
            Self::Business => "business",
            Self::Checklist => "checklist",
            Self::Custom => "custom",
        }
    }
}

/// Lifecycle of an organizer. Not linear: sending and receiving can
/// interleave with editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizerStatus {
    NotStarted,
    InProgress,
    Sent,
    Received,
    Completed,
}

impl OrganizerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Sent => "sent",
            Self::Received => "received",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    Text,
    Number,
    Date,
    YesNo,
    MultipleChoice,
    FileUpload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub kind: QuestionKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl Question {
    /// Blank and whitespace-only answers do not count.
    pub fn is_answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Structured intake document. Completion progress is always derived from
/// the answers, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub kind: OrganizerKind,
    pub status: OrganizerStatus,
    pub last_updated: NaiveDate,
    pub created_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_time_accepts_rfc3339_and_sqlite_forms() {
        let rfc = EventTime::parse("2025-10-14T09:30:00Z");
        let sqlite = EventTime::parse("2025-10-14 09:30:00");
        assert_eq!(rfc.get(), sqlite.get());
        assert!(rfc.get().is_some());
    }

    #[test]
    fn event_time_keeps_garbage_verbatim() {
        let t: EventTime = serde_json::from_str("\"last tuesday\"").unwrap();
        assert_eq!(t, EventTime::Malformed("last tuesday".into()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"last tuesday\"");
    }

    #[test]
    fn activity_kind_normalises_spelling() {
        assert_eq!(ActivityKind::parse("email_sent"), ActivityKind::EmailSent);
        assert_eq!(ActivityKind::parse("Payment-Failed"), ActivityKind::PaymentFailed);
        assert_eq!(
            ActivityKind::parse("fax_received"),
            ActivityKind::Other("fax-received".into())
        );
    }

    #[test]
    fn unknown_category_falls_back_to_system() {
        let c: ActivityCategory = serde_json::from_str("\"payroll\"").unwrap();
        assert_eq!(c, ActivityCategory::System);
        let c: ActivityCategory = serde_json::from_str("\"meetings\"").unwrap();
        assert_eq!(c, ActivityCategory::Meetings);
    }

    #[test]
    fn tracking_accessors_reflect_facets() {
        let mut t = TrackingState::for_invoice();
        assert!(!t.viewed());
        assert_eq!(t.view_count(), 0);
        assert!(t.open.is_none());

        let at = "2025-10-14T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        t.view = Some(Facet::Seen {
            first_at: at,
            last_at: at,
            count: 1,
        });
        assert!(t.viewed());
        assert_eq!(t.viewed_at(), Some(at));
        assert_eq!(t.view_count(), 1);
    }

    #[test]
    fn question_whitespace_answer_is_unanswered() {
        let q = Question {
            id: "q1".into(),
            prompt: "EIN".into(),
            kind: QuestionKind::Text,
            required: true,
            answer: Some("   ".into()),
            options: vec![],
            help_text: None,
        };
        assert!(!q.is_answered());
    }
}
