//! Email threads: aggregates recomputed as emails arrive.

use std::collections::BTreeSet;

use uuid::Uuid;

use folio_types::models::{Email, EmailThread};

use crate::filter;

const PREVIEW_CHARS: usize = 100;

/// Identity of a conversation: normalised subject plus the correspondents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadKey {
    pub subject: String,
    pub participants: BTreeSet<String>,
}

impl ThreadKey {
    /// Reply/forward prefixes are ignored; sender and recipients are
    /// unordered so both directions of a conversation share a key.
    pub fn of(email: &Email) -> Self {
        let participants = std::iter::once(&email.from)
            .chain(email.to.iter())
            .map(|p| p.trim().to_lowercase())
            .collect();
        Self {
            subject: normalize_subject(&email.subject),
            participants,
        }
    }
}

pub fn normalize_subject(subject: &str) -> String {
    let mut s = subject.trim();
    loop {
        let lower = s.to_ascii_lowercase();
        let stripped = ["re:", "fw:", "fwd:"]
            .iter()
            .find(|p| lower.starts_with(*p))
            .map(|p| s[p.len()..].trim_start());
        match stripped {
            Some(rest) => s = rest,
            None => break,
        }
    }
    s.to_lowercase()
}

/// Builds the thread aggregate from its emails, oldest first. A fresh
/// thread is unread until a view marks it read, whoever sent it.
/// Returns `None` for an empty slice.
pub fn thread_for(client_id: Uuid, emails: &[Email]) -> Option<EmailThread> {
    let (first, rest) = emails.split_first()?;
    let thread = EmailThread {
        id: first.thread_id,
        client_id,
        subject: first.subject.clone(),
        participants: Vec::new(),
        last_sender: String::new(),
        last_sender_initials: String::new(),
        preview: String::new(),
        timestamp: first.sent_at.clone(),
        unread: true,
        has_attachment: false,
        is_starred: false,
        email_count: 0,
    };
    let thread = add_email(thread, first);
    Some(rest.iter().fold(thread, add_email))
}

/// Folds one more email into the thread.
///
/// The latest email drives sender, preview and timestamp. Attachments are
/// sticky, and an inbound email marks a read thread unread again.
pub fn add_email(mut thread: EmailThread, email: &Email) -> EmailThread {
    for person in std::iter::once(&email.from).chain(email.to.iter()).chain(email.cc.iter()) {
        if !thread.participants.iter().any(|p| p.eq_ignore_ascii_case(person)) {
            thread.participants.push(person.clone());
        }
    }
    thread.last_sender = email.from.clone();
    thread.last_sender_initials = email.from_initials.clone();
    thread.preview = preview_of(&email.content);
    thread.timestamp = email.sent_at.clone();
    thread.has_attachment |= !email.attachments.is_empty();
    thread.unread |= !email.is_from_firm;
    thread.email_count += 1;
    thread
}

/// Splits a client's emails into threads by [`ThreadKey`], in order of first
/// appearance. Each thread takes the id of its first email's thread.
pub fn group_into_threads(client_id: Uuid, emails: &[Email]) -> Vec<EmailThread> {
    let mut keys: Vec<ThreadKey> = Vec::new();
    let mut threads: Vec<EmailThread> = Vec::new();
    for email in emails {
        let key = ThreadKey::of(email);
        match keys.iter().position(|k| *k == key) {
            Some(idx) => {
                let thread = threads.remove(idx);
                threads.insert(idx, add_email(thread, email));
            }
            None => {
                if let Some(thread) = thread_for(client_id, std::slice::from_ref(email)) {
                    keys.push(key);
                    threads.push(thread);
                }
            }
        }
    }
    threads
}

pub fn mark_read(mut thread: EmailThread) -> EmailThread {
    thread.unread = false;
    thread
}

pub fn toggle_star(mut thread: EmailThread) -> EmailThread {
    thread.is_starred = !thread.is_starred;
    thread
}

/// Threads whose subject, last sender or preview contain `text`.
pub fn search<'a>(threads: &'a [EmailThread], text: &str) -> Vec<&'a EmailThread> {
    threads
        .iter()
        .filter(|t| filter::search_matches(*t, text))
        .collect()
}

fn preview_of(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::models::{Attachment, EventTime};

    fn email(thread_id: Uuid, from: &str, to: &str, subject: &str, firm: bool) -> Email {
        Email {
            id: Uuid::new_v4(),
            thread_id,
            from: from.into(),
            from_initials: from.chars().take(2).collect(),
            to: vec![to.into()],
            cc: vec![],
            subject: subject.into(),
            content: format!("Message from {}", from),
            sent_at: EventTime::parse("2025-10-14T09:00:00Z"),
            attachments: vec![],
            is_from_firm: firm,
        }
    }

    fn attachment() -> Attachment {
        Attachment {
            name: "W-2.pdf".into(),
            content_type: "application/pdf".into(),
            size: "120 KB".into(),
        }
    }

    #[test]
    fn aggregates_follow_latest_email() {
        let tid = Uuid::new_v4();
        let emails = vec![
            email(tid, "Jordan Lee", "Acme Tax", "2024 return", false),
            email(tid, "Acme Tax", "Jordan Lee", "Re: 2024 return", true),
        ];
        let thread = thread_for(Uuid::new_v4(), &emails).unwrap();
        assert_eq!(thread.email_count, 2);
        assert_eq!(thread.last_sender, "Acme Tax");
        assert_eq!(thread.subject, "2024 return");
        assert!(thread.unread);
        assert_eq!(thread.participants.len(), 2);
    }

    #[test]
    fn has_attachment_never_reverts() {
        let tid = Uuid::new_v4();
        let mut first = email(tid, "Jordan Lee", "Acme Tax", "Docs", false);
        first.attachments.push(attachment());
        let thread = thread_for(Uuid::new_v4(), &[first]).unwrap();
        assert!(thread.has_attachment);

        let thread = add_email(thread, &email(tid, "Acme Tax", "Jordan Lee", "Re: Docs", true));
        assert!(thread.has_attachment);
    }

    #[test]
    fn unread_until_marked() {
        let tid = Uuid::new_v4();
        let thread = thread_for(Uuid::new_v4(), &[email(tid, "Jordan Lee", "Acme Tax", "Hi", false)]).unwrap();
        let thread = mark_read(thread);
        assert!(!thread.unread);

        let thread = add_email(thread, &email(tid, "Acme Tax", "Jordan Lee", "Re: Hi", true));
        assert!(!thread.unread);
        let thread = add_email(thread, &email(tid, "Jordan Lee", "Acme Tax", "Re: Hi", false));
        assert!(thread.unread);
    }

    #[test]
    fn firm_only_thread_starts_unread() {
        let tid = Uuid::new_v4();
        let emails = vec![
            email(tid, "Acme Tax", "Jordan Lee", "Engagement letter", true),
            email(tid, "Acme Tax", "Jordan Lee", "Re: Engagement letter", true),
        ];
        let thread = thread_for(Uuid::new_v4(), &emails).unwrap();
        assert!(thread.unread);
        assert!(!mark_read(thread).unread);
    }

    #[test]
    fn replies_share_a_thread_key() {
        let a = email(Uuid::new_v4(), "Jordan Lee", "Acme Tax", "Extension", false);
        let b = email(Uuid::new_v4(), "Acme Tax", "Jordan Lee", "RE: Fwd: extension", true);
        assert_eq!(ThreadKey::of(&a), ThreadKey::of(&b));

        let threads = group_into_threads(Uuid::new_v4(), &[a.clone(), b]);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].id, a.thread_id);
        assert_eq!(threads[0].email_count, 2);
    }

    #[test]
    fn search_and_star() {
        let tid = Uuid::new_v4();
        let thread = thread_for(Uuid::new_v4(), &[email(tid, "Jordan Lee", "Acme Tax", "Payroll question", false)]).unwrap();
        let thread = toggle_star(thread);
        assert!(thread.is_starred);
        let threads = vec![thread];
        assert_eq!(search(&threads, "payroll").len(), 1);
        assert_eq!(search(&threads, "jordan").len(), 1);
        assert!(search(&threads, "invoice").is_empty());
    }

    #[test]
    fn long_previews_are_cut() {
        let body = "word ".repeat(60);
        let preview = preview_of(&body);
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= PREVIEW_CHARS + 3);
    }
}
