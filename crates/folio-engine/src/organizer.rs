//! Intake organizers: derived progress and lifecycle helpers.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_types::models::{Organizer, OrganizerStatus};

use crate::error::EngineError;
use crate::filter::Filterable;
use crate::sort::{SortKey, Sortable};

/// `round(100 * answered_required / required)`, or 0 with nothing required.
/// Halves round up.
pub fn progress(organizer: &Organizer) -> u8 {
    let (required, answered) = organizer
        .sections
        .iter()
        .flat_map(|s| s.questions.iter())
        .filter(|q| q.required)
        .fold((0u64, 0u64), |(r, a), q| (r + 1, a + u64::from(q.is_answered())));
    if required == 0 {
        return 0;
    }
    ((200 * answered + required) / (2 * required)) as u8
}

/// Sets (or with a blank answer, clears) one answer. A not-started
/// organizer moves to in-progress.
pub fn answer_question(
    organizer: &Organizer,
    question_id: &str,
    answer: &str,
    today: chrono::NaiveDate,
) -> Result<Organizer, EngineError> {
    let mut next = organizer.clone();
    let question = next
        .sections
        .iter_mut()
        .flat_map(|s| s.questions.iter_mut())
        .find(|q| q.id == question_id)
        .ok_or_else(|| EngineError::QuestionNotFound(question_id.to_string()))?;
    question.answer = if answer.trim().is_empty() {
        None
    } else {
        Some(answer.to_string())
    };
    if next.status == OrganizerStatus::NotStarted {
        next.status = OrganizerStatus::InProgress;
    }
    next.last_updated = today;
    Ok(next)
}

pub fn mark_sent(organizer: &Organizer, today: chrono::NaiveDate) -> Organizer {
    let mut next = organizer.clone();
    next.status = OrganizerStatus::Sent;
    next.sent_date = Some(today);
    next.last_updated = today;
    next
}

pub fn mark_received(organizer: &Organizer, today: chrono::NaiveDate) -> Organizer {
    let mut next = organizer.clone();
    next.status = OrganizerStatus::Received;
    next.received_date = Some(today);
    next.last_updated = today;
    next
}

/// Copy with a fresh id, answers cleared and the lifecycle reset.
pub fn duplicate(organizer: &Organizer, today: chrono::NaiveDate) -> Organizer {
    let mut copy = organizer.clone();
    copy.id = Uuid::new_v4();
    copy.name = format!("{} (Copy)", organizer.name);
    copy.status = OrganizerStatus::NotStarted;
    copy.created_date = today;
    copy.last_updated = today;
    copy.sent_date = None;
    copy.received_date = None;
    for question in copy.sections.iter_mut().flat_map(|s| s.questions.iter_mut()) {
        question.answer = None;
    }
    copy
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizerField {
    Name,
    Type,
    Status,
    Progress,
    LastUpdated,
}

impl Sortable<OrganizerField> for Organizer {
    fn sort_key(&self, field: OrganizerField) -> SortKey {
        match field {
            OrganizerField::Name => SortKey::text(&self.name),
            OrganizerField::Type => SortKey::text(self.kind.as_str()),
            OrganizerField::Status => SortKey::text(self.status.as_str()),
            OrganizerField::Progress => SortKey::Int(i64::from(progress(self))),
            OrganizerField::LastUpdated => SortKey::Date(self.last_updated),
        }
    }
}

/// Search by name; type and status filters are exact.
impl Filterable for Organizer {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.last_updated.and_time(NaiveTime::MIN).and_utc())
    }

    fn matches_category(&self, category: &str) -> Option<bool> {
        Some(self.kind.as_str() == category)
    }

    fn status_key(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use folio_types::models::{OrganizerKind, Question, QuestionKind, Section};

    fn question(id: &str, required: bool, answer: Option<&str>) -> Question {
        Question {
            id: id.into(),
            prompt: format!("Question {}", id),
            kind: QuestionKind::Text,
            required,
            answer: answer.map(String::from),
            options: vec![],
            help_text: None,
        }
    }

    fn organizer(questions: Vec<Question>) -> Organizer {
        let day = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        Organizer {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            name: "2025 Individual Tax Organizer".into(),
            kind: OrganizerKind::Tax,
            status: OrganizerStatus::NotStarted,
            last_updated: day,
            created_date: day,
            sent_date: None,
            received_date: None,
            due_date: None,
            year: Some(2025),
            sections: vec![Section {
                id: "s1".into(),
                title: "Income".into(),
                description: None,
                questions,
            }],
            notes: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 14).unwrap()
    }

    #[test]
    fn progress_rounds_half_up() {
        let org = organizer(vec![
            question("a", true, Some("yes")),
            question("b", true, None),
            question("c", true, None),
            question("d", true, None),
            question("e", true, None),
            question("f", true, None),
            question("g", true, None),
            question("h", true, None),
        ]);
        assert_eq!(progress(&org), 13);
    }

    #[test]
    fn no_required_questions_is_zero() {
        let org = organizer(vec![question("a", false, Some("x"))]);
        assert_eq!(progress(&org), 0);
    }

    #[test]
    fn answering_moves_to_in_progress() {
        let org = organizer(vec![question("a", true, None), question("b", true, None)]);
        let org = answer_question(&org, "a", "W-2 attached", today()).unwrap();
        assert_eq!(org.status, OrganizerStatus::InProgress);
        assert_eq!(org.last_updated, today());
        assert_eq!(progress(&org), 50);

        let org = answer_question(&org, "a", "   ", today()).unwrap();
        assert_eq!(progress(&org), 0);

        assert_eq!(
            answer_question(&org, "zz", "x", today()),
            Err(EngineError::QuestionNotFound("zz".into()))
        );
    }

    #[test]
    fn sent_and_received_stamp_dates() {
        let org = mark_sent(&organizer(vec![]), today());
        assert_eq!(org.status, OrganizerStatus::Sent);
        assert_eq!(org.sent_date, Some(today()));
        let org = mark_received(&org, today());
        assert_eq!(org.status, OrganizerStatus::Received);
        assert_eq!(org.received_date, Some(today()));
    }

    #[test]
    fn duplicate_clears_answers() {
        let org = mark_sent(&organizer(vec![question("a", true, Some("done"))]), today());
        let copy = duplicate(&org, today());
        assert_ne!(copy.id, org.id);
        assert_eq!(copy.status, OrganizerStatus::NotStarted);
        assert_eq!(copy.sent_date, None);
        assert_eq!(progress(&copy), 0);
        assert_eq!(progress(&org), 100);
    }
}
