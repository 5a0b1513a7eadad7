//! Callback message lifecycle.
//!
//! ```text
//! open ──► completed (terminal)
//!  ▲ │
//!  │ ▼
//! not-reached
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use folio_types::api::CreateCallbackRequest;
use folio_types::models::{CallbackMessage, CallbackStatus};

use crate::error::EngineError;

/// Moves a callback to `to`. Completing without a date stamps `today`.
pub fn transition(
    callback: &CallbackMessage,
    to: CallbackStatus,
    completion_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<CallbackMessage, EngineError> {
    use CallbackStatus::*;

    let mut next = callback.clone();
    match (callback.status, to) {
        (Completed, _) => return Err(EngineError::TerminalState(callback.id)),
        (Open, Completed) => {
            next.completion_date = Some(completion_date.unwrap_or(today));
        }
        (Open, NotReached) | (NotReached, Open) => {}
        (from, to) => {
            return Err(EngineError::InvalidTransition {
                from: from.as_str(),
                to: to.as_str(),
            });
        }
    }
    next.status = to;
    Ok(next)
}

pub fn reassign(callback: &CallbackMessage, assignee: &str) -> Result<CallbackMessage, EngineError> {
    if callback.status == CallbackStatus::Completed {
        return Err(EngineError::TerminalState(callback.id));
    }
    let assignee = assignee.trim();
    if assignee.is_empty() {
        return Err(EngineError::EmptyField("assigned_to"));
    }
    let mut next = callback.clone();
    next.assigned_to = Some(assignee.to_string());
    Ok(next)
}

/// Logs a new callback. It always starts open.
pub fn create(
    client_id: Uuid,
    req: CreateCallbackRequest,
    now: DateTime<Utc>,
) -> Result<CallbackMessage, EngineError> {
    if req.message.trim().is_empty() {
        return Err(EngineError::EmptyField("message"));
    }
    if req.client_name.trim().is_empty() {
        return Err(EngineError::EmptyField("client_name"));
    }
    Ok(CallbackMessage {
        id: Uuid::new_v4(),
        client_id,
        client_name: req.client_name,
        scheduled_date: req.scheduled_date,
        completion_date: None,
        assigned_by: req.assigned_by,
        assigned_to: req.assigned_to.filter(|a| !a.trim().is_empty()),
        status: CallbackStatus::Open,
        priority: req.priority,
        message: req.message,
        phone_number: req.phone_number,
        created_at: now.into(),
    })
}

/// Completed callbacks drop out of active views but are never deleted.
pub fn is_active(callback: &CallbackMessage) -> bool {
    callback.status != CallbackStatus::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use folio_types::models::CallbackPriority;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 14).unwrap()
    }

    fn open_callback() -> CallbackMessage {
        let req = CreateCallbackRequest {
            client_name: "Acme Holdings".into(),
            scheduled_date: today(),
            assigned_by: "Mike Chen".into(),
            assigned_to: Some("".into()),
            priority: CallbackPriority::High,
            message: "Call back about the amended return".into(),
            phone_number: Some("(555) 010-2233".into()),
        };
        create(Uuid::new_v4(), req, Utc.with_ymd_and_hms(2025, 10, 14, 9, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn created_open_without_blank_assignee() {
        let cb = open_callback();
        assert_eq!(cb.status, CallbackStatus::Open);
        assert_eq!(cb.assigned_to, None);
        assert!(is_active(&cb));
    }

    #[test]
    fn completing_defaults_the_date() {
        let cb = transition(&open_callback(), CallbackStatus::Completed, None, today()).unwrap();
        assert_eq!(cb.completion_date, Some(today()));
        assert!(!is_active(&cb));

        let explicit = NaiveDate::from_ymd_opt(2025, 10, 12).unwrap();
        let cb = transition(&open_callback(), CallbackStatus::Completed, Some(explicit), today()).unwrap();
        assert_eq!(cb.completion_date, Some(explicit));
    }

    #[test]
    fn reattempt_cycle() {
        let cb = transition(&open_callback(), CallbackStatus::NotReached, None, today()).unwrap();
        let cb = transition(&cb, CallbackStatus::Open, None, today()).unwrap();
        assert_eq!(cb.status, CallbackStatus::Open);
    }

    #[test]
    fn not_reached_cannot_complete_directly() {
        let cb = transition(&open_callback(), CallbackStatus::NotReached, None, today()).unwrap();
        assert_eq!(
            transition(&cb, CallbackStatus::Completed, None, today()),
            Err(EngineError::InvalidTransition {
                from: "not-reached",
                to: "completed"
            })
        );
    }

    #[test]
    fn completed_is_terminal() {
        let cb = transition(&open_callback(), CallbackStatus::Completed, None, today()).unwrap();
        for to in [CallbackStatus::Open, CallbackStatus::NotReached, CallbackStatus::Completed] {
            assert_eq!(transition(&cb, to, None, today()), Err(EngineError::TerminalState(cb.id)));
        }
        assert!(reassign(&cb, "Dana").is_err());
    }

    #[test]
    fn reassign_open_callback() {
        let cb = reassign(&open_callback(), " Dana Ortiz ").unwrap();
        assert_eq!(cb.assigned_to.as_deref(), Some("Dana Ortiz"));
    }
}
