use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, FixedOffset, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use folio_api::{AppState, AppStateInner, Dispatcher};
use folio_db::Database;
use folio_types::events::EngineEvent;
use folio_types::models::{
    ActivityCategory, ActivityEvent, ActivityKind, Actor, BillingCategory, Channel, ChannelKind,
    Email, EventStatus, EventTime, ExtendedDetails, Message, TrackingState, Urgency,
};

fn state() -> AppState {
    state_at(FixedOffset::east_opt(0).unwrap())
}

fn state_at(utc_offset: FixedOffset) -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        dispatcher: Dispatcher::new(),
        utc_offset,
        page_limit: 50,
    })
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    send(folio_api::router(state.clone()), "GET", uri, None).await
}

async fn post(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    send(folio_api::router(state.clone()), "POST", uri, Some(body)).await
}

fn activity(client_id: Uuid, kind: ActivityKind, action: &str, at: impl Into<EventTime>) -> ActivityEvent {
    let mut e = ActivityEvent::new(kind, Actor::new("Sarah Johnson", "SJ"), action, at, ActivityCategory::Communication);
    e.client_id = Some(client_id);
    e
}

fn seed_channel(state: &AppState, client_id: Uuid, kind: ChannelKind) -> Channel {
    let channel = Channel {
        id: Uuid::new_v4(),
        client_id,
        kind,
        name: kind.as_str().into(),
        unread_count: 2,
        participants: vec![],
        phone_number: None,
        email: None,
    };
    state.db.upsert_channel(&channel).unwrap();
    channel
}

fn seed_message(state: &AppState, channel_id: Uuid) -> Message {
    let message = Message {
        id: Uuid::new_v4(),
        channel_id,
        sender: "Jordan Lee".into(),
        sender_initials: "JL".into(),
        content: "IRS notice came in for the 2023 return".into(),
        timestamp: "9:00 AM".into(),
        sent_at: Utc::now().into(),
        urgency: Urgency::Normal,
        assigned_to: None,
        is_pinned: false,
        attachments: vec![],
        read_by: vec![],
    };
    state.db.upsert_message(&message).unwrap();
    message
}

#[tokio::test]
async fn health_reports_ok() {
    let state = state();
    let (status, body) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn activity_timeline_groups_and_reports_exclusions() {
    let state = state();
    let client = Uuid::new_v4();
    let now = Utc::now();
    let recent = activity(client, ActivityKind::EmailSent, "Sent engagement letter", now);
    let older = activity(client, ActivityKind::PhoneCallOutbound, "Called about estimates", now - Duration::days(3));
    let broken = activity(client, ActivityKind::parse("fax-received"), "Fax", EventTime::parse("not a date"));
    for e in [&recent, &older, &broken] {
        state.db.insert_activity(e).unwrap();
    }

    let (status, body) = get(&state, &format!("/clients/{}/activity", client)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["matched"], 3);

    let groups = body["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["key"], "today");
    assert_eq!(groups[0]["label"], "Today");
    assert_eq!(groups[0]["records"][0]["id"], recent.id.to_string());
    assert_eq!(groups[1]["records"][0]["id"], older.id.to_string());
    assert_eq!(body["excluded"], json!([broken.id.to_string()]));
}

#[tokio::test]
async fn activity_filters_and_reports_empty_state() {
    let state = state();
    let client = Uuid::new_v4();
    state
        .db
        .insert_activity(&activity(client, ActivityKind::EmailSent, "Sent engagement letter", Utc::now()))
        .unwrap();

    let (_, body) = get(&state, &format!("/clients/{}/activity?categories=call", client)).await;
    assert_eq!(body["matched"], 0);
    assert_eq!(body["empty_state"]["kind"], "no-matches");

    let (_, body) = get(&state, &format!("/clients/{}/activity?search=engagement&categories=email,call", client)).await;
    assert_eq!(body["matched"], 1);
    assert!(body.get("empty_state").is_none());

    let (_, body) = get(&state, &format!("/clients/{}/activity", Uuid::new_v4())).await;
    assert_eq!(body["empty_state"]["kind"], "no-records");
}

#[tokio::test]
async fn activity_pages_follow_the_cursor() {
    let state = state();
    let client = Uuid::new_v4();
    let now = Utc::now();
    for i in 0..3 {
        let e = activity(client, ActivityKind::Login, "Logged in", now - Duration::minutes(i));
        state.db.insert_activity(&e).unwrap();
    }

    let (_, first) = get(&state, &format!("/clients/{}/activity?limit=2", client)).await;
    let cursor = first["next_cursor"].as_str().unwrap().to_string();
    assert_eq!(first["groups"][0]["records"].as_array().unwrap().len(), 2);

    let (_, second) = get(&state, &format!("/clients/{}/activity?limit=2&cursor={}", client, cursor)).await;
    assert_eq!(second["groups"][0]["records"].as_array().unwrap().len(), 1);
    assert!(second.get("next_cursor").is_none());

    let (status, _) = get(&state, &format!("/clients/{}/activity?cursor=garbage", client)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_chips_carry_counts() {
    let state = state();
    let client = Uuid::new_v4();
    state
        .db
        .insert_activity(&activity(client, ActivityKind::EmailReceived, "Reply from client", Utc::now()))
        .unwrap();

    let (status, body) = get(&state, &format!("/clients/{}/activity/categories", client)).await;
    assert_eq!(status, StatusCode::OK);
    let email = body
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["key"] == "email")
        .unwrap();
    assert_eq!(email["count"], 1);
}

#[tokio::test]
async fn escalation_commits_and_broadcasts() {
    let state = state();
    let mut events = state.dispatcher.subscribe();
    let client = Uuid::new_v4();
    let channel = seed_channel(&state, client, ChannelKind::InternalDiscussion);
    let message = seed_message(&state, channel.id);

    let (status, body) = post(
        &state,
        &format!("/messages/{}/urgency", message.id),
        json!({ "level": "critical", "assignee": "Mike Chen" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urgency"], "critical");
    assert_eq!(body["assigned_to"], "Mike Chen");

    match events.try_recv().unwrap() {
        EngineEvent::UrgencyChanged { message_id, urgency, .. } => {
            assert_eq!(message_id, message.id);
            assert_eq!(urgency, Urgency::Critical);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let (status, body) = post(&state, &format!("/messages/{}/resolve", message.id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urgency"], "normal");
    assert_eq!(body["assigned_to"], "Mike Chen");
}

#[tokio::test]
async fn cancelled_prompt_changes_nothing() {
    let state = state();
    let mut events = state.dispatcher.subscribe();
    let channel = seed_channel(&state, Uuid::new_v4(), ChannelKind::InternalDiscussion);
    let message = seed_message(&state, channel.id);

    let (status, body) = post(&state, &format!("/messages/{}/urgency", message.id), json!({ "level": "next-block" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urgency"], "normal");
    assert!(events.try_recv().is_err());
    assert_eq!(state.db.get_message(message.id).unwrap().unwrap(), message);
}

#[tokio::test]
async fn urgency_is_refused_outside_internal_discussion() {
    let state = state();
    let channel = seed_channel(&state, Uuid::new_v4(), ChannelKind::Sms);
    let message = seed_message(&state, channel.id);

    let (status, _) = post(
        &state,
        &format!("/messages/{}/urgency", message.id),
        json!({ "level": "critical", "assignee": "Mike Chen" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post(&state, &format!("/messages/{}/urgency", Uuid::new_v4()), json!({ "level": "critical" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messages_list_by_kind_with_channels() {
    let state = state();
    let client = Uuid::new_v4();
    let internal = seed_channel(&state, client, ChannelKind::InternalDiscussion);
    seed_channel(&state, client, ChannelKind::Email);
    seed_message(&state, internal.id);

    let (_, body) = get(&state, &format!("/clients/{}/channels", client)).await;
    assert_eq!(body["channels"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_unread"], 4);

    let (status, body) = get(&state, &format!("/clients/{}/channels/internal-discussion/messages", client)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert!(body["items"][0]["display_time"].is_string());
}

#[tokio::test]
async fn callback_lifecycle() {
    let state = state();
    let client = Uuid::new_v4();
    let (status, created) = post(
        &state,
        &format!("/clients/{}/callbacks", client),
        json!({
            "client_name": "Acme Holdings",
            "scheduled_date": "2025-10-20",
            "assigned_by": "Sarah Johnson",
            "priority": "high",
            "message": "Call back about the extension"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "open");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, done) = post(&state, &format!("/callbacks/{}/status", id), json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");
    assert!(done["completion_date"].is_string());

    let (status, _) = post(&state, &format!("/callbacks/{}/status", id), json!({ "status": "open" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(&state, &format!("/callbacks/{}/assign", id), json!({ "assigned_to": "Mike Chen" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, open) = get(&state, &format!("/clients/{}/callbacks?status=open", client)).await;
    assert!(open["items"].as_array().unwrap().is_empty());
    let (_, all) = get(&state, &format!("/clients/{}/callbacks?priority=high", client)).await;
    assert_eq!(all["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn active_callbacks_leave_out_completed() {
    let state = state();
    let client = Uuid::new_v4();
    let mut ids = Vec::new();
    for message in ["Extension question", "Estimated payments"] {
        let (_, created) = post(
            &state,
            &format!("/clients/{}/callbacks", client),
            json!({
                "client_name": "Acme Holdings",
                "scheduled_date": "2025-10-20",
                "assigned_by": "Sarah Johnson",
                "priority": "medium",
                "message": message
            }),
        )
        .await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }
    let (status, _) = post(&state, &format!("/callbacks/{}/status", ids[0]), json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, active) = get(&state, &format!("/clients/{}/callbacks?active=true", client)).await;
    let items = active["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], ids[1].as_str());

    let (_, all) = get(&state, &format!("/clients/{}/callbacks", client)).await;
    assert_eq!(all["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_request_fields_are_rejected() {
    let state = state();
    let (status, _) = post(
        &state,
        &format!("/callbacks/{}/status", Uuid::new_v4()),
        json!({ "status": "completed", "note": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

fn invoice(state: &AppState) -> ActivityEvent {
    let mut e = ActivityEvent::new(
        ActivityKind::InvoiceCreated,
        Actor::system(),
        "Invoice #1042 created",
        Utc::now(),
        ActivityCategory::Financial,
    );
    e.billing_category = Some(BillingCategory::Invoice);
    e.client_name = Some("Acme Holdings".into());
    e.status = Some(EventStatus::Success);
    e.tracking = Some(TrackingState::for_invoice());
    state.db.insert_billing_event(&e).unwrap();
    e
}

#[tokio::test]
async fn tracking_receipts_accumulate() {
    let state = state();
    let e = invoice(&state);
    let at = Utc::now();

    let (status, body) = post(
        &state,
        &format!("/records/{}/tracking", e.id),
        json!({ "kind": "view", "at": at }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracking"]["view"]["count"], 1);

    let (_, body) = post(
        &state,
        &format!("/records/{}/tracking", e.id),
        json!({ "kind": "view", "at": at - Duration::hours(1) }),
    )
    .await;
    assert_eq!(body["tracking"]["view"]["count"], 2);
    assert_eq!(body["status"]["state"], "badges");

    let (status, _) = post(&state, &format!("/records/{}/tracking", e.id), json!({ "kind": "open", "at": at })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post(&state, &format!("/records/{}/tracking", Uuid::new_v4()), json!({ "kind": "view", "at": at })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn billing_log_has_buckets_and_stats() {
    let state = state();
    invoice(&state);
    let mut paid = ActivityEvent::new(
        ActivityKind::PaymentSuccess,
        Actor::system(),
        "Payment received",
        Utc::now(),
        ActivityCategory::Financial,
    );
    paid.billing_category = Some(BillingCategory::Subscription);
    paid.status = Some(EventStatus::Success);
    paid.extended_details = Some(ExtendedDetails {
        amount: Some("$1,250.00".into()),
        ..ExtendedDetails::default()
    });
    state.db.insert_billing_event(&paid).unwrap();

    let (status, body) = get(&state, "/billing/activity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"][0]["key"], "today");
    assert_eq!(body["stats"]["payments_succeeded_today"], 1);
    assert_eq!(body["stats"]["revenue_today_cents"], 125000);

    let (_, body) = get(&state, "/billing/activity?preset=not-seen").await;
    assert_eq!(body["matched"], 1);

    let (_, body) = get(&state, "/billing/activity?category=subscription").await;
    assert_eq!(body["matched"], 1);
    assert_eq!(body["stats"]["payments_succeeded_today"], 1);
}

#[tokio::test]
async fn billing_today_uses_the_firm_calendar() {
    let offset = FixedOffset::east_opt(3600).unwrap();
    let state = state_at(offset);
    // 00:30 firm time is still yesterday in UTC.
    let local_today = Utc::now().with_timezone(&offset).date_naive();
    let at = offset
        .from_local_datetime(&local_today.and_hms_opt(0, 30, 0).unwrap())
        .single()
        .unwrap()
        .with_timezone(&Utc);
    let mut e = ActivityEvent::new(
        ActivityKind::PaymentSuccess,
        Actor::system(),
        "Payment received",
        at,
        ActivityCategory::Financial,
    );
    e.billing_category = Some(BillingCategory::Subscription);
    state.db.insert_billing_event(&e).unwrap();

    let (_, body) = get(&state, "/billing/activity").await;
    assert_eq!(body["groups"][0]["key"], "today");

    let (status, body) = get(&state, "/billing/activity?date_range=today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["groups"][0]["key"], "today");
}

#[tokio::test]
async fn marking_a_thread_read_keeps_its_emails() {
    let state = state();
    let client = Uuid::new_v4();
    let thread_id = Uuid::new_v4();
    for (from, firm) in [("Acme Tax", true), ("Jordan Lee", false)] {
        let email = Email {
            id: Uuid::new_v4(),
            thread_id,
            from: from.into(),
            from_initials: from.chars().take(2).collect(),
            to: vec![],
            cc: vec![],
            subject: "Engagement letter".into(),
            content: "See attached".into(),
            sent_at: EventTime::parse("2025-10-14T09:00:00Z"),
            attachments: vec![],
            is_from_firm: firm,
        };
        state.db.add_email(client, &email).unwrap();
    }

    let (status, body) = post(&state, &format!("/threads/{}/read", thread_id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], false);
    assert_eq!(body["email_count"], 2);

    let (status, _) = post(&state, &format!("/threads/{}/read", Uuid::new_v4()), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
