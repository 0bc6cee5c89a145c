// Integration tests for the Eventola API
// Run with: cargo test --test integration_test -- --ignored
// Requires a running server (DATABASE_URL provisioned, eventola-api listening)

use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};

const API_BASE_URL: &str = "http://localhost:9000";

fn unique_email(prefix: &str) -> String {
    format!("{}+{}@example.com", prefix, uuid::Uuid::new_v4())
}

/// One parsed server-sent event
#[derive(Debug, Default)]
struct SseMessage {
    event: String,
    data: String,
    id: String,
}

/// Read the next non-comment SSE message from a byte stream, buffering
/// partial frames across chunks
async fn next_sse_message<S>(stream: &mut S, buf: &mut String) -> SseMessage
where
    S: futures::Stream<Item = reqwest::Result<bytes::Bytes>> + Unpin,
{
    loop {
        while let Some(frame_end) = buf.find("\n\n") {
            let frame: String = buf.drain(..frame_end + 2).collect();
            let mut message = SseMessage::default();
            let mut has_fields = false;
            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("event:") {
                    message.event = rest.trim().to_string();
                    has_fields = true;
                } else if let Some(rest) = line.strip_prefix("data:") {
                    message.data = rest.trim().to_string();
                    has_fields = true;
                } else if let Some(rest) = line.strip_prefix("id:") {
                    message.id = rest.trim().to_string();
                    has_fields = true;
                }
                // Lines starting with ':' are keep-alive comments
            }
            if has_fields {
                return message;
            }
        }

        let chunk = tokio::time::timeout(Duration::from_secs(10), stream.next())
            .await
            .expect("timed out waiting for SSE data")
            .expect("SSE stream ended unexpectedly")
            .expect("SSE stream errored");
        buf.push_str(&String::from_utf8_lossy(&chunk));
    }
}

/// Register a fresh account and create a published event, returning the
/// signed-in client and the event id
async fn create_published_event(title_prefix: &str) -> (reqwest::Client, String) {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client");

    let register_response = client
        .post(format!("{}/v1/auth/register", API_BASE_URL))
        .json(&json!({
            "email": unique_email(title_prefix),
            "name": "Test Organizer",
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(register_response.status(), 201);

    let create_response = client
        .post(format!("{}/v1/events", API_BASE_URL))
        .json(&json!({
            "title": format!("{} {}", title_prefix, uuid::Uuid::new_v4()),
            "description": "An event created by the integration test suite.",
            "location": "Integration Test Hall",
            "date": "2026-12-01",
            "start_time": "18:00",
            "end_time": "21:00",
            "status": "published",
            "theme": "minimal",
            "is_public": true
        }))
        .send()
        .await
        .expect("Failed to create event");
    assert_eq!(create_response.status(), 201);

    let event: Value = create_response.json().await.expect("Failed to parse event");
    let event_id = event["id"].as_str().expect("event id").to_string();
    (client, event_id)
}

#[tokio::test]
#[ignore]
async fn test_full_event_workflow() {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client");

    println!("🧪 Testing full event workflow...");

    // Step 1: Register an organizer account
    println!("\n📝 Step 1: Registering account...");
    let email = unique_email("organizer");
    let register_response = client
        .post(format!("{}/v1/auth/register", API_BASE_URL))
        .json(&json!({
            "email": email,
            "name": "Test Organizer",
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(register_response.status(), 201);

    let me_response = client
        .get(format!("{}/v1/auth/me", API_BASE_URL))
        .send()
        .await
        .expect("Failed to call me");
    assert_eq!(me_response.status(), 200);
    println!("✅ Registered and session cookie works");

    // Step 2: Create an event
    println!("\n📅 Step 2: Creating event...");
    let title = format!("Workflow Test {}", uuid::Uuid::new_v4());
    let create_response = client
        .post(format!("{}/v1/events", API_BASE_URL))
        .json(&json!({
            "title": title,
            "description": "An event created by the integration test suite.",
            "location": "Integration Test Hall",
            "date": "2026-12-01",
            "start_time": "18:00",
            "end_time": "21:00",
            "status": "published",
            "theme": "quantum",
            "is_public": true
        }))
        .send()
        .await
        .expect("Failed to create event");
    assert_eq!(create_response.status(), 201);

    let event: Value = create_response.json().await.expect("Failed to parse event");
    let event_id = event["id"].as_str().expect("event id").to_string();
    let slug = event["slug"].as_str().expect("event slug").to_string();
    println!("✅ Created event {} ({})", event_id, slug);

    // Step 3: Creating the same title again collides on the slug
    println!("\n🚫 Step 3: Checking slug collision...");
    let dup_response = client
        .post(format!("{}/v1/events", API_BASE_URL))
        .json(&json!({
            "title": title,
            "description": "Duplicate title should collide on the slug.",
            "location": "Integration Test Hall",
            "date": "2026-12-02",
            "start_time": "18:00",
            "end_time": "21:00",
            "status": "draft",
            "theme": "minimal"
        }))
        .send()
        .await
        .expect("Failed to post duplicate");
    assert_eq!(dup_response.status(), 409);
    println!("✅ Duplicate slug rejected");

    // Step 4: Public microsite lookup
    println!("\n🌐 Step 4: Fetching microsite payload...");
    let site_response = client
        .get(format!("{}/v1/events/{}", API_BASE_URL, slug))
        .send()
        .await
        .expect("Failed to fetch microsite");
    assert_eq!(site_response.status(), 200);
    let site: Value = site_response.json().await.expect("Failed to parse microsite");
    assert_eq!(site["rsvp_count"], 0);
    println!("✅ Microsite payload fetched");

    // Step 5: Anonymous RSVP
    println!("\n🎟️  Step 5: Submitting RSVP...");
    let anon = reqwest::Client::new();
    let rsvp_response = anon
        .post(format!("{}/v1/events/{}/rsvps", API_BASE_URL, event_id))
        .json(&json!({
            "name": "Test Attendee",
            "email": unique_email("attendee")
        }))
        .send()
        .await
        .expect("Failed to RSVP");
    assert_eq!(rsvp_response.status(), 201);
    let rsvp: Value = rsvp_response.json().await.expect("Failed to parse RSVP");
    let ticket_id = rsvp["ticket_id"].as_str().expect("ticket id").to_string();
    assert_eq!(rsvp["sequence"], 1);
    println!("✅ RSVP created, ticket {}", ticket_id);

    // Step 6: Counter reflects the reservation
    println!("\n🔢 Step 6: Checking counter...");
    let count_response = anon
        .get(format!(
            "{}/v1/events/{}/rsvps/count",
            API_BASE_URL, event_id
        ))
        .send()
        .await
        .expect("Failed to fetch count");
    assert_eq!(count_response.status(), 200);
    let count: Value = count_response.json().await.expect("Failed to parse count");
    assert_eq!(count["count"], 1);
    println!("✅ Counter shows 1");

    // Step 7: Ticket lookup with QR url
    println!("\n🎫 Step 7: Fetching ticket...");
    let ticket_response = anon
        .get(format!("{}/v1/tickets/{}", API_BASE_URL, ticket_id))
        .send()
        .await
        .expect("Failed to fetch ticket");
    assert_eq!(ticket_response.status(), 200);
    let ticket: Value = ticket_response.json().await.expect("Failed to parse ticket");
    assert!(ticket["qr_url"]
        .as_str()
        .unwrap()
        .starts_with("https://api.qrserver.com/"));
    println!("✅ Ticket fetched with QR url");

    // Step 8: Discover lists the published event
    println!("\n🔎 Step 8: Discovering public events...");
    let discover_response = anon
        .get(format!("{}/v1/discover?q={}", API_BASE_URL, "workflow"))
        .send()
        .await
        .expect("Failed to discover");
    assert_eq!(discover_response.status(), 200);
    let listing: Value = discover_response.json().await.expect("Failed to parse listing");
    let found = listing["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["slug"] == slug.as_str());
    assert!(found, "created event should appear in discover results");
    println!("✅ Event visible in discover");

    println!("\n🎉 Full workflow complete!");
}

#[tokio::test]
#[ignore]
async fn test_demo_event_is_always_available() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/events/demo-event", API_BASE_URL))
        .send()
        .await
        .expect("Failed to fetch demo event");
    assert_eq!(response.status(), 200);

    let demo: Value = response.json().await.expect("Failed to parse demo event");
    assert_eq!(demo["slug"], "demo-event");
    assert_eq!(demo["rsvp_count"], 1337);
}

#[tokio::test]
#[ignore]
async fn test_unknown_slug_is_404() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!(
            "{}/v1/events/no-such-event-{}",
            API_BASE_URL,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .expect("Failed to fetch");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_validation_errors_are_field_level() {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client");

    client
        .post(format!("{}/v1/auth/register", API_BASE_URL))
        .json(&json!({
            "email": unique_email("validator"),
            "name": "Validator",
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to register");

    let response = client
        .post(format!("{}/v1/events", API_BASE_URL))
        .json(&json!({
            "title": "ab",
            "description": "too short",
            "location": "x",
            "date": "2026-12-01",
            "start_time": "25:99",
            "end_time": "18:00",
            "status": "draft",
            "theme": "minimal"
        }))
        .send()
        .await
        .expect("Failed to post invalid event");
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse errors");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"description"));
    assert!(fields.contains(&"start_time"));
}

#[tokio::test]
#[ignore]
async fn test_live_counter_snapshot_and_replay() {
    let (client, event_id) = create_published_event("live-counter").await;

    // Open the live stream before any RSVPs exist
    let response = client
        .get(format!(
            "{}/v1/events/{}/rsvps/live",
            API_BASE_URL, event_id
        ))
        .send()
        .await
        .expect("Failed to open live stream");
    assert_eq!(response.status(), 200);
    let mut stream = response.bytes_stream();
    let mut buf = String::new();

    let snapshot = next_sse_message(&mut stream, &mut buf).await;
    assert_eq!(snapshot.event, "rsvp.count");
    assert_eq!(snapshot.id, "0");
    let data: Value = serde_json::from_str(&snapshot.data).expect("snapshot data");
    assert_eq!(data["count"], 0);
    assert_eq!(data["sequence"], 0);

    // Submit an RSVP while the stream is open
    let rsvp_response = client
        .post(format!("{}/v1/events/{}/rsvps", API_BASE_URL, event_id))
        .json(&json!({
            "name": "Live Attendee",
            "email": unique_email("live-attendee")
        }))
        .send()
        .await
        .expect("Failed to RSVP");
    assert_eq!(rsvp_response.status(), 201);

    let created = next_sse_message(&mut stream, &mut buf).await;
    assert_eq!(created.event, "rsvp.created");
    assert_eq!(created.id, "1");
    let data: Value = serde_json::from_str(&created.data).expect("created data");
    assert_eq!(data["event_id"].as_str(), Some(event_id.as_str()));
    drop(stream);

    // Reconnecting with ?offset=0 replays the missed entry after the snapshot
    let response = client
        .get(format!(
            "{}/v1/events/{}/rsvps/live?offset=0",
            API_BASE_URL, event_id
        ))
        .send()
        .await
        .expect("Failed to reconnect");
    assert_eq!(response.status(), 200);
    let mut stream = response.bytes_stream();
    let mut buf = String::new();

    let snapshot = next_sse_message(&mut stream, &mut buf).await;
    assert_eq!(snapshot.event, "rsvp.count");
    assert_eq!(snapshot.id, "1");
    let data: Value = serde_json::from_str(&snapshot.data).expect("snapshot data");
    assert_eq!(data["count"], 1);

    let replayed = next_sse_message(&mut stream, &mut buf).await;
    assert_eq!(replayed.event, "rsvp.created");
    assert_eq!(replayed.id, "1");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_rsvps_get_distinct_sequences() {
    let (client, event_id) = create_published_event("concurrent-rsvp").await;

    let posts = (0..5).map(|i| {
        let client = client.clone();
        let event_id = event_id.clone();
        async move {
            client
                .post(format!("{}/v1/events/{}/rsvps", API_BASE_URL, event_id))
                .json(&json!({
                    "name": format!("Attendee {}", i),
                    "email": unique_email("concurrent")
                }))
                .send()
                .await
                .expect("Failed to RSVP")
        }
    });
    let responses = futures::future::join_all(posts).await;

    let mut sequences = Vec::new();
    for response in responses {
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse RSVP");
        sequences.push(body["sequence"].as_i64().expect("sequence"));
    }
    sequences.sort_unstable();
    assert_eq!(sequences, vec![1, 2, 3, 4, 5]);

    let count_response = client
        .get(format!(
            "{}/v1/events/{}/rsvps/count",
            API_BASE_URL, event_id
        ))
        .send()
        .await
        .expect("Failed to fetch count");
    let count: Value = count_response.json().await.expect("Failed to parse count");
    assert_eq!(count["count"], 5);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_same_title_creates_one_event() {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client");

    client
        .post(format!("{}/v1/auth/register", API_BASE_URL))
        .json(&json!({
            "email": unique_email("racer"),
            "name": "Racer",
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to register");

    let body = json!({
        "title": format!("Duplicate Slug Race {}", uuid::Uuid::new_v4()),
        "description": "Two simultaneous submissions of the same title.",
        "location": "Race Condition Hall",
        "date": "2026-12-01",
        "start_time": "18:00",
        "end_time": "21:00",
        "status": "draft",
        "theme": "minimal",
        "is_public": false
    });

    let post = |body: Value| {
        let client = client.clone();
        async move {
            client
                .post(format!("{}/v1/events", API_BASE_URL))
                .json(&body)
                .send()
                .await
                .expect("Failed to create event")
                .status()
                .as_u16()
        }
    };
    let (first, second) = tokio::join!(post(body.clone()), post(body));

    let mut statuses = [first, second];
    statuses.sort_unstable();
    assert_eq!(statuses, [201, 409]);
}
