//! HTTP feed against a mock conference API.

mod support;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use progpdf::config::{FeedSettings, ProgrammeConfig};
use progpdf::feed::{HttpFeed, ScheduleFeed};
use progpdf::models::TalkId;
use progpdf::services::{compose_document, DocumentKind, RenderContext};
use progpdf::ProgrammeError;

use support::{DETAILS_JSON, FEED_JSON};

fn settings(server: &MockServer, bulk: bool) -> FeedSettings {
    FeedSettings {
        schedule_url: format!("{}/programme", server.uri()),
        detail_url_template: format!("{}/accepted/talk/{{id}}", server.uri()),
        bulk_detail_url: bulk.then(|| format!("{}/accepted/talks", server.uri())),
        schedule_file: None,
        detail_file: None,
    }
}

async fn mount_schedule(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/programme"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED_JSON))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetches_and_parses_schedule() {
    let server = MockServer::start().await;
    mount_schedule(&server).await;

    let feed = HttpFeed::new(&settings(&server, false)).unwrap();
    let schedule = feed.fetch_schedule().await.unwrap();

    assert_eq!(schedule.days.len(), 1);
    assert_eq!(schedule.talk_count(), 3);
    let quickie = schedule.talk(&TalkId::new("3")).unwrap();
    assert_eq!(quickie.track, "track2");
    assert_eq!(quickie.start.to_string(), "10:00");
}

#[tokio::test]
async fn test_server_error_on_schedule_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/programme"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let feed = HttpFeed::new(&settings(&server, false)).unwrap();
    let err = feed.fetch_schedule().await.unwrap_err();
    assert!(matches!(err, ProgrammeError::Feed(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_schedule_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/programme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"programme\": {}}"))
        .mount(&server)
        .await;

    let feed = HttpFeed::new(&settings(&server, false)).unwrap();
    assert!(matches!(
        feed.fetch_schedule().await,
        Err(ProgrammeError::Parse(_))
    ));
}

#[tokio::test]
async fn test_missing_or_null_detail_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accepted/talk/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id": "1", "title": "Rust in production", "description": "",
                "speakers": [{"fullname": "Ada Lovelace"}]}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accepted/talk/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accepted/talk/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let feed = HttpFeed::new(&settings(&server, false)).unwrap();
    let found = feed.fetch_detail(&TalkId::new("1")).await.unwrap().unwrap();
    assert_eq!(found.speaker_names().collect::<Vec<_>>(), vec!["Ada Lovelace"]);
    assert!(feed.fetch_detail(&TalkId::new("2")).await.unwrap().is_none());
    assert!(feed.fetch_detail(&TalkId::new("3")).await.unwrap().is_none());

    let ids = [TalkId::new("1"), TalkId::new("2"), TalkId::new("3")];
    let cache = feed.fetch_all_details(&ids).await.unwrap();
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_bulk_details_are_filtered_to_requested_talks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accepted/talks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAILS_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let feed = HttpFeed::new(&settings(&server, true)).unwrap();
    let cache = feed.fetch_all_details(&[TalkId::new("3")]).await.unwrap();

    assert_eq!(cache.len(), 1);
    let detail = cache.get(&TalkId::new("3")).unwrap();
    assert_eq!(detail.description, "");
    assert_eq!(detail.speaker_names().collect::<Vec<_>>(), vec!["Grace Hopper"]);
}

#[tokio::test]
async fn test_render_context_loads_everything_from_the_feed() {
    let server = MockServer::start().await;
    mount_schedule(&server).await;
    Mock::given(method("GET"))
        .and(path("/accepted/talks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAILS_JSON))
        .mount(&server)
        .await;

    let feed = HttpFeed::new(&settings(&server, true)).unwrap();
    let ctx = RenderContext::load(&feed, ProgrammeConfig::default())
        .await
        .unwrap();
    assert_eq!(ctx.details.len(), 2);
    assert_eq!(ctx.index.dates(), vec!["10/06/2015"]);

    let doc = compose_document(&ctx, DocumentKind::FullProgramme).unwrap();
    let texts = doc.texts();
    assert!(texts.contains(&"Rust in production"));
    assert!(texts.contains(&"Présenté par :"));
    // Talk 2 has no detail and is left out of the detail section
    assert_eq!(texts.iter().filter(|t| **t == "Async all the things").count(), 1);
}
