//! Integration tests for ktvlive

use ktvlive::{
    ChannelType, ChannelsClient, ChannelsGateway, CollectingNotifier, CommentPosition,
    CommentSubmission, Error, FetchOutcome, Operation, SessionScope,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a mock LiveChannel JSON value
fn mock_channel_json(nid: u32, sid: u32, channel_type: &str, display: &str, name: &str) -> serde_json::Value {
    json!({
        "id": format!("NID{}-SID{}", nid, sid),
        "display_channel_id": display,
        "network_id": nid,
        "service_id": sid,
        "transport_stream_id": 32736,
        "remocon_id": 1,
        "channel_number": "011",
        "type": channel_type,
        "name": name,
        "jikkyo_force": null,
        "is_subchannel": false,
        "is_radiochannel": false,
        "is_watchable": true,
        "is_display": true,
        "viewer_count": 12,
        "program_present": {
            "id": format!("NID{}-SID{}-EID1", nid, sid),
            "channel_id": format!("NID{}-SID{}", nid, sid),
            "network_id": nid,
            "service_id": sid,
            "event_id": 1,
            "title": "ニュース7",
            "description": "",
            "detail": {},
            "start_time": "2024-04-01T19:00:00+09:00",
            "end_time": "2024-04-01T19:30:00+09:00",
            "duration": 1800.0,
            "is_free": true,
            "genres": [],
            "video_type": null,
            "video_codec": null,
            "video_resolution": null,
            "primary_audio_type": "2/0モード(ステレオ)",
            "primary_audio_language": "日本語",
            "primary_audio_sampling_rate": "48kHz",
            "secondary_audio_type": null,
            "secondary_audio_language": null,
            "secondary_audio_sampling_rate": null
        },
        "program_following": null
    })
}

fn mock_directory_json() -> serde_json::Value {
    json!({
        "GR": [mock_channel_json(32736, 1024, "GR", "gr011", "NHK総合1・東京")],
        "BS": [mock_channel_json(4, 101, "BS", "bs101", "NHK BS")],
        "CS": [],
        "CATV": [],
        "SKY": [],
        "STARDIGIO": []
    })
}

async fn client_for(server: &MockServer) -> ChannelsClient {
    ChannelsClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .timeout(Duration::from_secs(5))
        .build()
        .await
        .unwrap()
}

async fn gateway_for(server: &MockServer) -> (ChannelsGateway, CollectingNotifier) {
    let notifier = CollectingNotifier::new();
    let gateway = ChannelsGateway::with_notifier(client_for(server).await, notifier.clone());
    (gateway, notifier)
}

// ============================================================================
// Directory
// ============================================================================

#[tokio::test]
async fn test_fetch_directory_one_gr_one_bs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_directory_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let directory = gateway.fetch_directory().await.ok().unwrap();

    assert_eq!(directory.bucket(ChannelType::Terrestrial).len(), 1);
    assert_eq!(directory.bucket(ChannelType::Bs).len(), 1);
    assert!(directory.bucket(ChannelType::Cs).is_empty());
    assert!(directory.bucket(ChannelType::Catv).is_empty());
    assert!(directory.bucket(ChannelType::Sky).is_empty());
    assert!(directory.bucket(ChannelType::StarDigio).is_empty());

    for channel in directory.iter() {
        assert_eq!(
            channel.id,
            format!("NID{}-SID{}", channel.network_id, channel.service_id)
        );
    }

    let gr = &directory.terrestrial[0];
    assert_eq!(gr.viewer_count, 12);
    assert_eq!(
        gr.program_present.as_ref().map(|p| p.title.as_str()),
        Some("ニュース7")
    );
    assert!(gr.program_following.is_none());

    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_fetch_directory_server_error_notifies_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/channels"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Mirakurun is not running"})),
        )
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let outcome = gateway.fetch_directory().await;

    assert_eq!(outcome, FetchOutcome::Failed);
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].operation, Operation::FetchDirectory);
    assert_eq!(
        notices[0].message,
        "Failed to retrieve channel information. (HTTP Error 500 / Mirakurun is not running)"
    );
}

#[tokio::test]
async fn test_fetch_directory_rejects_unknown_channel_type() {
    let mock_server = MockServer::start().await;

    let mut directory = mock_directory_json();
    directory["GR"][0]["type"] = json!("RADIO");

    Mock::given(method("GET"))
        .and(path("/api/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(directory))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.fetch_directory().await.unwrap_err();
    assert!(matches!(err, Error::Json(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_fetch_directory_rejects_misfiled_channel() {
    let mock_server = MockServer::start().await;

    let mut directory = mock_directory_json();
    directory["CS"] = json!([mock_channel_json(6, 55, "BS", "bs055", "ショップチャンネル")]);

    Mock::given(method("GET"))
        .and(path("/api/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(directory))
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    assert!(gateway.fetch_directory().await.is_failed());
    assert_eq!(notifier.len(), 1);

    let err = gateway.client().fetch_directory().await.unwrap_err();
    assert!(matches!(err, Error::Contract(_)));
}

// ============================================================================
// Single channel
// ============================================================================

#[tokio::test]
async fn test_fetch_channel_by_either_id() {
    let mock_server = MockServer::start().await;
    let body = mock_channel_json(4, 101, "BS", "bs101", "NHK BS");

    Mock::given(method("GET"))
        .and(path("/api/channels/bs101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/channels/NID4-SID101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let by_display = client.fetch_channel("bs101").await.unwrap();
    let by_id = client.fetch_channel("NID4-SID101").await.unwrap();

    assert_eq!(by_display, by_id);
    assert_eq!(by_id.channel_type, ChannelType::Bs);
}

#[tokio::test]
async fn test_fetch_channel_rejects_non_canonical_id() {
    let mock_server = MockServer::start().await;

    let mut body = mock_channel_json(1, 2, "GR", "gr011", "テスト");
    body["id"] = json!("garbage");

    Mock::given(method("GET"))
        .and(path("/api/channels/gr011"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.fetch_channel("gr011").await.unwrap_err();
    assert!(matches!(err, Error::Contract(_)), "unexpected error: {err:?}");

    let (gateway, notifier) = gateway_for(&mock_server).await;
    assert!(gateway.fetch_channel("gr011").await.is_failed());
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].operation, Operation::FetchChannel);
}

#[tokio::test]
async fn test_fetch_channel_not_found_uses_validation_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/channels/gr999"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"detail": "Specified channel_id was not found"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    match client.fetch_channel("gr999").await {
        Err(Error::Api { status, detail }) => {
            assert_eq!(status, 422);
            assert_eq!(detail.as_deref(), Some("Specified channel_id was not found"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let (gateway, notifier) = gateway_for(&mock_server).await;
    assert!(gateway.fetch_channel("gr999").await.is_failed());
    assert_eq!(notifier.notices()[0].operation, Operation::FetchChannel);
}

// ============================================================================
// Jikkyo gateway
// ============================================================================

#[tokio::test]
async fn test_locate_gateway_available() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/channels/gr011/jikkyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "websocket_url": "wss://nx-jikkyo.tsukumijima.net/api/v1/channels/jk1/ws/watch",
            "is_nxjikkyo_exclusive": false
        })))
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let info = gateway.locate_jikkyo_gateway("gr011").await.ok().unwrap();

    assert!(info.is_available());
    assert_eq!(info.session_scope(), SessionScope::Shared);
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_locate_gateway_without_commentary_is_not_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/channels/NID4-SID101/jikkyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "websocket_url": null,
            "is_nxjikkyo_exclusive": true
        })))
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let outcome = gateway.locate_jikkyo_gateway("NID4-SID101").await;

    match outcome {
        FetchOutcome::Success(info) => {
            assert!(!info.is_available());
            assert_eq!(info.session_scope(), SessionScope::Exclusive);
        }
        FetchOutcome::Failed => panic!("null websocket_url must not be a failure"),
    }
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_locate_gateway_malformed_body_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/channels/gr011/jikkyo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    assert!(gateway.locate_jikkyo_gateway("gr011").await.is_failed());

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0]
        .message
        .starts_with("Failed to retrieve the Jikkyo connection information."));
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_submit_comment_success() {
    let mock_server = MockServer::start().await;
    let comment = CommentSubmission::new("こんばんは", 4520)
        .color("#FFFF00")
        .position(CommentPosition::Bottom);

    Mock::given(method("POST"))
        .and(path("/api/channels/gr011/jikkyo/comment"))
        .and(body_json(json!({
            "text": "こんばんは",
            "color": "#FFFF00",
            "position": "bottom",
            "size": "medium",
            "vpos": 4520
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_success": true,
            "detail": "コメントを送信しました。"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let result = gateway.submit_comment("gr011", &comment).await.ok().unwrap();

    assert!(result.is_success);
    assert_eq!(result.detail, "コメントを送信しました。");
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_submit_comment_rejection_is_returned_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/channels/gr011/jikkyo/comment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_success": false,
            "detail": "rate limited"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let outcome = gateway
        .submit_comment("gr011", &CommentSubmission::new("連投", 100))
        .await;

    match outcome {
        FetchOutcome::Success(result) => {
            assert!(!result.is_success);
            assert_eq!(result.detail, "rate limited");
        }
        FetchOutcome::Failed => panic!("a rejected comment is not a transport failure"),
    }
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_submit_comment_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/channels/gr011/jikkyo/comment"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let outcome = gateway
        .submit_comment("gr011", &CommentSubmission::new("テスト", 0))
        .await;

    assert!(outcome.is_failed());
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Failed to send the comment. (HTTP Error 503)");
}

// ============================================================================
// Transport failures
// ============================================================================

#[tokio::test]
async fn test_unreachable_server_fails_every_operation_once() {
    // Bind then drop a server so the port refuses connections
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let notifier = CollectingNotifier::new();
    let client = ChannelsClient::builder()
        .base_url(format!("{}/api", uri))
        .timeout(Duration::from_secs(2))
        .build()
        .await
        .unwrap();
    let gateway = ChannelsGateway::with_notifier(client, notifier.clone());

    assert!(gateway.fetch_directory().await.is_failed());
    assert_eq!(notifier.drain().len(), 1);

    assert!(gateway.fetch_channel("gr011").await.is_failed());
    assert_eq!(notifier.drain().len(), 1);

    assert!(gateway.locate_jikkyo_gateway("gr011").await.is_failed());
    assert_eq!(notifier.drain().len(), 1);

    assert!(gateway
        .submit_comment("gr011", &CommentSubmission::new("テスト", 0))
        .await
        .is_failed());
    let notices = notifier.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].operation, Operation::SubmitComment);
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_directory_json()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/channels/gr011/jikkyo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (gateway, notifier) = gateway_for(&mock_server).await;
    let (directory, jikkyo) = tokio::join!(
        gateway.fetch_directory(),
        gateway.locate_jikkyo_gateway("gr011")
    );

    assert!(directory.is_success());
    assert!(jikkyo.is_failed());
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].operation, Operation::LocateJikkyoGateway);
}
