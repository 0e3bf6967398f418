use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WATCH_PAGE: &str = r#"<html><script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","name":{"simpleText":"German"},"languageCode":"de","isTranslatable":false}]}},"videoDetails":{"videoId":"abc"}};</script></html>"#;

const TIMEDTEXT: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.54">Hey there</text><text start="1.54" dur="4.16">how are you</text></transcript>"#;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("youtube-transcript").unwrap();
    cmd.env_remove("SCRAPEOPS_API_KEY")
        .env_remove("WEBSHARE_PROXY_USERNAME")
        .env_remove("WEBSHARE_PROXY_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_flags() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--list-transcripts"))
        .stdout(predicate::str::contains("--scrapeops-api-key"));
}

#[test]
fn rejects_unknown_format() {
    cli()
        .args(["--format", "png", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("png"));
}

#[test]
fn excluding_everything_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();

    cli()
        .current_dir(dir.path())
        .args(["abc", "--exclude-generated", "--exclude-manually-created", "-q"])
        .assert()
        .success()
        .stdout("\n");
}

#[test]
fn fetches_through_scrapeops_endpoint() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("url", "https://www.youtube.com/watch?v=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "html": WATCH_PAGE })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/"))
            .and(query_param("url", "https://www.youtube.com/watch?v=gone"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "html": "<html></html>" })),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/"))
            .and(query_param("url", "https://www.youtube.com/api/timedtext?v=abc&lang=de"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "html": TIMEDTEXT })))
            .mount(&server)
            .await;

        server
    });

    let dir = tempfile::tempdir().unwrap();
    fs_err::write(
        dir.path().join("youtube-transcript.yaml"),
        format!(
            "timeout_secs: 10\nscrapeops:\n  api_key: test-key\n  endpoint: {}/v1/\n",
            server.uri()
        ),
    )
    .unwrap();

    cli()
        .current_dir(dir.path())
        .args(["gone", "abc", "--languages", "de", "--format", "text", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Could not retrieve a transcript for the video https://www.youtube.com/watch?v=gone!",
        ))
        .stdout(predicate::str::contains("The video is no longer available"))
        .stdout(predicate::str::ends_with("\n\nHey there\nhow are you\n"));

    drop(server);
}
