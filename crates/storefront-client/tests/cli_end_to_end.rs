use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;

#[test]
fn tag_command_prints_server_response() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/api/revalidate")
            .query_param("tag", "product:ABC")
            .header("x-revalidate-secret", "cli-secret");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"revalidated":true,"now":1700000000000,"message":"Revalidated 1 paths"}"#);
    });

    let assert = Command::new(assert_cmd::cargo::cargo_bin!("storefront-revalidate-cli"))
        .env("STOREFRONT_SITE_URL", server.base_url())
        .env("REVALIDATE_SECRET", "cli-secret")
        .arg("tag")
        .arg("product:ABC")
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"message\": \"Revalidated 1 paths\""));
    mock.assert();
}

#[test]
fn server_error_fails_the_command() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/revalidate-all");
        then.status(401).body(r#"{"error":"Invalid secret"}"#);
    });

    Command::new(assert_cmd::cargo::cargo_bin!("storefront-revalidate-cli"))
        .env("STOREFRONT_SITE_URL", server.base_url())
        .env_remove("REVALIDATE_SECRET")
        .arg("all")
        .assert()
        .failure()
        .stderr(contains("server returned 401"));
}

#[test]
fn missing_site_fails_fast() {
    Command::new(assert_cmd::cargo::cargo_bin!("storefront-revalidate-cli"))
        .env_remove("STOREFRONT_SITE_URL")
        .env_remove("REVALIDATE_SECRET")
        .arg("path")
        .arg("/about-us")
        .assert()
        .failure()
        .stderr(contains("site URL is required"));
}
