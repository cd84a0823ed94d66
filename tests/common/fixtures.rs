//! Profile fixtures and mock mounting helpers

use profile_fetch::Identifier;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::config::PROFILE_PATH;

/// Bytes served as every avatar image
pub const AVATAR_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-avatar";

/// Profile body as the API returns it
pub fn profile_body(username: &str, avatar: Option<String>) -> serde_json::Value {
    json!({
        "name": format!("{username} display"),
        "username": username,
        "followers_count": 12_345,
        "friends_count": 67,
        "likes_count": 890,
        "statuses_count": 1_000,
        "is_verified": true,
        "joined": "2009-06-02T20:12:29Z",
        "avatar": avatar,
    })
}

/// Avatar URL on `server` for `username`
pub fn avatar_url(server: &MockServer, username: &str) -> String {
    format!("{}/avatars/{username}.png", server.uri())
}

/// Serve a profile with an avatar for `username`
pub async fn mount_profile(server: &MockServer, username: &str) {
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .and(query_param("username", username))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_body(username, Some(avatar_url(server, username)))),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/avatars/{username}.png")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(AVATAR_BYTES))
        .mount(server)
        .await;
}

/// Parse a list of names into identifiers
pub fn identifiers(names: &[&str]) -> Vec<Identifier> {
    names
        .iter()
        .map(|name| Identifier::new(*name).unwrap())
        .collect()
}
