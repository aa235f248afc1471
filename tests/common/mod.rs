//! Shared fixtures for the integration tests.

use chrono::{TimeZone, Utc};
use http_exchange::{
    HttpExchange, HttpHeaders, HttpMethod, HttpProtocol, HttpRequest, HttpResponse, HttpUrl,
};

/// A GitHub API call with repeated headers and repeated query parameters.
pub fn github_exchange() -> HttpExchange {
    let url = HttpUrl::builder()
        .protocol(HttpProtocol::Https)
        .host("api.github.com")
        .pathname("/user/repos")
        .unwrap()
        .add_query_parameter("mykey", Some("myvalue".into()))
        .add_query_parameter("anotherkey", Some("value1".into()))
        .add_query_parameter("anotherkey", Some("value2".into()))
        .build()
        .unwrap();

    let request = HttpRequest::builder()
        .url(url)
        .method(HttpMethod::Get)
        .headers(
            HttpHeaders::builder()
                .add("Accept", "application/vnd.github+json")
                .add("Accept", "*/*")
                .add("User-Agent", "capture-test")
                .build(),
        )
        .timestamp(Utc.with_ymd_and_hms(2019, 8, 29, 10, 0, 0).unwrap())
        .build()
        .unwrap();

    let response = HttpResponse::builder()
        .status_code(200)
        .headers(
            HttpHeaders::builder()
                .add("Content-Type", "application/json")
                .add_all("Set-Cookie", ["a=1", "b=2"])
                .build(),
        )
        .body(r#"[{"id":1,"name":"http-types"}]"#)
        .timestamp(Utc.with_ymd_and_hms(2019, 8, 29, 10, 0, 1).unwrap())
        .build()
        .unwrap();

    HttpExchange::new(request, response)
}

/// A form POST without host, query, timestamps or response body.
pub fn form_post_exchange() -> HttpExchange {
    let request = HttpRequest::builder()
        .url(
            HttpUrl::builder()
                .protocol(HttpProtocol::Http)
                .pathname("/login")
                .unwrap()
                .build()
                .unwrap(),
        )
        .method(HttpMethod::Post)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("user=jane&password=s%20cret")
        .build()
        .unwrap();

    let response = HttpResponse::builder()
        .status_code(302)
        .header("Location", "/home")
        .build()
        .unwrap();

    HttpExchange::new(request, response)
}
