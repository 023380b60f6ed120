//! Mock publisher laid out like the AIP site: `<root>/<YYYY-MM>/<file>`.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::pdf_fixtures::sample_pdf;

const ROOT: &str = "/aip";

/// Base URL (folder containing the period subfolders) served by `server`.
#[must_use]
pub fn base_url(server: &MockServer) -> String {
    format!("{}{ROOT}/", server.uri())
}

/// Serves `body` for `HEAD` and `GET` on `<root>/<period>/<file>`.
pub async fn publish(server: &MockServer, period: &str, file: &str, body: Vec<u8>) {
    publish_delayed(server, period, file, body, Duration::ZERO).await;
}

/// Like [`publish`], but `GET` answers only after `delay`.
pub async fn publish_delayed(
    server: &MockServer,
    period: &str,
    file: &str,
    body: Vec<u8>,
    delay: Duration,
) {
    let route = format!("{ROOT}/{period}/{file}");
    Mock::given(method("HEAD"))
        .and(path(route.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("Content-Type", "application/pdf")
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Publishes a PDF whose single page reads `<marker>-0`.
pub async fn publish_pdf(server: &MockServer, period: &str, file: &str, marker: &str) {
    publish(server, period, file, sample_pdf(marker, 1)).await;
}

/// The reference layout used across tests.
///
/// Everything but the amendment is published in 2025-02; the amendment was
/// last published in 2024-11. An older, longer General series sits in
/// 2025-01 and must be ignored. Returns the page markers expected in the
/// compiled output.
pub async fn publish_reference_aip(server: &MockServer) -> Vec<String> {
    let current = "2025-02";
    publish_pdf(server, current, "AIPHEAD.pdf", "HEAD").await;
    for n in 0..3 {
        publish_pdf(server, current, &format!("Gen{n}.pdf"), &format!("GEN{n}")).await;
    }
    publish_pdf(server, current, "Enr0.pdf", "ENR0").await;
    publish_pdf(server, current, "Ad0.pdf", "AD0").await;
    publish_pdf(server, current, "Ad2-0.pdf", "AD2_0").await;
    publish_pdf(server, "2024-11", "AIPAMDT.pdf", "AMDT").await;

    for n in 0..5 {
        publish_pdf(server, "2025-01", &format!("Gen{n}.pdf"), &format!("OLD{n}")).await;
    }

    ["HEAD", "GEN0", "GEN1", "GEN2", "ENR0", "AD0", "AD2_0", "AMDT"]
        .iter()
        .map(|marker| format!("{marker}-0"))
        .collect()
}
