//! Integration tests for `Orchestrator`: source fallback, the empty
//! envelope, grade echo, and image lookup.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pokeprice_core::{AppConfig, Environment, Grade, ResponseSource};
use pokeprice_scraper::{Orchestrator, SourceSelection};

const MIN_PAGE_LEN: usize = 800;
const PRIMARY_PATH: &str = "/search-products";
const SECONDARY_PATH: &str = "/en/Pokemon/Products/Search";

fn test_config(server: &MockServer, image_lookup_url: Option<String>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("valid socket addr"),
        log_level: "debug".to_string(),
        request_timeout_secs: 5,
        user_agent: "pokeprice-test/0.1".to_string(),
        min_page_len: MIN_PAGE_LEN,
        primary_base_url: server.uri(),
        secondary_base_url: server.uri(),
        image_lookup_url,
        max_candidates: 60,
        detail_concurrency: 4,
        max_detail_pages: 12,
        detail_enough_priced: 8,
    }
}

fn orchestrator(server: &MockServer) -> Orchestrator {
    Orchestrator::from_config(&test_config(server, None)).expect("failed to build orchestrator")
}

fn page(body: &str) -> String {
    let pad = "x".repeat(MIN_PAGE_LEN + 100);
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><!-- {pad} --></head><body>{body}</body></html>"
    )
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn charizard_search_page() -> String {
    page(
        r#"<table><tr id="product-1">
            <td class="title"><a href="/game/pokemon-base-set/charizard-4">Charizard #4</a></td>
            <td>PSA 10</td><td class="price">$10,276.00</td>
        </tr></table>"#,
    )
}

fn pikachu_product_page() -> String {
    page(
        r#"<div class="product-list">
            <div class="product"><a href="/en/Pokemon/Products/Singles/Base-Set/Pikachu">Pikachu</a>
                <span class="price">From €50,00</span></div>
        </div>"#,
    )
}

fn unrelated_page() -> String {
    page("<table><tr><td>Bulbasaur #44</td><td>$3.00</td></tr></table><ul><li>Squirtle</li></ul>")
}

fn priced_unrelated_primary_page() -> String {
    page("<table><tr><td>Bulbasaur #44</td><td>Ungraded</td><td>$3.00</td></tr></table>")
}

fn priced_unrelated_secondary_page() -> String {
    page("<p>Bulbasaur From €2,00</p>")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Fallback order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn primary_result_is_returned_without_consulting_secondary() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, charizard_search_page()).await;
    Mock::given(method("GET"))
        .and(path(SECONDARY_PATH))
        .respond_with(html_response(pikachu_product_page()))
        .expect(0)
        .mount(&server)
        .await;

    let response = orchestrator(&server).search("charizard", None).await;

    assert!(response.success);
    assert_eq!(response.source, ResponseSource::PriceCharting);
    assert_eq!(response.count, 1);
    assert_eq!(response.cards.len(), response.count);
    let psa10 = response.cards[0].price_for(Grade::GEM_MINT).expect("PSA10 price");
    assert_eq!(psa10.price, 1_027_600);
}

#[tokio::test]
async fn empty_primary_falls_back_to_secondary() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, unrelated_page()).await;
    mount_page(&server, SECONDARY_PATH, pikachu_product_page()).await;

    let response = orchestrator(&server).search("pikachu", None).await;

    assert_eq!(response.source, ResponseSource::CardMarket);
    assert_eq!(response.count, 1);
    let card = &response.cards[0];
    assert_eq!(card.id, "cm_pikachu_0");
    assert_eq!(card.prices.len(), 1);
    assert_eq!(card.prices[0].grade, Grade::UNGRADED);
    assert_eq!(card.prices[0].price, 5_500);
}

#[tokio::test]
async fn failing_primary_falls_back_to_secondary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRIMARY_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, SECONDARY_PATH, pikachu_product_page()).await;

    let response = orchestrator(&server).search("pikachu", None).await;
    assert_eq!(response.source, ResponseSource::CardMarket);
    assert_eq!(response.count, 1);
}

#[tokio::test]
async fn no_matches_anywhere_yields_empty_none_envelope() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, unrelated_page()).await;
    mount_page(&server, SECONDARY_PATH, unrelated_page()).await;

    let response = orchestrator(&server).search("pikachu", None).await;

    assert!(response.success);
    assert_eq!(response.pokemon, "pikachu");
    assert_eq!(response.count, 0);
    assert!(response.cards.is_empty());
    assert_eq!(response.source, ResponseSource::None);

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "pokemon": "pikachu",
            "cards": [],
            "count": 0,
            "source": "none"
        })
    );
}

#[tokio::test]
async fn priced_listings_for_other_cards_yield_none_envelope() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, priced_unrelated_primary_page()).await;
    Mock::given(method("GET"))
        .and(path(SECONDARY_PATH))
        .respond_with(html_response(priced_unrelated_secondary_page()))
        .expect(1)
        .mount(&server)
        .await;

    let response = orchestrator(&server).search("pikachu", None).await;

    assert_eq!(response.source, ResponseSource::None);
    assert_eq!(response.count, 0);
    assert!(response.cards.is_empty());
}

#[tokio::test]
async fn slow_primary_falls_back_to_secondary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRIMARY_PATH))
        .respond_with(
            html_response(page(
                "<table><tr><td>Pikachu #58</td><td>PSA 10</td><td>$800.00</td></tr></table>",
            ))
            .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(&server, SECONDARY_PATH, pikachu_product_page()).await;

    let config = AppConfig {
        request_timeout_secs: 1,
        ..test_config(&server, None)
    };
    let response = Orchestrator::from_config(&config)
        .unwrap()
        .search("pikachu", None)
        .await;

    assert_eq!(response.source, ResponseSource::CardMarket);
    assert_eq!(response.count, 1);
}

#[tokio::test]
async fn unreachable_sources_yield_empty_none_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = orchestrator(&server).search("charizard", None).await;
    assert!(response.success);
    assert_eq!(response.count, 0);
    assert_eq!(response.source, ResponseSource::None);
}

#[tokio::test]
async fn blank_query_yields_empty_none_envelope() {
    let server = MockServer::start().await;
    let response = orchestrator(&server).search("  ", None).await;
    assert_eq!(response.count, 0);
    assert_eq!(response.source, ResponseSource::None);
}

// ---------------------------------------------------------------------------
// Selection and grade echo
// ---------------------------------------------------------------------------

#[tokio::test]
async fn secondary_only_skips_primary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRIMARY_PATH))
        .respond_with(html_response(charizard_search_page()))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, SECONDARY_PATH, pikachu_product_page()).await;

    let response = orchestrator(&server)
        .search_with("pikachu", None, SourceSelection::SecondaryOnly)
        .await;
    assert_eq!(response.source, ResponseSource::CardMarket);
}

#[tokio::test]
async fn primary_only_does_not_fall_back() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, unrelated_page()).await;
    Mock::given(method("GET"))
        .and(path(SECONDARY_PATH))
        .respond_with(html_response(pikachu_product_page()))
        .expect(0)
        .mount(&server)
        .await;

    let response = orchestrator(&server)
        .search_with("pikachu", None, SourceSelection::PrimaryOnly)
        .await;
    assert_eq!(response.source, ResponseSource::None);
}

#[tokio::test]
async fn grade_is_echoed_but_does_not_filter() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, charizard_search_page()).await;

    let response = orchestrator(&server).search("charizard", Some("PSA9")).await;

    assert_eq!(response.grade.as_deref(), Some("PSA9"));
    assert_eq!(response.count, 1);
    assert_eq!(response.cards[0].prices[0].grade, Grade::GEM_MINT);
}

// ---------------------------------------------------------------------------
// Image lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_images_are_filled_from_lookup_api() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, charizard_search_page()).await;
    Mock::given(method("GET"))
        .and(path("/v2/cards"))
        .and(query_param("q", "name:\"Charizard\" number:4"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "images": {
                    "small": "https://images.example.com/base1/4.png",
                    "large": "https://images.example.com/base1/4_hires.png"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, Some(format!("{}/v2", server.uri())));
    let response = Orchestrator::from_config(&config)
        .unwrap()
        .search("charizard", None)
        .await;

    assert_eq!(
        response.cards[0].image_url.as_deref(),
        Some("https://images.example.com/base1/4_hires.png")
    );
}

#[tokio::test]
async fn image_lookup_failure_leaves_image_empty() {
    let server = MockServer::start().await;
    mount_page(&server, PRIMARY_PATH, charizard_search_page()).await;
    Mock::given(method("GET"))
        .and(path("/v2/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let config = test_config(&server, Some(format!("{}/v2", server.uri())));
    let response = Orchestrator::from_config(&config)
        .unwrap()
        .search("charizard", None)
        .await;

    assert_eq!(response.source, ResponseSource::PriceCharting);
    assert!(response.cards[0].image_url.is_none());
}
