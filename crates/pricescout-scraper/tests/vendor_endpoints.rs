//! Vendor adapters exercised against a local mock server.

use pricescout_scraper::vendors::{
    DigicorAdapter, JwComputersAdapter, MwaveAdapter, ScorptecAdapter, UmartAdapter,
};
use pricescout_scraper::{ScraperConfig, TransportError, VendorAdapter};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> ScraperConfig {
    ScraperConfig {
        request_timeout_secs: 5,
        render_timeout_secs: 10,
        user_agent: "pricescout-test/0.1".to_string(),
        browser_bin: "chromium".to_string(),
    }
}

#[tokio::test]
async fn scorptec_extracts_price_from_product_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/go"))
        .and(query_param("w", "BX8071512100F"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="product-page-model">BX8071512100F</div>
               <div class="product-page-price product-main-price">$245.00</div>"#,
        ))
        .mount(&server)
        .await;

    let adapter = ScorptecAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let result = adapter.lookup("BX8071512100F").await.expect("lookup");

    assert!(result.found);
    assert_eq!(result.price, Some(Decimal::new(24_500, 2)));
    assert_eq!(result.currency, "AUD");
}

#[tokio::test]
async fn scorptec_challenge_page_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/go"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<title>Just a moment...</title>
               <script src="/cdn-cgi/challenge-platform/h/b/orchestrate"></script>"#,
        ))
        .mount(&server)
        .await;

    let adapter = ScorptecAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let err = adapter.lookup("X").await.expect_err("challenge rejected");

    assert!(matches!(err, TransportError::BotChallenge { .. }));
}

#[tokio::test]
async fn mwave_server_error_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/searchresult"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let adapter = MwaveAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let err = adapter.lookup("X").await.expect_err("5xx propagates");

    assert!(matches!(
        err,
        TransportError::UnexpectedStatus { status: 503, .. }
    ));
}

#[tokio::test]
async fn digicor_empty_results_page_is_a_benign_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalogsearch/result/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Your search returned no results.</body></html>"),
        )
        .mount(&server)
        .await;

    let adapter = DigicorAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let result = adapter.lookup("NOPE-123").await.expect("lookup");

    assert!(!result.found);
    assert!(result.price.is_none());
}

#[tokio::test]
async fn jw_computers_queries_the_search_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/*/queries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"hits": [{
                "mpn": "BX8071512100F",
                "price": "189.00",
                "url": "intel-core-i3-12100f.html",
            }]}]
        })))
        .mount(&server)
        .await;

    let adapter = JwComputersAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let result = adapter.lookup("BX8071512100F").await.expect("lookup");

    assert!(result.found);
    assert_eq!(result.price, Some(Decimal::new(18_900, 2)));
    assert!(result.url.expect("url").ends_with("/intel-core-i3-12100f.html"));
}

#[tokio::test]
async fn jw_computers_error_payload_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/*/queries"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Invalid Application-ID or API key"})),
        )
        .mount(&server)
        .await;

    let adapter = JwComputersAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let err = adapter.lookup("X").await.expect_err("schema drift");

    assert!(matches!(err, TransportError::MalformedPayload { .. }));
}

#[tokio::test]
async fn umart_validates_mpn_on_the_product_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ajax_search.php"))
        .and(query_param("act", "tipword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_product":
                r#"<li><div class="goods_name"><a href="p/intel-i3-12100f">Intel i3</a></div></li>"#
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/intel-i3-12100f"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="goods_stock">In Stock</div>
               <span class="goods-price ele-goods-price">$185.00</span>
               <div class="spec-right" itemprop="mpn">BX8071512100F</div>"#,
        ))
        .mount(&server)
        .await;

    let adapter = UmartAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let result = adapter.lookup("BX8071512100F").await.expect("lookup");

    assert!(result.found);
    assert_eq!(result.price, Some(Decimal::new(18_500, 2)));
    assert_eq!(result.in_stock, Some(true));
}

#[tokio::test]
async fn umart_product_page_mismatch_is_a_benign_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ajax_search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_product":
                r#"<li><div class="goods_name"><a href="p/other">Other CPU</a></div></li>"#
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/other"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<span class="goods-price ele-goods-price">$99.00</span>
               <div class="spec-right" itemprop="mpn">OTHER-MPN</div>"#,
        ))
        .mount(&server)
        .await;

    let adapter = UmartAdapter::with_base_url(&test_config(), &server.uri()).expect("client");
    let result = adapter.lookup("BX8071512100F").await.expect("lookup");

    assert!(!result.found);
}
