//! End-to-end pipeline scenarios at the library level: raw catalog JSON
//! through eligibility filtering, prioritization, and the streaming XML
//! engine, with the output parsed back to verify structure and content.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use feedmill::catalog::{filter_feed_eligible, prioritize_products, Product, ProductPage};
use feedmill::feed::{FeedContext, FeedStream, Publisher};
use quick_xml::events::Event;
use quick_xml::Reader;

const LOG_INTERVAL: Duration = Duration::from_secs(5);

fn ctx() -> FeedContext {
    FeedContext {
        site_url: "https://shop.example.com".to_string(),
        site_name: "Acme".to_string(),
        image_base_url: None,
        currency: "USD".to_string(),
    }
}

fn catalog_fixture() -> Vec<Product> {
    let page: ProductPage = serde_json::from_str(
        r#"{"products": [
            {"id": 1, "handle": "red-mug", "title": "Red Mug", "vendor": "Potter",
             "updated_at": "2026-01-10T00:00:00Z",
             "images": [{"src": "https://cdn.example.com/mug.jpg"}],
             "variants": [{"id": 11, "sku": "MUG-R", "price": "12.00", "available": true}]},
            {"id": 2, "handle": "old-lamp", "title": "Old Lamp", "tags": ["draft"],
             "images": [{"src": "https://cdn.example.com/lamp.jpg"}],
             "variants": [{"id": 21, "price": "40.00", "available": true}]},
            {"id": 3, "handle": "tee", "title": "Tee", "vendor": "Looms",
             "updated_at": "2026-03-01T00:00:00Z",
             "images": [{"src": "https://cdn.example.com/tee.jpg"}],
             "variants": [
                {"id": 31, "title": "Small", "price": "18.00", "available": true},
                {"id": 32, "title": "Large", "price": "18.00", "available": false}
             ]},
            {"id": 4, "handle": "sample", "title": "Sample", "tags": ["Internal"],
             "images": [{"src": "https://cdn.example.com/sample.jpg"}],
             "variants": [{"id": 41, "price": "1.00", "available": true}]},
            {"id": 5, "handle": "bowl", "title": "Bowl", "vendor": "Potter",
             "updated_at": "2026-02-01T00:00:00Z",
             "images": [{"src": "https://cdn.example.com/bowl.jpg"}],
             "variants": [{"id": 51, "sku": "BOWL", "price": "22.00", "available": true}]}
        ]}"#,
    )
    .expect("fixture parses");
    page.products
}

#[test]
fn test_filter_then_prioritize_then_stream() {
    let products = catalog_fixture();
    assert_eq!(products.len(), 5);

    // Tagged products (draft, Internal) drop out
    let eligible = filter_feed_eligible(products);
    assert_eq!(
        eligible.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![1, 3, 5]
    );

    // The two-variant product leads, then freshest first
    let ordered = prioritize_products(eligible);
    assert_eq!(
        ordered.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![3, 5, 1]
    );

    let mut stream = FeedStream::new(ordered, Publisher::Google, ctx(), 2, LOG_INTERVAL);

    let header = stream.next().expect("header chunk");
    assert!(header.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(header.contains("xmlns:g="));
    assert!(header.contains("<title>Acme</title>"));

    // 3 products with batch size 2: two item batches
    let batch1 = stream.next().expect("first batch");
    assert_eq!(batch1.matches("<item>").count(), 3); // product 3 has 2 variants
    let batch2 = stream.next().expect("second batch");
    assert_eq!(batch2.matches("<item>").count(), 1);

    let footer = stream.next().expect("footer chunk");
    assert!(footer.contains("</channel>"));
    assert!(footer.contains("</rss>"));
    assert!(footer.contains("products: 3 items: 4 errors: 0"));

    assert_eq!(stream.next(), None);
    assert_eq!(stream.next(), None);
}

#[test]
fn test_rendered_feed_round_trips_through_xml_parser() {
    let products = prioritize_products(filter_feed_eligible(catalog_fixture()));
    let (xml, stats) =
        FeedStream::new(products, Publisher::Google, ctx(), 100, LOG_INTERVAL).render_buffered();
    assert_eq!(stats.products, 3);
    assert_eq!(stats.items, 4);
    assert_eq!(stats.errors, 0);

    let mut reader = Reader::from_str(&xml);
    let mut depth = 0usize;
    let mut current = String::new();
    let mut ids = Vec::new();
    let mut prices = Vec::new();
    let mut availabilities = Vec::new();

    loop {
        match reader.read_event().expect("well-formed feed") {
            Event::Start(e) => {
                depth += 1;
                current = String::from_utf8_lossy(e.name().as_ref()).into_owned();
            }
            Event::Text(t) => {
                let text = t.unescape().expect("decodable text").into_owned();
                match current.as_str() {
                    "g:id" => ids.push(text),
                    "g:price" => prices.push(text),
                    "g:availability" => availabilities.push(text),
                    _ => {}
                }
            }
            Event::End(_) => {
                depth -= 1;
                current.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Every tag closed
    assert_eq!(depth, 0);

    // SKU where provided, synthesized id otherwise, in priority order
    assert_eq!(ids, vec!["3-31", "3-32", "BOWL", "MUG-R"]);
    assert_eq!(prices, vec!["18.00 USD", "18.00 USD", "22.00 USD", "12.00 USD"]);
    assert_eq!(
        availabilities,
        vec!["in stock", "out of stock", "in stock", "in stock"]
    );
}

#[test]
fn test_escaped_titles_survive_round_trip() {
    let mut products = catalog_fixture();
    products.truncate(1);
    products[0].title = "Mug & Saucer <limited>".to_string();

    let (xml, _) =
        FeedStream::new(products, Publisher::Google, ctx(), 100, LOG_INTERVAL).render_buffered();
    assert!(xml.contains("Mug &amp; Saucer &lt;limited&gt;"));

    let mut reader = Reader::from_str(&xml);
    let mut in_title = false;
    let mut titles = Vec::new();
    loop {
        match reader.read_event().expect("well-formed feed") {
            Event::Start(e) => in_title = e.name().as_ref() == b"g:title",
            Event::Text(t) if in_title => {
                titles.push(t.unescape().expect("decodable text").into_owned());
            }
            Event::End(_) => in_title = false,
            Event::Eof => break,
            _ => {}
        }
    }
    assert_eq!(titles, vec!["Mug & Saucer <limited>"]);
}

#[test]
fn test_prioritization_is_stable_for_equal_keys() {
    let stamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut products = catalog_fixture();
    products.truncate(3);
    for p in &mut products {
        p.tags.clear();
        p.variants.truncate(1);
        p.updated_at = Some(stamp);
    }
    let input_order: Vec<_> = products.iter().map(|p| p.id).collect();

    let ordered = prioritize_products(products);
    assert_eq!(
        ordered.iter().map(|p| p.id).collect::<Vec<_>>(),
        input_order
    );
}
