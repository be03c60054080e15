//! Integration tests for the extraction engine using saved search pages.

use price_scout::filters::FilterChainBuilder;
use price_scout::scrape::{Engine, Site, SiteProfile};
use price_scout::Config;

const CELLPHONES_FIXTURE: &str = include_str!("fixtures/cellphones_search.html");
const CELLPHONES_URL: &str = "https://cellphones.com.vn/catalogsearch/result?q=tai%20nghe";

const DIENTHOAIVUI_FIXTURE: &str = include_str!("fixtures/dienthoaivui_search.html");
const DIENTHOAIVUI_URL: &str = "https://dienthoaivui.com.vn/tim-kiem?_tim_kiem=iphone";

#[test]
fn test_cellphones_search_page() {
    let engine = Engine::new(Site::Cellphones.profile()).unwrap();
    let records = engine.extract_html(CELLPHONES_FIXTURE, CELLPHONES_URL, Some(20)).unwrap();

    // Banner, card without a link and the recently-viewed duplicate are dropped
    assert_eq!(records.len(), 3);

    let product = &records[0];
    assert_eq!(product.title, "Tai nghe không dây Baseus Bowie E19");
    assert_eq!(product.url, "https://cellphones.com.vn/tai-nghe-khong-day-baseus-bowie-e19.html");
    assert_eq!(product.price, Some(459000.0));
    assert_eq!(
        product.image.as_deref(),
        Some("https://cdn2.cellphones.com.vn/358x358,webp,q100/media/catalog/product/b/a/baseus-e19.png")
    );

    // Shown price, not the struck-through one
    let product = &records[1];
    assert_eq!(product.title, "iPhone 15 Pro Max 256GB | Chính hãng VN/A");
    assert_eq!(product.price, Some(29590000.0));

    // Kept on its product image alone
    let product = &records[2];
    assert_eq!(product.title, "Ốp lưng MagSafe iPhone 15 Pro Max");
    assert!(product.price.is_none());
    assert_eq!(
        product.image.as_deref(),
        Some("https://cellphones.com.vn/media/catalog/product/cache/358x358/o/p/op-lung-magsafe.jpg")
    );
}

#[test]
fn test_cellphones_limit() {
    let engine = Engine::new(Site::Cellphones.profile()).unwrap();
    let records = engine.extract_html(CELLPHONES_FIXTURE, CELLPHONES_URL, Some(2)).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].price, Some(29590000.0));
}

#[test]
fn test_generic_profile_reads_cellphones_cards() {
    let engine = Engine::new(SiteProfile::generic()).unwrap();
    let records = engine.extract_html(CELLPHONES_FIXTURE, CELLPHONES_URL, None).unwrap();

    let prices: Vec<_> = records.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![Some(459000.0), Some(29590000.0), None]);
}

#[test]
fn test_dienthoaivui_search_page() {
    let engine = Engine::new(Site::DienThoaiVui.profile()).unwrap();
    let records = engine.extract_html(DIENTHOAIVUI_FIXTURE, DIENTHOAIVUI_URL, None).unwrap();

    // Menu, footer, logo and news links carry no product evidence or are skipped
    assert_eq!(records.len(), 3);

    let product = &records[0];
    assert_eq!(product.title, "iPhone 15 Pro Max 256GB");
    assert_eq!(product.url, "https://dienthoaivui.com.vn/iphone-15-pro-max-256gb");
    assert_eq!(product.price, Some(27990000.0));
    assert_eq!(
        product.image.as_deref(),
        Some("https://dienthoaivui.com.vn/wp-content/uploads/300x300/iphone-15-pro-max.jpg")
    );

    let product = &records[1];
    assert_eq!(product.title, "Màn hình iPhone 13 chính hãng");
    assert_eq!(product.price, Some(1290000.0));
    assert_eq!(
        product.image.as_deref(),
        Some("https://dienthoaivui.com.vn/wp-content/uploads/300x300/man-hinh-iphone-13.jpg")
    );

    // Warranty badge is not taken for the name
    let product = &records[2];
    assert_eq!(product.title, "Ốp lưng MagSafe iPhone 15");
    assert_eq!(product.price, Some(150000.0));

    assert!(records.iter().all(|r| !r.url.contains("/tin-tuc")));
}

#[test]
fn test_urls_are_absolute() {
    let pages = [
        (Site::Cellphones, CELLPHONES_FIXTURE, CELLPHONES_URL),
        (Site::DienThoaiVui, DIENTHOAIVUI_FIXTURE, DIENTHOAIVUI_URL),
    ];

    for (site, html, base) in pages {
        let engine = Engine::new(site.profile()).unwrap();
        for record in engine.extract_html(html, base, None).unwrap() {
            assert!(record.url.starts_with("https://"), "{}", record.url);
            if let Some(image) = &record.image {
                assert!(image.starts_with("https://"), "{}", image);
            }
            assert!(record.price.is_none_or(|p| p > 0.0));
        }
    }
}

#[test]
fn test_extraction_is_idempotent() {
    let engine = Engine::new(Site::DienThoaiVui.profile()).unwrap();
    let first = engine.extract_html(DIENTHOAIVUI_FIXTURE, DIENTHOAIVUI_URL, None).unwrap();
    let second = engine.extract_html(DIENTHOAIVUI_FIXTURE, DIENTHOAIVUI_URL, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_results() {
    let html = r#"
        <html>
        <body>
            <div class="search-empty">Không tìm thấy sản phẩm nào phù hợp</div>
        </body>
        </html>
    "#;

    for site in Site::all() {
        let engine = Engine::new(site.profile()).unwrap();
        assert!(engine.extract_html(html, CELLPHONES_URL, Some(20)).unwrap().is_empty());
    }
}

#[test]
fn test_profile_detected_from_url() {
    let config = Config::default();
    let profile = config.profile(Some(DIENTHOAIVUI_URL)).unwrap();
    assert_eq!(profile.name, "dienthoaivui");

    let engine = Engine::new(profile).unwrap();
    let records = engine.extract_html(DIENTHOAIVUI_FIXTURE, DIENTHOAIVUI_URL, None).unwrap();
    assert_eq!(records.len(), 3);
}

#[test]
fn test_filter_integration() {
    let engine = Engine::new(Site::Cellphones.profile()).unwrap();
    let records = engine.extract_html(CELLPHONES_FIXTURE, CELLPHONES_URL, None).unwrap();

    let chain = FilterChainBuilder::new()
        .price_range(None, Some(1_000_000.0))
        .exclude_keywords(vec!["ốp lưng".to_string()])
        .build();

    let filtered = chain.apply(records);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Tai nghe không dây Baseus Bowie E19");
}
