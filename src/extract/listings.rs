use scraper::{ElementRef, Html, Selector};

pub const CONTAINER_SELECTORS: [&str; 5] = [
    "div[data-testid='feed-item']",
    "div.feed-item_feedItem__Hn7A7",
    "div[class*='feedItem']",
    "article[class*='item']",
    "div.ad-container",
];

const TITLE_SELECTORS: [&str; 4] = ["h3", "h4", "[class*='title']", "a[class*='title']"];

const PRICE_SELECTORS: [&str; 3] = [
    "[class*='price']",
    "span[class*='price']",
    "[data-testid*='price']",
];

pub const MAX_LISTINGS: usize = 5;
const DETAILS_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub title: Option<String>,
    pub price: Option<String>,
    pub link: Option<String>,
    pub details: String,
}

/// Best-effort extraction of the first few listings on the page. Every
/// per-field miss is tolerated; the result is empty only when no container
/// selector matches anything.
pub fn extract_listings(html: &str) -> Vec<Listing> {
    let document = Html::parse_document(html);

    let containers = find_containers(&document);
    containers
        .into_iter()
        .take(MAX_LISTINGS)
        .map(extract_listing)
        .collect()
}

fn find_containers(document: &Html) -> Vec<ElementRef<'_>> {
    for selector_str in CONTAINER_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let containers: Vec<ElementRef> = document.select(&selector).collect();
        if !containers.is_empty() {
            tracing::debug!(
                "Found {} listings with selector: {}",
                containers.len(),
                selector_str
            );
            return containers;
        }
    }

    Vec::new()
}

fn extract_listing(container: ElementRef) -> Listing {
    let title = TITLE_SELECTORS
        .iter()
        .filter_map(|sel| first_match_text(container, sel))
        .find(|text| !text.is_empty());

    let price = PRICE_SELECTORS
        .iter()
        .filter_map(|sel| first_match_text(container, sel))
        .find(|text| text.contains('₪') || text.chars().any(|c| c.is_ascii_digit()));

    let link = Selector::parse("a")
        .ok()
        .and_then(|sel| container.select(&sel).next())
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    let details: String = element_text(container).chars().take(DETAILS_MAX_CHARS).collect();

    Listing {
        title,
        price,
        link,
        details,
    }
}

// First element matched by the selector, or nothing; later selectors in the
// cascade get their shot only when this one has no element at all.
fn first_match_text(container: ElementRef, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    container.select(&selector).next().map(element_text)
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(items: &str) -> String {
        format!("<html><body><div class='feed'>{}</div></body></html>", items)
    }

    fn item(inner: &str) -> String {
        format!("<div data-testid='feed-item'>{}</div>", inner)
    }

    #[test]
    fn test_full_listing_extraction() {
        let html = feed(&item(concat!(
            "<h3>טויוטה קורולה 2019</h3>",
            "<span class='price'>₪89,000</span>",
            "<a href='https://www.yad2.co.il/item/abc123'>לצפייה</a>",
        )));

        let listings = extract_listings(&html);
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.title.as_deref(), Some("טויוטה קורולה 2019"));
        assert_eq!(listing.price.as_deref(), Some("₪89,000"));
        assert_eq!(listing.link.as_deref(), Some("https://www.yad2.co.il/item/abc123"));
        assert!(listing.details.contains("טויוטה קורולה"));
    }

    #[test]
    fn test_listing_without_price_keeps_other_fields() {
        let html = feed(&item("<h4>מאזדה 3</h4><a href='/item/1'>x</a>"));

        let listings = extract_listings(&html);
        assert_eq!(listings[0].title.as_deref(), Some("מאזדה 3"));
        assert_eq!(listings[0].price, None);
        assert_eq!(listings[0].link.as_deref(), Some("/item/1"));
    }

    #[test]
    fn test_price_candidate_must_carry_currency_or_digit() {
        let html = feed(&item(
            "<h3>יונדאי i10</h3><div class='price'>לא צוין מחיר</div>",
        ));

        let listings = extract_listings(&html);
        assert_eq!(listings[0].price, None);
    }

    #[test]
    fn test_fieldless_listing_still_appended() {
        let html = feed(&item("<p>תוכן כלשהו</p>"));

        let listings = extract_listings(&html);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, None);
        assert_eq!(listings[0].price, None);
        assert_eq!(listings[0].link, None);
        assert_eq!(listings[0].details, "תוכן כלשהו");
    }

    #[test]
    fn test_caps_at_five_listings() {
        let items: String = (0..8).map(|i| item(&format!("<h3>רכב {}</h3>", i))).collect();
        let html = feed(&items);

        let listings = extract_listings(&html);
        assert_eq!(listings.len(), MAX_LISTINGS);
        assert_eq!(listings[0].title.as_deref(), Some("רכב 0"));
        assert_eq!(listings[4].title.as_deref(), Some("רכב 4"));
    }

    #[test]
    fn test_container_selector_fallback_order() {
        // No data-testid containers; the class-contains selector picks up
        let html = feed("<div class='feedItemBox'><h3>סוזוקי סוויפט</h3></div>");

        let listings = extract_listings(&html);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title.as_deref(), Some("סוזוקי סוויפט"));
    }

    #[test]
    fn test_no_containers_yields_empty() {
        let html = feed("<p>אין מודעות להצגה</p>");
        assert!(extract_listings(&html).is_empty());
    }

    #[test]
    fn test_details_cut_respects_char_boundaries() {
        let long_text = "ע".repeat(400);
        let html = feed(&item(&format!("<p>{}</p>", long_text)));

        let listings = extract_listings(&html);
        assert_eq!(listings[0].details.chars().count(), DETAILS_MAX_CHARS);
    }

    #[test]
    fn test_details_whitespace_normalized() {
        let html = feed(&item("<h3>קיה פיקנטו</h3>\n   <span>2021</span>\n"));

        let listings = extract_listings(&html);
        assert_eq!(listings[0].details, "קיה פיקנטו 2021");
    }
}
