use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Selectors for the total-results counter, most-specific-first. Yad2 class
/// names carry build-hash suffixes, so the structural ones come before the
/// literal class name.
pub const COUNTER_WAIT_SELECTORS: [&str; 6] = [
    "span[data-testid='total-items']",
    "span[class*='totalItems']",
    "span.results-feed_sortAndTotalBox__lFFyS",
    "span[class*='sortAndTotalBox']",
    "span[class*='totalResults']",
    "div[class*='totalBox'] span",
];

const NARROW_KEYWORDS: [&str; 2] = ["נמצאו", "מודעות"];
const WIDE_KEYWORDS: [&str; 4] = ["תוצאות", "מודעות", "נמצאו", "תוצאה"];

enum Strategy {
    Css(&'static str),
    SpanContains(&'static str),
}

const STRATEGIES: [Strategy; 8] = [
    Strategy::Css(COUNTER_WAIT_SELECTORS[0]),
    Strategy::Css(COUNTER_WAIT_SELECTORS[1]),
    Strategy::Css(COUNTER_WAIT_SELECTORS[2]),
    Strategy::Css(COUNTER_WAIT_SELECTORS[3]),
    Strategy::Css(COUNTER_WAIT_SELECTORS[4]),
    Strategy::Css(COUNTER_WAIT_SELECTORS[5]),
    Strategy::SpanContains(NARROW_KEYWORDS[0]),
    Strategy::SpanContains(NARROW_KEYWORDS[1]),
];

pub struct CounterExtractor {
    digit_run: Regex,
    markup_counter: Regex,
}

impl Default for CounterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterExtractor {
    pub fn new() -> Self {
        CounterExtractor {
            digit_run: Regex::new(r"\d+").unwrap(),
            markup_counter: Regex::new(r"(\d{1,6})\s*(תוצאות|מודעות|נמצאו|תוצאה)").unwrap(),
        }
    }

    /// Pull the total-results count out of a rendered page. Strategies are
    /// tried in order, first success wins; `None` means the counter could
    /// not be determined and the caller must treat the run as a soft
    /// failure.
    pub fn extract(&self, html: &str) -> Option<u64> {
        let document = Html::parse_document(html);

        let text = self
            .selector_cascade(&document)
            .or_else(|| self.narrow_span_scan(&document));

        if let Some(text) = text {
            if let Some(total) = self.first_number(&text) {
                return Some(total);
            }
        }

        if let Some(text) = self.wide_keyword_scan(&document) {
            if let Some(total) = self.first_number(&text) {
                return Some(total);
            }
        }

        self.markup_fallback(html)
    }

    // Stage 1: ordered candidates, text of the first matching element.
    fn selector_cascade(&self, document: &Html) -> Option<String> {
        for strategy in &STRATEGIES {
            let found = match strategy {
                Strategy::Css(selector_str) => {
                    let Ok(selector) = Selector::parse(selector_str) else {
                        continue;
                    };
                    document.select(&selector).next().map(element_text)
                }
                Strategy::SpanContains(keyword) => {
                    let selector = Selector::parse("span").unwrap();
                    document
                        .select(&selector)
                        .map(element_text)
                        .find(|text| text.contains(keyword))
                }
            };

            if let Some(text) = found {
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }

        None
    }

    // Stage 2: any span mentioning the counter keywords with a digit in it.
    fn narrow_span_scan(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse("span").unwrap();
        document
            .select(&selector)
            .map(element_text)
            .find(|text| {
                NARROW_KEYWORDS.iter().any(|kw| text.contains(kw))
                    && text.chars().any(|c| c.is_ascii_digit())
            })
    }

    // Stage 3: widen to every element and the full keyword set.
    fn wide_keyword_scan(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse("*").unwrap();
        document
            .select(&selector)
            .map(element_text)
            .find(|text| {
                WIDE_KEYWORDS.iter().any(|kw| text.contains(kw))
                    && text.chars().any(|c| c.is_ascii_digit())
            })
    }

    // Stage 4: the counter pattern straight out of the raw markup.
    fn markup_fallback(&self, html: &str) -> Option<u64> {
        self.markup_counter
            .captures(html)
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// The first maximal digit run in the text is the total; the Hebrew
    /// phrasing puts the count first.
    fn first_number(&self, text: &str) -> Option<u64> {
        self.digit_run
            .find(text)
            .and_then(|m| m.as_str().parse().ok())
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    #[test]
    fn test_extracts_from_testid_selector() {
        let extractor = CounterExtractor::new();
        let html = page(r#"<span data-testid="total-items">נמצאו 1234 מודעות</span>"#);

        assert_eq!(extractor.extract(&html), Some(1234));
    }

    #[test]
    fn test_extracts_from_hashed_class_name() {
        let extractor = CounterExtractor::new();
        let html = page(
            r#"<span class="results-feed_sortAndTotalBox__lFFyS">567 תוצאות</span>"#,
        );

        assert_eq!(extractor.extract(&html), Some(567));
    }

    #[test]
    fn test_most_specific_selector_wins() {
        let extractor = CounterExtractor::new();
        let html = page(concat!(
            r#"<div class="totalBox"><span>999</span></div>"#,
            r#"<span data-testid="total-items">נמצאו 11 מודעות</span>"#,
        ));

        assert_eq!(extractor.extract(&html), Some(11));
    }

    #[test]
    fn test_hebrew_span_strategy_without_structural_hints() {
        let extractor = CounterExtractor::new();
        let html = page(r#"<span>נמצאו 42 מודעות</span>"#);

        assert_eq!(extractor.extract(&html), Some(42));
    }

    #[test]
    fn test_first_digit_run_is_trusted() {
        let extractor = CounterExtractor::new();
        let html = page(r#"<span data-testid="total-items">נמצאו 120 מתוך 4500</span>"#);

        assert_eq!(extractor.extract(&html), Some(120));
    }

    #[test]
    fn test_zero_is_a_valid_count() {
        let extractor = CounterExtractor::new();
        let html = page(r#"<span>נמצאו 0 מודעות</span>"#);

        assert_eq!(extractor.extract(&html), Some(0));
    }

    #[test]
    fn test_wide_scan_picks_up_non_span_elements() {
        let extractor = CounterExtractor::new();
        let html = page(r#"<div class="feed-header">תוצאה אחת מתוך 83</div>"#);

        assert_eq!(extractor.extract(&html), Some(83));
    }

    #[test]
    fn test_script_embedded_counter_is_reachable() {
        let extractor = CounterExtractor::new();
        let html =
            "<html><head><script>var label = \"77 תוצאות\";</script></head><body></body></html>";

        assert_eq!(extractor.extract(html), Some(77));
    }

    #[test]
    fn test_markup_fallback_sees_attribute_values() {
        let extractor = CounterExtractor::new();
        // Not a text node anywhere; only the raw-markup pattern can find it
        let html = page(r#"<div aria-label="88 תוצאות"></div>"#);

        assert_eq!(extractor.extract(&html), Some(88));
    }

    #[test]
    fn test_digitless_candidate_degrades_to_fallbacks() {
        let extractor = CounterExtractor::new();
        // The structural selector matches but its text holds no number
        let html = "<html><body><span data-testid=\"total-items\">מודעות</span>\
                    <script>\"55 תוצאות\"</script></body></html>";

        assert_eq!(extractor.extract(html), Some(55));
    }

    #[test]
    fn test_markup_fallback_requires_keyword_after_digits() {
        let extractor = CounterExtractor::new();
        let html = page(r#"<p>ref 123456 something</p>"#);

        assert_eq!(extractor.extract(&html), None);
    }

    #[test]
    fn test_no_counter_anywhere_yields_none() {
        let extractor = CounterExtractor::new();
        let html = page(r#"<div>ברוכים הבאים</div>"#);

        assert_eq!(extractor.extract(&html), None);
    }

    #[test]
    fn test_first_number_parsing() {
        let extractor = CounterExtractor::new();

        assert_eq!(extractor.first_number("נמצאו 1234 מודעות"), Some(1234));
        assert_eq!(extractor.first_number("0 מודעות"), Some(0));
        assert_eq!(extractor.first_number("אין מודעות"), None);
    }
}
