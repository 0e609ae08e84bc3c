//! Field extraction for flatmates.com.au pages.
//!
//! Everything here works on the HTML a browser hands back after
//! client-side rendering. The site uses CSS-module class names such as
//! `styles__roomRent___1xYz`, so elements are matched on class prefixes
//! rather than exact names.

use crate::models::{ListingData, MISSING_NUMBER, MISSING_TEXT};
use anyhow::{Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;
use tracing::{debug, warn};
use url::Url;

const LISTING_TILES: &str =
    "div[class^='styles__listings___'] > div[class^='styles__listingTileBox___']";
const TILE_LINK: &str = "a[class^='styles__contentBox___']";
const NEXT_PAGE: &str = "a[aria-label='Go to next page']";

const LISTING_ROOT: &str = "[initial_tracking_context_schema_data]";
const PRICE: &str = "a[class^='styles__roomRent___'] > div[class^='styles__value___']";
const MAIN_FEATURES: &str = "div[class^='styles__propertyMainFeatures___'] > div[class^='styles__propertyFeature___'] > div[class^='styles__value___']";
const PROPERTY_ABOUT: &str = "div[class^='styles__description__wrapper'] > p";
const PROPERTY_FEATURES: &str =
    "div[class^='styles__featureStyles__titleContainer___'] div[class^='styles__detail___']";
const ROOM_DETAILS: &str =
    "div[class^='styles__roomDetails___'] div[class^='styles__detail___']";
const DETAIL_TITLE: &str = "span[class^='styles__detail__title___']";
const DETAIL_SUBTITLE: &str = "span[class^='styles__detail__subTitle___']";
const DISTRICT: &str = "section[class^='styles__left___'] > div > h1";

const FLATMATES_HEADING: &str = "About the flatmates";
const FLATMATES_WRAPPER_PREFIX: &str = "styles__description__wrapper___";

/// Room detail titles with a word starting like this mark a stay or availability note
const AVAILABILITY_PATTERN: &str = r"(?i)\b(avail|stay|min|max|lease|term)";

const BLOCK_TAGS: [&str; 14] = [
    "address", "article", "br", "dd", "div", "dt", "h1", "h2", "h3", "h4", "li", "p", "section",
    "tr",
];

/// Listing links and pagination state of one search results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Number of listing tiles on the page, with or without a link
    pub tile_count: usize,
    /// Absolute listing URLs in page order
    pub links: Vec<String>,
    /// Whether a "Go to next page" control is present
    pub has_next: bool,
}

/// Build the URL of results page `page` for a filtered search
///
/// An existing `page` parameter on the search URL is replaced. Other query
/// segments are kept byte for byte.
pub fn search_page_url(base_url: &str, page: u32) -> Result<String> {
    let mut url = Url::parse(base_url).with_context(|| format!("Invalid search URL: {base_url}"))?;

    let mut segments: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty() && *segment != "page" && !segment.starts_with("page="))
        .collect();
    let page_segment = format!("page={page}");
    segments.push(&page_segment);

    let query = segments.join("&");
    url.set_query(Some(&query));

    Ok(url.into())
}

/// Collect listing links from a rendered search results page
pub fn parse_search_page(html: &str, page_url: &str) -> SearchPage {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let mut page = SearchPage {
        has_next: document.select(&selectors().next_page).next().is_some(),
        ..SearchPage::default()
    };

    for tile in document.select(&selectors().tiles) {
        page.tile_count += 1;

        let href = tile
            .select(&selectors().tile_link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        match href {
            Some(href) => page.links.push(resolve_link(base.as_ref(), href)),
            None => warn!("Listing tile {} on {} has no link", page.tile_count, page_url),
        }
    }

    debug!(
        "{}: {} tiles, {} links, next page: {}",
        page_url,
        page.tile_count,
        page.links.len(),
        page.has_next
    );

    page
}

/// Extract listing fields from a rendered listing page
///
/// Returns `None` when the page has no listing content at all. Individual
/// fields that cannot be found fall back to their sentinel.
pub fn extract_listing(html: &str, url: &str) -> Option<ListingData> {
    let document = Html::parse_document(html);

    let Some(root) = document.select(&selectors().root).next() else {
        warn!("No listing data element found on {}", url);
        return None;
    };

    let mut listing = ListingData::empty(url);

    if let Some(price) = root
        .select(&selectors().price)
        .next()
        .and_then(|el| first_number(&element_text(el)))
    {
        listing.price_per_week = price;
    }

    let main_features: Vec<i32> = root
        .select(&selectors().main_features)
        .map(|el| {
            first_number(&element_text(el))
                .and_then(|n| i32::try_from(n).ok())
                .unwrap_or(MISSING_NUMBER)
        })
        .collect();
    let feature_at = |idx: usize| main_features.get(idx).copied().unwrap_or(MISSING_NUMBER);
    listing.beds = feature_at(0);
    listing.baths = feature_at(1);
    listing.persons = feature_at(2);

    // The remaining sections sit outside the tracking root on some layouts
    if let Some(about) = document
        .select(&selectors().property_about)
        .map(element_text)
        .find(|text| !text.is_empty())
    {
        listing.property_about = about;
    }

    listing.property_features = join_or_missing(
        document
            .select(&selectors().property_features)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect(),
    );

    let details = room_details(&document);
    listing.availability = join_or_missing(
        details
            .iter()
            .filter(|detail| detail.is_availability())
            .map(RoomDetail::render)
            .collect(),
    );
    listing.room_overview = join_or_missing(details.iter().map(RoomDetail::render).collect());

    if let Some(about) = flatmates_about(&document) {
        listing.flatmates_about = about;
    }

    if let Some(district) = district(&document) {
        listing.district = district;
    }

    let missing = listing.missing_fields();
    if !missing.is_empty() {
        debug!("{}: missing {}", url, missing.join(", "));
    }

    Some(listing)
}

struct RoomDetail {
    title: String,
    subtitle: String,
}

impl RoomDetail {
    fn render(&self) -> String {
        if self.subtitle.is_empty() {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.subtitle)
        }
    }

    fn is_availability(&self) -> bool {
        static AVAILABILITY: OnceLock<Regex> = OnceLock::new();
        AVAILABILITY
            .get_or_init(|| Regex::new(AVAILABILITY_PATTERN).expect("availability pattern is valid"))
            .is_match(&self.title)
    }
}

fn room_details(document: &Html) -> Vec<RoomDetail> {
    document
        .select(&selectors().room_details)
        .filter_map(|detail| {
            let title = detail.select(&selectors().detail_title).next().map(element_text)?;
            if title.is_empty() {
                return None;
            }
            let subtitle = detail
                .select(&selectors().detail_subtitle)
                .next()
                .map(element_text)
                .unwrap_or_default();
            Some(RoomDetail { title, subtitle })
        })
        .collect()
}

fn flatmates_about(document: &Html) -> Option<String> {
    document
        .select(&selectors().heading)
        .filter(|heading| element_text(*heading) == FLATMATES_HEADING)
        .find_map(|heading| {
            heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| {
                    sibling.value().name() == "div"
                        && sibling
                            .value()
                            .attr("class")
                            .is_some_and(|class| class.starts_with(FLATMATES_WRAPPER_PREFIX))
                })
        })
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn district(document: &Html) -> Option<String> {
    document
        .select(&selectors().district)
        .filter(|heading| {
            heading
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|wrapper| wrapper.value().attrs().next().is_none())
        })
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn resolve_link(base: Option<&Url>, href: &str) -> String {
    match base.map(|base| base.join(href)) {
        Some(Ok(resolved)) => resolved.into(),
        _ => href.to_string(),
    }
}

fn join_or_missing(parts: Vec<String>) -> String {
    if parts.is_empty() {
        MISSING_TEXT.to_string()
    } else {
        parts.join(", ")
    }
}

/// Rendered text of an element with whitespace collapsed
fn element_text(element: ElementRef) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if matches!(el.name(), "script" | "style") {
                        continue;
                    }
                    let block = BLOCK_TAGS.contains(&el.name());
                    if block {
                        out.push(' ');
                    }
                    push_text(child_el, out);
                    if block {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

/// First integer in `text`, ignoring thousands separators
fn first_number(text: &str) -> Option<i64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| Regex::new(r"\d[\d,]*").expect("number pattern is valid"));

    number
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

struct Selectors {
    tiles: Selector,
    tile_link: Selector,
    next_page: Selector,
    root: Selector,
    price: Selector,
    main_features: Selector,
    property_about: Selector,
    property_features: Selector,
    room_details: Selector,
    detail_title: Selector,
    detail_subtitle: Selector,
    district: Selector,
    heading: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        tiles: parse_selector(LISTING_TILES),
        tile_link: parse_selector(TILE_LINK),
        next_page: parse_selector(NEXT_PAGE),
        root: parse_selector(LISTING_ROOT),
        price: parse_selector(PRICE),
        main_features: parse_selector(MAIN_FEATURES),
        property_about: parse_selector(PROPERTY_ABOUT),
        property_features: parse_selector(PROPERTY_FEATURES),
        room_details: parse_selector(ROOM_DETAILS),
        detail_title: parse_selector(DETAIL_TITLE),
        detail_subtitle: parse_selector(DETAIL_SUBTITLE),
        district: parse_selector(DISTRICT),
        heading: parse_selector("h3"),
    })
}

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css}: {err:?}"))
}
