//! HTML shaped like rendered flatmates.com.au pages, for tests.

/// Search results page with one tile per link
pub fn search_page(links: &[&str], has_next: bool) -> String {
    let tiles: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<div class="styles__listingTileBox___k2d">
                     <a class="styles__contentBox___q9s" href="{href}"><h2>Room</h2></a>
                   </div>"#
            )
        })
        .collect();

    let next = if has_next {
        r#"<a aria-label="Go to next page" href="/next">Next</a>"#
    } else {
        ""
    };

    format!(
        r#"<html><body>
             <div class="styles__listings___z81">{tiles}</div>
             <nav>{next}</nav>
           </body></html>"#
    )
}

/// Parts of a listing page; `None` or empty leaves the element out
#[derive(Debug, Clone, Default)]
pub struct ListingFixture {
    pub with_root: bool,
    pub price: Option<&'static str>,
    pub main_features: Vec<&'static str>,
    pub property_about: Option<&'static str>,
    pub property_features: Vec<&'static str>,
    pub room_details: Vec<(&'static str, &'static str)>,
    pub flatmates_about: Option<&'static str>,
    pub district: Option<&'static str>,
}

impl ListingFixture {
    pub fn complete() -> Self {
        Self {
            with_root: true,
            price: Some("$1,250 / week"),
            main_features: vec!["3", "2 baths", "4"],
            property_about: Some("Sunny terrace\n   close to the station."),
            property_features: vec!["Internet", "Parking", "Garden"],
            room_details: vec![
                ("Private room", "Furnished"),
                ("Available now", "  "),
                ("Min stay", "3 months"),
            ],
            flatmates_about: Some("Two students who like cooking."),
            district: Some("Newtown"),
        }
    }
}

/// Listing page built from a fixture
pub fn listing_page(fixture: &ListingFixture) -> String {
    let price = fixture
        .price
        .map(|price| {
            format!(
                r#"<a class="styles__roomRent___r1" href="/next"><div class="styles__value___v1">{price}</div></a>"#
            )
        })
        .unwrap_or_default();

    let main_features: String = fixture
        .main_features
        .iter()
        .map(|value| {
            format!(
                r#"<div class="styles__propertyFeature___f1"><div class="styles__value___v1">{value}</div></div>"#
            )
        })
        .collect();

    let root_open = if fixture.with_root {
        r#"<div class="styles__listing___m0" initial_tracking_context_schema_data="{&quot;id&quot;:1}">"#
    } else {
        r#"<div class="styles__listing___m0">"#
    };

    let district = fixture
        .district
        .map(|district| format!("<div><h1>{district}</h1></div>"))
        .unwrap_or_default();

    let property_about = fixture
        .property_about
        .map(|about| {
            format!(
                r#"<h3>About the property</h3><div class="styles__description__wrapper___d1"><p>{about}</p></div>"#
            )
        })
        .unwrap_or_default();

    let property_features = if fixture.property_features.is_empty() {
        String::new()
    } else {
        let details: String = fixture
            .property_features
            .iter()
            .map(|feature| format!(r#"<div class="styles__detail___t1">{feature}</div>"#))
            .collect();
        format!(
            r#"<div class="styles__featureStyles__titleContainer___c1"><h4>Features</h4>{details}</div>"#
        )
    };

    let room_details = if fixture.room_details.is_empty() {
        String::new()
    } else {
        let details: String = fixture
            .room_details
            .iter()
            .map(|(title, subtitle)| {
                format!(
                    r#"<div class="styles__detail___t1">
                         <span class="styles__detail__title___s1">{title}</span>
                         <span class="styles__detail__subTitle___s2">{subtitle}</span>
                       </div>"#
                )
            })
            .collect();
        format!(r#"<div class="styles__roomDetails___o1">{details}</div>"#)
    };

    let flatmates_about = fixture
        .flatmates_about
        .map(|about| {
            format!(
                r#"<h3>About the flatmates</h3><div class="styles__description__wrapper___d2">{about}</div>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<html><body>
             {root_open}
               <section class="styles__left___l1">
                 {district}
                 {price}
                 <div class="styles__propertyMainFeatures___p1">{main_features}</div>
                 {room_details}
                 {property_about}
                 {property_features}
                 {flatmates_about}
               </section>
             </div>
           </body></html>"#
    )
}
