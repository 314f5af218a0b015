// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Query building for the supported backends.
//!
//! Pure string construction: filters compose additively, unset filters
//! contribute nothing, and keywords are URL-encoded as-is with no
//! validation. No I/O and no failure modes.

use crate::domain::models::search_query::{ImageType, SearchQuery};

/// Compose the Bing `qft` filter string.
pub fn bing_filter_string(query: &SearchQuery) -> String {
    let mut filter = String::new();

    match query.image_type {
        Some(ImageType::FaceOnly) => filter.push_str("+filterui:face-face"),
        Some(ImageType::Photo) => filter.push_str("+filterui:photo-photo"),
        Some(ImageType::Clipart) => filter.push_str("+filterui:photo-clipart"),
        Some(ImageType::LineDrawing) => filter.push_str("+filterui:photo-linedrawing"),
        Some(ImageType::Animated) => filter.push_str("+filterui:photo-animatedgif"),
        Some(ImageType::Transparent) => filter.push_str("+filterui:photo-transparent"),
        None => {}
    }

    if let Some(color) = query.color.as_deref() {
        if color.eq_ignore_ascii_case("bw") || color.eq_ignore_ascii_case("color") {
            filter.push_str(&format!("+filterui:color2-{}", color.to_ascii_lowercase()));
        } else {
            // Specific colors use Bing's FGcls_{COLOR} form
            filter.push_str(&format!(
                "+filterui:color2-FGcls_{}",
                color.to_ascii_uppercase()
            ));
        }
    }

    filter
}

/// Path and query string for one page of Bing's async image-results endpoint.
///
/// `first` is the zero-based result offset, `count` the page size.
pub fn bing_async_path(query: &SearchQuery, first: usize, count: usize) -> String {
    format!(
        "/images/async?q={}&first={}&count={}&adlt={}&qft={}",
        urlencoding::encode(&query.keywords),
        first,
        count,
        query.adult.as_param(),
        bing_filter_string(query)
    )
}

/// Full URL for one page of Bing's async image-results endpoint.
pub fn bing_async_url(query: &SearchQuery, first: usize, count: usize) -> String {
    format!("https://www.bing.com{}", bing_async_path(query, first, count))
}

/// Bing image-search URL for the rendered-page strategy.
pub fn bing_search_url(query: &SearchQuery) -> String {
    format!(
        "https://www.bing.com/images/search?q={}&qft={}",
        urlencoding::encode(&query.keywords),
        bing_filter_string(query)
    )
}

/// Google image-search URL for the rendered-page strategy.
pub fn google_search_url(query: &SearchQuery) -> String {
    let mut url = format!(
        "https://www.google.com/search?tbm=isch&hl=en&q={}",
        urlencoding::encode(&query.keywords)
    );

    url.push_str(if query.safe_mode {
        "&safe=on"
    } else {
        "&safe=off"
    });

    let mut filter = String::from("&tbs=");

    if let Some(color) = query.color.as_deref() {
        if color.eq_ignore_ascii_case("bw") {
            filter.push_str("ic:gray%2C");
        } else {
            filter.push_str(&format!("ic:specific%2Cisc:{}%2C", color.to_ascii_lowercase()));
        }
    }

    match query.image_type {
        Some(ImageType::FaceOnly) => filter.push_str("itp:face"),
        // Google names the line-drawing filter "lineart"
        Some(ImageType::LineDrawing) => filter.push_str("itp:lineart"),
        Some(ImageType::Photo) => filter.push_str("itp:photo"),
        Some(ImageType::Clipart) => filter.push_str("itp:clipart"),
        Some(ImageType::Animated) => filter.push_str("itp:animated"),
        Some(ImageType::Transparent) => filter.push_str("itp:transparent"),
        None => {}
    }

    url.push_str(&filter);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::search_query::AdultFilter;

    #[test]
    fn test_bing_async_path_plain() {
        let query = SearchQuery::new("tabby cat");
        let path = bing_async_path(&query, 0, 35);

        assert_eq!(path, "/images/async?q=tabby%20cat&first=0&count=35&adlt=off&qft=");
    }

    #[test]
    fn test_bing_async_path_offset_and_adult() {
        let query = SearchQuery::new("cat").with_adult(AdultFilter::On);
        let path = bing_async_path(&query, 70, 35);

        assert!(path.contains("first=70"));
        assert!(path.contains("count=35"));
        assert!(path.contains("adlt=on"));
    }

    #[test]
    fn test_bing_filters_compose_additively() {
        let query = SearchQuery::new("cat")
            .with_image_type(Some(ImageType::Animated))
            .with_color(Some("red".to_string()));
        let filter = bing_filter_string(&query);

        assert_eq!(
            filter,
            "+filterui:photo-animatedgif+filterui:color2-FGcls_RED"
        );
    }

    #[test]
    fn test_bing_bw_color_form() {
        let query = SearchQuery::new("cat").with_color(Some("bw".to_string()));
        assert_eq!(bing_filter_string(&query), "+filterui:color2-bw");
    }

    #[test]
    fn test_bing_unset_filters_contribute_nothing() {
        let query = SearchQuery::new("cat");
        assert_eq!(bing_filter_string(&query), "");
    }

    #[test]
    fn test_bing_search_url() {
        let query = SearchQuery::new("cat").with_image_type(Some(ImageType::FaceOnly));
        assert_eq!(
            bing_search_url(&query),
            "https://www.bing.com/images/search?q=cat&qft=+filterui:face-face"
        );
    }

    #[test]
    fn test_google_search_url_filters() {
        let query = SearchQuery::new("tabby cat")
            .with_image_type(Some(ImageType::LineDrawing))
            .with_color(Some("blue".to_string()))
            .with_safe_mode(true);
        let url = google_search_url(&query);

        assert!(url.starts_with("https://www.google.com/search?tbm=isch&hl=en&q=tabby%20cat"));
        assert!(url.contains("&safe=on"));
        assert!(url.contains("&tbs=ic:specific%2Cisc:blue%2Citp:lineart"));
    }

    #[test]
    fn test_google_search_url_defaults() {
        let query = SearchQuery::new("cat");
        let url = google_search_url(&query);

        assert!(url.contains("&safe=off"));
        assert!(url.ends_with("&tbs="));
    }

    #[test]
    fn test_malformed_keywords_pass_through_encoded() {
        let query = SearchQuery::new("50% off? cats & dogs");
        let path = bing_async_path(&query, 0, 35);

        assert!(path.contains("q=50%25%20off%3F%20cats%20%26%20dogs"));
    }
}
