use scraper::{Html, Selector};

const MEDIA_SELECTOR: &str = "video, audio, iframe[src*='youtube'], iframe[src*='vimeo']";

/// Returns true if `html` contains a `<video>` or `<audio>` element, or an
/// iframe embedding YouTube or Vimeo
pub fn detect_media(html: &str) -> bool {
    let Ok(selector) = Selector::parse(MEDIA_SELECTOR) else {
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}
