use url::Url;

/// Title prefix of media files on MediaWiki sites.
pub const FILE_PREFIX: &str = "File:";

/// Base URL of the Wikipedia edition for a language code.
pub fn wikipedia_base(lang: &str) -> Option<Url> {
    Url::parse(&format!("https://{lang}.wikipedia.org")).ok()
}

/// `{base}/wiki/{Title}` with spaces folded to underscores.
pub fn article_url(base: &Url, title: &str) -> Option<String> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop_if_empty();
        segments.push("wiki");
        segments.push(&title.trim().replace(' ', "_"));
    }
    Some(url.into())
}

pub fn is_media_title(title: &str) -> bool {
    title.starts_with(FILE_PREFIX)
}

/// Thumbnail URL for a `File:` title, resolved through `Special:FilePath`
/// on the same wiki. Returns `None` for non-media titles.
pub fn thumbnail_url(base: &Url, title: &str, width: u32) -> Option<String> {
    if !is_media_title(title) {
        return None;
    }
    let name = title[FILE_PREFIX.len()..].trim();
    if name.is_empty() {
        return None;
    }
    let mut url = base.clone();
    let prefix = url.path().trim_end_matches('/').to_string();
    // The file name is a sub-page of Special:FilePath; `set_path` escapes
    // what a path cannot carry.
    url.set_path(&format!(
        "{prefix}/wiki/Special:FilePath/{}",
        name.replace(' ', "_")
    ));
    url.query_pairs_mut()
        .clear()
        .append_pair("width", &width.to_string());
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::{article_url, is_media_title, thumbnail_url, wikipedia_base};
    use url::Url;

    #[test]
    fn builds_article_urls() {
        let base = wikipedia_base("de").expect("base");
        assert_eq!(
            article_url(&base, "Innsbruck Hauptbahnhof").as_deref(),
            Some("https://de.wikipedia.org/wiki/Innsbruck_Hauptbahnhof")
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let base = Url::parse("https://commons.wikimedia.org/").expect("url");
        assert_eq!(
            article_url(&base, "File:Nordkette.jpg").as_deref(),
            Some("https://commons.wikimedia.org/wiki/File:Nordkette.jpg")
        );
    }

    #[test]
    fn thumbnails_only_for_media_titles() {
        let base = Url::parse("https://commons.wikimedia.org").expect("url");
        assert!(is_media_title("File:Patscherkofel.jpg"));
        assert_eq!(thumbnail_url(&base, "Patscherkofel", 300), None);
        assert_eq!(
            thumbnail_url(&base, "File:Patscherkofel from north.jpg", 300).as_deref(),
            Some("https://commons.wikimedia.org/wiki/Special:FilePath/Patscherkofel_from_north.jpg?width=300")
        );
        assert_eq!(thumbnail_url(&base, "File:", 300), None);
    }
}
