use formats::Feature;
use serde::Serialize;

/// Marker category → maki glyph class.
pub const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("adm1st", "maki-icon circle"),
    ("adm2nd", "maki-icon circle"),
    ("adm3rd", "maki-icon circle"),
    ("airport", "maki-icon airport"),
    ("city", "maki-icon circle"),
    ("country", "maki-icon circle"),
    ("edu", "maki-icon college"),
    ("event", "maki-icon theatre"),
    ("forest", "maki-icon park"),
    ("glacier", "maki-icon land-use"),
    ("isle", "maki-icon land-use"),
    ("landmark", "maki-icon marker"),
    ("mountain", "maki-icon triangle"),
    ("pass", "maki-icon golf"),
    ("railwaystation", "maki-icon rail"),
    ("river", "maki-icon water"),
    ("satellite", "maki-icon rocket"),
    ("state", "maki-icon circle"),
    ("waterbody", "maki-icon water"),
];

pub const GLYPH_SIZE_PX: [f64; 2] = [24.0, 24.0];
pub const GLYPH_ANCHOR_PX: [f64; 2] = [12.0, -3.0];
pub const PIN_SIZE_PX: [f64; 2] = [25.0, 41.0];
pub const PIN_ANCHOR_PX: [f64; 2] = [12.0, 41.0];
pub const LABEL_ANCHOR_PX: [f64; 2] = [-10.0, -5.0];
pub const LABEL_FONT_PX: f64 = 12.0;
pub const LABEL_PADDING_PX: f64 = 2.0;
pub const CIRCLE_RADIUS_PX: f64 = 10.0;

/// Rendering pass a marker belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IconMode {
    Glyph,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IconSpec {
    /// Category glyph drawn by CSS class.
    Glyph { class_name: &'static str },
    /// The widget's stock pin.
    DefaultPin,
    /// Text label next to the anchor.
    Label { text: String },
    Circle { radius_px: f64 },
}

impl IconSpec {
    pub fn size_px(&self) -> [f64; 2] {
        match self {
            IconSpec::Glyph { .. } => GLYPH_SIZE_PX,
            IconSpec::DefaultPin => PIN_SIZE_PX,
            IconSpec::Label { text } => estimate_label_size(text),
            IconSpec::Circle { radius_px } => [radius_px * 2.0, radius_px * 2.0],
        }
    }

    /// Offset from the icon's top-left corner to the geographic anchor.
    pub fn anchor_px(&self) -> [f64; 2] {
        match self {
            IconSpec::Glyph { .. } => GLYPH_ANCHOR_PX,
            IconSpec::DefaultPin => PIN_ANCHOR_PX,
            IconSpec::Label { .. } => LABEL_ANCHOR_PX,
            IconSpec::Circle { radius_px } => [*radius_px, *radius_px],
        }
    }
}

pub fn icon_class_for(category: &str) -> Option<&'static str> {
    CATEGORY_ICONS
        .binary_search_by(|(key, _)| (*key).cmp(category))
        .ok()
        .map(|i| CATEGORY_ICONS[i].1)
}

/// Icon for `feature` in the given pass. Label mode has nothing to draw for
/// untitled features.
pub fn resolve_icon(feature: &Feature, mode: IconMode) -> Option<IconSpec> {
    match mode {
        IconMode::Glyph => Some(
            feature
                .category()
                .and_then(icon_class_for)
                .map(|class_name| IconSpec::Glyph { class_name })
                .unwrap_or(IconSpec::DefaultPin),
        ),
        IconMode::Label => feature.title().map(|title| IconSpec::Label {
            text: title.to_string(),
        }),
    }
}

fn estimate_label_size(text: &str) -> [f64; 2] {
    let count = text.chars().count().max(1) as f64;
    [
        LABEL_FONT_PX * 0.6 * count + 2.0 * LABEL_PADDING_PX,
        LABEL_FONT_PX + 2.0 * LABEL_PADDING_PX,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::LatLng;

    fn feature(category: Option<&str>, title: Option<&str>) -> Feature {
        let mut f = Feature::point(LatLng::new(47.0, 11.0));
        if let Some(c) = category {
            f = f.with_property("category", c);
        }
        if let Some(t) = title {
            f = f.with_property("title", t);
        }
        f
    }

    #[test]
    fn icon_table_is_sorted_for_lookup() {
        assert!(CATEGORY_ICONS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn maps_known_categories() {
        assert_eq!(icon_class_for("mountain"), Some("maki-icon triangle"));
        assert_eq!(icon_class_for("railwaystation"), Some("maki-icon rail"));
        assert_eq!(icon_class_for("satellite"), Some("maki-icon rocket"));
        assert_eq!(icon_class_for("volcano"), None);
    }

    #[test]
    fn unmapped_category_falls_back_to_pin() {
        assert_eq!(
            resolve_icon(&feature(Some("volcano"), None), IconMode::Glyph),
            Some(IconSpec::DefaultPin)
        );
        assert_eq!(
            resolve_icon(&feature(None, None), IconMode::Glyph),
            Some(IconSpec::DefaultPin)
        );
        assert_eq!(
            resolve_icon(&feature(Some("river"), None), IconMode::Glyph),
            Some(IconSpec::Glyph {
                class_name: "maki-icon water"
            })
        );
    }

    #[test]
    fn label_mode_uses_title() {
        let spec = resolve_icon(&feature(Some("city"), Some("Hall")), IconMode::Label);
        let Some(IconSpec::Label { text }) = &spec else {
            panic!("expected label, got {spec:?}");
        };
        assert_eq!(text, "Hall");
        assert!(resolve_icon(&feature(Some("city"), None), IconMode::Label).is_none());

        let size = spec.as_ref().map(IconSpec::size_px).expect("size");
        assert!(size[0] > size[1]);
    }
}
