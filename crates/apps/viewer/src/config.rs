use std::collections::BTreeMap;

use clap::{Parser, ValueEnum};
use formats::commons::wikipedia_base;
use foundation::{LatLng, LatLngBounds};
use overlays::{GeosearchQuery, MarksBackend, WIWOSM_ENDPOINT, WP_WORLD_ENDPOINT, WpWorldQuery};
use thiserror::Error;
use url::{Url, form_urlencoded};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL for {name}: {source}")]
    Url {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid value {value:?} for {name}")]
    Value { name: &'static str, value: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// wp-world marks service
    WpWorld,
    /// MediaWiki geosearch API
    Geosearch,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Wikipedia geodata overlays on a headless map")]
pub struct Args {
    /// Wikipedia language code (default: en)
    #[arg(long)]
    pub lang: Option<String>,

    /// Article whose geometry is shown; repeat for several
    #[arg(long = "article")]
    pub articles: Vec<String>,

    /// Wikimedia maps style (default: osm-intl)
    #[arg(long)]
    pub style: Option<String>,

    /// Browser-style fragment, e.g. "#/?lang=de&article=Innsbruck"
    #[arg(long)]
    pub hash: Option<String>,

    /// Marks backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Max marks per request (wp-world)
    #[arg(long)]
    pub max_rows: Option<u32>,

    /// Include coat-of-arms marks (wp-world)
    #[arg(long)]
    pub coats: bool,

    /// Ask for thumbnails (wp-world)
    #[arg(long)]
    pub thumbs: bool,

    /// Wiki root for geosearch (default: the language's Wikipedia)
    #[arg(long)]
    pub wiki: Option<String>,

    /// Geosearch namespace
    #[arg(long)]
    pub namespace: Option<i32>,

    /// Geosearch result limit
    #[arg(long)]
    pub limit: Option<u32>,

    /// Popup thumbnail width in pixels
    #[arg(long)]
    pub thumbnail_width: Option<u32>,

    /// WIWOSM geometry endpoint (env: WIWOSM_URL)
    #[arg(long)]
    pub wiwosm_url: Option<String>,

    /// Marks endpoint (env: MARKS_URL)
    #[arg(long)]
    pub marks_url: Option<String>,

    /// Initial center: lat,lng
    #[arg(long)]
    pub center: Option<String>,

    /// Initial zoom
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Fit the map to this box before loading: west,south,east,north
    #[arg(long)]
    pub bbox: Option<String>,

    /// Viewport size in pixels: WIDTHxHEIGHT
    #[arg(long)]
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub lang: String,
    pub articles: Vec<String>,
    pub style: String,
    pub backend: BackendKind,
    pub max_rows: u32,
    pub coats: bool,
    pub thumbs: bool,
    pub wiki: Option<Url>,
    pub namespace: i32,
    pub limit: u32,
    pub thumbnail_width: u32,
    pub wiwosm_url: String,
    pub marks_url: String,
    pub center: LatLng,
    pub zoom: f64,
    pub fit: Option<LatLngBounds>,
    pub size_px: [f64; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            articles: Vec::new(),
            style: "osm-intl".to_string(),
            backend: BackendKind::WpWorld,
            max_rows: 80,
            coats: false,
            thumbs: false,
            wiki: None,
            namespace: 0,
            limit: 500,
            thumbnail_width: 300,
            wiwosm_url: WIWOSM_ENDPOINT.to_string(),
            marks_url: WP_WORLD_ENDPOINT.to_string(),
            center: LatLng::new(47.3, 11.3),
            zoom: 9.0,
            fit: None,
            size_px: [1024.0, 768.0],
        }
    }
}

impl ViewerConfig {
    /// Defaults, then environment, then `--hash`, then explicit flags.
    pub fn resolve<F>(args: Args, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = env("WIWOSM_URL") {
            cfg.wiwosm_url = v;
        }
        if let Some(v) = env("MARKS_URL") {
            cfg.marks_url = v;
        }
        if let Some(hash) = &args.hash {
            cfg.apply_fragment(&parse_fragment(hash));
        }

        if let Some(lang) = args.lang {
            cfg.lang = lang;
        }
        if !args.articles.is_empty() {
            cfg.articles = args.articles;
        }
        if let Some(style) = args.style {
            cfg.style = style;
        }
        if let Some(backend) = args.backend {
            cfg.backend = backend;
        }
        if let Some(v) = args.max_rows {
            cfg.max_rows = v;
        }
        cfg.coats |= args.coats;
        cfg.thumbs |= args.thumbs;
        if let Some(v) = args.wiki {
            cfg.wiki = Some(parse_url("--wiki", &v)?);
        }
        if let Some(v) = args.namespace {
            cfg.namespace = v;
        }
        if let Some(v) = args.limit {
            cfg.limit = v;
        }
        if let Some(v) = args.thumbnail_width {
            cfg.thumbnail_width = v;
        }
        if let Some(v) = args.wiwosm_url {
            cfg.wiwosm_url = v;
        }
        if let Some(v) = args.marks_url {
            cfg.marks_url = v;
        }
        if let Some(v) = args.center {
            cfg.center = parse_center(&v)?;
        }
        if let Some(v) = args.zoom {
            cfg.zoom = v;
        }
        if let Some(v) = args.bbox {
            cfg.fit = Some(LatLngBounds::from_bbox_str(&v).ok_or(ConfigError::Value {
                name: "--bbox",
                value: v.clone(),
            })?);
        }
        if let Some(v) = args.size {
            cfg.size_px = parse_size(&v)?;
        }
        cfg.wiwosm_endpoint()?;
        cfg.marks_backend()?;
        Ok(cfg)
    }

    /// Keys `article` (repeatable), `lang` and `style`; others are ignored.
    pub fn apply_fragment(&mut self, query: &BTreeMap<String, Vec<String>>) {
        if let Some(articles) = query.get("article") {
            self.articles = articles.clone();
        }
        if let Some(lang) = query.get("lang").and_then(|v| v.first()) {
            self.lang = lang.clone();
        }
        if let Some(style) = query.get("style").and_then(|v| v.first()) {
            self.style = style.clone();
        }
    }

    pub fn wiwosm_endpoint(&self) -> Result<Url, ConfigError> {
        parse_url("wiwosm url", &self.wiwosm_url)
    }

    pub fn marks_backend(&self) -> Result<MarksBackend, ConfigError> {
        Ok(match self.backend {
            BackendKind::WpWorld => MarksBackend::WpWorld(WpWorldQuery {
                endpoint: parse_url("marks url", &self.marks_url)?,
                lang: self.lang.clone(),
                max_rows: self.max_rows,
                coats: self.coats,
                thumbs: self.thumbs,
            }),
            BackendKind::Geosearch => {
                let wiki = match &self.wiki {
                    Some(wiki) => wiki.clone(),
                    None => wikipedia_base(&self.lang).ok_or(ConfigError::Value {
                        name: "lang",
                        value: self.lang.clone(),
                    })?,
                };
                MarksBackend::Geosearch(GeosearchQuery {
                    wiki,
                    namespace: self.namespace,
                    limit: self.limit,
                    thumbnail_width: self.thumbnail_width,
                })
            }
        })
    }
}

/// Splits a `#/?k=v&k=v` fragment; repeated keys collect into a list.
pub fn parse_fragment(fragment: &str) -> BTreeMap<String, Vec<String>> {
    let query = fragment
        .trim_start_matches('#')
        .trim_start_matches('/')
        .trim_start_matches('?');
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        out.entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    out
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::Url { name, source })
}

fn parse_center(value: &str) -> Result<LatLng, ConfigError> {
    let invalid = || ConfigError::Value {
        name: "--center",
        value: value.to_string(),
    };
    let (lat, lng) = value.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
    Ok(LatLng::new(lat, lng))
}

fn parse_size(value: &str) -> Result<[f64; 2], ConfigError> {
    let invalid = || ConfigError::Value {
        name: "--size",
        value: value.to_string(),
    };
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok([f64::from(w), f64::from(h)])
}
