use reqwest::Url;

/// Confidence substituted when `min_confidence` falls outside `1..=10`.
const FALLBACK_MIN_CONFIDENCE: i32 = 5;

/// Optional request parameters for [`Client::geocode`](crate::Client::geocode).
///
/// Every field defaults to "not sent". Flags are sent as `1` only when `true`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeParams {
    /// Country hint (ISO 3166-1 alpha-2). Lower-cased before sending.
    pub country_code: Option<String>,
    pub limit: Option<u32>,
    /// Valid range is `1..=10`. `0` is not sent; anything else outside the
    /// range is silently replaced by `5` rather than rejected.
    pub min_confidence: Option<i32>,
    pub no_annotations: bool,
    pub no_dedupe: bool,
    pub no_record: bool,
    pub language: Option<String>,
    pub bounds: Option<Bounds>,
    pub add_request: bool,
    pub abbreviate: bool,
    pub pretty: bool,
}

/// Rectangle (in degrees) to bias results towards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeocodeParams {
    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_min_confidence(mut self, confidence: i32) -> Self {
        self.min_confidence = Some(confidence);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// `(name, value)` pairs for every parameter that should be sent.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(code) = non_empty(&self.country_code) {
            pairs.push(("countrycode", code.to_lowercase()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(confidence) = self.min_confidence.filter(|c| *c != 0) {
            pairs.push(("min_confidence", clamp_confidence(confidence).to_string()));
        }

        let flags = [
            ("no_annotations", self.no_annotations),
            ("no_dedupe", self.no_dedupe),
            ("no_record", self.no_record),
            ("add_request", self.add_request),
            ("abbrv", self.abbreviate),
            ("pretty", self.pretty),
        ];
        for (name, set) in flags {
            if set {
                pairs.push((name, "1".to_string()));
            }
        }

        if let Some(language) = non_empty(&self.language) {
            pairs.push(("language", language.to_string()));
        }
        if let Some(b) = &self.bounds {
            pairs.push((
                "bounds",
                format!("{},{},{},{}", b.west, b.south, b.east, b.north),
            ));
        }

        pairs
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn clamp_confidence(confidence: i32) -> i32 {
    if (1..=10).contains(&confidence) {
        confidence
    } else {
        FALLBACK_MIN_CONFIDENCE
    }
}

/// Builds `<endpoint>json?q=..&key=..&<params>`, percent-encoding every value.
pub(crate) fn geocode_url(
    endpoint: &Url,
    key: &str,
    query: &str,
    params: Option<&GeocodeParams>,
) -> Url {
    let mut url = endpoint.clone();
    let path = format!("{}/json", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);

    {
        let mut q = url.query_pairs_mut();
        q.append_pair("q", query);
        q.append_pair("key", key);
        if let Some(params) = params {
            for (name, value) in params.query_pairs() {
                q.append_pair(name, &value);
            }
        }
    }

    url
}
