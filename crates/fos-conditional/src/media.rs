//! Media Environment
//!
//! Evaluates media query lists against the current viewport and user
//! preferences.

/// Media type of the output device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Screen,
    Print,
}

/// Color scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSchemePreference {
    #[default]
    Light,
    Dark,
}

/// Everything a media query can be evaluated against
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEnvironment {
    pub media_type: MediaType,
    /// Viewport width in CSS px
    pub width: f64,
    /// Viewport height in CSS px
    pub height: f64,
    /// prefers-color-scheme
    pub color_scheme: ColorSchemePreference,
    /// prefers-reduced-motion
    pub reduced_motion: bool,
}

impl Default for MediaEnvironment {
    fn default() -> Self {
        Self {
            media_type: MediaType::Screen,
            width: 1024.0,
            height: 768.0,
            color_scheme: ColorSchemePreference::Light,
            reduced_motion: false,
        }
    }
}

impl MediaEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Comma-separated query list; matches if any query matches
    pub fn matches(&self, query_list: &str) -> bool {
        query_list.split(',').any(|query| self.matches_query(query))
    }

    fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }

        let (negated, rest) = if let Some(rest) = query.strip_prefix("not ") {
            (true, rest.trim_start())
        } else if let Some(rest) = query.strip_prefix("only ") {
            (false, rest.trim_start())
        } else {
            (false, query.as_str())
        };

        let result = rest.split(" and ").map(str::trim).all(|part| {
            match part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
                Some(feature) => self.matches_feature(feature),
                None => self.matches_media_type(part),
            }
        });

        result != negated
    }

    fn matches_media_type(&self, media_type: &str) -> bool {
        match media_type {
            "all" => true,
            "screen" => self.media_type == MediaType::Screen,
            "print" => self.media_type == MediaType::Print,
            _ => false,
        }
    }

    fn matches_feature(&self, feature: &str) -> bool {
        let Some((name, value)) = feature.split_once(':') else {
            // Boolean context, e.g. `(color)`
            return matches!(feature.trim(), "color" | "width" | "height");
        };
        let (name, value) = (name.trim(), value.trim());

        match name {
            "min-width" => parse_length(value).is_some_and(|v| self.width >= v),
            "max-width" => parse_length(value).is_some_and(|v| self.width <= v),
            "width" => parse_length(value).is_some_and(|v| self.width == v),
            "min-height" => parse_length(value).is_some_and(|v| self.height >= v),
            "max-height" => parse_length(value).is_some_and(|v| self.height <= v),
            "height" => parse_length(value).is_some_and(|v| self.height == v),
            "orientation" => match value {
                "portrait" => self.height >= self.width,
                "landscape" => self.width > self.height,
                _ => false,
            },
            "prefers-color-scheme" => match value {
                "dark" => self.color_scheme == ColorSchemePreference::Dark,
                "light" => self.color_scheme == ColorSchemePreference::Light,
                _ => false,
            },
            "prefers-reduced-motion" => match value {
                "reduce" => self.reduced_motion,
                "no-preference" => !self.reduced_motion,
                _ => false,
            },
            _ => false,
        }
    }
}

/// `px`, `em`/`rem` (16px) or unitless numbers
fn parse_length(value: &str) -> Option<f64> {
    if let Some(px) = value.strip_suffix("px") {
        return px.trim().parse().ok();
    }
    if let Some(em) = value.strip_suffix("rem").or_else(|| value.strip_suffix("em")) {
        return em.trim().parse::<f64>().ok().map(|v| v * 16.0);
    }
    value.parse().ok()
}
