//! Tile url templates with `{x}`, `{y}` and `{z}` placeholders.

use reqwest::Url;

use crate::error::TileFetchError;
use crate::tile_schema::TileIndex;

/// Url of a tile service with placeholders for the tile index.
///
/// Placeholders `{x}`, `{y}` and `{z}` are matched case-insensitively, and every occurrence of
/// each of them is substituted.
///
/// ```
/// use tilefetch::url_template::UrlTemplate;
/// use tilefetch::tile_schema::TileIndex;
///
/// let template = UrlTemplate::new("https://tile.openstreetmap.org/{z}/{x}/{y}.png");
/// let url = template.resolve(TileIndex::new(3, 5, 7))?;
/// assert_eq!(url.as_str(), "https://tile.openstreetmap.org/7/3/5.png");
/// # Ok::<(), tilefetch::error::TileFetchError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    /// Creates a new template. The template is not validated.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The template string as given on construction.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitutes the placeholders without parsing the result.
    pub fn substitute(&self, index: TileIndex) -> String {
        let url = replace_ignore_case(&self.template, "{x}", &index.x.to_string());
        let url = replace_ignore_case(&url, "{y}", &index.y.to_string());
        replace_ignore_case(&url, "{z}", &index.z.to_string())
    }

    /// Url of the tile with the given index.
    pub fn resolve(&self, index: TileIndex) -> Result<Url, TileFetchError> {
        let url = self.substitute(index);
        Url::parse(&url).map_err(|err| TileFetchError::InvalidUrl {
            url,
            reason: err.to_string(),
        })
    }
}

impl From<&str> for UrlTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UrlTemplate {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

fn replace_ignore_case(source: &str, token: &str, value: &str) -> String {
    // ASCII lowercasing keeps byte offsets, so match positions are valid in `source` too.
    let lowercase = source.to_ascii_lowercase();
    let mut result = String::with_capacity(source.len());
    let mut last = 0;
    for (start, _) in lowercase.match_indices(token) {
        result.push_str(&source[last..start]);
        result.push_str(value);
        last = start + token.len();
    }
    result.push_str(&source[last..]);
    result
}
