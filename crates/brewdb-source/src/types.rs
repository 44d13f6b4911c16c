use serde::Deserialize;

/// Raw record shape returned by the Open Brewery DB listing endpoint.
///
/// Coordinates arrive as strings and may be blank or non-numeric; `id` and
/// `name` are defaulted to empty strings when missing so a single bad record
/// is dropped during normalization instead of failing the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamBrewery {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub brewery_type: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub phone: Option<String>,
    pub website_url: Option<String>,
}
