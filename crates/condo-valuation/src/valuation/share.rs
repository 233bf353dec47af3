use super::domain::PropertyDetails;
use url::{form_urlencoded, Url};

#[derive(Debug, thiserror::Error)]
pub enum ShareLinkError {
    #[error("invalid share base url: {0}")]
    InvalidBase(#[from] url::ParseError),
    #[error("share link is missing '{0}'")]
    Missing(&'static str),
    #[error("share link has an invalid '{field}' value: '{value}'")]
    Invalid { field: &'static str, value: String },
}

/// Query string that reproduces a valuation form: `city`, `year`, `price`,
/// `size`, then the optional `project` and `beds`.
pub fn share_query(details: &PropertyDetails) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair("city", &details.city)
        .append_pair("year", &details.year_purchased.to_string())
        .append_pair("price", &details.original_price.to_string())
        .append_pair("size", &details.square_footage.to_string());
    if let Some(project) = details.project_name.as_deref() {
        serializer.append_pair("project", project);
    }
    if let Some(beds) = details.bedrooms.as_deref() {
        serializer.append_pair("beds", beds);
    }
    serializer.finish()
}

/// Attaches the share query to `base`, replacing any query it already had.
pub fn share_url(base: &str, details: &PropertyDetails) -> Result<Url, ShareLinkError> {
    let mut url = Url::parse(base)?;
    url.set_query(Some(&share_query(details)));
    Ok(url)
}

/// Rebuilds property details from a share query. A leading `?` is ignored and
/// blank optional fields are treated as absent.
pub fn parse_share_query(query: &str) -> Result<PropertyDetails, ShareLinkError> {
    let mut city = None;
    let mut year = None;
    let mut price = None;
    let mut size = None;
    let mut project = None;
    let mut beds = None;

    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        let value = value.trim().to_string();
        match key.as_ref() {
            "city" => city = Some(value),
            "year" => year = Some(value),
            "price" => price = Some(value),
            "size" => size = Some(value),
            "project" => project = Some(value),
            "beds" => beds = Some(value),
            _ => {}
        }
    }

    let city = city
        .filter(|value| !value.is_empty())
        .ok_or(ShareLinkError::Missing("city"))?;
    let year_purchased = parse_field("year", year)?;
    let original_price: f64 = parse_field("price", price)?;
    let square_footage: f64 = parse_field("size", size)?;

    for (field, value) in [("price", original_price), ("size", square_footage)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ShareLinkError::Invalid {
                field,
                value: value.to_string(),
            });
        }
    }

    Ok(PropertyDetails {
        year_purchased,
        original_price,
        square_footage,
        city,
        project_name: project.filter(|value| !value.is_empty()),
        bedrooms: beds.filter(|value| !value.is_empty()),
    })
}

fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    raw: Option<String>,
) -> Result<T, ShareLinkError> {
    let raw = raw.ok_or(ShareLinkError::Missing(field))?;
    raw.parse::<T>()
        .map_err(|_| ShareLinkError::Invalid { field, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_lists_fields_in_form_order() {
        let details = PropertyDetails::new(2022, 725_000.0, 610.0, "Richmond Hill")
            .with_project("Line 5 Condos")
            .with_bedrooms("1+Den");
        assert_eq!(
            share_query(&details),
            "city=Richmond+Hill&year=2022&price=725000&size=610&project=Line+5+Condos&beds=1%2BDen"
        );
    }

    #[test]
    fn share_url_replaces_existing_query() {
        let details = PropertyDetails::new(2021, 600_000.0, 650.0, "Toronto");
        let url = share_url("https://valuations.example.com/tool?stale=1", &details)
            .expect("url builds");
        assert_eq!(
            url.as_str(),
            "https://valuations.example.com/tool?city=Toronto&year=2021&price=600000&size=650"
        );
    }

    #[test]
    fn parses_shared_query_back_into_details() {
        let details = parse_share_query("?city=North+York&year=2023&price=540000.5&size=520&beds=2")
            .expect("query parses");
        assert_eq!(details.city, "North York");
        assert_eq!(details.year_purchased, 2023);
        assert_eq!(details.original_price, 540_000.5);
        assert_eq!(details.square_footage, 520.0);
        assert_eq!(details.bedrooms.as_deref(), Some("2"));
        assert!(details.project_name.is_none());
    }

    #[test]
    fn reports_missing_and_invalid_fields() {
        assert!(matches!(
            parse_share_query("year=2021&price=1&size=1"),
            Err(ShareLinkError::Missing("city"))
        ));
        assert!(matches!(
            parse_share_query("city=Ajax&year=soon&price=1&size=1"),
            Err(ShareLinkError::Invalid { field: "year", .. })
        ));
        assert!(matches!(
            parse_share_query("city=Ajax&year=2021&price=-5&size=1"),
            Err(ShareLinkError::Invalid { field: "price", .. })
        ));
        assert!(matches!(
            share_url("not a url", &PropertyDetails::new(2021, 1.0, 1.0, "Ajax")),
            Err(ShareLinkError::InvalidBase(_))
        ));
    }
}
