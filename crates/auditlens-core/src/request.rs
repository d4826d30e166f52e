//! Request body for the external analysis service

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Default analysis service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://design-analyzer-backend.onrender.com/analyze";

/// Kind of page being audited, sent as a hint to the analysis service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    #[default]
    Homepage,
    /// Product listing page
    #[serde(rename = "PLP")]
    Plp,
    /// Product detail page
    #[serde(rename = "PDP")]
    Pdp,
    Blog,
}

impl PageType {
    pub const ALL: [PageType; 4] = [PageType::Homepage, PageType::Plp, PageType::Pdp, PageType::Blog];

    /// Wire name used by the analysis service
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Homepage => "Homepage",
            PageType::Plp => "PLP",
            PageType::Pdp => "PDP",
            PageType::Blog => "Blog",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "homepage" | "home" => Ok(PageType::Homepage),
            "plp" | "product-listing" | "product_listing" => Ok(PageType::Plp),
            "pdp" | "product-detail" | "product_detail" => Ok(PageType::Pdp),
            "blog" => Ok(PageType::Blog),
            other => Err(anyhow!(
                "unknown page type: {other} (expected one of Homepage, PLP, PDP, Blog)"
            )),
        }
    }
}

/// JSON body posted to the analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub url: String,
    pub page_type: PageType,
}

impl AnalyzeRequest {
    pub fn new(url: impl Into<String>, page_type: PageType) -> Self {
        Self {
            url: url.into(),
            page_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_type_parsing() {
        assert_eq!("Homepage".parse::<PageType>().unwrap(), PageType::Homepage);
        assert_eq!("plp".parse::<PageType>().unwrap(), PageType::Plp);
        assert_eq!("Product-Detail".parse::<PageType>().unwrap(), PageType::Pdp);
        assert_eq!(" BLOG ".parse::<PageType>().unwrap(), PageType::Blog);
        assert!("landing".parse::<PageType>().is_err());
    }

    #[test]
    fn test_page_type_round_trips_through_display() {
        for page_type in PageType::ALL {
            assert_eq!(page_type.to_string().parse::<PageType>().unwrap(), page_type);
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(AnalyzeRequest::new("https://example.com/", PageType::Pdp))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"url": "https://example.com/", "pageType": "PDP"})
        );
    }

    #[test]
    fn test_default_page_type() {
        assert_eq!(PageType::default(), PageType::Homepage);
    }
}
