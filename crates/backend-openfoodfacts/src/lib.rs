//! OpenFoodFacts product source.
//!
//! Provides the `ProductSource` trait and an implementation backed by the
//! OpenFoodFacts v2 product API. Payload normalization is pure so the
//! analysis core never sees the wire format.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use cleanlabel_model::{FetchErrorKind, NutritionData, Product};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Errors from product lookups.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid barcode: {0:?}")]
    InvalidBarcode(String),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Rate limited by product database")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: HTTP {0}")]
    Server(u16),

    #[error("Unexpected response: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Category used by the presentation layer.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::InvalidBarcode(_) => FetchErrorKind::InvalidBarcode,
            Self::NotFound(_) => FetchErrorKind::NotFound,
            Self::RateLimited => FetchErrorKind::RateLimited,
            Self::Network(_) => FetchErrorKind::Network,
            Self::Server(_) => FetchErrorKind::Server,
            Self::Unknown(_) => FetchErrorKind::Unknown,
        }
    }
}

/// Trait for product databases (OpenFoodFacts, local fixtures, etc.)
pub trait ProductSource {
    /// Fetch and normalize a product by barcode.
    fn fetch(&self, barcode: &str) -> impl Future<Output = Result<Product, FetchError>> + Send;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// OpenFoodFacts source configuration.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    /// Base URL of the v2 product endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org/api/v2/product".to_string(),
            timeout_secs: 30,
            user_agent: concat!("cleanlabel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// OpenFoodFacts product source.
pub struct OpenFoodFactsSource {
    config: OpenFoodFactsConfig,
    client: reqwest::Client,
}

impl OpenFoodFactsSource {
    /// Create a new OpenFoodFacts source.
    pub fn new(config: OpenFoodFactsConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/{}.json", self.config.base_url.trim_end_matches('/'), barcode)
    }
}

impl ProductSource for OpenFoodFactsSource {
    async fn fetch(&self, barcode: &str) -> Result<Product, FetchError> {
        let code = validate_barcode(barcode)?;
        let url = self.product_url(code);

        tracing::debug!(url = %url, "Fetching OpenFoodFacts product");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(code.to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if status.is_server_error() {
            return Err(FetchError::Server(status.as_u16()));
        }
        if !status.is_success() {
            return Err(FetchError::Unknown(format!("HTTP {status}")));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        let product = parse_product(code, &json)?;
        tracing::debug!(
            code = %product.code,
            ingredients = product.ingredients_list.len(),
            "Parsed OpenFoodFacts product"
        );
        Ok(product)
    }

    fn name(&self) -> &'static str {
        "openfoodfacts"
    }
}

/// Trim and check a barcode: 8 to 14 ASCII digits.
pub fn validate_barcode(barcode: &str) -> Result<&str, FetchError> {
    let code = barcode.trim();
    if (8..=14).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(code)
    } else {
        Err(FetchError::InvalidBarcode(barcode.to_string()))
    }
}

/// Normalize an OpenFoodFacts v2 product response.
pub fn parse_product(code: &str, response: &Value) -> Result<Product, FetchError> {
    let status = response.get("status").and_then(Value::as_i64);
    let product = match response.get("product") {
        Some(product) if status != Some(0) && product.is_object() => product,
        _ => return Err(FetchError::NotFound(code.to_string())),
    };

    let text = |key: &str| {
        product
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let raw_ingredients = text("ingredients_text");
    // Entries without text are skipped; an unusable list falls back to the raw text
    let structured: Vec<&str> = product
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("text").and_then(Value::as_str))
                .filter(|text| !text.trim().is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(Product {
        code: code.to_string(),
        name: text("product_name").unwrap_or("Unknown Product").to_string(),
        brand: text("brands").unwrap_or("Unknown Brand").to_string(),
        ingredients: raw_ingredients.unwrap_or("No ingredients listed").to_string(),
        ingredients_list: parse_ingredients_list(raw_ingredients, &structured),
        nutrition: parse_nutrition(product.get("nutriments")),
        image_url: text("image_front_url").map(str::to_string),
        nova_group: product.get("nova_group").and_then(parse_nova_group),
    })
}

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("parenthetical pattern should compile"));

/// Build the normalized ingredient token list.
///
/// Structured entries win when present. Otherwise the raw text is
/// lowercased, stripped of parentheticals and split on `,` and `;`.
pub fn parse_ingredients_list(raw: Option<&str>, structured: &[&str]) -> Vec<String> {
    if !structured.is_empty() {
        return structured
            .iter()
            .map(|text| text.to_lowercase().trim().to_string())
            .collect();
    }

    let Some(raw) = raw else {
        return Vec::new();
    };

    let lowered = raw.to_lowercase();
    PARENTHETICAL
        .replace_all(&lowered, "")
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract per-100 g nutrition. Sodium arrives in grams and is returned in
/// whole milligrams.
pub fn parse_nutrition(nutriments: Option<&Value>) -> NutritionData {
    let Some(nutriments) = nutriments else {
        return NutritionData::default();
    };
    let number = |key: &str| nutriments.get(key).and_then(Value::as_f64);

    NutritionData {
        calories: number("energy-kcal_100g"),
        fat: number("fat_100g"),
        saturated_fat: number("saturated-fat_100g"),
        carbs: number("carbohydrates_100g"),
        sugars: number("sugars_100g"),
        fiber: number("fiber_100g"),
        protein: number("proteins_100g"),
        sodium: number("sodium_100g")
            .filter(|g| g.is_finite() && *g >= 0.0)
            .map(|g| (g * 1000.0).round() as u32),
    }
}

fn parse_nova_group(value: &Value) -> Option<u8> {
    let group = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    u8::try_from(group).ok().filter(|g| (1..=4).contains(g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_validate_barcode() {
        assert_eq!(validate_barcode(" 0123456789012 ").unwrap(), "0123456789012");
        assert_eq!(validate_barcode("12345678").unwrap(), "12345678");
        assert!(matches!(validate_barcode("1234567"), Err(FetchError::InvalidBarcode(_))));
        assert!(matches!(validate_barcode("123456789012345"), Err(FetchError::InvalidBarcode(_))));
        assert!(matches!(validate_barcode("12345abc9"), Err(FetchError::InvalidBarcode(_))));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(FetchError::RateLimited.kind(), FetchErrorKind::RateLimited);
        assert_eq!(FetchError::Server(503).kind(), FetchErrorKind::Server);
        assert_eq!(FetchError::NotFound("1".into()).kind(), FetchErrorKind::NotFound);
    }

    #[test]
    fn test_ingredients_from_raw_text() {
        let list = parse_ingredients_list(
            Some("Water, High Fructose Corn Syrup; Natural Flavors (Contains Milk), , Salt"),
            &[],
        );
        assert_eq!(list, vec!["water", "high fructose corn syrup", "natural flavors", "salt"]);
    }

    #[test]
    fn test_structured_ingredients_win() {
        let list = parse_ingredients_list(Some("ignored, text"), &[" Sugar ", "COCOA BUTTER"]);
        assert_eq!(list, vec!["sugar", "cocoa butter"]);
        assert!(parse_ingredients_list(None, &[]).is_empty());
    }

    #[test]
    fn test_parse_nutrition() {
        let nutriments = json!({
            "energy-kcal_100g": 250.0,
            "sugars_100g": 12.5,
            "sodium_100g": 0.8,
        });
        let nutrition = parse_nutrition(Some(&nutriments));
        assert_eq!(nutrition.calories, Some(250.0));
        assert_eq!(nutrition.sugars, Some(12.5));
        assert_eq!(nutrition.fat, None);
        assert_eq!(nutrition.sodium, Some(800));
        assert_eq!(parse_nutrition(None), NutritionData::default());
    }

    #[test]
    fn test_parse_product() {
        let response = json!({
            "status": 1,
            "product": {
                "product_name": "Cola",
                "brands": "Fizz Co",
                "ingredients_text": "Carbonated water, high fructose corn syrup, caramel color",
                "nutriments": {"sodium_100g": 0.0045},
                "nova_group": 4,
            }
        });
        let product = parse_product("0001234567890", &response).unwrap();
        assert_eq!(product.name, "Cola");
        assert_eq!(product.brand, "Fizz Co");
        assert_eq!(
            product.ingredients_list,
            vec!["carbonated water", "high fructose corn syrup", "caramel color"]
        );
        assert_eq!(product.nutrition.sodium, Some(5));
        assert_eq!(product.nova_group, Some(4));
        assert_eq!(product.image_url, None);
    }

    #[test]
    fn test_parse_product_defaults() {
        let response = json!({"status": 1, "product": {"nova_group": "9"}});
        let product = parse_product("12345678", &response).unwrap();
        assert_eq!(product.name, "Unknown Product");
        assert_eq!(product.brand, "Unknown Brand");
        assert_eq!(product.ingredients, "No ingredients listed");
        assert!(product.ingredients_list.is_empty());
        assert_eq!(product.nova_group, None);
    }

    #[test]
    fn test_null_structured_ingredients_fall_back_to_raw_text() {
        let response = json!({
            "status": 1,
            "product": {"ingredients_text": "water, corn syrup", "ingredients": null}
        });
        let product = parse_product("12345678", &response).unwrap();
        assert_eq!(product.ingredients_list, vec!["water", "corn syrup"]);

        let response = json!({
            "status": 1,
            "product": {
                "ingredients_text": "water, corn syrup",
                "ingredients": [{"text": null}, {"id": "en:water"}]
            }
        });
        let product = parse_product("12345678", &response).unwrap();
        assert_eq!(product.ingredients_list, vec!["water", "corn syrup"]);
    }

    #[test]
    fn test_structured_entries_without_text_are_skipped() {
        let response = json!({
            "status": 1,
            "product": {
                "ingredients_text": "ignored",
                "ingredients": [{"text": "Water"}, {"text": null}, {"text": "Sugar"}]
            }
        });
        let product = parse_product("12345678", &response).unwrap();
        assert_eq!(product.ingredients_list, vec!["water", "sugar"]);
    }

    #[test]
    fn test_parse_product_not_found() {
        let missing = json!({"status": 0, "status_verbose": "product not found"});
        assert!(matches!(parse_product("12345678", &missing), Err(FetchError::NotFound(_))));
        let empty = json!({"status": 0, "product": {}});
        assert!(matches!(parse_product("12345678", &empty), Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_barcode_without_request() {
        let source = OpenFoodFactsSource::new(OpenFoodFactsConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let err = source.fetch("not-a-code").await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::InvalidBarcode);
        assert_eq!(source.name(), "openfoodfacts");
    }

    #[test]
    fn test_product_url() {
        let source = OpenFoodFactsSource::new(OpenFoodFactsConfig {
            base_url: "http://localhost/api/v2/product/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            source.product_url("12345678"),
            "http://localhost/api/v2/product/12345678.json"
        );
    }
}
