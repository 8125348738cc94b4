//! Text normalization for prices, mileage, titles and URLs.
//!
//! Everything here is a pure function over strings. Inputs that cannot be
//! understood resolve to the field default and are logged, never returned as
//! errors.

use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

/// Model names the title splitter recognises, including multi-word models.
pub const KNOWN_MODELS: &[&str] = &[
    "ONIX PLUS",
    "ONIX",
    "HB20",
    "MOBI",
    "NOVA SAVEIRO",
    "SAVEIRO",
    "COROLLA",
    "GOL",
    "PARTNER",
    "S10",
    "RENEGADE",
    "TIGUAN ALLSPAC",
    "TIGUAN",
    "STRADA",
    "KWID",
    "POLO",
    "VIRTUS",
    "CRONOS",
    "ARGO",
    "TORO",
    "COMPASS",
    "CLIO",
    "CITY",
    "CRUZE",
    "SENTRA",
    "CLASSIC",
    "FOX",
    "FOCUS",
    "IX35",
];

static YEAR_RANGE_IN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d{4}/\d{4}\s+-").unwrap());

static YEAR_IN_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\d{4}\s+-").unwrap());

static KM_IN_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+[\d.]+KM").unwrap());

/// Amount following the "R$" currency marker.
static CURRENCY_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R\$\s*([\d.,]+)").unwrap());

/// Parses a BRL price such as `"R$ 45.900,00"` into a number.
///
/// When both `,` and `.` are present the later one is the decimal point; a
/// lone `,` is the decimal point. Anything unparsable is `0.0`.
pub fn parse_price(text: &str) -> f64 {
    let mut cleaned: String =
        text.chars().filter(|c| !matches!(c, 'R' | '$') && !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if dot < comma => {
            cleaned = cleaned.replace('.', "").replace(',', ".");
        }
        (Some(_), Some(_)) => {
            cleaned = cleaned.replace(',', "");
        }
        (Some(_), None) => {
            cleaned = cleaned.replace(',', ".");
        }
        _ => {}
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            warn!("Could not parse price: {} (cleaned: {})", text, cleaned);
            0.0
        }
    }
}

/// Extracts the amount after `R$` from a price element's text.
pub fn currency_amount(text: &str) -> Option<&str> {
    CURRENCY_AMOUNT.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// Parses a mileage such as `"45.320 KM"` by keeping only its digits.
pub fn parse_km(text: &str) -> u64 {
    let digits = digits_only(text);
    match digits.parse() {
        Ok(km) => km,
        Err(_) => {
            if !text.is_empty() {
                warn!("Could not parse km: {}", text);
            }
            0
        }
    }
}

/// Parses a door count such as `"4 portas"`; no digits means 0.
pub fn parse_doors(text: &str) -> u32 {
    digits_only(text).parse().unwrap_or(0)
}

fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Replaces non-ASCII whitespace (`&nbsp;` and friends) with a plain space.
///
/// `regex_lite` only treats ASCII whitespace as `\s`.
pub fn ascii_spaces(text: &str) -> String {
    text.chars().map(|c| if c.is_whitespace() && !c.is_ascii() { ' ' } else { c }).collect()
}

/// Cleans a page title into a vehicle name.
pub struct TitleCleaner {
    dealer_suffix: Option<Regex>,
}

impl TitleCleaner {
    /// Builds a cleaner for titles shaped like `"<name> em <city> - <dealer>"`.
    pub fn new(dealer_name: &str) -> Self {
        let pattern = format!(r"(?i)\s+em\s+\S+\s*-\s*{}", regex_lite::escape(dealer_name));
        let dealer_suffix = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Ignoring dealer suffix pattern for {:?}: {}", dealer_name, e);
                None
            }
        };
        Self { dealer_suffix }
    }

    /// Drops the dealer suffix and any year or mileage leaking into the title.
    pub fn clean(&self, title: &str) -> String {
        let title = ascii_spaces(title);
        let title = title.trim();
        let name = match self.dealer_suffix.as_ref().and_then(|re| re.find(title)) {
            Some(m) => &title[..m.start()],
            None => title,
        };

        let name = YEAR_RANGE_IN_TITLE.replace_all(name.trim(), "");
        let name = YEAR_IN_TITLE.replace_all(name.trim(), "");
        let name = KM_IN_TITLE.replace_all(name.trim(), "");
        name.trim().to_string()
    }
}

/// Brand, model and version decomposed from a vehicle name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub brand: String,
    pub model_base: String,
    pub version_details: String,
}

/// Splits vehicle names using a longest-first list of known models.
pub struct ModelSplitter {
    models: Vec<String>,
}

impl Default for ModelSplitter {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ModelSplitter {
    /// Creates a splitter from the built-in models plus `extra`.
    pub fn new(extra: &[String]) -> Self {
        let mut models: Vec<String> = KNOWN_MODELS
            .iter()
            .map(|m| m.to_string())
            .chain(extra.iter().map(|m| m.trim().to_ascii_uppercase()))
            .filter(|m| !m.is_empty())
            .collect();
        models.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        models.dedup();
        Self { models }
    }

    /// Splits `"VOLKSWAGEN TIGUAN ALLSPAC COMFORTLINE"` into
    /// `VOLKSWAGEN` / `TIGUAN ALLSPAC` / `COMFORTLINE`.
    ///
    /// Unknown models fall back to the first word after the brand.
    pub fn split(&self, name: &str) -> NameParts {
        let (brand, rest) = match name.split_once(' ') {
            Some((brand, rest)) => (brand, rest),
            None => (name, name),
        };

        let upper = rest.to_ascii_uppercase();
        for model in &self.models {
            if upper == *model || upper.starts_with(&format!("{} ", model)) {
                return NameParts {
                    brand: brand.to_string(),
                    model_base: model.clone(),
                    version_details: rest[model.len()..].trim().to_string(),
                };
            }
        }

        let (model_base, version_details) = rest.split_once(' ').unwrap_or((rest, ""));
        NameParts {
            brand: brand.to_string(),
            model_base: model_base.to_string(),
            version_details: version_details.to_string(),
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

/// Resolves `href` against the site origin. Absolute http(s) URLs pass through.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    base.join(href).ok().map(String::from)
}

/// Returns true when the URL looks like a raster image.
pub fn is_image_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    [".jpg", ".jpeg", ".png", ".webp"].iter().any(|ext| lower.contains(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://eurocarveiculos.com").unwrap()
    }

    #[test]
    fn test_parse_price_brazilian() {
        assert_eq!(parse_price("R$ 45.900,00"), 45900.0);
        assert_eq!(parse_price("45.900,50"), 45900.5);
        assert_eq!(parse_price("R$ 1.234.567,89"), 1234567.89);
    }

    #[test]
    fn test_parse_price_dot_decimal() {
        assert_eq!(parse_price("R$ 1,234.56"), 1234.56);
        assert_eq!(parse_price("1,234,567.00"), 1234567.0);
    }

    #[test]
    fn test_parse_price_single_separator() {
        assert_eq!(parse_price("99,90"), 99.9);
        assert_eq!(parse_price("R$ 89900"), 89900.0);
        // A lone dot is read as a decimal point
        assert_eq!(parse_price("45.900"), 45.9);
    }

    #[test]
    fn test_parse_price_unparsable() {
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("R$"), 0.0);
        assert_eq!(parse_price("Consulte"), 0.0);
        assert_eq!(parse_price("1.2.3,4,5"), 0.0);
        assert_eq!(parse_price("-500"), 0.0);
        assert_eq!(parse_price("inf"), 0.0);
    }

    #[test]
    fn test_currency_amount() {
        assert_eq!(currency_amount("Por R$ 45.900,00 à vista"), Some("45.900,00"));
        assert_eq!(currency_amount("R$89.900"), Some("89.900"));
        assert_eq!(currency_amount("Consulte"), None);
    }

    #[test]
    fn test_parse_km() {
        assert_eq!(parse_km("45.320 KM"), 45320);
        assert_eq!(parse_km("0 km"), 0);
        assert_eq!(parse_km("120000"), 120000);
        assert_eq!(parse_km(""), 0);
        assert_eq!(parse_km("sem informação"), 0);
    }

    #[test]
    fn test_parse_doors() {
        assert_eq!(parse_doors("4"), 4);
        assert_eq!(parse_doors("2 portas"), 2);
        assert_eq!(parse_doors(""), 0);
        assert_eq!(parse_doors("n/d"), 0);
    }

    #[test]
    fn test_clean_title_dealer_suffix() {
        let cleaner = TitleCleaner::new("Eurocar Multimarcas");
        assert_eq!(
            cleaner.clean("CHEVROLET ONIX LT 1.0 em Curitiba - Eurocar Multimarcas"),
            "CHEVROLET ONIX LT 1.0"
        );
        assert_eq!(
            cleaner.clean("FIAT TORO FREEDOM EM Curitiba - EUROCAR MULTIMARCAS"),
            "FIAT TORO FREEDOM"
        );
    }

    #[test]
    fn test_clean_title_leaked_year_and_km() {
        let cleaner = TitleCleaner::new("Eurocar Multimarcas");
        assert_eq!(
            cleaner.clean("HYUNDAI HB20 SENSE 2020/2021 - 45.320KM em Curitiba - Eurocar Multimarcas"),
            "HYUNDAI HB20 SENSE"
        );
        assert_eq!(cleaner.clean("FORD FOCUS SE 2015 - 98.000km"), "FORD FOCUS SE");
    }

    #[test]
    fn test_clean_title_non_breaking_space() {
        let cleaner = TitleCleaner::new("Eurocar Multimarcas");
        assert_eq!(
            cleaner.clean("FIAT ARGO DRIVE em\u{a0}Curitiba\u{a0}-\u{a0}Eurocar Multimarcas"),
            "FIAT ARGO DRIVE"
        );
        assert_eq!(cleaner.clean("FORD KA SE\u{a0}2019\u{a0}- 30.000KM"), "FORD KA SE");
    }

    #[test]
    fn test_ascii_spaces() {
        assert_eq!(ascii_spaces("45.320\u{a0}KM"), "45.320 KM");
        assert_eq!(ascii_spaces("linha 1\nlinha\u{2009}2"), "linha 1\nlinha 2");
    }

    #[test]
    fn test_clean_title_without_noise() {
        let cleaner = TitleCleaner::new("Eurocar Multimarcas");
        assert_eq!(cleaner.clean("  JEEP RENEGADE LONGITUDE  "), "JEEP RENEGADE LONGITUDE");
    }

    #[test]
    fn test_split_longest_model_first() {
        let splitter = ModelSplitter::default();
        let parts = splitter.split("VOLKSWAGEN TIGUAN ALLSPAC COMFORTLINE");
        assert_eq!(parts.brand, "VOLKSWAGEN");
        assert_eq!(parts.model_base, "TIGUAN ALLSPAC");
        assert_eq!(parts.version_details, "COMFORTLINE");

        let parts = splitter.split("CHEVROLET ONIX PLUS PREMIER 1.0 TURBO");
        assert_eq!(parts.model_base, "ONIX PLUS");
        assert_eq!(parts.version_details, "PREMIER 1.0 TURBO");
    }

    #[test]
    fn test_split_known_model_case_insensitive() {
        let splitter = ModelSplitter::default();
        let parts = splitter.split("Volkswagen Polo Highline");
        assert_eq!(parts.brand, "Volkswagen");
        assert_eq!(parts.model_base, "POLO");
        assert_eq!(parts.version_details, "Highline");
    }

    #[test]
    fn test_split_known_model_exact() {
        let splitter = ModelSplitter::default();
        let parts = splitter.split("FIAT MOBI");
        assert_eq!(parts.model_base, "MOBI");
        assert_eq!(parts.version_details, "");
    }

    #[test]
    fn test_split_requires_whole_word() {
        let splitter = ModelSplitter::default();
        // "GOLF" must not match the known model "GOL"
        let parts = splitter.split("VOLKSWAGEN GOLF GTI");
        assert_eq!(parts.model_base, "GOLF");
        assert_eq!(parts.version_details, "GTI");
    }

    #[test]
    fn test_split_unknown_model_fallback() {
        let splitter = ModelSplitter::default();
        let parts = splitter.split("PEUGEOT 208 GRIFFE 1.6");
        assert_eq!(parts.brand, "PEUGEOT");
        assert_eq!(parts.model_base, "208");
        assert_eq!(parts.version_details, "GRIFFE 1.6");

        let parts = splitter.split("RAM RAMPAGE");
        assert_eq!(parts.model_base, "RAMPAGE");
        assert_eq!(parts.version_details, "");
    }

    #[test]
    fn test_split_single_word_name() {
        let splitter = ModelSplitter::default();
        let parts = splitter.split("KOMBI");
        assert_eq!(parts.brand, "KOMBI");
        assert_eq!(parts.model_base, "KOMBI");
        assert_eq!(parts.version_details, "");
    }

    #[test]
    fn test_split_extra_models() {
        let splitter = ModelSplitter::new(&["t-cross".to_string()]);
        assert_eq!(splitter.models()[0].len(), "TIGUAN ALLSPAC".len());
        let parts = splitter.split("VOLKSWAGEN T-CROSS HIGHLINE 250 TSI");
        assert_eq!(parts.model_base, "T-CROSS");
        assert_eq!(parts.version_details, "HIGHLINE 250 TSI");
    }

    #[test]
    fn test_models_sorted_longest_first() {
        let splitter = ModelSplitter::default();
        let lens: Vec<usize> = splitter.models().iter().map(|m| m.len()).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url(&base(), "/img/foo.jpg").as_deref(),
            Some("https://eurocarveiculos.com/img/foo.jpg")
        );
        assert_eq!(
            resolve_url(&base(), "https://cdn.example.com/a.png").as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(
            resolve_url(&base(), "//cdn.example.com/a.png").as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(resolve_url(&base(), "   "), None);
    }

    #[test]
    fn test_is_image_url() {
        assert!(is_image_url("https://x.com/a.JPG"));
        assert!(is_image_url("/fotos/carro.webp?v=2"));
        assert!(is_image_url("/a.jpeg"));
        assert!(!is_image_url("/a.gif"));
        assert!(!is_image_url("javascript:void(0)"));
    }
}
