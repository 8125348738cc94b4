//! HTML parsers for the stock listing and vehicle detail pages.

use crate::config::Config;
use crate::dealer::models::{VehicleDraft, VehicleRecord};
use crate::dealer::normalize::{
    ascii_spaces, currency_amount, is_image_url, parse_doors, parse_km, parse_price, resolve_url,
    ModelSplitter, TitleCleaner,
};
use crate::dealer::selectors::{detail, listing};
use anyhow::{Context, Result};
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use tracing::{debug, info, trace};
use url::Url;

/// "2020/2021 - 45.320 KM" style subtitle.
static YEAR_KM_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{4}/\d{4}|\d{4}).*[\d.]+\s*KM").unwrap());

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4}/\d{4}|\d{4})").unwrap());

static KM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)([\d.]+)\s*KM").unwrap());

/// Trimmed text content of an element, with `&nbsp;` read as a space.
fn element_text(element: ElementRef) -> String {
    ascii_spaces(&element.text().collect::<String>()).trim().to_string()
}

/// Text of the first element, across `selectors` in order, with non-empty text.
fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|s| document.select(s))
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn has_class_containing(element: ElementRef, needles: &[&str]) -> bool {
    element.value().classes().any(|class| needles.iter().any(|n| class.contains(n)))
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Finds the section heading whose upper-cased text contains `title`.
fn find_section<'a>(document: &'a Html, title: &str) -> Option<ElementRef<'a>> {
    document
        .select(&detail::SECTION_HEADING)
        .find(|heading| element_text(*heading).to_uppercase().contains(title))
}

/// Collects detail-page URLs from the stock listing page.
pub struct ListingParser {
    base: Url,
    listing_path: String,
    marker: String,
    detail_link: Regex,
}

impl ListingParser {
    /// Creates a listing parser for the configured site.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, &config.base_url)
    }

    /// Creates a listing parser resolving links against `base_url`.
    pub fn with_base_url(config: &Config, base_url: &str) -> Result<Self> {
        let base =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
        let detail_link =
            Regex::new(&format!(r"{}.+\.html", regex_lite::escape(&config.detail_path_marker)))
                .context("Failed to build detail link pattern")?;

        Ok(Self {
            base,
            listing_path: config.listing_path.trim_end_matches('/').to_string(),
            marker: config.detail_path_marker.clone(),
            detail_link,
        })
    }

    /// Parses the listing page into sorted, deduplicated detail URLs.
    pub fn parse(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let cards: Vec<ElementRef> = document.select(&listing::CARD).collect();
        let hrefs: Vec<&str> = if cards.is_empty() {
            info!("No standard listing containers found. Falling back to broader link search.");
            document
                .select(&listing::ANCHOR)
                .filter_map(|a| a.value().attr("href"))
                .filter(|href| self.detail_link.is_match(href))
                .collect()
        } else {
            info!("Found {} potential listing containers.", cards.len());
            self.hrefs_from_cards(&cards)
        };

        debug!("Found {} link tags potentially leading to vehicle details", hrefs.len());

        let urls: BTreeSet<String> = hrefs
            .into_iter()
            .filter_map(|href| resolve_url(&self.base, href))
            .filter(|url| self.is_detail_url(url))
            .collect();

        info!("Found {} unique vehicle detail URLs", urls.len());
        urls.into_iter().collect()
    }

    /// One link per card, skipping cards whose label was already seen.
    fn hrefs_from_cards<'a>(&self, cards: &[ElementRef<'a>]) -> Vec<&'a str> {
        let mut seen_labels: HashSet<String> = HashSet::new();
        let mut hrefs = Vec::new();

        for card in cards {
            let link = card
                .select(&listing::ANCHOR)
                .find(|a| a.value().attr("href").is_some_and(|h| self.detail_link.is_match(h)))
                .or_else(|| card.select(&listing::ANCHOR).next());

            let Some(link) = link else {
                trace!("Skipping card without links");
                continue;
            };

            let label = card
                .select(&listing::LABEL)
                .find(|e| {
                    e.value().classes().any(|c| {
                        let c = c.to_lowercase();
                        c.contains("title") || c.contains("name") || c.contains("modelo")
                    })
                })
                .map(element_text)
                .unwrap_or_else(|| link.html());

            if seen_labels.contains(&label) {
                trace!("Skipping duplicate card: {}", label);
                continue;
            }

            if let Some(href) = link.value().attr("href") {
                if href.contains(".html") && href.contains(&self.marker) {
                    hrefs.push(href);
                    seen_labels.insert(label);
                }
            }
        }

        hrefs
    }

    /// Detail pages carry the marker and ".html", and never a query or fragment.
    fn is_detail_url(&self, url: &str) -> bool {
        url.contains(".html")
            && url.contains(&self.marker)
            && !url.ends_with(&self.listing_path)
            && !url.ends_with(&format!("{}/", self.listing_path))
            && !url.contains('?')
            && !url.contains('#')
    }
}

/// Labels of the "FICHA TÉCNICA" block the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetField {
    Year,
    Km,
    Transmission,
    Fuel,
    Color,
    Doors,
}

impl SheetField {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("ano") {
            Some(SheetField::Year)
        } else if label.contains("km") {
            Some(SheetField::Km)
        } else if label.contains("câmbio") || label.contains("cambio") {
            Some(SheetField::Transmission)
        } else if label.contains("combustível") || label.contains("combustivel") {
            Some(SheetField::Fuel)
        } else if label.contains("cor") {
            Some(SheetField::Color)
        } else if label.contains("portas") {
            Some(SheetField::Doors)
        } else {
            None
        }
    }
}

/// Extracts a [`VehicleRecord`] from a vehicle detail page.
pub struct DetailParser {
    base: Url,
    cleaner: TitleCleaner,
    splitter: ModelSplitter,
}

impl DetailParser {
    /// Creates a detail parser for the configured site.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, &config.base_url)
    }

    /// Creates a detail parser resolving image links against `base_url`.
    pub fn with_base_url(config: &Config, base_url: &str) -> Result<Self> {
        let base =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;

        Ok(Self {
            base,
            cleaner: TitleCleaner::new(&config.dealer_name),
            splitter: ModelSplitter::new(&config.extra_models),
        })
    }

    /// Parses one detail page. Missing fields keep their defaults; only a
    /// detail URL that is not absolute http(s) fails the page.
    pub fn parse(&self, html: &str, url: &str) -> Result<VehicleRecord> {
        let link = Url::parse(url).with_context(|| format!("Invalid detail URL: {}", url))?;
        if !matches!(link.scheme(), "http" | "https") {
            anyhow::bail!("Detail URL is not http(s): {}", url);
        }

        let document = Html::parse_document(html);
        let mut draft = VehicleDraft::new();

        draft.name.set_opt(self.parse_name(&document));
        draft.price.set_opt(self.parse_price(&document));

        // Year and mileage: badges, then the tech sheet, then the subtitle line
        draft.year.set_opt(first_text(&document, &detail::YEAR));
        draft.km.set_opt(
            first_text(&document, &detail::KM).map(|t| parse_km(&t)).filter(|km| *km > 0),
        );
        self.parse_tech_sheet(&document, &mut draft);
        if !draft.year.is_set() || !draft.km.is_set() {
            self.parse_year_km_line(&document, &mut draft);
        }

        draft.options.set_opt(self.parse_options(&document));
        draft.description.set_opt(first_text(&document, &detail::DESCRIPTION));
        draft.main_image_url.set_opt(self.parse_main_image(&document));
        draft.photos.set_opt(self.parse_gallery(&document));

        if let Some(name) = draft.name.get() {
            let parts = self.splitter.split(name);
            draft.brand.set(parts.brand);
            draft.model_base.set(parts.model_base);
            draft.version_details.set(parts.version_details);
        }

        let record = draft.finish(url);
        info!(
            "Parsed: {} - Price: {} - Year: {} - KM: {} - Transmission: {} - Color: {} - Doors: {}",
            record.name,
            record.price,
            record.year,
            record.km,
            record.transmission_type,
            record.color,
            record.doors
        );

        Ok(record)
    }

    /// Heading text, else the document title, with dealer and year noise removed.
    fn parse_name(&self, document: &Html) -> Option<String> {
        let title = first_text(document, &detail::NAME).or_else(|| {
            document.select(&detail::TITLE).next().map(element_text).filter(|t| !t.is_empty())
        })?;

        let name = self.cleaner.clean(&title);
        if name.is_empty() {
            debug!("Title reduced to nothing after cleaning: {}", title);
            return None;
        }
        Some(name)
    }

    fn parse_price(&self, document: &Html) -> Option<f64> {
        let amount_in = |selectors: &[Selector]| {
            selectors
                .iter()
                .flat_map(|s| document.select(s))
                .find_map(|e| currency_amount(&element_text(e)).map(parse_price))
        };

        amount_in(&detail::PRICE)
            .or_else(|| {
                document
                    .select(&detail::PARAGRAPH)
                    .map(element_text)
                    .find_map(|text| currency_amount(&text).map(parse_price))
            })
            .or_else(|| amount_in(&detail::PRICE_LATE))
    }

    /// Reads the labelled items under the "FICHA TÉCNICA" heading.
    fn parse_tech_sheet(&self, document: &Html, draft: &mut VehicleDraft) {
        let Some(heading) = find_section(document, "FICHA TÉCNICA") else {
            trace!("No tech sheet heading");
            return;
        };
        let Some(container) = sheet_container(heading) else {
            debug!("Tech sheet heading without an item container");
            return;
        };

        for item in sheet_items(container) {
            let Some((label, value)) = sheet_item(item) else {
                continue;
            };

            match SheetField::from_label(&label) {
                Some(SheetField::Year) => {
                    draft.year.set(value);
                }
                Some(SheetField::Km) => {
                    draft.km.set_opt(Some(parse_km(&value)).filter(|km| *km > 0));
                }
                Some(SheetField::Transmission) => {
                    draft.transmission_type.set(value);
                }
                Some(SheetField::Fuel) => {
                    draft.fuel_type.set(value);
                }
                Some(SheetField::Color) => {
                    draft.color.set(value);
                }
                Some(SheetField::Doors) => {
                    draft.doors.set(parse_doors(&value));
                }
                None => trace!("Ignoring tech sheet label: {}", label),
            }
        }
    }

    /// Falls back to a "2020/2021 - 45.320 KM" subtitle paragraph.
    fn parse_year_km_line(&self, document: &Html, draft: &mut VehicleDraft) {
        let line = detail::YEAR_KM_LINE
            .iter()
            .flat_map(|s| document.select(s))
            .map(element_text)
            .find(|text| YEAR_KM_LINE.is_match(text));

        let Some(line) = line else {
            return;
        };

        if let Some(year) = YEAR.captures(&line).and_then(|c| c.get(1)) {
            draft.year.set(year.as_str().to_string());
        }
        if let Some(km) = KM.captures(&line).and_then(|c| c.get(1)) {
            draft.km.set_opt(Some(parse_km(km.as_str())).filter(|km| *km > 0));
        }
    }

    /// Feature list following the "OPCIONAIS" heading.
    fn parse_options(&self, document: &Html) -> Option<Vec<String>> {
        let heading = find_section(document, "OPCIONAIS")?;
        let siblings: Vec<ElementRef> = heading.next_siblings().filter_map(ElementRef::wrap).collect();

        let list = siblings.iter().find(|e| e.value().name() == "ul");
        let options: Vec<String> = if let Some(list) = list {
            list.select(&detail::LIST_ITEM).map(element_text).filter(|t| !t.is_empty()).collect()
        } else {
            let block = siblings.iter().find(|e| {
                e.value().name() == "div" && has_class_containing(**e, &["options", "features"])
            })?;

            let items: Vec<String> = block
                .select(&detail::DIV)
                .filter(|d| has_class_containing(*d, &["item", "option"]))
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect();

            if items.is_empty() {
                block
                    .select(&detail::OPTION_TEXT)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .collect()
            } else {
                items
            }
        };

        (!options.is_empty()).then_some(options)
    }

    fn parse_main_image(&self, document: &Html) -> Option<String> {
        detail::MAIN_IMAGE
            .iter()
            .filter_map(|s| document.select(s).next())
            .find_map(|img| {
                let candidates = || {
                    ["src", "data-src"]
                        .iter()
                        .filter_map(|attr| img.value().attr(attr))
                        .map(str::trim)
                        .filter(|v| !v.is_empty() && !v.starts_with("data:"))
                };
                let src = candidates().find(|v| is_image_url(v)).or_else(|| candidates().next())?;
                resolve_url(&self.base, src)
            })
    }

    /// Every gallery image, resolved and deduplicated in first-seen order.
    fn parse_gallery(&self, document: &Html) -> Option<Vec<String>> {
        let mut seen = HashSet::new();
        let mut photos = Vec::new();

        for img in detail::GALLERY.iter().flat_map(|s| document.select(s)) {
            let src = ["src", "data-src", "href"]
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .find(|value| is_image_url(value));

            if let Some(url) = src.and_then(|s| resolve_url(&self.base, s)) {
                if seen.insert(url.clone()) {
                    photos.push(url);
                }
            }
        }

        (!photos.is_empty()).then_some(photos)
    }
}

/// First sibling after the heading that holds labelled items, stopping at the
/// next heading of the same or a higher level.
fn sheet_container(heading: ElementRef) -> Option<ElementRef> {
    let level = heading_level(heading.value().name()).unwrap_or(u8::MAX);

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        let tag = sibling.value().name();
        if tag == "div"
            && (sibling.select(&detail::STRONG).next().is_some()
                || sibling.select(&detail::DIV).any(|d| has_class_containing(d, &["col"])))
        {
            return Some(sibling);
        }
        if heading_level(tag).is_some_and(|l| l <= level) {
            break;
        }
    }

    None
}

fn sheet_items(container: ElementRef) -> Vec<ElementRef> {
    let items: Vec<ElementRef> = container
        .select(&detail::DIV)
        .filter(|d| has_class_containing(*d, &["col-md-2", "col-sm-4", "col-xs-6", "item-ficha"]))
        .collect();
    if !items.is_empty() {
        return items;
    }

    let items: Vec<ElementRef> = container
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "div" && c.select(&detail::STRONG).next().is_some())
        .collect();
    if !items.is_empty() {
        return items;
    }

    container.select(&detail::DIV).collect()
}

/// Reads `<strong>Label</strong> value` pairs. The value is the bare text after
/// the label, else an adjacent span, else the rest of the item's text.
fn sheet_item(item: ElementRef) -> Option<(String, String)> {
    let strong = item.select(&detail::STRONG).next()?;
    let raw_label: String = strong.text().collect();
    let label = raw_label.trim().to_lowercase();

    let mut value: String = strong
        .next_siblings()
        .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .filter(|t| !t.is_empty())
        .collect();

    if value.is_empty() {
        value = strong
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "span")
            .map(element_text)
            .unwrap_or_default();
    }
    if value.is_empty() {
        value = item.text().collect::<String>().replace(&raw_label, "").trim().to_string();
    }
    if let Some(rest) = value.strip_prefix(':') {
        value = rest.trim().to_string();
    }

    (!value.is_empty()).then_some((label, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_URL: &str = "https://eurocarveiculos.com/carros/vw-tiguan-123.html";

    fn listing_parser() -> ListingParser {
        ListingParser::new(&Config::default()).unwrap()
    }

    fn detail_parser() -> DetailParser {
        DetailParser::new(&Config::default()).unwrap()
    }

    fn page(body: &str) -> String {
        format!("<html><head><title>Eurocar</title></head><body>{}</body></html>", body)
    }

    // Listing page

    #[test]
    fn test_listing_cards() {
        let html = page(
            r#"
            <div class="card-veiculo">
                <h3 class="card-title">FIAT ARGO DRIVE</h3>
                <a href="/carros/fiat-argo-1.html">Ver</a>
            </div>
            <div class="item-carro">
                <p class="nome-modelo">JEEP COMPASS</p>
                <a href="https://eurocarveiculos.com/carros/jeep-compass-2.html">Ver</a>
            </div>
            "#,
        );

        let urls = listing_parser().parse(&html);
        assert_eq!(
            urls,
            vec![
                "https://eurocarveiculos.com/carros/fiat-argo-1.html",
                "https://eurocarveiculos.com/carros/jeep-compass-2.html",
            ]
        );
    }

    #[test]
    fn test_listing_duplicate_labels_skipped() {
        let html = page(
            r#"
            <div class="card-veiculo"><h3 class="title">FIAT TORO</h3><a href="/carros/toro-1.html">1</a></div>
            <div class="card-veiculo"><h3 class="title">FIAT TORO</h3><a href="/carros/toro-2.html">2</a></div>
            "#,
        );

        let urls = listing_parser().parse(&html);
        assert_eq!(urls, vec!["https://eurocarveiculos.com/carros/toro-1.html"]);
    }

    #[test]
    fn test_listing_card_prefers_detail_link() {
        let html = page(
            r#"
            <div class="box-veiculo">
                <a href="/financiamento">Financie</a>
                <a href="/carros/gol-9.html">GOL</a>
            </div>
            "#,
        );

        let urls = listing_parser().parse(&html);
        assert_eq!(urls, vec!["https://eurocarveiculos.com/carros/gol-9.html"]);
    }

    #[test]
    fn test_listing_fallback_link_scan() {
        let html = page(
            r#"
            <ul>
                <li><a href="/carros/onix-1.html">ONIX</a></li>
                <li><a href="/carros/onix-1.html">ONIX (foto)</a></li>
                <li><a href="/contato.html">Contato</a></li>
                <li><a href="/carros/hb20-2.html?utm=x">HB20</a></li>
                <li><a href="/carros/hb20-2.html#fotos">HB20</a></li>
            </ul>
            "#,
        );

        let urls = listing_parser().parse(&html);
        assert_eq!(urls, vec!["https://eurocarveiculos.com/carros/onix-1.html"]);
    }

    #[test]
    fn test_listing_empty_page() {
        let urls = listing_parser().parse(&page("<p>Nenhum veículo</p>"));
        assert!(urls.is_empty());
    }

    #[test]
    fn test_is_detail_url() {
        let parser = listing_parser();
        assert!(parser.is_detail_url("https://eurocarveiculos.com/carros/a.html"));
        assert!(!parser.is_detail_url("https://eurocarveiculos.com/carros/a"));
        assert!(!parser.is_detail_url("https://eurocarveiculos.com/a.html"));
        assert!(!parser.is_detail_url("https://eurocarveiculos.com/carros/a.html?p=2"));
        assert!(!parser.is_detail_url("https://eurocarveiculos.com/carros/a.html#top"));
    }

    // Detail page

    #[test]
    fn test_detail_name_and_split() {
        let html = page(
            r#"<h1 class="font-weight-bold">VOLKSWAGEN TIGUAN ALLSPAC COMFORTLINE 2019/2020 - em Curitiba - Eurocar Multimarcas</h1>"#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.name, "VOLKSWAGEN TIGUAN ALLSPAC COMFORTLINE");
        assert_eq!(record.brand, "VOLKSWAGEN");
        assert_eq!(record.model_base, "TIGUAN ALLSPAC");
        assert_eq!(record.version_details, "COMFORTLINE");
    }

    #[test]
    fn test_detail_name_with_non_breaking_spaces() {
        let html = page("<h1 class=\"mb-0\">FIAT ARGO DRIVE em\u{a0}Curitiba - Eurocar Multimarcas</h1>");

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.name, "FIAT ARGO DRIVE");
        assert_eq!(record.model_base, "ARGO");
        assert_eq!(record.version_details, "DRIVE");
    }

    #[test]
    fn test_detail_name_from_title_tag() {
        let html = "<html><head><title>FIAT STRADA FREEDOM em Curitiba - Eurocar Multimarcas</title></head><body></body></html>";

        let record = detail_parser().parse(html, DETAIL_URL).unwrap();
        assert_eq!(record.name, "FIAT STRADA FREEDOM");
        assert_eq!(record.model_base, "STRADA");
    }

    #[test]
    fn test_detail_price_priority() {
        let html = page(
            r#"
            <p>Entrada de R$ 10.000,00</p>
            <p class="venda">R$ 89.900,00</p>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.price, 89900.0);
    }

    #[test]
    fn test_detail_price_from_paragraph() {
        let html = page(r#"<div><p>Por apenas R$ 1,234.56</p></div>"#);
        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.price, 1234.56);
    }

    #[test]
    fn test_detail_tech_sheet() {
        let html = page(
            r#"
            <h3>FICHA TÉCNICA</h3>
            <p>Confira os dados</p>
            <div class="row">
                <div class="col-md-2"><strong>Ano:</strong> 2019/2020</div>
                <div class="col-md-2"><strong>KM</strong>: 45.320</div>
                <div class="col-md-2"><strong>Câmbio</strong><span>Automático</span></div>
                <div class="col-md-2"><strong>Combustível:</strong> Flex</div>
                <div class="col-md-2"><strong>Cor:</strong> Prata</div>
                <div class="col-md-2"><strong>Portas:</strong> 4 portas</div>
                <div class="col-md-2"><strong>Final de placa:</strong> 7</div>
            </div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.year, "2019/2020");
        assert_eq!(record.km, 45320);
        assert_eq!(record.transmission_type, "Automático");
        assert_eq!(record.fuel_type, "Flex");
        assert_eq!(record.color, "Prata");
        assert_eq!(record.doors, 4);
    }

    #[test]
    fn test_detail_tech_sheet_stops_at_next_heading() {
        let html = page(
            r#"
            <h3>Ficha técnica</h3>
            <h3>Outra seção</h3>
            <div class="row"><div class="col-md-2"><strong>Cor:</strong> Azul</div></div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.color, "N/A");
    }

    #[test]
    fn test_detail_badges_win_over_tech_sheet() {
        let html = page(
            r#"
            <div class="info-veiculo-ano"><p>2021</p></div>
            <h3>FICHA TÉCNICA</h3>
            <div class="row">
                <div class="item-ficha"><strong>Ano</strong> 2018</div>
                <div class="item-ficha"><strong>Km</strong> 12.000</div>
            </div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.year, "2021");
        assert_eq!(record.km, 12000);
    }

    #[test]
    fn test_detail_year_km_line_fallback() {
        let html = page(r#"<p class="text-muted">2020/2021 - 45.320 KM</p>"#);

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.year, "2020/2021");
        assert_eq!(record.km, 45320);
    }

    #[test]
    fn test_detail_year_km_line_fills_only_missing() {
        let html = page(
            r#"
            <p class="text-muted">2021/2022 - 30.000 KM</p>
            <h3>FICHA TÉCNICA</h3>
            <div class="row">
                <div class="col-md-2"><strong>Ano:</strong> 2019/2020</div>
                <div class="col-md-2"><strong>Cor:</strong> Branco</div>
            </div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.year, "2019/2020");
        assert_eq!(record.km, 30000);
        assert_eq!(record.color, "Branco");
    }

    #[test]
    fn test_detail_tech_sheet_span_value() {
        let html = page(
            r#"
            <h3>FICHA TÉCNICA</h3>
            <div class="row">
                <div class="item-ficha"><strong>Cor</strong><span>Preto</span><small>metálico</small></div>
            </div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.color, "Preto");
    }

    #[test]
    fn test_detail_options_list() {
        let html = page(
            r#"
            <h4>Opcionais</h4>
            <ul><li>Ar condicionado</li><li>  </li><li>Direção elétrica</li></ul>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.options, vec!["Ar condicionado", "Direção elétrica"]);
    }

    #[test]
    fn test_detail_options_div() {
        let html = page(
            r#"
            <h4>OPCIONAIS</h4>
            <div class="vehicle-options">
                <div class="option-item">Airbag</div>
                <div class="option-item">Alarme</div>
            </div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.options, vec!["Airbag", "Alarme"]);
    }

    #[test]
    fn test_detail_options_div_loose_text() {
        let html = page(
            r#"
            <h4>OPCIONAIS</h4>
            <div class="features"><span>Teto solar</span><p>Bancos de couro</p></div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.options, vec!["Teto solar", "Bancos de couro"]);
    }

    #[test]
    fn test_detail_images_deduplicated() {
        let html = page(
            r#"
            <div class="carousel-inner">
                <div class="carousel-item active"><img src="/fotos/1.jpg"></div>
                <div class="carousel-item"><img data-src="/fotos/2.webp" src="data:image/gif;base64,R0lGOD"></div>
            </div>
            <div class="gallery-thumbs"><img src="/fotos/1.jpg"><img src="/fotos/icone.svg"></div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.main_image_url, "https://eurocarveiculos.com/fotos/1.jpg");
        assert_eq!(
            record.photos,
            vec![
                "https://eurocarveiculos.com/fotos/1.jpg",
                "https://eurocarveiculos.com/fotos/2.webp",
            ]
        );
    }

    #[test]
    fn test_detail_main_image_skips_placeholder() {
        let html = page(
            r#"
            <div class="carousel-inner">
                <div class="carousel-item active"><img src="data:image/gif;base64,R0lGOD" data-src="/fotos/1.jpg"></div>
            </div>
            "#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.main_image_url, "https://eurocarveiculos.com/fotos/1.jpg");
        assert_eq!(record.photos, vec!["https://eurocarveiculos.com/fotos/1.jpg"]);
    }

    #[test]
    fn test_detail_main_image_seeds_photos() {
        let html = page(r#"<figure class="zoom"><img data-src="/fotos/destaque.png"></figure>"#);

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.main_image_url, "https://eurocarveiculos.com/fotos/destaque.png");
        assert_eq!(record.photos, vec!["https://eurocarveiculos.com/fotos/destaque.png"]);
    }

    #[test]
    fn test_detail_description() {
        let html = page(
            r#"<div class="vehicle-description">
                 Único dono, revisões em dia.
               </div>"#,
        );

        let record = detail_parser().parse(&html, DETAIL_URL).unwrap();
        assert_eq!(record.description, "Único dono, revisões em dia.");
    }

    #[test]
    fn test_detail_empty_page_defaults() {
        let record = detail_parser().parse("", DETAIL_URL).unwrap();

        assert_eq!(record.link_details, DETAIL_URL);
        assert_eq!(record.name, "N/A");
        assert_eq!(record.brand, "N/A");
        assert_eq!(record.model_base, "N/A");
        assert_eq!(record.version_details, "");
        assert_eq!(record.price, 0.0);
        assert_eq!(record.year, "N/A");
        assert_eq!(record.km, 0);
        assert_eq!(record.doors, 0);
        assert!(record.options.is_empty());
        assert!(record.photos.is_empty());
    }

    #[test]
    fn test_detail_is_idempotent() {
        let html = page(
            r#"
            <h1 class="mb-0">CHEVROLET ONIX LT</h1>
            <p class="venda">R$ 65.490,00</p>
            <p class="text-muted">2022 - 18.000 km</p>
            "#,
        );

        let parser = detail_parser();
        let first = parser.parse(&html, DETAIL_URL).unwrap();
        let second = parser.parse(&html, DETAIL_URL).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_detail_invalid_url() {
        let parser = detail_parser();
        assert!(parser.parse("<html></html>", "/carros/relative.html").is_err());
        assert!(parser.parse("<html></html>", "ftp://eurocarveiculos.com/a.html").is_err());
    }

    #[test]
    fn test_sheet_field_from_label() {
        assert_eq!(SheetField::from_label("Ano/Modelo"), Some(SheetField::Year));
        assert_eq!(SheetField::from_label("KM"), Some(SheetField::Km));
        assert_eq!(SheetField::from_label("CÂMBIO"), Some(SheetField::Transmission));
        assert_eq!(SheetField::from_label("combustível"), Some(SheetField::Fuel));
        assert_eq!(SheetField::from_label("Cor"), Some(SheetField::Color));
        assert_eq!(SheetField::from_label("Portas"), Some(SheetField::Doors));
        assert_eq!(SheetField::from_label("Placa"), None);
    }
}
