//! CSS selectors for the dealer's listing and detail pages.
//!
//! Lists are in priority order: the parser tries each entry in turn and the
//! first one that yields a value wins. A single entry may still be a selector
//! group when its alternatives are equally good.
//!
//! **Update process**: when a field starts coming back empty, capture the
//! page, adjust the selectors here, and add it under `tests/fixtures/`.

use scraper::Selector;
use std::sync::LazyLock;

fn parse_all(patterns: &[&str]) -> Vec<Selector> {
    patterns.iter().map(|p| Selector::parse(p).unwrap()).collect()
}

/// Selectors for the stock listing page.
pub mod listing {
    use super::*;

    /// Vehicle card containers.
    pub static CARD: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "div.card-veiculo, \
             div.item-carro, \
             article.vehicle-item, \
             div.product-item, \
             div.box-veiculo",
        )
        .unwrap()
    });

    /// Any link with a target.
    pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

    /// Candidate elements for the card's visible label; filtered by class.
    pub static LABEL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h2, h3, h4, p").unwrap());
}

/// Selectors for individual vehicle pages.
pub mod detail {
    use super::*;

    /// Vehicle title headings.
    pub static NAME: LazyLock<Vec<Selector>> =
        LazyLock::new(|| parse_all(&["h1.font-weight-bold", "h1.mb-0", "div.container h1"]));

    /// Document title, last resort for the name.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

    /// Dedicated price elements, tried before any paragraph mentioning "R$".
    pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        parse_all(&[
            "p.venda",
            "div.preco-veiculo p.font-weight-bold, div.price-vehicle p.font-weight-bold",
        ])
    });

    /// Paragraphs scanned for a currency marker.
    pub static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

    /// Price widgets of other site templates, tried last.
    pub static PRICE_LATE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| parse_all(&["div.price span.value, span.preco-valor"]));

    /// Year badges shown next to the price.
    pub static YEAR: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        parse_all(&[
            "div.info-veiculo-ano p",
            "li.ano-veiculo",
            "span.car-info-year",
            "div.detalhes-veiculo-ano strong",
        ])
    });

    /// Mileage badges shown next to the price.
    pub static KM: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        parse_all(&[
            "div.info-veiculo-km p",
            "li.km-veiculo",
            "span.car-info-km",
            "div.detalhes-veiculo-km strong",
        ])
    });

    /// Section headings ("FICHA TÉCNICA", "OPCIONAIS").
    pub static SECTION_HEADING: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h2, h3, h4, h5, strong").unwrap());

    pub static STRONG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());

    pub static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());

    pub static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

    /// Loose text nodes inside an options block without item classes.
    pub static OPTION_TEXT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span, p, li").unwrap());

    /// Subtitle paragraphs like "2020/2021 - 45.320 KM".
    pub static YEAR_KM_LINE: LazyLock<Vec<Selector>> =
        LazyLock::new(|| parse_all(&["p.text-muted", "p.font-weight-normal"]));

    /// Free-text description.
    pub static DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        parse_all(&[
            "div#collapseDescricao div.card-body",
            "div.description-vehicle",
            "div.vehicle-description",
            "section#descricao p",
            "div.car-description-text",
        ])
    });

    /// Featured image.
    pub static MAIN_IMAGE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        parse_all(&[
            "div.carousel-inner div.carousel-item.active img",
            "figure.zoom img",
            "img.showcase-image",
            "div.fotorama__stage__frame img.fotorama__img",
            "img#img-destaque-veiculo",
            "div.item-carro-imagem-destaque img",
            "div.details-gallery-main img",
        ])
    });

    /// Gallery images and thumbnails.
    pub static GALLERY: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        parse_all(&[
            "div.carousel-inner div.carousel-item img",
            "div.gallery-thumbs img",
            "div.slick-slide img",
            "div.fotorama__nav__frame img",
            "a.fancybox img",
            "div.thumbnails-list img",
        ])
    });
}
