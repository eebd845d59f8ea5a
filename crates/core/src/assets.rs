//! Asset references of a deck.
//!
//! Payloads stay opaque; this only checks that referenced files exist so a
//! missing image is reported before the talk rather than during it.

use std::path::{Path, PathBuf};

use crate::types::Deck;

/// Every asset path referenced by the deck, in order of first appearance.
pub fn referenced_assets(deck: &Deck) -> Vec<&str> {
    let mut seen = Vec::new();
    for slide in deck.slides() {
        let background = match &slide.style.background {
            crate::types::Background::Image { asset, .. } => Some(asset.as_str()),
            crate::types::Background::Color(_) => None,
        };
        let content = slide
            .steps
            .iter()
            .flat_map(|s| s.content.iter())
            .filter_map(|c| c.asset());

        for asset in background.into_iter().chain(content) {
            if !seen.contains(&asset) {
                seen.push(asset);
            }
        }
    }
    seen
}

/// Referenced assets that do not exist below `base`.
pub fn missing_assets(deck: &Deck, base: &Path) -> Vec<PathBuf> {
    referenced_assets(deck)
        .into_iter()
        .map(|asset| base.join(asset))
        .filter(|path| !path.exists())
        .inspect(|path| log::debug!("Missing asset: {}", path.display()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, DeckBuilder, SlideBuilder, SlideStyle};

    fn deck() -> Deck {
        DeckBuilder::new("Assets")
            .slide(SlideBuilder::new(SlideStyle::image("volcano.jpg", 0.7)).show(Content::image("a.gif")))
            .slide(SlideBuilder::default().appear(Content::image("a.gif")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_referenced_assets_deduplicated() {
        assert_eq!(referenced_assets(&deck()), vec!["volcano.jpg", "a.gif"]);
    }

    #[test]
    fn test_missing_assets() {
        let base = Path::new("/nonexistent-deck-dir");
        let missing = missing_assets(&deck(), base);
        assert_eq!(missing, vec![base.join("volcano.jpg"), base.join("a.gif")]);
    }

    #[test]
    fn test_lecture_assets_listed() {
        let deck = crate::lecture::gradient_descent().unwrap();
        let mut assets = referenced_assets(&deck);
        assets.sort();
        let mut expected = crate::lecture::ASSETS.to_vec();
        expected.sort();
        assert_eq!(assets, expected);
    }
}
