//! Static plan catalog.
//!
//! Plans are immutable and statically enumerated; nothing here is persisted
//! per-user. A plan controls the entitlements the wizard and upload flow
//! enforce: image cap, background music, visual effects.

use rust_decimal::Decimal;
use serde::Serialize;

use cartinha_core::{CurrencyCode, Price};

/// A pricing tier and its feature entitlements.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    /// Price in the standard currency unit (reais).
    pub price: Decimal,
    pub max_images: usize,
    pub allows_music: bool,
    pub allows_visual_effects: bool,
    pub features: &'static [&'static str],
}

impl Plan {
    /// The plan price as a [`Price`].
    #[must_use]
    pub const fn as_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::BRL)
    }

    /// Whether `existing + additional` images would exceed this plan's cap.
    #[must_use]
    pub const fn exceeds_image_cap(&self, existing: usize, additional: usize) -> bool {
        existing + additional > self.max_images
    }
}

/// All plans, in display order.
#[must_use]
pub fn plans() -> &'static [Plan] {
    // Decimal::new is not const; build lazily once.
    static PLANS: std::sync::OnceLock<Vec<Plan>> = std::sync::OnceLock::new();
    PLANS.get_or_init(|| {
        vec![
            Plan {
                id: "basic",
                name: "Versão Básica",
                price: Decimal::new(499, 2),
                max_images: 2,
                allows_music: false,
                allows_visual_effects: false,
                features: &[
                    "Upload de até 2 fotos",
                    "Escolha de design de fundo",
                    "Link único para compartilhamento",
                    "Sem música",
                    "Sem efeitos visuais",
                ],
            },
            Plan {
                id: "premium",
                name: "Versão Premium",
                price: Decimal::new(999, 2),
                max_images: 5,
                allows_music: true,
                allows_visual_effects: true,
                features: &[
                    "Upload de até 5 fotos",
                    "Escolha de design de fundo",
                    "Link único para compartilhamento",
                    "Adicione música do YouTube",
                    "Efeitos visuais (corações ou confetes)",
                ],
            },
        ]
    })
}

/// Look up a plan by ID.
#[must_use]
pub fn find(id: &str) -> Option<&'static Plan> {
    plans().iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contents() {
        let basic = find("basic").expect("basic plan");
        assert_eq!(basic.max_images, 2);
        assert!(!basic.allows_music);
        assert!(!basic.allows_visual_effects);
        assert_eq!(basic.price, Decimal::new(499, 2));

        let premium = find("premium").expect("premium plan");
        assert_eq!(premium.max_images, 5);
        assert!(premium.allows_music);
        assert!(premium.allows_visual_effects);
        assert_eq!(premium.price, Decimal::new(999, 2));
    }

    #[test]
    fn test_unknown_plan() {
        assert!(find("enterprise").is_none());
    }

    #[test]
    fn test_image_cap() {
        let basic = find("basic").expect("basic plan");
        // 2 already uploaded + 1 more exceeds the cap of 2
        assert!(basic.exceeds_image_cap(2, 1));
        assert!(!basic.exceeds_image_cap(1, 1));
        assert!(!basic.exceeds_image_cap(0, 2));
        assert!(basic.exceeds_image_cap(0, 3));
    }

    #[test]
    fn test_minor_units() {
        let basic = find("basic").expect("basic plan");
        assert_eq!(basic.as_price().minor_units(), Some(499));
        let premium = find("premium").expect("premium plan");
        assert_eq!(premium.as_price().minor_units(), Some(999));
    }
}
