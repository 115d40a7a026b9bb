//! Seeded random shopper.
//!
//! Each step builds page-dependent weighted candidates and picks one, so the
//! same seed always yields the same action and event sequence.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::shop::{DemoShop, FormField, Page, CATALOG};
use crate::{Schedule, SiteError};

const PRODUCT_FILTERS: &[&str] = &["all", "scarpe", "abbigliamento", "accessori"];
const SOCIAL_NETWORKS: &[&str] = &["facebook", "instagram", "linkedin"];
const FOOTER_LINKS: &[(&str, &str)] = &[
    ("Privacy Policy", "/privacy"),
    ("Termini e Condizioni", "/terms"),
    ("Spedizioni", "/shipping"),
];

/// One simulated interaction with the shop.
#[derive(Debug, Clone, PartialEq)]
pub enum ShopperAction {
    SwitchPage(Page),
    HeroCta,
    PromoBanner,
    HoverProduct(&'static str),
    AddToCart(&'static str),
    ClickCart,
    NewsletterSignup { with_email: bool },
    FilterProducts(&'static str),
    AboutCta,
    PlayVideo,
    FocusField(FormField),
    SubmitForm,
    FooterLink(&'static str, &'static str),
    SocialClick(&'static str),
    Refresh,
}

#[derive(Debug, Clone)]
struct WeightedAction {
    action: ShopperAction,
    weight: f32,
}

impl WeightedAction {
    fn new(action: ShopperAction, weight: f32) -> Self {
        Self { action, weight }
    }
}

fn weighted_random_choice<'a, R: Rng>(
    rng: &mut R,
    candidates: &'a [WeightedAction],
) -> Option<&'a WeightedAction> {
    let total_weight: f32 = candidates.iter().map(|c| c.weight).sum();
    if total_weight <= 0.0 {
        return candidates.first();
    }

    let mut roll: f32 = rng.gen::<f32>() * total_weight;
    for candidate in candidates {
        roll -= candidate.weight;
        if roll <= 0.0 {
            return Some(candidate);
        }
    }
    candidates.last()
}

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// A shopper wandering the demo shop.
#[derive(Debug, Clone)]
pub struct Scenario {
    rng: SmallRng,
    shop: DemoShop,
    steps_taken: u64,
}

impl Scenario {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            shop: DemoShop::new(),
            steps_taken: 0,
        }
    }

    pub fn shop(&self) -> &DemoShop {
        &self.shop
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    fn candidates(&mut self) -> Vec<WeightedAction> {
        let rng = &mut self.rng;
        let page = *pick(rng, &Page::all());
        let product = pick(rng, CATALOG).id;
        let field = *pick(rng, &FormField::all());
        let filter = *pick(rng, PRODUCT_FILTERS);
        let network = *pick(rng, SOCIAL_NETWORKS);
        let (text, url) = *pick(rng, FOOTER_LINKS);
        let with_email = rng.gen_bool(0.5);

        let mut candidates = vec![
            WeightedAction::new(ShopperAction::SwitchPage(page), 0.2),
            WeightedAction::new(ShopperAction::ClickCart, 0.05),
            WeightedAction::new(ShopperAction::FooterLink(text, url), 0.04),
            WeightedAction::new(ShopperAction::SocialClick(network), 0.04),
            WeightedAction::new(ShopperAction::Refresh, 0.02),
        ];
        match self.shop.current_page() {
            Page::Home => candidates.extend([
                WeightedAction::new(ShopperAction::HeroCta, 0.15),
                WeightedAction::new(ShopperAction::PromoBanner, 0.1),
                WeightedAction::new(ShopperAction::NewsletterSignup { with_email }, 0.08),
            ]),
            Page::Products => candidates.extend([
                WeightedAction::new(ShopperAction::HoverProduct(product), 0.35),
                WeightedAction::new(ShopperAction::AddToCart(product), 0.2),
                WeightedAction::new(ShopperAction::FilterProducts(filter), 0.1),
            ]),
            Page::About => candidates.extend([
                WeightedAction::new(ShopperAction::AboutCta, 0.15),
                WeightedAction::new(ShopperAction::PlayVideo, 0.15),
            ]),
            Page::Contact => candidates.extend([
                WeightedAction::new(ShopperAction::FocusField(field), 0.3),
                WeightedAction::new(ShopperAction::SubmitForm, 0.1),
            ]),
        }
        candidates
    }

    /// Performs `action` on the shop.
    pub fn apply(
        &mut self,
        action: &ShopperAction,
        schedule: &mut impl Schedule,
    ) -> Result<(), SiteError> {
        let shop = &mut self.shop;
        match *action {
            ShopperAction::SwitchPage(page) => shop.switch_page(page, schedule),
            ShopperAction::HeroCta => shop.hero_cta(schedule),
            ShopperAction::PromoBanner => shop.promo_banner(schedule),
            ShopperAction::HoverProduct(id) => shop.hover_product(id, schedule)?,
            ShopperAction::AddToCart(id) => shop.add_to_cart(id, schedule)?,
            ShopperAction::ClickCart => shop.click_cart(schedule),
            ShopperAction::NewsletterSignup { with_email } => {
                shop.type_newsletter_email(if with_email { "shopper@example.com" } else { "" });
                shop.newsletter_signup(schedule);
            }
            ShopperAction::FilterProducts(value) => shop.filter_products(value, schedule),
            ShopperAction::AboutCta => shop.about_cta(schedule),
            ShopperAction::PlayVideo => shop.play_video(schedule),
            ShopperAction::FocusField(field) => {
                shop.focus_field(field, schedule);
            }
            ShopperAction::SubmitForm => shop.submit_contact_form(schedule),
            ShopperAction::FooterLink(text, url) => shop.footer_link(text, url, schedule),
            ShopperAction::SocialClick(network) => shop.social_click(network, schedule),
            ShopperAction::Refresh => shop.refresh(schedule),
        }
        Ok(())
    }

    /// Picks and performs the next action.
    pub fn step(&mut self, schedule: &mut impl Schedule) -> Result<ShopperAction, SiteError> {
        let candidates = self.candidates();
        let action = weighted_random_choice(&mut self.rng, &candidates)
            .map(|c| c.action.clone())
            .unwrap_or(ShopperAction::SwitchPage(Page::Home));
        self.apply(&action, schedule)?;
        self.steps_taken += 1;
        tracing::trace!(step = self.steps_taken, ?action, "Shopper acted");
        Ok(action)
    }

    /// Runs `steps` actions and returns them in order.
    pub fn run(
        &mut self,
        steps: usize,
        schedule: &mut impl Schedule,
    ) -> Result<Vec<ShopperAction>, SiteError> {
        (0..steps).map(|_| self.step(&mut *schedule)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_events::Params;

    #[test]
    fn test_weighted_random_choice() {
        let mut rng = SmallRng::seed_from_u64(12345);
        let candidates = vec![
            WeightedAction::new(ShopperAction::Refresh, 0.1),
            WeightedAction::new(ShopperAction::ClickCart, 0.9),
        ];

        let mut refresh_count = 0;
        let mut cart_count = 0;
        for _ in 0..1000 {
            match weighted_random_choice(&mut rng, &candidates).map(|c| &c.action) {
                Some(ShopperAction::Refresh) => refresh_count += 1,
                Some(ShopperAction::ClickCart) => cart_count += 1,
                _ => {}
            }
        }
        assert!(cart_count > refresh_count * 5);
    }

    #[test]
    fn test_empty_candidates() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(weighted_random_choice(&mut rng, &[]).is_none());
    }

    #[test]
    fn test_actions_follow_current_page() {
        let mut scenario = Scenario::new(7);
        let mut rec: Vec<(String, Params)> = Vec::new();
        for _ in 0..200 {
            let page = scenario.shop().current_page();
            let action = scenario.step(&mut rec).unwrap();
            let page_specific = match action {
                ShopperAction::HoverProduct(_)
                | ShopperAction::AddToCart(_)
                | ShopperAction::FilterProducts(_) => Some(Page::Products),
                ShopperAction::AboutCta | ShopperAction::PlayVideo => Some(Page::About),
                ShopperAction::FocusField(_) | ShopperAction::SubmitForm => Some(Page::Contact),
                ShopperAction::HeroCta
                | ShopperAction::PromoBanner
                | ShopperAction::NewsletterSignup { .. } => Some(Page::Home),
                _ => None,
            };
            if let Some(expected) = page_specific {
                assert_eq!(page, expected, "{:?}", action);
            }
        }
        assert_eq!(scenario.steps_taken(), 200);
    }
}
