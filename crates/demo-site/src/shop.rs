//! Demo e-commerce shop.
//!
//! Four pages, a six-product catalog, a cart, a newsletter box and a contact
//! form. Every interaction reports a GA4-style event.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::{json, Value};
use tag_events::{into_params, Tracker};

use crate::{Schedule, SiteError};

pub const SITE_ORIGIN: &str = "https://demo-ecommerce.shop";

/// Delay before the landing `page_view` when the shop first opens.
pub const INITIAL_PAGE_VIEW_DELAY: Duration = Duration::from_millis(500);

/// Delay between the products `page_view` and its `view_item_list`.
pub const ITEM_LIST_DELAY: Duration = Duration::from_millis(300);

const CURRENCY: &str = "EUR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Home,
    Products,
    About,
    Contact,
}

impl Page {
    pub fn all() -> [Page; 4] {
        [Page::Home, Page::Products, Page::About, Page::Contact]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Products => "products",
            Page::About => "about",
            Page::Contact => "contact",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home - DemoShop",
            Page::Products => "Prodotti - DemoShop",
            Page::About => "Chi Siamo - DemoShop",
            Page::Contact => "Contatti - DemoShop",
        }
    }

    /// Path component; the home page is `/`.
    pub fn path(self) -> String {
        match self {
            Page::Home => "/".to_string(),
            other => format!("/{}", other.as_str()),
        }
    }

    pub fn location(self) -> String {
        match self {
            Page::Home => format!("{SITE_ORIGIN}/"),
            other => format!("{SITE_ORIGIN}/{}", other.as_str()),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Page {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::all()
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| SiteError::UnknownPage(s.to_string()))
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub price: f64,
}

impl Product {
    /// GA4 item object with quantity 1.
    fn item(&self) -> Value {
        json!({
            "item_id": self.id,
            "item_name": self.name,
            "item_category": self.category,
            "price": self.price,
            "quantity": 1,
        })
    }
}

pub static CATALOG: &[Product] = &[
    Product { id: "SKU001", name: "Sneakers Pro", category: "Scarpe", price: 129.99 },
    Product { id: "SKU002", name: "T-Shirt Basic", category: "Abbigliamento", price: 29.99 },
    Product { id: "SKU003", name: "Zaino Urban", category: "Accessori", price: 79.99 },
    Product { id: "SKU004", name: "Running Shoes", category: "Scarpe", price: 149.99 },
    Product { id: "SKU005", name: "Felpa Hoodie", category: "Abbigliamento", price: 59.99 },
    Product { id: "SKU006", name: "Cappello Logo", category: "Accessori", price: 24.99 },
];

pub fn find_product(id: &str) -> Result<&'static Product, SiteError> {
    CATALOG
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| SiteError::UnknownProduct(id.to_string()))
}

/// Contact form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Email,
    Subject,
    Message,
}

impl FormField {
    pub fn all() -> [FormField; 4] {
        [FormField::Name, FormField::Email, FormField::Subject, FormField::Message]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Subject => "subject",
            FormField::Message => "message",
        }
    }
}

impl FromStr for FormField {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::all()
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| SiteError::UnknownField(s.to_string()))
    }
}

/// Shop state: current page, cart contents and form progress.
#[derive(Debug, Clone, Default)]
pub struct DemoShop {
    current_page: Page,
    cart: Vec<&'static Product>,
    newsletter_email: String,
    started_fields: BTreeSet<FormField>,
}

impl DemoShop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> Page {
        self.current_page
    }

    pub fn cart(&self) -> &[&'static Product] {
        &self.cart
    }

    pub fn cart_total(&self) -> f64 {
        self.cart.iter().map(|p| p.price).sum()
    }

    /// Schedules the landing `page_view` for the home page.
    pub fn open(&self, schedule: &mut impl Schedule) {
        schedule.track_after(
            INITIAL_PAGE_VIEW_DELAY,
            "page_view",
            page_view_params(Page::Home),
        );
    }

    /// Navigates to `page`.
    ///
    /// The products page also schedules a `view_item_list` for the full
    /// catalog.
    pub fn switch_page(&mut self, page: Page, schedule: &mut impl Schedule) {
        self.current_page = page;
        schedule.track("page_view", page_view_params(page));

        if page == Page::Products {
            let items: Vec<Value> = CATALOG
                .iter()
                .map(|p| json!({ "item_id": p.id, "item_name": p.name, "price": p.price }))
                .collect();
            schedule.track_after(
                ITEM_LIST_DELAY,
                "view_item_list",
                into_params(json!({
                    "item_list_id": "all_products",
                    "item_list_name": "Tutti i Prodotti",
                    "items": items,
                })),
            );
        }
    }

    /// Hero call-to-action: a click, then the products page.
    pub fn hero_cta(&mut self, schedule: &mut impl Schedule) {
        schedule.track(
            "click",
            into_params(json!({
                "click_element": "hero_cta",
                "click_text": "Scopri i Prodotti",
            })),
        );
        self.switch_page(Page::Products, schedule);
    }

    pub fn promo_banner(&self, tracker: &mut impl Tracker) {
        tracker.track(
            "select_promotion",
            into_params(json!({
                "promotion_id": "DEMO20",
                "promotion_name": "Sconto 20%",
                "creative_slot": "homepage_banner",
            })),
        );
    }

    /// Hovering a product card.
    pub fn hover_product(&self, id: &str, tracker: &mut impl Tracker) -> Result<(), SiteError> {
        let product = find_product(id)?;
        tracker.track("view_item", item_params(product));
        Ok(())
    }

    pub fn add_to_cart(&mut self, id: &str, tracker: &mut impl Tracker) -> Result<(), SiteError> {
        let product = find_product(id)?;
        self.cart.push(product);
        tracker.track("add_to_cart", item_params(product));
        Ok(())
    }

    /// Cart icon: `begin_checkout` with the cart, or a plain click when empty.
    pub fn click_cart(&self, tracker: &mut impl Tracker) {
        if self.cart.is_empty() {
            tracker.track(
                "click",
                into_params(json!({ "click_element": "cart_icon", "cart_status": "empty" })),
            );
            return;
        }

        let items: Vec<Value> = self
            .cart
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let mut item = p.item();
                item["index"] = json!(index);
                item
            })
            .collect();
        tracker.track(
            "begin_checkout",
            into_params(json!({
                "currency": CURRENCY,
                "value": self.cart_total(),
                "items": items,
            })),
        );
    }

    pub fn type_newsletter_email(&mut self, email: &str) {
        self.newsletter_email = email.to_string();
    }

    pub fn newsletter_signup(&self, tracker: &mut impl Tracker) {
        tracker.track(
            "newsletter_signup",
            into_params(json!({
                "method": "homepage_form",
                "email_provided": !self.newsletter_email.is_empty(),
            })),
        );
    }

    pub fn filter_products(&self, value: &str, tracker: &mut impl Tracker) {
        tracker.track(
            "click",
            into_params(json!({ "click_element": "product_filter", "filter_value": value })),
        );
    }

    pub fn about_cta(&self, tracker: &mut impl Tracker) {
        tracker.track(
            "click",
            into_params(json!({ "click_element": "about_cta", "click_text": "Contattaci" })),
        );
    }

    pub fn play_video(&self, tracker: &mut impl Tracker) {
        tracker.track(
            "video_start",
            into_params(json!({
                "video_title": "Video Aziendale",
                "video_provider": "demo",
                "video_url": format!("{SITE_ORIGIN}/video"),
            })),
        );
    }

    /// Focusing a contact form field. Each field reports `form_start` once.
    pub fn focus_field(&mut self, field: FormField, tracker: &mut impl Tracker) -> bool {
        if !self.started_fields.insert(field) {
            return false;
        }
        tracker.track("form_start", contact_form_params());
        true
    }

    pub fn submit_contact_form(&self, tracker: &mut impl Tracker) {
        let mut params = contact_form_params();
        params.insert("form_submit_text".to_string(), json!("Invia Messaggio"));
        tracker.track("form_submit", params);
    }

    pub fn footer_link(&self, text: &str, url: &str, tracker: &mut impl Tracker) {
        tracker.track(
            "click",
            into_params(json!({
                "click_element": "footer_link",
                "link_text": text,
                "link_url": url,
            })),
        );
    }

    pub fn social_click(&self, network: &str, tracker: &mut impl Tracker) {
        tracker.track(
            "social_click",
            into_params(json!({ "social_network": network, "click_location": "footer" })),
        );
    }

    /// Empties the cart and newsletter box, returns home and reports a
    /// refresh `page_view`.
    ///
    /// Form fields that already reported `form_start` stay consumed.
    pub fn refresh(&mut self, schedule: &mut impl Schedule) {
        self.cart.clear();
        self.newsletter_email.clear();
        self.switch_page(Page::Home, schedule);
        schedule.track(
            "page_view",
            into_params(json!({
                "page_title": "Home - DemoShop (Refresh)",
                "page_location": Page::Home.location(),
                "page_path": "/",
                "is_refresh": true,
            })),
        );
        tracing::debug!("Demo shop refreshed");
    }
}

fn page_view_params(page: Page) -> tag_events::Params {
    into_params(json!({
        "page_title": page.title(),
        "page_location": page.location(),
        "page_path": page.path(),
    }))
}

fn item_params(product: &Product) -> tag_events::Params {
    into_params(json!({
        "currency": CURRENCY,
        "value": product.price,
        "items": [product.item()],
    }))
}

fn contact_form_params() -> tag_events::Params {
    into_params(json!({ "form_name": "contact_form", "form_destination": "contact_page" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_events::Params;

    type Recorded = Vec<(String, Params)>;

    fn names(recorded: &Recorded) -> Vec<&str> {
        recorded.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn test_page_metadata() {
        assert_eq!(Page::Home.path(), "/");
        assert_eq!(Page::Home.location(), "https://demo-ecommerce.shop/");
        assert_eq!(Page::About.path(), "/about");
        assert_eq!(Page::Contact.title(), "Contatti - DemoShop");
        assert_eq!("products".parse::<Page>(), Ok(Page::Products));
        assert!("checkout".parse::<Page>().is_err());
    }

    #[test]
    fn test_products_page_lists_catalog() {
        let mut shop = DemoShop::new();
        let mut rec = Recorded::new();
        shop.switch_page(Page::Products, &mut rec);
        assert_eq!(names(&rec), vec!["page_view", "view_item_list"]);
        assert_eq!(rec[0].1["page_path"], "/products");
        let items = rec[1].1["items"].as_array().unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[3]["item_name"], "Running Shoes");
    }

    #[test]
    fn test_empty_cart_click() {
        let shop = DemoShop::new();
        let mut rec = Recorded::new();
        shop.click_cart(&mut rec);
        assert_eq!(names(&rec), vec!["click"]);
        assert_eq!(rec[0].1["cart_status"], "empty");
    }

    #[test]
    fn test_checkout_lists_cart_with_index() {
        let mut shop = DemoShop::new();
        let mut rec = Recorded::new();
        shop.add_to_cart("SKU002", &mut rec).unwrap();
        shop.add_to_cart("SKU006", &mut rec).unwrap();
        shop.click_cart(&mut rec);

        let checkout = &rec[2].1;
        assert_eq!(rec[2].0, "begin_checkout");
        assert!((checkout["value"].as_f64().unwrap() - 54.98).abs() < 1e-9);
        assert_eq!(checkout["items"][1]["item_id"], "SKU006");
        assert_eq!(checkout["items"][1]["index"], 1);
    }

    #[test]
    fn test_unknown_product() {
        let mut shop = DemoShop::new();
        let mut rec = Recorded::new();
        assert_eq!(
            shop.add_to_cart("SKU999", &mut rec),
            Err(SiteError::UnknownProduct("SKU999".into()))
        );
        assert!(rec.is_empty());
        assert!(shop.cart().is_empty());
    }

    #[test]
    fn test_form_start_once_per_field() {
        let mut shop = DemoShop::new();
        let mut rec = Recorded::new();
        assert!(shop.focus_field(FormField::Name, &mut rec));
        assert!(!shop.focus_field(FormField::Name, &mut rec));
        assert!(shop.focus_field(FormField::Message, &mut rec));
        shop.submit_contact_form(&mut rec);
        assert_eq!(names(&rec), vec!["form_start", "form_start", "form_submit"]);
        assert_eq!(rec[2].1["form_submit_text"], "Invia Messaggio");
    }

    #[test]
    fn test_newsletter_email_flag() {
        let mut shop = DemoShop::new();
        let mut rec = Recorded::new();
        shop.newsletter_signup(&mut rec);
        shop.type_newsletter_email("a@b.it");
        shop.newsletter_signup(&mut rec);
        assert_eq!(rec[0].1["email_provided"], false);
        assert_eq!(rec[1].1["email_provided"], true);
    }

    #[test]
    fn test_refresh_resets_cart_and_reports() {
        let mut shop = DemoShop::new();
        let mut rec = Recorded::new();
        shop.switch_page(Page::About, &mut rec);
        shop.add_to_cart("SKU001", &mut rec).unwrap();
        rec.clear();

        shop.refresh(&mut rec);
        assert!(shop.cart().is_empty());
        assert_eq!(shop.current_page(), Page::Home);
        assert_eq!(names(&rec), vec!["page_view", "page_view"]);
        assert_eq!(rec[1].1["is_refresh"], true);
        assert_eq!(rec[1].1["page_title"], "Home - DemoShop (Refresh)");
    }
}
