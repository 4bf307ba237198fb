//! Default page layouts used when a tenant has no draft yet.

use crate::domain::configuration::PageType;
use crate::domain::slot::{Slot, SlotKind, SlotType};
use crate::domain::tree::LayoutSnapshot;
use crate::LayoutError;
use serde_json::json;

/// Source of default trees for page types
pub trait TemplateProvider: Send + Sync {
    /// Default tree for `page_type`
    fn template(&self, page_type: &PageType) -> Result<LayoutSnapshot, LayoutError>;
}

/// Built-in storefront templates. Custom pages start empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTemplates;

impl TemplateProvider for BuiltinTemplates {
    fn template(&self, page_type: &PageType) -> Result<LayoutSnapshot, LayoutError> {
        default_template(page_type)
    }
}

/// Default tree for `page_type`
pub fn default_template(page_type: &PageType) -> Result<LayoutSnapshot, LayoutError> {
    let slots = match page_type {
        PageType::Product => product(),
        PageType::Category => category(),
        PageType::Cart => cart(),
        PageType::Checkout => checkout(),
        PageType::Homepage => homepage(),
        PageType::Custom(_) => Vec::new(),
    };
    LayoutSnapshot::from_slots(slots)
}

fn slot(id: &str, slot_type: SlotType, content: &str) -> Slot {
    Slot::new(id, SlotKind::with_content(slot_type, content))
}

fn component(id: &str, name: &str) -> Slot {
    Slot::new(
        id,
        SlotKind::Component {
            component: name.to_string(),
            props: json!({}),
        },
    )
}

fn product() -> Vec<Slot> {
    vec![
        Slot::container("main_container").with_order(0),
        component("product_gallery", "ProductGallery")
            .with_parent("main_container")
            .with_col_span(6)
            .with_order(0),
        Slot::container("product_info")
            .with_parent("main_container")
            .with_col_span(6)
            .with_order(1),
        slot("product_title", SlotType::Text, "{{product.name}}")
            .with_parent("product_info")
            .with_col_span(12)
            .with_order(0)
            .with_class_name("text-3xl font-bold"),
        slot("product_price", SlotType::Text, "{{product.price}}")
            .with_parent("product_info")
            .with_col_span(12)
            .with_order(1)
            .with_class_name("text-2xl"),
        slot("add_to_cart", SlotType::Button, "Add to cart")
            .with_parent("product_info")
            .with_col_span(6)
            .with_order(2),
        Slot::container("product_details").with_order(1),
        slot(
            "product_description",
            SlotType::Html,
            "{{product.description}}",
        )
        .with_parent("product_details")
        .with_order(0),
    ]
}

fn category() -> Vec<Slot> {
    vec![
        Slot::container("category_header").with_order(0),
        slot("category_title", SlotType::Text, "{{category.name}}")
            .with_parent("category_header")
            .with_col_span(12)
            .with_order(0)
            .with_class_name("text-3xl font-bold"),
        Slot::container("category_body").with_order(1),
        component("category_filters", "LayeredNavigation")
            .with_parent("category_body")
            .with_col_span(3)
            .with_order(0),
        component("product_grid", "ProductGrid")
            .with_parent("category_body")
            .with_col_span(9)
            .with_order(1),
    ]
}

fn cart() -> Vec<Slot> {
    let mut checkout_button = Slot::new(
        "checkout_button",
        SlotKind::Button {
            content: "Proceed to checkout".to_string(),
            href: Some("/checkout".to_string()),
        },
    );
    checkout_button.parent_id = Some("cart_summary".into());
    checkout_button.col_span = 12;
    checkout_button.order = 1;

    vec![
        slot("cart_title", SlotType::Text, "Your cart")
            .with_col_span(12)
            .with_order(0),
        Slot::container("cart_container").with_order(1),
        component("cart_items", "CartItems")
            .with_parent("cart_container")
            .with_col_span(8)
            .with_order(0),
        Slot::container("cart_summary")
            .with_parent("cart_container")
            .with_col_span(4)
            .with_order(1),
        component("cart_totals", "CartTotals")
            .with_parent("cart_summary")
            .with_order(0),
        checkout_button,
    ]
}

fn checkout() -> Vec<Slot> {
    vec![
        Slot::container("checkout_container").with_order(0),
        component("checkout_form", "CheckoutForm")
            .with_parent("checkout_container")
            .with_col_span(8)
            .with_order(0),
        component("order_summary", "OrderSummary")
            .with_parent("checkout_container")
            .with_col_span(4)
            .with_order(1),
    ]
}

fn homepage() -> Vec<Slot> {
    vec![
        Slot::container("hero").with_order(0),
        slot("hero_headline", SlotType::Text, "{{store.name}}")
            .with_parent("hero")
            .with_col_span(12)
            .with_order(0)
            .with_class_name("text-4xl font-bold"),
        slot("hero_cta", SlotType::Button, "Shop now")
            .with_parent("hero")
            .with_order(1),
        component("featured_products", "FeaturedProducts").with_order(1),
    ]
}
