//! Home page route handler.
//!
//! The page is static: navigation, hero, a hard-coded featured grid and the
//! footer. Nothing here reads from the document store.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;

/// A link in the navigation bar or footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
}

/// A card in the featured grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturedCard {
    pub title: &'static str,
    pub description: &'static str,
}

/// Hero banner copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hero {
    pub title: &'static str,
    pub tagline: &'static str,
    pub cta_label: &'static str,
    pub cta_href: &'static str,
}

pub const STORE_NAME: &str = "Tensura Store";

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem {
        label: "Home",
        href: "#home",
    },
    NavItem {
        label: "Products",
        href: "#products",
    },
    NavItem {
        label: "About",
        href: "#about",
    },
    NavItem {
        label: "Contact",
        href: "#contact",
    },
];

pub const HERO: Hero = Hero {
    title: "Welcome to Tensura Store",
    tagline: "Discover premium products inspired by the world of That Time I Got Reincarnated as a Slime",
    cta_label: "Shop Now",
    cta_href: "#products",
};

pub const FEATURED: [FeaturedCard; 3] = [
    FeaturedCard {
        title: "Rimuru Collectibles",
        description: "Limited edition collectibles and merchandise",
    },
    FeaturedCard {
        title: "Clothing & Apparel",
        description: "Premium quality clothing and accessories",
    },
    FeaturedCard {
        title: "Accessories",
        description: "Unique accessories for true fans",
    },
];

pub const FOOTER_LINKS: [NavItem; 3] = [
    NavItem {
        label: "Privacy Policy",
        href: "#privacy",
    },
    NavItem {
        label: "Terms of Service",
        href: "#terms",
    },
    NavItem {
        label: "Shipping Info",
        href: "#shipping",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub store_name: &'static str,
    pub nav_items: &'static [NavItem],
    pub hero: Hero,
    pub featured: &'static [FeaturedCard],
    pub footer_links: &'static [NavItem],
}

impl Default for HomeTemplate {
    fn default() -> Self {
        Self {
            store_name: STORE_NAME,
            nav_items: &NAV_ITEMS,
            hero: HERO,
            featured: &FEATURED,
            footer_links: &FOOTER_LINKS,
        }
    }
}

/// Display the home page.
#[instrument]
pub async fn home() -> impl IntoResponse {
    HomeTemplate::default()
}
