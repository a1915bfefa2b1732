//! Catalog product types.

use minimart_core::{Price, ProductId};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Image filename under `/static/images/`.
    pub image: Option<String>,
}

/// A product to insert during seeding.
#[derive(Debug, Clone, Copy)]
pub struct NewProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: u32,
    pub image: Option<&'static str>,
}

/// The sample catalog inserted on first startup.
pub const SAMPLE_PRODUCTS: [NewProduct; 4] = [
    NewProduct {
        name: "Washing Machine",
        description: "Front Load Fully Automatic",
        price: 399,
        image: Some("washing.jpg"),
    },
    NewProduct {
        name: "Smartphone",
        description: "Latest model smartphone",
        price: 699,
        image: Some("smartphone.jpg"),
    },
    NewProduct {
        name: "Laptop",
        description: "Powerful gaming laptop",
        price: 1200,
        image: Some("laptop.jpg"),
    },
    NewProduct {
        name: "Headphones",
        description: "Noise-cancelling headphones",
        price: 199,
        image: Some("headphone.jpg"),
    },
];
