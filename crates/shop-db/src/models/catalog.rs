use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::{null_as_default, PaginateReq, SortReq};
use crate::schema::{categories, images, products, products_categories};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i32,
    pub filename: String,
    pub url: String,
}

/// A product with its category and images, as materialized by the read path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<Category>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub id: Option<String>,
    /// Matched against title and description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(flatten)]
    pub paginate: PaginateReq,
    #[serde(flatten)]
    pub sort: SortReq,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryFilter {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewImage {
    pub filename: String,
    pub url: String,
}

/// Create request for a product. The category must already exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category_id: i32,
    #[serde(default)]
    pub images: Vec<NewImage>,
}

/// Update request for a product.
///
/// `None` leaves a field untouched. `images: Some(..)` replaces the whole
/// image set, including with an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub images: Option<Vec<NewImage>>,
}

#[derive(Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
}

#[derive(AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<f64>,
    pub updated_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = products_categories)]
pub struct ProductCategoryLink<'a> {
    pub product_id: &'a str,
    pub category_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = images)]
pub struct NewImageRow<'a> {
    pub filename: &'a str,
    pub url: &'a str,
    pub product_id: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategory<'a> {
    pub title: &'a str,
}
