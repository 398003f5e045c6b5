//! Query sources: the base table of each listable entity, the JSON document
//! each row is projected into, and its sort whitelist.
//!
//! Child collections are correlated sub-queries aggregated with
//! `json_group_array`. Sub-query results lose their JSON subtype, so they
//! are re-parsed with `json(..)` before being embedded; `json(NULL)` stays
//! `NULL`, which the materializer reads as an absent association.

use crate::{define_entity, models::types::SortDirection, query::sort::SortWhitelist};

define_entity!(
    products {
        table: "products",
        alias: "p",
        columns: {
            ID: String => "id",
            TITLE: String => "title",
            DESCRIPTION: String => "description",
            PRICE: f64 => "price",
            CREATED_AT: String => "created_at",
        }
    }
);

define_entity!(
    orders {
        table: "orders",
        alias: "o",
        columns: {
            ID: String => "id",
            USER_ID: String => "user_id",
            ADDRESS: String => "address",
            CONTACT: String => "contact",
            STATUS: String => "status",
            CREATED_AT: String => "created_at",
        }
    }
);

define_entity!(
    categories {
        table: "categories",
        alias: "c",
        columns: {
            ID: i32 => "id",
            TITLE: String => "title",
        }
    }
);

/// Where a list statement reads from and what each row looks like.
#[derive(Debug)]
pub struct QuerySource {
    /// Entity name used in logs and not-found errors.
    pub entity: &'static str,
    /// `table alias`
    pub from: &'static str,
    /// Expression producing one JSON document per base row.
    pub document: &'static str,
    pub sort: SortWhitelist,
}

const PRODUCT_DOCUMENT: &str = "json_object(\
'id', p.id, \
'title', p.title, \
'description', p.description, \
'price', p.price, \
'category', json((SELECT json_object('id', c.id, 'title', c.title) \
FROM products_categories pc JOIN categories c ON c.id = pc.category_id \
WHERE pc.product_id = p.id)), \
'created_at', p.created_at, \
'updated_at', p.updated_at, \
'images', json((SELECT json_group_array(json_object('id', i.id, 'filename', i.filename, 'url', i.url) ORDER BY i.id) \
FROM images i WHERE i.product_id = p.id))\
)";

const ORDER_DOCUMENT: &str = "json_object(\
'id', o.id, \
'user_id', o.user_id, \
'transfer_slip', json(o.transfer_slip), \
'products', json((SELECT json_group_array(json_object('id', po.id, 'qty', po.qty, 'product', json(po.product)) ORDER BY po.id) \
FROM products_orders po WHERE po.order_id = o.id)), \
'address', o.address, \
'contact', o.contact, \
'status', o.status, \
'total_paid', o.total_paid, \
'created_at', o.created_at, \
'updated_at', o.updated_at\
)";

const CATEGORY_DOCUMENT: &str = "json_object('id', c.id, 'title', c.title)";

pub static PRODUCTS: QuerySource = QuerySource {
    entity: "Product",
    from: products::FROM,
    document: PRODUCT_DOCUMENT,
    sort: SortWhitelist {
        columns: &[
            ("id", products::ID.name),
            ("title", products::TITLE.name),
            ("price", products::PRICE.name),
        ],
        default_key: "title",
        default_direction: SortDirection::Asc,
        tiebreaker: products::ID.name,
    },
};

pub static ORDERS: QuerySource = QuerySource {
    entity: "Order",
    from: orders::FROM,
    document: ORDER_DOCUMENT,
    sort: SortWhitelist {
        columns: &[
            ("id", orders::ID.name),
            ("created_at", orders::CREATED_AT.name),
        ],
        default_key: "id",
        default_direction: SortDirection::Desc,
        tiebreaker: orders::ID.name,
    },
};

pub static CATEGORIES: QuerySource = QuerySource {
    entity: "Category",
    from: categories::FROM,
    document: CATEGORY_DOCUMENT,
    sort: SortWhitelist {
        columns: &[("id", categories::ID.name), ("title", categories::TITLE.name)],
        default_key: "id",
        default_direction: SortDirection::Asc,
        tiebreaker: categories::ID.name,
    },
};
