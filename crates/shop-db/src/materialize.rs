//! Decodes JSON row documents into entity graphs.

use serde::de::DeserializeOwned;

use crate::error::{DbError, Result};

/// Decodes one document.
pub fn materialize_one<T: DeserializeOwned>(entity: &str, doc: &str) -> Result<T> {
    serde_json::from_str(doc).map_err(|err| DbError::DecodeError(format!("{entity}: {err}")))
}

/// Decodes every document, preserving order. The first malformed document
/// fails the whole read.
pub fn materialize<T: DeserializeOwned>(entity: &str, docs: &[String]) -> Result<Vec<T>> {
    docs.iter().map(|doc| materialize_one(entity, doc)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{catalog::Product, order::Order};

    #[test]
    fn test_materialize_product_graph() {
        let docs = vec![
            r#"{"id":"P1","title":"Coffee","description":"dark","price":10.0,
                "category":{"id":1,"title":"drinks"},"created_at":"t","updated_at":"t",
                "images":[{"id":1,"filename":"a.png","url":"u/a"},{"id":2,"filename":"b.png","url":"u/b"}]}"#
                .to_string(),
            r#"{"id":"P2","title":"Tea","description":"","price":5.0,
                "category":null,"created_at":"t","updated_at":"t","images":[]}"#
                .to_string(),
        ];
        let products: Vec<Product> = materialize("Product", &docs).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "P1");
        assert_eq!(products[0].images.len(), 2);
        assert_eq!(products[0].images[1].filename, "b.png");
        assert_eq!(products[0].category.as_ref().unwrap().title, "drinks");
        assert!(products[1].images.is_empty());
        assert!(products[1].category.is_none());
    }

    #[test]
    fn test_materialize_order_with_snapshot() {
        let doc = r#"{"id":"O1","user_id":"U1","transfer_slip":null,
            "products":[{"id":1,"qty":2,"product":{"id":"P1","title":"Coffee","description":"",
                "price":10.0,"category":null,"created_at":"t","updated_at":"t","images":null}}],
            "address":"a","contact":"c","status":"waiting","total_paid":20.0,
            "created_at":"t","updated_at":"t"}"#;
        let order: Order = materialize_one("Order", doc).unwrap();
        assert_eq!(order.products.len(), 1);
        assert_eq!(order.products[0].qty, 2);
        assert_eq!(order.products[0].product.price, 10.0);
    }

    #[test]
    fn test_malformed_document_fails_whole_read() {
        let docs = vec![
            r#"{"id":1,"title":"ok"}"#.to_string(),
            "{not json".to_string(),
        ];
        let err = materialize::<crate::models::catalog::Category>("Category", &docs).unwrap_err();
        assert!(matches!(err, DbError::DecodeError(ref msg) if msg.starts_with("Category")));
    }
}
