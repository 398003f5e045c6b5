//! Macros for defining entity schemas.
//!
//! The [`define_entity!`] macro generates alias-qualified column constants
//! for a table, tying column names to Rust types.

/// Defines a module with typed column constants for a database table.
///
/// # Syntax
///
/// ```ignore
/// define_entity!(
///     products {
///         table: "products",
///         alias: "p",
///         columns: {
///             ID: String => "id",
///             PRICE: f64 => "price"
///         }
///     }
/// );
/// ```
///
/// This expands to:
///
/// ```ignore
/// pub mod products {
///     pub const TABLE: &str = "products";
///     pub const ALIAS: &str = "p";
///     pub const FROM: &str = "products p";
///     pub const ID: shop_db::expr::Col<String> = shop_db::expr::Col::new("p.id");
///     pub const PRICE: shop_db::expr::Col<f64> = shop_db::expr::Col::new("p.price");
/// }
/// ```
#[macro_export]
macro_rules! define_entity {
    (
        $entity:ident {
            table: $table:literal,
            alias: $alias:literal,
            columns: {
                $($col_name:ident: $col_type:ty => $db_col:literal),* $(,)?
            }
        }
    ) => {
        pub mod $entity {
            #[allow(unused_imports)]
            use $crate::expr::column::Col;

            pub const TABLE: &str = $table;
            pub const ALIAS: &str = $alias;
            pub const FROM: &str = concat!($table, " ", $alias);

            $(
                pub const $col_name: Col<$col_type> = Col::new(concat!($alias, ".", $db_col));
            )*
        }
    };
}
