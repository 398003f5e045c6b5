diesel::table! {
    roles (id) {
        id -> Integer,
        title -> Text,
    }
}

diesel::table! {
    users (id) {
        id -> Text,
        email -> Text,
        password -> Text,
        username -> Text,
        role_id -> Integer,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    categories (id) {
        id -> Integer,
        title -> Text,
    }
}

diesel::table! {
    products (id) {
        id -> Text,
        title -> Text,
        description -> Text,
        price -> Double,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    products_categories (product_id) {
        product_id -> Text,
        category_id -> Integer,
    }
}

diesel::table! {
    images (id) {
        id -> Integer,
        filename -> Text,
        url -> Text,
        product_id -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    orders (id) {
        id -> Text,
        user_id -> Text,
        contact -> Text,
        address -> Text,
        transfer_slip -> Nullable<Jsonb>,
        status -> Text,
        total_paid -> Double,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    products_orders (id) {
        id -> Integer,
        order_id -> Text,
        qty -> Integer,
        product -> Jsonb,
    }
}

diesel::joinable!(users -> roles (role_id));
diesel::joinable!(products_categories -> products (product_id));
diesel::joinable!(products_categories -> categories (category_id));
diesel::joinable!(images -> products (product_id));
diesel::joinable!(orders -> users (user_id));
diesel::joinable!(products_orders -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    roles,
    users,
    categories,
    products,
    products_categories,
    images,
    orders,
    products_orders,
);
