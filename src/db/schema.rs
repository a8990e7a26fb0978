diesel::table! {
    users (user_id) {
        user_id -> Int4,
        full_name -> Varchar,
        phone_number -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        role -> Varchar,
        avatar_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    stores (store_id) {
        store_id -> Int4,
        owner_id -> Int4,
        name -> Varchar,
        address -> Varchar,
        description -> Nullable<Varchar>,
        logo_url -> Nullable<Varchar>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
    }
}

diesel::table! {
    categories (category_id) {
        category_id -> Int4,
        name -> Varchar,
        parent_category_id -> Nullable<Int4>,
        is_active -> Bool,
    }
}

diesel::table! {
    food_items (food_item_id) {
        food_item_id -> Int4,
        store_id -> Int4,
        category_id -> Nullable<Int4>,
        name -> Varchar,
        description -> Nullable<Varchar>,
        image_url -> Nullable<Varchar>,
        standard_price -> Float8,
        surplus_price -> Nullable<Float8>,
        surplus_discount -> Nullable<Float8>,
        total_quantity -> Int4,
        reserved_quantity -> Int4,
        surplus_quantity -> Int4,
        available_quantity -> Int4,
        is_marked_for_surplus -> Bool,
        marked_surplus_at -> Nullable<Timestamptz>,
        is_active -> Bool,
        is_available -> Bool,
        expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    surprise_bags (surprise_bag_id) {
        surprise_bag_id -> Int4,
        store_id -> Int4,
        name -> Varchar,
        description -> Nullable<Varchar>,
        original_value -> Float8,
        discounted_price -> Float8,
        quantity_available -> Int4,
        pickup_start_time -> Timestamptz,
        pickup_end_time -> Timestamptz,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    surprise_bag_items (bag_item_id) {
        bag_item_id -> Int4,
        surprise_bag_id -> Int4,
        food_item_id -> Int4,
        min_quantity -> Int4,
        max_quantity -> Int4,
    }
}

diesel::table! {
    orders (order_id) {
        order_id -> Int4,
        customer_id -> Int4,
        status -> Varchar,
        total_amount -> Float8,
        delivery_address -> Nullable<Varchar>,
        notes -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    order_items (order_item_id) {
        order_item_id -> Int4,
        order_id -> Int4,
        surprise_bag_id -> Nullable<Int4>,
        food_item_id -> Nullable<Int4>,
        quantity -> Int4,
        price_per_item -> Float8,
    }
}

diesel::table! {
    transactions (transaction_id) {
        transaction_id -> Int4,
        order_id -> Nullable<Int4>,
        payer_id -> Int4,
        payee_id -> Int4,
        amount -> Float8,
        method -> Varchar,
        status -> Varchar,
        kind -> Varchar,
        transaction_date -> Timestamptz,
    }
}

diesel::table! {
    inventory_logs (log_id) {
        log_id -> Int4,
        food_item_id -> Int4,
        change_type -> Varchar,
        quantity_change -> Int4,
        previous_quantity -> Int4,
        new_quantity -> Int4,
        reason -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reviews (review_id) {
        review_id -> Int4,
        user_id -> Int4,
        order_id -> Int4,
        rating -> Int4,
        comment -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (notification_id) {
        notification_id -> Int4,
        title -> Varchar,
        message -> Varchar,
        is_important -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notification_recipients (notification_id, user_id) {
        notification_id -> Int4,
        user_id -> Int4,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    conversations (conversation_id) {
        conversation_id -> Int4,
        name -> Nullable<Varchar>,
        kind -> Varchar,
        last_message_id -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    conversation_members (conversation_id, user_id) {
        conversation_id -> Int4,
        user_id -> Int4,
        unread_count -> Int4,
    }
}

diesel::table! {
    messages (message_id) {
        message_id -> Int4,
        conversation_id -> Int4,
        sender_id -> Int4,
        content -> Varchar,
        is_deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(stores -> users (owner_id));
diesel::joinable!(food_items -> stores (store_id));
diesel::joinable!(food_items -> categories (category_id));
diesel::joinable!(surprise_bags -> stores (store_id));
diesel::joinable!(surprise_bag_items -> surprise_bags (surprise_bag_id));
diesel::joinable!(surprise_bag_items -> food_items (food_item_id));
diesel::joinable!(orders -> users (customer_id));
diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_items -> surprise_bags (surprise_bag_id));
diesel::joinable!(order_items -> food_items (food_item_id));
diesel::joinable!(transactions -> orders (order_id));
diesel::joinable!(inventory_logs -> food_items (food_item_id));
diesel::joinable!(reviews -> orders (order_id));
diesel::joinable!(reviews -> users (user_id));
diesel::joinable!(notification_recipients -> notifications (notification_id));
diesel::joinable!(notification_recipients -> users (user_id));
diesel::joinable!(conversation_members -> conversations (conversation_id));
diesel::joinable!(conversation_members -> users (user_id));
diesel::joinable!(messages -> conversations (conversation_id));
diesel::joinable!(messages -> users (sender_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    stores,
    categories,
    food_items,
    surprise_bags,
    surprise_bag_items,
    orders,
    order_items,
    transactions,
    inventory_logs,
    reviews,
    notifications,
    notification_recipients,
    conversations,
    conversation_members,
    messages,
);
