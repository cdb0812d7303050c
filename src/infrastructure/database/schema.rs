diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    schema_embeddings (table_name) {
        table_name -> Text,
        schema_details -> Text,
        embedding -> Vector,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    result_records (id) {
        id -> Uuid,
        content -> Text,
        embedding -> Vector,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(schema_embeddings, result_records);
