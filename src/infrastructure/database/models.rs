use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::repositories::SchemaEmbeddingRecord;
use crate::infrastructure::database::schema::{result_records, schema_embeddings};

#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = schema_embeddings)]
pub struct SchemaEmbeddingModel {
    pub table_name: String,
    pub schema_details: String,
    pub embedding: Vector,
}

impl From<SchemaEmbeddingModel> for SchemaEmbeddingRecord {
    fn from(model: SchemaEmbeddingModel) -> Self {
        Self {
            table_name: model.table_name,
            descriptor_text: model.schema_details,
            embedding: model.embedding,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = result_records)]
pub struct NewResultRecordModel {
    pub id: Uuid,
    pub content: String,
    pub embedding: Vector,
    pub created_at: DateTime<Utc>,
}
