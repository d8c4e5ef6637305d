//! Relational implementation of the PawLedger [`Gateway`].
//!
//! [`SeaGateway`] serves every record type from a sea-orm connection, scoped
//! to a single user: reads, updates and deletes only ever see rows carrying
//! that user's id, and creates stamp it. Records cross into the tables as
//! JSON objects whose keys are renamed by [`naming`].

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use store::{
    Budget, Expense, ExpenseCategory, Gateway, GatewayError, GatewayResult, Pet, Record, Remote,
    Settings, UserCategoryPreference,
};
use uuid::Uuid;

use error::{db_error, json_error};

pub mod entities;
mod error;
pub mod naming;

/// Gateway over a sea-orm [`DatabaseConnection`], scoped to one user.
#[derive(Debug, Clone)]
pub struct SeaGateway {
    database: DatabaseConnection,
    user_id: String,
}

impl SeaGateway {
    /// Return a builder for `SeaGateway`. Help to build the struct.
    pub fn builder() -> SeaGatewayBuilder {
        SeaGatewayBuilder::default()
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Id stamped on, and required of, every row this gateway touches.
    pub fn user(&self) -> &str {
        &self.user_id
    }

    /// Row object for a new record: the payload plus identity, owner and
    /// timestamps.
    fn new_row<T: Serialize>(&self, fields: &T) -> GatewayResult<Value> {
        let now = Utc::now();
        let mut row = encode(fields)?;
        let Value::Object(columns) = &mut row else {
            return Err(GatewayError::Decode(
                "record payload is not an object".to_string(),
            ));
        };
        columns.insert("id".to_string(), json!(Uuid::new_v4()));
        columns.insert("user_id".to_string(), json!(self.user_id));
        columns.insert("created_at".to_string(), json!(now));
        columns.insert("updated_at".to_string(), json!(now));
        Ok(row)
    }
}

/// Serialise a payload into a row object keyed by column names.
fn encode<T: Serialize>(payload: &T) -> GatewayResult<Value> {
    let value = serde_json::to_value(payload).map_err(json_error)?;
    Ok(naming::to_row(value))
}

/// Turn a table model back into a record.
fn decode<M: Serialize, R: DeserializeOwned>(model: M) -> GatewayResult<R> {
    let row = serde_json::to_value(model).map_err(json_error)?;
    serde_json::from_value(naming::to_record(row)).map_err(json_error)
}

/// Overlay the columns of `patch` on `current` and refresh `updated_at`.
fn merge(current: Value, patch: Value) -> GatewayResult<Value> {
    let (Value::Object(mut columns), Value::Object(changes)) = (current, patch) else {
        return Err(GatewayError::Decode("row is not an object".to_string()));
    };
    columns.extend(changes);
    columns.insert("updated_at".to_string(), json!(Utc::now()));
    Ok(Value::Object(columns))
}

/// Implement [`Remote`] for one record type over one entity module.
macro_rules! remote_table {
    ($record:ty, $table:ident) => {
        impl Remote<$record> for SeaGateway {
            async fn get_all(&self) -> GatewayResult<Vec<$record>> {
                use entities::$table::{Column, Entity};

                let models = Entity::find()
                    .filter(Column::UserId.eq(self.user_id.as_str()))
                    .order_by_asc(Column::CreatedAt)
                    .all(&self.database)
                    .await
                    .map_err(db_error)?;
                models.into_iter().map(decode).collect()
            }

            async fn get_by_id(&self, id: Uuid) -> GatewayResult<Option<$record>> {
                use entities::$table::{Column, Entity};

                Entity::find_by_id(id.to_string())
                    .filter(Column::UserId.eq(self.user_id.as_str()))
                    .one(&self.database)
                    .await
                    .map_err(db_error)?
                    .map(decode)
                    .transpose()
            }

            async fn create(
                &self,
                fields: <$record as Record>::New,
            ) -> GatewayResult<$record> {
                use entities::$table::ActiveModel;

                let row = self.new_row(&fields)?;
                let model = ActiveModel::from_json(row)
                    .map_err(db_error)?
                    .insert(&self.database)
                    .await
                    .map_err(db_error)?;
                tracing::debug!(id = %model.id, "inserted into {}", <$record as Record>::LABEL);
                decode(model)
            }

            async fn update(
                &self,
                id: Uuid,
                patch: <$record as Record>::Patch,
            ) -> GatewayResult<$record> {
                use entities::$table::{ActiveModel, Column, Entity};

                let current = Entity::find_by_id(id.to_string())
                    .filter(Column::UserId.eq(self.user_id.as_str()))
                    .one(&self.database)
                    .await
                    .map_err(db_error)?
                    .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;

                let current = serde_json::to_value(current).map_err(json_error)?;
                let row = merge(current, encode(&patch)?)?;
                let model = ActiveModel::from_json(row)
                    .map_err(db_error)?
                    .update(&self.database)
                    .await
                    .map_err(db_error)?;
                tracing::debug!(%id, "updated {}", <$record as Record>::LABEL);
                decode(model)
            }

            async fn delete(&self, id: Uuid) -> GatewayResult<()> {
                use entities::$table::{Column, Entity};

                let result = Entity::delete_many()
                    .filter(Column::Id.eq(id.to_string()))
                    .filter(Column::UserId.eq(self.user_id.as_str()))
                    .exec(&self.database)
                    .await
                    .map_err(db_error)?;
                if result.rows_affected == 0 {
                    return Err(GatewayError::NotFound(id.to_string()));
                }
                tracing::debug!(%id, "deleted from {}", <$record as Record>::LABEL);
                Ok(())
            }
        }
    };
}

remote_table!(Settings, settings);
remote_table!(ExpenseCategory, expense_categories);
remote_table!(Pet, pets);
remote_table!(Expense, expenses);
remote_table!(Budget, budgets);
remote_table!(UserCategoryPreference, user_category_preferences);

impl Gateway for SeaGateway {
    fn user_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// The builder for `SeaGateway`
#[derive(Default)]
pub struct SeaGatewayBuilder {
    database: DatabaseConnection,
    user_id: Option<String>,
}

impl SeaGatewayBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> SeaGatewayBuilder {
        self.database = db;
        self
    }

    /// Owner of every row read or written through the gateway.
    pub fn user(mut self, user_id: impl Into<String>) -> SeaGatewayBuilder {
        self.user_id = Some(user_id.into());
        self
    }

    /// Construct `SeaGateway`
    pub fn build(self) -> GatewayResult<SeaGateway> {
        let user_id = self
            .user_id
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty())
            .ok_or_else(|| GatewayError::Unavailable("no user id configured".to_string()))?;
        Ok(SeaGateway {
            database: self.database,
            user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overlays_patch_columns() {
        let merged = merge(
            json!({ "id": "e1", "amount": 100, "next_due_date": "2024-02-29" }),
            json!({ "next_due_date": null }),
        )
        .unwrap();
        assert_eq!(merged["id"], "e1");
        assert_eq!(merged["amount"], 100);
        assert!(merged["next_due_date"].is_null());
        assert!(merged["updated_at"].is_string());
    }

    #[test]
    fn builder_requires_a_user() {
        assert!(SeaGateway::builder().build().is_err());
        assert!(SeaGateway::builder().user("  ").build().is_err());
        let gateway = SeaGateway::builder().user(" alice ").build().unwrap();
        assert_eq!(gateway.user(), "alice");
    }
}
