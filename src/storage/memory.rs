//! In-process repository
//!
//! Holds rows of one entity model in memory, assigns auto-increment ids and
//! enforces unique columns. Conditions, ordering and pagination are evaluated
//! with [`FindOperator::matches`](crate::filter::FindOperator::matches).

use std::cmp::Ordering;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Attributes, Entity, EntityRepository, RecordId, SchemaIntrospection, StorageError};
use crate::filter::condition::compare_values;
use crate::filter::{FindOptions, SortDirection, WhereCondition};
use crate::schema::EntityMetadata;

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Entity>,
    next_id: i64,
}

#[derive(Debug)]
pub struct MemoryRepository {
    metadata: EntityMetadata,
    unique_columns: Vec<String>,
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new(metadata: EntityMetadata) -> Self {
        MemoryRepository {
            metadata,
            unique_columns: Vec::new(),
            state: RwLock::new(MemoryState {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Reject saves that would duplicate a value of `column`
    pub fn with_unique(mut self, column: impl Into<String>) -> Self {
        self.unique_columns.push(column.into());
        self
    }

    /// Seed rows; rows without an id get the next generated one
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Attributes>) -> Self {
        let id_column = self.id_column().to_string();
        let state = self.state.get_mut();
        for attributes in rows {
            let mut entity = Entity::new(attributes);
            assign_id(&mut entity, &id_column, state);
            state.rows.push(entity);
        }
        self
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn id_column(&self) -> &str {
        self.metadata
            .primary_column()
            .map(|c| c.property_path.as_str())
            .unwrap_or("id")
    }

    fn row_id(&self, entity: &Entity) -> Option<RecordId> {
        entity.get(self.id_column()).and_then(RecordId::from_value)
    }

    fn check_unique(&self, rows: &[Entity], candidate: &Entity) -> Result<(), StorageError> {
        let candidate_id = self.row_id(candidate);
        for column in &self.unique_columns {
            let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let duplicate = rows.iter().any(|row| {
                self.row_id(row) != candidate_id && row.get(column) == Some(value)
            });
            if duplicate {
                return Err(StorageError::query_failed(
                    format!(
                        "duplicate key value violates unique constraint on \"{}\"",
                        column
                    ),
                    Some(column.clone()),
                ));
            }
        }
        Ok(())
    }
}

fn assign_id(entity: &mut Entity, id_column: &str, state: &mut MemoryState) {
    match entity.get(id_column) {
        Some(Value::Number(n)) => {
            if let Some(id) = n.as_i64() {
                state.next_id = state.next_id.max(id + 1);
            }
        }
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => {
            entity.assign(id_column, Value::from(state.next_id));
            state.next_id += 1;
        }
    }
}

fn matches_condition(entity: &Entity, condition: &WhereCondition) -> bool {
    condition
        .iter()
        .all(|(field, operator)| operator.matches(entity.get(field)))
}

impl SchemaIntrospection for MemoryRepository {
    fn metadata(&self) -> Result<EntityMetadata, StorageError> {
        Ok(self.metadata.clone())
    }
}

#[async_trait]
impl EntityRepository for MemoryRepository {
    async fn count(&self, condition: &WhereCondition) -> Result<u64, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .iter()
            .filter(|row| matches_condition(row, condition))
            .count() as u64)
    }

    async fn find(&self, options: &FindOptions) -> Result<Vec<Entity>, StorageError> {
        let state = self.state.read().await;
        let mut rows: Vec<Entity> = state
            .rows
            .iter()
            .filter(|row| matches_condition(row, &options.where_clause))
            .cloned()
            .collect();

        if let Some(sort_by) = &options.order.sort_by {
            rows.sort_by(|a, b| {
                let ordering = match (a.get(sort_by), b.get(sort_by)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                match options.order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        Ok(rows
            .into_iter()
            .skip(options.skip as usize)
            .take(options.take as usize)
            .collect())
    }

    async fn find_one(&self, id: &RecordId) -> Result<Option<Entity>, StorageError> {
        let state = self.state.read().await;
        let id_column = self.id_column();
        Ok(state
            .rows
            .iter()
            .find(|row| row.get(id_column).is_some_and(|v| id.matches(v)))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Entity>, StorageError> {
        let state = self.state.read().await;
        let id_column = self.id_column();
        Ok(state
            .rows
            .iter()
            .filter(|row| {
                row.get(id_column)
                    .is_some_and(|v| ids.iter().any(|id| id.matches(v)))
            })
            .cloned()
            .collect())
    }

    fn create(&self, attributes: Attributes) -> Entity {
        Entity::new(attributes)
    }

    async fn save(&self, mut entity: Entity) -> Result<Entity, StorageError> {
        let mut state = self.state.write().await;
        let id_column = self.id_column().to_string();

        let existing = self.row_id(&entity).and_then(|id| {
            state
                .rows
                .iter()
                .position(|row| row.get(&id_column).is_some_and(|v| id.matches(v)))
        });

        self.check_unique(&state.rows, &entity)?;

        match existing {
            Some(index) => {
                debug!("{}: updating row {}", self.metadata.name, index);
                state.rows[index] = entity.clone();
            }
            None => {
                assign_id(&mut entity, &id_column, &mut state);
                debug!(
                    "{}: inserting row {:?}",
                    self.metadata.name,
                    entity.get(&id_column)
                );
                state.rows.push(entity.clone());
            }
        }
        Ok(entity)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let id_column = self.id_column().to_string();
        state
            .rows
            .retain(|row| !row.get(&id_column).is_some_and(|v| id.matches(v)));
        Ok(())
    }
}
