use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Numeric,
}

/// A column a client may update, with the SQL type its value is bound as.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text, nullable: false }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Integer, nullable: true }
    }

    pub const fn numeric(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Numeric, nullable: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Bound {
    Text(Option<String>),
    Integer(Option<i32>),
    Numeric(Option<f64>),
}

/// Builds `UPDATE <table> SET col = $n, ... WHERE id = $m` from a fixed
/// column whitelist. Column names only ever come from the whitelist; every
/// value is a bind parameter.
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<(&'static str, Bound)>,
    touch_updated_at: bool,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            touch_updated_at: false,
        }
    }

    /// Add every whitelisted column present in `body`, in whitelist order.
    pub fn set_present(mut self, whitelist: &[Column], body: &Map<String, Value>) -> Result<Self, DatabaseError> {
        for column in whitelist {
            if let Some(value) = body.get(column.name) {
                self = self.set(*column, value)?;
            }
        }
        Ok(self)
    }

    pub fn set(mut self, column: Column, value: &Value) -> Result<Self, DatabaseError> {
        let bound = coerce(column, value)
            .ok_or_else(|| DatabaseError::InvalidValue(column.name.to_string()))?;
        self.assignments.push((column.name, bound));
        Ok(self)
    }

    /// Also set `updated_at = CURRENT_TIMESTAMP`; does not count as a field.
    pub fn touch_updated_at(mut self) -> Self {
        self.touch_updated_at = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(name, _)| *name).collect()
    }

    /// Render the statement. Callers may append `RETURNING ...`.
    pub fn build(self, id: i32) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", self.table));

        let mut set = qb.separated(", ");
        for (name, bound) in self.assignments {
            set.push(format!("{} = ", name));
            match bound {
                Bound::Text(v) => set.push_bind_unseparated(v),
                Bound::Integer(v) => set.push_bind_unseparated(v),
                Bound::Numeric(v) => set.push_bind_unseparated(v),
            };
        }
        if self.touch_updated_at {
            set.push("updated_at = CURRENT_TIMESTAMP");
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb
    }
}

fn coerce(column: Column, value: &Value) -> Option<Bound> {
    if value.is_null() {
        if !column.nullable {
            return None;
        }
        return Some(match column.kind {
            ColumnKind::Text => Bound::Text(None),
            ColumnKind::Integer => Bound::Integer(None),
            ColumnKind::Numeric => Bound::Numeric(None),
        });
    }

    match column.kind {
        ColumnKind::Text => match value {
            Value::String(s) => Some(Bound::Text(Some(s.clone()))),
            Value::Number(n) => Some(Bound::Text(Some(n.to_string()))),
            _ => None,
        },
        ColumnKind::Integer => match value {
            Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        }
        .map(|i| Bound::Integer(Some(i))),
        ColumnKind::Numeric => match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .map(|f| Bound::Numeric(Some(f))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WHITELIST: [Column; 3] = [Column::text("name"), Column::text("description"), Column::integer("release_year")];

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn only_whitelisted_present_columns_are_set() {
        let update = UpdateBuilder::new("teams")
            .set_present(&WHITELIST, &body(json!({"description": "d", "id": 9, "name": "n", "slug": "x"})))
            .unwrap();
        assert_eq!(update.columns(), vec!["name", "description"]);

        let qb = update.build(7);
        assert_eq!(qb.sql(), "UPDATE teams SET name = $1, description = $2 WHERE id = $3");
    }

    #[test]
    fn updated_at_is_appended_without_a_bind() {
        let qb = UpdateBuilder::new("user_uploads")
            .set_present(&WHITELIST, &body(json!({"release_year": 2021})))
            .unwrap()
            .touch_updated_at()
            .build(1);
        assert_eq!(
            qb.sql(),
            "UPDATE user_uploads SET release_year = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2"
        );
    }

    #[test]
    fn empty_update_is_detectable() {
        let update = UpdateBuilder::new("teams").set_present(&WHITELIST, &body(json!({"slug": "x"}))).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn values_are_type_checked() {
        let err = UpdateBuilder::new("teams")
            .set_present(&WHITELIST, &body(json!({"name": null})))
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidValue(ref c) if c == "name"));

        assert!(UpdateBuilder::new("t").set(Column::integer("release_year"), &json!("abc")).is_err());
        assert!(UpdateBuilder::new("t").set(Column::integer("release_year"), &json!(null)).is_ok());
        assert!(UpdateBuilder::new("t").set(Column::numeric("rating"), &json!("9.5")).is_ok());
        assert!(UpdateBuilder::new("t").set(Column::text("status"), &json!({"nested": true})).is_err());
    }
}
