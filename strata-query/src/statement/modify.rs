//! Assignments and the terminal operations of modifying statements.

use smol_str::SmolStr;
use tracing::debug;

use super::{Kind, Modify, Statement, StatementKind};
use crate::argument::Argument;
use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::expression::Expression;
use crate::path::PropertyResolver;
use crate::value::{SqlType, Value};

/// The right-hand side of a `SET path = ...`.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// A literal.
    Value(Value),
    /// The current value of another property of the same row.
    Path(SmolStr),
    /// The truth value of a predicate over the row.
    Expression(Expression),
}

impl Assignment {
    /// Build an assignment from an argument: its path if it has one, its
    /// literal otherwise.
    pub fn from_argument<V: SqlType>(argument: &Argument<V>) -> Self {
        match argument.value_path() {
            Some(path) => Self::Path(SmolStr::new(path.name())),
            None => Self::Value(argument.value().map_or(Value::Null, SqlType::to_value)),
        }
    }

    /// The value this assignment produces for `row`.
    pub fn resolve(&self, row: &dyn PropertyResolver) -> QueryResult<Value> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Path(path) => row.resolve(path),
            Self::Expression(expression) => expression.evaluate_with(row).map(Value::Bool),
        }
    }
}

impl From<Value> for Assignment {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Expression> for Assignment {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

impl<E: Entity, D, K: Kind> Statement<E, D, K> {
    /// Insert and Update need at least one assignment to mean anything, and
    /// every Insert value must resolve from the prototype.
    fn check_assignments(&self) -> QueryResult<()> {
        let needs_assignments = matches!(K::KIND, StatementKind::Insert | StatementKind::Update);
        if needs_assignments && self.assignments.is_empty() {
            return Err(QueryError::empty_assignment(self.table(), K::KIND.as_sql()));
        }
        if K::KIND == StatementKind::Insert {
            for assignment in self.assignments.values() {
                assignment.resolve(&self.prototype)?;
            }
        }
        Ok(())
    }
}

impl<E: Entity, D: Dialect, K: Modify> Statement<E, D, K> {
    /// Run the statement and return the number of affected rows.
    pub async fn execute(self) -> QueryResult<u64> {
        self.check_assignments()?;
        debug!(table = %self.table(), kind = %K::KIND, "Executing statement");
        let affected = self.dialect.execute(&self).await?;
        debug!(table = %self.table(), affected, "Statement executed");
        Ok(affected)
    }

    /// Run the statement and return the affected rows as they are after it
    /// ran (for Delete: as they were before removal).
    pub async fn execute_returning(self) -> QueryResult<Vec<E>> {
        self.check_assignments()?;
        debug!(table = %self.table(), kind = %K::KIND, "Executing statement with RETURNING");
        let rows = self.dialect.execute_returning(&self).await?;
        debug!(table = %self.table(), affected = rows.len(), "Statement executed");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PropertyPath;

    struct Row;

    impl PropertyResolver for Row {
        fn resolve(&self, path: &str) -> QueryResult<Value> {
            match path {
                "age" => Ok(Value::Int(40)),
                _ => Err(QueryError::unresolved_path(path, "unknown")),
            }
        }
    }

    #[test]
    fn test_assignment_from_argument() {
        assert_eq!(
            Assignment::from_argument(&Argument::literal(3_i64)),
            Assignment::Value(Value::Int(3))
        );
        assert_eq!(
            Assignment::from_argument(&Argument::<String>::null()),
            Assignment::Value(Value::Null)
        );
        assert_eq!(
            Assignment::from_argument(&Argument::of(PropertyPath::<i64>::new("age"))),
            Assignment::Path("age".into())
        );
    }

    #[test]
    fn test_assignment_resolve() {
        assert_eq!(Assignment::Path("age".into()).resolve(&Row).unwrap(), Value::Int(40));

        let adult = Argument::of(PropertyPath::<i64>::new("age")).geq(18);
        assert_eq!(Assignment::from(adult).resolve(&Row).unwrap(), Value::Bool(true));

        assert!(Assignment::Path("name".into()).resolve(&Row).is_err());
    }
}
