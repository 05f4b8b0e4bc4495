use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Text(String),
    BigInt(i64),
    Instant(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// SQL fragment followed by a bound parameter, e.g. `status = ` + `$1`.
    Bound { sql: &'static str, arg: Bind },
    /// Fragment with no parameter, e.g. `e.date_and_time > NOW()`.
    Raw(&'static str),
}

/// Ordered conjunction of predicates. Placeholders are numbered in push order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicates(Vec<Predicate>);

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(&mut self, sql: &'static str, arg: Bind) -> &mut Self {
        self.0.push(Predicate::Bound { sql, arg });
        self
    }

    pub fn raw(&mut self, sql: &'static str) -> &mut Self {
        self.0.push(Predicate::Raw(sql));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.0.iter()
    }

    /// Appends ` WHERE p1 AND p2 ...` to the builder. Does nothing when empty.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.0.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Bound { sql, arg } => {
                    qb.push(*sql);
                    match arg {
                        Bind::Text(value) => qb.push_bind(value.clone()),
                        Bind::BigInt(value) => qb.push_bind(*value),
                        Bind::Instant(value) => qb.push_bind(*value),
                    };
                }
                Predicate::Raw(sql) => {
                    qb.push(*sql);
                }
            }
        }
    }
}
