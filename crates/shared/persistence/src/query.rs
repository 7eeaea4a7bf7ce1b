//! Declarative query derivation.
//!
//! A `QuerySpec` lists `(column, operator)` criteria joined with AND, plus
//! ordering keys and hints. Arguments are bound positionally in criterion
//! order when the query runs.

use sea_orm::{
    ColumnTrait, Condition, DbBackend, EntityTrait, IdenStatic, QueryFilter, QueryOrder,
    QuerySelect, Select, Value,
};

use common::{AppError, AppResult};

use crate::page::Direction;
use crate::statement::NativeQuery;

/// Comparison applied to one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Number of arguments consumed
    pub fn arity(self) -> usize {
        match self {
            Operator::IsNull | Operator::IsNotNull => 0,
            _ => 1,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Operator::Equals => "",
            Operator::NotEquals => "Not",
            Operator::GreaterThan => "GreaterThan",
            Operator::GreaterThanEqual => "GreaterThanEqual",
            Operator::LessThan => "LessThan",
            Operator::LessThanEqual => "LessThanEqual",
            Operator::In => "In",
            Operator::IsNull => "IsNull",
            Operator::IsNotNull => "IsNotNull",
        }
    }
}

/// Query argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    /// Collection argument of an `In` criterion
    List(Vec<Value>),
}

impl Arg {
    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    pub fn list<V, I>(values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Arg::List(values.into_iter().map(Into::into).collect())
    }
}

/// Row lock taken by a query, held until the unit of work ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// `FOR SHARE`
    PessimisticRead,
    /// `FOR UPDATE`
    PessimisticWrite,
}

/// Result of a singular query with an explicit absent marker.
///
/// Distinct from the `Option` returned by nullable finders so both
/// contracts stay visible in repository signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Optional<T> {
    Present(T),
    Empty,
}

impl<T> Optional<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Optional::Present(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Optional::Empty)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Optional::Present(value) => Some(value),
            Optional::Empty => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Optional::Present(value) => Some(value),
            Optional::Empty => None,
        }
    }

    pub fn ok_or_not_found(self) -> AppResult<T> {
        self.into_option().ok_or(AppError::NotFound)
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Optional::Present(value),
            None => Optional::Empty,
        }
    }
}

/// How a paged query counts its total.
pub enum CountQuery<E: EntityTrait> {
    /// The query's own criteria, without ordering
    Derived,
    /// A separate, usually cheaper, select
    Select(Select<E>),
    /// A native `SELECT COUNT(...)`
    Native(NativeQuery),
}

/// Declarative finder over entity `E`.
#[derive(Debug, Clone)]
pub struct QuerySpec<E: EntityTrait> {
    criteria: Vec<(E::Column, Operator)>,
    orders: Vec<(E::Column, Direction)>,
    lock: Option<LockMode>,
    read_only: bool,
}

impl<E: EntityTrait> QuerySpec<E> {
    /// Every row
    pub fn find_all() -> Self {
        Self {
            criteria: Vec::new(),
            orders: Vec::new(),
            lock: None,
            read_only: false,
        }
    }

    /// Rows where `column` satisfies `operator`
    pub fn find_by(column: E::Column, operator: Operator) -> Self {
        Self::find_all().and(column, operator)
    }

    pub fn and(mut self, column: E::Column, operator: Operator) -> Self {
        self.criteria.push((column, operator));
        self
    }

    pub fn order_by(mut self, column: E::Column, direction: Direction) -> Self {
        self.orders.push((column, direction));
        self
    }

    /// Load results without a snapshot; they are never written back
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn lock(mut self, mode: LockMode) -> Self {
        self.lock = Some(mode);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn lock_mode(&self) -> Option<LockMode> {
        self.lock
    }

    /// Number of arguments the query expects
    pub fn arity(&self) -> usize {
        self.criteria.iter().map(|(_, operator)| operator.arity()).sum()
    }

    /// Finder-method style name, e.g. `findByUsernameAndAgeGreaterThan`
    pub fn describe(&self) -> String {
        let mut name = if self.criteria.is_empty() {
            String::from("findAll")
        } else {
            let criteria: Vec<String> = self
                .criteria
                .iter()
                .map(|(column, operator)| format!("{}{}", camel_case(column.as_str()), operator.keyword()))
                .collect();
            format!("findBy{}", criteria.join("And"))
        };

        if !self.orders.is_empty() {
            name.push_str("OrderBy");
            for (column, direction) in &self.orders {
                name.push_str(&camel_case(column.as_str()));
                name.push_str(if direction.is_descending() { "Desc" } else { "Asc" });
            }
        }
        name
    }

    /// Criteria only: no ordering, no lock
    pub fn to_filter(&self, args: &[Arg]) -> AppResult<Select<E>> {
        if args.len() != self.arity() {
            return Err(AppError::invalid_query(format!(
                "{} expects {} argument(s), got {}",
                self.describe(),
                self.arity(),
                args.len()
            )));
        }

        let mut args = args.iter();
        let mut condition = Condition::all();
        for (column, operator) in &self.criteria {
            let expr = match operator {
                Operator::Equals => column.eq(next_value(&mut args, column)?),
                Operator::NotEquals => column.ne(next_value(&mut args, column)?),
                Operator::GreaterThan => column.gt(next_value(&mut args, column)?),
                Operator::GreaterThanEqual => column.gte(next_value(&mut args, column)?),
                Operator::LessThan => column.lt(next_value(&mut args, column)?),
                Operator::LessThanEqual => column.lte(next_value(&mut args, column)?),
                Operator::In => column.is_in(next_list(&mut args, column)?),
                Operator::IsNull => column.is_null(),
                Operator::IsNotNull => column.is_not_null(),
            };
            condition = condition.add(expr);
        }

        Ok(E::find().filter(condition))
    }

    /// Full select for `backend`: criteria, ordering and lock.
    ///
    /// SQLite has no row locks; the lock clause is left out there.
    pub fn to_select(&self, args: &[Arg], backend: DbBackend) -> AppResult<Select<E>> {
        let mut select = self.to_filter(args)?;
        for (column, direction) in &self.orders {
            select = select.order_by(*column, (*direction).into());
        }

        if backend != DbBackend::Sqlite {
            select = match self.lock {
                Some(LockMode::PessimisticWrite) => select.lock_exclusive(),
                Some(LockMode::PessimisticRead) => select.lock_shared(),
                None => select,
            };
        }
        Ok(select)
    }
}

fn next_value<'a, C: IdenStatic>(args: &mut impl Iterator<Item = &'a Arg>, column: &C) -> AppResult<Value> {
    match args.next() {
        Some(Arg::Value(value)) => Ok(value.clone()),
        _ => Err(AppError::invalid_query(format!(
            "Expected a single value for '{}'",
            column.as_str()
        ))),
    }
}

fn next_list<'a, C: IdenStatic>(args: &mut impl Iterator<Item = &'a Arg>, column: &C) -> AppResult<Vec<Value>> {
    match args.next() {
        Some(Arg::List(values)) => Ok(values.clone()),
        _ => Err(AppError::invalid_query(format!(
            "Expected a collection for '{}'",
            column.as_str()
        ))),
    }
}

/// `team_id` -> `TeamId`
fn camel_case(column: &str) -> String {
    column
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
