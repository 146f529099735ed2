use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::cond::entity_scope_filter;
use crate::{DataScopedEntity, ScopeError};
use datascope_model::ScopeContext;

/// Typestate marker: query has not yet been scoped.
/// Cannot execute queries in this state.
#[derive(Debug, Clone, Copy)]
pub struct Unscoped;

/// Typestate marker: query has been scoped with the caller's data scope.
///
/// Carries the [`ScopeContext`] so it stays inspectable after scoping.
#[derive(Debug, Clone)]
pub struct Scoped {
    ctx: ScopeContext,
}

/// A type-safe wrapper around `SeaORM`'s `Select` that enforces data scoping.
///
/// Queries cannot be executed until `.scope_with()` has applied the
/// principal's effective scope.
///
/// # Example
/// ```rust,ignore
/// use datascope_db::SecureEntityExt;
///
/// let docs = document::Entity::find()
///     .secure()          // SecureSelect<E, Unscoped>
///     .scope_with(&ctx)  // SecureSelect<E, Scoped>
///     .all(&conn)        // now executable
///     .await?;
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct SecureSelect<E: EntityTrait, S> {
    inner: sea_orm::Select<E>,
    state: S,
}

/// Extension trait to convert a regular `SeaORM` `Select` into a `SecureSelect`.
pub trait SecureEntityExt<E: EntityTrait>: Sized {
    /// Convert this select query into a secure (unscoped) select.
    /// You must call `.scope_with()` before executing the query.
    fn secure(self) -> SecureSelect<E, Unscoped>;
}

impl<E> SecureEntityExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn secure(self) -> SecureSelect<E, Unscoped> {
        SecureSelect {
            inner: self,
            state: Unscoped,
        }
    }
}

impl<E> SecureSelect<E, Unscoped>
where
    E: DataScopedEntity,
    E::Column: ColumnTrait + Copy,
{
    /// Apply the data scope in `ctx`, transitioning to the `Scoped` state.
    pub fn scope_with(self, ctx: &ScopeContext) -> SecureSelect<E, Scoped> {
        let inner = match entity_scope_filter::<E>(ctx.scope(), ctx.principal_id()) {
            Some(cond) => self.inner.filter(cond),
            None => self.inner,
        };
        SecureSelect {
            inner,
            state: Scoped { ctx: ctx.clone() },
        }
    }
}

impl<E> SecureSelect<E, Scoped>
where
    E: EntityTrait,
{
    /// Execute the query and return all matching results.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn all<C>(self, conn: &C) -> Result<Vec<E::Model>, ScopeError>
    where
        C: ConnectionTrait,
    {
        Ok(self.inner.all(conn).await?)
    }

    /// Execute the query and return at most one result.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn one<C>(self, conn: &C) -> Result<Option<E::Model>, ScopeError>
    where
        C: ConnectionTrait,
    {
        Ok(self.inner.one(conn).await?)
    }

    /// Execute the query and return the number of matching results.
    ///
    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn count<C>(self, conn: &C) -> Result<u64, ScopeError>
    where
        C: ConnectionTrait,
        E::Model: FromQueryResult + Send + Sync,
    {
        Ok(self.inner.count(conn).await?)
    }

    /// Add additional filters to the scoped query.
    /// The scope conditions remain in place.
    pub fn filter(mut self, filter: sea_orm::Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    /// Add ordering to the scoped query.
    pub fn order_by<C>(mut self, col: C, order: sea_orm::Order) -> Self
    where
        C: sea_orm::IntoSimpleExpr,
    {
        self.inner = QueryOrder::order_by(self.inner, col, order);
        self
    }

    /// Add a limit to the scoped query.
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner = QuerySelect::limit(self.inner, limit);
        self
    }

    /// The context this query was scoped with.
    #[must_use]
    pub fn context(&self) -> &ScopeContext {
        &self.state.ctx
    }

    /// Unwrap the inner `SeaORM` `Select` for advanced use cases.
    ///
    /// The caller must not remove the conditions added by `.scope_with()`.
    #[must_use]
    pub fn into_inner(self) -> sea_orm::Select<E> {
        self.inner
    }
}
