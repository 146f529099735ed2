use sea_orm::EntityTrait;

/// Entities whose rows are filtered by a principal's effective data scope.
///
/// Each implementor names the two columns the predicate binder needs:
/// - `owner_col()`: the principal that created/owns the row
/// - `department_col()`: the organizational unit the row belongs to
///
/// # Example
/// ```rust,ignore
/// impl DataScopedEntity for document::Entity {
///     fn owner_col() -> Self::Column {
///         document::Column::CreatedBy
///     }
///     fn department_col() -> Self::Column {
///         document::Column::DeptId
///     }
/// }
/// ```
pub trait DataScopedEntity: EntityTrait {
    /// Column holding the owning principal id.
    fn owner_col() -> Self::Column;

    /// Column holding the organizational unit id.
    fn department_col() -> Self::Column;
}
