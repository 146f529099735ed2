pub mod org_unit;
pub mod principal;
pub mod principal_role;
pub mod role;
pub mod scope_tree_version;
