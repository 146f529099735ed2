//! Domain layer for the data-scope engine.

pub mod calculator;
pub mod error;
pub mod hierarchy;
pub mod local_client;
pub mod model;
pub mod repo;
pub mod service;
pub mod unit_tree;

#[cfg(test)]
mod service_test;

pub use calculator::calculate;
pub use error::DomainError;
pub use hierarchy::HierarchyIndex;
pub use local_client::DataScopeLocalClient;
pub use model::{OrgUnit, Principal, Role};
pub use repo::{
    PrincipalRepository, RoleRepository, ScopeCacheStore, TreeChange, TreeVersionStore,
    UnitRepository, UnitTreeStore,
};
pub use service::{Directory, Service};
pub use unit_tree::UnitTreeService;
