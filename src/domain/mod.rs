//! Domain layer - coordinates, versions and the resolved graph model

pub mod coordinate;
pub mod graph;
pub mod version;

pub use coordinate::{
    repository_hint, split_dependency_key, validate_name, CoordinateError, Ecosystem,
    PackageCoordinate,
};
pub use graph::{ResolvedGraph, VisitKey, VisitedSet, ROOT_PARENT};
pub use version::normalize_requirement;
