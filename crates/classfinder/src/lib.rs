#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Namespace-scoped type discovery for PHP projects.
//!
//! Given a namespace prefix, finds every class, interface, trait and enum the
//! project defines below it, including types nothing has loaded yet.
//!
//! # Architecture
//!
//! * [`source`]: where a project's prefix table and optional global index come from
//! * [`composer`]: a [`PackageIndexSource`] reading Composer manifests and generated autoload maps
//! * [`prefix`]: routes a namespace to the source roots that may define it
//! * [`scan`]: builds partial indexes from source roots when no global index exists
//! * [`registry`]: the set of materialized types, grown on demand
//! * [`resolver`]: ties the above together behind [`Resolver::get_classes`]
//!
//! # Example
//!
//! ```ignore
//! use classfinder::{LoadedType, Resolver};
//!
//! let mut resolver = Resolver::composer(".")?;
//! let models = resolver.get_classes("App\\Models\\", LoadedType::is_concrete, false)?;
//! ```

pub mod composer;
mod error;
pub mod index;
pub mod namespace;
pub mod php;
pub mod prefix;
pub mod registry;
pub mod resolver;
pub mod scan;
pub mod source;

pub use composer::ComposerProject;
pub use error::{Error, Result};
pub use index::TypeIndex;
pub use php::{Declaration, Modifiers, TypeKind};
pub use prefix::PrefixTable;
pub use registry::{LoadedType, ManifestRegistry, TypeRegistry};
pub use resolver::{Query, Resolver, ResolverBuilder};
#[cfg(feature = "scanner")]
pub use scan::ClassMapScanner;
pub use scan::DirectoryScanner;
pub use source::{PackageIndexSource, StaticSource};
