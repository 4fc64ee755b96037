use anyhow::{Context, Result};
use kube::{
  api::{ApiResource, DynamicObject, GroupVersionKind},
  core::GroupVersion,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::{ApiError, K8sClients};

/// Identifies one API resource type as reported by discovery
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResourceKind {
  /// `group/version`, or just `version` for the core group
  pub group_version: String,
  /// Plural resource name used in API paths
  pub name: String,
  pub kind: String,
}

impl GroupResourceKind {
  pub fn new(group_version: &str, name: &str, kind: &str) -> Self {
    Self {
      group_version: group_version.to_owned(),
      name: name.to_owned(),
      kind: kind.to_owned(),
    }
  }

  /// Lookup key used by the known API catalog and the replacement table
  pub fn key(&self) -> String {
    format!("{}/{}", self.group_version, self.kind)
  }

  pub fn api_resource(&self) -> Result<ApiResource> {
    let gv: GroupVersion = self
      .group_version
      .parse()
      .with_context(|| format!("Failed to parse group version of resource {}", self.group_version))?;
    let gvk = GroupVersionKind::gvk(&gv.group, &gv.version, &self.kind);

    Ok(ApiResource::from_gvk_with_plural(&gvk, &self.name))
  }
}

/// Returns all live objects of the given resource type
///
/// A resource that is not found, or that is advertised without a working list verb, yields an
/// empty list. Any other failure aborts since a partial scan could hide deleted APIs.
pub async fn list_resources<K: K8sClients>(client: &K, grk: &GroupResourceKind) -> Result<(ApiResource, Vec<DynamicObject>)> {
  let resource = grk.api_resource()?;

  match client.list_objects(&resource).await {
    Ok(items) => Ok((resource, items)),
    Err(ApiError::NotFound) | Err(ApiError::MethodNotSupported) => {
      debug!("No listable objects of type {}/{}", grk.group_version, grk.name);
      Ok((resource, Vec::new()))
    }
    Err(ApiError::Forbidden(msg)) => anyhow::bail!(
      "Failed to list objects of type {}/{}/{}. Permission denied! Please check if you have the proper authorization: {msg}",
      resource.group,
      resource.version,
      grk.kind
    ),
    Err(ApiError::Other(err)) => Err(err.context(format!(
      "Failed to list objects of type {}/{}/{}",
      resource.group, resource.version, grk.kind
    ))),
  }
}
