use anyhow::Result;
use kube::{api::DynamicObject, core::GroupVersion};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
  catalog::KnownApis,
  clients::K8sClients,
  k8s::{self, GroupResourceKind, replacement},
};

/// Resource type served by the cluster that is missing from the known API catalog
/// but still has live objects
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedApi {
  pub group: String,
  pub version: String,
  /// Plural resource name
  pub name: String,
  pub kind: String,
  pub deleted: bool,
  #[serde(rename = "deleted_items")]
  pub items: Vec<DeletedItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
  Namespaced,
  Cluster,
}

impl std::fmt::Display for Scope {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match *self {
      Scope::Namespaced => write!(f, "Namespaced"),
      Scope::Cluster => write!(f, "Cluster"),
    }
  }
}

/// Live object found under a deleted API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedItem {
  pub scope: Scope,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub namespace: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub uid: Option<String>,
}

impl From<&DynamicObject> for DeletedItem {
  fn from(obj: &DynamicObject) -> Self {
    let namespace = obj.metadata.namespace.clone();
    Self {
      scope: match namespace {
        Some(_) => Scope::Namespaced,
        None => Scope::Cluster,
      },
      name: obj.metadata.name.clone().unwrap_or_default(),
      namespace,
      uid: obj.metadata.uid.clone(),
    }
  }
}

/// Walks every resource type served by the cluster and reports those whose
/// `<groupVersion>/<Kind>` is absent from the catalog yet still has live objects
///
/// Groups registered by CRDs or aggregated APIServices, and any `extra_ignored` groups, are
/// skipped. Results are not sorted by kind: API groups come in alphabetical order (as the
/// discovery client returns them), and resources keep the server order within each group/version.
/// Any listing failure other than "not found" or "method not supported" aborts the whole run.
pub async fn detect<K: K8sClients>(client: &K, catalog: &KnownApis, extra_ignored: &[String]) -> Result<Vec<DeletedApi>> {
  debug!("Getting all the server resources");
  let served = client.get_api_resources().await?;
  let ignored = k8s::ignore::build(client, &served, extra_ignored).await?;

  let mut deleted = Vec::new();
  debug!("Walking through {} resource types", served.len());

  for list in &served {
    let gv: GroupVersion = list.group_version.parse()?;
    if ignored.contains(&gv.group) {
      continue;
    }

    for resource in &list.resources {
      if resource.name.contains('/') {
        continue;
      }

      let grk = GroupResourceKind::new(&list.group_version, &resource.name, &resource.kind);
      let key = grk.key();
      if catalog.contains(&key) {
        continue;
      }

      let (api_resource, mut items) = k8s::list_resources(client, &grk).await?;
      if let Some(replacement) = replacement::lookup(&key) {
        items = replacement::resolve(client, items, &replacement).await?;
      }

      if items.is_empty() {
        continue;
      }

      debug!("Found {} deleted items in {key}", items.len());
      deleted.push(DeletedApi {
        group: api_resource.group,
        version: api_resource.version,
        name: resource.name.clone(),
        kind: resource.kind.clone(),
        deleted: true,
        items: items.iter().map(DeletedItem::from).collect(),
      });
    }
  }

  info!("Found {} deleted APIs", deleted.len());
  Ok(deleted)
}
