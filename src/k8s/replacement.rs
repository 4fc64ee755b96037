use std::collections::HashSet;

use anyhow::Result;
use kube::api::DynamicObject;
use tracing::debug;

use crate::{
  clients::K8sClients,
  k8s::resources::{self, GroupResourceKind},
};

/// Returns the replacement of a removed API that was moved rather than dropped
///
/// The API server may still answer on the old path with the objects stored under the new one,
/// which would otherwise be reported as deleted
pub fn lookup(key: &str) -> Option<GroupResourceKind> {
  match key {
    "extensions/v1beta1/Ingress" => Some(GroupResourceKind::new("networking.k8s.io/v1", "ingresses", "Ingress")),
    _ => None,
  }
}

/// Removes the items that are also served under the replacement API
pub async fn resolve<K: K8sClients>(
  client: &K,
  old_items: Vec<DynamicObject>,
  replacement: &GroupResourceKind,
) -> Result<Vec<DynamicObject>> {
  let (_, new_items) = resources::list_resources(client, replacement).await?;
  let before = old_items.len();
  let remaining = filter_moved(old_items, &new_items);
  debug!(
    "Dropped {} items also served by {}",
    before - remaining.len(),
    replacement.key()
  );

  Ok(remaining)
}

/// Keeps the old items whose UID does not appear among the new items
///
/// Items without a UID cannot be matched and are kept
pub fn filter_moved(old_items: Vec<DynamicObject>, new_items: &[DynamicObject]) -> Vec<DynamicObject> {
  let moved: HashSet<&str> = new_items.iter().filter_map(|i| i.metadata.uid.as_deref()).collect();

  old_items
    .into_iter()
    .filter(|i| match i.metadata.uid.as_deref() {
      Some(uid) => !moved.contains(uid),
      None => true,
    })
    .collect()
}
