use std::collections::BTreeSet;

use anyhow::Result;
use k8s_openapi::{
  Resource,
  apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
  apimachinery::pkg::apis::meta::v1::APIResourceList,
  kube_aggregator::pkg::apis::apiregistration::v1::APIService,
};
use kube::{api::DynamicObject, core::GroupVersion};
use serde_json::Value;
use tracing::debug;

use crate::{
  clients::{ApiError, K8sClients},
  k8s::resources::GroupResourceKind,
};

/// API groups that are registered dynamically and therefore never scanned
///
/// Groups declared by CustomResourceDefinitions or served by aggregated APIServices can
/// legitimately appear and disappear as they are installed and removed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IgnoreSet {
  groups: BTreeSet<String>,
}

impl IgnoreSet {
  pub fn contains(&self, group: &str) -> bool {
    self.groups.contains(group)
  }

  pub fn len(&self) -> usize {
    self.groups.len()
  }

  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.groups.iter().map(String::as_str)
  }
}

impl<S: Into<String>> FromIterator<S> for IgnoreSet {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      groups: iter.into_iter().map(Into::into).collect(),
    }
  }
}

/// Builds the ignore set from the CRDs and APIServices currently in the cluster
///
/// Every served version of the CRD and API registration groups is scanned; `extra` groups
/// (from configuration) are merged in as well
pub async fn build<K: K8sClients>(client: &K, served: &[APIResourceList], extra: &[String]) -> Result<IgnoreSet> {
  let mut crd_groups = BTreeSet::new();
  let mut apiservice_groups = BTreeSet::new();

  for list in served {
    let gv: GroupVersion = list.group_version.parse()?;

    if gv.group == CustomResourceDefinition::GROUP {
      debug!("Populating CRD groups of version {}", gv.version);
      let grk = GroupResourceKind::new(
        &list.group_version,
        CustomResourceDefinition::URL_PATH_SEGMENT,
        CustomResourceDefinition::KIND,
      );
      let items = list_registrations(client, &grk).await?;
      crd_groups.extend(crd_groups_of(&items));
    }

    if gv.group == APIService::GROUP {
      debug!("Populating APIService groups of version {}", gv.version);
      let grk = GroupResourceKind::new(&list.group_version, APIService::URL_PATH_SEGMENT, APIService::KIND);
      let items = list_registrations(client, &grk).await?;
      apiservice_groups.extend(apiservice_groups_of(&items));
    }
  }

  let groups: BTreeSet<String> = crd_groups
    .union(&apiservice_groups)
    .cloned()
    .chain(extra.iter().cloned())
    .collect();
  debug!("Ignoring {} API groups", groups.len());

  Ok(IgnoreSet { groups })
}

/// Lists CRDs or APIServices of one version
///
/// Only "not found" is empty, since older clusters may not serve the version. Unlike regular
/// resource listing, a missing list verb is fatal: the ignore set would be incomplete.
async fn list_registrations<K: K8sClients>(client: &K, grk: &GroupResourceKind) -> Result<Vec<DynamicObject>> {
  let resource = grk.api_resource()?;

  match client.list_objects(&resource).await {
    Ok(items) => Ok(items),
    Err(ApiError::NotFound) => Ok(Vec::new()),
    Err(ApiError::MethodNotSupported) => {
      anyhow::bail!("Failed to list {} in {}: list method not supported", grk.name, grk.group_version)
    }
    Err(ApiError::Forbidden(msg)) => anyhow::bail!(
      "Failed to list {} in {}. Permission denied! Please check if you have the proper authorization: {msg}",
      grk.name,
      grk.group_version
    ),
    Err(ApiError::Other(err)) => Err(err.context(format!(
      "Failed to connect to the cluster to list {} in {}",
      grk.name, grk.group_version
    ))),
  }
}

/// Groups declared by CustomResourceDefinitions (`spec.group`)
pub fn crd_groups_of(items: &[DynamicObject]) -> BTreeSet<String> {
  items
    .iter()
    .filter_map(|crd| nested_str(&crd.data, &["spec", "group"]))
    .map(str::to_owned)
    .collect()
}

/// Groups served by APIServices that are backed by an external service
///
/// An APIService without `spec.service.name` is a local, built-in API and is not ignored
pub fn apiservice_groups_of(items: &[DynamicObject]) -> BTreeSet<String> {
  items
    .iter()
    .filter_map(|svc| {
      nested_str(&svc.data, &["spec", "service", "name"])?;
      nested_str(&svc.data, &["spec", "group"])
    })
    .map(str::to_owned)
    .collect()
}

fn nested_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
  path.iter().try_fold(value, |v, field| v.get(field))?.as_str()
}
