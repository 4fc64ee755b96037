use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use kube::{
  api::{ApiResource, DynamicObject, GroupVersionKind},
  core::GroupVersion,
};
use serde_json::json;

use super::mock_k8s::MockK8sClients;

/// Builds a discovery entry for one group/version with the given `(name, kind)` resources
pub fn served(group_version: &str, resources: &[(&str, &str)]) -> APIResourceList {
  APIResourceList {
    group_version: group_version.into(),
    resources: resources
      .iter()
      .map(|(name, kind)| APIResource {
        name: name.to_string(),
        kind: kind.to_string(),
        namespaced: true,
        verbs: vec!["get".into(), "list".into()],
        ..Default::default()
      })
      .collect(),
  }
}

/// Creates a live object of the given type
pub fn object(api_version: &str, kind: &str, namespace: Option<&str>, name: &str, uid: &str) -> DynamicObject {
  let gv: GroupVersion = api_version.parse().unwrap();
  let ar = ApiResource::from_gvk(&GroupVersionKind::gvk(&gv.group, &gv.version, kind));
  let mut obj = DynamicObject::new(name, &ar);
  obj.metadata.namespace = namespace.map(str::to_string);
  obj.metadata.uid = Some(uid.into());
  obj
}

/// Creates a CustomResourceDefinition declaring `group`
pub fn crd(name: &str, group: &str) -> DynamicObject {
  object(
    "apiextensions.k8s.io/v1",
    "CustomResourceDefinition",
    None,
    name,
    &format!("crd-{name}"),
  )
  .data(json!({ "spec": { "group": group, "scope": "Namespaced" } }))
}

/// Creates an APIService for `group`, optionally backed by an external service
pub fn apiservice(group: &str, service: Option<&str>) -> DynamicObject {
  let name = format!("v1.{group}");
  let spec = match service {
    Some(service) => json!({ "group": group, "version": "v1", "service": { "name": service, "namespace": "kube-system" } }),
    None => json!({ "group": group, "version": "v1" }),
  };

  object("apiregistration.k8s.io/v1", "APIService", None, &name, &format!("svc-{group}")).data(json!({ "spec": spec }))
}

/// A cluster serving the core, apps, batch, CRD and API registration groups with no objects
pub fn base_cluster() -> MockK8sClients {
  MockK8sClients {
    api_resources: vec![
      served("v1", &[("pods", "Pod"), ("pods/status", "Pod"), ("services", "Service")]),
      served("apps/v1", &[("deployments", "Deployment"), ("deployments/scale", "Scale")]),
      served("batch/v1", &[("jobs", "Job"), ("cronjobs", "CronJob")]),
      served("apiextensions.k8s.io/v1", &[("customresourcedefinitions", "CustomResourceDefinition")]),
      served("apiregistration.k8s.io/v1", &[("apiservices", "APIService")]),
    ],
    ..Default::default()
  }
}

/// Catalog that knows every kind served by `base_cluster`
pub fn base_catalog() -> Vec<&'static str> {
  vec![
    "v1/Pod",
    "v1/Service",
    "apps/v1/Deployment",
    "batch/v1/Job",
    "batch/v1/CronJob",
    "apiextensions.k8s.io/v1/CustomResourceDefinition",
    "apiregistration.k8s.io/v1/APIService",
  ]
}
