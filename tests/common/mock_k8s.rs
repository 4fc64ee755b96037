use std::{collections::HashMap, sync::Mutex};

use anyhow::{Result, anyhow, bail};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::api::{ApiResource, DynamicObject};

use kubegone::clients::{ApiError, K8sClients};

/// Canned response for listing one resource type
#[derive(Clone)]
pub enum Listing {
  Items(Vec<DynamicObject>),
  NotFound,
  MethodNotSupported,
  Forbidden,
  Error,
}

/// Mock K8s client for testing
///
/// Listings are keyed by `<apiVersion>/<plural>`; resource types without a listing have no objects
#[derive(Default)]
pub struct MockK8sClients {
  pub api_resources: Vec<APIResourceList>,
  pub listings: HashMap<String, Listing>,
  pub listed: Mutex<Vec<String>>,
}

impl MockK8sClients {
  pub fn with_listing(mut self, key: &str, listing: Listing) -> Self {
    self.listings.insert(key.to_string(), listing);
    self
  }

  /// Keys of every list call made so far, in order
  pub fn listed(&self) -> Vec<String> {
    self.listed.lock().unwrap().clone()
  }
}

impl K8sClients for MockK8sClients {
  async fn get_api_resources(&self) -> Result<Vec<APIResourceList>> {
    Ok(self.api_resources.clone())
  }

  async fn list_objects(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, ApiError> {
    let key = format!("{}/{}", resource.api_version, resource.plural);
    self.listed.lock().unwrap().push(key.clone());

    match self.listings.get(&key) {
      None => Ok(Vec::new()),
      Some(Listing::Items(items)) => Ok(items.clone()),
      Some(Listing::NotFound) => Err(ApiError::NotFound),
      Some(Listing::MethodNotSupported) => Err(ApiError::MethodNotSupported),
      Some(Listing::Forbidden) => Err(ApiError::Forbidden(format!("cannot list {key}"))),
      Some(Listing::Error) => Err(ApiError::Other(anyhow!("mock K8s error"))),
    }
  }
}

/// Mock whose discovery call fails
pub struct MockK8sClientsError;

impl K8sClients for MockK8sClientsError {
  async fn get_api_resources(&self) -> Result<Vec<APIResourceList>> {
    bail!("mock K8s error")
  }

  async fn list_objects(&self, _resource: &ApiResource) -> Result<Vec<DynamicObject>, ApiError> {
    Err(ApiError::Other(anyhow!("mock K8s error")))
  }
}
