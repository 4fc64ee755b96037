use anyhow::{Context, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use kube::{
  api::{Api, ApiResource, DynamicObject, ListParams},
  config::KubeConfigOptions,
  discovery::{Discovery, Scope},
};

/// Classified failure of a dynamic list call
///
/// Callers decide which of these are benign; the client only reports what the API server said
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("resource not found")]
  NotFound,
  #[error("list method not supported")]
  MethodNotSupported,
  #[error("forbidden: {0}")]
  Forbidden(String),
  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl From<kube::Error> for ApiError {
  fn from(err: kube::Error) -> Self {
    match &err {
      kube::Error::Api(resp) if resp.code == 404 => ApiError::NotFound,
      kube::Error::Api(resp) if resp.code == 405 => ApiError::MethodNotSupported,
      kube::Error::Api(resp) if resp.code == 403 => ApiError::Forbidden(resp.message.clone()),
      _ => ApiError::Other(err.into()),
    }
  }
}

/// Trait abstracting all Kubernetes API operations used by kubegone
pub trait K8sClients {
  /// Server preferred resources, one list per group/version
  fn get_api_resources(&self) -> impl std::future::Future<Output = Result<Vec<APIResourceList>>> + Send;
  /// All objects of the given resource type across all namespaces
  fn list_objects(
    &self,
    resource: &ApiResource,
  ) -> impl std::future::Future<Output = Result<Vec<DynamicObject>, ApiError>> + Send;
}

/// Real Kubernetes client implementation wrapping kube-rs
pub struct RealK8sClients {
  client: kube::Client,
}

impl RealK8sClients {
  pub async fn new(context: Option<&str>) -> Result<Self> {
    let config = match context {
      Some(context) => {
        let options = KubeConfigOptions {
          context: Some(context.to_owned()),
          ..Default::default()
        };
        kube::Config::from_kubeconfig(&options)
          .await
          .with_context(|| format!("Unable to load kubeconfig context {context}"))?
      }
      None => match kube::Config::infer().await {
        Ok(config) => config,
        Err(e) => {
          anyhow::bail!(
            "Unable to connect to cluster: {e}\n\n\
            Ensure kubeconfig file is present and updated to connect to the cluster."
          );
        }
      },
    };

    let client = kube::Client::try_from(config).context("Unable to create Kubernetes client")?;
    Ok(Self { client })
  }
}

impl K8sClients for RealK8sClients {
  async fn get_api_resources(&self) -> Result<Vec<APIResourceList>> {
    let discovery = match Discovery::new(self.client.clone()).run().await {
      Ok(discovery) => discovery,
      Err(kube::Error::Api(resp)) if resp.code == 403 => {
        anyhow::bail!("Failed to list server resources. Permission denied! Please check if you have the proper authorization")
      }
      Err(e) => {
        return Err(anyhow::Error::from(e).context("Failed communicating with the cluster while discovering server resources"));
      }
    };

    Ok(preferred_resource_lists(&discovery))
  }

  async fn list_objects(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, ApiError> {
    let api: Api<DynamicObject> = Api::all_with(self.client.clone(), resource);
    let list = api.list(&ListParams::default()).await?;

    Ok(list.items)
  }
}

/// Flattens discovery into one `APIResourceList` per group/version
///
/// Only the recommended resources of each group are kept, so a kind served by several versions
/// shows up once under the server preferred version. Subresources are reported as `parent/sub`.
/// Groups are ordered alphabetically; versions and resources keep the order the server reports.
fn preferred_resource_lists(discovery: &Discovery) -> Vec<APIResourceList> {
  let mut lists: Vec<APIResourceList> = Vec::new();

  for group in discovery.groups_alphabetical() {
    for (ar, caps) in group.recommended_resources() {
      let namespaced = matches!(caps.scope, Scope::Namespaced);
      let mut resources = vec![APIResource {
        name: ar.plural.clone(),
        kind: ar.kind.clone(),
        namespaced,
        verbs: caps.operations.clone(),
        ..Default::default()
      }];
      for (sub, sub_caps) in &caps.subresources {
        resources.push(APIResource {
          name: format!("{}/{}", ar.plural, sub.plural),
          kind: sub.kind.clone(),
          namespaced,
          verbs: sub_caps.operations.clone(),
          ..Default::default()
        });
      }

      match lists.iter_mut().find(|l| l.group_version == ar.api_version) {
        Some(list) => list.resources.extend(resources),
        None => lists.push(APIResourceList {
          group_version: ar.api_version.clone(),
          resources,
        }),
      }
    }
  }

  lists
}
