use anyhow::Result;
use async_trait::async_trait;
use http::header::{HeaderValue, ACCEPT};
use kube::{
    api::{GetParams, Request},
    Client,
};
use serde::de::DeserializeOwned;

use crate::logger;

fn remove_slash(path: &str) -> &str {
    if let Some(path) = path.strip_prefix('/') {
        path
    } else {
        path
    }
}

#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn as_client(&self) -> &Client {
        &self.client
    }

    pub fn to_client(&self) -> Client {
        self.client.clone()
    }

    fn get_request(&self, path: &str) -> Result<http::Request<Vec<u8>>> {
        let request = Request::new("");

        let mut request = request.get(remove_slash(path), &GetParams::default())?;

        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        logger!(debug, "HTTP request {:?}", request);

        Ok(request)
    }
}

/// API サーバーへの GET リクエストを抽象化する
/// テストでは mockall のモックに差し替える
#[async_trait]
pub trait KubeClientRequest: Send + Sync {
    async fn request<T: DeserializeOwned + 'static>(&self, path: &str) -> Result<T>;
}

#[async_trait]
impl KubeClientRequest for KubeClient {
    async fn request<T: DeserializeOwned + 'static>(&self, path: &str) -> Result<T> {
        let request = self.get_request(path)?;

        self.client.request(request).await.map_err(Into::into)
    }
}

#[cfg(test)]
pub mod mock {
    use super::{DeserializeOwned, KubeClientRequest, Result};
    use mockall::mock;

    mock! {
        pub TestKubeClient {}

        #[async_trait::async_trait]
        impl KubeClientRequest for TestKubeClient {
            async fn request<T: DeserializeOwned + 'static>(&self, path: &str) -> Result<T>;
        }
    }

    #[macro_export]
    macro_rules! mock_expect {
        ($client:ident, request, [$(($ty:ty, $with:expr, $ret:expr)),*]) => {
            $(
                $client.expect_request::<$ty>().with($with).returning(|_| $ret);
            )*
        };

        ($client:ident, request, $ty:ty, $with:expr, $ret:expr) => {
            $client.expect_request::<$ty>().with($with).returning(|_| $ret);
        };
    }
}
