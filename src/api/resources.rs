//! Generic create/read/update/delete on top of the retry and pagination core

use log::debug;
use serde::Serialize;

use crate::api::client::{ApiRequest, DbtCloudClient};
use crate::api::envelope::decode_data;
use crate::api::traits::ApiResource;
use crate::api::validate::ValidationError;
use crate::error::{ApiError, Result};

/// Decode the `data` of a single-object response and check its identity
pub fn decode_resource<T: ApiResource>(body: &[u8]) -> Result<T> {
    let (data, raw): (Option<T>, _) = decode_data(body)?;
    let item = data.ok_or_else(|| ValidationError::new(T::RESOURCE_TYPE, T::ID_FIELD, &raw))?;
    item.check_identity(&raw)?;
    Ok(item)
}

/// Turn a plain not-found into `None`
///
/// Not-found with a permission hint stays an error: the object may still
/// exist, so callers must not treat it as gone.
pub fn absent_if_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(item) => Ok(Some(item)),
        Err(ApiError::NotFound {
            permission_hint: false,
            ..
        }) => Ok(None),
        Err(e) => Err(e),
    }
}

impl DbtCloudClient {
    /// GET a single object
    pub async fn read_resource<T: ApiResource>(&self, url: &str) -> Result<T> {
        debug!("Reading {} from: {}", T::RESOURCE_TYPE, url);
        let body = self.execute(&ApiRequest::get(url)).await?;
        decode_resource(&body)
    }

    /// POST a new object and return what the API created
    pub async fn create_resource<T, B>(&self, url: &str, payload: &B) -> Result<T>
    where
        T: ApiResource,
        B: Serialize + ?Sized,
    {
        debug!("Creating {} at: {}", T::RESOURCE_TYPE, url);
        let body = self.execute(&ApiRequest::post(url, payload)?).await?;
        decode_resource(&body)
    }

    /// POST the full object to its own URL, the way dbt Cloud updates most objects
    pub async fn update_resource<T, B>(&self, url: &str, payload: &B) -> Result<T>
    where
        T: ApiResource,
        B: Serialize + ?Sized,
    {
        debug!("Updating {} at: {}", T::RESOURCE_TYPE, url);
        let body = self.execute(&ApiRequest::post(url, payload)?).await?;
        decode_resource(&body)
    }

    /// PATCH part of an object
    pub async fn patch_resource<T, B>(&self, url: &str, payload: &B) -> Result<T>
    where
        T: ApiResource,
        B: Serialize + ?Sized,
    {
        debug!("Patching {} at: {}", T::RESOURCE_TYPE, url);
        let body = self.execute(&ApiRequest::patch(url, payload)?).await?;
        decode_resource(&body)
    }

    /// DELETE an object; the response body is not inspected
    pub async fn delete_resource(&self, url: &str) -> Result<()> {
        debug!("Deleting: {}", url);
        self.execute(&ApiRequest::delete(url)).await?;
        Ok(())
    }

    /// List every object of a collection across all pages
    ///
    /// Each item has its identity checked against its own JSON.
    pub async fn list_resources<T: ApiResource>(&self, url: &str) -> Result<Vec<T>> {
        self.fetch_all(url)
            .await?
            .into_iter()
            .enumerate()
            .map(|(index, raw)| -> Result<T> {
                let item: T = serde_json::from_value(raw.clone()).map_err(|e| {
                    ApiError::Json(format!(
                        "failed to decode {} {} from {}: {}",
                        T::RESOURCE_TYPE,
                        index,
                        url,
                        e
                    ))
                })?;
                item.check_identity(&raw)?;
                Ok(item)
            })
            .collect()
    }
}
