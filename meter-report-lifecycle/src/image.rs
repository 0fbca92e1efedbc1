use async_trait::async_trait;
use meter_report_api::ImageProcessor;

use crate::error::BoxError;

/// Image processor that stores photos as uploaded.
///
/// Deployments with a real encoder plug in their own [`ImageProcessor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughImageProcessor;

#[async_trait]
impl ImageProcessor for PassthroughImageProcessor {
    async fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>, BoxError> {
        Ok(bytes)
    }
}
