use futures_util::{FutureExt, future::BoxFuture};
use reqwest::{Client, Url};
use spot_game_core::{DetectionError, Detector, api::Detection};

/// A vision service reached over HTTP.
///
/// `GET {base_url}/detections?camera=<name>` must answer with a JSON array of
/// `{"class_name": .., "confidence": ..}` objects.
pub struct HttpDetector {
    client: Client,
    base_url: String,
}

impl HttpDetector {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn detections_url(&self, camera_name: &str) -> Result<Url, DetectionError> {
        let endpoint = format!("{}/detections", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, &[("camera", camera_name)])
            .map_err(|error| DetectionError::Request(error.to_string()))
    }
}

impl Detector for HttpDetector {
    fn detections_from_camera<'a>(
        &'a self,
        camera_name: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Detection>, DetectionError>> {
        async move {
            let url = self.detections_url(camera_name)?;
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|error| DetectionError::Request(error.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(DetectionError::Status(status.as_u16()));
            }

            response
                .json::<Vec<Detection>>()
                .await
                .map_err(|error| DetectionError::Decode(error.to_string()))
        }
        .boxed()
    }
}
