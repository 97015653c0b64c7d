//! Score submission over `fetch`

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::{ScorePayload, ScoreReport, ScoreSink};

/// Posts reports to the scoring backend without waiting for the response
pub struct HttpScoreSink {
    endpoint: String,
    user_id: u32,
}

impl HttpScoreSink {
    pub fn new(endpoint: impl Into<String>, user_id: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_id,
        }
    }
}

impl ScoreSink for HttpScoreSink {
    fn submit(&mut self, report: &ScoreReport) {
        let payload = ScorePayload::from_report(report, self.user_id);
        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Could not encode score: {}", e);
                return;
            }
        };
        let endpoint = self.endpoint.clone();

        wasm_bindgen_futures::spawn_local(async move {
            match post_json(&endpoint, &body).await {
                Ok(()) => log::info!("Score submitted"),
                Err(e) => log::warn!("Score submission failed: {:?}", e),
            }
        });
    }
}

async fn post_json(url: &str, body: &str) -> Result<(), JsValue> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;

    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    Ok(())
}
