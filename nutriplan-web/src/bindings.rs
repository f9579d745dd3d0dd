//! JavaScript surface of the planner. The page script renders whatever these
//! methods return and forwards every click as a [`PlannerEvent`].

use js_sys::Promise;
use nutriplan_core::{IngestionReport, PlannerConfig, PlannerEngine, PlannerEvent};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};

use crate::catalog::load_embedded_catalog;
use crate::controller::dispatch;
use crate::storage::LocalStorageBackend;
use crate::{dom, notices, shared};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn random_seed() -> u64 {
    let high = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    let low = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    (high << 32) | low
}

#[wasm_bindgen]
pub struct WebPlanner {
    engine: PlannerEngine<LocalStorageBackend>,
    config: PlannerConfig,
    report: IngestionReport,
}

#[wasm_bindgen]
impl WebPlanner {
    /// Load the bundled catalog and resume the stored plan.
    ///
    /// `config_json` may be `undefined` for the default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebPlanner, JsValue> {
        let config = match config_json {
            Some(json) => PlannerConfig::from_json(&json)
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => PlannerConfig::default(),
        };
        config
            .validate()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let (catalog, report) = load_embedded_catalog().map_err(|err| {
            dom::console_error(&format!("{err:#}"));
            JsValue::from_str(notices::CATALOG_FAILED)
        })?;
        if let Some(message) = report.user_message() {
            dom::console_warn(&message);
        }

        let storage = LocalStorageBackend::new(config.storage_key.clone());
        let engine = PlannerEngine::resume(storage, catalog, random_seed());
        log::info!("planner ready ({:?})", engine.origin());
        Ok(Self {
            engine,
            config,
            report,
        })
    }

    /// Current [`nutriplan_core::PlannerView`] as a plain object.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.view())
    }

    /// Apply an event such as `{ "type": "chooseDays", "value": 3 }` and
    /// return the resulting [`crate::controller::DispatchResult`].
    pub fn dispatch(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let event: PlannerEvent = serde_wasm_bindgen::from_value(event)?;
        let result = dispatch(&mut self.engine, event);
        if !result.saved {
            dom::console_warn(notices::SAVE_FAILED);
        }
        to_js(&result)
    }

    /// Start over with a freshly shuffled pool after the user confirms.
    /// Returns whether the plan was reset.
    pub fn restart(&mut self) -> Result<bool, JsValue> {
        if !dom::confirm(notices::RESTART_CONFIRM)? {
            return Ok(false);
        }
        let response = self.engine.restart(random_seed());
        if let Some(message) = notices::for_persistence(&response.persistence) {
            dom::console_warn(message);
        }
        Ok(true)
    }

    #[wasm_bindgen(js_name = summaryText)]
    pub fn summary_text(&self) -> String {
        self.engine.summary_text()
    }

    #[wasm_bindgen(js_name = shareUrl)]
    pub fn share_url(&self) -> Result<String, JsValue> {
        let base = dom::page_base_url()?;
        self.engine
            .share_url(&base, &self.config.share_prefix)
            .map_err(|err| JsValue::from_str(notices::for_error(&err)))
    }

    /// Copy the plain-text summary; resolves to the message to show.
    #[wasm_bindgen(js_name = copySummary)]
    pub fn copy_summary(&self) -> Result<Promise, JsValue> {
        let copy = dom::write_clipboard(&self.engine.summary_text())?;
        Ok(settle_with(
            copy,
            notices::SUMMARY_COPIED,
            notices::SUMMARY_COPY_FAILED,
        ))
    }

    /// Copy the share link; resolves to the message to show.
    #[wasm_bindgen(js_name = copyShareLink)]
    pub fn copy_share_link(&self) -> Result<Promise, JsValue> {
        let url = match self.share_url() {
            Ok(url) => url,
            Err(_) => return Ok(Promise::resolve(&notices::LINK_COPY_FAILED.into())),
        };
        let copy = dom::write_clipboard(&url)?;
        Ok(settle_with(copy, notices::LINK_COPIED, notices::LINK_COPY_FAILED))
    }

    /// Notice listing menu documents that failed to load, if any.
    #[wasm_bindgen(js_name = ingestionNotice)]
    pub fn ingestion_notice(&self) -> Option<String> {
        self.report.user_message()
    }

    /// Summary shared through the current location hash, or `null`.
    #[wasm_bindgen(js_name = sharedSummary)]
    pub fn shared_summary(&self) -> Result<JsValue, JsValue> {
        shared_summary_for(&self.config.share_prefix)
    }
}

/// Summary shared through the current location hash, using the default
/// share prefix. Usable before a planner exists.
#[wasm_bindgen(js_name = sharedSummary)]
pub fn shared_summary() -> Result<JsValue, JsValue> {
    shared_summary_for(&PlannerConfig::default().share_prefix)
}

fn shared_summary_for(prefix: &str) -> Result<JsValue, JsValue> {
    let hash = dom::location_hash()?;
    match shared::summary_from_hash(&hash, prefix) {
        Ok(Some(summary)) => to_js(&summary),
        Ok(None) => Ok(JsValue::NULL),
        Err(err) => {
            dom::console_error(&err.to_string());
            Err(JsValue::from_str(notices::for_error(&err)))
        }
    }
}

fn settle_with(copy: Promise, ok: &'static str, failed: &'static str) -> Promise {
    future_to_promise(async move {
        match JsFuture::from(copy).await {
            Ok(_) => Ok(JsValue::from_str(ok)),
            Err(err) => {
                dom::console_error(&dom::js_error_message(&err));
                Ok(JsValue::from_str(failed))
            }
        }
    })
}
