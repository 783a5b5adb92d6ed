use crossbeam_channel::Sender;

use crate::assets::SourceType;
use crate::scene::ImageData;

use super::model::ModelData;

/// Decoded payload of a resolved load request.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedPayload {
    Texture(ImageData),
    /// Faces in `+x, -x, +y, -y, +z, -z` order.
    CubeTexture(Vec<ImageData>),
    Model(ModelData),
}

impl LoadedPayload {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LoadedPayload::Texture(_) => "texture",
            LoadedPayload::CubeTexture(_) => "cube texture",
            LoadedPayload::Model(_) => "model",
        }
    }
}

/// One resource to fetch and decode.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub name: String,
    pub kind: SourceType,
    /// One url for single-file kinds, the ordered list for multi-file kinds.
    pub urls: Vec<String>,
}

impl LoadRequest {
    /// Url used in progress and error reports.
    pub fn display_url(&self) -> String {
        match self.urls.as_slice() {
            [single] => single.clone(),
            many => many.join(", "),
        }
    }
}

/// Outcome of one request, as delivered back to the pipeline.
#[derive(Debug)]
pub struct Completed {
    pub ticket: usize,
    pub url: String,
    pub result: Result<LoadedPayload, String>,
}

/// One-shot completion handle passed to a loader with each request.
///
/// It may be moved to and resolved from any thread. Dropping it without resolving
/// reports a failure so the pipeline can still settle.
#[derive(Debug)]
pub struct Completion {
    ticket: usize,
    url: String,
    tx: Option<Sender<Completed>>,
}

impl Completion {
    pub(crate) fn new(ticket: usize, url: String, tx: Sender<Completed>) -> Self {
        Self {
            ticket,
            url,
            tx: Some(tx),
        }
    }

    pub fn resolve(mut self, payload: LoadedPayload) {
        self.send(Ok(payload));
    }

    pub fn fail(mut self, reason: impl Into<String>) {
        self.send(Err(reason.into()));
    }

    /// Fails the request and reports `url` instead of the request's display url.
    /// For multi-file requests this names the one file that broke.
    pub fn fail_at(mut self, url: impl Into<String>, reason: impl Into<String>) {
        self.url = url.into();
        self.send(Err(reason.into()));
    }

    fn send(&mut self, result: Result<LoadedPayload, String>) {
        if let Some(tx) = self.tx.take() {
            // The pipeline may already be gone; late completions are dropped.
            let _ = tx.send(Completed {
                ticket: self.ticket,
                url: self.url.clone(),
                result,
            });
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.send(Err("loader dropped the request without completing it".to_string()));
        }
    }
}

/// Backend loader for one resource kind.
pub trait AssetLoader {
    /// Starts loading `request`. Must not block; the result goes through `completion`.
    fn load(&self, request: LoadRequest, completion: Completion);
}
