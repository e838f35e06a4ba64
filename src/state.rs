use std::sync::Arc;

use axum::extract::FromRef;

use crate::repository::PostRepository;
use crate::upload::UploadPolicy;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn PostRepository>,
    pub uploads: UploadPolicy,
}

impl FromRef<AppState> for Arc<dyn PostRepository> {
    fn from_ref(state: &AppState) -> Self {
        state.repo.clone()
    }
}

impl FromRef<AppState> for UploadPolicy {
    fn from_ref(state: &AppState) -> Self {
        state.uploads.clone()
    }
}
