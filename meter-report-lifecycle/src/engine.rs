use meter_report_api::{BlobStore, ImageProcessor};
use meter_report_db::repository::unit_of_work::UnitOfWork;
use meter_report_postgres::PostgresRepositories;
use std::sync::Arc;
use tracing::info;

use crate::blob_store::LocalBlobStore;
use crate::config::LifecycleConfig;
use crate::error::BoxError;
use crate::image::PassthroughImageProcessor;
use crate::ledger::ActivityLedger;
use crate::lifecycle::ReportLifecycle;
use crate::query_view::ReportQueryView;
use crate::stager::ArtifactStager;

/// Lifecycle, query view and ledger wired to one storage backend.
#[derive(Clone)]
pub struct ReportEngine {
    lifecycle: Arc<ReportLifecycle>,
    query_view: Arc<ReportQueryView>,
    ledger: Arc<ActivityLedger>,
}

impl ReportEngine {
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        blob_store: Arc<dyn BlobStore>,
        image_processor: Arc<dyn ImageProcessor>,
        config: &LifecycleConfig,
    ) -> Self {
        let ledger = Arc::new(ActivityLedger::new(uow.clone(), config.ledger_append_attempts));
        let stager = Arc::new(ArtifactStager::new(
            blob_store,
            image_processor,
            config.compression_threshold_bytes,
        ));
        Self {
            lifecycle: Arc::new(ReportLifecycle::new(
                uow.clone(),
                stager,
                ledger.clone(),
                config.id_allocation_attempts,
            )),
            query_view: Arc::new(ReportQueryView::new(uow, ledger.clone())),
            ledger,
        }
    }

    /// PostgreSQL storage, photos under `config.upload_dir`, no re-encoding.
    pub async fn connect(config: &LifecycleConfig) -> Result<Self, BoxError> {
        let repositories = PostgresRepositories::connect(&config.database_url, config.max_connections).await?;
        info!(
            max_connections = config.max_connections,
            upload_dir = %config.upload_dir.display(),
            "report engine connected"
        );
        Ok(Self::new(
            Arc::new(repositories.unit_of_work()),
            Arc::new(LocalBlobStore::new(config.upload_dir.clone())),
            Arc::new(PassthroughImageProcessor),
            config,
        ))
    }

    pub fn lifecycle(&self) -> &ReportLifecycle {
        &self.lifecycle
    }

    pub fn query_view(&self) -> &ReportQueryView {
        &self.query_view
    }

    pub fn ledger(&self) -> &ActivityLedger {
        &self.ledger
    }
}
