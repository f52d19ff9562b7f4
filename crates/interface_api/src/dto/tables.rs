//! Table snapshot DTOs

use core_kernel::SnapshotId;
use domain_rating::TableSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub previous_snapshot_id: SnapshotId,
    pub current: TableSummary,
}
