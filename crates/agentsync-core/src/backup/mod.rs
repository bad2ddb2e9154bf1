//! Per-batch backup and rollback of target paths
//!
//! Every path a batch is about to overwrite is first moved aside into
//! `.agentsync/backups/<batch-id>/`. Moving rather than copying keeps file
//! contents, modification times and symbolic links exactly as they were, so a
//! rolled-back target classifies the same way it did before the batch.

mod ledger;

pub use ledger::{BackupLedger, BackupRecord};
