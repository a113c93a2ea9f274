pub mod quota_reconciler;
pub mod selector;
pub mod warn_writer;

pub use quota_reconciler::{QuotaReconciler, SelectionResult};
pub use selector::select;
pub use warn_writer::WarnWriter;
