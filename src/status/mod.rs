pub mod fetcher;
pub mod panel;
pub mod reconciler;

pub use fetcher::StatusSnapshot;
pub use reconciler::Reconciler;
