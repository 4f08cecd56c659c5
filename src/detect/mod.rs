// Text-pattern extraction over the root page and bundle sources.

pub mod bundle;
pub mod references;
