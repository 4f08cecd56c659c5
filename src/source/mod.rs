// Origin access: the transport seam and its HTTP implementation.

pub mod http_source;
pub mod traits;
