use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpuError {
    #[error("no suitable graphics adapter: {0}")]
    AdapterUnavailable(String),
    #[error("failed to load rendering resource `{name}`: {reason}")]
    ResourceLoad { name: String, reason: String },
    #[error("graphics device lost")]
    DeviceLost,
}
