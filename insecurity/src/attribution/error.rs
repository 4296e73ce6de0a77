use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("layer '{layer}' does not exist, available layers are [{available}]")]
    LayerNotFound { layer: String, available: String },
    #[error("class index {class} is out of range for {num_classes} outputs")]
    ClassOutOfRange { class: i64, num_classes: i64 },
}
