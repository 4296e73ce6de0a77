use anyhow::Result;
use insecurity::model::{ClassifierNet, FeatureNet, LayerRegistry, Stage};
use tch::{nn, Device};

/// Two 3x3 convolutions and a 2x2 pooling over 3-channel images.
pub fn small_classifier(num_classes: i64) -> Result<ClassifierNet> {
    let vs = nn::VarStore::new(Device::Cpu);
    let root = vs.root();
    let conv_config = || nn::ConvConfig {
        padding: 1,
        ..Default::default()
    };

    let conv = |name: &str, in_c, out_c| {
        nn::conv2d(&(&root / "features") / name, in_c, out_c, 3, conv_config())
    };
    let pool = Stage::MaxPool2D {
        ksize: 2,
        stride: 2,
    };
    let fc_path = &(&root / "classifier") / "fc";
    let fc = nn::linear(fc_path, 8, num_classes, Default::default());

    let mut features = LayerRegistry::new();
    features.push("0", conv("0", 3, 8))?;
    features.push("1", Stage::Relu)?;
    features.push("2", conv("2", 8, 8))?;
    features.push("3", Stage::Relu)?;
    features.push("4", pool)?;

    let mut head = LayerRegistry::new();
    head.push("avgpool", Stage::AdaptiveAvgPool2D([1, 1]))?;
    head.push("flatten", Stage::Flatten)?;
    head.push("fc", fc)?;

    Ok(ClassifierNet::new(vs, FeatureNet::new(features, head)))
}
