mod common;

use anyhow::Result;
use approx::assert_abs_diff_eq;
use common::small_classifier;
use insecurity::{
    attribution::{
        AttributionError, ClassConfusionAttributor, DifficultyAttributor,
        GradientAttributionExtractor,
    },
    config::AttributionConfig,
    model::{AttributionModel, ClassifierNet, FeatureNet, LayerRegistry, Probe, Stage},
};
use tch::{nn, Device, Kind, Tensor};

/// Counts cleared gradients, one per backward pass.
struct CountingModel {
    inner: ClassifierNet,
    num_zero_grad: usize,
}

impl AttributionModel for CountingModel {
    fn probe_registry(&self) -> &LayerRegistry {
        self.inner.probe_registry()
    }

    fn forward_probe(&self, input: &Tensor, layer: &str) -> Result<Probe> {
        self.inner.forward_probe(input, layer)
    }

    fn zero_grad(&mut self) {
        self.num_zero_grad += 1;
        self.inner.zero_grad();
    }
}

fn config(layer: &str) -> AttributionConfig {
    AttributionConfig {
        classifier_layer: layer.into(),
        difficulty_layer: layer.into(),
    }
}

#[test]
fn class_maps_match_probed_resolution() -> Result<()> {
    tch::manual_seed(1);
    let mut model = CountingModel {
        inner: small_classifier(6)?,
        num_zero_grad: 0,
    };
    let image = Tensor::randn(&[1, 3, 16, 16], (Kind::Float, Device::Cpu));

    let attributor = ClassConfusionAttributor::new(&model, &config("3"))?;
    let maps = attributor.attribute(&mut model, &image, &[5, 0, 2])?;
    assert_eq!(maps.maps().dim(), (16, 16, 3));
    assert_eq!(maps.candidates(), &[5, 0, 2]);
    assert_eq!(model.num_zero_grad, 3);

    // a ReLU activation weighted by clipped gradients is never negative
    assert!(maps.maps().iter().all(|&value| value >= 0.0));

    let attributor = ClassConfusionAttributor::new(&model, &config("4"))?;
    let maps = attributor.attribute(&mut model, &image, &[1, 4])?;
    assert_eq!(maps.dim(), (8, 8));
    Ok(())
}

#[test]
fn unknown_layer_fails_before_any_pass() -> Result<()> {
    let model = small_classifier(4)?;

    let err = GradientAttributionExtractor::new(&model, "classifier").unwrap_err();
    assert!(matches!(
        err,
        AttributionError::LayerNotFound { ref layer, .. } if layer == "classifier"
    ));

    let err = ClassConfusionAttributor::new(&model, &config("11")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AttributionError>(),
        Some(AttributionError::LayerNotFound { .. })
    ));
    Ok(())
}

#[test]
fn out_of_range_class_is_rejected() -> Result<()> {
    let mut model = small_classifier(4)?;
    let image = Tensor::randn(&[1, 3, 8, 8], (Kind::Float, Device::Cpu));

    let attributor = ClassConfusionAttributor::new(&model, &config("1"))?;
    let err = attributor.attribute(&mut model, &image, &[1, 4]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AttributionError>(),
        Some(AttributionError::ClassOutOfRange {
            class: 4,
            num_classes: 4
        })
    ));
    Ok(())
}

#[test]
fn class_map_equals_clipped_weighted_activation() -> Result<()> {
    // logits are a fixed linear map of the ReLU output, so the gradient of
    // class c is its weight row
    let weights = Tensor::of_slice(&[
        1f32, -1.0, 2.0, 0.5, 0.0, 3.0, -2.0, 1.0, // class 0
        -1.0, 1.0, 0.0, 1.0, 2.0, -3.0, 1.0, 0.0, // class 1
    ])
    .view([2, 8]);

    let mut features = LayerRegistry::new();
    features.push("0", Stage::Relu)?;
    let mut head = LayerRegistry::new();
    head.push("flatten", Stage::Flatten)?;
    let weights_t = weights.tr();
    let linear: Box<dyn 'static + Fn(&Tensor, bool) -> Tensor + Send> =
        Box::new(move |xs: &Tensor, _train: bool| xs.matmul(&weights_t));
    head.push("fc", linear)?;
    let mut model = ClassifierNet::new(
        nn::VarStore::new(Device::Cpu),
        FeatureNet::new(features, head),
    );

    let image = Tensor::of_slice(&[
        1f32, -2.0, 3.0, 4.0, // channel 0
        0.5, 1.0, -1.0, 2.0, // channel 1
    ])
    .view([1, 2, 2, 2]);

    let attributor = ClassConfusionAttributor::new(&model, &config("0"))?;
    let maps = attributor.attribute(&mut model, &image, &[0, 1])?;

    // relu(x) = [1, 0, 3, 4 | 0.5, 1, 0, 2]
    // class 0: relu(w) = [1, 0, 2, 0.5 | 0, 3, 0, 1]
    let expect_0 = [1.0f32, 3.0, 6.0, 4.0];
    // class 1: relu(w) = [0, 1, 0, 1 | 2, 0, 1, 0]
    let expect_1 = [1.0f32, 0.0, 0.0, 4.0];

    maps.map(0)
        .iter()
        .zip(expect_0)
        .for_each(|(&value, expect)| assert_abs_diff_eq!(value, expect, epsilon = 1e-6));
    maps.map(1)
        .iter()
        .zip(expect_1)
        .for_each(|(&value, expect)| assert_abs_diff_eq!(value, expect, epsilon = 1e-6));
    Ok(())
}

#[test]
fn difficulty_map_has_probed_shape() -> Result<()> {
    let vs = nn::VarStore::new(Device::Cpu);
    let root = vs.root();
    let mut features = LayerRegistry::new();
    features.push(
        "0",
        nn::conv2d(&(&root / "trunk") / "0", 3, 4, 3, Default::default()),
    )?;
    features.push("1", Stage::Relu)?;
    let mut head = LayerRegistry::new();
    head.push("flatten", Stage::Flatten)?;
    head.push(
        "score",
        nn::linear(&(&root / "head") / "score", 4 * 10 * 10, 1, Default::default()),
    )?;
    let mut model = ClassifierNet::new(vs, FeatureNet::new(features, head));

    let image = Tensor::rand(&[1, 3, 12, 12], (Kind::Float, Device::Cpu));
    let attributor = DifficultyAttributor::new(&model, &config("1"))?;
    let map = attributor.attribute(&mut model, &image)?;
    assert_eq!(map.dim(), (10, 10));

    // a batch of two images is refused
    let batch = Tensor::rand(&[2, 3, 12, 12], (Kind::Float, Device::Cpu));
    assert!(attributor.attribute(&mut model, &batch).is_err());
    Ok(())
}
