use crate::{common::*, config::PreprocessConfig};
use tch::vision;

/// A preprocessed `[1, 3, 224, 224]` image and the size it was loaded at.
#[derive(Debug)]
pub struct LoadedImage {
    pub tensor: Tensor,
    pub original_size: RawSize<usize>,
}

/// Resizes to the canonical grid, scales to `[0, 1]` and normalizes per
/// channel.
#[derive(Debug)]
pub struct ImagePreprocessor {
    mean: Tensor,
    std: Tensor,
    device: Device,
}

impl ImagePreprocessor {
    pub fn new(config: &PreprocessConfig, device: Device) -> Result<Self> {
        let PreprocessConfig { mean, std } = config;
        ensure!(
            std.iter().all(|&value| value > 0.0),
            "the normalization std must be positive, but get {:?}",
            std
        );

        let to_tensor = |values: &[R64; 3]| {
            let values: Vec<f32> = values.iter().map(|value| value.raw() as f32).collect();
            Tensor::of_slice(&values).view([3, 1, 1])
        };

        Ok(Self {
            mean: to_tensor(mean),
            std: to_tensor(std),
            device,
        })
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedImage> {
        let path = path.as_ref();
        let image = vision::image::load(path)
            .with_context(|| format!("failed to load image file '{}'", path.display()))?;
        self.preprocess(&image)
    }

    /// Takes a `[3, H, W]` 8-bit image.
    pub fn preprocess(&self, image: &Tensor) -> Result<LoadedImage> {
        let (channels, height, width) = image.size3()?;
        ensure!(
            channels == 3,
            "expect an RGB image, but get {} channels",
            channels
        );
        ensure!(
            image.kind() == Kind::Uint8,
            "expect an 8-bit image, but get {:?}",
            image.kind()
        );
        let original_size = RawSize::from_hw(height as usize, width as usize)?;

        let side = CANONICAL_SIZE as i64;
        let resized = vision::image::resize(image, side, side)?;
        let tensor = ((resized.to_kind(Kind::Float) / 255.0 - &self.mean) / &self.std)
            .unsqueeze(0)
            .to_device(self.device);

        Ok(LoadedImage {
            tensor,
            original_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn preprocess_normalizes_channels() -> Result<()> {
        let config = PreprocessConfig {
            mean: [r64(0.5), r64(0.0), r64(1.0)],
            std: [r64(0.5), r64(1.0), r64(2.0)],
        };
        let preprocessor = ImagePreprocessor::new(&config, Device::Cpu)?;

        let image = Tensor::full(&[3, 300, 500], 255i64, (Kind::Uint8, Device::Cpu));
        let LoadedImage {
            tensor,
            original_size,
        } = preprocessor.preprocess(&image)?;

        assert_eq!(tensor.size(), vec![1, 3, 224, 224]);
        assert_eq!(original_size.hw(), [300, 500]);

        let values = Vec::<f32>::from(&tensor.mean_dim(&[2, 3], false, Kind::Float).view([-1]));
        assert_abs_diff_eq!(values[0], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(values[1], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(values[2], 0.0, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn preprocess_rejects_gray_images() -> Result<()> {
        let preprocessor = ImagePreprocessor::new(&PreprocessConfig::default(), Device::Cpu)?;
        let image = Tensor::zeros(&[1, 32, 32], (Kind::Uint8, Device::Cpu));
        assert!(preprocessor.preprocess(&image).is_err());
        Ok(())
    }
}
