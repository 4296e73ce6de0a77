use crate::common::*;

pub trait TensorExt {
    /// Bilinear resampling over the last two dimensions with half-pixel
    /// centers (`align_corners = false`).
    ///
    /// Accepts `[H, W]`, `[C, H, W]` and `[B, C, H, W]` float tensors and
    /// keeps the leading dimensions.
    fn f_resize2d_bilinear(&self, new_height: i64, new_width: i64) -> Result<Tensor>;

    /// Copies a `[H, W]` tensor into a row-major array on host memory.
    fn f_to_array2(&self) -> Result<Array2<f32>>;

    fn f_from_array2(array: &Array2<f32>) -> Result<Tensor>;
}

impl TensorExt for Tensor {
    fn f_resize2d_bilinear(&self, new_height: i64, new_width: i64) -> Result<Tensor> {
        ensure!(
            new_height > 0 && new_width > 0,
            "the target size must be positive, but get {}x{}",
            new_height,
            new_width
        );
        ensure!(
            matches!(self.kind(), Kind::Float | Kind::Double),
            "bilinear resampling requires a floating point tensor, but get {:?}",
            self.kind()
        );

        let resized = match *self.size().as_slice() {
            [h, w] => self
                .f_reshape(&[1, 1, h, w])?
                .f_upsample_bilinear2d(&[new_height, new_width], false, None, None)?
                .f_reshape(&[new_height, new_width])?,
            [c, h, w] => self
                .f_reshape(&[1, c, h, w])?
                .f_upsample_bilinear2d(&[new_height, new_width], false, None, None)?
                .f_reshape(&[c, new_height, new_width])?,
            [_b, _c, _h, _w] => {
                self.f_upsample_bilinear2d(&[new_height, new_width], false, None, None)?
            }
            ref shape => bail!("expect 2, 3 or 4 dimensions, but get shape {:?}", shape),
        };

        Ok(resized)
    }

    fn f_to_array2(&self) -> Result<Array2<f32>> {
        let (h, w) = self.size2()?;
        let values = host_values(self);
        let array = Array2::from_shape_vec((h as usize, w as usize), values)?;
        Ok(array)
    }

    fn f_from_array2(array: &Array2<f32>) -> Result<Tensor> {
        let (h, w) = array.dim();
        let values: Vec<f32> = array.iter().cloned().collect();
        let tensor = Tensor::of_slice(&values).f_reshape(&[h as i64, w as i64])?;
        Ok(tensor)
    }
}

fn host_values(tensor: &Tensor) -> Vec<f32> {
    let tensor = tensor
        .detach()
        .to_device(Device::Cpu)
        .to_kind(Kind::Float)
        .contiguous();
    Vec::<f32>::from(&tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bilinear_upsample_uses_half_pixel_centers() -> Result<()> {
        let input = Tensor::of_slice(&[0f32, 1.0, 2.0, 3.0]).reshape(&[2, 2]);
        let output = input.f_resize2d_bilinear(4, 4)?.f_to_array2()?;

        assert_eq!(output.dim(), (4, 4));
        let expect_first_row = [0f32, 0.25, 0.75, 1.0];
        output
            .row(0)
            .iter()
            .zip_eq(expect_first_row)
            .for_each(|(&actual, expect)| assert_abs_diff_eq!(actual, expect, epsilon = 1e-6));
        assert_abs_diff_eq!(output[[1, 1]], 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(output[[3, 3]], 3.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn bilinear_keeps_constant_maps() -> Result<()> {
        let input = Tensor::ones(&[13, 13], (Kind::Float, Device::Cpu)) * 0.5;
        let output = input.f_resize2d_bilinear(224, 224)?.f_to_array2()?;
        assert_eq!(output.dim(), (224, 224));
        output
            .iter()
            .for_each(|&value| assert_abs_diff_eq!(value, 0.5, epsilon = 1e-6));
        Ok(())
    }

    #[test]
    fn bilinear_rejects_integer_tensors() {
        let input = Tensor::zeros(&[2, 2], (Kind::Int64, Device::Cpu));
        assert!(input.f_resize2d_bilinear(4, 4).is_err());
    }

    #[test]
    fn array_conversion_keeps_layout() -> Result<()> {
        let array = Array2::from_shape_fn((3, 5), |(r, c)| (r * 5 + c) as f32);
        let tensor = Tensor::f_from_array2(&array)?;
        assert_eq!(tensor.size(), vec![3, 5]);
        assert_abs_diff_eq!(tensor.double_value(&[2, 1]), 11.0);
        assert_eq!(tensor.f_to_array2()?, array);
        Ok(())
    }
}
