use crate::common::*;

/// One named step of a sequential network.
#[derive(AsRefStr, Derivative)]
#[derivative(Debug)]
pub enum Stage {
    Conv2D(nn::Conv2D),
    Linear(nn::Linear),
    Relu,
    MaxPool2D { ksize: i64, stride: i64 },
    AdaptiveAvgPool2D([i64; 2]),
    Dropout(f64),
    Flatten,
    FnSingle(
        #[derivative(Debug = "ignore")] Box<dyn 'static + Fn(&Tensor, bool) -> Tensor + Send>,
    ),
}

impl Stage {
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        match self {
            Self::Conv2D(conv) => xs.apply(conv),
            Self::Linear(linear) => xs.apply(linear),
            Self::Relu => xs.relu(),
            Self::MaxPool2D { ksize, stride } => xs.max_pool2d(
                &[*ksize, *ksize],
                &[*stride, *stride],
                &[0, 0],
                &[1, 1],
                false,
            ),
            Self::AdaptiveAvgPool2D(size) => xs.adaptive_avg_pool2d(size),
            Self::Dropout(prob) => xs.dropout(*prob, train),
            Self::Flatten => xs.flatten(1, -1),
            Self::FnSingle(func) => func(xs, train),
        }
    }
}

impl From<nn::Conv2D> for Stage {
    fn from(v: nn::Conv2D) -> Self {
        Self::Conv2D(v)
    }
}

impl From<nn::Linear> for Stage {
    fn from(v: nn::Linear) -> Self {
        Self::Linear(v)
    }
}

impl From<Box<dyn 'static + Fn(&Tensor, bool) -> Tensor + Send>> for Stage {
    fn from(v: Box<dyn 'static + Fn(&Tensor, bool) -> Tensor + Send>) -> Self {
        Self::FnSingle(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_shapes() {
        let input = Tensor::rand(&[1, 4, 13, 13], (Kind::Float, Device::Cpu));

        let pooled = Stage::MaxPool2D {
            ksize: 3,
            stride: 2,
        }
        .forward_t(&input, false);
        assert_eq!(pooled.size(), vec![1, 4, 6, 6]);

        let avg = Stage::AdaptiveAvgPool2D([6, 6]).forward_t(&pooled, false);
        assert_eq!(avg.size(), vec![1, 4, 6, 6]);

        let flat = Stage::Flatten.forward_t(&avg, false);
        assert_eq!(flat.size(), vec![1, 144]);

        // dropout is the identity in evaluation mode
        let dropped = Stage::Dropout(0.5).forward_t(&flat, false);
        assert!(dropped.equal(&flat));
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Relu.as_ref(), "Relu");
        assert_eq!(Stage::Flatten.as_ref(), "Flatten");
    }
}
