use crate::{
    common::*,
    frame::{CanonicalFrame, Frame, RawFrame, CANONICAL_SIZE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HW<T> {
    pub h: T,
    pub w: T,
}

/// Image size tagged with the frame it is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<T, F>
where
    F: Frame,
{
    inner: HW<T>,
    _phantom: PhantomData<F>,
}

impl<T, F> Size<T, F>
where
    F: Frame,
{
    pub fn from_hw(h: T, w: T) -> Result<Self>
    where
        T: Num + PartialOrd,
    {
        HW { h, w }.try_into()
    }

    pub fn h(&self) -> T
    where
        T: Copy,
    {
        self.inner.h
    }

    pub fn w(&self) -> T
    where
        T: Copy,
    {
        self.inner.w
    }

    pub fn hw(&self) -> [T; 2]
    where
        T: Copy,
    {
        [self.inner.h, self.inner.w]
    }

    pub fn area(&self) -> T
    where
        T: Num + Copy,
    {
        self.inner.h * self.inner.w
    }
}

impl Size<usize, CanonicalFrame> {
    /// The 224x224 canonical grid.
    pub fn canonical() -> Self {
        Self {
            inner: HW {
                h: CANONICAL_SIZE,
                w: CANONICAL_SIZE,
            },
            _phantom: PhantomData,
        }
    }
}

impl<T, F> TryFrom<HW<T>> for Size<T, F>
where
    T: Num + PartialOrd,
    F: Frame,
{
    type Error = Error;

    fn try_from(from: HW<T>) -> Result<Self, Self::Error> {
        let zero = T::zero();
        ensure!(
            from.h > zero && from.w > zero,
            "the height and width of a {} size must be positive",
            F::NAME
        );

        Ok(Self {
            inner: from,
            _phantom: PhantomData,
        })
    }
}

impl<T, F> From<Size<T, F>> for HW<T>
where
    F: Frame,
{
    fn from(from: Size<T, F>) -> Self {
        from.inner
    }
}

pub type RawSize<T> = Size<T, RawFrame>;
pub type CanonicalSize<T> = Size<T, CanonicalFrame>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rejects_empty_dims() {
        assert!(RawSize::<usize>::from_hw(0, 10).is_err());
        assert!(RawSize::<usize>::from_hw(10, 0).is_err());
        assert!(RawSize::<usize>::from_hw(3, 4).is_ok());
    }

    #[test]
    fn canonical_size_area() {
        let size = CanonicalSize::canonical();
        assert_eq!(size.hw(), [224, 224]);
        assert_eq!(size.area(), 50176);
    }
}
