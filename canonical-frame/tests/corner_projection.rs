use canonical_frame::{RawPoint, RawSize, Rescale, CANONICAL_SIZE};

const IMAGE_SIZES: &[[usize; 2]] = &[[375, 500], [500, 375], [224, 224], [1, 1], [333, 97]];

#[test]
fn corner_annotations_stay_on_grid() {
    IMAGE_SIZES.iter().for_each(|&[h, w]| {
        let size = RawSize::from_hw(h, w).unwrap();
        let rescale = Rescale::to_canonical(&size);
        let (h, w) = (h as f64, w as f64);

        let corners = [
            RawPoint::from_xy(0.0, 0.0),
            RawPoint::from_xy(w, 0.0),
            RawPoint::from_xy(0.0, h),
            RawPoint::from_xy(w, h),
            RawPoint::from_xy(w - 1.0, h - 1.0),
        ];

        corners.iter().for_each(|corner| {
            let point = rescale.project(corner);
            assert!(
                point.row() < CANONICAL_SIZE,
                "row out of grid for {:?}",
                corner
            );
            assert!(
                point.col() < CANONICAL_SIZE,
                "col out of grid for {:?}",
                corner
            );
        });

        let far = rescale.project(&RawPoint::from_xy(w, h));
        let last = CANONICAL_SIZE - 1;
        assert_eq!((far.row(), far.col()), (last, last));
    });
}
