use num::Float;

/// Piecewise-linear interpolation through `coords`, similar to numpy.interp for one point.
///
/// `coords` must be sorted by x. Points left of the first coordinate take its y, points right
/// of the last take the last y. Zero-width segments are allowed and resolve to their right end,
/// which is how a shoulder such as `[0, 0, 3, 5]` reaches 1.0 exactly at 0.
pub(crate) fn interp<F: Float>(x: F, coords: &[(F, F)]) -> F {
    let (Some(&(first_x, first_y)), Some(&(last_x, last_y))) = (coords.first(), coords.last()) else {
        return F::zero();
    };

    if x < first_x {
        return first_y;
    }
    if x > last_x {
        return last_y;
    }

    for window in coords.windows(2) {
        let ((x1, y1), (x2, y2)) = (window[0], window[1]);

        if x1 <= x && x <= x2 {
            if x2 == x1 {
                return y2;
            }

            return y1 + (x - x1) * (y2 - y1) / (x2 - x1);
        }
    }

    // Only reachable for a lone coordinate or NaN
    if coords.len() == 1 && x == first_x {
        first_y
    } else {
        F::zero()
    }
}

/// Clamps a degree into [0, 1]; NaN collapses to 0.
#[inline]
pub(crate) fn unit<F: Float>(value: F) -> F {
    if value.is_nan() {
        F::zero()
    } else {
        value.max(F::zero()).min(F::one())
    }
}

#[test]
fn test_interp() {
    let coords = [(1., 3.), (2., 2.), (3., 0.)];
    let x = [0., 1., 1.5, 2.72, 3.24];

    assert_eq!(
        x.iter().map(|&x| interp(x, &coords)).collect::<Vec<f64>>(),
        vec![3., 3., 2.5, 0.5599999999999996, 0.]
    );

    let coords = [(0., 0.), (1., 2.), (2., 5.), (3., 3.), (4.5, 2.)];
    let x = [2.5, -1., 7.5];

    assert_eq!(x.iter().map(|&x| interp(x, &coords)).collect::<Vec<f64>>(), vec![4., 0., 2.]);
}

#[test]
fn test_interp_vertical_edges() {
    let shoulder = [(0., 0.), (0., 1.), (3., 1.), (5., 0.)];

    assert_eq!(interp(0., &shoulder), 1.);
    assert_eq!(interp(3., &shoulder), 1.);
    assert_eq!(interp(4., &shoulder), 0.5);
    assert_eq!(interp(5., &shoulder), 0.);
    assert_eq!(interp(f64::NAN, &shoulder), 0.);
    assert_eq!(interp::<f64>(1., &[]), 0.);
}

#[test]
fn test_unit() {
    assert_eq!(unit(1.5), 1.);
    assert_eq!(unit(-0.1), 0.);
    assert_eq!(unit(0.25), 0.25);
    assert_eq!(unit(f64::NAN), 0.);
}
