use num::Float;

/// Evenly spaced samples over a closed interval, computed the way numpy.linspace does.
#[derive(Clone, Debug)]
pub(crate) struct Linspace<F> {
    start: F,
    step: F,
    index: usize,
    len: usize,
}

impl<F: Float> Linspace<F> {
    pub(crate) fn new(min: F, max: F, n: usize) -> Self {
        let step = match n {
            0 | 1 => F::zero(),
            // n - 1 always fits in a float mantissa for any universe we sample
            _ => (max - min) / F::from(n - 1).unwrap_or_else(F::one),
        };

        Linspace {
            start: min,
            step,
            index: 0,
            len: n,
        }
    }
}

impl<F: Float> Iterator for Linspace<F> {
    type Item = F;

    #[inline]
    fn next(&mut self) -> Option<F> {
        if self.index >= self.len {
            return None;
        }

        let i = F::from(self.index)?;
        self.index += 1;

        Some(self.start + self.step * i)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl<F: Float> ExactSizeIterator for Linspace<F> {}

#[test]
fn test_linspace() {
    let points: Vec<f64> = Linspace::new(0., 1., 5).collect();

    assert_eq!(points, vec![0., 0.25, 0.5, 0.75, 1.]);
    assert_eq!(Linspace::new(2., 3., 1).collect::<Vec<f64>>(), vec![2.]);
    assert_eq!(Linspace::<f64>::new(2., 3., 0).len(), 0);
}

#[test]
fn test_linspace_endpoints_hit_exactly() {
    let points: Vec<f64> = Linspace::new(0., 100., 201).collect();

    assert_eq!(points.len(), 201);
    assert_eq!(points[0], 0.);
    assert_eq!(points[100], 50.);
    assert_eq!(points[200], 100.);
}
