//! Proptest generators for property-based testing.

use proptest::prelude::*;

use gcrsync_core::{ImageId, ImageSet};

/// Generate an image identifier such as `kube-proxy:v12`.
pub fn image_id() -> impl Strategy<Value = ImageId> {
    "[a-z][a-z0-9-]{0,11}:v[0-9]{1,2}".prop_map(ImageId::from)
}

/// Generate a list of identifiers that may contain duplicates.
pub fn image_list(max: usize) -> impl Strategy<Value = Vec<ImageId>> {
    prop::collection::vec(image_id(), 0..=max)
}

/// Generate an image set of at most `max` images.
pub fn image_set(max: usize) -> impl Strategy<Value = ImageSet> {
    image_list(max).prop_map(|images| images.into_iter().collect())
}

/// Generate a source and target that share some images.
///
/// The target is built from a random subset of the source plus extra
/// images the source does not have.
pub fn overlapping_sets(max: usize) -> impl Strategy<Value = (ImageSet, ImageSet)> {
    (image_list(max), image_list(max / 2 + 1))
        .prop_flat_map(|(source, extra)| {
            let len = source.len();
            (
                Just(source),
                Just(extra),
                prop::collection::vec(any::<bool>(), len),
            )
        })
        .prop_map(|(source, extra, keep)| {
            let target: ImageSet = source
                .iter()
                .zip(keep)
                .filter(|(_, keep)| *keep)
                .map(|(image, _)| image.clone())
                .chain(extra)
                .collect();
            (source.into_iter().collect(), target)
        })
}

/// Parameters for a simulated sync run.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Number of images to transfer.
    pub images: usize,
    /// Pool size.
    pub process_limit: usize,
    /// Transfer delay in milliseconds for each image, by plan index.
    pub delays_ms: Vec<u64>,
    /// Plan indices whose transfer fails.
    pub failing: Vec<usize>,
}

impl Arbitrary for RunParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0usize..40, 1usize..8)
            .prop_flat_map(|(images, process_limit)| {
                (
                    Just(images),
                    Just(process_limit),
                    prop::collection::vec(1u64..200, images),
                    prop::collection::vec(0..images.max(1), 0..=images / 3),
                )
            })
            .prop_map(|(images, process_limit, delays_ms, failing)| RunParams {
                images,
                process_limit,
                delays_ms,
                failing: if images == 0 { Vec::new() } else { failing },
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcrsync_core::diff;

    proptest! {
        #[test]
        fn test_generated_ids_parse(id in image_id()) {
            prop_assert!(ImageId::parse(id.as_str()).is_ok());
            prop_assert!(id.reference().tag.is_some());
        }

        #[test]
        fn test_overlap_diff_excludes_target((source, target) in overlapping_sets(30)) {
            let plan = diff(&source, &target);
            prop_assert!(plan.len() <= source.len());
            for image in plan.iter() {
                prop_assert!(!target.contains(image));
            }
        }

        #[test]
        fn test_run_params_consistent(params: RunParams) {
            prop_assert_eq!(params.delays_ms.len(), params.images);
            prop_assert!(params.failing.iter().all(|&i| i < params.images));
        }
    }
}
