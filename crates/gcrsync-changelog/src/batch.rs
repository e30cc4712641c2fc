//! The changelog batch and its markdown rendering.

use chrono::NaiveDate;
use gcrsync_core::ImageId;

/// Images transferred during one run, in the order their completions arrived.
///
/// Arrival order is completion-time order, not plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogBatch {
    images: Vec<ImageId>,
}

impl ChangelogBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: ImageId) {
        self.images.push(image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageId> {
        self.images.iter()
    }

    pub fn as_slice(&self) -> &[ImageId] {
        &self.images
    }

    pub fn into_vec(self) -> Vec<ImageId> {
        self.images
    }
}

impl FromIterator<ImageId> for ChangelogBatch {
    fn from_iter<T: IntoIterator<Item = ImageId>>(iter: T) -> Self {
        Self {
            images: iter.into_iter().collect(),
        }
    }
}

/// File name of the changelog for a given day: `CHANGELOG-2018-12-07.md`.
pub fn changelog_file_name(date: NaiveDate) -> String {
    format!("CHANGELOG-{}.md", date.format("%Y-%m-%d"))
}

/// Render one batch as a markdown section.
///
/// `prefix`, when non-empty, is prepended to every image with a `/`, so
/// entries can name the fully qualified source image.
pub fn render_markdown(heading: &str, prefix: &str, batch: &ChangelogBatch) -> String {
    let mut out = format!("### {heading}\n\n");
    for image in batch.iter() {
        if prefix.is_empty() {
            out.push_str(&format!("- `{image}`\n"));
        } else {
            out.push_str(&format!("- `{prefix}/{image}`\n"));
        }
    }
    out.push('\n');
    out
}
